#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use axbridge::bridge::AccessibilityBridge;
use axbridge::capability::{Capability, Platform};
use axbridge::config::BridgeSettings;
use axbridge::provider::{
    AnnouncementKind, AssistiveEngine, EventBus, MemoryPrefs, NativeAdapter, QueueMode,
    SpeechOutcome,
};
use axbridge::status::AccessibilityStatus;
use axbridge::Result;

/// Let the bridge's spawned dispatch task drain everything pushed so far.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(25)).await;
}

/// Recording stand-in for the native accessibility provider.
#[derive(Default)]
pub struct FakeAdapter {
    values: Mutex<HashMap<Capability, bool>>,
    scheme: Mutex<Option<String>>,
    font_scale: Mutex<f64>,
    fail_queries: AtomicBool,
    fail_start: AtomicBool,
    speech_succeeds: AtomicBool,

    queries: Mutex<Vec<Capability>>,
    applied_zooms: Mutex<Vec<u32>>,
    announcements: Mutex<Vec<(u32, String)>>,
    starts: AtomicUsize,
    stops: AtomicUsize,
    speech_stops: AtomicUsize,
    reloads: AtomicUsize,

    status_tx: Mutex<Option<mpsc::UnboundedSender<AccessibilityStatus>>>,
    error_tx: Mutex<Option<mpsc::UnboundedSender<String>>>,
}

impl FakeAdapter {
    pub fn new() -> Arc<Self> {
        let adapter = Self::default();
        *adapter.font_scale.lock().unwrap() = 1.0;
        adapter.speech_succeeds.store(true, Ordering::SeqCst);
        Arc::new(adapter)
    }

    pub fn set_value(&self, capability: Capability, value: bool) {
        self.values.lock().unwrap().insert(capability, value);
    }

    pub fn set_scheme(&self, scheme: Option<&str>) {
        *self.scheme.lock().unwrap() = scheme.map(str::to_string);
    }

    pub fn set_font_scale(&self, scale: f64) {
        *self.font_scale.lock().unwrap() = scale;
    }

    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    pub fn set_speech_succeeds(&self, succeeds: bool) {
        self.speech_succeeds.store(succeeds, Ordering::SeqCst);
    }

    /// Deliver a snapshot as the native listener would.
    pub fn push_status(&self, snapshot: AccessibilityStatus) {
        let guard = self.status_tx.lock().unwrap();
        let tx = guard.as_ref().expect("listener not started");
        tx.send(snapshot).expect("dispatch task gone");
    }

    pub fn push_error(&self, message: &str) {
        let guard = self.error_tx.lock().unwrap();
        let tx = guard.as_ref().expect("listener not started");
        let _ = tx.send(message.to_string());
    }

    pub fn queries(&self) -> Vec<Capability> {
        self.queries.lock().unwrap().clone()
    }

    pub fn applied_zooms(&self) -> Vec<u32> {
        self.applied_zooms.lock().unwrap().clone()
    }

    pub fn announcements(&self) -> Vec<(u32, String)> {
        self.announcements.lock().unwrap().clone()
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn speech_stops(&self) -> usize {
        self.speech_stops.load(Ordering::SeqCst)
    }

    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }

    pub fn listening(&self) -> bool {
        self.status_tx.lock().unwrap().is_some()
    }
}

impl NativeAdapter for FakeAdapter {
    fn query(&self, capability: Capability) -> Result<bool> {
        self.queries.lock().unwrap().push(capability);
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(axbridge::Error::Provider("query refused".to_string()));
        }
        Ok(self
            .values
            .lock()
            .unwrap()
            .get(&capability)
            .copied()
            .unwrap_or(false))
    }

    fn high_contrast_scheme(&self) -> Option<String> {
        self.scheme.lock().unwrap().clone()
    }

    fn system_font_scale(&self) -> f64 {
        *self.font_scale.lock().unwrap()
    }

    fn apply_text_zoom(&self, percent: u32) -> Result<u32> {
        self.applied_zooms.lock().unwrap().push(percent);
        Ok(percent)
    }

    fn reload_view(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }

    fn announce(&self, kind: AnnouncementKind, text: &str) -> oneshot::Receiver<SpeechOutcome> {
        self.announcements
            .lock()
            .unwrap()
            .push((kind.as_u32(), text.to_string()));
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(SpeechOutcome {
            text: text.to_string(),
            succeeded: self.speech_succeeds.load(Ordering::SeqCst),
        });
        rx
    }

    fn stop_speech(&self) {
        self.speech_stops.fetch_add(1, Ordering::SeqCst);
    }

    fn start_listening(
        &self,
        status_tx: mpsc::UnboundedSender<AccessibilityStatus>,
        error_tx: mpsc::UnboundedSender<String>,
    ) -> Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_start.load(Ordering::SeqCst) {
            let _ = error_tx.send("native listener unavailable".to_string());
            return Err(axbridge::Error::ListenerFailed(
                "native listener unavailable".to_string(),
            ));
        }
        *self.status_tx.lock().unwrap() = Some(status_tx);
        *self.error_tx.lock().unwrap() = Some(error_tx);
        Ok(())
    }

    fn stop_listening(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.status_tx.lock().unwrap().take();
        self.error_tx.lock().unwrap().take();
    }
}

/// Event bus that records every published event.
#[derive(Default)]
pub struct FakeBus {
    events: Mutex<Vec<(String, AccessibilityStatus)>>,
}

impl FakeBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<(String, AccessibilityStatus)> {
        self.events.lock().unwrap().clone()
    }

    pub fn topics(&self) -> Vec<String> {
        self.events().into_iter().map(|(topic, _)| topic).collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl EventBus for FakeBus {
    fn publish(&self, topic: &str, payload: &AccessibilityStatus) {
        self.events
            .lock()
            .unwrap()
            .push((topic.to_string(), payload.clone()));
    }
}

/// In-process assistive engine fake.
#[derive(Default)]
pub struct FakeEngine {
    active: AtomicBool,
    activations: Mutex<Vec<bool>>,
    spoken: Mutex<Vec<(String, QueueMode)>>,
    stops: AtomicUsize,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn activations(&self) -> Vec<bool> {
        self.activations.lock().unwrap().clone()
    }

    pub fn spoken(&self) -> Vec<(String, QueueMode)> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl AssistiveEngine for FakeEngine {
    fn detect(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
        self.activations.lock().unwrap().push(active);
    }

    fn speak(&self, text: &str, queue_mode: QueueMode, _properties: &serde_json::Value) {
        self.spoken
            .lock()
            .unwrap()
            .push((text.to_string(), queue_mode));
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub adapter: Arc<FakeAdapter>,
    pub bus: Arc<FakeBus>,
    pub prefs: Arc<MemoryPrefs>,
    pub engine: Arc<FakeEngine>,
    pub bridge: Arc<AccessibilityBridge>,
}

/// Bridge over recording fakes, in-process assistive engine included.
pub fn harness(platform: Platform) -> Harness {
    harness_with(platform, true)
}

pub fn harness_without_engine(platform: Platform) -> Harness {
    harness_with(platform, false)
}

fn harness_with(platform: Platform, with_engine: bool) -> Harness {
    let adapter = FakeAdapter::new();
    let bus = FakeBus::new();
    let prefs = Arc::new(MemoryPrefs::new());
    let engine = FakeEngine::new();
    let assistive: Option<Arc<dyn AssistiveEngine>> = if with_engine {
        Some(engine.clone())
    } else {
        None
    };
    let bridge = AccessibilityBridge::new(
        platform,
        BridgeSettings::default(),
        adapter.clone(),
        bus.clone(),
        prefs.clone(),
        assistive,
    );
    Harness {
        adapter,
        bus,
        prefs,
        engine,
        bridge,
    }
}
