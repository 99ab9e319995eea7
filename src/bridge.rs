//! The accessibility bridge facade and its status dispatcher.
//!
//! One bridge instance exists per process. It owns the observed status, the
//! subscription tracker and the text-zoom state; everything native goes
//! through the injected [`NativeAdapter`]. The native listener runs exactly
//! while at least one topic has a subscriber.

use std::sync::{Arc, Weak};

use tokio::sync::{mpsc, RwLock};

use crate::capability::{Capability, Platform};
use crate::config::BridgeSettings;
use crate::provider::{
    AnnouncementKind, AssistiveEngine, EventBus, NativeAdapter, PreferenceStore, QueueMode,
    SpeechOutcome, PREF_USE_PREFERRED_TEXT_ZOOM,
};
use crate::status::{diff, AccessibilityStatus};
use crate::subscription::{SubscriptionTracker, Transition};
use crate::{Error, Result};

/// Zero-width space; some shells send it as a "say nothing" placeholder.
const PLACEHOLDER: &str = "\u{200b}";

struct ZoomState {
    percent: u32,
    use_preferred: bool,
}

pub struct AccessibilityBridge {
    /// Handle to ourselves for spawning the dispatch task.
    weak: Weak<AccessibilityBridge>,
    platform: Platform,
    settings: BridgeSettings,
    adapter: Arc<dyn NativeAdapter>,
    bus: Arc<dyn EventBus>,
    prefs: Arc<dyn PreferenceStore>,
    assistive: Option<Arc<dyn AssistiveEngine>>,
    observed: RwLock<AccessibilityStatus>,
    subscriptions: RwLock<SubscriptionTracker>,
    zoom: RwLock<ZoomState>,
    /// Screen-reader flag cached when the application goes to background.
    paused_screen_reader: RwLock<Option<bool>>,
}

impl AccessibilityBridge {
    pub fn new(
        platform: Platform,
        settings: BridgeSettings,
        adapter: Arc<dyn NativeAdapter>,
        bus: Arc<dyn EventBus>,
        prefs: Arc<dyn PreferenceStore>,
        assistive: Option<Arc<dyn AssistiveEngine>>,
    ) -> Arc<Self> {
        let use_preferred = prefs.get_bool(PREF_USE_PREFERRED_TEXT_ZOOM).unwrap_or(false);
        let percent = settings.text_zoom_default;
        Arc::new_cyclic(|weak| Self {
            weak: weak.clone(),
            platform,
            settings,
            adapter,
            bus,
            prefs,
            assistive,
            observed: RwLock::new(AccessibilityStatus::default()),
            subscriptions: RwLock::new(SubscriptionTracker::new()),
            zoom: RwLock::new(ZoomState {
                percent,
                use_preferred,
            }),
            paused_screen_reader: RwLock::new(None),
        })
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    // ---- point queries ----

    /// One fresh native round-trip; unsupported capabilities and provider
    /// failures both read as `false`.
    async fn query(&self, capability: Capability) -> bool {
        if !capability.supported_on(self.platform) {
            return false;
        }
        match self.adapter.query(capability) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Query for {:?} failed: {}", capability, e);
                false
            }
        }
    }

    pub async fn is_screen_reader_running(&self) -> bool {
        let running = self.query(Capability::ScreenReader).await;
        self.sync_assistive_engine(running);
        running
    }

    /// VoiceOver alias; resolves `false` off Apple platforms without a
    /// native round-trip.
    pub async fn is_voice_over_running(&self) -> bool {
        if self.platform != Platform::Ios {
            return false;
        }
        self.is_screen_reader_running().await
    }

    /// TalkBack alias; resolves `false` off Android without a native
    /// round-trip.
    pub async fn is_talk_back_running(&self) -> bool {
        if self.platform != Platform::Android {
            return false;
        }
        self.is_screen_reader_running().await
    }

    pub async fn is_closed_captioning_enabled(&self) -> bool {
        self.query(Capability::ClosedCaptioning).await
    }

    pub async fn is_guided_access_enabled(&self) -> bool {
        self.query(Capability::GuidedAccess).await
    }

    pub async fn is_invert_colors_enabled(&self) -> bool {
        self.query(Capability::InvertColors).await
    }

    pub async fn is_mono_audio_enabled(&self) -> bool {
        self.query(Capability::MonoAudio).await
    }

    pub async fn is_reduce_motion_enabled(&self) -> bool {
        self.query(Capability::ReduceMotion).await
    }

    pub async fn is_reduce_transparency_enabled(&self) -> bool {
        self.query(Capability::ReduceTransparency).await
    }

    pub async fn is_bold_text_enabled(&self) -> bool {
        self.query(Capability::BoldText).await
    }

    pub async fn is_darker_system_colors_enabled(&self) -> bool {
        self.query(Capability::DarkerSystemColors).await
    }

    pub async fn is_grayscale_enabled(&self) -> bool {
        self.query(Capability::Grayscale).await
    }

    pub async fn is_speak_screen_enabled(&self) -> bool {
        self.query(Capability::SpeakScreen).await
    }

    pub async fn is_speak_selection_enabled(&self) -> bool {
        self.query(Capability::SpeakSelection).await
    }

    pub async fn is_switch_control_running(&self) -> bool {
        self.query(Capability::SwitchControl).await
    }

    pub async fn is_touch_exploration_enabled(&self) -> bool {
        self.query(Capability::TouchExploration).await
    }

    pub async fn is_high_contrast_enabled(&self) -> bool {
        self.query(Capability::HighContrast).await
    }

    /// Scheme name only while high contrast is actually on.
    pub async fn get_high_contrast_scheme(&self) -> Option<String> {
        if !self.query(Capability::HighContrast).await {
            return None;
        }
        self.adapter.high_contrast_scheme()
    }

    // ---- text zoom ----

    pub async fn get_text_zoom(&self) -> u32 {
        self.zoom.read().await.percent
    }

    /// Clamp to the configured bounds, apply, and echo the applied percent.
    pub async fn set_text_zoom(&self, percent: u32) -> Result<u32> {
        if percent == 0 {
            return Err(Error::ZoomOutOfRange(0));
        }
        let clamped = percent.clamp(self.settings.text_zoom_min, self.settings.text_zoom_max);
        let applied = self.adapter.apply_text_zoom(clamped)?;
        self.zoom.write().await.percent = applied;
        Ok(applied)
    }

    /// Re-read the OS-preferred text scale and apply it.
    pub async fn update_text_zoom(&self) -> Result<u32> {
        let scale = self.adapter.system_font_scale();
        let percent = (scale * 100.0).round().max(1.0) as u32;
        self.set_text_zoom(percent).await
    }

    /// Combined getter/setter for the persisted "follow system text size"
    /// preference. Turning it on applies the system zoom immediately and arms
    /// the resume trigger; turning it off resets to the default zoom.
    pub async fn use_preferred_text_zoom(&self, value: Option<bool>) -> Result<bool> {
        let Some(enable) = value else {
            return Ok(self.zoom.read().await.use_preferred);
        };
        self.prefs.set_bool(PREF_USE_PREFERRED_TEXT_ZOOM, enable);
        self.zoom.write().await.use_preferred = enable;
        if enable {
            self.update_text_zoom().await?;
        } else {
            self.set_text_zoom(self.settings.text_zoom_default).await?;
        }
        Ok(enable)
    }

    // ---- speech ----

    /// Ask the platform screen reader to speak `text`; resolves once playback
    /// finishes. Empty and placeholder strings are not sent at all.
    pub async fn post_notification(
        &self,
        kind: AnnouncementKind,
        text: &str,
    ) -> Option<SpeechOutcome> {
        if text.is_empty() || text == PLACEHOLDER {
            return None;
        }
        match self.adapter.announce(kind, text).await {
            Ok(outcome) => Some(outcome),
            // Sender dropped: the utterance was superseded or the native
            // layer ignored it.
            Err(_) => Some(SpeechOutcome {
                text: text.to_string(),
                succeeded: false,
            }),
        }
    }

    /// Speak through the in-process engine when one is active, otherwise as a
    /// plain announcement. Fire-and-forget: playback is not awaited.
    pub fn speak(&self, text: &str, queue_mode: QueueMode, properties: &serde_json::Value) {
        if let Some(engine) = self.active_assistive() {
            engine.speak(text, queue_mode, properties);
            return;
        }
        if text.is_empty() || text == PLACEHOLDER {
            return;
        }
        drop(self.adapter.announce(AnnouncementKind::Announcement, text));
    }

    pub fn stop_speech(&self) {
        if let Some(engine) = self.active_assistive() {
            engine.stop();
            return;
        }
        self.adapter.stop_speech();
    }

    fn active_assistive(&self) -> Option<&Arc<dyn AssistiveEngine>> {
        self.assistive.as_ref().filter(|engine| engine.detect())
    }

    /// Keep the in-process engine in step with screen-reader state. Rendering
    /// depends on this, so it runs regardless of topic subscribers.
    fn sync_assistive_engine(&self, running: bool) {
        if self.platform != Platform::Android {
            return;
        }
        match &self.assistive {
            Some(engine) => engine.set_active(running),
            None if running => {
                tracing::warn!(
                    "A screen reader is running but no in-process assistive engine is available."
                );
            }
            None => {}
        }
    }

    // ---- subscriptions ----

    pub async fn subscribe_topic(&self, topic: &str) -> Result<()> {
        let capability = Capability::from_topic(topic).ok_or_else(|| Error::InvalidArgument {
            action: "subscribe".to_string(),
            reason: format!("unknown topic '{topic}'"),
        })?;
        self.subscribe(capability).await;
        Ok(())
    }

    pub async fn unsubscribe_topic(&self, topic: &str) -> Result<()> {
        let capability = Capability::from_topic(topic).ok_or_else(|| Error::InvalidArgument {
            action: "unsubscribe".to_string(),
            reason: format!("unknown topic '{topic}'"),
        })?;
        self.unsubscribe(capability).await;
        Ok(())
    }

    pub async fn subscribe(&self, capability: Capability) {
        let transition = self.subscriptions.write().await.subscribe(capability);
        if transition == Transition::Started {
            self.start_listening().await;
        }
    }

    pub async fn unsubscribe(&self, capability: Capability) {
        let transition = self.subscriptions.write().await.unsubscribe(capability);
        if transition == Transition::Stopped {
            self.stop_listening().await;
        }
    }

    pub async fn total_subscribers(&self) -> usize {
        self.subscriptions.read().await.total()
    }

    // ---- lifecycle ----

    pub async fn handle_pause(&self) {
        let running = self.observed.read().await.is_screen_reader_running;
        *self.paused_screen_reader.write().await = Some(running.unwrap_or(false));
    }

    /// Application returned to foreground: re-apply the preferred zoom when
    /// armed, and rebuild the page if a screen reader came up while paused.
    pub async fn handle_resume(&self) {
        let use_preferred = self.zoom.read().await.use_preferred;
        if use_preferred {
            if let Err(e) = self.update_text_zoom().await {
                tracing::warn!("Failed to re-apply preferred text zoom on resume: {}", e);
            }
        }

        let cached = self.paused_screen_reader.write().await.take();
        let running_now = self
            .observed
            .read()
            .await
            .is_screen_reader_running
            .unwrap_or(false);
        if running_now && cached == Some(false) {
            // The page was rendered without assistive markup; reloading is
            // the only way to rebuild it. Subscribers vanish with the page.
            self.shutdown_subscriptions().await;
            self.adapter.reload_view();
        }
    }

    async fn shutdown_subscriptions(&self) {
        let had_active = {
            let mut subscriptions = self.subscriptions.write().await;
            let active = subscriptions.any_active();
            *subscriptions = SubscriptionTracker::new();
            active
        };
        if had_active {
            self.stop_listening().await;
        }
    }

    // ---- native listener + status dispatch ----

    /// Invoked only on the tracker's 0→1 edge. Registers the snapshot and
    /// error channels with the native provider and spawns the single
    /// dispatch task that serializes snapshot processing.
    async fn start_listening(&self) {
        let (status_tx, mut status_rx) = mpsc::unbounded_channel();
        let (error_tx, mut error_rx) = mpsc::unbounded_channel();

        if let Err(e) = self.adapter.start_listening(status_tx, error_tx) {
            // Point queries do not depend on the listener; log and move on.
            tracing::error!("Error initializing accessibility listener: {}", e);
            return;
        }

        let Some(bridge) = self.weak.upgrade() else {
            return;
        };
        tokio::spawn(async move {
            let mut errors_open = true;
            loop {
                tokio::select! {
                    snapshot = status_rx.recv() => match snapshot {
                        Some(snapshot) => bridge.process_status(&snapshot).await,
                        // Provider dropped its sender after stop_listening.
                        None => break,
                    },
                    err = error_rx.recv(), if errors_open => match err {
                        Some(err) => {
                            tracing::error!("Accessibility listener error: {}", err);
                        }
                        None => errors_open = false,
                    },
                }
            }
        });
    }

    /// Invoked only on the tracker's 1→0 edge.
    async fn stop_listening(&self) {
        self.adapter.stop_listening();
        self.adapter.stop_speech();
    }

    /// One snapshot in, at most one event per changed capability out, in
    /// canonical order, payload = the raw snapshot.
    async fn process_status(&self, snapshot: &AccessibilityStatus) {
        if let Some(running) = snapshot.is_screen_reader_running {
            self.sync_assistive_engine(running);
        }

        let changed = {
            let mut observed = self.observed.write().await;
            let changed = diff(&observed, snapshot);
            observed.merge(snapshot);
            changed
        };

        for capability in changed {
            self.bus.publish(capability.topic(), snapshot);
        }
    }
}
