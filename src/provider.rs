//! Seams to the bridge's external collaborators.
//!
//! Everything the bridge cannot do itself (native accessibility queries,
//! window-event fan-out, persisted preferences, the in-process assistive
//! engine) sits behind one of these traits, so hosts plug in the real thing
//! and tests substitute recording fakes.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::capability::Capability;
use crate::status::AccessibilityStatus;
use crate::Result;

/// Persisted key for the "follow the system's preferred text size" toggle.
pub const PREF_USE_PREFERRED_TEXT_ZOOM: &str = "usePreferredTextZoom";

/// Announcement classification forwarded to the platform screen reader.
/// The numeric values are wire contract (UIAccessibilityNotification ids).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncementKind {
    ScreenChanged,
    LayoutChanged,
    Announcement,
    PageScrolled,
}

impl AnnouncementKind {
    pub fn as_u32(&self) -> u32 {
        match self {
            AnnouncementKind::ScreenChanged => 1000,
            AnnouncementKind::LayoutChanged => 1001,
            AnnouncementKind::Announcement => 1008,
            AnnouncementKind::PageScrolled => 1009,
        }
    }

    pub fn from_u32(value: u32) -> Option<AnnouncementKind> {
        match value {
            1000 => Some(AnnouncementKind::ScreenChanged),
            1001 => Some(AnnouncementKind::LayoutChanged),
            1008 => Some(AnnouncementKind::Announcement),
            1009 => Some(AnnouncementKind::PageScrolled),
            _ => None,
        }
    }
}

/// Queueing behavior for in-process speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueMode {
    /// Interrupt whatever is being spoken.
    #[default]
    Flush,
    /// Speak after the current utterance finishes.
    Queue,
}

impl QueueMode {
    pub fn from_u32(value: u32) -> Option<QueueMode> {
        match value {
            0 => Some(QueueMode::Flush),
            1 => Some(QueueMode::Queue),
            _ => None,
        }
    }
}

/// Resolution of one spoken announcement, delivered once playback finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechOutcome {
    #[serde(rename = "stringValue")]
    pub text: String,
    #[serde(rename = "wasSuccessful")]
    pub succeeded: bool,
}

/// The native accessibility provider.
///
/// Point queries are fresh round-trips with no caching. `announce` must reset
/// any unfinished synthesis before starting a new utterance (never more than
/// one in flight) and resolves its receiver when audio playback completes;
/// a receiver whose sender is dropped models an utterance that was
/// superseded or ignored. `start_listening` begins snapshot delivery on
/// `status_tx` (an initial snapshot on start is expected, further ones as OS
/// state changes); initialization failures go to `error_tx`.
pub trait NativeAdapter: Send + Sync {
    fn query(&self, capability: Capability) -> Result<bool>;

    /// Active high-contrast scheme name, only while high contrast is on.
    fn high_contrast_scheme(&self) -> Option<String> {
        None
    }

    /// OS-preferred text scale factor; 1.0 means 100%.
    fn system_font_scale(&self) -> f64;

    /// Scale the rendered view; echoes the percent actually applied.
    fn apply_text_zoom(&self, percent: u32) -> Result<u32>;

    /// Reload the web view. Only exercised on resume when a screen reader
    /// appeared while the application was in the background.
    fn reload_view(&self) {}

    fn announce(&self, kind: AnnouncementKind, text: &str) -> oneshot::Receiver<SpeechOutcome>;

    /// Release/reset the speech audio resource.
    fn stop_speech(&self) {}

    fn start_listening(
        &self,
        status_tx: mpsc::UnboundedSender<AccessibilityStatus>,
        error_tx: mpsc::UnboundedSender<String>,
    ) -> Result<()>;

    fn stop_listening(&self);
}

/// The host's event dispatch mechanism (window events in a web shell).
pub trait EventBus: Send + Sync {
    fn publish(&self, topic: &str, payload: &AccessibilityStatus);
}

/// Opaque persisted key/value store for user preferences.
pub trait PreferenceStore: Send + Sync {
    fn get_bool(&self, key: &str) -> Option<bool>;
    fn set_bool(&self, key: &str, value: bool);
}

/// An in-process assistive-technology engine rendered inside the web view
/// (the TalkBack-era ChromeVox arrangement). Optional: most hosts have none.
pub trait AssistiveEngine: Send + Sync {
    /// Whether the engine is loaded and active right now.
    fn detect(&self) -> bool;

    /// Activate or deactivate the engine to follow screen-reader state.
    fn set_active(&self, active: bool);

    fn speak(&self, text: &str, queue_mode: QueueMode, properties: &serde_json::Value);

    fn stop(&self);
}

/// Adapter for hosts with no native accessibility services: every query
/// resolves `false`, zoom is tracked locally, announcements complete
/// unsuccessfully. Mirrors what the most limited native layer reports.
#[derive(Default)]
pub struct NullAdapter {
    zoom: Mutex<u32>,
    status_tx: Mutex<Option<mpsc::UnboundedSender<AccessibilityStatus>>>,
}

impl NullAdapter {
    pub fn new() -> Self {
        Self {
            zoom: Mutex::new(100),
            status_tx: Mutex::new(None),
        }
    }
}

impl NativeAdapter for NullAdapter {
    fn query(&self, _capability: Capability) -> Result<bool> {
        Ok(false)
    }

    fn system_font_scale(&self) -> f64 {
        1.0
    }

    fn apply_text_zoom(&self, percent: u32) -> Result<u32> {
        *self.zoom.lock().unwrap() = percent;
        Ok(percent)
    }

    fn announce(&self, _kind: AnnouncementKind, text: &str) -> oneshot::Receiver<SpeechOutcome> {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(SpeechOutcome {
            text: text.to_string(),
            succeeded: false,
        });
        rx
    }

    fn start_listening(
        &self,
        status_tx: mpsc::UnboundedSender<AccessibilityStatus>,
        _error_tx: mpsc::UnboundedSender<String>,
    ) -> Result<()> {
        let initial = AccessibilityStatus {
            is_screen_reader_running: Some(false),
            is_closed_captioning_enabled: Some(false),
            is_high_contrast_enabled: Some(false),
            ..Default::default()
        };
        let _ = status_tx.send(initial);
        // Nothing will ever change; hold the sender so the channel stays
        // open until the listener is stopped.
        *self.status_tx.lock().unwrap() = Some(status_tx);
        Ok(())
    }

    fn stop_listening(&self) {
        self.status_tx.lock().unwrap().take();
    }
}

/// In-memory preference store used by the stdio host and tests.
#[derive(Default)]
pub struct MemoryPrefs {
    values: Mutex<HashMap<String, bool>>,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPrefs {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.lock().unwrap().get(key).copied()
    }

    fn set_bool(&self, key: &str, value: bool) {
        self.values.lock().unwrap().insert(key.to_string(), value);
    }
}
