//! Accessibility capability model.
//!
//! Each capability is one queryable OS accessibility feature with a stable
//! window-event topic name. Declaration order is canonical: when a single
//! status snapshot flips several features, change events fire in this order.

/// Host platform family, as far as native accessibility services go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ios,
    Android,
    Windows,
}

impl Platform {
    /// Closest platform family for the compile target. Desktop Apple targets
    /// share the iOS feature set; anything that is not Apple or Android gets
    /// the Windows surface (high contrast only).
    pub fn host() -> Self {
        if cfg!(any(target_os = "ios", target_os = "macos")) {
            Platform::Ios
        } else if cfg!(target_os = "android") {
            Platform::Android
        } else {
            Platform::Windows
        }
    }
}

/// One observable accessibility feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    ScreenReader,
    ClosedCaptioning,
    GuidedAccess,
    InvertColors,
    MonoAudio,
    ReduceMotion,
    ReduceTransparency,
    BoldText,
    DarkerSystemColors,
    Grayscale,
    SpeakScreen,
    SpeakSelection,
    SwitchControl,
    TouchExploration,
    HighContrast,
}

impl Capability {
    /// Every capability, in canonical event order.
    pub const ALL: [Capability; 15] = [
        Capability::ScreenReader,
        Capability::ClosedCaptioning,
        Capability::GuidedAccess,
        Capability::InvertColors,
        Capability::MonoAudio,
        Capability::ReduceMotion,
        Capability::ReduceTransparency,
        Capability::BoldText,
        Capability::DarkerSystemColors,
        Capability::Grayscale,
        Capability::SpeakScreen,
        Capability::SpeakSelection,
        Capability::SwitchControl,
        Capability::TouchExploration,
        Capability::HighContrast,
    ];

    /// Stable window-event name. These strings are wire contract; shells
    /// register listeners against them verbatim.
    pub fn topic(&self) -> &'static str {
        match self {
            Capability::ScreenReader => "screenreaderstatuschanged",
            Capability::ClosedCaptioning => "closedcaptioningstatuschanged",
            Capability::GuidedAccess => "guidedaccessstatuschanged",
            Capability::InvertColors => "invertcolorsstatuschanged",
            Capability::MonoAudio => "monoaudiostatuschanged",
            Capability::ReduceMotion => "reducemotionstatuschanged",
            Capability::ReduceTransparency => "reducetransparencystatuschanged",
            Capability::BoldText => "boldtextstatuschanged",
            Capability::DarkerSystemColors => "darkersystemcolorsstatuschanged",
            Capability::Grayscale => "grayscalestatuschanged",
            Capability::SpeakScreen => "speakscreenstatuschanged",
            Capability::SpeakSelection => "speakselectionstatuschanged",
            Capability::SwitchControl => "switchcontrolstatuschanged",
            // Historical spelling, kept for compatibility.
            Capability::TouchExploration => "touchexplorationstatechanged",
            Capability::HighContrast => "highcontrastchanged",
        }
    }

    /// Platforms where this feature exists at all.
    pub fn platforms(&self) -> &'static [Platform] {
        match self {
            Capability::ScreenReader => {
                &[Platform::Ios, Platform::Android, Platform::Windows]
            }
            Capability::ClosedCaptioning => &[Platform::Ios, Platform::Android],
            Capability::GuidedAccess
            | Capability::InvertColors
            | Capability::MonoAudio
            | Capability::ReduceMotion
            | Capability::ReduceTransparency
            | Capability::BoldText
            | Capability::DarkerSystemColors
            | Capability::Grayscale
            | Capability::SpeakScreen
            | Capability::SpeakSelection
            | Capability::SwitchControl => &[Platform::Ios],
            Capability::TouchExploration => &[Platform::Android],
            Capability::HighContrast => &[Platform::Windows],
        }
    }

    pub fn supported_on(&self, platform: Platform) -> bool {
        self.platforms().contains(&platform)
    }

    pub fn from_topic(topic: &str) -> Option<Capability> {
        Capability::ALL.iter().copied().find(|c| c.topic() == topic)
    }
}
