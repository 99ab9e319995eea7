//! Status snapshots and the field-by-field differ.
//!
//! The native side delivers partial status batches: only the fields it
//! reports are present, and an absent field means "unchanged", never false.
//! The same struct doubles as the bridge's observed state, where an absent
//! field means "not seen yet", so a first observation always diffs as
//! changed.

use serde::{Deserialize, Serialize};

use crate::capability::Capability;

/// One batch of accessibility feature values, as reported by the native
/// layer. Field names are the wire contract shared with the shell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_screen_reader_running: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_closed_captioning_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_guided_access_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_invert_colors_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_mono_audio_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_reduce_motion_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_reduce_transparency_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_bold_text_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_darker_system_colors_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_grayscale_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_speak_screen_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_speak_selection_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_switch_control_running: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_touch_exploration_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_high_contrast_enabled: Option<bool>,
    /// Companion to the high-contrast flag; part of the same logical
    /// capability, only reported while high contrast is on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_contrast_scheme: Option<String>,
}

impl AccessibilityStatus {
    /// The boolean flag backing a capability, if present in this status.
    pub fn flag(&self, capability: Capability) -> Option<bool> {
        match capability {
            Capability::ScreenReader => self.is_screen_reader_running,
            Capability::ClosedCaptioning => self.is_closed_captioning_enabled,
            Capability::GuidedAccess => self.is_guided_access_enabled,
            Capability::InvertColors => self.is_invert_colors_enabled,
            Capability::MonoAudio => self.is_mono_audio_enabled,
            Capability::ReduceMotion => self.is_reduce_motion_enabled,
            Capability::ReduceTransparency => self.is_reduce_transparency_enabled,
            Capability::BoldText => self.is_bold_text_enabled,
            Capability::DarkerSystemColors => self.is_darker_system_colors_enabled,
            Capability::Grayscale => self.is_grayscale_enabled,
            Capability::SpeakScreen => self.is_speak_screen_enabled,
            Capability::SpeakSelection => self.is_speak_selection_enabled,
            Capability::SwitchControl => self.is_switch_control_running,
            Capability::TouchExploration => self.is_touch_exploration_enabled,
            Capability::HighContrast => self.is_high_contrast_enabled,
        }
    }

    fn set_flag(&mut self, capability: Capability, value: bool) {
        let slot = match capability {
            Capability::ScreenReader => &mut self.is_screen_reader_running,
            Capability::ClosedCaptioning => &mut self.is_closed_captioning_enabled,
            Capability::GuidedAccess => &mut self.is_guided_access_enabled,
            Capability::InvertColors => &mut self.is_invert_colors_enabled,
            Capability::MonoAudio => &mut self.is_mono_audio_enabled,
            Capability::ReduceMotion => &mut self.is_reduce_motion_enabled,
            Capability::ReduceTransparency => &mut self.is_reduce_transparency_enabled,
            Capability::BoldText => &mut self.is_bold_text_enabled,
            Capability::DarkerSystemColors => &mut self.is_darker_system_colors_enabled,
            Capability::Grayscale => &mut self.is_grayscale_enabled,
            Capability::SpeakScreen => &mut self.is_speak_screen_enabled,
            Capability::SpeakSelection => &mut self.is_speak_selection_enabled,
            Capability::SwitchControl => &mut self.is_switch_control_running,
            Capability::TouchExploration => &mut self.is_touch_exploration_enabled,
            Capability::HighContrast => &mut self.is_high_contrast_enabled,
        };
        *slot = Some(value);
    }

    /// Overwrite every field the snapshot reports; leave the rest untouched.
    pub fn merge(&mut self, snapshot: &AccessibilityStatus) {
        for capability in Capability::ALL {
            if let Some(value) = snapshot.flag(capability) {
                self.set_flag(capability, value);
            }
        }
        if let Some(scheme) = &snapshot.high_contrast_scheme {
            self.high_contrast_scheme = Some(scheme.clone());
        }
    }
}

/// Capabilities whose value changed between the observed state and an
/// incoming snapshot, in canonical event order.
///
/// A capability counts as changed only when the snapshot actually reports it
/// and the reported value differs from the last observed one. A field the
/// bridge has never seen always counts as changed on first report.
pub fn diff(observed: &AccessibilityStatus, snapshot: &AccessibilityStatus) -> Vec<Capability> {
    Capability::ALL
        .iter()
        .copied()
        .filter(|&capability| {
            let flag_changed = match snapshot.flag(capability) {
                Some(new) => observed.flag(capability) != Some(new),
                None => false,
            };
            if capability == Capability::HighContrast {
                // Compound capability: a scheme swap without a flag flip is
                // still one high-contrast change.
                let scheme_changed = match &snapshot.high_contrast_scheme {
                    Some(scheme) => observed.high_contrast_scheme.as_deref() != Some(scheme),
                    None => false,
                };
                flag_changed || scheme_changed
            } else {
                flag_changed
            }
        })
        .collect()
}
