use serde::Deserialize;
use std::path::Path;

/// All configurable settings with their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeSettings {
    /// Lower clamp for `setTextZoom`, percent.
    pub text_zoom_min: u32,
    /// Upper clamp for `setTextZoom`, percent.
    pub text_zoom_max: u32,
    /// Zoom restored when the preferred-zoom toggle is switched off.
    pub text_zoom_default: u32,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            text_zoom_min: 25,
            text_zoom_max: 400,
            text_zoom_default: 100,
        }
    }
}

/// Raw JSON representation — all fields optional for partial overrides.
#[derive(Debug, Deserialize, Default)]
struct SettingsFile {
    #[serde(rename = "textZoom.min")]
    text_zoom_min: Option<u32>,
    #[serde(rename = "textZoom.max")]
    text_zoom_max: Option<u32>,
    #[serde(rename = "textZoom.default")]
    text_zoom_default: Option<u32>,
}

/// Resolve settings: defaults → user global → project-local.
pub fn resolve(project_root: Option<&Path>) -> BridgeSettings {
    let global_path = dirs::home_dir().map(|h| h.join(".axbridge/settings.json"));
    let project_path = project_root.map(|r| r.join(".axbridge/settings.json"));
    resolve_with_paths(global_path.as_deref(), project_path.as_deref())
}

/// Testable resolver that accepts explicit file paths (no home dir dependency).
fn resolve_with_paths(
    global_path: Option<&Path>,
    project_path: Option<&Path>,
) -> BridgeSettings {
    let mut settings = BridgeSettings::default();

    if let Some(path) = global_path {
        apply_file(&mut settings, path);
    }
    if let Some(path) = project_path {
        apply_file(&mut settings, path);
    }

    settings
}

fn apply_file(settings: &mut BridgeSettings, path: &Path) {
    let Ok(content) = std::fs::read_to_string(path) else { return };
    let Ok(file) = serde_json::from_str::<SettingsFile>(&content) else {
        tracing::warn!("Invalid settings file, ignoring: {}", path.display());
        return;
    };
    if let Some(v) = file.text_zoom_min {
        if v >= 1 && v <= 100 {
            settings.text_zoom_min = v;
        } else {
            tracing::warn!("textZoom.min ({}) out of range (1..100), using default", v);
        }
    }
    if let Some(v) = file.text_zoom_max {
        if v >= 100 && v <= 1000 {
            settings.text_zoom_max = v;
        } else {
            tracing::warn!("textZoom.max ({}) out of range (100..1000), using default", v);
        }
    }
    if let Some(v) = file.text_zoom_default {
        if v >= settings.text_zoom_min && v <= settings.text_zoom_max {
            settings.text_zoom_default = v;
        } else {
            tracing::warn!(
                "textZoom.default ({}) outside clamp range ({}..{}), using default",
                v,
                settings.text_zoom_min,
                settings.text_zoom_max
            );
        }
    }
}
