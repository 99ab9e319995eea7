//! Action routing for the shell-facing surface.
//!
//! The web shell addresses the bridge with `(action, args)` pairs, args
//! being a positional JSON array. Boolean query results are echoed as
//! `0`/`1`, which is what shells already parse.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::bridge::AccessibilityBridge;
use crate::provider::{AnnouncementKind, QueueMode};
use crate::{Error, Result};

fn invalid(action: &str, reason: impl Into<String>) -> Error {
    Error::InvalidArgument {
        action: action.to_string(),
        reason: reason.into(),
    }
}

fn arg<'a>(args: &'a Value, action: &str, index: usize) -> Result<&'a Value> {
    args.get(index)
        .ok_or_else(|| invalid(action, format!("missing argument {index}")))
}

fn bit(value: bool) -> Value {
    json!(if value { 1 } else { 0 })
}

/// Run one shell action against the bridge.
///
/// `Ok(Some(value))` is a reply to send back; `Ok(None)` means the action
/// deliberately never resolves (ignored speech, fire-and-forget calls).
pub async fn run_action(
    bridge: &Arc<AccessibilityBridge>,
    action: &str,
    args: &Value,
) -> Result<Option<Value>> {
    let reply = match action {
        "isScreenReaderRunning" => bit(bridge.is_screen_reader_running().await),
        "isVoiceOverRunning" => bit(bridge.is_voice_over_running().await),
        "isTalkBackRunning" => bit(bridge.is_talk_back_running().await),
        "isClosedCaptioningEnabled" => bit(bridge.is_closed_captioning_enabled().await),
        "isGuidedAccessEnabled" => bit(bridge.is_guided_access_enabled().await),
        "isInvertColorsEnabled" => bit(bridge.is_invert_colors_enabled().await),
        "isMonoAudioEnabled" => bit(bridge.is_mono_audio_enabled().await),
        "isReduceMotionEnabled" => bit(bridge.is_reduce_motion_enabled().await),
        "isReduceTransparencyEnabled" => bit(bridge.is_reduce_transparency_enabled().await),
        "isBoldTextEnabled" => bit(bridge.is_bold_text_enabled().await),
        "isDarkerSystemColorsEnabled" => bit(bridge.is_darker_system_colors_enabled().await),
        "isGrayscaleEnabled" => bit(bridge.is_grayscale_enabled().await),
        "isSpeakScreenEnabled" => bit(bridge.is_speak_screen_enabled().await),
        "isSpeakSelectionEnabled" => bit(bridge.is_speak_selection_enabled().await),
        "isSwitchControlRunning" => bit(bridge.is_switch_control_running().await),
        "isTouchExplorationEnabled" => bit(bridge.is_touch_exploration_enabled().await),
        "isHighContrastEnabled" => bit(bridge.is_high_contrast_enabled().await),
        "getHighContrastScheme" => json!(bridge.get_high_contrast_scheme().await),

        "getTextZoom" => json!(bridge.get_text_zoom().await),
        "setTextZoom" => {
            let zoom = arg(args, action, 0)?
                .as_i64()
                .ok_or_else(|| invalid(action, "zoom must be a number"))?;
            if zoom <= 0 {
                return Err(Error::ZoomOutOfRange(zoom));
            }
            json!(bridge.set_text_zoom(zoom as u32).await?)
        }
        "updateTextZoom" => json!(bridge.update_text_zoom().await?),
        "usePreferredTextZoom" => {
            let value = match args.get(0) {
                None | Some(Value::Null) => None,
                Some(Value::Bool(b)) => Some(*b),
                Some(_) => return Err(invalid(action, "expected a boolean")),
            };
            json!(bridge.use_preferred_text_zoom(value).await?)
        }

        "postNotification" => {
            let kind = arg(args, action, 0)?
                .as_u64()
                .and_then(|k| u32::try_from(k).ok())
                .and_then(AnnouncementKind::from_u32)
                .ok_or_else(|| invalid(action, "unknown notification kind"))?;
            let text = arg(args, action, 1)?
                .as_str()
                .ok_or_else(|| invalid(action, "text must be a string"))?;
            return Ok(bridge
                .post_notification(kind, text)
                .await
                .map(|outcome| json!(outcome)));
        }
        "speak" => {
            let text = arg(args, action, 0)?
                .as_str()
                .ok_or_else(|| invalid(action, "text must be a string"))?;
            let queue_mode = match args.get(1) {
                None | Some(Value::Null) => QueueMode::Flush,
                Some(v) => v
                    .as_u64()
                    .and_then(|m| u32::try_from(m).ok())
                    .and_then(QueueMode::from_u32)
                    .ok_or_else(|| invalid(action, "queue mode must be 0 or 1"))?,
            };
            let properties = args.get(2).cloned().unwrap_or(Value::Null);
            bridge.speak(text, queue_mode, &properties);
            return Ok(None);
        }
        "stop" => {
            bridge.stop_speech();
            return Ok(None);
        }

        "subscribe" => {
            let topic = arg(args, action, 0)?
                .as_str()
                .ok_or_else(|| invalid(action, "topic must be a string"))?;
            bridge.subscribe_topic(topic).await?;
            Value::Null
        }
        "unsubscribe" => {
            let topic = arg(args, action, 0)?
                .as_str()
                .ok_or_else(|| invalid(action, "topic must be a string"))?;
            bridge.unsubscribe_topic(topic).await?;
            Value::Null
        }

        // Lifecycle notifications forwarded by the shell.
        "pause" => {
            bridge.handle_pause().await;
            Value::Null
        }
        "resume" => {
            bridge.handle_resume().await;
            Value::Null
        }

        _ => return Err(Error::UnknownAction(action.to_string())),
    };

    Ok(Some(reply))
}
