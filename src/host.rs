//! Stdio host for web shells.
//!
//! The shell spawns this process and speaks line-delimited JSON: one request
//! `{"id": …, "action": …, "args": […]}` per line, answered by one
//! `{"id": …, "result": …}` or `{"id": …, "error": …}` line. Accessibility
//! change events are interleaved on the same stream as
//! `{"event": topic, "payload": snapshot}` lines.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::bridge::AccessibilityBridge;
use crate::dispatch::run_action;
use crate::provider::EventBus;
use crate::status::AccessibilityStatus;
use crate::Result;

#[derive(Debug, Deserialize)]
struct HostRequest {
    id: Value,
    action: String,
    #[serde(default)]
    args: Value,
}

/// Event bus that forwards published events to the host's output loop.
pub struct ChannelBus {
    tx: mpsc::UnboundedSender<(String, AccessibilityStatus)>,
}

impl ChannelBus {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(String, AccessibilityStatus)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventBus for ChannelBus {
    fn publish(&self, topic: &str, payload: &AccessibilityStatus) {
        let _ = self.tx.send((topic.to_string(), payload.clone()));
    }
}

/// Serve requests from stdin until EOF, pushing events as they fire.
pub async fn run(
    bridge: Arc<AccessibilityBridge>,
    mut events: mpsc::UnboundedReceiver<(String, AccessibilityStatus)>,
) -> Result<()> {
    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();

    loop {
        tokio::select! {
            result = reader.read_line(&mut line) => {
                match result {
                    Ok(0) => break, // EOF, shell is gone
                    Ok(_) => {
                        if let Some(response) = handle_line(&bridge, &line).await {
                            stdout.write_all(response.as_bytes()).await?;
                            stdout.write_all(b"\n").await?;
                            stdout.flush().await?;
                        }
                        line.clear();
                    }
                    Err(e) => {
                        tracing::error!("stdin error: {}", e);
                        break;
                    }
                }
            }
            event = events.recv() => {
                if let Some((topic, payload)) = event {
                    write_event(&mut stdout, &topic, &payload).await?;
                }
            }
        }
    }

    // The shell closed stdin; flush events already in flight before exiting.
    while let Ok(Some((topic, payload))) =
        tokio::time::timeout(std::time::Duration::from_millis(100), events.recv()).await
    {
        write_event(&mut stdout, &topic, &payload).await?;
    }

    Ok(())
}

async fn write_event(
    stdout: &mut tokio::io::Stdout,
    topic: &str,
    payload: &AccessibilityStatus,
) -> Result<()> {
    let line = serde_json::to_string(&json!({"event": topic, "payload": payload}))?;
    stdout.write_all(line.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}

/// `None` means no response line at all: blank input, or an action that
/// deliberately never resolves.
async fn handle_line(bridge: &Arc<AccessibilityBridge>, line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let request: HostRequest = match serde_json::from_str(trimmed) {
        Ok(request) => request,
        Err(e) => {
            return Some(json!({"id": null, "error": format!("Parse error: {}", e)}).to_string())
        }
    };

    match run_action(bridge, &request.action, &request.args).await {
        Ok(Some(result)) => Some(json!({"id": request.id, "result": result}).to_string()),
        Ok(None) => None,
        Err(e) => Some(json!({"id": request.id, "error": e.to_string()}).to_string()),
    }
}
