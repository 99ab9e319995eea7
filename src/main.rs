use std::sync::Arc;

use axbridge::bridge::AccessibilityBridge;
use axbridge::capability::Platform;
use axbridge::provider::{MemoryPrefs, NullAdapter};
use axbridge::{config, host, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // Stdout carries the wire protocol; logs go to stderr.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let project_root = std::env::current_dir().ok();
    let settings = config::resolve(project_root.as_deref());

    let (bus, events) = host::ChannelBus::new();
    let bridge = AccessibilityBridge::new(
        Platform::host(),
        settings,
        Arc::new(NullAdapter::new()),
        Arc::new(bus),
        Arc::new(MemoryPrefs::new()),
        None,
    );

    host::run(bridge, events).await
}
