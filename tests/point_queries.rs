//! Point-query semantics: fresh round-trips, platform gating, tolerant
//! failure.

mod common;

use axbridge::capability::{Capability, Platform};
use common::{harness, harness_without_engine};

#[tokio::test]
async fn test_every_query_is_a_fresh_round_trip() {
    let h = harness_without_engine(Platform::Ios);
    h.adapter.set_value(Capability::ReduceMotion, true);

    assert!(h.bridge.is_reduce_motion_enabled().await);
    h.adapter.set_value(Capability::ReduceMotion, false);
    assert!(!h.bridge.is_reduce_motion_enabled().await);

    assert_eq!(
        h.adapter.queries(),
        vec![Capability::ReduceMotion, Capability::ReduceMotion]
    );
}

#[tokio::test]
async fn test_unsupported_capabilities_resolve_false_without_native_calls() {
    let h = harness_without_engine(Platform::Android);
    // Even if the adapter would say yes, the platform gate answers first.
    h.adapter.set_value(Capability::GuidedAccess, true);
    h.adapter.set_value(Capability::HighContrast, true);

    assert!(!h.bridge.is_guided_access_enabled().await);
    assert!(!h.bridge.is_high_contrast_enabled().await);
    assert!(!h.bridge.is_switch_control_running().await);
    assert!(h.adapter.queries().is_empty());
}

#[tokio::test]
async fn test_screen_reader_aliases_gate_by_platform() {
    let ios = harness_without_engine(Platform::Ios);
    ios.adapter.set_value(Capability::ScreenReader, true);
    assert!(ios.bridge.is_voice_over_running().await);
    assert!(!ios.bridge.is_talk_back_running().await);

    let android = harness_without_engine(Platform::Android);
    android.adapter.set_value(Capability::ScreenReader, true);
    assert!(!android.bridge.is_voice_over_running().await);
    assert!(android.bridge.is_talk_back_running().await);

    // The refused alias never reaches the adapter.
    assert_eq!(android.adapter.queries(), vec![Capability::ScreenReader]);
}

#[tokio::test]
async fn test_provider_failure_reads_as_false() {
    let h = harness_without_engine(Platform::Ios);
    h.adapter.set_value(Capability::ScreenReader, true);
    h.adapter.fail_queries(true);

    assert!(!h.bridge.is_screen_reader_running().await);

    h.adapter.fail_queries(false);
    assert!(h.bridge.is_screen_reader_running().await);
}

#[tokio::test]
async fn test_high_contrast_scheme_only_reported_while_enabled() {
    let h = harness_without_engine(Platform::Windows);
    h.adapter.set_scheme(Some("High Contrast White"));

    assert_eq!(h.bridge.get_high_contrast_scheme().await, None);

    h.adapter.set_value(Capability::HighContrast, true);
    assert_eq!(
        h.bridge.get_high_contrast_scheme().await.as_deref(),
        Some("High Contrast White")
    );
}

#[tokio::test]
async fn test_screen_reader_query_syncs_the_assistive_engine() {
    let h = harness(Platform::Android);
    h.adapter.set_value(Capability::ScreenReader, true);

    assert!(h.bridge.is_screen_reader_running().await);
    assert_eq!(h.engine.activations(), vec![true]);

    h.adapter.set_value(Capability::ScreenReader, false);
    assert!(!h.bridge.is_screen_reader_running().await);
    assert_eq!(h.engine.activations(), vec![true, false]);
}

#[tokio::test]
async fn test_engine_sync_is_an_android_concern() {
    let h = harness(Platform::Ios);
    h.adapter.set_value(Capability::ScreenReader, true);

    assert!(h.bridge.is_screen_reader_running().await);
    assert!(h.engine.activations().is_empty());
}
