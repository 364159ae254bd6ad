//! Session runtime tests on tokio's paused clock.

use hazard_arbiter::prelude::*;
use hazard_display_service::{Session, feed_lines};
use std::time::Duration;
use tokio::time::Instant;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn hazard_line(app_id: u64, code: &str, instance: &str, severity: u8) -> String {
    format!(
        r#"{{"header":{{"type":"Alert","subtype":"Application"}},"payload":{{"AppId":{app_id},"EventCode":"{code}","EventID":"{instance}","Severity":{severity}}}}}"#
    )
}

fn arbiter() -> Result<HazardArbiter, ArbiterError> {
    HazardArbiter::new(ArbiterConfig::default())
}

/// A transit zone clears itself once its dwell elapses on the runtime clock.
#[tokio::test(start_paused = true)]
async fn test_zone_dwell_expires_on_runtime_clock() -> TestResult {
    let (handle, mut dispatches) = Session::spawn(arbiter()?, 8);
    let start = Instant::now();

    handle.connect().await?;
    let connected = dispatches.recv().await.ok_or("session closed")?;
    assert_eq!(
        connected.display.map(|d| d.surface_image),
        Some(Image::SystemReady)
    );

    handle.message(hazard_line(8, "32", "p-1", 2)).await?;
    let shown = dispatches.recv().await.ok_or("session closed")?;
    assert_eq!(
        shown.display.map(|d| d.visible_zones),
        Some(vec![Image::TransitWarningZone5])
    );

    // The paused clock jumps straight to the zone deadline.
    let cleared = dispatches.recv().await.ok_or("session closed")?;
    assert!(start.elapsed() >= Duration::from_millis(2_000));
    assert_eq!(
        cleared
            .transitions
            .iter()
            .map(|t| t.post_state)
            .collect::<Vec<_>>(),
        vec![Image::TransitVehicleBase]
    );

    let arbiter = handle.shutdown().await?;
    assert_eq!(arbiter.armed_timers(), 0);
    Ok(())
}

/// Commands are applied in order and the arbiter comes back on shutdown.
#[tokio::test(start_paused = true)]
async fn test_shutdown_returns_arbiter_state() -> TestResult {
    let (handle, mut dispatches) = Session::spawn(arbiter()?, 8);

    handle.connect().await?;
    handle.message(hazard_line(14, "36", "rl-1", 1)).await?;
    handle.message("garbage").await?;
    handle.message(hazard_line(8, "32", "p-1", 2)).await?;

    dispatches.recv().await.ok_or("session closed")?;
    let red_light = dispatches.recv().await.ok_or("session closed")?;
    assert_eq!(
        red_light.audio,
        Some(AudioDirective::Play(SoundCue::BrakeLightWarning))
    );

    let arbiter = handle.shutdown().await?;
    assert_eq!(
        arbiter.active().map(|e| e.hazard_type),
        Some(HazardType::RedLightViolation)
    );
    assert_eq!(arbiter.pending().count(), 1);
    Ok(())
}

/// Suppression changes go through the same channel as messages.
#[tokio::test(start_paused = true)]
async fn test_flags_and_disconnect() -> TestResult {
    let (handle, mut dispatches) = Session::spawn(arbiter()?, 8);
    handle.connect().await?;
    dispatches.recv().await.ok_or("session closed")?;

    handle
        .set_flags(SuppressionFlags {
            sound_notifications: false,
            ..SuppressionFlags::default()
        })
        .await?;
    handle.message(hazard_line(14, "36", "rl-1", 2)).await?;
    let silent = dispatches.recv().await.ok_or("session closed")?;
    assert_eq!(silent.audio, None);
    assert_eq!(
        silent.display.map(|d| d.surface_image),
        Some(Image::RedLightWarning)
    );

    handle.disconnect().await?;
    let splash = dispatches.recv().await.ok_or("session closed")?;
    assert_eq!(
        splash.display,
        Some(DisplayDirective::surface(Image::Splash))
    );

    let arbiter = handle.shutdown().await?;
    assert!(!arbiter.is_connected());
    Ok(())
}

/// Blank lines are skipped when feeding a stream.
#[tokio::test(start_paused = true)]
async fn test_feed_lines_skips_blank_lines() -> TestResult {
    let (handle, mut dispatches) = Session::spawn(arbiter()?, 8);
    handle.connect().await?;

    let input = format!("\n{}\n   \n", hazard_line(2, "1", "fcw-1", 2));
    let forwarded = feed_lines(input.as_bytes(), &handle).await?;
    assert_eq!(forwarded, 1);

    dispatches.recv().await.ok_or("session closed")?;
    let warning = dispatches.recv().await.ok_or("session closed")?;
    assert_eq!(
        warning.display.map(|d| d.surface_image),
        Some(Image::ForwardCollisionWarning)
    );
    handle.shutdown().await?;
    Ok(())
}
