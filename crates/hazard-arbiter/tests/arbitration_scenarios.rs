//! End-to-end arbitration scenarios driven through the public API.

use hazard_arbiter::prelude::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const BUS: HazardType = HazardType::TransitStopPedestrian(TransitVariant::Vehicle);

fn connected() -> Result<HazardArbiter, ArbiterError> {
    let mut arbiter = HazardArbiter::new(ArbiterConfig::default())?;
    arbiter.connect(0);
    Ok(arbiter)
}

fn event(hazard_type: HazardType, code: &str, instance: &str, severity: u8) -> HazardEvent {
    HazardEvent::new(hazard_type, code)
        .with_instance(instance)
        .with_severity(severity)
}

fn logged(dispatch: &Dispatch) -> Vec<(Image, Image)> {
    dispatch
        .transitions
        .iter()
        .map(|t| (t.pre_state, t.post_state))
        .collect()
}

/// A transit zone warning waits behind a red-light alert and is drawn the
/// moment the red light clears.
#[test]
fn test_transit_zone_waits_for_red_light() -> TestResult {
    let mut arbiter = connected()?;

    // Step 1: red light is displayed
    let dispatch = arbiter.handle_event(event(HazardType::RedLightViolation, "36", "rl-1", 1), 10);
    assert_eq!(
        dispatch.audio,
        Some(AudioDirective::Play(SoundCue::BrakeLightWarning))
    );

    // Step 2: the transit warning is outranked and queued silently
    let dispatch = arbiter.handle_event(event(BUS, "32", "p-1", 2), 20);
    assert!(dispatch.is_empty());
    assert_eq!(arbiter.pending().count(), 1);

    // Step 3: red light clears and the queued warning takes over
    let dispatch = arbiter.handle_event(event(HazardType::RedLightViolation, "36", "rl-1", 0), 30);
    let display = dispatch.display.as_ref().ok_or("expected a display directive")?;
    assert_eq!(display.surface_image, Image::TransitVehicleBase);
    assert_eq!(display.visible_zones, vec![Image::TransitWarningZone5]);
    assert_eq!(
        dispatch.audio,
        Some(AudioDirective::Play(SoundCue::TransitWarningRoad))
    );
    assert_eq!(
        logged(&dispatch),
        vec![
            (Image::RedLightAlert, Image::SystemReady),
            (Image::TransitVehicleBase, Image::TransitWarningZone5),
        ]
    );
    let source = dispatch
        .transitions
        .last()
        .and_then(|t| t.source.as_ref())
        .ok_or("expected a transition source")?;
    assert_eq!(source.hazard_type, BUS);
    assert_eq!(source.instance_id, "p-1");

    // Step 4: only the zone timer is left
    assert_eq!(arbiter.armed_timers(), 1);
    assert_eq!(arbiter.next_deadline(), Some(2_030));
    Ok(())
}

/// A transit zone disappears after its dwell with exactly one log entry.
#[test]
fn test_transit_zone_dwell_expiry() -> TestResult {
    let mut arbiter = connected()?;
    arbiter.handle_event(event(BUS, "32", "p-1", 2), 0);

    assert!(arbiter.advance(1_999).is_empty());

    let dispatches = arbiter.advance(2_000);
    assert_eq!(dispatches.len(), 1);
    let dispatch = dispatches.first().ok_or("expected a dispatch")?;
    assert_eq!(
        logged(dispatch),
        vec![(Image::TransitWarningZone5, Image::TransitVehicleBase)]
    );
    let display = dispatch.display.as_ref().ok_or("expected a display directive")?;
    assert_eq!(display.surface_image, Image::TransitVehicleBase);
    assert!(display.visible_zones.is_empty());
    Ok(())
}

/// Climbing the rail ladder sounds, holding or descending does not.
#[test]
fn test_rail_crossing_ladder_cues() -> TestResult {
    let mut arbiter = connected()?;

    // Step 1: system available
    let dispatch = arbiter.handle_event(event(HazardType::RailCrossing, "41", "", 1), 0);
    assert_eq!(dispatch.audio, Some(AudioDirective::Play(SoundCue::RailInform)));
    assert_eq!(arbiter.rail_rung(), Rung::Available);

    // Step 2: approach warning blinks and warns
    let dispatch = arbiter.handle_event(event(HazardType::RailCrossing, "43", "", 1), 2_000);
    assert_eq!(dispatch.audio, Some(AudioDirective::Play(SoundCue::RailWarning)));
    let display = dispatch.display.ok_or("expected a display directive")?;
    assert_eq!(display.surface_image, Image::RailApproachWarning1);
    assert_eq!(display.blink_interval_ms, Some(500));

    // Step 3: a lower flag under a higher one changes nothing
    let dispatch = arbiter.handle_event(event(HazardType::RailCrossing, "42", "", 1), 4_000);
    assert!(dispatch.is_empty());
    assert_eq!(arbiter.rail_rung(), Rung::ApproachWarning);

    // Step 4: dropping the warning descends quietly
    let dispatch = arbiter.handle_event(event(HazardType::RailCrossing, "43", "", 0), 5_000);
    assert_eq!(dispatch.audio, None);
    assert_eq!(arbiter.rail_rung(), Rung::ApproachInform);
    assert_eq!(
        logged(&dispatch),
        vec![(Image::RailApproachWarning1, Image::RailApproachInform)]
    );
    assert_eq!(arbiter.current_display().blink_interval_ms, None);

    // Step 5: the ladder dwell returns to idle
    let dispatches = arbiter.advance(15_000);
    assert_eq!(arbiter.rail_rung(), Rung::Idle);
    assert_eq!(arbiter.surface_image(), Image::SystemReady);
    assert_eq!(dispatches.len(), 1);
    Ok(())
}

/// Every rung climb sounds even while the previous inform cue is still held.
#[test]
fn test_rail_climb_inside_hold_window_sounds_again() -> TestResult {
    let mut arbiter = connected()?;
    let inform = Some(AudioDirective::Play(SoundCue::RailInform));

    // Step 1: available, approach inform and unavailable share one cue
    let dispatch = arbiter.handle_event(event(HazardType::RailCrossing, "41", "", 1), 10);
    assert_eq!(dispatch.audio, inform);

    let dispatch = arbiter.handle_event(event(HazardType::RailCrossing, "42", "", 1), 500);
    assert_eq!(arbiter.rail_rung(), Rung::ApproachInform);
    assert_eq!(dispatch.audio, inform);

    let dispatch = arbiter.handle_event(event(HazardType::RailCrossing, "45", "", 1), 900);
    assert_eq!(arbiter.rail_rung(), Rung::Unavailable);
    assert_eq!(dispatch.audio, inform);

    // Step 2: a flag below the current rung stays quiet
    let dispatch = arbiter.handle_event(event(HazardType::RailCrossing, "41", "", 1), 1_000);
    assert_eq!(dispatch.audio, None);
    Ok(())
}

/// Skipping straight from available to unavailable still sounds.
#[test]
fn test_rail_available_to_unavailable_inside_hold_window() -> TestResult {
    let mut arbiter = connected()?;
    arbiter.handle_event(event(HazardType::RailCrossing, "41", "", 1), 0);

    let dispatch = arbiter.handle_event(
        event(HazardType::RailCrossing, "45", "", 1).with_text("Sensor fault"),
        300,
    );
    assert_eq!(dispatch.audio, Some(AudioDirective::Play(SoundCue::RailInform)));
    let display = dispatch.display.ok_or("expected a display directive")?;
    assert_eq!(display.bottom_banner_text.as_deref(), Some("Sensor fault"));
    Ok(())
}

/// A forward-collision caution escalates to a warning without waiting.
#[test]
fn test_forward_collision_escalates_inside_hold_window() -> TestResult {
    let mut arbiter = connected()?;

    let dispatch = arbiter.handle_event(event(HazardType::ForwardCollision, "1", "f1", 1), 0);
    assert_eq!(
        dispatch.audio,
        Some(AudioDirective::Play(SoundCue::CautionVehicleAhead))
    );

    let dispatch = arbiter.handle_event(event(HazardType::ForwardCollision, "1", "f1", 2), 200);
    assert_eq!(
        dispatch.audio,
        Some(AudioDirective::Play(SoundCue::ForwardCollision))
    );
    assert_eq!(arbiter.surface_image(), Image::ForwardCollisionWarning);

    // a repeat of the warning is not a rise
    let dispatch = arbiter.handle_event(event(HazardType::ForwardCollision, "1", "f1", 2), 400);
    assert_eq!(dispatch.audio, None);
    Ok(())
}

/// A pedestrian moving from caution to warning sounds the warning at once.
#[test]
fn test_pedestrian_escalates_inside_hold_window() -> TestResult {
    let mut arbiter = connected()?;
    arbiter.handle_event(event(HazardType::PedestrianCrossing, "3", "x", 0), 0);

    let dispatch = arbiter.handle_event(event(HazardType::PedestrianCrossing, "6", "p1", 1), 100);
    assert_eq!(
        dispatch.audio,
        Some(AudioDirective::Play(SoundCue::EpcwCautionNear))
    );

    let dispatch = arbiter.handle_event(event(HazardType::PedestrianCrossing, "6", "p1", 2), 400);
    assert_eq!(
        dispatch.audio,
        Some(AudioDirective::Play(SoundCue::EpcwWarningNear))
    );
    Ok(())
}

/// The composite pedestrian picture does not depend on report order.
#[test]
fn test_pedestrian_composite_is_order_independent() -> TestResult {
    let near = event(HazardType::PedestrianCrossing, "6", "p1", 1);
    let right = event(HazardType::PedestrianCrossing, "9", "p2", 2);

    let mut first = connected()?;
    first.handle_event(event(HazardType::PedestrianCrossing, "3", "x", 0), 0);
    first.handle_event(near.clone(), 100);
    first.handle_event(right.clone(), 200);

    let mut second = connected()?;
    second.handle_event(event(HazardType::PedestrianCrossing, "3", "x", 0), 0);
    second.handle_event(right, 100);
    second.handle_event(near, 200);

    assert_eq!(first.current_display(), second.current_display());
    assert_eq!(
        first.current_display().visible_zones,
        vec![Image::EpcwCautionNear, Image::EpcwWarningRight]
    );
    assert_eq!(
        first.pedestrian().combination_cue(),
        Some(SoundCue::EpcwWarningRight)
    );
    assert_eq!(
        first.pedestrian().combination_cue(),
        second.pedestrian().combination_cue()
    );
    Ok(())
}

/// Losing the session wipes every hazard and shows the splash.
#[test]
fn test_disconnect_clears_everything() -> TestResult {
    let mut arbiter = connected()?;
    arbiter.handle_event(event(HazardType::PedestrianCrossing, "3", "x", 0), 0);
    arbiter.handle_event(event(HazardType::PedestrianCrossing, "7", "p1", 2), 50);
    arbiter.handle_event(event(HazardType::RedLightViolation, "36", "rl-1", 2), 100);
    arbiter.handle_event(event(HazardType::RailCrossing, "43", "", 1), 150);
    assert!(arbiter.armed_timers() > 0);

    let dispatch = arbiter.disconnect(200);

    assert_eq!(
        dispatch.display,
        Some(DisplayDirective::surface(Image::Splash))
    );
    assert_eq!(dispatch.audio, Some(AudioDirective::Stop));
    assert!(!arbiter.is_connected());
    assert!(arbiter.active().is_none());
    assert_eq!(arbiter.pending().count(), 0);
    assert_eq!(arbiter.armed_timers(), 0);
    assert_eq!(arbiter.rail_rung(), Rung::Idle);
    assert!(!arbiter.pedestrian().any_occupied());
    assert!(arbiter.advance(60_000).is_empty());

    let dispatch = arbiter.connect(70_000);
    assert_eq!(
        dispatch.display,
        Some(DisplayDirective::surface(Image::SystemReady))
    );
    Ok(())
}

/// Suppressed output is withheld while state keeps moving.
#[test]
fn test_suppression_withholds_output_but_tracks_state() -> TestResult {
    let screen_off = SuppressionFlags {
        screen_notifications: false,
        ..SuppressionFlags::default()
    };
    let mut arbiter = HazardArbiter::with_flags(ArbiterConfig::default(), screen_off)?;
    assert_eq!(arbiter.connect(0).display, None);

    // Step 1: audio still leaves, display and log do not
    let dispatch = arbiter.handle_event(event(HazardType::RedLightViolation, "36", "rl-1", 1), 10);
    assert_eq!(dispatch.display, None);
    assert!(dispatch.transitions.is_empty());
    assert_eq!(
        dispatch.audio,
        Some(AudioDirective::Play(SoundCue::BrakeLightWarning))
    );
    assert_eq!(arbiter.surface_image(), Image::RedLightAlert);

    // Step 2: re-enabling the screen sends the current frame
    let dispatch = arbiter.set_flags(SuppressionFlags::default(), 20);
    assert_eq!(
        dispatch.display.map(|d| d.surface_image),
        Some(Image::RedLightAlert)
    );

    // Step 3: maintenance mode silences everything
    let maintenance = SuppressionFlags {
        maintenance_mode: true,
        ..SuppressionFlags::default()
    };
    arbiter.set_flags(maintenance, 30);
    let dispatch = arbiter.handle_event(event(HazardType::RedLightViolation, "36", "rl-1", 2), 40);
    assert!(dispatch.is_empty());
    assert_eq!(arbiter.surface_image(), Image::RedLightWarning);
    Ok(())
}

/// Raw envelopes drive the same path as typed events.
#[test]
fn test_raw_envelope_round_trip() -> TestResult {
    let mut arbiter = connected()?;
    let raw = r#"{
        "header": { "type": "Alert", "subtype": "Application" },
        "payload": {
            "AppId": "13",
            "EventCode": "34",
            "EventID": "p-9",
            "Severity": 2,
            "InteractionId": "ix-4"
        }
    }"#;

    let dispatch = arbiter.handle_message(raw, 0);

    let display = dispatch.display.ok_or("expected a display directive")?;
    assert_eq!(display.surface_image, Image::TransitPovBase);
    assert_eq!(display.visible_zones, vec![Image::PovWarning]);
    let source = dispatch
        .transitions
        .first()
        .and_then(|t| t.source.as_ref())
        .ok_or("expected a transition source")?;
    assert_eq!(source.correlation_id, "ix-4");
    Ok(())
}
