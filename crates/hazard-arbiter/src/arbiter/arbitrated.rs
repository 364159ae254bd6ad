//! Hazard types that compete for the display through the arbitration queue.

use super::{Cycle, HazardArbiter};
use crate::assets::{Image, SoundCue};
use crate::blink::{BlinkMachine, BlinkTarget};
use crate::directive::HazardSource;
use crate::event::{HazardEvent, HazardKind, HazardType};
use crate::priority::PriorityContext;
use crate::queue::Admission;
use crate::substate::{
    PedestrianCode, PedestrianUpdate, TransitCode, TurningCode, transit_base, zone_asset,
};
use crate::timer::TimerKey;

const RED_LIGHT_CODE: &str = "36";

impl HazardArbiter {
    /// Update sub-state, then admit the event against the displayed hazard.
    pub(super) fn arbitrate(&mut self, event: HazardEvent, now_ms: u64, cycle: &mut Cycle) {
        if !self.pre_update(&event) {
            return;
        }

        let ctx = PriorityContext {
            transit_active: self.transit.is_active(),
        };
        let admission = self.queue.admit(event.clone(), ctx);
        tracing::debug!(
            hazard = %event.hazard_type,
            instance = %event.instance_id,
            admission = ?admission,
            pending = self.queue.pending_len(),
            "arbitrated"
        );
        match admission {
            Admission::Displayed | Admission::Preempted => self.present(&event, now_ms, cycle),
            Admission::Enqueued => {}
        }
    }

    /// Sub-state updates that happen whether or not the event wins the display.
    ///
    /// Returns `false` when the event is to be dropped.
    fn pre_update(&mut self, event: &HazardEvent) -> bool {
        match event.hazard_type.kind() {
            HazardKind::PedestrianCrossing => {
                let displayed = self.queue.active_kind();
                self.pedestrian.apply(event, displayed) == PedestrianUpdate::Proceed
            }
            HazardKind::VehicleTurning => match TurningCode::parse(&event.event_code) {
                Some(TurningCode::AreaEntered) => {
                    self.turning.enter();
                    true
                }
                Some(TurningCode::AreaExited) => {
                    self.turning.exit();
                    true
                }
                Some(_) => true,
                None => {
                    tracing::debug!(code = %event.event_code, "unknown vehicle-turning event code");
                    false
                }
            },
            HazardKind::TransitStopPedestrian => {
                let known = TransitCode::parse(&event.event_code).is_some();
                if !known {
                    tracing::debug!(code = %event.event_code, "unknown transit-stop event code");
                }
                known
            }
            HazardKind::RedLightViolation => {
                let known = event.event_code == RED_LIGHT_CODE;
                if !known {
                    tracing::debug!(code = %event.event_code, "unknown red-light event code");
                }
                known
            }
            _ => true,
        }
    }

    /// Draw a hazard that has just become the displayed one.
    pub(super) fn present(&mut self, event: &HazardEvent, now_ms: u64, cycle: &mut Cycle) {
        cycle.source = Some(HazardSource::from(event));
        let kind = event.hazard_type.kind();
        if kind != HazardKind::TransitStopPedestrian {
            self.clear_transit_zones(cycle);
            self.banner = None;
        }
        if kind != HazardKind::PedestrianCrossing {
            self.hide_pedestrian();
        }

        match event.hazard_type {
            HazardType::PedestrianCrossing => self.present_pedestrian(event, now_ms, cycle),
            HazardType::VehicleTurning => self.present_turning(event, now_ms, cycle),
            HazardType::TransitStopPedestrian(_) => self.present_transit(event, now_ms, cycle),
            HazardType::RedLightViolation => self.present_red_light(event, now_ms, cycle),
            other => tracing::warn!(hazard = %other, "hazard type is not arbitrated"),
        }
    }

    /// End the displayed hazard and show the next queued one, or the background.
    pub(super) fn display_next(&mut self, now_ms: u64, cycle: &mut Cycle) {
        match self.queue.display_next().cloned() {
            Some(next) => {
                tracing::debug!(
                    hazard = %next.hazard_type,
                    instance = %next.instance_id,
                    "promoting queued hazard"
                );
                self.present(&next, now_ms, cycle);
            }
            None => {
                self.hide_pedestrian();
                self.set_surface(self.background);
            }
        }
    }

    /// Leave an area episode: drop its queued events and move on.
    fn end_episode(&mut self, kind: HazardKind, now_ms: u64, cycle: &mut Cycle) {
        self.queue.remove_kind(kind);
        if self.queue.active_kind() == Some(kind) {
            self.display_next(now_ms, cycle);
        }
    }

    fn clear_transit_zones(&mut self, cycle: &mut Cycle) {
        for (pre, post) in self.transit.clear_all(self.background) {
            cycle.log(pre, post);
        }
        self.timers.cancel_where(|key| matches!(key, TimerKey::Zone(_)));
    }

    fn present_pedestrian(&mut self, event: &HazardEvent, now_ms: u64, cycle: &mut Cycle) {
        let Some(code) = PedestrianCode::parse(&event.event_code) else {
            return;
        };
        self.timers.arm(
            TimerKey::Episode(HazardKind::PedestrianCrossing),
            now_ms,
            self.config.epcw_episode_dwell_ms,
        );

        match code {
            PedestrianCode::AreaEntered => {
                self.show_surface(Image::EpcwBase, cycle);
                self.refresh_pedestrian(false, now_ms, cycle);
            }
            PedestrianCode::AreaExited => {
                self.timers
                    .cancel(&TimerKey::Episode(HazardKind::PedestrianCrossing));
                self.clear_pedestrian(now_ms, cycle);
            }
            PedestrianCode::Detected => {}
            PedestrianCode::Direction(dir) => {
                let audible = self.pedestrian.slot_severity(dir) != 0;
                self.refresh_pedestrian(audible, now_ms, cycle);
            }
            PedestrianCode::AlertComplete => {
                cycle.audio.stop();
                self.refresh_pedestrian(false, now_ms, cycle);
            }
            PedestrianCode::InArea => {
                if !self.pedestrian.any_occupied() {
                    self.show_surface(Image::EpcwBase, cycle);
                }
                self.refresh_pedestrian(false, now_ms, cycle);
            }
        }
    }

    /// Redraw the direction overlays from the slots.
    fn refresh_pedestrian(&mut self, audible: bool, now_ms: u64, cycle: &mut Cycle) {
        let frame = self.pedestrian.compose();
        for (pre, post) in frame.transitions {
            cycle.log(pre, post);
        }

        if self.pedestrian.any_occupied() {
            if !self.pedestrian_shown || self.overlay_blink.is_none() {
                self.overlay_blink = Some(BlinkMachine::start(
                    BlinkTarget::Overlays,
                    self.config.epcw_blink_interval_ms,
                    now_ms,
                ));
            }
            self.pedestrian_shown = true;
            self.set_surface(Image::EpcwBase);
            if audible && let Some(cue) = frame.cue {
                cycle.audio.propose(cue);
            }
        } else if self.pedestrian_shown {
            self.hide_pedestrian();
            self.set_surface(Image::EpcwBase);
        }
    }

    /// Drop every slot and end the crossing episode.
    ///
    /// The surface only falls back to the background when the crossing owns
    /// it; another hazard on display stays where it is.
    pub(super) fn clear_pedestrian(&mut self, now_ms: u64, cycle: &mut Cycle) {
        let changes = self.pedestrian.clear();
        self.hide_pedestrian();
        match self.queue.active_kind() {
            None | Some(HazardKind::PedestrianCrossing) => {
                for (pre, post) in changes {
                    cycle.log(pre, post);
                }
                self.show_surface(self.background, cycle);
            }
            Some(active) => {
                tracing::debug!(active = ?active, "crossing episode ended behind another hazard");
            }
        }
        self.end_episode(HazardKind::PedestrianCrossing, now_ms, cycle);
    }

    fn present_turning(&mut self, event: &HazardEvent, now_ms: u64, cycle: &mut Cycle) {
        let Some(code) = TurningCode::parse(&event.event_code) else {
            return;
        };
        let active = self.turning.is_active();

        match (code, event.severity) {
            (TurningCode::AreaEntered, _) => {
                self.background = Image::TurningBase;
                self.show_surface(Image::TurningBase, cycle);
            }
            (TurningCode::AreaExited, _) => {
                self.background = Image::SystemReady;
                self.show_surface(Image::SystemReady, cycle);
                self.timers.cancel_where(|key| {
                    matches!(key, TimerKey::Instance(HazardKind::VehicleTurning, _))
                });
                self.end_episode(HazardKind::VehicleTurning, now_ms, cycle);
            }
            (TurningCode::AheadLeft, 0) if active => {
                self.show_surface(Image::TurningBase, cycle);
            }
            (TurningCode::AheadLeft | TurningCode::TurningCaution, 1) if active => {
                self.show_timed(event, Image::TurningCaution, now_ms, cycle);
                if self.turning.raise(1) {
                    cycle.audio.escalate(SoundCue::CautionVehicleLeft);
                }
            }
            (TurningCode::TurningWarning, 2) if active => {
                self.show_timed(event, Image::TurningWarning, now_ms, cycle);
                if self.turning.raise(2) {
                    cycle.audio.escalate(SoundCue::CautionVehicleCrossing);
                }
            }
            (code, severity) => {
                tracing::debug!(
                    code = ?code,
                    severity,
                    active,
                    "vehicle-turning event has nothing to show"
                );
            }
        }
    }

    fn present_transit(&mut self, event: &HazardEvent, now_ms: u64, cycle: &mut Cycle) {
        let HazardType::TransitStopPedestrian(variant) = event.hazard_type else {
            return;
        };
        let Some(code) = TransitCode::parse(&event.event_code) else {
            return;
        };
        let base = transit_base(variant);

        match code {
            TransitCode::AreaEntered => {
                self.transit.enter(variant);
                self.background = base;
                self.show_surface(base, cycle);
                self.banner = Some(event.free_text.clone()).filter(|t| !t.is_empty());
                self.clear_transit_zones(cycle);
            }
            TransitCode::AreaExited => {
                self.transit.exit();
                self.clear_transit_zones(cycle);
                self.banner = None;
                self.background = Image::SystemReady;
                self.show_surface(Image::SystemReady, cycle);
                self.end_episode(HazardKind::TransitStopPedestrian, now_ms, cycle);
            }
            TransitCode::Detected => {}
            TransitCode::AlertComplete | TransitCode::InArea => {
                self.clear_transit_zones(cycle);
                self.banner = None;
            }
            TransitCode::Zone(zone) => {
                let Some(asset) = zone_asset(zone, event.severity, variant) else {
                    tracing::debug!(
                        zone = ?zone,
                        severity = event.severity,
                        "invalid transit zone severity"
                    );
                    return;
                };
                self.background = base;
                self.set_surface(base);
                self.banner = Some(event.free_text.clone()).filter(|t| !t.is_empty());

                let shown = self.transit.show(zone, asset, base);
                if let Some(cue) = shown.cue {
                    cycle.audio.propose(cue);
                }
                if let Some((pre, post)) = shown.transition {
                    cycle.log(pre, post);
                }
                if asset.image.is_some() {
                    self.timers.arm(
                        TimerKey::Zone(zone),
                        now_ms,
                        event.effective_dwell_ms(self.config.transit_zone_dwell_ms),
                    );
                }
            }
        }
    }

    fn present_red_light(&mut self, event: &HazardEvent, now_ms: u64, cycle: &mut Cycle) {
        let (image, cue) = match event.severity {
            0 => {
                self.exit_red_light(now_ms, cycle);
                return;
            }
            1 => (Image::RedLightAlert, SoundCue::BrakeLightWarning),
            2 => (Image::RedLightWarning, SoundCue::BrakeLight),
            other => {
                tracing::debug!(severity = other, "invalid red-light severity");
                return;
            }
        };
        self.background = image;
        self.show_surface(image, cycle);
        cycle.audio.propose(cue);
        self.timers.arm(
            TimerKey::Instance(HazardKind::RedLightViolation, event.instance_id.clone()),
            now_ms,
            event.effective_dwell_ms(self.config.red_light_dwell_ms),
        );
    }

    pub(super) fn exit_red_light(&mut self, now_ms: u64, cycle: &mut Cycle) {
        self.background = Image::SystemReady;
        self.show_surface(Image::SystemReady, cycle);
        self.timers
            .cancel_where(|key| matches!(key, TimerKey::Instance(HazardKind::RedLightViolation, _)));
        self.end_episode(HazardKind::RedLightViolation, now_ms, cycle);
    }
}
