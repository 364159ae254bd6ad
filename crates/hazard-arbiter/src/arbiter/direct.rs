//! Hazard types drawn straight from their sub-state, bypassing the queue.

use super::{Cycle, HazardArbiter};
use crate::assets::{Image, SoundCue};
use crate::event::{HazardEvent, HazardKind};
use crate::substate::{CurveSpeedCode, RailChange, Rung};
use crate::timer::TimerKey;

impl HazardArbiter {
    pub(super) fn forward_collision(&mut self, event: &HazardEvent, now_ms: u64, cycle: &mut Cycle) {
        match event.severity {
            0 => {}
            1 => {
                self.show_timed(event, Image::ForwardCollisionCaution, now_ms, cycle);
                if self.forward.raise(1) {
                    cycle.audio.escalate(SoundCue::CautionVehicleAhead);
                }
            }
            2 => {
                self.show_timed(event, Image::ForwardCollisionWarning, now_ms, cycle);
                if self.forward.raise(2) {
                    cycle.audio.escalate(SoundCue::ForwardCollision);
                }
            }
            _ => self.show_surface(self.background, cycle),
        }
    }

    pub(super) fn brake_light(&mut self, event: &HazardEvent, now_ms: u64, cycle: &mut Cycle) {
        match event.severity {
            0 => self.show_timed(event, Image::ForwardCollisionBase, now_ms, cycle),
            1 | 2 => {
                self.show_timed(event, Image::BrakeLight, now_ms, cycle);
                if self.brake.raise(2) {
                    cycle.audio.escalate(SoundCue::BrakeLight);
                }
            }
            _ => self.show_surface(self.background, cycle),
        }
    }

    pub(super) fn curve_speed(&mut self, event: &HazardEvent, now_ms: u64, cycle: &mut Cycle) {
        let Some(code) = CurveSpeedCode::parse(&event.event_code) else {
            tracing::debug!(code = %event.event_code, "unknown curve-speed event code");
            return;
        };

        match code {
            CurveSpeedCode::Advisory => match event.severity {
                0 => self.show_timed(event, Image::CurveSpeedInfo, now_ms, cycle),
                1 => {
                    self.show_timed(event, Image::CurveSpeedAlert, now_ms, cycle);
                    if self.curve.raise(1) {
                        cycle.audio.escalate(SoundCue::BrakeLight);
                    }
                }
                2 => {
                    self.show_timed(event, Image::CurveSpeedWarning, now_ms, cycle);
                    if self.curve.raise(2) {
                        cycle.audio.escalate(SoundCue::ForwardCollision);
                    }
                }
                other => tracing::debug!(severity = other, "invalid curve-speed severity"),
            },
            CurveSpeedCode::AreaEntered => {
                if self.curve.enter() {
                    self.show_surface(Image::CurveSpeedBase, cycle);
                }
            }
            CurveSpeedCode::AreaExited => {
                self.curve.exit();
                self.timers.cancel_where(|key| {
                    matches!(key, TimerKey::Instance(HazardKind::CurveSpeed, _))
                });
                self.show_surface(self.background, cycle);
            }
        }
    }

    pub(super) fn rail_crossing(&mut self, event: &HazardEvent, now_ms: u64, cycle: &mut Cycle) {
        if !self.rail.apply(event) {
            tracing::debug!(code = %event.event_code, "unknown rail-crossing event code");
            return;
        }

        if let Some(change) = self.rail.update() {
            self.apply_rail_change(change, now_ms, cycle);
        }

        let key = TimerKey::Episode(HazardKind::RailCrossing);
        match self.config.rail_dwell_ms {
            Some(dwell_ms) if self.rail.rung() != Rung::Idle => {
                self.timers.arm(key, now_ms, dwell_ms);
            }
            _ => {
                self.timers.cancel(&key);
            }
        }
    }

    /// Draw a new ladder state.
    pub(super) fn apply_rail_change(&mut self, change: RailChange, now_ms: u64, cycle: &mut Cycle) {
        tracing::debug!(from = ?change.from, to = ?change.to, "rail-crossing rung changed");

        let image = if change.to == Rung::Idle {
            self.background
        } else {
            change.render.image
        };
        let previous = self.set_surface(image);
        if let Some(alt) = change.render.blink_alt {
            self.start_surface_blink(image, alt, now_ms);
        }
        self.banner = change.render.banner;

        if change.from != change.to {
            cycle.log(previous, image);
        }
        if let Some(cue) = change.cue {
            cycle.audio.escalate(cue);
        }
    }
}
