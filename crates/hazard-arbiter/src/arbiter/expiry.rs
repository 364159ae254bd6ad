//! Dwell-timer expiry and blink flips.

use super::{Cycle, HazardArbiter};
use crate::directive::Dispatch;
use crate::event::HazardKind;
use crate::timer::{Expiry, TimerKey};

impl HazardArbiter {
    /// Fire every timer and blink flip due at `now_ms`.
    ///
    /// Timers fire in deadline order, each in its own dispatch cycle at its
    /// own deadline. Empty cycles are dropped.
    pub fn advance(&mut self, now_ms: u64) -> Vec<Dispatch> {
        let mut dispatches = Vec::new();

        while let Some(expiry) = self.timers.pop_expired(now_ms) {
            let at_ms = expiry.deadline_ms;
            let mut cycle = Cycle::default();
            self.expire(expiry, &mut cycle);
            dispatches.push(self.finish(cycle, at_ms));
        }

        let overlay_flipped = self
            .overlay_blink
            .as_mut()
            .is_some_and(|blink| blink.advance(now_ms));
        let surface_flipped = self
            .surface_blink
            .as_mut()
            .is_some_and(|blink| blink.advance(now_ms));
        if overlay_flipped || surface_flipped {
            dispatches.push(self.finish(Cycle::default(), now_ms));
        }

        dispatches.retain(|dispatch| !dispatch.is_empty());
        dispatches
    }

    fn expire(&mut self, expiry: Expiry, cycle: &mut Cycle) {
        let at_ms = expiry.deadline_ms;
        tracing::debug!(key = ?expiry.key, deadline_ms = at_ms, "dwell timer expired");

        match expiry.key {
            TimerKey::Episode(HazardKind::PedestrianCrossing) => {
                self.clear_pedestrian(at_ms, cycle);
            }
            TimerKey::Episode(HazardKind::RailCrossing) => {
                if let Some(change) = self.rail.reset() {
                    self.apply_rail_change(change, at_ms, cycle);
                }
            }
            TimerKey::Episode(kind) => {
                tracing::warn!(hazard = ?kind, "no episode timer behaviour for hazard");
            }
            TimerKey::Zone(zone) => {
                if let Some((pre, post)) = self.transit.clear_zone(zone, self.background) {
                    cycle.log(pre, post);
                }
            }
            TimerKey::Instance(HazardKind::RedLightViolation, instance) => {
                let still_active = self.queue.active().is_some_and(|active| {
                    active.hazard_type.kind() == HazardKind::RedLightViolation
                        && active.instance_id == instance
                });
                if still_active {
                    if let Some(active) = self.queue.active() {
                        cycle.source = Some(active.into());
                    }
                    self.exit_red_light(at_ms, cycle);
                }
            }
            TimerKey::Instance(kind, instance) => {
                let key = TimerKey::Instance(kind, instance);
                if let Some(image) = self.timed.remove(&key)
                    && self.surface_image() == image
                {
                    self.show_surface(self.background, cycle);
                }
                if matches!(
                    kind,
                    HazardKind::ForwardCollision | HazardKind::EmergencyBrakeLight
                ) {
                    let tracker = if kind == HazardKind::ForwardCollision {
                        &mut self.forward
                    } else {
                        &mut self.brake
                    };
                    tracker.exit();
                }
            }
        }
    }
}
