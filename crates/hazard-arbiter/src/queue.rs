//! Arbitration queue: the displayed hazard plus the ordered pending list.

use crate::event::{HazardEvent, HazardKind};
use crate::geometry::{self, GeometryOrder};
use crate::priority::{self, PriorityContext, Rank};
use std::collections::VecDeque;

/// What [`ArbitrationQueue::admit`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Shown immediately; any previous hazard was replaced.
    Displayed,
    /// Shown immediately; the previous hazard went to the queue front.
    Preempted,
    /// Queued behind the displayed hazard.
    Enqueued,
}

/// Displayed hazard and pending queue.
///
/// The pending list never holds two entries for the same
/// `(kind, instance)` and never holds the displayed hazard.
#[derive(Debug, Clone, Default)]
pub struct ArbitrationQueue {
    active: Option<HazardEvent>,
    pending: VecDeque<HazardEvent>,
}

impl ArbitrationQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hazard currently displayed.
    pub fn active(&self) -> Option<&HazardEvent> {
        self.active.as_ref()
    }

    /// Kind of the hazard currently displayed.
    pub fn active_kind(&self) -> Option<HazardKind> {
        self.active.as_ref().map(|e| e.hazard_type.kind())
    }

    /// Pending hazards, front first.
    pub fn pending(&self) -> impl Iterator<Item = &HazardEvent> {
        self.pending.iter()
    }

    /// Number of pending hazards.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Admit an event against the displayed hazard.
    pub fn admit(&mut self, event: HazardEvent, ctx: PriorityContext) -> Admission {
        let Some(active) = self.active.as_ref() else {
            self.show(event);
            return Admission::Displayed;
        };

        match priority::rank(&event, active, ctx) {
            Rank::Tie => {
                self.show(event);
                Admission::Displayed
            }
            Rank::AExceeds => {
                let kind = event.hazard_type.kind();
                let forced = kind == HazardKind::RedLightViolation
                    || (ctx.transit_active && kind == HazardKind::VehicleTurning);
                if forced || geometry::compare(&event, active) == GeometryOrder::NewWins {
                    if let Some(previous) = self.active.take() {
                        self.pending.retain(|e| !e.same_instance(&previous));
                        self.pending.push_front(previous);
                    }
                    self.show(event);
                    Admission::Preempted
                } else {
                    self.enqueue(event, ctx);
                    Admission::Enqueued
                }
            }
            Rank::BExceeds => {
                self.enqueue(event, ctx);
                Admission::Enqueued
            }
        }
    }

    fn show(&mut self, event: HazardEvent) {
        self.pending.retain(|e| !e.same_instance(&event));
        self.active = Some(event);
    }

    /// Place an event in priority order.
    ///
    /// A queued entry for the same instance is replaced in place. Otherwise
    /// the event goes before the first entry of a lower tier, or before a
    /// same-tier entry it beats on geometry.
    pub fn enqueue(&mut self, event: HazardEvent, ctx: PriorityContext) {
        if let Some(slot) = self.pending.iter_mut().find(|e| e.same_instance(&event)) {
            *slot = event;
            return;
        }
        let position = self
            .pending
            .iter()
            .position(|queued| match priority::rank(&event, queued, ctx) {
                Rank::AExceeds => true,
                Rank::Tie => geometry::compare(&event, queued) == GeometryOrder::NewWins,
                Rank::BExceeds => false,
            })
            .unwrap_or(self.pending.len());
        self.pending.insert(position, event);
    }

    /// End the displayed hazard and promote the queue front.
    ///
    /// Returns the newly displayed hazard.
    pub fn display_next(&mut self) -> Option<&HazardEvent> {
        self.active = self.pending.pop_front();
        self.active.as_ref()
    }

    /// Drop every queued entry of `kind`.
    pub fn remove_kind(&mut self, kind: HazardKind) {
        self.pending.retain(|e| e.hazard_type.kind() != kind);
    }

    /// Drop the displayed hazard and everything pending.
    pub fn clear(&mut self) {
        self.active = None;
        self.pending.clear();
    }
}
