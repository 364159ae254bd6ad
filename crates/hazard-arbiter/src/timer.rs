//! Dwell-timer registry.
//!
//! Single-shot timers on a logical millisecond clock. Each key holds at most
//! one live timer: arming a key cancels whatever was armed for it before.
//! Every arm gets a fresh [`TimerHandle`] so a callback can confirm it is
//! still the timer it was armed as.

use crate::event::HazardKind;
use crate::substate::TransitZone;
use std::collections::BTreeMap;

/// What a dwell timer guards.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKey {
    /// A whole episode of one hazard kind.
    Episode(HazardKind),
    /// One transit-stop zone.
    Zone(TransitZone),
    /// One hazard instance, e.g. a timed image.
    Instance(HazardKind, String),
}

/// Generation stamp of one arming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

/// A timer whose deadline has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expiry {
    /// Key the timer was armed under.
    pub key: TimerKey,
    /// Handle returned when it was armed.
    pub handle: TimerHandle,
    /// Deadline it was armed for.
    pub deadline_ms: u64,
}

#[derive(Debug, Clone, Copy)]
struct ArmedTimer {
    handle: TimerHandle,
    deadline_ms: u64,
}

/// Registry of live dwell timers.
#[derive(Debug, Default)]
pub struct DwellTimerRegistry {
    armed: BTreeMap<TimerKey, ArmedTimer>,
    generation: u64,
}

impl DwellTimerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `key` to expire `dwell_ms` after `now_ms`, replacing any live timer.
    pub fn arm(&mut self, key: TimerKey, now_ms: u64, dwell_ms: u64) -> TimerHandle {
        self.generation = self.generation.wrapping_add(1);
        let handle = TimerHandle(self.generation);
        let deadline_ms = now_ms.saturating_add(dwell_ms);
        if let Some(prev) = self.armed.insert(
            key.clone(),
            ArmedTimer {
                handle,
                deadline_ms,
            },
        ) {
            tracing::trace!(key = ?key, superseded = ?prev.handle, "dwell timer rearmed");
        }
        handle
    }

    /// Cancel the timer for `key`. Returns whether one was live.
    pub fn cancel(&mut self, key: &TimerKey) -> bool {
        self.armed.remove(key).is_some()
    }

    /// Cancel every timer matching `pred`.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&TimerKey) -> bool) {
        self.armed.retain(|key, _| !pred(key));
    }

    /// Cancel every timer.
    pub fn cancel_all(&mut self) {
        self.armed.clear();
    }

    /// Handle of the live timer for `key`.
    pub fn handle(&self, key: &TimerKey) -> Option<TimerHandle> {
        self.armed.get(key).map(|t| t.handle)
    }

    /// Deadline of the live timer for `key`.
    pub fn deadline(&self, key: &TimerKey) -> Option<u64> {
        self.armed.get(key).map(|t| t.deadline_ms)
    }

    /// Whether `handle` is still the live timer for `key`.
    pub fn is_current(&self, key: &TimerKey, handle: TimerHandle) -> bool {
        self.handle(key) == Some(handle)
    }

    /// Earliest deadline among live timers.
    pub fn next_deadline(&self) -> Option<u64> {
        self.armed.values().map(|t| t.deadline_ms).min()
    }

    /// Remove and return the earliest timer due at `now_ms`.
    ///
    /// Timers sharing a deadline fire in arming order.
    pub fn pop_expired(&mut self, now_ms: u64) -> Option<Expiry> {
        let key = self
            .armed
            .iter()
            .filter(|(_, t)| t.deadline_ms <= now_ms)
            .min_by_key(|(_, t)| (t.deadline_ms, t.handle))
            .map(|(k, _)| k.clone())?;
        let timer = self.armed.remove(&key)?;
        Some(Expiry {
            key,
            handle: timer.handle,
            deadline_ms: timer.deadline_ms,
        })
    }

    /// Number of live timers.
    pub fn len(&self) -> usize {
        self.armed.len()
    }

    /// Whether no timer is live.
    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode() -> TimerKey {
        TimerKey::Episode(HazardKind::PedestrianCrossing)
    }

    #[test]
    fn test_rearm_replaces_previous_timer() {
        let mut timers = DwellTimerRegistry::new();
        let first = timers.arm(episode(), 0, 1000);
        let second = timers.arm(episode(), 500, 1000);

        assert_ne!(first, second);
        assert_eq!(timers.len(), 1);
        assert!(!timers.is_current(&episode(), first));
        assert!(timers.is_current(&episode(), second));

        assert!(timers.pop_expired(1000).is_none());
        let fired = timers.pop_expired(1500);
        assert_eq!(fired.map(|e| e.handle), Some(second));
        assert!(timers.is_empty());
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut timers = DwellTimerRegistry::new();
        timers.arm(TimerKey::Zone(TransitZone::InRoadwayFwdCenter), 0, 2000);
        assert!(timers.cancel(&TimerKey::Zone(TransitZone::InRoadwayFwdCenter)));
        assert!(timers.pop_expired(u64::MAX).is_none());
        assert!(!timers.cancel(&TimerKey::Zone(TransitZone::InRoadwayFwdCenter)));
    }

    #[test]
    fn test_expiry_order_follows_deadline_then_arming() {
        let mut timers = DwellTimerRegistry::new();
        timers.arm(TimerKey::Zone(TransitZone::OnCurbside), 0, 300);
        timers.arm(TimerKey::Zone(TransitZone::InRoadwayRearCurb), 0, 100);
        timers.arm(TimerKey::Zone(TransitZone::InRoadwayFwdCurb), 0, 300);
        assert_eq!(timers.next_deadline(), Some(100));

        let order: Vec<TimerKey> = std::iter::from_fn(|| timers.pop_expired(300))
            .map(|e| e.key)
            .collect();
        assert_eq!(
            order,
            vec![
                TimerKey::Zone(TransitZone::InRoadwayRearCurb),
                TimerKey::Zone(TransitZone::OnCurbside),
                TimerKey::Zone(TransitZone::InRoadwayFwdCurb),
            ]
        );
    }

    #[test]
    fn test_cancel_where() {
        let mut timers = DwellTimerRegistry::new();
        timers.arm(TimerKey::Zone(TransitZone::OnCurbside), 0, 10);
        timers.arm(TimerKey::Zone(TransitZone::InRoadwayRearCenter), 0, 10);
        timers.arm(episode(), 0, 10);
        timers.cancel_where(|k| matches!(k, TimerKey::Zone(_)));
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.deadline(&episode()), Some(10));
    }
}
