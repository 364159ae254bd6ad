//! Monotonic severity trackers for the simple hazard types.

/// Vehicle-turning (EVTRW) event codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurningCode {
    /// `1`: entered the turning area.
    AreaEntered,
    /// `2`: left the turning area.
    AreaExited,
    /// `12`: vehicle turning in front, warning.
    TurningWarning,
    /// `13`: vehicle ahead on the left.
    AheadLeft,
    /// `17`: vehicle turning in front, caution.
    TurningCaution,
}

impl TurningCode {
    /// Parse a wire event code.
    pub fn parse(code: &str) -> Option<Self> {
        Some(match code {
            "1" => Self::AreaEntered,
            "2" => Self::AreaExited,
            "12" => Self::TurningWarning,
            "13" => Self::AheadLeft,
            "17" => Self::TurningCaution,
            _ => return None,
        })
    }
}

/// Curve-speed (CSW) event codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveSpeedCode {
    /// `0`: speed advisory at the event's severity.
    Advisory,
    /// `1`: entered the curve area.
    AreaEntered,
    /// `2`: left the curve area.
    AreaExited,
}

impl CurveSpeedCode {
    /// Parse a wire event code.
    pub fn parse(code: &str) -> Option<Self> {
        Some(match code {
            "0" => Self::Advisory,
            "1" => Self::AreaEntered,
            "2" => Self::AreaExited,
            _ => return None,
        })
    }
}

/// Highest severity announced during the current episode.
///
/// Announcements (audio, log) are gated on a strict increase; the level only
/// falls back to zero when the episode ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityTracker {
    current: u8,
    active: bool,
}

impl SeverityTracker {
    /// Create a tracker at severity zero, outside any episode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise to `severity`. Returns `true` only on a strict increase.
    pub fn raise(&mut self, severity: u8) -> bool {
        if severity > self.current {
            self.current = severity;
            true
        } else {
            false
        }
    }

    /// Current severity.
    pub fn current(&self) -> u8 {
        self.current
    }

    /// Mark the episode as entered. Returns `true` if it was not already.
    pub fn enter(&mut self) -> bool {
        !std::mem::replace(&mut self.active, true)
    }

    /// End the episode and reset the severity.
    pub fn exit(&mut self) {
        *self = Self::default();
    }

    /// Whether an episode is active.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_is_monotonic() {
        let mut tracker = SeverityTracker::new();
        assert!(tracker.raise(1));
        assert!(!tracker.raise(1));
        assert!(tracker.raise(2));
        assert!(!tracker.raise(1));
        assert_eq!(tracker.current(), 2);

        tracker.exit();
        assert_eq!(tracker.current(), 0);
        assert!(tracker.raise(1));
    }

    #[test]
    fn test_enter_once() {
        let mut tracker = SeverityTracker::new();
        assert!(tracker.enter());
        assert!(!tracker.enter());
        assert!(tracker.is_active());
        tracker.exit();
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_code_parsing() {
        assert_eq!(TurningCode::parse("17"), Some(TurningCode::TurningCaution));
        assert_eq!(TurningCode::parse("14"), None);
        assert_eq!(CurveSpeedCode::parse("2"), Some(CurveSpeedCode::AreaExited));
        assert_eq!(CurveSpeedCode::parse("3"), None);
    }
}
