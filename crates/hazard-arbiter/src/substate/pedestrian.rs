//! Pedestrian-crossing (EPCW) direction slots.
//!
//! Four independent slots track the pedestrian reported on each side of the
//! crossing. The composite picture is every occupied slot's overlay at once;
//! the audio cue comes from a fixed combination table keyed by which slots
//! are occupied and their severities.

use super::ImageChange;
use crate::assets::{Image, SoundCue};
use crate::event::{HazardEvent, HazardKind};

/// Side of the crossing a pedestrian was reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Near side.
    Near,
    /// Far side.
    Far,
    /// Left side.
    Left,
    /// Right side.
    Right,
}

impl Direction {
    /// Overlay for a slot at `severity`; `None` outside 1..=2.
    pub fn overlay(self, severity: u8) -> Option<Image> {
        let image = match (self, severity) {
            (Self::Near, 1) => Image::EpcwCautionNear,
            (Self::Far, 1) => Image::EpcwCautionFar,
            (Self::Left, 1) => Image::EpcwCautionLeft,
            (Self::Right, 1) => Image::EpcwCautionRight,
            (Self::Near, 2) => Image::EpcwWarningNear,
            (Self::Far, 2) => Image::EpcwWarningFar,
            (Self::Left, 2) => Image::EpcwWarningLeft,
            (Self::Right, 2) => Image::EpcwWarningRight,
            _ => return None,
        };
        Some(image)
    }
}

/// EPCW event codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PedestrianCode {
    /// `3`: vehicle entered the crossing area.
    AreaEntered,
    /// `4`: vehicle left the crossing area.
    AreaExited,
    /// `5`: pedestrian detected, no action.
    Detected,
    /// `6`..`9`: pedestrian on one side.
    Direction(Direction),
    /// `20`: the alert for one pedestrian is complete.
    AlertComplete,
    /// `21`: pedestrian detected inside the area.
    InArea,
}

impl PedestrianCode {
    /// Parse a wire event code.
    pub fn parse(code: &str) -> Option<Self> {
        Some(match code {
            "3" => Self::AreaEntered,
            "4" => Self::AreaExited,
            "5" => Self::Detected,
            "6" => Self::Direction(Direction::Near),
            "7" => Self::Direction(Direction::Far),
            "8" => Self::Direction(Direction::Left),
            "9" => Self::Direction(Direction::Right),
            "20" => Self::AlertComplete,
            "21" => Self::InArea,
            _ => return None,
        })
    }
}

/// Whether an EPCW event continues on to arbitration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PedestrianUpdate {
    /// Sub-state updated; arbitrate the event.
    Proceed,
    /// Drop the event.
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    instance: Option<String>,
    severity: u8,
    transitioned: bool,
    shown: Image,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            instance: None,
            severity: 0,
            transitioned: false,
            shown: Image::EpcwBase,
        }
    }
}

impl Slot {
    fn occupied_severity(&self) -> Option<u8> {
        self.instance.as_ref().map(|_| self.severity)
    }
}

/// Composite picture and cue for the current slots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PedestrianFrame {
    /// Overlays for occupied slots, in near, right, far, left order.
    pub overlays: Vec<Image>,
    /// Cue from the combination table.
    pub cue: Option<SoundCue>,
    /// Image changes of slots flagged as transitioned.
    pub transitions: Vec<ImageChange>,
}

/// State of the four direction slots and the crossing episode.
#[derive(Debug, Clone, Default)]
pub struct PedestrianCrossingState {
    near: Slot,
    far: Slot,
    left: Slot,
    right: Slot,
    episode_active: bool,
}

impl PedestrianCrossingState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, dir: Direction) -> &Slot {
        match dir {
            Direction::Near => &self.near,
            Direction::Far => &self.far,
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }

    fn slot_mut(&mut self, dir: Direction) -> &mut Slot {
        match dir {
            Direction::Near => &mut self.near,
            Direction::Far => &mut self.far,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }

    /// Update the slots from an EPCW event.
    ///
    /// `displayed` is the kind of hazard on screen. An alert-complete with
    /// nothing on screen is dropped; otherwise its slot is cleared and marked
    /// as transitioned only when pedestrian crossing itself is on screen.
    pub fn apply(&mut self, event: &HazardEvent, displayed: Option<HazardKind>) -> PedestrianUpdate {
        let Some(code) = PedestrianCode::parse(&event.event_code) else {
            tracing::debug!(code = %event.event_code, "unknown pedestrian-crossing event code");
            return PedestrianUpdate::Ignore;
        };

        match code {
            PedestrianCode::AreaEntered | PedestrianCode::InArea => self.episode_active = true,
            PedestrianCode::AreaExited => self.episode_active = false,
            PedestrianCode::Detected => {}
            PedestrianCode::Direction(dir) => {
                let slot = self.slot_mut(dir);
                if slot.instance.as_deref() != Some(event.instance_id.as_str()) {
                    slot.transitioned = true;
                }
                slot.instance = Some(event.instance_id.clone());
                slot.severity = event.severity;
            }
            PedestrianCode::AlertComplete => {
                let Some(displayed) = displayed else {
                    tracing::debug!(
                        instance = %event.instance_id,
                        "pedestrian alert complete with nothing displayed"
                    );
                    return PedestrianUpdate::Ignore;
                };
                let from_self = displayed == HazardKind::PedestrianCrossing;
                let matching = [Direction::Near, Direction::Far, Direction::Left, Direction::Right]
                    .into_iter()
                    .find(|d| self.slot(*d).instance.as_deref() == Some(event.instance_id.as_str()));
                if let Some(dir) = matching {
                    let slot = self.slot_mut(dir);
                    slot.instance = None;
                    slot.severity = 0;
                    slot.transitioned = from_self;
                }
            }
        }
        PedestrianUpdate::Proceed
    }

    /// Severity recorded for a direction, 0 when empty.
    pub fn slot_severity(&self, dir: Direction) -> u8 {
        self.slot(dir).occupied_severity().unwrap_or(0)
    }

    /// Instance occupying a direction.
    pub fn slot_instance(&self, dir: Direction) -> Option<&str> {
        self.slot(dir).instance.as_deref()
    }

    /// Whether any slot is occupied.
    pub fn any_occupied(&self) -> bool {
        [&self.near, &self.far, &self.left, &self.right]
            .iter()
            .any(|s| s.instance.is_some())
    }

    /// Whether the crossing episode is active.
    pub fn is_episode_active(&self) -> bool {
        self.episode_active
    }

    /// Overlays for the current slots without consuming transitions.
    pub fn overlays(&self) -> Vec<Image> {
        [Direction::Near, Direction::Right, Direction::Far, Direction::Left]
            .into_iter()
            .filter_map(|d| {
                let slot = self.slot(d);
                slot.occupied_severity().and_then(|sev| d.overlay(sev))
            })
            .collect()
    }

    /// Compose the current picture, consuming pending transition flags.
    pub fn compose(&mut self) -> PedestrianFrame {
        let overlays = self.overlays();
        let cue = self.combination_cue();

        let mut transitions = Vec::new();
        for dir in [Direction::Right, Direction::Left, Direction::Far, Direction::Near] {
            let slot = self.slot_mut(dir);
            let post = slot
                .occupied_severity()
                .and_then(|sev| dir.overlay(sev))
                .unwrap_or(Image::EpcwBase);
            if slot.transitioned {
                transitions.push((slot.shown, post));
                slot.transitioned = false;
            }
            slot.shown = post;
        }

        PedestrianFrame {
            overlays,
            cue,
            transitions,
        }
    }

    /// Cue for the occupied slots.
    pub fn combination_cue(&self) -> Option<SoundCue> {
        use SoundCue::*;

        let near = self.near.occupied_severity();
        let right = self.right.occupied_severity();
        let left = self.left.occupied_severity();
        let far = self.far.occupied_severity();

        if let Some(n) = near {
            if let Some(r) = right {
                return match (n, r) {
                    (1, 1) => Some(EpcwCautionNearCautionRight),
                    (1, 2) => Some(EpcwWarningRight),
                    (2, 1) => Some(EpcwWarningNear),
                    (2, 2) => Some(EpcwWarningNearWarningRight),
                    _ => None,
                };
            }
            if let Some(l) = left {
                return match (n, l) {
                    (1, 1) => Some(EpcwCautionNearCautionLeft),
                    (1, 2) => Some(EpcwWarningLeft),
                    (2, 1) => Some(EpcwWarningNear),
                    (2, 2) => Some(EpcwWarningNearWarningLeft),
                    _ => None,
                };
            }
            if let Some(f) = far {
                return match (n, f) {
                    (1, 1) => Some(EpcwCautionNearCautionFar),
                    (1, 2) => Some(EpcwWarningFar),
                    (2, 1) => Some(EpcwWarningNearCautionFar),
                    (2, 2) => Some(EpcwWarningNearWarningFar),
                    _ => None,
                };
            }
            return match n {
                1 => Some(EpcwCautionNear),
                2 => Some(EpcwWarningNear),
                _ => None,
            };
        }

        let (caution, warning, sev) = if let Some(r) = right {
            (EpcwCautionRight, EpcwWarningRight, r)
        } else if let Some(f) = far {
            (EpcwCautionFar, EpcwWarningFar, f)
        } else if let Some(l) = left {
            (EpcwCautionLeft, EpcwWarningLeft, l)
        } else {
            return None;
        };
        match sev {
            1 => Some(caution),
            2 => Some(warning),
            _ => None,
        }
    }

    /// Clear every slot and end the episode.
    ///
    /// Returns a change back to the base image for each slot that was
    /// showing an overlay.
    pub fn clear(&mut self) -> Vec<ImageChange> {
        let mut changes = Vec::new();
        for dir in [Direction::Right, Direction::Left, Direction::Far, Direction::Near] {
            let slot = self.slot_mut(dir);
            if slot.shown != Image::EpcwBase {
                changes.push((slot.shown, Image::EpcwBase));
            }
            *slot = Slot::default();
        }
        self.episode_active = false;
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::HazardType;

    fn direction(code: &str, id: &str, severity: u8) -> HazardEvent {
        HazardEvent::new(HazardType::PedestrianCrossing, code)
            .with_instance(id)
            .with_severity(severity)
    }

    #[test]
    fn test_combination_is_order_independent() {
        let mut a = PedestrianCrossingState::new();
        a.apply(&direction("6", "p1", 1), None);
        a.apply(&direction("9", "p2", 1), None);

        let mut b = PedestrianCrossingState::new();
        b.apply(&direction("9", "p2", 1), None);
        b.apply(&direction("6", "p1", 1), None);

        assert_eq!(a.combination_cue(), Some(SoundCue::EpcwCautionNearCautionRight));
        assert_eq!(a.combination_cue(), b.combination_cue());
        assert_eq!(a.overlays(), b.overlays());
        assert_eq!(
            a.overlays(),
            vec![Image::EpcwCautionNear, Image::EpcwCautionRight]
        );
    }

    #[test]
    fn test_near_left_uses_left_severity() {
        let mut state = PedestrianCrossingState::new();
        state.apply(&direction("6", "p1", 1), None);
        state.apply(&direction("8", "p2", 2), None);
        assert_eq!(state.combination_cue(), Some(SoundCue::EpcwWarningLeft));
    }

    #[test]
    fn test_transition_flag_only_on_new_instance() {
        let mut state = PedestrianCrossingState::new();
        state.apply(&direction("7", "p1", 1), None);
        let frame = state.compose();
        assert_eq!(frame.transitions, vec![(Image::EpcwBase, Image::EpcwCautionFar)]);

        // refresh of the same pedestrian
        state.apply(&direction("7", "p1", 2), None);
        assert!(state.compose().transitions.is_empty());
    }

    #[test]
    fn test_alert_complete_needs_a_displayed_hazard() {
        let mut state = PedestrianCrossingState::new();
        state.apply(&direction("8", "p1", 2), None);
        state.compose();

        let done = direction("20", "p1", 0);
        assert_eq!(state.apply(&done, None), PedestrianUpdate::Ignore);
        assert_eq!(state.slot_instance(Direction::Left), Some("p1"));

        assert_eq!(
            state.apply(&done, Some(HazardKind::PedestrianCrossing)),
            PedestrianUpdate::Proceed
        );
        assert!(!state.any_occupied());
        let frame = state.compose();
        assert_eq!(frame.transitions, vec![(Image::EpcwWarningLeft, Image::EpcwBase)]);
        assert_eq!(frame.cue, None);
    }

    #[test]
    fn test_alert_complete_from_other_display_is_silent() {
        let mut state = PedestrianCrossingState::new();
        state.apply(&direction("6", "p1", 1), None);
        state.compose();
        state.apply(&direction("20", "p1", 0), Some(HazardKind::RedLightViolation));
        assert!(state.compose().transitions.is_empty());
    }

    #[test]
    fn test_clear_reports_shown_overlays() {
        let mut state = PedestrianCrossingState::new();
        state.apply(&direction("3", "", 0), None);
        state.apply(&direction("9", "p1", 2), None);
        state.compose();
        assert!(state.is_episode_active());

        let changes = state.clear();
        assert_eq!(changes, vec![(Image::EpcwWarningRight, Image::EpcwBase)]);
        assert!(!state.is_episode_active());
        assert!(!state.any_occupied());
    }
}
