//! Rail-crossing (RCVW) escalation ladder.
//!
//! Five independent flags feed a ladder whose rung is the most severe flag
//! set. Audio only sounds when the rung climbs; descending or holding the
//! rung only swaps the picture.
//!
//! ```text
//!  Idle(0) < Available(41) < ApproachInform(42) < ApproachWarning(43)
//!          < HriWarning(44) < Unavailable(45)
//! ```

use crate::assets::{Image, SoundCue};
use crate::event::HazardEvent;
use serde::{Deserialize, Serialize};

/// RCVW event codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RailCode {
    /// `41`: crossing system available.
    Available,
    /// `42`: approach inform.
    ApproachInform,
    /// `43`: approach warning.
    ApproachWarning,
    /// `44`: highway-rail intersection inform or warning.
    Hri,
    /// `45`: system error.
    Error,
}

impl RailCode {
    /// Parse a wire event code.
    pub fn parse(code: &str) -> Option<Self> {
        Some(match code {
            "41" => Self::Available,
            "42" => Self::ApproachInform,
            "43" => Self::ApproachWarning,
            "44" => Self::Hri,
            "45" => Self::Error,
            _ => return None,
        })
    }
}

/// Ladder rung, ordered by severity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Rung {
    /// Nothing to show.
    #[default]
    Idle,
    /// `41`.
    Available,
    /// `42`.
    ApproachInform,
    /// `43`.
    ApproachWarning,
    /// `44`.
    HriWarning,
    /// `45`.
    Unavailable,
}

impl Rung {
    /// Wire code of the rung, 0 for idle.
    pub fn code(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Available => 41,
            Self::ApproachInform => 42,
            Self::ApproachWarning => 43,
            Self::HriWarning => 44,
            Self::Unavailable => 45,
        }
    }

    fn cue(self) -> Option<SoundCue> {
        match self {
            Self::Idle => None,
            Self::Available | Self::ApproachInform | Self::Unavailable => Some(SoundCue::RailInform),
            Self::ApproachWarning | Self::HriWarning => Some(SoundCue::RailWarning),
        }
    }
}

/// How a rung is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RailRender {
    /// Static image, or blink phase A.
    pub image: Image,
    /// Blink phase B, when the rung blinks.
    pub blink_alt: Option<Image>,
    /// Bottom banner text.
    pub banner: Option<String>,
}

/// A change of the drawn ladder state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RailChange {
    /// Rung before the change.
    pub from: Rung,
    /// Rung after the change.
    pub to: Rung,
    /// How to draw `to`.
    pub render: RailRender,
    /// Cue, only when the rung climbed.
    pub cue: Option<SoundCue>,
}

/// Flags and current rung of the crossing ladder.
#[derive(Debug, Clone, Default)]
pub struct RailCrossingState {
    available: bool,
    approach_inform: bool,
    approach_warning: bool,
    hri_inform: bool,
    hri_warning: bool,
    error: bool,
    error_text: String,
    rung: Rung,
    rendered: Option<RailRender>,
}

impl RailCrossingState {
    /// Create an idle ladder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag an event addresses. Returns `false` for unknown codes.
    pub fn apply(&mut self, event: &HazardEvent) -> bool {
        let Some(code) = RailCode::parse(&event.event_code) else {
            return false;
        };
        let on = event.severity != 0;
        match code {
            RailCode::Available => self.available = on,
            RailCode::ApproachInform => self.approach_inform = on,
            RailCode::ApproachWarning => self.approach_warning = on,
            RailCode::Hri => {
                self.hri_inform = event.severity == 1;
                self.hri_warning = on && !self.hri_inform;
            }
            RailCode::Error => {
                self.error_text.clone_from(&event.free_text);
                self.error = on;
            }
        }
        true
    }

    /// Rung the flags call for.
    pub fn target_rung(&self) -> Rung {
        if self.error {
            Rung::Unavailable
        } else if self.hri_inform || self.hri_warning {
            Rung::HriWarning
        } else if self.approach_warning {
            Rung::ApproachWarning
        } else if self.approach_inform {
            Rung::ApproachInform
        } else if self.available {
            Rung::Available
        } else {
            Rung::Idle
        }
    }

    /// Current rung.
    pub fn rung(&self) -> Rung {
        self.rung
    }

    /// Whether the HRI rung is the warning flavour.
    pub fn is_hri_warning(&self) -> bool {
        self.hri_warning
    }

    fn render(&self, rung: Rung) -> RailRender {
        let (image, blink_alt, banner) = match rung {
            Rung::Idle => (Image::SystemReady, None, None),
            Rung::Available => (Image::RailAvailable, None, None),
            Rung::ApproachInform => (Image::RailApproachInform, None, None),
            Rung::ApproachWarning => (
                Image::RailApproachWarning1,
                Some(Image::RailApproachWarning2),
                None,
            ),
            Rung::HriWarning if self.hri_warning => {
                (Image::RailHriWarning1, Some(Image::RailHriWarning2), None)
            }
            Rung::HriWarning => (Image::RailHriInform1, Some(Image::RailHriInform2), None),
            Rung::Unavailable => (
                Image::RailUnavailable,
                None,
                Some(self.error_text.clone()).filter(|t| !t.is_empty()),
            ),
        };
        RailRender {
            image,
            blink_alt,
            banner,
        }
    }

    /// Move to the target rung.
    ///
    /// Returns `None` when neither the rung nor its drawing changed.
    pub fn update(&mut self) -> Option<RailChange> {
        let to = self.target_rung();
        let render = self.render(to);
        if to == self.rung && self.rendered.as_ref() == Some(&render) {
            return None;
        }
        if to == Rung::Idle && self.rendered.is_none() {
            return None;
        }

        let from = self.rung;
        let cue = if to > from { to.cue() } else { None };
        self.rung = to;
        self.rendered = (to != Rung::Idle).then(|| render.clone());
        Some(RailChange {
            from,
            to,
            render,
            cue,
        })
    }

    /// Drop every flag.
    ///
    /// Returns the resulting change when the ladder was showing something.
    pub fn reset(&mut self) -> Option<RailChange> {
        let rendered = self.rendered.take();
        let rung = self.rung;
        *self = Self {
            rendered,
            rung,
            ..Self::default()
        };
        self.update()
    }

    /// Image the ladder currently draws, if any.
    pub fn shown_image(&self) -> Option<Image> {
        self.rendered.as_ref().map(|r| r.image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::HazardType;

    fn rail(code: &str, severity: u8) -> HazardEvent {
        HazardEvent::new(HazardType::RailCrossing, code).with_severity(severity)
    }

    #[test]
    fn test_cues_only_on_climb() {
        let mut state = RailCrossingState::new();

        state.apply(&rail("41", 1));
        let change = state.update();
        assert_eq!(change.as_ref().map(|c| c.cue), Some(Some(SoundCue::RailInform)));

        state.apply(&rail("43", 1));
        let change = state.update();
        assert_eq!(change.as_ref().map(|c| c.cue), Some(Some(SoundCue::RailWarning)));
        assert_eq!(
            change.and_then(|c| c.render.blink_alt),
            Some(Image::RailApproachWarning2)
        );

        state.apply(&rail("43", 0));
        state.apply(&rail("42", 1));
        let change = state.update();
        assert_eq!(change.as_ref().map(|c| c.to), Some(Rung::ApproachInform));
        assert_eq!(change.and_then(|c| c.cue), None);
    }

    #[test]
    fn test_highest_flag_wins() {
        let mut state = RailCrossingState::new();
        state.apply(&rail("42", 1));
        state.apply(&rail("41", 1));
        assert_eq!(state.target_rung(), Rung::ApproachInform);

        state.apply(&rail("44", 2));
        assert_eq!(state.target_rung(), Rung::HriWarning);
        assert!(state.is_hri_warning());

        state.apply(&rail("44", 1));
        assert!(!state.is_hri_warning());
        assert_eq!(state.target_rung(), Rung::HriWarning);

        state.apply(&rail("44", 0));
        assert_eq!(state.target_rung(), Rung::ApproachInform);
    }

    #[test]
    fn test_same_rung_rerenders_silently_on_flavour_change() {
        let mut state = RailCrossingState::new();
        state.apply(&rail("44", 1));
        assert!(state.update().is_some());

        state.apply(&rail("44", 2));
        let change = state.update();
        assert_eq!(change.as_ref().map(|c| c.render.image), Some(Image::RailHriWarning1));
        assert_eq!(change.and_then(|c| c.cue), None);

        assert!(state.update().is_none());
    }

    #[test]
    fn test_error_banner() {
        let mut state = RailCrossingState::new();
        state.apply(&rail("45", 1).with_text("GPS lost"));
        let change = state.update();
        assert_eq!(
            change.and_then(|c| c.render.banner),
            Some("GPS lost".to_string())
        );
    }

    #[test]
    fn test_unknown_code_and_reset() {
        let mut state = RailCrossingState::new();
        assert!(!state.apply(&rail("40", 1)));
        assert!(state.reset().is_none());

        state.apply(&rail("43", 1));
        state.update();
        let change = state.reset();
        assert_eq!(change.as_ref().map(|c| (c.from, c.to)), Some((Rung::ApproachWarning, Rung::Idle)));
        assert_eq!(state.rung(), Rung::Idle);
        assert_eq!(state.shown_image(), None);
    }
}
