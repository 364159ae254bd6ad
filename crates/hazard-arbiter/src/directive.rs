//! Display directives, transition log events and the emitter that filters them.

use crate::assets::Image;
use crate::audio::AudioDirective;
use crate::config::SuppressionFlags;
use crate::event::{HazardEvent, HazardType};
use serde::{Deserialize, Serialize};

/// What the display should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayDirective {
    /// Full-surface image.
    pub surface_image: Image,
    /// Overlays drawn on top of the surface.
    pub visible_zones: Vec<Image>,
    /// Blink interval when something on screen blinks.
    pub blink_interval_ms: Option<u64>,
    /// Text for the bottom banner.
    pub bottom_banner_text: Option<String>,
}

impl DisplayDirective {
    /// A plain surface with nothing on top.
    pub fn surface(image: Image) -> Self {
        Self {
            surface_image: image,
            visible_zones: Vec::new(),
            blink_interval_ms: None,
            bottom_banner_text: None,
        }
    }
}

/// Hazard a transition is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardSource {
    /// Hazard type.
    pub hazard_type: HazardType,
    /// Instance id.
    pub instance_id: String,
    /// Severity at the time of the transition.
    pub severity: u8,
    /// Correlation id of the originating message.
    pub correlation_id: String,
}

impl From<&HazardEvent> for HazardSource {
    fn from(event: &HazardEvent) -> Self {
        Self {
            hazard_type: event.hazard_type,
            instance_id: event.instance_id.clone(),
            severity: event.severity,
            correlation_id: event.correlation_id.clone(),
        }
    }
}

/// One observable state change, reported fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEvent {
    /// Image before the change.
    pub pre_state: Image,
    /// Image after the change.
    pub post_state: Image,
    /// Originating hazard, when known.
    pub source: Option<HazardSource>,
}

/// Everything one dispatch cycle produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatch {
    /// Display directive, only when the display changed.
    pub display: Option<DisplayDirective>,
    /// At most one audio directive.
    pub audio: Option<AudioDirective>,
    /// Transition log events, in the order they happened.
    pub transitions: Vec<TransitionEvent>,
}

impl Dispatch {
    /// Whether the cycle produced nothing observable.
    pub fn is_empty(&self) -> bool {
        self.display.is_none() && self.audio.is_none() && self.transitions.is_empty()
    }
}

/// Turns composed state into outbound directives.
///
/// A display directive only leaves when it differs from the last one that
/// actually left, so withheld frames are re-sent once output is allowed again.
#[derive(Debug, Clone, Default)]
pub struct DirectiveEmitter {
    last_display: Option<DisplayDirective>,
}

impl DirectiveEmitter {
    /// Create an emitter that has sent nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter one cycle's output through the suppression flags.
    pub fn emit(
        &mut self,
        composed: DisplayDirective,
        transitions: Vec<TransitionEvent>,
        audio: Option<AudioDirective>,
        flags: SuppressionFlags,
    ) -> Dispatch {
        let mut dispatch = Dispatch {
            audio: audio.filter(|_| flags.audio_allowed()),
            ..Dispatch::default()
        };

        if !flags.display_allowed() {
            if !transitions.is_empty() {
                tracing::debug!(
                    count = transitions.len(),
                    "screen notifications disabled, withholding transitions"
                );
            }
            return dispatch;
        }

        dispatch.transitions = transitions;
        if self.last_display.as_ref() != Some(&composed) {
            self.last_display = Some(composed.clone());
            dispatch.display = Some(composed);
        }
        dispatch
    }

    /// Last display directive that was sent.
    pub fn last_display(&self) -> Option<&DisplayDirective> {
        self.last_display.as_ref()
    }

    /// Forget what was sent so the next frame goes out unconditionally.
    pub fn forget(&mut self) {
        self.last_display = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::SoundCue;

    fn transition() -> TransitionEvent {
        TransitionEvent {
            pre_state: Image::SystemReady,
            post_state: Image::RedLightAlert,
            source: None,
        }
    }

    #[test]
    fn test_unchanged_display_is_not_resent() {
        let mut emitter = DirectiveEmitter::new();
        let flags = SuppressionFlags::default();
        let frame = DisplayDirective::surface(Image::SystemReady);

        assert!(emitter.emit(frame.clone(), Vec::new(), None, flags).display.is_some());
        assert!(emitter.emit(frame, Vec::new(), None, flags).is_empty());
    }

    #[test]
    fn test_withheld_frame_is_sent_after_reenable() {
        let mut emitter = DirectiveEmitter::new();
        let screen_off = SuppressionFlags {
            screen_notifications: false,
            ..SuppressionFlags::default()
        };
        let frame = DisplayDirective::surface(Image::RedLightAlert);
        let audio = Some(AudioDirective::Play(SoundCue::BrakeLightWarning));

        let dispatch = emitter.emit(frame.clone(), vec![transition()], audio, screen_off);
        assert_eq!(dispatch.display, None);
        assert!(dispatch.transitions.is_empty());
        assert_eq!(dispatch.audio, audio);

        let dispatch = emitter.emit(frame.clone(), Vec::new(), None, SuppressionFlags::default());
        assert_eq!(dispatch.display, Some(frame));
    }

    #[test]
    fn test_silenced_emits_nothing() {
        let mut emitter = DirectiveEmitter::new();
        let maintenance = SuppressionFlags {
            maintenance_mode: true,
            ..SuppressionFlags::default()
        };
        let dispatch = emitter.emit(
            DisplayDirective::surface(Image::RedLightAlert),
            vec![transition()],
            Some(AudioDirective::Stop),
            maintenance,
        );
        assert!(dispatch.is_empty());
        assert!(emitter.last_display().is_none());
    }
}
