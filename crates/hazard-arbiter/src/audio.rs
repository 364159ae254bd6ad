//! Audio selection.
//!
//! At most one cue leaves each dispatch cycle. Inside a cycle the most
//! urgent proposal wins, later proposals winning ties. Across cycles a cue
//! that is less urgent than one still inside its hold window is suppressed
//! so a caution never cuts off a warning, and a cue that is still playing is
//! not restarted unless it was proposed as an escalation: a strict rise of
//! the hazard's rung or severity always sounds again.

use crate::assets::SoundCue;
use serde::{Deserialize, Serialize};

/// Audio output of one dispatch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioDirective {
    /// Play the cue.
    Play(SoundCue),
    /// Stop whatever is playing.
    Stop,
}

impl AudioDirective {
    /// Sound index to play, if any.
    pub fn sound_index(&self) -> Option<u8> {
        match self {
            Self::Play(cue) => Some(cue.index()),
            Self::Stop => None,
        }
    }
}

/// Audio requests collected during one dispatch cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AudioRequest {
    proposal: Option<SoundCue>,
    escalation: bool,
    stop: bool,
}

impl AudioRequest {
    /// Propose a cue for this cycle.
    pub fn propose(&mut self, cue: SoundCue) {
        self.offer(cue, false);
    }

    /// Propose a cue for a strict rise of a rung or severity.
    ///
    /// An escalation replays its cue even while the same cue is held.
    pub fn escalate(&mut self, cue: SoundCue) {
        self.offer(cue, true);
    }

    fn offer(&mut self, cue: SoundCue, escalation: bool) {
        match self.proposal {
            Some(current) if current.urgency() > cue.urgency() => {}
            _ => {
                self.proposal = Some(cue);
                self.escalation = escalation;
            }
        }
    }

    /// Ask for playback to stop.
    pub fn stop(&mut self) {
        self.stop = true;
    }

    /// Proposed cue.
    pub fn proposal(&self) -> Option<SoundCue> {
        self.proposal
    }

    /// Whether a stop was requested.
    pub fn stop_requested(&self) -> bool {
        self.stop
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeldCue {
    cue: SoundCue,
    until_ms: u64,
}

/// Chooses the cue each cycle emits.
#[derive(Debug, Clone)]
pub struct AudioSelector {
    hold_ms: u64,
    held: Option<HeldCue>,
}

impl AudioSelector {
    /// Create a selector with the given hold window.
    pub fn new(hold_ms: u64) -> Self {
        Self {
            hold_ms,
            held: None,
        }
    }

    /// Resolve one cycle's requests.
    ///
    /// With `enabled` false nothing is emitted and nothing is held.
    pub fn select(
        &mut self,
        request: AudioRequest,
        now_ms: u64,
        enabled: bool,
    ) -> Option<AudioDirective> {
        if request.stop {
            self.held = None;
        }
        if !enabled {
            return None;
        }
        let Some(cue) = request.proposal else {
            return request.stop.then_some(AudioDirective::Stop);
        };

        if let Some(held) = self.held
            && now_ms < held.until_ms
        {
            if cue == held.cue && !request.escalation {
                tracing::trace!(cue = ?cue, "cue already playing");
                return None;
            }
            if cue.urgency() < held.cue.urgency() {
                tracing::debug!(
                    cue = ?cue,
                    held = ?held.cue,
                    "suppressing cue that would downgrade the playing one"
                );
                return None;
            }
        }

        self.held = Some(HeldCue {
            cue,
            until_ms: now_ms.saturating_add(self.hold_ms),
        });
        Some(AudioDirective::Play(cue))
    }
}
