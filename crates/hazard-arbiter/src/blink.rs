//! Two-phase blink state machine.
//!
//! ```text
//!          interval elapsed
//!   ┌──────────┐ ───────► ┌──────────┐
//!   │  PhaseA  │          │  PhaseB  │
//!   └──────────┘ ◄─────── └──────────┘
//!          interval elapsed
//! ```
//!
//! The machine is driven by the caller's logical clock. Skipping ahead
//! several intervals in one call lands on the phase a free-running blinker
//! would show at that instant.

use crate::assets::Image;
use serde::{Deserialize, Serialize};

/// Visible half of a blink cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlinkPhase {
    /// First half: the primary frame.
    PhaseA,
    /// Second half: the alternate frame.
    PhaseB,
}

impl BlinkPhase {
    fn toggled(self) -> Self {
        match self {
            Self::PhaseA => Self::PhaseB,
            Self::PhaseB => Self::PhaseA,
        }
    }
}

/// What a blink alternates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlinkTarget {
    /// Direction overlays are shown in phase A and hidden in phase B.
    Overlays,
    /// The surface image alternates between two frames.
    Surface {
        /// Frame for phase A.
        a: Image,
        /// Frame for phase B.
        b: Image,
    },
}

/// A running blink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlinkMachine {
    target: BlinkTarget,
    interval_ms: u64,
    phase: BlinkPhase,
    next_flip_ms: u64,
}

impl BlinkMachine {
    /// Start blinking `target` at `now_ms`, beginning in phase A.
    pub fn start(target: BlinkTarget, interval_ms: u64, now_ms: u64) -> Self {
        let interval_ms = interval_ms.max(1);
        Self {
            target,
            interval_ms,
            phase: BlinkPhase::PhaseA,
            next_flip_ms: now_ms.saturating_add(interval_ms),
        }
    }

    /// What is blinking.
    pub fn target(&self) -> BlinkTarget {
        self.target
    }

    /// Blink interval.
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Current phase.
    pub fn phase(&self) -> BlinkPhase {
        self.phase
    }

    /// Deadline of the next flip.
    pub fn next_flip_ms(&self) -> u64 {
        self.next_flip_ms
    }

    /// Flip as many times as are due at `now_ms`.
    ///
    /// Returns whether the visible phase changed.
    pub fn advance(&mut self, now_ms: u64) -> bool {
        if now_ms < self.next_flip_ms {
            return false;
        }
        let overdue = now_ms.saturating_sub(self.next_flip_ms);
        let flips = overdue / self.interval_ms + 1;
        self.next_flip_ms = self
            .next_flip_ms
            .saturating_add(flips.saturating_mul(self.interval_ms));
        if flips % 2 == 1 {
            self.phase = self.phase.toggled();
            true
        } else {
            false
        }
    }

    /// Surface frame for the current phase, if the blink drives the surface.
    pub fn surface_frame(&self) -> Option<Image> {
        match (self.target, self.phase) {
            (BlinkTarget::Surface { a, .. }, BlinkPhase::PhaseA) => Some(a),
            (BlinkTarget::Surface { b, .. }, BlinkPhase::PhaseB) => Some(b),
            (BlinkTarget::Overlays, _) => None,
        }
    }

    /// Whether overlays are visible in the current phase.
    pub fn overlays_visible(&self) -> bool {
        !matches!(self.target, BlinkTarget::Overlays) || self.phase == BlinkPhase::PhaseA
    }
}
