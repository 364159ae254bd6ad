//! Geometry comparator used to break priority ties and decide preemption.
//!
//! The forward sector spans `[345°, 360°) ∪ [0°, 45°]`. Everything else is
//! side or rear.

use crate::event::HazardEvent;
use serde::{Deserialize, Serialize};

/// Lower edge of the forward sector's wrap-around half.
pub const FRONT_WRAP_DEG: f64 = 345.0;
/// Upper edge of the forward sector.
pub const FRONT_EDGE_DEG: f64 = 45.0;

/// Outcome of [`compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryOrder {
    /// The new hazard should take the current one's place.
    NewWins,
    /// The current hazard keeps priority.
    CurrentWins,
    /// Both records are field-for-field identical.
    Identical,
}

/// Whether a bearing lies in the forward sector.
pub fn is_front(bearing_deg: f64) -> bool {
    bearing_deg <= FRONT_EDGE_DEG || bearing_deg >= FRONT_WRAP_DEG
}

fn off_axis_from_rear(bearing_deg: f64) -> f64 {
    (bearing_deg - 180.0).abs()
}

/// Rank `new` against `current` by direction sector and distance.
///
/// A forward current hazard yields only to a forward hazard at the same or
/// shorter distance. Inside the `≥345°` half both conditions are relaxed: a
/// new hazard also wins when its bearing is not smaller than the current one.
/// A side or rear current hazard yields to any forward hazard, otherwise to
/// the bearing closer to 180°, then to the shorter distance.
pub fn compare(new: &HazardEvent, current: &HazardEvent) -> GeometryOrder {
    if new.is_identical(current) {
        return GeometryOrder::Identical;
    }

    let (nb, nd) = (new.bearing_deg, new.distance_m);
    let (cb, cd) = (current.bearing_deg, current.distance_m);

    let new_wins = if is_front(cb) {
        if cb >= FRONT_WRAP_DEG && nb >= FRONT_WRAP_DEG {
            nd <= cd || nb >= cb
        } else {
            is_front(nb) && nd <= cd
        }
    } else if is_front(nb) {
        true
    } else {
        let n_off = off_axis_from_rear(nb);
        let c_off = off_axis_from_rear(cb);
        if (n_off - c_off).abs() < f64::EPSILON {
            nd < cd
        } else {
            n_off < c_off
        }
    };

    if new_wins {
        GeometryOrder::NewWins
    } else {
        GeometryOrder::CurrentWins
    }
}
