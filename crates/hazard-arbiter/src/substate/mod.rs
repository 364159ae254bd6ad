//! Per-type sub-state machines.
//!
//! Each machine owns the state one hazard type accumulates across events and
//! answers what should be shown or heard for it. None of them touch the
//! display surface directly; the arbiter turns their answers into directives.

mod pedestrian;
mod rail;
mod severity;
mod transit;

pub use pedestrian::{Direction, PedestrianCode, PedestrianCrossingState, PedestrianFrame, PedestrianUpdate};
pub use rail::{RailChange, RailCode, RailCrossingState, RailRender, Rung};
pub use severity::{CurveSpeedCode, SeverityTracker, TurningCode};
pub use transit::{TransitCode, TransitZone, TransitZones, ZoneAsset, ZoneShow, zone_asset};
pub(crate) use transit::transit_base;

use crate::assets::Image;

/// One observable image change: `(pre, post)`.
pub type ImageChange = (Image, Image);
