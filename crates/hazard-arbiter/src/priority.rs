//! Type-priority comparator.
//!
//! Tier order, highest first:
//!
//! ```text
//! RedLightViolation
//!   > TransitStopPedestrian
//!   > VehicleTurning, CurveSpeed, ForwardCollision, EmergencyBrakeLight, RailCrossing
//!   > PedestrianCrossing
//! ```
//!
//! While a transit-stop episode is active, a transit-stop event carrying one
//! of the in-area codes yields to a vehicle-turning hazard.

use crate::event::{HazardEvent, HazardKind};
use serde::{Deserialize, Serialize};

/// Transit-stop event codes that mark the pedestrian as still in the area.
pub const TRANSIT_IN_AREA_CODES: [&str; 2] = ["20", "21"];

/// Outcome of [`rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rank {
    /// The first argument outranks the second.
    AExceeds,
    /// The second argument outranks the first.
    BExceeds,
    /// Same tier.
    Tie,
}

impl Rank {
    /// The same comparison seen from the other side.
    pub fn reversed(self) -> Self {
        match self {
            Self::AExceeds => Self::BExceeds,
            Self::BExceeds => Self::AExceeds,
            Self::Tie => Self::Tie,
        }
    }
}

/// Runtime context the comparator depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriorityContext {
    /// A transit-stop episode is currently active.
    pub transit_active: bool,
}

fn in_area(event: &HazardEvent) -> bool {
    TRANSIT_IN_AREA_CODES.contains(&event.event_code.as_str())
}

/// Compare two hazards by type tier.
pub fn rank(a: &HazardEvent, b: &HazardEvent, ctx: PriorityContext) -> Rank {
    use HazardKind::{PedestrianCrossing, RedLightViolation, TransitStopPedestrian, VehicleTurning};

    let ka = a.hazard_type.kind();
    let kb = b.hazard_type.kind();
    if ka == kb {
        return Rank::Tie;
    }

    match (ka, kb) {
        (RedLightViolation, _) => Rank::AExceeds,
        (_, RedLightViolation) => Rank::BExceeds,
        (PedestrianCrossing, _) => Rank::BExceeds,
        (_, PedestrianCrossing) => Rank::AExceeds,
        (TransitStopPedestrian, other) => {
            if other == VehicleTurning && ctx.transit_active && in_area(a) {
                Rank::BExceeds
            } else {
                Rank::AExceeds
            }
        }
        (other, TransitStopPedestrian) => {
            if other == VehicleTurning && ctx.transit_active && in_area(b) {
                Rank::AExceeds
            } else {
                Rank::BExceeds
            }
        }
        _ => Rank::Tie,
    }
}
