//! Hazard types and the immutable event record every inbound message becomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which display a transit-stop pedestrian warning is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TransitVariant {
    /// The transit vehicle itself.
    Vehicle,
    /// A passenger-owned vehicle overtaking the stopped transit vehicle.
    PassengerOwnVehicle,
}

/// Hazard type carried by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HazardType {
    /// Red-light violation warning (RLVW).
    RedLightViolation,
    /// Pedestrian-crossing warning (EPCW).
    PedestrianCrossing,
    /// Transit-stop pedestrian warning (TSPW).
    TransitStopPedestrian(TransitVariant),
    /// Vehicle-turning-right-in-front-of-transit warning (EVTRW).
    VehicleTurning,
    /// Curve-speed warning (CSW).
    CurveSpeed,
    /// Forward-collision warning (FCW).
    ForwardCollision,
    /// Emergency electronic brake light (EEBL).
    EmergencyBrakeLight,
    /// Rail-crossing violation warning (RCVW).
    RailCrossing,
}

/// Hazard type with the transit variant erased.
///
/// Both transit variants are the same kind for priority, timer keys and
/// instance uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    /// See [`HazardType::RedLightViolation`].
    RedLightViolation,
    /// See [`HazardType::PedestrianCrossing`].
    PedestrianCrossing,
    /// See [`HazardType::TransitStopPedestrian`].
    TransitStopPedestrian,
    /// See [`HazardType::VehicleTurning`].
    VehicleTurning,
    /// See [`HazardType::CurveSpeed`].
    CurveSpeed,
    /// See [`HazardType::ForwardCollision`].
    ForwardCollision,
    /// See [`HazardType::EmergencyBrakeLight`].
    EmergencyBrakeLight,
    /// See [`HazardType::RailCrossing`].
    RailCrossing,
}

impl HazardType {
    /// Map a wire application id to a hazard type.
    pub fn from_app_id(app_id: u64) -> Option<Self> {
        match app_id {
            1 => Some(Self::CurveSpeed),
            2 => Some(Self::ForwardCollision),
            3 => Some(Self::EmergencyBrakeLight),
            6 => Some(Self::PedestrianCrossing),
            7 => Some(Self::VehicleTurning),
            8 => Some(Self::TransitStopPedestrian(TransitVariant::Vehicle)),
            10 => Some(Self::RailCrossing),
            13 => Some(Self::TransitStopPedestrian(
                TransitVariant::PassengerOwnVehicle,
            )),
            14 => Some(Self::RedLightViolation),
            _ => None,
        }
    }

    /// Wire application id of this hazard type.
    pub fn app_id(&self) -> u64 {
        match self {
            Self::CurveSpeed => 1,
            Self::ForwardCollision => 2,
            Self::EmergencyBrakeLight => 3,
            Self::PedestrianCrossing => 6,
            Self::VehicleTurning => 7,
            Self::TransitStopPedestrian(TransitVariant::Vehicle) => 8,
            Self::RailCrossing => 10,
            Self::TransitStopPedestrian(TransitVariant::PassengerOwnVehicle) => 13,
            Self::RedLightViolation => 14,
        }
    }

    /// The variant-erased kind.
    pub fn kind(&self) -> HazardKind {
        match self {
            Self::RedLightViolation => HazardKind::RedLightViolation,
            Self::PedestrianCrossing => HazardKind::PedestrianCrossing,
            Self::TransitStopPedestrian(_) => HazardKind::TransitStopPedestrian,
            Self::VehicleTurning => HazardKind::VehicleTurning,
            Self::CurveSpeed => HazardKind::CurveSpeed,
            Self::ForwardCollision => HazardKind::ForwardCollision,
            Self::EmergencyBrakeLight => HazardKind::EmergencyBrakeLight,
            Self::RailCrossing => HazardKind::RailCrossing,
        }
    }
}

impl fmt::Display for HazardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RedLightViolation => "red-light violation",
            Self::PedestrianCrossing => "pedestrian crossing",
            Self::TransitStopPedestrian(TransitVariant::Vehicle) => "transit-stop pedestrian",
            Self::TransitStopPedestrian(TransitVariant::PassengerOwnVehicle) => {
                "transit-stop pedestrian (passing vehicle)"
            }
            Self::VehicleTurning => "vehicle turning",
            Self::CurveSpeed => "curve speed",
            Self::ForwardCollision => "forward collision",
            Self::EmergencyBrakeLight => "emergency brake light",
            Self::RailCrossing => "rail crossing",
        };
        f.write_str(name)
    }
}

/// One inbound hazard notification.
///
/// Events are consumed synchronously by the arbiter. Only the displayed and
/// queued ones are retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardEvent {
    /// Hazard type.
    pub hazard_type: HazardType,
    /// Type-scoped event code.
    pub event_code: String,
    /// Identity stable across refresh messages of the same hazard.
    pub instance_id: String,
    /// Severity 0..=2, or 0/1 for rail-crossing ladder steps.
    pub severity: u8,
    /// Bearing to the hazard in degrees, `[0, 360)`.
    pub bearing_deg: f64,
    /// Distance to the hazard in meters.
    pub distance_m: f64,
    /// Free text for banners.
    pub free_text: String,
    /// Requested dwell; `None` selects the type default.
    pub dwell_ms: Option<u64>,
    /// Correlation id carried into log events.
    pub correlation_id: String,
}

impl HazardEvent {
    /// Create an event with neutral geometry and no instance.
    #[must_use]
    pub fn new(hazard_type: HazardType, event_code: impl Into<String>) -> Self {
        Self {
            hazard_type,
            event_code: event_code.into(),
            instance_id: String::new(),
            severity: 0,
            bearing_deg: 0.0,
            distance_m: 0.0,
            free_text: String::new(),
            dwell_ms: None,
            correlation_id: String::new(),
        }
    }

    /// Set the instance id.
    #[must_use]
    pub fn with_instance(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = instance_id.into();
        self
    }

    /// Set the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: u8) -> Self {
        self.severity = severity;
        self
    }

    /// Set bearing and distance.
    #[must_use]
    pub fn with_geometry(mut self, bearing_deg: f64, distance_m: f64) -> Self {
        self.bearing_deg = bearing_deg;
        self.distance_m = distance_m;
        self
    }

    /// Set the free text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.free_text = text.into();
        self
    }

    /// Set an explicit dwell. Zero selects the type default.
    #[must_use]
    pub fn with_dwell_ms(mut self, dwell_ms: u64) -> Self {
        self.dwell_ms = (dwell_ms > 0).then_some(dwell_ms);
        self
    }

    /// Set the correlation id.
    #[must_use]
    pub fn with_correlation(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = correlation_id.into();
        self
    }

    /// The `(kind, instance)` pair that identifies a hazard in the queue.
    pub fn key(&self) -> (HazardKind, &str) {
        (self.hazard_type.kind(), self.instance_id.as_str())
    }

    /// Whether `other` refers to the same hazard instance.
    pub fn same_instance(&self, other: &HazardEvent) -> bool {
        self.key() == other.key()
    }

    /// Field-by-field identity used by the geometry comparator.
    ///
    /// Floats compare by bit pattern so a refresh carrying the exact same
    /// reading is recognised as identical.
    pub fn is_identical(&self, other: &HazardEvent) -> bool {
        self.hazard_type == other.hazard_type
            && self.bearing_deg.to_bits() == other.bearing_deg.to_bits()
            && self.free_text == other.free_text
            && self.dwell_ms == other.dwell_ms
            && self.distance_m.to_bits() == other.distance_m.to_bits()
            && self.event_code == other.event_code
            && self.instance_id == other.instance_id
            && self.severity == other.severity
    }

    /// Dwell to arm for this event, falling back to `default_ms`.
    pub fn effective_dwell_ms(&self, default_ms: u64) -> u64 {
        self.dwell_ms.filter(|ms| *ms > 0).unwrap_or(default_ms)
    }
}
