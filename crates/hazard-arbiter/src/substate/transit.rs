//! Transit-stop pedestrian (TSPW) zones.
//!
//! Five zones around a stopped transit vehicle are shown independently, each
//! guarded by its own dwell timer. A zone's cue only plays when it is more
//! urgent than every cue the other visible zones already played.

use super::ImageChange;
use crate::assets::{Image, SoundCue};
use crate::event::TransitVariant;
use std::collections::BTreeMap;

/// Zone around the transit vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransitZone {
    /// `10`: on the curb beside the vehicle.
    OnCurbside,
    /// `32`: in the roadway ahead, center.
    InRoadwayFwdCenter,
    /// `33`: in the roadway ahead, curb side.
    InRoadwayFwdCurb,
    /// `34`: in the roadway behind, center.
    InRoadwayRearCenter,
    /// `35`: in the roadway behind, curb side.
    InRoadwayRearCurb,
}

impl TransitZone {
    /// Every zone in display order.
    pub const ALL: [TransitZone; 5] = [
        TransitZone::OnCurbside,
        TransitZone::InRoadwayFwdCenter,
        TransitZone::InRoadwayFwdCurb,
        TransitZone::InRoadwayRearCenter,
        TransitZone::InRoadwayRearCurb,
    ];

    /// Wire event code of the zone.
    pub fn code(self) -> &'static str {
        match self {
            Self::OnCurbside => "10",
            Self::InRoadwayFwdCenter => "32",
            Self::InRoadwayFwdCurb => "33",
            Self::InRoadwayRearCenter => "34",
            Self::InRoadwayRearCurb => "35",
        }
    }

    /// Zone for a wire event code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|z| z.code() == code)
    }
}

/// TSPW event codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitCode {
    /// `3`: transit vehicle entered the stop area.
    AreaEntered,
    /// `4`: transit vehicle left the stop area.
    AreaExited,
    /// `5`: pedestrian detected, no action.
    Detected,
    /// `20`: alert complete.
    AlertComplete,
    /// `21`: pedestrian in area.
    InArea,
    /// Pedestrian in one zone.
    Zone(TransitZone),
}

impl TransitCode {
    /// Parse a wire event code.
    pub fn parse(code: &str) -> Option<Self> {
        Some(match code {
            "3" => Self::AreaEntered,
            "4" => Self::AreaExited,
            "5" => Self::Detected,
            "20" => Self::AlertComplete,
            "21" => Self::InArea,
            other => Self::Zone(TransitZone::from_code(other)?),
        })
    }
}

/// Image and cue for one zone at one severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneAsset {
    /// Overlay, `None` when the variant has no picture for the zone.
    pub image: Option<Image>,
    /// Cue, `None` when the variant has no sound for the zone.
    pub cue: Option<SoundCue>,
}

/// Look up the zone table. `None` for severities outside 1..=2.
pub fn zone_asset(zone: TransitZone, severity: u8, variant: TransitVariant) -> Option<ZoneAsset> {
    use Image::*;
    use SoundCue::{TransitCautionCurb, TransitCautionRoad, TransitWarningRoad};
    use TransitVariant::{PassengerOwnVehicle as Pov, Vehicle};

    if !(1..=2).contains(&severity) {
        return None;
    }
    let (image, cue) = match (zone, severity, variant) {
        (TransitZone::OnCurbside, _, Vehicle) => (Some(TransitInformZone2), Some(TransitCautionCurb)),
        (TransitZone::OnCurbside, _, Pov) => (None, None),

        (TransitZone::InRoadwayFwdCenter, 1, Vehicle) => {
            (Some(TransitInformZone5), Some(TransitCautionRoad))
        }
        (TransitZone::InRoadwayFwdCenter, 1, Pov) => (Some(PovInform), Some(TransitCautionRoad)),
        (TransitZone::InRoadwayFwdCenter, _, Vehicle) => {
            (Some(TransitWarningZone5), Some(TransitWarningRoad))
        }
        (TransitZone::InRoadwayFwdCenter, _, Pov) => {
            (Some(PovWarningRoad), Some(TransitWarningRoad))
        }

        (TransitZone::InRoadwayFwdCurb, _, Vehicle) => {
            (Some(TransitWarningZone3), Some(TransitWarningRoad))
        }
        (TransitZone::InRoadwayFwdCurb, _, Pov) => (None, None),

        (TransitZone::InRoadwayRearCenter, 1, Vehicle) => {
            (Some(TransitInformZone6), Some(TransitCautionRoad))
        }
        (TransitZone::InRoadwayRearCenter, _, Vehicle) => {
            (Some(TransitWarningZone6), Some(TransitWarningRoad))
        }
        (TransitZone::InRoadwayRearCenter, _, Pov) => (Some(PovWarning), Some(TransitWarningRoad)),

        (TransitZone::InRoadwayRearCurb, _, Vehicle) => {
            (Some(TransitWarningZone4), Some(TransitWarningRoad))
        }
        (TransitZone::InRoadwayRearCurb, _, Pov) => (Some(PovWarning), Some(TransitWarningRoad)),
    };
    Some(ZoneAsset { image, cue })
}

/// Result of showing a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZoneShow {
    /// Cue that passed the rank gate.
    pub cue: Option<SoundCue>,
    /// Image change when the zone became visible.
    pub transition: Option<ImageChange>,
}

#[derive(Debug, Clone, Copy, Default)]
struct ZoneRecord {
    shown: Option<Image>,
    audio_rank: Option<u8>,
}

/// State of the five zones and the transit episode.
#[derive(Debug, Clone, Default)]
pub struct TransitZones {
    zones: BTreeMap<TransitZone, ZoneRecord>,
    active: Option<TransitVariant>,
}

impl TransitZones {
    /// Create an empty zone set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a transit episode.
    pub fn enter(&mut self, variant: TransitVariant) {
        self.active = Some(variant);
    }

    /// End the transit episode.
    pub fn exit(&mut self) {
        self.active = None;
    }

    /// Whether a transit episode is active.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Highest cue rank held by any zone.
    pub fn highest_rank(&self) -> Option<u8> {
        self.zones.values().filter_map(|z| z.audio_rank).max()
    }

    /// Show a zone.
    ///
    /// The cue passes only if its rank beats [`Self::highest_rank`]. The
    /// zone's held rank is replaced either way. A transition from
    /// `background` is reported when a hidden zone becomes visible.
    pub fn show(&mut self, zone: TransitZone, asset: ZoneAsset, background: Image) -> ZoneShow {
        let rank = asset.cue.map(SoundCue::index);
        let cue = match (rank, self.highest_rank()) {
            (Some(r), Some(held)) if r <= held => {
                tracing::trace!(zone = ?zone, rank = r, held, "transit cue below held rank");
                None
            }
            _ => asset.cue,
        };

        let record = self.zones.entry(zone).or_default();
        record.audio_rank = rank;

        let mut transition = None;
        if let Some(image) = asset.image {
            if record.shown.is_none() {
                transition = Some((background, image));
            }
            record.shown = Some(image);
        }
        ZoneShow { cue, transition }
    }

    /// Hide a zone and drop its held rank.
    ///
    /// Returns the change back to `background` when the zone was visible.
    pub fn clear_zone(&mut self, zone: TransitZone, background: Image) -> Option<ImageChange> {
        let record = self.zones.remove(&zone)?;
        record.shown.map(|image| (image, background))
    }

    /// Hide every zone.
    pub fn clear_all(&mut self, background: Image) -> Vec<ImageChange> {
        TransitZone::ALL
            .into_iter()
            .filter_map(|z| self.clear_zone(z, background))
            .collect()
    }

    /// Whether a zone is visible.
    pub fn is_visible(&self, zone: TransitZone) -> bool {
        self.zones.get(&zone).is_some_and(|z| z.shown.is_some())
    }

    /// Images of visible zones in zone order.
    pub fn visible_images(&self) -> Vec<Image> {
        self.zones.values().filter_map(|z| z.shown).collect()
    }

    /// Forget every zone and end the episode.
    pub fn reset(&mut self) {
        self.zones.clear();
        self.active = None;
    }
}

/// Base image for a transit variant.
pub(crate) fn transit_base(variant: TransitVariant) -> Image {
    match variant {
        TransitVariant::Vehicle => Image::TransitVehicleBase,
        TransitVariant::PassengerOwnVehicle => Image::TransitPovBase,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Image = Image::TransitVehicleBase;

    fn asset(zone: TransitZone, sev: u8) -> Option<ZoneAsset> {
        zone_asset(zone, sev, TransitVariant::Vehicle)
    }

    #[test]
    fn test_zone_codes_roundtrip_and_reject_unknown() {
        for zone in TransitZone::ALL {
            assert_eq!(TransitZone::from_code(zone.code()), Some(zone));
        }
        assert_eq!(TransitCode::parse("31"), None);
        assert_eq!(
            TransitCode::parse("34"),
            Some(TransitCode::Zone(TransitZone::InRoadwayRearCenter))
        );
    }

    #[test]
    fn test_invalid_severity_has_no_asset() {
        assert!(asset(TransitZone::InRoadwayFwdCenter, 0).is_none());
        assert!(asset(TransitZone::InRoadwayFwdCenter, 3).is_none());
    }

    #[test]
    fn test_rank_gate_blocks_equal_or_lower_cues() -> Result<(), &'static str> {
        let mut zones = TransitZones::new();
        let warn = asset(TransitZone::InRoadwayFwdCenter, 2).ok_or("no asset")?;
        let curb = asset(TransitZone::OnCurbside, 1).ok_or("no asset")?;

        let shown = zones.show(TransitZone::InRoadwayFwdCenter, warn, BG);
        assert_eq!(shown.cue, Some(SoundCue::TransitWarningRoad));
        assert_eq!(shown.transition, Some((BG, Image::TransitWarningZone5)));

        let shown = zones.show(TransitZone::OnCurbside, curb, BG);
        assert_eq!(shown.cue, None);
        assert!(shown.transition.is_some());

        let shown = zones.show(TransitZone::InRoadwayRearCurb, warn, BG);
        assert_eq!(shown.cue, None);

        zones.clear_all(BG);
        assert_eq!(zones.highest_rank(), None);
        Ok(())
    }

    #[test]
    fn test_refresh_does_not_log_again() -> Result<(), &'static str> {
        let mut zones = TransitZones::new();
        let inform = asset(TransitZone::InRoadwayRearCenter, 1).ok_or("no asset")?;
        assert!(zones.show(TransitZone::InRoadwayRearCenter, inform, BG).transition.is_some());
        assert!(zones.show(TransitZone::InRoadwayRearCenter, inform, BG).transition.is_none());

        assert_eq!(
            zones.clear_zone(TransitZone::InRoadwayRearCenter, BG),
            Some((Image::TransitInformZone6, BG))
        );
        assert_eq!(zones.clear_zone(TransitZone::InRoadwayRearCenter, BG), None);
        Ok(())
    }

    #[test]
    fn test_passing_vehicle_has_no_curb_picture() -> Result<(), &'static str> {
        let mut zones = TransitZones::new();
        let curb = zone_asset(TransitZone::OnCurbside, 2, TransitVariant::PassengerOwnVehicle)
            .ok_or("no asset")?;
        let shown = zones.show(TransitZone::OnCurbside, curb, Image::TransitPovBase);
        assert_eq!(shown, ZoneShow::default());
        assert!(!zones.is_visible(TransitZone::OnCurbside));
        Ok(())
    }
}
