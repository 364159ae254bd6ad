//! Image and sound assets, and the catalog that resolves them to files.
//!
//! Directives carry typed [`Image`] and [`SoundCue`] values. The catalog maps
//! every variant to a path and is validated in full when it is loaded, so a
//! missing entry is a startup error instead of a silent gap at runtime.

use crate::error::{ArbiterError, ArbiterResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default catalog document, embedded at build time.
pub const DEFAULT_CATALOG_YAML: &str = include_str!("assets.yaml");

/// Every image the display can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Image {
    /// Shown while disconnected.
    Splash,
    /// Idle background.
    SystemReady,

    /// Pedestrian-crossing base.
    EpcwBase,
    /// Near-side caution overlay.
    EpcwCautionNear,
    /// Far-side caution overlay.
    EpcwCautionFar,
    /// Left-side caution overlay.
    EpcwCautionLeft,
    /// Right-side caution overlay.
    EpcwCautionRight,
    /// Near-side warning overlay.
    EpcwWarningNear,
    /// Far-side warning overlay.
    EpcwWarningFar,
    /// Left-side warning overlay.
    EpcwWarningLeft,
    /// Right-side warning overlay.
    EpcwWarningRight,

    /// Vehicle-turning base.
    TurningBase,
    /// Vehicle-turning caution.
    TurningCaution,
    /// Vehicle-turning warning.
    TurningWarning,

    /// Transit vehicle base.
    TransitVehicleBase,
    /// Passing-vehicle base.
    TransitPovBase,
    /// Transit vehicle, zone 2 inform.
    TransitInformZone2,
    /// Transit vehicle, zone 3 warning.
    TransitWarningZone3,
    /// Transit vehicle, zone 4 warning.
    TransitWarningZone4,
    /// Transit vehicle, zone 5 inform.
    TransitInformZone5,
    /// Transit vehicle, zone 5 warning.
    TransitWarningZone5,
    /// Transit vehicle, zone 6 inform.
    TransitInformZone6,
    /// Transit vehicle, zone 6 warning.
    TransitWarningZone6,
    /// Passing vehicle inform.
    PovInform,
    /// Passing vehicle warning.
    PovWarning,
    /// Passing vehicle, pedestrian in road.
    PovWarningRoad,

    /// Red-light alert.
    RedLightAlert,
    /// Red-light warning.
    RedLightWarning,

    /// Forward-collision base art.
    ForwardCollisionBase,
    /// Vehicle ahead, caution.
    ForwardCollisionCaution,
    /// Vehicle ahead, warning.
    ForwardCollisionWarning,

    /// Emergency brake light.
    BrakeLight,

    /// Curve-speed base.
    CurveSpeedBase,
    /// Curve-speed info.
    CurveSpeedInfo,
    /// Curve-speed alert.
    CurveSpeedAlert,
    /// Curve-speed warning.
    CurveSpeedWarning,

    /// Rail crossing: system available.
    RailAvailable,
    /// Rail crossing: approach inform.
    RailApproachInform,
    /// Rail crossing: approach warning, blink phase A.
    RailApproachWarning1,
    /// Rail crossing: approach warning, blink phase B.
    RailApproachWarning2,
    /// Rail crossing: clear HRI inform, blink phase A.
    RailHriInform1,
    /// Rail crossing: clear HRI inform, blink phase B.
    RailHriInform2,
    /// Rail crossing: clear HRI active warning, blink phase A.
    RailHriWarning1,
    /// Rail crossing: clear HRI active warning, blink phase B.
    RailHriWarning2,
    /// Rail crossing: system unavailable.
    RailUnavailable,
}

impl Image {
    /// Every image, in catalog order.
    pub const ALL: [Image; 45] = [
        Image::Splash,
        Image::SystemReady,
        Image::EpcwBase,
        Image::EpcwCautionNear,
        Image::EpcwCautionFar,
        Image::EpcwCautionLeft,
        Image::EpcwCautionRight,
        Image::EpcwWarningNear,
        Image::EpcwWarningFar,
        Image::EpcwWarningLeft,
        Image::EpcwWarningRight,
        Image::TurningBase,
        Image::TurningCaution,
        Image::TurningWarning,
        Image::TransitVehicleBase,
        Image::TransitPovBase,
        Image::TransitInformZone2,
        Image::TransitWarningZone3,
        Image::TransitWarningZone4,
        Image::TransitInformZone5,
        Image::TransitWarningZone5,
        Image::TransitInformZone6,
        Image::TransitWarningZone6,
        Image::PovInform,
        Image::PovWarning,
        Image::PovWarningRoad,
        Image::RedLightAlert,
        Image::RedLightWarning,
        Image::ForwardCollisionBase,
        Image::ForwardCollisionCaution,
        Image::ForwardCollisionWarning,
        Image::BrakeLight,
        Image::CurveSpeedBase,
        Image::CurveSpeedInfo,
        Image::CurveSpeedAlert,
        Image::CurveSpeedWarning,
        Image::RailAvailable,
        Image::RailApproachInform,
        Image::RailApproachWarning1,
        Image::RailApproachWarning2,
        Image::RailHriInform1,
        Image::RailHriInform2,
        Image::RailHriWarning1,
        Image::RailHriWarning2,
        Image::RailUnavailable,
    ];
}

/// How urgent a sound cue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CueUrgency {
    /// Informational chime.
    Inform = 1,
    /// Caution prompt.
    Caution = 2,
    /// Warning prompt.
    Warning = 3,
}

/// Every sound cue, numbered by its wire sound index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[expect(missing_docs, reason = "variant names mirror the sound file names")]
pub enum SoundCue {
    CautionPedestrianAhead = 0,
    WarningPedestrianAhead = 1,
    CautionPedestrianRight = 2,
    WarningPedestrianRight = 3,
    CautionVehicleAhead = 4,
    WarningVehicleAhead = 5,
    CautionVehicleLeft = 6,
    CautionVehicleCrossing = 7,
    ForwardCollision = 8,
    TrainHonk = 9,
    EpcwCautionFar = 10,
    EpcwCautionLeft = 11,
    EpcwCautionNear = 12,
    EpcwCautionNearCautionFar = 13,
    EpcwCautionNearCautionLeft = 14,
    EpcwCautionNearCautionRight = 15,
    EpcwCautionRight = 16,
    EpcwWarningFar = 17,
    EpcwWarningLeft = 18,
    EpcwWarningNear = 19,
    EpcwWarningNearCautionFar = 20,
    EpcwWarningNearWarningLeft = 21,
    EpcwWarningNearWarningRight = 22,
    EpcwWarningRight = 23,
    EpcwWarningNearWarningFar = 24,
    BrakeLight = 25,
    BrakeLightWarning = 26,
    TransitCautionCurb = 27,
    TransitCautionRoad = 28,
    TransitWarningRoad = 29,
    RailInform = 30,
    RailWarning = 31,
}

impl SoundCue {
    /// Every cue, ordered by sound index.
    pub const ALL: [SoundCue; 32] = [
        SoundCue::CautionPedestrianAhead,
        SoundCue::WarningPedestrianAhead,
        SoundCue::CautionPedestrianRight,
        SoundCue::WarningPedestrianRight,
        SoundCue::CautionVehicleAhead,
        SoundCue::WarningVehicleAhead,
        SoundCue::CautionVehicleLeft,
        SoundCue::CautionVehicleCrossing,
        SoundCue::ForwardCollision,
        SoundCue::TrainHonk,
        SoundCue::EpcwCautionFar,
        SoundCue::EpcwCautionLeft,
        SoundCue::EpcwCautionNear,
        SoundCue::EpcwCautionNearCautionFar,
        SoundCue::EpcwCautionNearCautionLeft,
        SoundCue::EpcwCautionNearCautionRight,
        SoundCue::EpcwCautionRight,
        SoundCue::EpcwWarningFar,
        SoundCue::EpcwWarningLeft,
        SoundCue::EpcwWarningNear,
        SoundCue::EpcwWarningNearCautionFar,
        SoundCue::EpcwWarningNearWarningLeft,
        SoundCue::EpcwWarningNearWarningRight,
        SoundCue::EpcwWarningRight,
        SoundCue::EpcwWarningNearWarningFar,
        SoundCue::BrakeLight,
        SoundCue::BrakeLightWarning,
        SoundCue::TransitCautionCurb,
        SoundCue::TransitCautionRoad,
        SoundCue::TransitWarningRoad,
        SoundCue::RailInform,
        SoundCue::RailWarning,
    ];

    /// Wire sound index.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Look up a cue by sound index.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Urgency used when deciding whether a cue may cut in.
    pub fn urgency(self) -> CueUrgency {
        use SoundCue::*;
        match self {
            RailInform => CueUrgency::Inform,
            CautionPedestrianAhead
            | CautionPedestrianRight
            | CautionVehicleAhead
            | CautionVehicleLeft
            | CautionVehicleCrossing
            | EpcwCautionFar
            | EpcwCautionLeft
            | EpcwCautionNear
            | EpcwCautionNearCautionFar
            | EpcwCautionNearCautionLeft
            | EpcwCautionNearCautionRight
            | EpcwCautionRight
            | TransitCautionCurb
            | TransitCautionRoad => CueUrgency::Caution,
            WarningPedestrianAhead
            | WarningPedestrianRight
            | WarningVehicleAhead
            | ForwardCollision
            | TrainHonk
            | EpcwWarningFar
            | EpcwWarningLeft
            | EpcwWarningNear
            | EpcwWarningNearCautionFar
            | EpcwWarningNearWarningLeft
            | EpcwWarningNearWarningRight
            | EpcwWarningRight
            | EpcwWarningNearWarningFar
            | BrakeLight
            | BrakeLightWarning
            | TransitWarningRoad
            | RailWarning => CueUrgency::Warning,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    images: BTreeMap<Image, String>,
    sounds: BTreeMap<SoundCue, String>,
}

/// Validated mapping from every image and cue to an asset path.
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    images: BTreeMap<Image, String>,
    sounds: BTreeMap<SoundCue, String>,
}

impl AssetCatalog {
    /// Load the embedded default catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded document is incomplete.
    pub fn load_default() -> ArbiterResult<Self> {
        Self::from_yaml(DEFAULT_CATALOG_YAML)
    }

    /// Parse and validate a catalog document.
    ///
    /// # Errors
    ///
    /// Returns [`ArbiterError::CatalogParse`] for malformed YAML and
    /// [`ArbiterError::MissingAsset`] naming the first variant without a
    /// non-empty path.
    pub fn from_yaml(yaml: &str) -> ArbiterResult<Self> {
        let doc: CatalogDocument = serde_yaml::from_str(yaml)?;
        let catalog = Self {
            images: doc.images,
            sounds: doc.sounds,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> ArbiterResult<()> {
        for image in Image::ALL {
            if self.images.get(&image).is_none_or(|p| p.trim().is_empty()) {
                return Err(ArbiterError::missing_asset(format!("image {image:?}")));
            }
        }
        for cue in SoundCue::ALL {
            if self.sounds.get(&cue).is_none_or(|p| p.trim().is_empty()) {
                return Err(ArbiterError::missing_asset(format!(
                    "sound {cue:?} (index {})",
                    cue.index()
                )));
            }
        }
        Ok(())
    }

    /// Asset path for an image.
    pub fn image_path(&self, image: Image) -> &str {
        self.images.get(&image).map_or("", String::as_str)
    }

    /// Asset path for a sound cue.
    pub fn sound_path(&self, cue: SoundCue) -> &str {
        self.sounds.get(&cue).map_or("", String::as_str)
    }
}
