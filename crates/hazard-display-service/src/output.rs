//! Outbound JSON-lines records.
//!
//! The arbiter speaks in typed images and cues; the display speaks in asset
//! paths and sound indices. [`render`] translates one into the other.

use hazard_arbiter::{AssetCatalog, AudioDirective, Dispatch, Image, TransitionEvent};
use serde::{Deserialize, Serialize};

/// Display directive with every image resolved to its asset path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDisplay {
    /// Full-surface image.
    pub surface_image: String,
    /// Overlays drawn on top of the surface.
    pub visible_zones: Vec<String>,
    /// Blink interval when something on screen blinks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blink_interval_ms: Option<u64>,
    /// Text for the bottom banner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom_banner_text: Option<String>,
}

/// One dispatch cycle as written to the output stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDispatch {
    /// Display directive, when the display changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<RenderedDisplay>,
    /// Sound to start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_index: Option<u8>,
    /// Path of the sound to start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_path: Option<String>,
    /// Whether playback should stop.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stop_audio: bool,
    /// Transition log events.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<TransitionEvent>,
}

fn path(catalog: &AssetCatalog, image: Image) -> String {
    catalog.image_path(image).to_string()
}

/// Resolve a dispatch against the asset catalog.
pub fn render(dispatch: &Dispatch, catalog: &AssetCatalog) -> RenderedDispatch {
    let display = dispatch.display.as_ref().map(|d| RenderedDisplay {
        surface_image: path(catalog, d.surface_image),
        visible_zones: d.visible_zones.iter().map(|i| path(catalog, *i)).collect(),
        blink_interval_ms: d.blink_interval_ms,
        bottom_banner_text: d.bottom_banner_text.clone(),
    });

    let (sound_index, sound_path, stop_audio) = match dispatch.audio {
        Some(AudioDirective::Play(cue)) => (
            Some(cue.index()),
            Some(catalog.sound_path(cue).to_string()),
            false,
        ),
        Some(AudioDirective::Stop) => (None, None, true),
        None => (None, None, false),
    };

    RenderedDispatch {
        display,
        sound_index,
        sound_path,
        stop_audio,
        transitions: dispatch.transitions.clone(),
    }
}
