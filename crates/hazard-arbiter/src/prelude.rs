//! Prelude for hazard-arbiter.
//!
//! This module re-exports the most commonly used types for convenient importing.
//!
//! # Example
//!
//! ```rust
//! use hazard_arbiter::prelude::*;
//!
//! # fn main() -> ArbiterResult<()> {
//! let mut arbiter = HazardArbiter::new(ArbiterConfig::default())?;
//! let dispatch = arbiter.connect(0);
//! assert_eq!(
//!     dispatch.display.map(|d| d.surface_image),
//!     Some(Image::SystemReady)
//! );
//! # Ok(())
//! # }
//! ```

pub use crate::arbiter::HazardArbiter;
pub use crate::assets::{AssetCatalog, Image, SoundCue};
pub use crate::audio::AudioDirective;
pub use crate::config::{ArbiterConfig, ArbiterConfigBuilder, SuppressionFlags};
pub use crate::directive::{Dispatch, DisplayDirective, HazardSource, TransitionEvent};
pub use crate::error::{ArbiterError, ArbiterResult};
pub use crate::event::{HazardEvent, HazardKind, HazardType, TransitVariant};
pub use crate::message::InboundMessage;
pub use crate::substate::Rung;
