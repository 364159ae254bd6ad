//! Alert arbitration and presentation-state core for in-vehicle hazard displays.
//!
//! Several independent safety applications report hazards to one display.
//! This crate decides, for every inbound event and every expired dwell timer,
//! which single hazard is presented, with which image and blink pattern and
//! which sound cue.
//!
//! # Architecture
//!
//! - **Type-priority comparator** ([`rank`]): hazard-type tiers with the
//!   transit/vehicle-turning exception
//! - **Geometry comparator** ([`compare`]): direction sector and distance
//! - **Dwell-timer registry** ([`DwellTimerRegistry`]): single-shot timers, one per key
//! - **Sub-state machines** ([`substate`]): pedestrian directions, transit zones,
//!   the rail-crossing ladder and monotonic severity trackers
//! - **Arbitration queue** ([`ArbitrationQueue`]): displayed hazard plus ordered backlog
//! - **Audio selector** ([`AudioSelector`]): one cue per cycle, never a downgrade
//! - **Directive emitter** ([`DirectiveEmitter`]): display and log output, filtered
//!   by the [`SuppressionFlags`]
//! - **Asset catalog** ([`AssetCatalog`]): validated image and sound paths
//!
//! # Control Flow
//!
//! ```text
//!   inbound event ──► sub-state update ──► rank / compare ──► admit
//!                                                              │
//!        ┌─────────────────────────────────────────────────────┘
//!        ▼
//!   present ──► DisplayDirective + AudioDirective + TransitionEvents
//!        ▲
//!        └──── dwell timer expiry (advance) ◄── next_deadline
//! ```
//!
//! The arbiter is single-threaded and owns no clock. Every entry point takes
//! a logical millisecond timestamp, so identical inputs replay identically.
//!
//! # Example
//!
//! ```rust
//! use hazard_arbiter::prelude::*;
//!
//! # fn main() -> ArbiterResult<()> {
//! let mut arbiter = HazardArbiter::new(ArbiterConfig::default())?;
//! arbiter.connect(0);
//!
//! let red_light = HazardEvent::new(HazardType::RedLightViolation, "36")
//!     .with_instance("rl-1")
//!     .with_severity(1);
//! let dispatch = arbiter.handle_event(red_light, 10);
//!
//! assert_eq!(arbiter.surface_image(), Image::RedLightAlert);
//! assert_eq!(dispatch.audio, Some(AudioDirective::Play(SoundCue::BrakeLightWarning)));
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod arbiter;
mod assets;
mod audio;
mod blink;
mod config;
mod directive;
mod error;
mod event;
mod geometry;
mod message;
mod priority;
mod queue;
pub mod substate;
mod timer;

pub mod prelude;

pub use arbiter::HazardArbiter;
pub use assets::{AssetCatalog, CueUrgency, DEFAULT_CATALOG_YAML, Image, SoundCue};
pub use audio::{AudioDirective, AudioRequest, AudioSelector};
pub use blink::{BlinkMachine, BlinkPhase, BlinkTarget};
pub use config::{ArbiterConfig, ArbiterConfigBuilder, SuppressionFlags};
pub use directive::{DirectiveEmitter, Dispatch, DisplayDirective, HazardSource, TransitionEvent};
pub use error::{ArbiterError, ArbiterResult};
pub use event::{HazardEvent, HazardKind, HazardType, TransitVariant};
pub use geometry::{FRONT_EDGE_DEG, FRONT_WRAP_DEG, GeometryOrder, compare, is_front};
pub use message::{ConfigEntry, InboundMessage, decode, decode_hazard};
pub use priority::{PriorityContext, Rank, TRANSIT_IN_AREA_CODES, rank};
pub use queue::{Admission, ArbitrationQueue};
pub use timer::{DwellTimerRegistry, Expiry, TimerHandle, TimerKey};
