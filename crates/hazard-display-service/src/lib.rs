//! Session runtime for the hazard arbiter.
//!
//! One tokio task owns the [`HazardArbiter`](hazard_arbiter::HazardArbiter)
//! outright. Everything else talks to it over channels:
//!
//! ```text
//!   input lines ──► SessionHandle ──mpsc──► Session task ──mpsc──► Dispatch
//!                                             │    ▲
//!                                             ▼    │
//!                                       sleep_until(next_deadline)
//! ```
//!
//! The `hazardd` binary wires stdin (or a file) to the handle and writes every
//! dispatch, resolved to asset paths, to stdout as one JSON line.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod config;
pub mod output;
pub mod session;

pub use config::ServiceConfig;
pub use output::{RenderedDispatch, RenderedDisplay, render};
pub use session::{Session, SessionHandle, SessionInput, feed_lines};
