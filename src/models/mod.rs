//! Domain models for porchlight.
//!
//! - [`Repository`]: a GitHub repository as the API reports it, external
//!   and read-only, never mutated locally.
//! - Visit wire types: [`CreateVisitInput`], [`SignalInput`] (the four
//!   externally accepted reveal signals), and the snapshot views the HTTP
//!   surface returns.
//!
//! The reveal state machine itself lives in [`crate::reveal`]; these are
//! the plain serde types that cross the wire.

mod repository;
mod visit;

pub use repository::*;
pub use visit::*;
