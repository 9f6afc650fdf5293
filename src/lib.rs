//! Version-aware merging of game-scripting API declarations.
//!
//! Per-release snapshots are parsed from documentation tables or cached wiki
//! pages ([`parser`]), merged into one collection whose entities carry the
//! versions they are valid for ([`model`]), and emitted for a chosen release
//! ([`render`]).

pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod store;

pub use error::{Error, Result};
