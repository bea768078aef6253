//! Data models for the client
//!
//! Each sub-module covers one piece of the upload flow. Everything here is
//! ephemeral state scoped to a single run of the client.

mod action;
mod preferences;
mod processing;
mod progress;
mod video;

pub use action::*;
pub use preferences::*;
pub use processing::*;
pub use progress::*;
pub use video::*;
