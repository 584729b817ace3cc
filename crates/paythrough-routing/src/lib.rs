//! Paythrough routing constraints.
//!
//! This crate provides:
//! - [`ChannelSource`] and [`resolve`] provide the node's live channel directory.
//! - [`build_exclusions`] builds the exclusion set that pins a payment's first hop.

pub mod directory;
pub mod error;
pub mod exclusion;

pub use directory::{resolve, ChannelSource};
pub use error::RoutingError;
pub use exclusion::build_exclusions;
