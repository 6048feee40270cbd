//! Domain layer - Array vocabulary and port definitions
//!
//! This module defines the transport port that adapters implement and the
//! typed values exchanged with the array.

pub mod ports;
pub mod types;

pub use ports::*;
pub use types::*;
