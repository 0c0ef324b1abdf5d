//! Core types and utilities for the Ecogrid ecosystem simulation.

pub mod types;
pub mod config;
pub mod error;

pub use error::{Error, InvariantViolation, PlacementFailure, Result};
pub use types::*;
pub use config::*;
