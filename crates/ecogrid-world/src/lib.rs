//! Ecosystem simulation engine.
//!
//! Plants and animals live on a growable 2D grid where they age, move,
//! fight, eat and reproduce one tick at a time.

pub mod clock;
pub mod dice;
pub mod entity;
pub mod footprint;
pub mod generation;
pub mod grid;
pub mod interaction;
pub mod observe;
mod placement;
pub mod registry;
pub mod simulation;

pub use clock::{ClockState, TickReport};
pub use dice::{Dice, ScriptedDice, SeededDice};
pub use entity::{Creature, Entity, Vitals};
pub use footprint::Footprint;
pub use generation::GenerationSummary;
pub use grid::{Cell, Grid};
pub use observe::{EntityView, WorldSnapshot};
pub use registry::Registry;
pub use simulation::Ecosystem;
