//! Skirmish Core - Foundational types shared by the combat simulation
//!
//! This crate provides:
//! - Mathematical primitives (re-exported from glam)
//! - Combatant identifiers
//! - Transform used for facing and hit directions
//! - Fixed-step simulation clock

pub mod time;
pub mod types;

pub use glam::{Quat, Vec3};
pub use time::{SimTime, TimeConfig};
pub use types::{CombatantId, Transform};
