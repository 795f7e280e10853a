//! Skirmish Combat - Damage resolution and combatant state
//!
//! Provides the type effectiveness table, the damage resolver, shield and
//! armor pools, the timed block gate, status effects, and the arena that
//! ties them together.

pub mod arena;
pub mod block;
pub mod combatant;
pub mod config;
pub mod effectiveness;
pub mod error;
pub mod events;
pub mod pool;
pub mod request;
pub mod resolver;
pub mod status;

pub use arena::Arena;
pub use block::{BlockGate, BlockPhase, BlockTransition};
pub use combatant::CombatantState;
pub use config::{ArmorModel, BlockConfig, CombatSettings, CombatantConfig, PoolConfig};
pub use effectiveness::{DamageKind, DefenseLayer, EffectivenessRow, TypeEffectivenessTable};
pub use error::{CombatError, ConfigError};
pub use events::{CombatEvent, CombatListener, CombatLog, EventBus, ListenerId};
pub use pool::{PoolKind, PoolTransition, ResourcePool};
pub use request::{roll_critical, DamageRequest, DamageSource};
pub use resolver::{resolve, DefenderSnapshot, ResolvedDamage};
pub use status::{StatusEffect, StatusEffectKind, StatusEffectLedger, StatusTransition};
