//! Combatant and combat-wide configuration
//!
//! Everything here is plain serde data so it can live in a settings file.
//! Missing fields fall back to the defaults below.

use serde::{Deserialize, Serialize};
use skirmish_core::TimeConfig;

use crate::effectiveness::TypeEffectivenessTable;
use crate::error::ConfigError;

/// How armor interacts with incoming damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArmorModel {
    /// Armor only scales damage down during resolution
    #[default]
    Mitigation,
    /// Armor scales damage down and loses durability equal to what it stopped
    Durability,
}

/// Shield or armor pool parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum (and starting) value
    pub max: f32,
    /// Points regenerated per second
    pub regen_rate: f32,
    /// Seconds without damage before regen starts
    pub regen_delay: f32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max: 50.0,
            regen_rate: 10.0,
            regen_delay: 3.0,
        }
    }
}

impl PoolConfig {
    /// Default armor plating: sturdier, slow to repair
    pub fn armor() -> Self {
        Self {
            max: 25.0,
            regen_rate: 2.0,
            regen_delay: 5.0,
        }
    }

    fn validate(&self, [max, regen_rate, regen_delay]: [&'static str; 3]) -> Result<(), ConfigError> {
        check_non_negative(max, self.max)?;
        check_non_negative(regen_rate, self.regen_rate)?;
        check_non_negative(regen_delay, self.regen_delay)
    }
}

/// Block gate parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockConfig {
    /// Maximum stamina
    pub stamina_max: f32,
    /// Stamina regenerated per second
    pub stamina_regen: f32,
    /// Stamina spent when a block starts
    pub stamina_cost: f32,
    /// Seconds after a block ends before another may start
    pub cooldown: f32,
    /// How long an early block press stays buffered
    pub input_buffer_window: f32,
    /// Full width of the protected arc in degrees
    pub arc_degrees: f32,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            stamina_max: 100.0,
            stamina_regen: 20.0,
            stamina_cost: 25.0,
            cooldown: 0.5,
            input_buffer_window: 0.15,
            arc_degrees: 120.0,
        }
    }
}

impl BlockConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("block.stamina_max", self.stamina_max)?;
        check_non_negative("block.stamina_regen", self.stamina_regen)?;
        check_non_negative("block.stamina_cost", self.stamina_cost)?;
        check_non_negative("block.cooldown", self.cooldown)?;
        check_non_negative("block.input_buffer_window", self.input_buffer_window)?;
        if !(self.arc_degrees > 0.0 && self.arc_degrees <= 360.0) {
            return Err(ConfigError::InvalidBlockArc(self.arc_degrees));
        }
        Ok(())
    }
}

/// Everything needed to spawn one combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatantConfig {
    /// Display name used in logs
    pub name: String,
    pub max_health: f32,
    /// `None` for combatants without a shield
    pub shield: Option<PoolConfig>,
    /// `None` for combatants without armor
    pub armor: Option<PoolConfig>,
    pub block: BlockConfig,
    /// Post-hit grace period in seconds
    pub invincibility_duration: f32,
    /// Movement speed multiplier while slowed
    pub slow_factor: f32,
    pub armor_model: ArmorModel,
}

impl Default for CombatantConfig {
    fn default() -> Self {
        Self {
            name: "Combatant".to_string(),
            max_health: 100.0,
            shield: Some(PoolConfig::default()),
            armor: Some(PoolConfig::armor()),
            block: BlockConfig::default(),
            invincibility_duration: 0.5,
            slow_factor: 0.6,
            armor_model: ArmorModel::Mitigation,
        }
    }
}

impl CombatantConfig {
    /// Unshielded, unarmored combatant with the given health
    pub fn unprotected(name: impl Into<String>, max_health: f32) -> Self {
        Self {
            name: name.into(),
            max_health,
            shield: None,
            armor: None,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_health.is_finite() && self.max_health > 0.0) {
            return Err(ConfigError::NonPositiveHealth(self.max_health));
        }
        if let Some(shield) = &self.shield {
            shield.validate(["shield.max", "shield.regen_rate", "shield.regen_delay"])?;
        }
        if let Some(armor) = &self.armor {
            armor.validate(["armor.max", "armor.regen_rate", "armor.regen_delay"])?;
        }
        self.block.validate()?;
        check_non_negative("invincibility_duration", self.invincibility_duration)?;
        if !(0.0..=1.0).contains(&self.slow_factor) {
            return Err(ConfigError::InvalidSlowFactor(self.slow_factor));
        }
        Ok(())
    }
}

/// Combat-wide settings shared by every combatant in an arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CombatSettings {
    pub effectiveness: TypeEffectivenessTable,
    pub time: TimeConfig,
}

impl CombatSettings {
    /// Reject clock settings that would stall or freeze the step loop
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("time.fixed_timestep", self.time.fixed_timestep)?;
        check_positive("time.max_delta_time", self.time.max_delta_time)?;
        check_non_negative("time.time_scale", self.time.time_scale)
    }
}

fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn check_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}
