//! Driver settings with persistence
//!
//! Settings are saved to `~/.config/skirmish/settings.toml`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use skirmish_combat::{
    ArmorModel, CombatSettings, CombatantConfig, DamageKind, PoolConfig, StatusEffectKind,
};
use tracing::{info, warn};

/// All driver settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub combat: CombatSettings,
    pub duel: DuelSettings,
}

impl GameSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("skirmish"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => {
                info!("Loaded settings from {:?}", path);
                settings
            }
            Err(e) => {
                warn!("{:#}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Load and validate settings from a specific file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read settings file")?;
        Self::parse(&content)
    }

    /// Parse and validate settings from TOML text
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let settings: Self = toml::from_str(content).context("Failed to parse settings")?;
        settings.combat.validate().context("Invalid combat settings")?;
        settings.duel.validate(&settings.combat)?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };

        let path = dir.join("settings.toml");

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// Scripted duel between two combatants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelSettings {
    pub challenger: DuelistSettings,
    pub defender: DuelistSettings,
    /// Distance between the two at spawn
    pub distance: f32,
    /// Simulation step in seconds
    pub step: f32,
    /// Give up after this many simulated seconds
    pub max_duration: f32,
    /// Seed for crit, proc, and block rolls
    pub seed: u64,
}

impl Default for DuelSettings {
    fn default() -> Self {
        Self {
            challenger: DuelistSettings {
                combatant: CombatantConfig {
                    name: "Vanguard".to_string(),
                    max_health: 120.0,
                    ..Default::default()
                },
                weapon: WeaponProfile::default(),
                block_chance: 0.2,
            },
            defender: DuelistSettings {
                combatant: CombatantConfig {
                    name: "Warden".to_string(),
                    shield: Some(PoolConfig {
                        max: 80.0,
                        regen_rate: 12.0,
                        regen_delay: 2.5,
                    }),
                    armor_model: ArmorModel::Durability,
                    ..Default::default()
                },
                weapon: WeaponProfile {
                    kind: DamageKind::Energy,
                    base_damage: 14.0,
                    attack_interval: 0.9,
                    proc: Some(StatusEffectKind::Burn),
                    ..Default::default()
                },
                block_chance: 0.35,
            },
            distance: 3.0,
            step: 1.0 / 30.0,
            max_duration: 60.0,
            seed: 42,
        }
    }
}

impl DuelSettings {
    /// Check the duel can run its full length on the arena clock
    pub fn validate(&self, combat: &CombatSettings) -> anyhow::Result<()> {
        self.challenger.combatant.validate().context("Invalid challenger")?;
        self.defender.combatant.validate().context("Invalid defender")?;
        anyhow::ensure!(
            self.step.is_finite() && self.step > 0.0,
            "Duel step must be positive, got {}",
            self.step
        );
        anyhow::ensure!(
            self.step <= combat.time.max_delta_time,
            "Duel step {} exceeds max_delta_time {}",
            self.step,
            combat.time.max_delta_time
        );
        anyhow::ensure!(
            combat.time.time_scale > 0.0,
            "Duel needs a running clock, time_scale is {}",
            combat.time.time_scale
        );
        anyhow::ensure!(
            self.max_duration.is_finite() && self.max_duration >= 0.0,
            "Invalid duel duration {}",
            self.max_duration
        );
        Ok(())
    }
}

/// One side of a duel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelistSettings {
    pub combatant: CombatantConfig,
    pub weapon: WeaponProfile,
    /// Chance to raise a block each time the opponent attacks
    pub block_chance: f32,
}

/// How a duelist attacks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponProfile {
    pub kind: DamageKind,
    pub base_damage: f32,
    /// Seconds between attacks
    pub attack_interval: f32,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
    pub armor_penetration: f32,
    pub shield_penetration: f32,
    pub life_steal: f32,
    pub knockback: f32,
    pub stun_duration: f32,
    /// Status effect this weapon can inflict
    pub proc: Option<StatusEffectKind>,
    pub proc_chance: f32,
    pub proc_duration: f32,
}

impl Default for WeaponProfile {
    fn default() -> Self {
        Self {
            kind: DamageKind::Kinetic,
            base_damage: 18.0,
            attack_interval: 1.2,
            crit_chance: 0.15,
            crit_multiplier: 1.5,
            armor_penetration: 0.1,
            shield_penetration: 0.0,
            life_steal: 0.05,
            knockback: 2.0,
            stun_duration: 0.0,
            proc: Some(StatusEffectKind::Bleed),
            proc_chance: 0.25,
            proc_duration: 3.0,
        }
    }
}
