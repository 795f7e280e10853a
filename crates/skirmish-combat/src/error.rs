use skirmish_core::CombatantId;

/// Invalid combat configuration values
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be a finite non-negative number, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("{field} must be a finite positive number, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("max health must be positive, got {0}")]
    NonPositiveHealth(f32),

    #[error("block arc must be in (0, 360] degrees, got {0}")]
    InvalidBlockArc(f32),

    #[error("slow factor must be in [0, 1], got {0}")]
    InvalidSlowFactor(f32),
}

/// Errors from arena-level combat operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CombatError {
    #[error("unknown combatant {0}")]
    UnknownCombatant(CombatantId),

    #[error("invalid combatant configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}
