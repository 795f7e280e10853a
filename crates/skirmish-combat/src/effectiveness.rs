//! Damage kinds, defense layers, and the type effectiveness table
//!
//! 5 damage kinds: Kinetic, Energy, Explosive, Corrosive, True
//! 3 defense layers: Armor, Shield, Biological
//! Kinetic punches through armor, Energy collapses shields (1.5x each).
//! True damage is always 1.0x and skips every mitigation step.

use serde::{Deserialize, Serialize};

/// Category of an attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum DamageKind {
    #[default]
    Kinetic,
    Energy,
    Explosive,
    Corrosive,
    True,
}

/// Total number of damage kinds (for array indexing)
pub const DAMAGE_KIND_COUNT: usize = 5;

impl DamageKind {
    /// Row index in the effectiveness table
    pub fn index(self) -> usize {
        match self {
            Self::Kinetic => 0,
            Self::Energy => 1,
            Self::Explosive => 2,
            Self::Corrosive => 3,
            Self::True => 4,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Kinetic => "Kinetic",
            Self::Energy => "Energy",
            Self::Explosive => "Explosive",
            Self::Corrosive => "Corrosive",
            Self::True => "True",
        }
    }

    /// Whether this kind ignores every mitigation step
    pub fn bypasses_mitigation(self) -> bool {
        self == Self::True
    }

    /// All damage kind variants
    pub fn all() -> &'static [DamageKind] {
        &[
            Self::Kinetic,
            Self::Energy,
            Self::Explosive,
            Self::Corrosive,
            Self::True,
        ]
    }
}

/// Which resource a hit is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DefenseLayer {
    Armor,
    Shield,
    #[default]
    Biological,
}

/// Total number of defense layers (for array indexing)
pub const DEFENSE_LAYER_COUNT: usize = 3;

impl DefenseLayer {
    /// Column index in the effectiveness table
    pub fn index(self) -> usize {
        match self {
            Self::Armor => 0,
            Self::Shield => 1,
            Self::Biological => 2,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Armor => "Armor",
            Self::Shield => "Shield",
            Self::Biological => "Biological",
        }
    }
}

/// Multiplier row for one damage kind, one column per defense layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectivenessRow {
    pub armor: f32,
    pub shield: f32,
    pub biological: f32,
}

impl EffectivenessRow {
    pub const NEUTRAL: EffectivenessRow = EffectivenessRow::new(1.0, 1.0, 1.0);

    pub const fn new(armor: f32, shield: f32, biological: f32) -> Self {
        Self {
            armor,
            shield,
            biological,
        }
    }

    fn get(&self, layer: DefenseLayer) -> f32 {
        match layer {
            DefenseLayer::Armor => self.armor,
            DefenseLayer::Shield => self.shield,
            DefenseLayer::Biological => self.biological,
        }
    }
}

/// Lookup of (damage kind x defense layer) -> multiplier
///
/// Rows can be overridden from settings; a row missing from the settings file
/// keeps its built-in values. The `True` row has no field here because it is
/// fixed at 1.0 for every layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeEffectivenessTable {
    pub kinetic: EffectivenessRow,
    pub energy: EffectivenessRow,
    pub explosive: EffectivenessRow,
    pub corrosive: EffectivenessRow,
}

impl Default for TypeEffectivenessTable {
    fn default() -> Self {
        Self {
            kinetic: EffectivenessRow::new(1.5, 0.75, 1.0),
            energy: EffectivenessRow::new(0.75, 1.5, 1.0),
            explosive: EffectivenessRow::new(1.25, 1.0, 1.25),
            corrosive: EffectivenessRow::new(1.25, 0.5, 1.5),
        }
    }
}

impl TypeEffectivenessTable {
    /// Multiplier for `kind` striking `layer`
    pub fn multiplier(&self, kind: DamageKind, layer: DefenseLayer) -> f32 {
        let row = match kind {
            DamageKind::Kinetic => &self.kinetic,
            DamageKind::Energy => &self.energy,
            DamageKind::Explosive => &self.explosive,
            DamageKind::Corrosive => &self.corrosive,
            DamageKind::True => return 1.0,
        };
        let value = row.get(layer);
        // A bad settings value must never stall combat
        if value.is_finite() && value >= 0.0 {
            value
        } else {
            1.0
        }
    }

    /// Multiplier addressed by raw row/column indices (e.g. from data files).
    /// Out-of-range indices return 1.0.
    pub fn multiplier_by_index(&self, kind: usize, layer: usize) -> f32 {
        let kind = DamageKind::all().get(kind).copied();
        let layer = match layer {
            0 => Some(DefenseLayer::Armor),
            1 => Some(DefenseLayer::Shield),
            2 => Some(DefenseLayer::Biological),
            _ => None,
        };
        match (kind, layer) {
            (Some(kind), Some(layer)) => self.multiplier(kind, layer),
            _ => 1.0,
        }
    }

    /// Whether `kind` deals bonus damage against `layer`
    pub fn is_strong_against(&self, kind: DamageKind, layer: DefenseLayer) -> bool {
        self.multiplier(kind, layer) > 1.0
    }

    /// Whether `kind` deals reduced damage against `layer`
    pub fn is_weak_against(&self, kind: DamageKind, layer: DefenseLayer) -> bool {
        self.multiplier(kind, layer) < 1.0
    }
}
