//! Damage resolution pipeline
//!
//! Pipeline: base -> type multiplier -> crit -> armor curve | shield cap
//!           -> flat reduction -> floor at 1.0 -> life steal
//!
//! `resolve` is pure. It reads a snapshot of the defender and never touches a
//! pool, so it is also used for damage previews.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::effectiveness::{DamageKind, DefenseLayer, TypeEffectivenessTable};
use crate::request::{clamp01, DamageRequest};

/// Shield mitigation never exceeds this fraction, whatever the pool size
pub const MAX_SHIELD_REDUCTION: f32 = 0.8;

/// Scale of the armor and shield diminishing-returns curves
pub const MITIGATION_SCALE: f32 = 100.0;

/// Lowest effective armor fed to the armor curve
pub const MIN_EFFECTIVE_ARMOR: f32 = -99.0;

/// Every non-zero attack deals at least this much
pub const MIN_DAMAGE: f32 = 1.0;

/// Defender values the resolver needs
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DefenderSnapshot {
    pub health: f32,
    /// `None` when the defender has no shield pool
    pub shield: Option<f32>,
    /// `None` when the defender has no armor pool
    pub armor: Option<f32>,
}

impl DefenderSnapshot {
    /// Layer a hit is evaluated against: shield while it holds, then armor,
    /// then bare health
    pub fn struck_layer(&self) -> DefenseLayer {
        match (self.shield, self.armor) {
            (Some(shield), _) if shield > 0.0 => DefenseLayer::Shield,
            (_, Some(_)) => DefenseLayer::Armor,
            _ => DefenseLayer::Biological,
        }
    }
}

/// Result of a damage resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDamage {
    /// Final amount subtracted from shield + health
    pub amount: f32,
    /// Kind of the incoming attack
    pub kind: DamageKind,
    /// Layer the hit was evaluated against
    pub layer: DefenseLayer,
    /// Type effectiveness multiplier applied
    pub type_multiplier: f32,
    /// Whether crit amplification was applied
    pub is_critical: bool,
    /// Portion taken by the shield pool
    pub absorbed_by_shield: f32,
    /// Portion routed to health
    pub absorbed_by_health: f32,
    /// Damage the armor curve removed (used by armor durability)
    pub armor_mitigated: f32,
    /// Whether this hit takes the defender's health to 0
    pub killing_blow: bool,
    /// Health owed to the attacker
    pub life_steal: f32,
    /// Whether the hit was negated by a block
    pub blocked: bool,
}

impl ResolvedDamage {
    /// Result for a hit that was ignored (dead target, invincibility)
    pub fn none(kind: DamageKind) -> Self {
        Self {
            amount: 0.0,
            kind,
            layer: DefenseLayer::Biological,
            type_multiplier: 1.0,
            is_critical: false,
            absorbed_by_shield: 0.0,
            absorbed_by_health: 0.0,
            armor_mitigated: 0.0,
            killing_blow: false,
            life_steal: 0.0,
            blocked: false,
        }
    }

    /// Result for a hit negated by a block
    pub fn blocked(kind: DamageKind) -> Self {
        Self {
            blocked: true,
            ..Self::none(kind)
        }
    }

    /// Whether anything was actually dealt
    pub fn landed(&self) -> bool {
        self.amount > 0.0
    }
}

/// Armor curve: damage multiplier for a given effective armor value.
/// 0 armor -> 1.0, 100 armor -> 0.5, approaching 0 as armor grows.
pub fn armor_multiplier(effective_armor: f32) -> f32 {
    MITIGATION_SCALE / (MITIGATION_SCALE + effective_armor.max(MIN_EFFECTIVE_ARMOR))
}

/// Shield curve: fraction of damage removed, capped at `MAX_SHIELD_REDUCTION`
pub fn shield_reduction(effective_shield: f32) -> f32 {
    let effective = effective_shield.max(0.0);
    (effective / (effective + MITIGATION_SCALE)).min(MAX_SHIELD_REDUCTION)
}

/// Resolve one request against a defender snapshot
pub fn resolve(
    request: &DamageRequest,
    defender: &DefenderSnapshot,
    table: &TypeEffectivenessTable,
) -> ResolvedDamage {
    let kind = request.kind();
    let layer = defender.struck_layer();
    let type_multiplier = table.multiplier(kind, layer);

    if request.base() <= 0.0 {
        return ResolvedDamage {
            layer,
            type_multiplier,
            ..ResolvedDamage::none(kind)
        };
    }

    let mut amount = request.base() * type_multiplier;
    let mut armor_mitigated = 0.0;
    let mut is_critical = false;

    if !kind.bypasses_mitigation() {
        if request.is_critical() {
            amount *= request.critical_multiplier();
            is_critical = true;
        }

        match (layer, defender.armor, defender.shield) {
            (DefenseLayer::Armor, Some(armor), _) if armor > 0.0 => {
                let effective = armor * (1.0 - request.armor_penetration());
                let before = amount;
                amount *= armor_multiplier(effective);
                armor_mitigated = (before - amount).max(0.0);
            }
            (DefenseLayer::Shield, _, Some(shield)) if shield > 0.0 => {
                let effective = shield * (1.0 - request.shield_penetration());
                amount *= 1.0 - shield_reduction(effective);
            }
            _ => {}
        }

        amount *= 1.0 - clamp01(request.flat_reduction());
    }

    amount = amount.max(MIN_DAMAGE);

    let shield_available = defender.shield.unwrap_or(0.0).max(0.0);
    let absorbed_by_shield = amount.min(shield_available);
    let absorbed_by_health = amount - absorbed_by_shield;
    let killing_blow = defender.health > 0.0 && absorbed_by_health >= defender.health;
    let life_steal = amount * clamp01(request.life_steal());

    debug!(
        "Resolved {} {:.1} vs {}: x{:.2} -> {:.2} (crit: {}, armor mitigated: {:.2})",
        kind.name(),
        request.base(),
        layer.name(),
        type_multiplier,
        amount,
        is_critical,
        armor_mitigated
    );

    ResolvedDamage {
        amount,
        kind,
        layer,
        type_multiplier,
        is_critical,
        absorbed_by_shield,
        absorbed_by_health,
        armor_mitigated,
        killing_blow,
        life_steal,
        blocked: false,
    }
}
