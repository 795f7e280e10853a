//! Incoming attack description
//!
//! A `DamageRequest` is built once by whoever declares the attack (weapon,
//! projectile, status tick) and never changes afterwards. Every numeric field
//! is sanitised here so the resolver and pools only ever see valid values.

use glam::Vec3;
use rand::Rng;
use serde::Serialize;
use skirmish_core::CombatantId;
use tracing::warn;

use crate::effectiveness::DamageKind;
use crate::status::StatusEffectKind;

/// Critical multiplier used when a request is flagged critical without one
pub const DEFAULT_CRITICAL_MULTIPLIER: f32 = 1.5;

/// Where a request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DamageSource {
    /// Weapon hit, projectile, ability
    #[default]
    Direct,
    /// Periodic tick of an active status effect
    Status(StatusEffectKind),
}

/// One incoming attack
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageRequest {
    base: f32,
    kind: DamageKind,
    source: DamageSource,
    attacker: Option<CombatantId>,
    origin: Option<Vec3>,
    direction: Option<Vec3>,
    is_critical: bool,
    critical_multiplier: f32,
    armor_penetration: f32,
    shield_penetration: f32,
    life_steal: f32,
    knockback_force: f32,
    stun_duration: f32,
    flat_reduction: f32,
}

/// Clamp to [0, 1], mapping NaN to 0
pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn non_negative(value: f32, field: &'static str) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        warn!("Clamping invalid {} {} to 0", field, value);
        0.0
    }
}

fn fraction(value: f32, field: &'static str) -> f32 {
    let clamped = clamp01(value);
    if clamped != value {
        warn!("Clamping {} {} into [0, 1]", field, value);
    }
    clamped
}

impl DamageRequest {
    /// Create a request with every optional modifier at its neutral value.
    /// Negative, NaN, or infinite base amounts become 0.
    pub fn new(base: f32, kind: DamageKind) -> Self {
        Self {
            base: non_negative(base, "base damage"),
            kind,
            source: DamageSource::Direct,
            attacker: None,
            origin: None,
            direction: None,
            is_critical: false,
            critical_multiplier: 1.0,
            armor_penetration: 0.0,
            shield_penetration: 0.0,
            life_steal: 0.0,
            knockback_force: 0.0,
            stun_duration: 0.0,
            flat_reduction: 0.0,
        }
    }

    /// Synthetic request for one damage-over-time tick
    pub fn status_tick(effect: StatusEffectKind, amount: f32) -> Self {
        let mut request = Self::new(amount, effect.damage_kind());
        request.source = DamageSource::Status(effect);
        request
    }

    pub fn with_attacker(mut self, attacker: CombatantId) -> Self {
        self.attacker = Some(attacker);
        self
    }

    /// Set the hit origin and the direction the attack travels.
    /// A zero or non-finite direction is treated as "no direction".
    pub fn with_hit(mut self, origin: Vec3, direction: Vec3) -> Self {
        self.origin = origin.is_finite().then_some(origin);
        self.direction = direction.try_normalize();
        self
    }

    /// Mark the hit as critical with the given multiplier
    pub fn with_critical(mut self, multiplier: f32) -> Self {
        self.is_critical = true;
        self.critical_multiplier = if multiplier.is_finite() && multiplier >= 0.0 {
            multiplier
        } else {
            warn!("Invalid critical multiplier {}, using 1.0", multiplier);
            1.0
        };
        self
    }

    /// Roll for a critical hit with the thread RNG
    pub fn with_critical_roll(self, chance: f32, multiplier: f32) -> Self {
        self.with_critical_roll_using(&mut rand::thread_rng(), chance, multiplier)
    }

    /// Roll for a critical hit with a caller-supplied RNG
    pub fn with_critical_roll_using<R: Rng + ?Sized>(
        self,
        rng: &mut R,
        chance: f32,
        multiplier: f32,
    ) -> Self {
        if roll_critical_using(rng, chance) {
            self.with_critical(multiplier)
        } else {
            self
        }
    }

    pub fn with_armor_penetration(mut self, fraction_value: f32) -> Self {
        self.armor_penetration = fraction(fraction_value, "armor penetration");
        self
    }

    pub fn with_shield_penetration(mut self, fraction_value: f32) -> Self {
        self.shield_penetration = fraction(fraction_value, "shield penetration");
        self
    }

    pub fn with_life_steal(mut self, fraction_value: f32) -> Self {
        self.life_steal = fraction(fraction_value, "life steal");
        self
    }

    pub fn with_knockback(mut self, force: f32) -> Self {
        self.knockback_force = non_negative(force, "knockback force");
        self
    }

    pub fn with_stun(mut self, duration: f32) -> Self {
        self.stun_duration = non_negative(duration, "stun duration");
        self
    }

    /// Extra damage reduction supplied by the defender (buffs, stance)
    pub fn with_flat_reduction(mut self, fraction_value: f32) -> Self {
        self.flat_reduction = fraction(fraction_value, "flat reduction");
        self
    }

    pub fn base(&self) -> f32 {
        self.base
    }

    pub fn kind(&self) -> DamageKind {
        self.kind
    }

    pub fn source(&self) -> DamageSource {
        self.source
    }

    pub fn is_status_tick(&self) -> bool {
        matches!(self.source, DamageSource::Status(_))
    }

    pub fn attacker(&self) -> Option<CombatantId> {
        self.attacker
    }

    pub fn origin(&self) -> Option<Vec3> {
        self.origin
    }

    /// Normalized travel direction of the attack, if known
    pub fn direction(&self) -> Option<Vec3> {
        self.direction
    }

    pub fn is_critical(&self) -> bool {
        self.is_critical
    }

    pub fn critical_multiplier(&self) -> f32 {
        self.critical_multiplier
    }

    pub fn armor_penetration(&self) -> f32 {
        self.armor_penetration
    }

    pub fn shield_penetration(&self) -> f32 {
        self.shield_penetration
    }

    pub fn life_steal(&self) -> f32 {
        self.life_steal
    }

    pub fn knockback_force(&self) -> f32 {
        self.knockback_force
    }

    pub fn stun_duration(&self) -> f32 {
        self.stun_duration
    }

    pub fn flat_reduction(&self) -> f32 {
        self.flat_reduction
    }

    /// Knockback impulse along the travel direction
    pub fn knockback(&self) -> Vec3 {
        self.direction
            .map(|dir| dir * self.knockback_force)
            .unwrap_or(Vec3::ZERO)
    }
}

/// Roll a critical hit with the thread RNG
pub fn roll_critical(chance: f32) -> bool {
    rand::random::<f32>() < clamp01(chance)
}

/// Roll a critical hit. The chance is clamped to [0, 1] so malformed data can
/// neither guarantee nor forbid crits outside that range.
pub fn roll_critical_using<R: Rng + ?Sized>(rng: &mut R, chance: f32) -> bool {
    rng.gen::<f32>() < clamp01(chance)
}
