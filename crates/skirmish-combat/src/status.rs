//! Status effects and the per-combatant effect ledger
//!
//! Handles damage over time and crowd control. At most one effect of each
//! kind is active on a combatant; reapplying refreshes it instead of stacking.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::effectiveness::DamageKind;
use crate::request::DamageRequest;

/// Types of status effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatusEffectKind {
    // Damage over time
    Bleed,
    Poison,
    Burn,
    Shock,

    // Crowd control
    Stun,
    Slow,
    Freeze,
}

impl StatusEffectKind {
    /// Damage kind carried by this effect's periodic ticks
    pub fn damage_kind(self) -> DamageKind {
        match self {
            Self::Bleed => DamageKind::True,
            Self::Poison => DamageKind::Corrosive,
            Self::Burn | Self::Shock => DamageKind::Energy,
            Self::Stun | Self::Slow | Self::Freeze => DamageKind::Kinetic,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Bleed => "Bleed",
            Self::Poison => "Poison",
            Self::Burn => "Burn",
            Self::Shock => "Shock",
            Self::Stun => "Stun",
            Self::Slow => "Slow",
            Self::Freeze => "Freeze",
        }
    }

    /// Default (damage per tick, tick interval) for procs that don't specify one
    pub fn default_tick(self) -> (f32, f32) {
        match self {
            Self::Bleed => (4.0, 1.0),
            Self::Poison => (3.0, 1.5),
            Self::Burn => (5.0, 1.0),
            Self::Shock => (8.0, 2.0),
            Self::Stun | Self::Slow | Self::Freeze => (0.0, 0.0),
        }
    }

    /// Whether this effect suppresses the target's actions / AI
    pub fn suppresses_actions(self) -> bool {
        matches!(self, Self::Stun | Self::Freeze)
    }

    /// Movement speed multiplier while this effect is active
    pub fn movement_multiplier(self, slow_factor: f32) -> f32 {
        match self {
            Self::Slow => slow_factor,
            Self::Freeze => 0.0,
            _ => 1.0,
        }
    }

    /// All status effect variants
    pub fn all() -> &'static [StatusEffectKind] {
        &[
            Self::Bleed,
            Self::Poison,
            Self::Burn,
            Self::Shock,
            Self::Stun,
            Self::Slow,
            Self::Freeze,
        ]
    }
}

/// An active status effect instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusEffectKind,
    /// Remaining duration in seconds, as of `updated_at`
    pub remaining: f32,
    /// Damage dealt per tick (0 for pure crowd control)
    pub per_tick_damage: f32,
    /// Time between ticks
    pub tick_interval: f32,
    /// Timestamp of the next damage tick, `None` if the effect never ticks
    pub next_tick: Option<f32>,
    /// Timestamp `remaining` was last brought up to date
    updated_at: f32,
}

impl StatusEffect {
    fn new(kind: StatusEffectKind, duration: f32, per_tick_damage: f32, tick_interval: f32, now: f32) -> Self {
        let ticks = per_tick_damage > 0.0 && tick_interval > 0.0;
        Self {
            kind,
            remaining: duration,
            per_tick_damage,
            tick_interval,
            next_tick: ticks.then_some(now + tick_interval),
            updated_at: now,
        }
    }

    /// Whether this effect has run out
    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }

    fn advance(&mut self, now: f32) {
        let elapsed = (now - self.updated_at).max(0.0);
        self.remaining -= elapsed;
        self.updated_at = now;
    }
}

/// Outcome of applying an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    /// New entry; immediate side effects start now
    Applied(StatusEffectKind),
    /// Existing entry's duration / damage raised
    Refreshed(StatusEffectKind),
}

/// Everything a ledger tick produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerTick {
    /// Damage-over-time requests due this tick, in kind order
    pub damage: Vec<DamageRequest>,
    /// Effects that ran out and were removed
    pub expired: Vec<StatusEffectKind>,
}

/// Active status effects on one combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffectLedger {
    effects: BTreeMap<StatusEffectKind, StatusEffect>,
    /// Movement multiplier applied by Slow
    slow_factor: f32,
}

impl Default for StatusEffectLedger {
    fn default() -> Self {
        Self::new(0.6)
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

impl StatusEffectLedger {
    /// Create an empty ledger
    pub fn new(slow_factor: f32) -> Self {
        Self {
            effects: BTreeMap::new(),
            slow_factor: if slow_factor.is_nan() { 1.0 } else { slow_factor.clamp(0.0, 1.0) },
        }
    }

    /// Apply an effect. If the same kind is already active, keep the longer
    /// remaining duration and the higher tick damage. Returns `None` if the
    /// duration is not positive.
    pub fn apply(
        &mut self,
        kind: StatusEffectKind,
        duration: f32,
        per_tick_damage: f32,
        tick_interval: f32,
        now: f32,
    ) -> Option<StatusTransition> {
        let duration = sanitize(duration);
        if duration <= 0.0 {
            return None;
        }
        let per_tick_damage = sanitize(per_tick_damage);
        let tick_interval = sanitize(tick_interval);

        if let Some(existing) = self.effects.get_mut(&kind) {
            existing.advance(now);
            existing.remaining = existing.remaining.max(duration);
            existing.per_tick_damage = existing.per_tick_damage.max(per_tick_damage);
            if existing.next_tick.is_none() && existing.per_tick_damage > 0.0 && tick_interval > 0.0 {
                existing.tick_interval = tick_interval;
                existing.next_tick = Some(now + tick_interval);
            }
            debug!(
                "{} refreshed: {:.2}s remaining, {:.1}/tick",
                kind.name(),
                existing.remaining,
                existing.per_tick_damage
            );
            return Some(StatusTransition::Refreshed(kind));
        }

        self.effects.insert(
            kind,
            StatusEffect::new(kind, duration, per_tick_damage, tick_interval, now),
        );
        debug!("{} applied for {:.2}s", kind.name(), duration);
        Some(StatusTransition::Applied(kind))
    }

    /// Apply an effect with its default tick damage and interval
    pub fn apply_proc(&mut self, kind: StatusEffectKind, duration: f32, now: f32) -> Option<StatusTransition> {
        let (damage, interval) = kind.default_tick();
        self.apply(kind, duration, damage, interval, now)
    }

    /// Advance every effect to `now`. Due damage ticks are returned as
    /// requests for the owner to feed back through its damage entry point.
    pub fn tick(&mut self, now: f32) -> LedgerTick {
        let mut result = LedgerTick::default();

        for (kind, effect) in self.effects.iter_mut() {
            effect.advance(now);

            if let Some(due) = effect.next_tick {
                if now >= due {
                    result
                        .damage
                        .push(DamageRequest::status_tick(*kind, effect.per_tick_damage));
                    effect.next_tick = Some(now + effect.tick_interval);
                }
            }

            if effect.is_expired() {
                result.expired.push(*kind);
            }
        }

        for kind in &result.expired {
            self.effects.remove(kind);
            debug!("{} expired", kind.name());
        }

        result
    }

    /// Remove a single effect (cleanse). Returns whether it was active.
    pub fn remove(&mut self, kind: StatusEffectKind) -> bool {
        self.effects.remove(&kind).is_some()
    }

    /// Remove all effects, returning the kinds that were active
    pub fn clear(&mut self) -> Vec<StatusEffectKind> {
        let removed: Vec<StatusEffectKind> = self.effects.keys().copied().collect();
        self.effects.clear();
        removed
    }

    /// Whether any active effect suppresses actions
    pub fn is_stunned(&self) -> bool {
        self.effects.keys().any(|kind| kind.suppresses_actions())
    }

    /// Combined movement multiplier from all active effects
    pub fn speed_modifier(&self) -> f32 {
        self.effects
            .keys()
            .map(|kind| kind.movement_multiplier(self.slow_factor))
            .product()
    }

    /// Check if a specific effect is active
    pub fn has_effect(&self, kind: StatusEffectKind) -> bool {
        self.effects.contains_key(&kind)
    }

    pub fn get(&self, kind: StatusEffectKind) -> Option<&StatusEffect> {
        self.effects.get(&kind)
    }

    /// Active effects in kind order
    pub fn entries(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.values()
    }

    /// Number of active effects
    pub fn count(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poison_ticks() {
        let mut ledger = StatusEffectLedger::default();
        ledger.apply(StatusEffectKind::Poison, 5.0, 3.0, 1.0, 0.0);

        let tick = ledger.tick(0.5);
        assert!(tick.damage.is_empty());

        let tick = ledger.tick(1.0);
        assert_eq!(tick.damage.len(), 1);
        assert_eq!(tick.damage[0].base(), 3.0);
        assert_eq!(tick.damage[0].kind(), DamageKind::Corrosive);
        assert!(tick.damage[0].is_status_tick());
    }

    #[test]
    fn test_full_duration_tick_count() {
        let mut ledger = StatusEffectLedger::default();
        ledger.apply(StatusEffectKind::Burn, 5.0, 2.0, 1.0, 0.0);

        let mut total = 0.0;
        for second in 1..=7 {
            let tick = ledger.tick(second as f32);
            total += tick.damage.iter().map(|r| r.base()).sum::<f32>();
        }
        assert_eq!(total, 10.0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_effect_expires() {
        let mut ledger = StatusEffectLedger::default();
        ledger.apply(StatusEffectKind::Slow, 2.0, 0.0, 0.0, 0.0);
        assert_eq!(ledger.count(), 1);

        let tick = ledger.tick(3.0);
        assert_eq!(tick.expired, vec![StatusEffectKind::Slow]);
        assert_eq!(ledger.count(), 0);
    }

    #[test]
    fn test_reapply_uses_max_semantics() {
        let mut ledger = StatusEffectLedger::default();
        assert_eq!(
            ledger.apply(StatusEffectKind::Poison, 5.0, 3.0, 1.0, 0.0),
            Some(StatusTransition::Applied(StatusEffectKind::Poison))
        );
        ledger.tick(1.0);
        ledger.tick(2.0);

        assert_eq!(
            ledger.apply(StatusEffectKind::Poison, 3.0, 5.0, 1.0, 2.0),
            Some(StatusTransition::Refreshed(StatusEffectKind::Poison))
        );
        assert_eq!(ledger.count(), 1);
        let poison = ledger.get(StatusEffectKind::Poison).unwrap();
        assert_eq!(poison.remaining, 3.0);
        assert_eq!(poison.per_tick_damage, 5.0);
    }

    #[test]
    fn test_reapply_longer_duration_wins() {
        let mut ledger = StatusEffectLedger::default();
        ledger.apply(StatusEffectKind::Bleed, 2.0, 4.0, 1.0, 0.0);
        ledger.apply(StatusEffectKind::Bleed, 6.0, 1.0, 1.0, 1.0);
        let bleed = ledger.get(StatusEffectKind::Bleed).unwrap();
        assert_eq!(bleed.remaining, 6.0);
        assert_eq!(bleed.per_tick_damage, 4.0);
    }

    #[test]
    fn test_uniqueness() {
        let mut ledger = StatusEffectLedger::default();
        for i in 0..5 {
            ledger.apply(StatusEffectKind::Shock, 1.0 + i as f32, 8.0, 2.0, 0.0);
        }
        assert_eq!(ledger.count(), 1);
        assert_eq!(ledger.get(StatusEffectKind::Shock).unwrap().remaining, 5.0);
    }

    #[test]
    fn test_stun_and_freeze_suppress_actions() {
        let mut ledger = StatusEffectLedger::default();
        assert!(!ledger.is_stunned());
        ledger.apply(StatusEffectKind::Stun, 1.0, 0.0, 0.0, 0.0);
        assert!(ledger.is_stunned());
        ledger.tick(1.0);
        assert!(!ledger.is_stunned());

        ledger.apply(StatusEffectKind::Freeze, 1.0, 0.0, 0.0, 1.0);
        assert!(ledger.is_stunned());
        assert_eq!(ledger.speed_modifier(), 0.0);
    }

    #[test]
    fn test_slow_is_idempotent() {
        let mut ledger = StatusEffectLedger::new(0.5);
        ledger.apply(StatusEffectKind::Slow, 3.0, 0.0, 0.0, 0.0);
        ledger.apply(StatusEffectKind::Slow, 3.0, 0.0, 0.0, 0.5);
        assert_eq!(ledger.speed_modifier(), 0.5);

        ledger.tick(4.0);
        assert_eq!(ledger.speed_modifier(), 1.0);
    }

    #[test]
    fn test_zero_duration_ignored() {
        let mut ledger = StatusEffectLedger::default();
        assert_eq!(ledger.apply(StatusEffectKind::Burn, 0.0, 5.0, 1.0, 0.0), None);
        assert_eq!(ledger.apply(StatusEffectKind::Burn, f32::NAN, 5.0, 1.0, 0.0), None);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_control_only_effect_never_ticks_damage() {
        let mut ledger = StatusEffectLedger::default();
        ledger.apply(StatusEffectKind::Stun, 3.0, 0.0, 1.0, 0.0);
        for second in 1..=3 {
            assert!(ledger.tick(second as f32).damage.is_empty());
        }
    }

    #[test]
    fn test_apply_proc_defaults() {
        let mut ledger = StatusEffectLedger::default();
        ledger.apply_proc(StatusEffectKind::Burn, 3.0, 0.0);
        let burn = ledger.get(StatusEffectKind::Burn).unwrap();
        assert_eq!(burn.per_tick_damage, 5.0);
        assert_eq!(burn.next_tick, Some(1.0));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut ledger = StatusEffectLedger::default();
        ledger.apply_proc(StatusEffectKind::Burn, 5.0, 0.0);
        ledger.apply_proc(StatusEffectKind::Stun, 5.0, 0.0);
        ledger.apply_proc(StatusEffectKind::Poison, 5.0, 0.0);

        assert!(ledger.remove(StatusEffectKind::Burn));
        assert!(!ledger.remove(StatusEffectKind::Burn));

        let removed = ledger.clear();
        assert_eq!(removed, vec![StatusEffectKind::Poison, StatusEffectKind::Stun]);
        assert!(!ledger.is_stunned());
        assert_eq!(ledger.count(), 0);
    }

    #[test]
    fn test_ledger_round_trips_through_serde() {
        let mut ledger = StatusEffectLedger::default();
        ledger.apply_proc(StatusEffectKind::Poison, 4.0, 0.0);
        ledger.apply_proc(StatusEffectKind::Slow, 2.0, 0.0);
        let json = serde_json::to_string(&ledger).unwrap();
        let restored: StatusEffectLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, ledger);
    }
}
