//! Per-combatant combat state
//!
//! `CombatantState` owns health, the shield and armor pools, the block gate,
//! and the status ledger. All damage, from weapons and from status ticks
//! alike, goes through `apply_incoming_damage`.

use serde::{Deserialize, Serialize};
use skirmish_core::{CombatantId, Transform, Vec3};
use tracing::{debug, info};

use crate::block::{BlockGate, BlockTransition};
use crate::config::{ArmorModel, CombatantConfig};
use crate::effectiveness::TypeEffectivenessTable;
use crate::events::CombatEvent;
use crate::pool::{PoolKind, PoolTransition, ResourcePool};
use crate::request::DamageRequest;
use crate::resolver::{resolve, DefenderSnapshot, ResolvedDamage};
use crate::status::{StatusEffectKind, StatusEffectLedger, StatusTransition};

/// Full combat state of one participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantState {
    id: CombatantId,
    /// Display name used in logs
    pub name: String,
    health: f32,
    max_health: f32,
    shield: Option<ResourcePool>,
    armor: Option<ResourcePool>,
    block: BlockGate,
    status: StatusEffectLedger,
    /// Position and facing; facing decides which hits a block covers
    pub transform: Transform,
    alive: bool,
    /// End of the post-hit grace period
    invincible_until: f32,
    invincibility_duration: f32,
    armor_model: ArmorModel,
    #[serde(skip)]
    effectiveness: TypeEffectivenessTable,
    #[serde(skip)]
    events: Vec<CombatEvent>,
}

impl CombatantState {
    /// Spawn a combatant with a fresh id, all pools full
    pub fn new(config: &CombatantConfig) -> Self {
        Self::with_id(CombatantId::new(), config)
    }

    /// Spawn a combatant with a known id, all pools full
    pub fn with_id(id: CombatantId, config: &CombatantConfig) -> Self {
        let max_health = if config.max_health.is_finite() && config.max_health > 0.0 {
            config.max_health
        } else {
            1.0
        };
        Self {
            id,
            name: config.name.clone(),
            health: max_health,
            max_health,
            shield: config
                .shield
                .as_ref()
                .map(|pool| ResourcePool::from_config(PoolKind::Shield, pool)),
            armor: config
                .armor
                .as_ref()
                .map(|pool| ResourcePool::from_config(PoolKind::Armor, pool)),
            block: BlockGate::new(config.block.clone()),
            status: StatusEffectLedger::new(config.slow_factor),
            transform: Transform::default(),
            alive: true,
            invincible_until: f32::MIN,
            invincibility_duration: config.invincibility_duration.max(0.0),
            armor_model: config.armor_model,
            effectiveness: TypeEffectivenessTable::default(),
            events: Vec::new(),
        }
    }

    /// Use a non-default effectiveness table for hits against this combatant
    pub fn with_effectiveness(mut self, table: TypeEffectivenessTable) -> Self {
        self.effectiveness = table;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn set_effectiveness(&mut self, table: TypeEffectivenessTable) {
        self.effectiveness = table;
    }

    pub fn id(&self) -> CombatantId {
        self.id
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    /// HP as a 0.0-1.0 fraction
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    pub fn shield(&self) -> Option<&ResourcePool> {
        self.shield.as_ref()
    }

    pub fn armor(&self) -> Option<&ResourcePool> {
        self.armor.as_ref()
    }

    pub fn block(&self) -> &BlockGate {
        &self.block
    }

    pub fn status(&self) -> &StatusEffectLedger {
        &self.status
    }

    pub fn armor_model(&self) -> ArmorModel {
        self.armor_model
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_dead(&self) -> bool {
        !self.alive
    }

    /// Whether actions / AI are suppressed (Stun, Freeze)
    pub fn is_stunned(&self) -> bool {
        self.status.is_stunned()
    }

    /// Movement speed multiplier from active effects
    pub fn speed_modifier(&self) -> f32 {
        self.status.speed_modifier()
    }

    /// Whether the post-hit grace period is still running
    pub fn is_invincible(&self, now: f32) -> bool {
        now < self.invincible_until
    }

    /// Direction the combatant faces
    pub fn facing(&self) -> Vec3 {
        self.transform.forward()
    }

    /// Values the resolver reads
    pub fn snapshot(&self) -> DefenderSnapshot {
        DefenderSnapshot {
            health: self.health,
            shield: self.shield.as_ref().map(ResourcePool::current),
            armor: self.armor.as_ref().map(ResourcePool::current),
        }
    }

    /// What `request` would do right now, without applying it
    pub fn preview(&self, request: &DamageRequest) -> ResolvedDamage {
        resolve(request, &self.snapshot(), &self.effectiveness)
    }

    /// Events produced since the last drain
    pub fn pending_events(&self) -> &[CombatEvent] {
        &self.events
    }

    /// Take all buffered events
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    /// Apply one incoming hit. `attacker` receives life steal when present.
    pub fn apply_incoming_damage(
        &mut self,
        request: &DamageRequest,
        now: f32,
        attacker: Option<&mut CombatantState>,
    ) -> ResolvedDamage {
        let kind = request.kind();
        if !self.alive {
            debug!("{} ignored hit: already dead", self.name);
            return ResolvedDamage::none(kind);
        }

        // Status ticks are neither blockable nor gated by the grace period
        let is_tick = request.is_status_tick();
        if !is_tick {
            if self.is_invincible(now) {
                debug!("{} ignored hit: invincible until {:.2}", self.name, self.invincible_until);
                return ResolvedDamage::none(kind);
            }
            if self.block.try_negate(self.facing(), request.direction()) {
                debug!("{} blocked a {} hit", self.name, kind.name());
                self.events.push(CombatEvent::BlockSuccess {
                    target: self.id,
                    attacker: request.attacker(),
                });
                return ResolvedDamage::blocked(kind);
            }
        }

        let mut resolved = resolve(request, &self.snapshot(), &self.effectiveness);
        if !resolved.landed() {
            return resolved;
        }

        let mut remaining = resolved.amount;
        if let Some(shield) = self.shield.as_mut() {
            let (removed, transition) = shield.debit(remaining, now);
            remaining -= removed;
            resolved.absorbed_by_shield = removed;
            if let Some(transition) = transition {
                self.events.push(pool_event(self.id, PoolKind::Shield, transition));
            }
        }

        if self.armor_model == ArmorModel::Durability && resolved.armor_mitigated > 0.0 {
            if let Some(armor) = self.armor.as_mut() {
                let (_, transition) = armor.debit(resolved.armor_mitigated, now);
                if let Some(transition) = transition {
                    self.events.push(pool_event(self.id, PoolKind::Armor, transition));
                }
            }
        }

        self.health = (self.health - remaining).max(0.0);
        resolved.absorbed_by_health = remaining;
        resolved.killing_blow = self.health <= 0.0;

        if resolved.life_steal > 0.0 {
            if let Some(attacker) = attacker {
                attacker.heal(resolved.life_steal);
            }
        }

        if !is_tick {
            self.invincible_until = now + self.invincibility_duration;
        }

        if resolved.killing_blow {
            self.die(now, request.attacker());
        } else if request.stun_duration() > 0.0 {
            self.apply_status(StatusEffectKind::Stun, request.stun_duration(), 0.0, 0.0, now);
        }

        debug!(
            "{} took {:.1} {} damage ({:.1} shield, {:.1} health), {:.1}/{:.1} HP left",
            self.name,
            resolved.amount,
            kind.name(),
            resolved.absorbed_by_shield,
            resolved.absorbed_by_health,
            self.health,
            self.max_health
        );

        self.events.push(CombatEvent::DamageApplied {
            target: self.id,
            attacker: request.attacker(),
            damage: resolved,
            knockback: request.knockback(),
        });

        resolved
    }

    /// Restore health. Returns the amount actually healed; dead combatants
    /// can't be healed.
    pub fn heal(&mut self, amount: f32) -> f32 {
        debug_assert!(amount >= 0.0, "negative heal: {}", amount);
        if !self.alive || !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        let healed = self.health - before;
        if healed > 0.0 {
            self.events.push(CombatEvent::Healed {
                target: self.id,
                amount: healed,
            });
        }
        healed
    }

    /// Add shield points. Returns the amount actually added.
    pub fn restore_shield(&mut self, amount: f32) -> f32 {
        self.restore_pool(PoolKind::Shield, amount)
    }

    /// Add armor points. Returns the amount actually added.
    pub fn restore_armor(&mut self, amount: f32) -> f32 {
        self.restore_pool(PoolKind::Armor, amount)
    }

    fn restore_pool(&mut self, kind: PoolKind, amount: f32) -> f32 {
        if !self.alive {
            return 0.0;
        }
        let pool = match kind {
            PoolKind::Shield => self.shield.as_mut(),
            PoolKind::Armor => self.armor.as_mut(),
        };
        let Some(pool) = pool else {
            return 0.0;
        };
        let before = pool.current();
        let transition = pool.credit(amount);
        let added = pool.current() - before;
        if let Some(transition) = transition {
            self.events.push(pool_event(self.id, kind, transition));
        }
        added
    }

    /// Change max health; current health is clamped to the new max
    pub fn set_max_health(&mut self, max_health: f32) {
        if !(max_health.is_finite() && max_health > 0.0) {
            return;
        }
        self.max_health = max_health;
        self.health = self.health.min(max_health);
    }

    /// Change the shield's max; current is clamped to the new max
    pub fn set_max_shield(&mut self, max: f32) {
        if let Some(shield) = self.shield.as_mut() {
            if let Some(transition) = shield.set_max(max) {
                self.events.push(pool_event(self.id, PoolKind::Shield, transition));
            }
        }
    }

    /// Bring a dead combatant back with full health and shield
    pub fn revive(&mut self, now: f32) -> bool {
        if self.alive {
            return false;
        }
        self.alive = true;
        self.health = self.max_health;
        if let Some(shield) = self.shield.as_mut() {
            if let Some(transition) = shield.refill() {
                self.events.push(pool_event(self.id, PoolKind::Shield, transition));
            }
        }
        self.invincible_until = now + self.invincibility_duration;
        info!("{} revived", self.name);
        self.events.push(CombatEvent::CombatantRevived { target: self.id });
        true
    }

    /// Apply a status effect (see `StatusEffectLedger::apply`)
    pub fn apply_status(
        &mut self,
        kind: StatusEffectKind,
        duration: f32,
        per_tick_damage: f32,
        tick_interval: f32,
        now: f32,
    ) -> Option<StatusTransition> {
        if !self.alive {
            return None;
        }
        let transition = self.status.apply(kind, duration, per_tick_damage, tick_interval, now)?;
        if let StatusTransition::Applied(kind) = transition {
            self.events.push(CombatEvent::StatusEffectApplied {
                target: self.id,
                kind,
            });
            if kind.suppresses_actions() {
                self.force_end_block(now);
            }
        }
        Some(transition)
    }

    /// Apply a status effect with its default tick damage and interval
    pub fn apply_status_proc(&mut self, kind: StatusEffectKind, duration: f32, now: f32) -> Option<StatusTransition> {
        let (damage, interval) = kind.default_tick();
        self.apply_status(kind, duration, damage, interval, now)
    }

    /// Cleanse one status effect
    pub fn remove_status(&mut self, kind: StatusEffectKind) -> bool {
        let removed = self.status.remove(kind);
        if removed {
            self.events.push(CombatEvent::StatusEffectRemoved {
                target: self.id,
                kind,
            });
        }
        removed
    }

    /// Block intent from the input layer. Ignored while dead or stunned.
    pub fn press_block(&mut self, now: f32) {
        if !self.alive || self.is_stunned() {
            return;
        }
        let transition = self.block.press(now);
        self.push_block_event(transition);
    }

    /// Block release from the input layer
    pub fn release_block(&mut self, now: f32) {
        let transition = self.block.release(now);
        self.push_block_event(transition);
    }

    /// Advance pools, block gate, and status ledger, in that order. Damage
    /// ticks due this step re-enter `apply_incoming_damage`.
    pub fn tick(&mut self, dt: f32, now: f32) {
        debug_assert!(dt >= 0.0, "negative dt: {}", dt);
        if !self.alive {
            return;
        }

        for kind in [PoolKind::Shield, PoolKind::Armor] {
            let pool = match kind {
                PoolKind::Shield => self.shield.as_mut(),
                PoolKind::Armor => self.armor.as_mut(),
            };
            if let Some(transition) = pool.and_then(|pool| pool.tick(dt, now)) {
                self.events.push(pool_event(self.id, kind, transition));
            }
        }

        let transition = self.block.tick(dt, now);
        self.push_block_event(transition);

        let ledger_tick = self.status.tick(now);
        for kind in ledger_tick.expired {
            self.events.push(CombatEvent::StatusEffectRemoved {
                target: self.id,
                kind,
            });
        }
        for request in &ledger_tick.damage {
            if !self.alive {
                break;
            }
            self.apply_incoming_damage(request, now, None);
        }
    }

    /// Remove every status effect, reporting each removal. Used when the
    /// combatant leaves the simulation.
    pub fn clear_status(&mut self) {
        for kind in self.status.clear() {
            self.events.push(CombatEvent::StatusEffectRemoved {
                target: self.id,
                kind,
            });
        }
    }

    fn die(&mut self, now: f32, killer: Option<CombatantId>) {
        self.alive = false;
        self.health = 0.0;
        self.force_end_block(now);
        self.clear_status();
        info!("{} died at t={:.2}", self.name, now);
        self.events.push(CombatEvent::CombatantDied {
            target: self.id,
            killer,
        });
    }

    fn force_end_block(&mut self, now: f32) {
        let transition = self.block.force_end(now);
        self.push_block_event(transition);
    }

    fn push_block_event(&mut self, transition: Option<BlockTransition>) {
        let event = match transition {
            Some(BlockTransition::Started) => CombatEvent::BlockStarted { target: self.id },
            Some(BlockTransition::Ended) => CombatEvent::BlockEnded { target: self.id },
            None => return,
        };
        self.events.push(event);
    }
}

fn pool_event(target: CombatantId, pool: PoolKind, transition: PoolTransition) -> CombatEvent {
    match transition {
        PoolTransition::Depleted => CombatEvent::PoolDepleted { target, pool },
        PoolTransition::Restored => CombatEvent::PoolRestored { target, pool },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BlockConfig, PoolConfig};
    use crate::effectiveness::DamageKind;

    fn dummy(max_health: f32) -> CombatantState {
        CombatantState::new(&CombatantConfig {
            invincibility_duration: 0.0,
            ..CombatantConfig::unprotected("Dummy", max_health)
        })
    }

    fn count(state: &CombatantState, name: &str) -> usize {
        state.pending_events().iter().filter(|e| e.name() == name).count()
    }

    #[test]
    fn test_spawn_full() {
        let state = CombatantState::new(&CombatantConfig::default());
        assert!(state.is_alive());
        assert_eq!(state.health(), 100.0);
        assert_eq!(state.shield().unwrap().current(), 50.0);
        assert_eq!(state.armor().unwrap().current(), 25.0);
        assert_eq!(state.health_fraction(), 1.0);
    }

    #[test]
    fn test_fractional_max_health_kept() {
        let state = dummy(0.5);
        assert_eq!(state.max_health(), 0.5);
        assert_eq!(state.health(), 0.5);
    }

    #[test]
    fn test_lethal_hit_dies_once() {
        let mut state = dummy(10.0);
        let req = DamageRequest::new(15.0, DamageKind::True);

        let first = state.apply_incoming_damage(&req, 0.0, None);
        assert_eq!(state.health(), 0.0);
        assert!(first.killing_blow);
        assert!(state.is_dead());

        let second = state.apply_incoming_damage(&req, 0.0, None);
        assert_eq!(second.amount, 0.0);
        assert_eq!(count(&state, "CombatantDied"), 1);
        assert_eq!(count(&state, "DamageApplied"), 1);
    }

    #[test]
    fn test_shield_absorbs_first() {
        let mut state = CombatantState::new(&CombatantConfig {
            shield: Some(PoolConfig {
                max: 30.0,
                ..Default::default()
            }),
            armor: None,
            invincibility_duration: 0.0,
            ..Default::default()
        });
        let req = DamageRequest::new(50.0, DamageKind::True);
        let result = state.apply_incoming_damage(&req, 0.0, None);

        assert_eq!(result.absorbed_by_shield, 30.0);
        assert_eq!(result.absorbed_by_health, 20.0);
        assert_eq!(state.shield().unwrap().current(), 0.0);
        assert_eq!(state.health(), 80.0);
        assert_eq!(count(&state, "PoolDepleted"), 1);
    }

    #[test]
    fn test_preview_matches_application() {
        let mut state = CombatantState::new(&CombatantConfig::default());
        let req = DamageRequest::new(80.0, DamageKind::Explosive).with_critical(1.5);
        let preview = state.preview(&req);
        let applied = state.apply_incoming_damage(&req, 0.0, None);
        assert_eq!(preview, applied);
    }

    #[test]
    fn test_invincibility_window() {
        let mut state = CombatantState::new(&CombatantConfig {
            invincibility_duration: 0.5,
            ..CombatantConfig::unprotected("Target", 100.0)
        });
        let req = DamageRequest::new(10.0, DamageKind::Kinetic);

        assert_eq!(state.apply_incoming_damage(&req, 0.0, None).amount, 10.0);
        assert_eq!(state.apply_incoming_damage(&req, 0.25, None).amount, 0.0);
        assert_eq!(state.apply_incoming_damage(&req, 0.5, None).amount, 10.0);
        assert_eq!(state.health(), 80.0);
    }

    #[test]
    fn test_block_negates_frontal_hit() {
        let mut state = dummy(100.0);
        state.press_block(0.0);
        assert!(state.block().is_blocking());

        // Facing -Z; attacker in front swings toward +Z
        let frontal = DamageRequest::new(30.0, DamageKind::Kinetic)
            .with_hit(Vec3::new(0.0, 0.0, -2.0), Vec3::Z);
        let result = state.apply_incoming_damage(&frontal, 0.1, None);
        assert!(result.blocked);
        assert_eq!(result.amount, 0.0);
        assert_eq!(state.health(), 100.0);
        assert!(state.block().is_blocking());
        assert_eq!(count(&state, "BlockSuccess"), 1);

        let from_behind = DamageRequest::new(30.0, DamageKind::Kinetic)
            .with_hit(Vec3::new(0.0, 0.0, 2.0), -Vec3::Z);
        let result = state.apply_incoming_damage(&from_behind, 0.2, None);
        assert!(!result.blocked);
        assert_eq!(state.health(), 70.0);
    }

    #[test]
    fn test_life_steal_heals_attacker() {
        let mut attacker = dummy(100.0);
        attacker.apply_incoming_damage(&DamageRequest::new(50.0, DamageKind::True), 0.0, None);
        attacker.drain_events();

        let mut target = dummy(100.0);
        let req = DamageRequest::new(40.0, DamageKind::True)
            .with_attacker(attacker.id())
            .with_life_steal(0.5);
        target.apply_incoming_damage(&req, 0.0, Some(&mut attacker));

        assert_eq!(attacker.health(), 70.0);
        assert_eq!(count(&attacker, "Healed"), 1);
    }

    #[test]
    fn test_life_steal_without_attacker_is_dropped() {
        let mut target = dummy(100.0);
        let req = DamageRequest::new(40.0, DamageKind::True).with_life_steal(0.5);
        let result = target.apply_incoming_damage(&req, 0.0, None);
        assert_eq!(result.life_steal, 20.0);
        assert_eq!(target.health(), 60.0);
    }

    #[test]
    fn test_dot_ticks_reenter_damage() {
        let mut state = CombatantState::new(&CombatantConfig {
            invincibility_duration: 5.0,
            ..CombatantConfig::unprotected("Target", 100.0)
        });
        state.apply_status(StatusEffectKind::Bleed, 3.0, 4.0, 1.0, 0.0);

        for second in 1..=3 {
            state.tick(1.0, second as f32);
        }
        // Bleed is True damage, ignores the long grace period
        assert_eq!(state.health(), 88.0);
        assert!(!state.status().has_effect(StatusEffectKind::Bleed));
        assert_eq!(count(&state, "StatusEffectRemoved"), 1);
        assert!(!state.is_invincible(3.0));
    }

    #[test]
    fn test_dot_kill_emits_single_death() {
        let mut state = dummy(5.0);
        state.apply_status(StatusEffectKind::Bleed, 10.0, 4.0, 1.0, 0.0);
        state.apply_status(StatusEffectKind::Poison, 10.0, 4.0, 1.0, 0.0);
        state.tick(1.0, 1.0);
        state.tick(1.0, 2.0);

        assert!(state.is_dead());
        assert_eq!(count(&state, "CombatantDied"), 1);
        assert_eq!(count(&state, "StatusEffectRemoved"), 2);
        assert!(state.status().is_empty());
    }

    #[test]
    fn test_stun_request_applies_stun_and_drops_block() {
        let mut state = dummy(100.0);
        state.press_block(0.0);
        let req = DamageRequest::new(5.0, DamageKind::Kinetic).with_stun(1.0);
        state.apply_incoming_damage(&req, 0.0, None);

        assert!(state.is_stunned());
        assert!(!state.block().is_blocking());
        assert_eq!(count(&state, "BlockEnded"), 1);

        // Stunned combatants can't raise a block
        state.press_block(0.5);
        assert!(!state.block().is_blocking());

        state.tick(1.0, 1.0);
        assert!(!state.is_stunned());
    }

    #[test]
    fn test_slow_speed_modifier() {
        let mut state = CombatantState::new(&CombatantConfig {
            slow_factor: 0.5,
            ..Default::default()
        });
        assert_eq!(state.speed_modifier(), 1.0);
        state.apply_status(StatusEffectKind::Slow, 2.0, 0.0, 0.0, 0.0);
        state.apply_status(StatusEffectKind::Slow, 2.0, 0.0, 0.0, 0.0);
        assert_eq!(state.speed_modifier(), 0.5);
        assert_eq!(count(&state, "StatusEffectApplied"), 1);
    }

    #[test]
    fn test_heal_and_revive() {
        let mut state = CombatantState::new(&CombatantConfig {
            invincibility_duration: 0.0,
            ..Default::default()
        });
        state.apply_incoming_damage(&DamageRequest::new(60.0, DamageKind::True), 0.0, None);
        assert_eq!(state.heal(5.0), 5.0);
        assert_eq!(state.heal(500.0), 5.0);

        state.apply_incoming_damage(&DamageRequest::new(500.0, DamageKind::True), 1.0, None);
        assert!(state.is_dead());
        assert_eq!(state.heal(10.0), 0.0);
        assert_eq!(state.restore_shield(10.0), 0.0);

        assert!(state.revive(2.0));
        assert!(!state.revive(2.0));
        assert_eq!(state.health(), 100.0);
        assert_eq!(state.shield().unwrap().current(), 50.0);
        assert_eq!(count(&state, "CombatantRevived"), 1);
    }

    #[test]
    fn test_restore_shield_and_armor() {
        let mut state = CombatantState::new(&CombatantConfig {
            invincibility_duration: 0.0,
            ..Default::default()
        });
        state.apply_incoming_damage(&DamageRequest::new(50.0, DamageKind::True), 0.0, None);
        assert_eq!(state.shield().unwrap().current(), 0.0);

        assert_eq!(state.restore_shield(20.0), 20.0);
        assert_eq!(count(&state, "PoolRestored"), 1);
        assert_eq!(state.restore_armor(10.0), 0.0);

        let mut bare = dummy(10.0);
        assert_eq!(bare.restore_shield(10.0), 0.0);
    }

    #[test]
    fn test_shield_regen_after_delay() {
        let mut state = CombatantState::new(&CombatantConfig {
            invincibility_duration: 0.0,
            ..Default::default()
        });
        state.apply_incoming_damage(&DamageRequest::new(50.0, DamageKind::True), 0.0, None);
        state.tick(1.0, 1.0);
        state.tick(1.0, 2.0);
        assert_eq!(state.shield().unwrap().current(), 0.0);
        state.tick(1.0, 3.0);
        assert_eq!(state.shield().unwrap().current(), 10.0);
        assert_eq!(count(&state, "PoolRestored"), 1);
    }

    #[test]
    fn test_armor_durability_model() {
        let config = CombatantConfig {
            shield: None,
            armor: Some(PoolConfig {
                max: 50.0,
                regen_rate: 0.0,
                regen_delay: 0.0,
            }),
            max_health: 90.0,
            invincibility_duration: 0.0,
            armor_model: ArmorModel::Durability,
            ..Default::default()
        };
        let mut state = CombatantState::new(&config);
        let result = state.apply_incoming_damage(&DamageRequest::new(100.0, DamageKind::Kinetic), 0.0, None);

        assert!((result.amount - 100.0).abs() < 1e-3);
        assert!((state.armor().unwrap().current() - 0.0).abs() < 1e-3);
        assert!(state.is_dead());

        let mut mitigation_only = CombatantState::new(&CombatantConfig {
            armor_model: ArmorModel::Mitigation,
            max_health: 200.0,
            ..config
        });
        mitigation_only.apply_incoming_damage(&DamageRequest::new(100.0, DamageKind::Kinetic), 0.0, None);
        assert_eq!(mitigation_only.armor().unwrap().current(), 50.0);
    }

    #[test]
    fn test_set_max_health_and_shield() {
        let mut state = CombatantState::new(&CombatantConfig::default());
        state.set_max_health(60.0);
        assert_eq!(state.health(), 60.0);
        state.set_max_health(-1.0);
        assert_eq!(state.max_health(), 60.0);

        state.set_max_shield(0.0);
        assert_eq!(state.shield().unwrap().current(), 0.0);
        assert_eq!(count(&state, "PoolDepleted"), 1);
    }

    #[test]
    fn test_zero_damage_request_changes_nothing() {
        let mut state = dummy(10.0);
        let result = state.apply_incoming_damage(&DamageRequest::new(0.0, DamageKind::Kinetic), 0.0, None);
        assert_eq!(result.amount, 0.0);
        assert_eq!(state.health(), 10.0);
        assert!(state.pending_events().is_empty());
    }

    #[test]
    fn test_state_round_trips_through_serde() {
        let mut state = CombatantState::new(&CombatantConfig {
            block: BlockConfig::default(),
            ..Default::default()
        });
        state.apply_status_proc(StatusEffectKind::Poison, 4.0, 0.0);
        state.apply_incoming_damage(&DamageRequest::new(20.0, DamageKind::Energy), 0.0, None);
        state.drain_events();

        let json = serde_json::to_string(&state).unwrap();
        let restored: CombatantState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_drain_events_empties_buffer() {
        let mut state = dummy(10.0);
        state.apply_incoming_damage(&DamageRequest::new(1.0, DamageKind::True), 0.0, None);
        assert_eq!(state.drain_events().len(), 1);
        assert!(state.pending_events().is_empty());
    }
}
