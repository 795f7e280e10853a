//! Arena: owns every combatant and drives the simulation step
//!
//! Each step advances the clock, ticks combatants in spawn order, and then
//! hands all buffered events to the bus. Operations that change combat state
//! outside a step (attacks, status procs, block input) dispatch their events
//! immediately.

use skirmish_core::{CombatantId, SimTime, Transform};
use tracing::{debug, info};

use crate::combatant::CombatantState;
use crate::config::{CombatSettings, CombatantConfig};
use crate::error::CombatError;
use crate::events::{CombatListener, EventBus, ListenerId};
use crate::request::DamageRequest;
use crate::resolver::ResolvedDamage;
use crate::status::{StatusEffectKind, StatusTransition};

/// A running combat simulation
#[derive(Debug)]
pub struct Arena {
    combatants: Vec<CombatantState>,
    time: SimTime,
    settings: CombatSettings,
    bus: EventBus,
}

impl Default for Arena {
    fn default() -> Self {
        Self::from_settings(CombatSettings::default())
    }
}

impl Arena {
    /// Create an empty arena. Fails on clock settings that cannot advance.
    pub fn new(settings: CombatSettings) -> Result<Self, CombatError> {
        settings.validate()?;
        Ok(Self::from_settings(settings))
    }

    fn from_settings(settings: CombatSettings) -> Self {
        Self {
            combatants: Vec::new(),
            time: SimTime::new(settings.time.clone()),
            settings,
            bus: EventBus::new(),
        }
    }

    pub fn settings(&self) -> &CombatSettings {
        &self.settings
    }

    pub fn time(&self) -> &SimTime {
        &self.time
    }

    pub fn time_mut(&mut self) -> &mut SimTime {
        &mut self.time
    }

    /// Current simulation timestamp
    pub fn now(&self) -> f32 {
        self.time.now()
    }

    /// Spawn a combatant at the origin
    pub fn spawn(&mut self, config: &CombatantConfig) -> Result<CombatantId, CombatError> {
        self.spawn_at(config, Transform::default())
    }

    /// Spawn a combatant at `transform`
    pub fn spawn_at(&mut self, config: &CombatantConfig, transform: Transform) -> Result<CombatantId, CombatError> {
        config.validate()?;
        let state = CombatantState::new(config)
            .with_effectiveness(self.settings.effectiveness.clone())
            .with_transform(transform);
        let id = state.id();
        info!("Spawned {} ({}) with {} HP", state.name, id, state.max_health());
        self.combatants.push(state);
        Ok(id)
    }

    /// Take a combatant out of the simulation. Its active status effects are
    /// reported as removed first.
    pub fn remove(&mut self, id: CombatantId) -> Result<CombatantState, CombatError> {
        let index = self.index_of(id)?;
        let mut state = self.combatants.remove(index);
        state.clear_status();
        self.bus.publish_all(state.drain_events());
        info!("Removed {} ({})", state.name, id);
        Ok(state)
    }

    pub fn get(&self, id: CombatantId) -> Option<&CombatantState> {
        self.combatants.iter().find(|c| c.id() == id)
    }

    pub fn get_mut(&mut self, id: CombatantId) -> Option<&mut CombatantState> {
        self.combatants.iter_mut().find(|c| c.id() == id)
    }

    /// Combatants in spawn order
    pub fn combatants(&self) -> &[CombatantState] {
        &self.combatants
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    pub fn alive_count(&self) -> usize {
        self.combatants.iter().filter(|c| c.is_alive()).count()
    }

    /// Register a listener for every event the arena dispatches
    pub fn subscribe(&mut self, listener: impl CombatListener + 'static) -> ListenerId {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// `attacker` hits `target` with `request`. The request is stamped with
    /// the attacker's id, and with hit geometry from the two transforms when
    /// it carries none. Life steal goes back to the attacker.
    pub fn attack(
        &mut self,
        attacker: CombatantId,
        target: CombatantId,
        request: DamageRequest,
    ) -> Result<ResolvedDamage, CombatError> {
        let attacker_index = self.index_of(attacker)?;
        let target_index = self.index_of(target)?;
        let now = self.now();

        let mut request = request.with_attacker(attacker);
        if request.direction().is_none() && attacker_index != target_index {
            let from = self.combatants[attacker_index].transform.position;
            if let Some(direction) = self.combatants[attacker_index]
                .transform
                .direction_to(self.combatants[target_index].transform.position)
            {
                request = request.with_hit(from, direction);
            }
        }

        let resolved = if attacker_index == target_index {
            let state = &mut self.combatants[target_index];
            let resolved = state.apply_incoming_damage(&request, now, None);
            state.heal(resolved.life_steal);
            resolved
        } else {
            let (attacker_state, target_state) = pair_mut(&mut self.combatants, attacker_index, target_index);
            target_state.apply_incoming_damage(&request, now, Some(attacker_state))
        };

        debug!(
            "{} -> {}: {:.1} {}{}",
            attacker,
            target,
            resolved.amount,
            resolved.kind.name(),
            if resolved.blocked { " (blocked)" } else { "" }
        );
        self.dispatch();
        Ok(resolved)
    }

    /// Hit `target` with no attacker (environment, traps, scripted damage)
    pub fn apply_damage(&mut self, target: CombatantId, request: &DamageRequest) -> Result<ResolvedDamage, CombatError> {
        let now = self.now();
        let resolved = self.combatant_mut(target)?.apply_incoming_damage(request, now, None);
        self.dispatch();
        Ok(resolved)
    }

    pub fn apply_status(
        &mut self,
        target: CombatantId,
        kind: StatusEffectKind,
        duration: f32,
        per_tick_damage: f32,
        tick_interval: f32,
    ) -> Result<Option<StatusTransition>, CombatError> {
        let now = self.now();
        let transition = self
            .combatant_mut(target)?
            .apply_status(kind, duration, per_tick_damage, tick_interval, now);
        self.dispatch();
        Ok(transition)
    }

    /// Apply a status effect with its default tick damage and interval
    pub fn apply_status_proc(
        &mut self,
        target: CombatantId,
        kind: StatusEffectKind,
        duration: f32,
    ) -> Result<Option<StatusTransition>, CombatError> {
        let now = self.now();
        let transition = self.combatant_mut(target)?.apply_status_proc(kind, duration, now);
        self.dispatch();
        Ok(transition)
    }

    pub fn remove_status(&mut self, target: CombatantId, kind: StatusEffectKind) -> Result<bool, CombatError> {
        let removed = self.combatant_mut(target)?.remove_status(kind);
        self.dispatch();
        Ok(removed)
    }

    pub fn heal(&mut self, target: CombatantId, amount: f32) -> Result<f32, CombatError> {
        let healed = self.combatant_mut(target)?.heal(amount);
        self.dispatch();
        Ok(healed)
    }

    pub fn press_block(&mut self, id: CombatantId) -> Result<(), CombatError> {
        let now = self.now();
        self.combatant_mut(id)?.press_block(now);
        self.dispatch();
        Ok(())
    }

    pub fn release_block(&mut self, id: CombatantId) -> Result<(), CombatError> {
        let now = self.now();
        self.combatant_mut(id)?.release_block(now);
        self.dispatch();
        Ok(())
    }

    pub fn revive(&mut self, id: CombatantId) -> Result<bool, CombatError> {
        let now = self.now();
        let revived = self.combatant_mut(id)?.revive(now);
        self.dispatch();
        Ok(revived)
    }

    /// Advance the clock by `raw_delta` and tick every combatant
    pub fn step(&mut self, raw_delta: f32) {
        self.time.update(raw_delta);
        let dt = self.time.delta_time;
        if dt <= 0.0 {
            return;
        }
        let now = self.time.now();
        for combatant in self.combatants.iter_mut() {
            combatant.tick(dt, now);
        }
        self.dispatch();
    }

    /// Advance the clock by `raw_delta` and tick in fixed increments.
    /// Returns the number of fixed steps run.
    pub fn step_fixed(&mut self, raw_delta: f32) -> u32 {
        self.time.update(raw_delta);
        let steps = self.time.fixed_steps();
        let dt = self.time.config.fixed_timestep;
        // Spread the sub-steps across the frame so timers see increasing stamps
        let frame_end = self.time.now();
        for step in 0..steps {
            let now = frame_end - dt * (steps - 1 - step) as f32;
            for combatant in self.combatants.iter_mut() {
                combatant.tick(dt, now);
            }
        }
        self.dispatch();
        steps
    }

    fn dispatch(&mut self) {
        for combatant in self.combatants.iter_mut() {
            let events = combatant.drain_events();
            self.bus.publish_all(events);
        }
    }

    fn index_of(&self, id: CombatantId) -> Result<usize, CombatError> {
        self.combatants
            .iter()
            .position(|c| c.id() == id)
            .ok_or(CombatError::UnknownCombatant(id))
    }

    fn combatant_mut(&mut self, id: CombatantId) -> Result<&mut CombatantState, CombatError> {
        self.combatants
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or(CombatError::UnknownCombatant(id))
    }
}

/// Two distinct mutable elements of a slice
fn pair_mut<T>(items: &mut [T], first: usize, second: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(first, second);
    if first < second {
        let (left, right) = items.split_at_mut(second);
        (&mut left[first], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(first);
        (&mut right[0], &mut left[second])
    }
}
