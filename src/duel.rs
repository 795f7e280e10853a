//! Scripted duel runner
//!
//! Pits the two configured duelists against each other until one falls or
//! time runs out. Crit, proc, and block rolls all come from one seeded RNG,
//! so a settings file always plays out the same way.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skirmish_combat::{Arena, CombatEvent, CombatLog, CombatantState, DamageRequest};
use skirmish_core::{CombatantId, Transform, Vec3};
use tracing::{debug, info};

use crate::settings::{DuelistSettings, GameSettings, WeaponProfile};

/// Outcome of a duel
#[derive(Debug, Clone)]
pub struct DuelReport {
    /// Name of the last one standing, `None` on a timeout or double KO
    pub winner: Option<String>,
    /// Simulated seconds elapsed
    pub duration: f32,
    pub steps: u32,
    /// Dispatched events by name
    pub event_counts: BTreeMap<String, usize>,
    /// Final state of both duelists
    pub combatants: Vec<CombatantState>,
}

struct Duelist {
    id: CombatantId,
    weapon: WeaponProfile,
    block_chance: f32,
    next_attack: f32,
}

impl Duelist {
    fn spawn(arena: &mut Arena, settings: &DuelistSettings, transform: Transform) -> Result<Self> {
        let id = arena
            .spawn_at(&settings.combatant, transform)
            .with_context(|| format!("Failed to spawn {}", settings.combatant.name))?;
        Ok(Self {
            id,
            weapon: settings.weapon.clone(),
            block_chance: settings.block_chance,
            next_attack: 0.0,
        })
    }
}

/// Run the duel described by `settings`
pub fn run_duel(settings: &GameSettings) -> Result<DuelReport> {
    let duel = &settings.duel;
    duel.validate(&settings.combat)?;

    let mut arena = Arena::new(settings.combat.clone()).context("Failed to create arena")?;
    let log = CombatLog::new();
    arena.subscribe(log.clone());
    arena.subscribe(log_event);

    let half = duel.distance.max(0.0) * 0.5;
    let west = Vec3::new(0.0, 0.0, half);
    let east = Vec3::new(0.0, 0.0, -half);
    let mut duelists = [
        Duelist::spawn(&mut arena, &duel.challenger, Transform::looking_at(west, east))?,
        Duelist::spawn(&mut arena, &duel.defender, Transform::looking_at(east, west))?,
    ];

    info!(
        "Duel: {} vs {} (seed {})",
        duel.challenger.combatant.name, duel.defender.combatant.name, duel.seed
    );

    let mut rng = StdRng::seed_from_u64(duel.seed);
    // Simulated seconds each step advances the clock
    let advance = duel.step * settings.combat.time.time_scale;
    let max_steps = (duel.max_duration / advance).ceil() as u32;
    let mut steps = 0;

    while steps < max_steps && arena.alive_count() == duelists.len() {
        arena.step(duel.step);
        steps += 1;
        let now = arena.now();

        for attacker in 0..duelists.len() {
            let defender = 1 - attacker;
            if !ready(&arena, &duelists[attacker], now) {
                continue;
            }

            let defender_id = duelists[defender].id;
            let blocking = rng.gen::<f32>() < duelists[defender].block_chance;
            if blocking {
                arena.press_block(defender_id)?;
            }

            let weapon = duelists[attacker].weapon.clone();
            let request = build_request(&weapon, &mut rng);
            let resolved = arena.attack(duelists[attacker].id, defender_id, request)?;

            if let Some(proc) = weapon.proc {
                if resolved.landed() && rng.gen::<f32>() < weapon.proc_chance {
                    arena.apply_status_proc(defender_id, proc, weapon.proc_duration)?;
                }
            }

            if blocking {
                arena.release_block(defender_id)?;
            }
            duelists[attacker].next_attack = now + weapon.attack_interval.max(advance);
        }
    }

    let survivors: Vec<&CombatantState> = arena.combatants().iter().filter(|c| c.is_alive()).collect();
    let winner = match survivors.as_slice() {
        [only] if arena.len() > 1 => Some(only.name.clone()),
        _ => None,
    };

    let mut event_counts = BTreeMap::new();
    for event in log.events() {
        *event_counts.entry(event.name().to_string()).or_insert(0) += 1;
    }

    match &winner {
        Some(name) => info!("{} wins after {:.2}s", name, arena.now()),
        None => info!("No winner after {:.2}s", arena.now()),
    }

    Ok(DuelReport {
        winner,
        duration: arena.now(),
        steps,
        event_counts,
        combatants: arena.combatants().to_vec(),
    })
}

fn ready(arena: &Arena, duelist: &Duelist, now: f32) -> bool {
    now >= duelist.next_attack
        && arena
            .get(duelist.id)
            .is_some_and(|state| state.is_alive() && !state.is_stunned())
}

fn build_request(weapon: &WeaponProfile, rng: &mut StdRng) -> DamageRequest {
    DamageRequest::new(weapon.base_damage, weapon.kind)
        .with_critical_roll_using(rng, weapon.crit_chance, weapon.crit_multiplier)
        .with_armor_penetration(weapon.armor_penetration)
        .with_shield_penetration(weapon.shield_penetration)
        .with_life_steal(weapon.life_steal)
        .with_knockback(weapon.knockback)
        .with_stun(weapon.stun_duration)
}

fn log_event(event: &CombatEvent) {
    match event {
        CombatEvent::DamageApplied { target, damage, .. } => info!(
            "{} took {:.1} {} damage{}",
            target,
            damage.amount,
            damage.kind.name(),
            if damage.is_critical { " (critical)" } else { "" }
        ),
        CombatEvent::BlockSuccess { target, .. } => info!("{} blocked", target),
        CombatEvent::CombatantDied { target, killer } => match killer {
            Some(killer) => info!("{} was killed by {}", target, killer),
            None => info!("{} died", target),
        },
        CombatEvent::StatusEffectApplied { target, kind } => info!("{} is afflicted by {}", target, kind.name()),
        other => debug!("{} on {}", other.name(), other.target()),
    }
}
