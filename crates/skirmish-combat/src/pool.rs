//! Depletable, regenerating resource pools (shield and armor)
//!
//! A pool never routes overflow anywhere; `debit` reports how much it actually
//! took and the caller decides where the remainder goes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PoolConfig;

/// Which pool a value or event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolKind {
    Shield,
    Armor,
}

impl PoolKind {
    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Shield => "Shield",
            Self::Armor => "Armor",
        }
    }
}

/// Edge transition reported by a pool mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolTransition {
    /// current went from > 0 to 0
    Depleted,
    /// current went from 0 to > 0
    Restored,
}

/// Sanitise an amount that callers must never pass negative.
fn contract_amount(amount: f32, what: &'static str) -> f32 {
    debug_assert!(amount >= 0.0, "negative {} passed to pool: {}", what, amount);
    if amount.is_finite() {
        amount.max(0.0)
    } else {
        0.0
    }
}

/// A bounded value with delayed regeneration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcePool {
    pub kind: PoolKind,
    current: f32,
    max: f32,
    /// Points regenerated per second
    pub regen_rate: f32,
    /// Seconds after the last debit before regen resumes
    pub regen_delay: f32,
    /// Timestamp of the last debit, `None` if never damaged
    last_damage_time: Option<f32>,
    depleted: bool,
}

impl ResourcePool {
    /// Create a full pool
    pub fn new(kind: PoolKind, max: f32, regen_rate: f32, regen_delay: f32) -> Self {
        let max = contract_amount(max, "max");
        Self {
            kind,
            current: max,
            max,
            regen_rate: regen_rate.max(0.0),
            regen_delay: regen_delay.max(0.0),
            last_damage_time: None,
            depleted: max <= 0.0,
        }
    }

    /// Create a full pool from configuration
    pub fn from_config(kind: PoolKind, config: &PoolConfig) -> Self {
        Self::new(kind, config.max, config.regen_rate, config.regen_delay)
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Whether the pool has been emptied and not yet refilled
    pub fn is_depleted(&self) -> bool {
        self.depleted
    }

    pub fn last_damage_time(&self) -> Option<f32> {
        self.last_damage_time
    }

    /// Value as a 0.0-1.0 fraction
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.current / self.max).clamp(0.0, 1.0)
    }

    /// Remove up to `amount`. Returns the amount actually removed.
    pub fn debit(&mut self, amount: f32, now: f32) -> (f32, Option<PoolTransition>) {
        let amount = contract_amount(amount, "debit");
        let was_positive = self.current > 0.0;

        let removed = amount.min(self.current);
        self.current -= removed;
        self.last_damage_time = Some(now);

        if was_positive && self.current <= 0.0 {
            self.current = 0.0;
            self.depleted = true;
            debug!("{} pool depleted at t={:.2}", self.kind.name(), now);
            return (removed, Some(PoolTransition::Depleted));
        }
        (removed, None)
    }

    /// Add `amount`, capped at max
    pub fn credit(&mut self, amount: f32) -> Option<PoolTransition> {
        let amount = contract_amount(amount, "credit");
        let was_empty = self.current <= 0.0;
        self.current = (self.current + amount).min(self.max);
        self.restored_if(was_empty)
    }

    /// Refill to max, ignoring the regen delay
    pub fn refill(&mut self) -> Option<PoolTransition> {
        let was_empty = self.current <= 0.0;
        self.current = self.max;
        self.last_damage_time = None;
        self.restored_if(was_empty)
    }

    /// Regenerate if the delay since the last debit has elapsed
    pub fn tick(&mut self, dt: f32, now: f32) -> Option<PoolTransition> {
        let dt = contract_amount(dt, "dt");
        if self.current >= self.max {
            return None;
        }
        if let Some(last) = self.last_damage_time {
            if now - last < self.regen_delay {
                return None;
            }
        }

        let was_empty = self.current <= 0.0;
        self.current = (self.current + self.regen_rate * dt).min(self.max);
        self.restored_if(was_empty)
    }

    /// Change the max. Lowering it clamps current; raising it leaves current
    /// alone.
    pub fn set_max(&mut self, max: f32) -> Option<PoolTransition> {
        let max = contract_amount(max, "max");
        let was_positive = self.current > 0.0;
        self.max = max;
        if self.current > max {
            self.current = max;
        }
        if was_positive && self.current <= 0.0 {
            self.depleted = true;
            return Some(PoolTransition::Depleted);
        }
        None
    }

    fn restored_if(&mut self, was_empty: bool) -> Option<PoolTransition> {
        if was_empty && self.current > 0.0 {
            self.depleted = false;
            debug!("{} pool restored to {:.1}", self.kind.name(), self.current);
            Some(PoolTransition::Restored)
        } else {
            None
        }
    }
}
