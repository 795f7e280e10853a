//! Timed block state machine
//!
//! Idle -> Buffered -> Blocking -> Cooldown -> Idle
//!
//! A press is buffered for a short window so an input that arrives slightly
//! early (during cooldown, or before stamina has recovered) still starts a
//! block the moment the gate allows it.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BlockConfig;

/// Slack on the cosine of the arc boundary so an attack exactly on the edge
/// is blocked despite f32 rounding
pub const ARC_TOLERANCE: f32 = 1e-6;

/// Current phase of the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockPhase {
    #[default]
    Idle,
    /// Press received, waiting for stamina
    Buffered,
    Blocking,
    /// Block just ended; new presses are held but not honored
    Cooldown,
}

/// Edge transition reported by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTransition {
    Started,
    Ended,
}

/// Per-combatant block gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockGate {
    pub config: BlockConfig,
    phase: BlockPhase,
    stamina: f32,
    last_input_time: Option<f32>,
    buffered_at: Option<f32>,
    block_started_at: Option<f32>,
    cooldown_ends_at: f32,
}

impl BlockGate {
    /// Create an idle gate with full stamina
    pub fn new(config: BlockConfig) -> Self {
        Self {
            stamina: config.stamina_max,
            config,
            phase: BlockPhase::Idle,
            last_input_time: None,
            buffered_at: None,
            block_started_at: None,
            cooldown_ends_at: 0.0,
        }
    }

    pub fn phase(&self) -> BlockPhase {
        self.phase
    }

    pub fn is_blocking(&self) -> bool {
        self.phase == BlockPhase::Blocking
    }

    pub fn stamina(&self) -> f32 {
        self.stamina
    }

    /// Stamina as a 0.0-1.0 fraction
    pub fn stamina_fraction(&self) -> f32 {
        if self.config.stamina_max <= 0.0 {
            return 0.0;
        }
        (self.stamina / self.config.stamina_max).clamp(0.0, 1.0)
    }

    pub fn last_input_time(&self) -> Option<f32> {
        self.last_input_time
    }

    pub fn block_started_at(&self) -> Option<f32> {
        self.block_started_at
    }

    /// Whether a press is waiting to be honored
    pub fn has_buffered_input(&self) -> bool {
        self.buffered_at.is_some()
    }

    /// Half of the configured arc, in radians
    pub fn half_arc_radians(&self) -> f32 {
        (self.config.arc_degrees * 0.5).to_radians()
    }

    /// Block intent from the input layer
    pub fn press(&mut self, now: f32) -> Option<BlockTransition> {
        self.last_input_time = Some(now);
        match self.phase {
            BlockPhase::Blocking => None,
            BlockPhase::Cooldown => {
                self.buffered_at = Some(now);
                debug!("Block press buffered during cooldown at t={:.2}", now);
                None
            }
            BlockPhase::Idle | BlockPhase::Buffered => {
                self.buffered_at = Some(now);
                self.phase = BlockPhase::Buffered;
                self.try_promote(now)
            }
        }
    }

    /// Block release from the input layer
    pub fn release(&mut self, now: f32) -> Option<BlockTransition> {
        self.last_input_time = Some(now);
        match self.phase {
            BlockPhase::Blocking => self.end(now),
            BlockPhase::Buffered => {
                self.buffered_at = None;
                self.phase = BlockPhase::Idle;
                None
            }
            BlockPhase::Cooldown => {
                self.buffered_at = None;
                None
            }
            BlockPhase::Idle => None,
        }
    }

    /// End an active block regardless of input (stun, death)
    pub fn force_end(&mut self, now: f32) -> Option<BlockTransition> {
        self.buffered_at = None;
        match self.phase {
            BlockPhase::Blocking => self.end(now),
            BlockPhase::Buffered => {
                self.phase = BlockPhase::Idle;
                None
            }
            _ => None,
        }
    }

    /// Advance timers and stamina
    pub fn tick(&mut self, dt: f32, now: f32) -> Option<BlockTransition> {
        debug_assert!(dt >= 0.0, "negative dt passed to block gate: {}", dt);
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.stamina = (self.stamina + self.config.stamina_regen * dt).min(self.config.stamina_max);

        if self.phase == BlockPhase::Cooldown && now >= self.cooldown_ends_at {
            self.phase = BlockPhase::Idle;
        }

        if let Some(pressed_at) = self.buffered_at {
            if now - pressed_at > self.config.input_buffer_window {
                self.buffered_at = None;
                if self.phase == BlockPhase::Buffered {
                    self.phase = BlockPhase::Idle;
                }
            } else if self.phase == BlockPhase::Idle {
                self.phase = BlockPhase::Buffered;
            }
        }

        self.try_promote(now)
    }

    /// Whether a hit travelling along `attack_direction` is stopped. Only
    /// succeeds while Blocking; a successful negation keeps the block up.
    pub fn try_negate(&self, facing: Vec3, attack_direction: Option<Vec3>) -> bool {
        if self.phase != BlockPhase::Blocking {
            return false;
        }
        let Some(direction) = attack_direction else {
            return false;
        };
        self.covers(facing, direction)
    }

    /// Whether the arc around `facing` covers an attack travelling along
    /// `attack_direction`
    pub fn covers(&self, facing: Vec3, attack_direction: Vec3) -> bool {
        let facing = facing.normalize_or_zero();
        let toward_attacker = (-attack_direction).normalize_or_zero();
        if facing == Vec3::ZERO || toward_attacker == Vec3::ZERO {
            return false;
        }
        facing.dot(toward_attacker) >= self.half_arc_radians().cos() - ARC_TOLERANCE
    }

    fn try_promote(&mut self, now: f32) -> Option<BlockTransition> {
        if self.phase != BlockPhase::Buffered || self.stamina < self.config.stamina_cost {
            return None;
        }
        self.stamina -= self.config.stamina_cost;
        self.phase = BlockPhase::Blocking;
        self.buffered_at = None;
        self.block_started_at = Some(now);
        debug!("Block started at t={:.2}, stamina {:.1}", now, self.stamina);
        Some(BlockTransition::Started)
    }

    fn end(&mut self, now: f32) -> Option<BlockTransition> {
        self.phase = BlockPhase::Cooldown;
        self.cooldown_ends_at = now + self.config.cooldown;
        self.block_started_at = None;
        debug!("Block ended at t={:.2}, cooldown until {:.2}", now, self.cooldown_ends_at);
        Some(BlockTransition::Ended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn gate() -> BlockGate {
        BlockGate::new(BlockConfig::default())
    }

    /// Attack travelling so that the direction back to the attacker sits
    /// `degrees` away from -Z
    fn attack_at(degrees: f32) -> Vec3 {
        let toward_attacker = Quat::from_rotation_y(degrees.to_radians()) * -Vec3::Z;
        -toward_attacker
    }

    #[test]
    fn test_press_starts_block_immediately() {
        let mut gate = gate();
        assert_eq!(gate.press(0.0), Some(BlockTransition::Started));
        assert!(gate.is_blocking());
        assert_eq!(gate.stamina(), 75.0);
        assert_eq!(gate.block_started_at(), Some(0.0));
    }

    #[test]
    fn test_release_enters_cooldown() {
        let mut gate = gate();
        gate.press(0.0);
        assert_eq!(gate.release(1.0), Some(BlockTransition::Ended));
        assert_eq!(gate.phase(), BlockPhase::Cooldown);

        gate.tick(0.25, 1.25);
        assert_eq!(gate.phase(), BlockPhase::Cooldown);
        gate.tick(0.25, 1.5);
        assert_eq!(gate.phase(), BlockPhase::Idle);
    }

    #[test]
    fn test_press_during_cooldown_buffered_then_honored() {
        let mut gate = gate();
        gate.press(0.0);
        gate.release(0.5);

        // Cooldown runs until 1.0; press lands 0.1s early
        assert_eq!(gate.press(0.9), None);
        assert_eq!(gate.phase(), BlockPhase::Cooldown);
        assert!(gate.has_buffered_input());

        assert_eq!(gate.tick(0.1, 1.0), Some(BlockTransition::Started));
        assert!(gate.is_blocking());
    }

    #[test]
    fn test_buffered_press_expires() {
        let mut gate = gate();
        gate.press(0.0);
        gate.release(0.5);
        gate.press(0.6);

        gate.tick(0.2, 0.8);
        assert!(!gate.has_buffered_input());
        assert_eq!(gate.tick(0.2, 1.0), None);
        assert_eq!(gate.phase(), BlockPhase::Idle);
    }

    #[test]
    fn test_stamina_gate_and_regen_scenario() {
        let mut gate = BlockGate::new(BlockConfig {
            stamina_max: 10.0,
            stamina_regen: 5.0,
            stamina_cost: 10.0,
            cooldown: 0.5,
            input_buffer_window: 0.15,
            arc_degrees: 120.0,
        });

        assert_eq!(gate.press(0.0), Some(BlockTransition::Started));
        assert_eq!(gate.stamina(), 0.0);
        gate.release(0.1);

        // Rapid second intent inside cooldown is rejected
        assert_eq!(gate.press(0.2), None);
        let mut now = 0.2;
        while now < 0.7 {
            now += 0.05;
            assert_eq!(gate.tick(0.05, now), None);
        }
        assert_eq!(gate.phase(), BlockPhase::Idle);

        // Cooldown cleared but stamina has not recovered
        assert_eq!(gate.press(now), None);
        assert_eq!(gate.phase(), BlockPhase::Buffered);

        // Let stamina refill fully, then press again
        for _ in 0..40 {
            now += 0.05;
            gate.tick(0.05, now);
        }
        assert!(gate.stamina() >= 10.0 - 1e-3);
        assert_eq!(gate.press(now), Some(BlockTransition::Started));
    }

    #[test]
    fn test_buffered_press_promoted_when_stamina_arrives() {
        let mut gate = BlockGate::new(BlockConfig {
            stamina_max: 10.0,
            stamina_regen: 10.0,
            stamina_cost: 10.0,
            ..Default::default()
        });
        gate.press(0.0);
        gate.release(0.0);
        gate.tick(0.5, 0.5);
        gate.tick(0.25, 0.75);
        gate.tick(0.125, 0.875);
        assert_eq!(gate.stamina(), 8.75);

        assert_eq!(gate.press(0.875), None);
        assert_eq!(gate.phase(), BlockPhase::Buffered);
        assert_eq!(gate.tick(0.125, 1.0), Some(BlockTransition::Started));
    }

    #[test]
    fn test_release_while_buffered_drops_intent() {
        let mut gate = BlockGate::new(BlockConfig {
            stamina_cost: 200.0,
            ..Default::default()
        });
        gate.press(0.0);
        assert_eq!(gate.phase(), BlockPhase::Buffered);
        assert_eq!(gate.release(0.05), None);
        assert_eq!(gate.phase(), BlockPhase::Idle);
        assert!(!gate.has_buffered_input());
    }

    #[test]
    fn test_force_end() {
        let mut gate = gate();
        gate.press(0.0);
        assert_eq!(gate.force_end(0.2), Some(BlockTransition::Ended));
        assert_eq!(gate.force_end(0.3), None);
    }

    #[test]
    fn test_negate_only_while_blocking() {
        let mut gate = gate();
        let facing = -Vec3::Z;
        assert!(!gate.try_negate(facing, Some(attack_at(0.0))));
        gate.press(0.0);
        assert!(gate.try_negate(facing, Some(attack_at(0.0))));
        // Still blocking after a successful negation
        assert!(gate.is_blocking());
        assert!(!gate.try_negate(facing, None));
    }

    #[test]
    fn test_arc_boundary() {
        let mut gate = BlockGate::new(BlockConfig {
            arc_degrees: 90.0,
            ..Default::default()
        });
        gate.press(0.0);
        let facing = -Vec3::Z;

        assert!(gate.try_negate(facing, Some(attack_at(45.0))));
        assert!(gate.try_negate(facing, Some(attack_at(-45.0))));
        assert!(!gate.try_negate(facing, Some(attack_at(45.0 + 0.6))));
        assert!(gate.try_negate(facing, Some(attack_at(45.0 - 0.004))));
        assert!(!gate.try_negate(facing, Some(attack_at(45.0 + 0.004))));
        assert!(!gate.try_negate(facing, Some(attack_at(-45.0 - 0.004))));
        assert!(!gate.try_negate(facing, Some(attack_at(180.0))));
    }

    #[test]
    fn test_full_circle_arc_blocks_from_behind() {
        let mut gate = BlockGate::new(BlockConfig {
            arc_degrees: 360.0,
            ..Default::default()
        });
        gate.press(0.0);
        assert!(gate.try_negate(-Vec3::Z, Some(attack_at(180.0))));
    }

    #[test]
    fn test_stamina_regen_capped() {
        let mut gate = gate();
        gate.press(0.0);
        gate.tick(100.0, 100.0);
        assert_eq!(gate.stamina(), 100.0);
        assert_eq!(gate.stamina_fraction(), 1.0);
    }
}
