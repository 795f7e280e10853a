//! Combat events and listener fan-out
//!
//! Combatants buffer events as they happen; the arena hands them to an
//! `EventBus`, which delivers each one to every registered listener. A
//! listener that panics is logged and skipped; the rest still run.

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use glam::Vec3;
use serde::Serialize;
use skirmish_core::CombatantId;
use tracing::error;

use crate::pool::PoolKind;
use crate::resolver::ResolvedDamage;
use crate::status::StatusEffectKind;

/// Something observable that happened to a combatant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CombatEvent {
    DamageApplied {
        target: CombatantId,
        attacker: Option<CombatantId>,
        damage: ResolvedDamage,
        knockback: Vec3,
    },
    BlockStarted {
        target: CombatantId,
    },
    BlockEnded {
        target: CombatantId,
    },
    BlockSuccess {
        target: CombatantId,
        attacker: Option<CombatantId>,
    },
    PoolDepleted {
        target: CombatantId,
        pool: PoolKind,
    },
    PoolRestored {
        target: CombatantId,
        pool: PoolKind,
    },
    CombatantDied {
        target: CombatantId,
        killer: Option<CombatantId>,
    },
    CombatantRevived {
        target: CombatantId,
    },
    Healed {
        target: CombatantId,
        amount: f32,
    },
    StatusEffectApplied {
        target: CombatantId,
        kind: StatusEffectKind,
    },
    StatusEffectRemoved {
        target: CombatantId,
        kind: StatusEffectKind,
    },
}

impl CombatEvent {
    /// Combatant the event is about
    pub fn target(&self) -> CombatantId {
        match self {
            Self::DamageApplied { target, .. }
            | Self::BlockStarted { target }
            | Self::BlockEnded { target }
            | Self::BlockSuccess { target, .. }
            | Self::PoolDepleted { target, .. }
            | Self::PoolRestored { target, .. }
            | Self::CombatantDied { target, .. }
            | Self::CombatantRevived { target }
            | Self::Healed { target, .. }
            | Self::StatusEffectApplied { target, .. }
            | Self::StatusEffectRemoved { target, .. } => *target,
        }
    }

    /// Short event name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::DamageApplied { .. } => "DamageApplied",
            Self::BlockStarted { .. } => "BlockStarted",
            Self::BlockEnded { .. } => "BlockEnded",
            Self::BlockSuccess { .. } => "BlockSuccess",
            Self::PoolDepleted { .. } => "PoolDepleted",
            Self::PoolRestored { .. } => "PoolRestored",
            Self::CombatantDied { .. } => "CombatantDied",
            Self::CombatantRevived { .. } => "CombatantRevived",
            Self::Healed { .. } => "Healed",
            Self::StatusEffectApplied { .. } => "StatusEffectApplied",
            Self::StatusEffectRemoved { .. } => "StatusEffectRemoved",
        }
    }
}

/// Receives combat events (presentation, audio, analytics, AI)
pub trait CombatListener {
    fn on_event(&mut self, event: &CombatEvent);
}

impl<F> CombatListener for F
where
    F: FnMut(&CombatEvent),
{
    fn on_event(&mut self, event: &CombatEvent) {
        self(event)
    }
}

/// Handle returned by `EventBus::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

/// Ordered list of listeners
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, Box<dyn CombatListener>)>,
    next_id: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Listeners are notified in subscription order.
    pub fn subscribe(&mut self, listener: impl CombatListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver one event to every listener
    pub fn publish(&mut self, event: &CombatEvent) {
        for (id, listener) in self.listeners.iter_mut() {
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(event)));
            if delivered.is_err() {
                error!("Combat listener {:?} panicked handling {}", id, event.name());
            }
        }
    }

    /// Deliver a batch of events in order
    pub fn publish_all<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = CombatEvent>,
    {
        for event in events {
            self.publish(&event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Listener that records every event it sees. Clones share the same record,
/// so keep one clone and subscribe the other.
#[derive(Debug, Clone, Default)]
pub struct CombatLog {
    events: Rc<RefCell<Vec<CombatEvent>>>,
}

impl CombatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<CombatEvent> {
        self.events.borrow().clone()
    }

    /// Number of recorded events matching `predicate`
    pub fn count(&self, predicate: impl Fn(&CombatEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|event| predicate(event)).count()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl CombatListener for CombatLog {
    fn on_event(&mut self, event: &CombatEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
