//! Simulation events
//!
//! Fire-and-forget notifications for audio, particle and haptic
//! collaborators. Listeners are registered on the run itself; events are
//! also buffered so a host can poll them once per frame instead.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Oldest buffered events are dropped past this, for hosts that never poll
pub const MAX_PENDING_EVENTS: usize = 1024;

/// Discrete outcome emitted by a fixed step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A new pattern left the core
    PatternSpawned { id: u64, color_index: u8, angle: f64 },
    /// A pattern crossed the escape ring
    PatternEscaped { color_index: u8, angle: f64 },
    /// A pattern was pulled all the way back
    PatternStabilized { color_index: u8 },
    /// Survival threshold crossed
    LevelAdvanced { level: u32 },
}

/// Handle returned by [`EventHub::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

type Listener = Box<dyn FnMut(&GameEvent)>;

/// Listener registry plus a polling buffer
#[derive(Default)]
pub struct EventHub {
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u32,
    pending: VecDeque<GameEvent>,
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("listeners", &self.listeners.len())
            .field("pending", &self.pending)
            .finish()
    }
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the id was not registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Drop every listener (teardown)
    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver to listeners in registration order, then buffer
    pub fn emit(&mut self, event: GameEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
        if self.pending.len() == MAX_PENDING_EVENTS {
            self.pending.pop_front();
        }
        self.pending.push_back(event);
    }

    /// Take buffered events since the last drain
    pub fn drain(&mut self) -> Vec<GameEvent> {
        self.pending.drain(..).collect()
    }
}
