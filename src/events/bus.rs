//! Listener registration and dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::event::CombatEvent;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u32);

impl ListenerId {
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Listener({})", self.0)
    }
}

/// Receives combat notifications.
///
/// Listeners observe; they cannot reach back into the combat state while
/// an event is being delivered.
pub trait CombatListener {
    fn on_event(&mut self, event: &CombatEvent);
}

impl<F: FnMut(&CombatEvent)> CombatListener for F {
    fn on_event(&mut self, event: &CombatEvent) {
        self(event);
    }
}

/// Ordered set of listeners. Dispatch follows registration order.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, Box<dyn CombatListener>)>,
    next_id: u32,
    emitted: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl CombatListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it wasn't registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Deliver `event` to every listener.
    pub fn emit(&mut self, event: &CombatEvent) {
        tracing::trace!(event = event.name(), subject = ?event.subject(), "emit");
        self.emitted += 1;
        for (_, listener) in &mut self.listeners {
            listener.on_event(event);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Events emitted since creation.
    #[must_use]
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("emitted", &self.emitted)
            .finish()
    }
}

/// Listener that records every event it sees.
///
/// Clones share the same buffer, so one clone can be subscribed while
/// another is kept for reading.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<CombatEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<CombatEvent> {
        self.events.borrow().clone()
    }

    /// Names of the recorded events, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(CombatEvent::name).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl CombatListener for EventLog {
    fn on_event(&mut self, event: &CombatEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CombatantId;

    fn died(id: u32) -> CombatEvent {
        CombatEvent::CharacterDied {
            combatant: CombatantId(id),
        }
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        for tag in ["first", "second", "third"] {
            let order = Rc::clone(&order);
            bus.subscribe(move |_: &CombatEvent| order.borrow_mut().push(tag));
        }

        bus.emit(&died(1));
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribe() {
        let log = EventLog::new();
        let mut bus = EventBus::new();
        let id = bus.subscribe(log.clone());
        bus.emit(&died(1));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(&died(2));

        assert_eq!(log.len(), 1);
        assert_eq!(bus.emitted(), 2);
    }

    #[test]
    fn test_event_log_shares_buffer() {
        let log = EventLog::new();
        let mut subscribed = log.clone();
        subscribed.on_event(&died(3));
        assert_eq!(log.names(), vec!["character_died"]);
        log.clear();
        assert!(subscribed.is_empty());
    }
}
