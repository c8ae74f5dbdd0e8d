//! Lesion change notifications
//!
//! Mutations never notify listeners directly. They record what changed in
//! an [`EventQueue`]; the engine flushes the queue once at the end of each
//! public operation, so a bulk operation over many lesions produces at most
//! one event per [`EventKind`].

mod queue;
mod registry;

pub use queue::EventQueue;
pub use registry::{Listener, ListenerHandle, ListenerRegistry};

use crate::types::LesionId;
use log::debug;
use std::collections::BTreeSet;
use std::fmt;

/// Listener category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// Lesions were created or deleted
    ListChanged,
    /// Attributes or geometry of existing lesions changed
    Changed,
    /// The set of selected lesions changed
    SelectionChanged,
    /// An interactive placement gesture finished
    Placed,
}

impl EventKind {
    pub fn simple_name(&self) -> &'static str {
        match self {
            EventKind::ListChanged => "list-changed",
            EventKind::Changed => "changed",
            EventKind::SelectionChanged => "selection-changed",
            EventKind::Placed => "placed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Notification delivered to listeners
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LesionEvent {
    ListChanged {
        created: BTreeSet<LesionId>,
        deleted: BTreeSet<LesionId>,
    },
    Changed {
        ids: BTreeSet<LesionId>,
    },
    SelectionChanged {
        added: BTreeSet<LesionId>,
        removed: BTreeSet<LesionId>,
    },
    Placed {
        id: LesionId,
    },
}

impl LesionEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            LesionEvent::ListChanged { .. } => EventKind::ListChanged,
            LesionEvent::Changed { .. } => EventKind::Changed,
            LesionEvent::SelectionChanged { .. } => EventKind::SelectionChanged,
            LesionEvent::Placed { .. } => EventKind::Placed,
        }
    }
}

/// Dispatch state of an [`EventHub`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchState {
    #[default]
    Idle,
    Dispatching(EventKind),
}

/// Listener registry plus pending-event queue
#[derive(Default)]
pub struct EventHub {
    registry: ListenerRegistry,
    queue: EventQueue,
    state: DispatchState,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ListenerRegistry {
        &mut self.registry
    }

    pub fn queue_mut(&mut self) -> &mut EventQueue {
        &mut self.queue
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn is_dispatching(&self) -> bool {
        matches!(self.state, DispatchState::Dispatching(_))
    }

    /// Drops every pending event without delivering it
    pub fn discard(&mut self) {
        if !self.queue.is_empty() {
            debug!("Discarding pending lesion events");
        }
        self.queue.clear();
    }

    /// Delivers pending events, one per kind
    ///
    /// A flush requested while a dispatch is in flight leaves the queue for
    /// the outer flush, which keeps draining until the queue is empty.
    /// Returns the number of events delivered.
    pub fn flush(&mut self) -> usize {
        if self.is_dispatching() {
            return 0;
        }
        let mut delivered = 0;
        loop {
            let events = self.queue.drain();
            if events.is_empty() {
                break;
            }
            for event in events {
                self.state = DispatchState::Dispatching(event.kind());
                self.registry.dispatch(&event);
                self.state = DispatchState::Idle;
                delivered += 1;
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ids(values: &[u64]) -> BTreeSet<LesionId> {
        values.iter().copied().map(LesionId::new).collect()
    }

    #[test]
    fn test_flush_delivers_one_event_per_kind() {
        let mut hub = EventHub::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        hub.registry_mut().subscribe(EventKind::Changed, move |event| {
            sink.borrow_mut().push(event.clone());
            Ok(())
        });

        hub.queue_mut().push_changed(ids(&[1]));
        hub.queue_mut().push_changed(ids(&[2, 3]));
        assert_eq!(hub.flush(), 1);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], LesionEvent::Changed { ids: ids(&[1, 2, 3]) });
        assert_eq!(hub.state(), DispatchState::Idle);
    }

    #[test]
    fn test_discard_drops_pending() {
        let mut hub = EventHub::new();
        hub.queue_mut().push_placed(LesionId::new(1));
        hub.discard();
        assert_eq!(hub.flush(), 0);
    }

    #[test]
    fn test_event_kind() {
        let event = LesionEvent::Placed { id: LesionId::new(2) };
        assert_eq!(event.kind(), EventKind::Placed);
        assert_eq!(EventKind::SelectionChanged.to_string(), "selection-changed");
    }
}
