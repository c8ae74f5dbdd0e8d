use super::{EventKind, LesionEvent};
use crate::error::Result;
use log::error;
use std::panic::{self, AssertUnwindSafe};

/// Callback invoked with each delivered event
pub type Listener = Box<dyn FnMut(&LesionEvent) -> Result<()>>;

/// Handle returned by [`ListenerRegistry::subscribe`]
///
/// Slots are reused after unsubscription; the generation makes a stale
/// handle unable to remove the slot's next occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle {
    kind: EventKind,
    slot: usize,
    generation: u32,
}

impl ListenerHandle {
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

struct Slot {
    generation: u32,
    listener: Option<Listener>,
}

/// Typed subscriber lists, one per [`EventKind`]
#[derive(Default)]
pub struct ListenerRegistry {
    list_changed: Vec<Slot>,
    changed: Vec<Slot>,
    selection_changed: Vec<Slot>,
    placed: Vec<Slot>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self, kind: EventKind) -> &Vec<Slot> {
        match kind {
            EventKind::ListChanged => &self.list_changed,
            EventKind::Changed => &self.changed,
            EventKind::SelectionChanged => &self.selection_changed,
            EventKind::Placed => &self.placed,
        }
    }

    fn slots_mut(&mut self, kind: EventKind) -> &mut Vec<Slot> {
        match kind {
            EventKind::ListChanged => &mut self.list_changed,
            EventKind::Changed => &mut self.changed,
            EventKind::SelectionChanged => &mut self.selection_changed,
            EventKind::Placed => &mut self.placed,
        }
    }

    /// Registers a listener for one event kind
    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> ListenerHandle
    where
        F: FnMut(&LesionEvent) -> Result<()> + 'static,
    {
        let slots = self.slots_mut(kind);
        let listener: Listener = Box::new(listener);

        if let Some((slot, entry)) = slots
            .iter_mut()
            .enumerate()
            .find(|(_, s)| s.listener.is_none())
        {
            entry.listener = Some(listener);
            return ListenerHandle {
                kind,
                slot,
                generation: entry.generation,
            };
        }

        slots.push(Slot {
            generation: 0,
            listener: Some(listener),
        });
        ListenerHandle {
            kind,
            slot: slots.len() - 1,
            generation: 0,
        }
    }

    /// Removes a listener; returns false for stale or unknown handles
    pub fn unsubscribe(&mut self, handle: ListenerHandle) -> bool {
        match self.slots_mut(handle.kind).get_mut(handle.slot) {
            Some(entry) if entry.generation == handle.generation && entry.listener.is_some() => {
                entry.listener = None;
                entry.generation = entry.generation.wrapping_add(1);
                true
            }
            _ => false,
        }
    }

    /// Number of live listeners for a kind
    pub fn len(&self, kind: EventKind) -> usize {
        self.slots(kind)
            .iter()
            .filter(|s| s.listener.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        [
            EventKind::ListChanged,
            EventKind::Changed,
            EventKind::SelectionChanged,
            EventKind::Placed,
        ]
        .iter()
        .all(|kind| self.len(*kind) == 0)
    }

    /// Delivers an event to every listener of its kind
    ///
    /// A listener that fails or panics is logged; the remaining listeners
    /// still run. Returns the number of failed listeners.
    pub fn dispatch(&mut self, event: &LesionEvent) -> usize {
        let kind = event.kind();
        let mut failures = 0;

        for (slot, entry) in self.slots_mut(kind).iter_mut().enumerate() {
            let Some(listener) = entry.listener.as_mut() else {
                continue;
            };
            match panic::catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failures += 1;
                    error!("{} listener #{} failed: {}", kind, slot, e);
                }
                Err(_) => {
                    failures += 1;
                    error!("{} listener #{} panicked", kind, slot);
                }
            }
        }

        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScintiError;
    use crate::types::LesionId;
    use std::cell::Cell;
    use std::rc::Rc;

    fn placed() -> LesionEvent {
        LesionEvent::Placed {
            id: LesionId::new(1),
        }
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let mut registry = ListenerRegistry::new();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let handle = registry.subscribe(EventKind::Placed, move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });

        registry.dispatch(&placed());
        assert!(registry.unsubscribe(handle));
        assert!(!registry.unsubscribe(handle));
        registry.dispatch(&placed());

        assert_eq!(calls.get(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_stale_handle_cannot_remove_new_listener() {
        let mut registry = ListenerRegistry::new();
        let first = registry.subscribe(EventKind::Changed, |_| Ok(()));
        registry.unsubscribe(first);
        let second = registry.subscribe(EventKind::Changed, |_| Ok(()));

        assert!(!registry.unsubscribe(first));
        assert_eq!(registry.len(EventKind::Changed), 1);
        assert!(registry.unsubscribe(second));
    }

    #[test]
    fn test_failing_listener_does_not_block_others() {
        let mut registry = ListenerRegistry::new();
        let calls = Rc::new(Cell::new(0));

        registry.subscribe(EventKind::Placed, |_| Err(ScintiError::from("broken")));
        registry.subscribe(EventKind::Placed, |_| panic!("listener bug"));
        let counter = Rc::clone(&calls);
        registry.subscribe(EventKind::Placed, move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });

        assert_eq!(registry.dispatch(&placed()), 2);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_dispatch_only_reaches_matching_kind() {
        let mut registry = ListenerRegistry::new();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        registry.subscribe(EventKind::ListChanged, move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });

        registry.dispatch(&placed());
        assert_eq!(calls.get(), 0);
    }
}
