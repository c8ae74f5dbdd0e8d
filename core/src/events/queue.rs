use super::LesionEvent;
use crate::types::LesionId;
use std::collections::BTreeSet;

/// Pending notifications, coalesced per kind
///
/// List and selection changes keep the state before the first change and
/// after the last one; the delivered event carries the net difference, so
/// a change that is undone within the same operation is never reported.
#[derive(Debug, Default)]
pub struct EventQueue {
    list: Option<(BTreeSet<LesionId>, BTreeSet<LesionId>)>,
    changed: BTreeSet<LesionId>,
    selection: Option<(BTreeSet<LesionId>, BTreeSet<LesionId>)>,
    placed: Vec<LesionId>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the lesion id set before and after a structural change
    pub fn push_list_change(&mut self, before: BTreeSet<LesionId>, after: BTreeSet<LesionId>) {
        match &mut self.list {
            Some((_, last)) => *last = after,
            None => self.list = Some((before, after)),
        }
    }

    pub fn push_changed(&mut self, ids: impl IntoIterator<Item = LesionId>) {
        self.changed.extend(ids);
    }

    /// Records the selected lesion set before and after a selection change
    pub fn push_selection(&mut self, before: BTreeSet<LesionId>, after: BTreeSet<LesionId>) {
        match &mut self.selection {
            Some((_, last)) => *last = after,
            None => self.selection = Some((before, after)),
        }
    }

    pub fn push_placed(&mut self, id: LesionId) {
        if !self.placed.contains(&id) {
            self.placed.push(id);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_none()
            && self.changed.is_empty()
            && self.selection.is_none()
            && self.placed.is_empty()
    }

    pub fn clear(&mut self) {
        self.list = None;
        self.changed.clear();
        self.selection = None;
        self.placed.clear();
    }

    /// Takes the pending events in delivery order, dropping empty differences
    ///
    /// Changes to lesions deleted in the same batch are not reported.
    pub fn drain(&mut self) -> Vec<LesionEvent> {
        let mut events = Vec::new();
        let mut deleted = BTreeSet::new();

        if let Some((before, after)) = self.list.take() {
            let created: BTreeSet<LesionId> = after.difference(&before).copied().collect();
            deleted = before.difference(&after).copied().collect();
            if !created.is_empty() || !deleted.is_empty() {
                events.push(LesionEvent::ListChanged {
                    created,
                    deleted: deleted.clone(),
                });
            }
        }

        let changed: BTreeSet<LesionId> = std::mem::take(&mut self.changed)
            .difference(&deleted)
            .copied()
            .collect();
        if !changed.is_empty() {
            events.push(LesionEvent::Changed { ids: changed });
        }

        if let Some((before, after)) = self.selection.take() {
            let added: BTreeSet<LesionId> = after.difference(&before).copied().collect();
            let removed: BTreeSet<LesionId> = before.difference(&after).copied().collect();
            if !added.is_empty() || !removed.is_empty() {
                events.push(LesionEvent::SelectionChanged { added, removed });
            }
        }

        for id in self.placed.drain(..) {
            if !deleted.contains(&id) {
                events.push(LesionEvent::Placed { id });
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    fn ids(values: &[u64]) -> BTreeSet<LesionId> {
        values.iter().copied().map(LesionId::new).collect()
    }

    #[test]
    fn test_list_change_net_difference() {
        let mut queue = EventQueue::new();
        queue.push_list_change(ids(&[1, 2]), ids(&[1, 2, 3]));
        queue.push_list_change(ids(&[1, 2, 3]), ids(&[1, 3]));

        let events = queue.drain();
        assert_eq!(
            events,
            vec![LesionEvent::ListChanged {
                created: ids(&[3]),
                deleted: ids(&[2]),
            }]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_undone_change_is_silent() {
        let mut queue = EventQueue::new();
        queue.push_selection(ids(&[1]), ids(&[1, 2]));
        queue.push_selection(ids(&[1, 2]), ids(&[1]));
        queue.push_list_change(ids(&[]), ids(&[]));
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_changed_skips_deleted() {
        let mut queue = EventQueue::new();
        queue.push_changed(ids(&[1, 2]));
        queue.push_list_change(ids(&[1, 2]), ids(&[1]));

        let events = queue.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], LesionEvent::Changed { ids: ids(&[1]) });
    }

    #[test]
    fn test_delivery_order() {
        let mut queue = EventQueue::new();
        queue.push_placed(LesionId::new(4));
        queue.push_selection(ids(&[]), ids(&[4]));
        queue.push_changed(ids(&[4]));
        queue.push_list_change(ids(&[]), ids(&[4]));

        let kinds: Vec<_> = queue.drain().iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::ListChanged,
                EventKind::Changed,
                EventKind::SelectionChanged,
                EventKind::Placed,
            ]
        );
    }
}
