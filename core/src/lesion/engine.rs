use super::index::LesionIndex;
use crate::config::EngineConfig;
use crate::error::{Result, ScintiError};
use crate::events::{EventHub, EventKind, LesionEvent, ListenerHandle};
use crate::scoring::{compute_zone_scores, ZoneScores};
use crate::store::RegionStore;
use crate::types::{keys, LesionId, ZoneAssignment};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Identity attributes of one region, used to recognise the host echoing
/// back a structural change the engine made itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RegionKey {
    id: Option<String>,
    original: bool,
    overlay: Option<String>,
}

pub(super) fn fingerprint<S: RegionStore + ?Sized>(store: &S) -> Vec<RegionKey> {
    (0..store.count())
        .filter_map(|i| store.get(i))
        .map(|r| RegionKey {
            id: r.text_attribute(keys::ID).map(str::to_string),
            original: r.flag(keys::ORIGINAL),
            overlay: r.text_attribute(keys::ELLIPSE_ID).map(str::to_string),
        })
        .collect()
}

/// Lesion model layered over a host region store
///
/// One engine is opened per case and closed with [`LesionEngine::close`]
/// when the case is closed. The store is the single source of truth; the
/// engine only caches a [`LesionIndex`] and the zone scores derived from it,
/// and drops both on every structural change.
///
/// # Example
///
/// ```
/// use scintimark_core::{Geometry, LesionEngine, MemoryRegionStore, Zone};
///
/// let mut engine = LesionEngine::builder()
///     .store(MemoryRegionStore::new())
///     .build()
///     .unwrap();
///
/// let id = engine
///     .add_new_lesion(Geometry::point(0.2, 0.5), false, false, true)
///     .unwrap();
/// engine.assign_zone_to_lesion(Zone::Z4, id, true).unwrap();
///
/// assert_eq!(engine.get_zone_scores().score("4"), Some(1));
/// assert_eq!(engine.store().regions().len(), 2);
/// ```
pub struct LesionEngine<S: RegionStore> {
    pub(super) store: S,
    pub(super) config: EngineConfig,
    pub(super) index: RefCell<Option<Rc<LesionIndex>>>,
    pub(super) scores: RefCell<Option<ZoneScores>>,
    pub(super) events: EventHub,
    pub(super) known_lesions: BTreeSet<LesionId>,
    pub(super) known_selection: BTreeSet<LesionId>,
    pub(super) echo: Option<Vec<RegionKey>>,
    pub(super) placement: Option<LesionId>,
}

/// Builder for [`LesionEngine`]
pub struct LesionEngineBuilder<S: RegionStore> {
    store: Option<S>,
    config: EngineConfig,
}

impl<S: RegionStore> Default for LesionEngineBuilder<S> {
    fn default() -> Self {
        Self {
            store: None,
            config: EngineConfig::default(),
        }
    }
}

impl<S: RegionStore> LesionEngineBuilder<S> {
    /// Builder: Set the region store the engine reads and writes
    pub fn store(mut self, store: S) -> Self {
        self.store = Some(store);
        self
    }

    /// Builder: Set engine configuration
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Opens the engine over the store
    ///
    /// # Errors
    ///
    /// Returns [`ScintiError::MissingDependency`] if no store was supplied.
    pub fn build(self) -> Result<LesionEngine<S>> {
        let store = self
            .store
            .ok_or(ScintiError::MissingDependency("region store"))?;
        Ok(LesionEngine::new(store, self.config))
    }
}

impl<S: RegionStore> LesionEngine<S> {
    pub fn builder() -> LesionEngineBuilder<S> {
        LesionEngineBuilder::default()
    }

    /// Opens an engine over `store`
    ///
    /// Existing lesions and selections are taken as the baseline; no events
    /// are fired for them.
    pub fn new(store: S, config: EngineConfig) -> Self {
        let mut engine = Self {
            store,
            config,
            index: RefCell::new(None),
            scores: RefCell::new(None),
            events: EventHub::new(),
            known_lesions: BTreeSet::new(),
            known_selection: BTreeSet::new(),
            echo: None,
            placement: None,
        };
        engine.known_lesions = engine.get_all_lesion_ids();
        engine.known_selection = engine.get_selected_lesion_ids();
        info!(
            "Opened case with {} lesions over {} regions",
            engine.known_lesions.len(),
            engine.store.count()
        );
        engine
    }

    /// Tears the engine down and hands the store back
    pub fn close(self) -> S {
        info!("Closing case with {} lesions", self.known_lesions.len());
        self.store
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct store access for host-side edits
    ///
    /// Edits made here are not seen until the matching `on_region_*`
    /// notification is delivered.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ---- caches ----

    /// Current index, rebuilt from the store if stale
    pub fn index(&self) -> Rc<LesionIndex> {
        if let Some(index) = self.index.borrow().as_ref() {
            return Rc::clone(index);
        }
        let built = Rc::new(LesionIndex::build(&self.store, self.config.tie_break));
        *self.index.borrow_mut() = Some(Rc::clone(&built));
        built
    }

    /// Drops the index and the zone scores
    pub(super) fn invalidate(&self) {
        self.index.borrow_mut().take();
        self.scores.borrow_mut().take();
    }

    pub(super) fn invalidate_scores(&self) {
        self.scores.borrow_mut().take();
    }

    /// Drops caches after the engine changed the store's structure and
    /// remembers the result so the host's echo can be ignored
    pub(super) fn structure_written(&mut self) {
        self.invalidate();
        self.echo = Some(fingerprint(&self.store));
    }

    // ---- event plumbing ----

    /// Queues a list-changed event against the last reported lesion set
    pub(super) fn note_list_change(&mut self) {
        let after = self.get_all_lesion_ids();
        let before = std::mem::replace(&mut self.known_lesions, after.clone());
        self.events.queue_mut().push_list_change(before, after);
    }

    /// Queues a selection-changed event against the last reported selection
    pub(super) fn note_selection_change(&mut self) {
        let after = self.get_selected_lesion_ids();
        let before = std::mem::replace(&mut self.known_selection, after.clone());
        self.events.queue_mut().push_selection(before, after);
    }

    pub(super) fn note_changed(&mut self, ids: impl IntoIterator<Item = LesionId>) {
        self.events.queue_mut().push_changed(ids);
    }

    /// Ends a public operation: deliver or drop its queued events
    pub(super) fn finish(&mut self, notify: bool) {
        if notify {
            self.events.flush();
        } else {
            self.events.discard();
        }
    }

    /// Logs a misuse error and hands it back to the caller
    pub(super) fn misuse(&self, err: ScintiError) -> ScintiError {
        warn!("{}", err);
        err
    }

    /// Positions of a lesion, or a logged [`ScintiError::UnknownLesion`]
    pub(super) fn require(&self, id: LesionId) -> Result<Vec<usize>> {
        let positions = self.index().positions(id).to_vec();
        if positions.is_empty() {
            return Err(self.misuse(ScintiError::UnknownLesion(id)));
        }
        Ok(positions)
    }

    // ---- queries ----

    pub fn get_all_lesion_ids(&self) -> BTreeSet<LesionId> {
        self.index().all_ids()
    }

    /// (original, peer) positions of a complete lesion
    pub fn regions_for(&self, id: LesionId) -> Option<(usize, usize)> {
        self.index().regions_for(id)
    }

    /// Zone of a lesion, read from its original half
    ///
    /// Returns `None` for unknown lesions.
    pub fn get_zone_for_lesion(&self, id: LesionId) -> Option<ZoneAssignment> {
        let position = self.index().original(id)?;
        let region = self.store.get(position)?;
        Some(
            region
                .text_attribute(keys::ZONE)
                .and_then(|raw| ZoneAssignment::parse(raw).ok())
                .unwrap_or_default(),
        )
    }

    pub fn is_soft_tissue(&self, id: LesionId) -> bool {
        self.get_zone_for_lesion(id)
            .is_some_and(|zone| zone.is_soft_tissue())
    }

    pub fn is_score3(&self, id: LesionId) -> bool {
        self.original_flag(id, keys::SCORE3)
    }

    pub fn is_hidden(&self, id: LesionId) -> bool {
        self.original_flag(id, keys::HIDDEN)
    }

    fn original_flag(&self, id: LesionId, key: &str) -> bool {
        self.index()
            .original(id)
            .and_then(|p| self.store.get(p))
            .is_some_and(|r| r.flag(key))
    }

    /// Zone scores for the case, cached until the next relevant mutation
    pub fn get_zone_scores(&self) -> ZoneScores {
        if let Some(scores) = self.scores.borrow().as_ref() {
            return scores.clone();
        }
        let index = self.index();
        let scores = compute_zone_scores(&self.store, &index);
        *self.scores.borrow_mut() = Some(scores.clone());
        scores
    }

    // ---- subscriptions ----

    pub fn add_list_changed_listener<F>(&mut self, listener: F) -> ListenerHandle
    where
        F: FnMut(&LesionEvent) -> Result<()> + 'static,
    {
        self.events
            .registry_mut()
            .subscribe(EventKind::ListChanged, listener)
    }

    pub fn add_changed_listener<F>(&mut self, listener: F) -> ListenerHandle
    where
        F: FnMut(&LesionEvent) -> Result<()> + 'static,
    {
        self.events
            .registry_mut()
            .subscribe(EventKind::Changed, listener)
    }

    pub fn add_selection_changed_listener<F>(&mut self, listener: F) -> ListenerHandle
    where
        F: FnMut(&LesionEvent) -> Result<()> + 'static,
    {
        self.events
            .registry_mut()
            .subscribe(EventKind::SelectionChanged, listener)
    }

    pub fn add_placed_listener<F>(&mut self, listener: F) -> ListenerHandle
    where
        F: FnMut(&LesionEvent) -> Result<()> + 'static,
    {
        self.events
            .registry_mut()
            .subscribe(EventKind::Placed, listener)
    }

    /// Removes a listener of any kind
    pub fn remove_listener(&mut self, handle: ListenerHandle) -> bool {
        self.events.registry_mut().unsubscribe(handle)
    }

    pub fn remove_list_changed_listener(&mut self, handle: ListenerHandle) -> bool {
        handle.kind() == EventKind::ListChanged && self.remove_listener(handle)
    }

    pub fn remove_changed_listener(&mut self, handle: ListenerHandle) -> bool {
        handle.kind() == EventKind::Changed && self.remove_listener(handle)
    }

    pub fn remove_selection_changed_listener(&mut self, handle: ListenerHandle) -> bool {
        handle.kind() == EventKind::SelectionChanged && self.remove_listener(handle)
    }

    pub fn remove_placed_listener(&mut self, handle: ListenerHandle) -> bool {
        handle.kind() == EventKind::Placed && self.remove_listener(handle)
    }

    // ---- host notifications ----

    /// Host callback: regions were added or removed
    ///
    /// Ignored when the store still looks exactly as the engine's own last
    /// structural write left it. Otherwise orphaned halves and stray
    /// overlays are deleted and a single list-changed event is fired.
    pub fn on_region_list_changed(&mut self) {
        if let Some(expected) = self.echo.take() {
            if expected == fingerprint(&self.store) {
                debug!("Ignoring region list echo of our own write");
                return;
            }
        }

        self.invalidate();
        if self.config.heal_orphans {
            self.heal_orphans();
        }

        let overfull = self.index().overfull();
        if !overfull.is_empty() {
            warn!(
                "Lesions with more than two regions left untouched: {:?}",
                overfull
            );
        }

        self.note_list_change();
        self.note_selection_change();
        self.finish(true);
    }

    /// Host callback: the region at `index` was edited
    ///
    /// Re-mirrors the other half of the lesion (and its overlays) when the
    /// edit broke the symmetry.
    pub fn on_region_changed(&mut self, index: usize) {
        // The host may have edited identity or zone attributes too
        self.invalidate();
        match self.resync_region(index) {
            Ok(Some(id)) => self.note_changed([id]),
            Ok(None) => {}
            Err(e) => warn!("Could not resync region {}: {}", index, e),
        }
        self.finish(true);
    }

    /// Host callback: the region selection changed
    pub fn on_region_selections_changed(&mut self) {
        if self.config.mirror_selection {
            self.expand_selection_to_peers();
        }
        self.note_selection_change();
        self.finish(true);
    }
}
