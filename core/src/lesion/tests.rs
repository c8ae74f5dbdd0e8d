use super::LesionEngine;
use crate::config::EngineConfig;
use crate::error::ScintiError;
use crate::events::{EventKind, LesionEvent};
use crate::geometry::{ellipse_from_axis, DisplayFrame, Geometry, Point};
use crate::store::{MemoryRegionStore, Region, RegionStore};
use crate::types::{keys, LesionId, LesionStyle, StyleChoice, Zone, ZoneAssignment};
use rstest::rstest;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

type EventLog = Rc<RefCell<Vec<LesionEvent>>>;

fn engine() -> LesionEngine<MemoryRegionStore> {
    LesionEngine::new(MemoryRegionStore::new(), EngineConfig::default())
}

fn recorder(log: &EventLog) -> impl FnMut(&LesionEvent) -> crate::error::Result<()> + 'static {
    let log = Rc::clone(log);
    move |event: &LesionEvent| {
        log.borrow_mut().push(event.clone());
        Ok(())
    }
}

/// Subscribes one recorder to every event kind
fn record(engine: &mut LesionEngine<MemoryRegionStore>) -> EventLog {
    let log = EventLog::default();
    engine.add_list_changed_listener(recorder(&log));
    engine.add_changed_listener(recorder(&log));
    engine.add_selection_changed_listener(recorder(&log));
    engine.add_placed_listener(recorder(&log));
    log
}

fn count(log: &EventLog, kind: EventKind) -> usize {
    log.borrow().iter().filter(|e| e.kind() == kind).count()
}

fn ids(values: &[u64]) -> BTreeSet<LesionId> {
    values.iter().copied().map(LesionId::new).collect()
}

fn attr<'a>(engine: &'a LesionEngine<MemoryRegionStore>, position: usize, key: &str) -> Option<&'a str> {
    engine.store().get(position).and_then(|r| r.text_attribute(key))
}

#[rstest]
#[case(Geometry::point(0.2, 0.5))]
#[case(Geometry::segment(Point::new(0.1, 0.2), Point::new(0.3, 0.6)))]
#[case(Geometry::polygon(vec![
    Point::new(0.1, 0.1),
    Point::new(0.4, 0.15),
    Point::new(0.25, 0.5),
]))]
fn test_new_lesion_is_mirrored_pair(#[case] geometry: Geometry) {
    let mut engine = engine();
    let id = engine.add_new_lesion(geometry.clone(), false, false, true).unwrap();

    let (original, peer) = engine.regions_for(id).unwrap();
    let store = engine.store();
    assert_eq!(store.count(), 2);
    assert!(store.get(original).unwrap().geometry.approx_eq(&geometry));
    assert!(store
        .get(peer)
        .unwrap()
        .geometry
        .is_mirror_of(&store.get(original).unwrap().geometry));
    assert!(store.get(original).unwrap().flag(keys::ORIGINAL));
    assert!(!store.get(peer).unwrap().has_attribute(keys::ORIGINAL));
}

#[test]
fn test_ids_follow_highest_in_use() {
    let mut engine = engine();
    let first = engine.add_new_lesion(Geometry::point(0.1, 0.1), false, false, true).unwrap();
    let second = engine.add_new_lesion(Geometry::point(0.2, 0.2), false, false, true).unwrap();
    assert_eq!(first, LesionId::new(1));
    assert_eq!(second, LesionId::new(2));

    engine.delete_lesion(first, true).unwrap();
    let third = engine.add_new_lesion(Geometry::point(0.3, 0.3), false, false, true).unwrap();
    assert_eq!(third, LesionId::new(3));
    assert_eq!(engine.get_all_lesion_ids(), ids(&[2, 3]));
}

fn stored_pair(id: &str) -> MemoryRegionStore {
    MemoryRegionStore::from_regions(vec![
        Region::new(Geometry::point(0.2, 0.5))
            .with_attribute(keys::ID, id)
            .with_attribute(keys::ORIGINAL, true),
        Region::new(Geometry::point(0.8, 0.5)).with_attribute(keys::ID, id),
    ])
}

#[test]
fn test_ids_above_u32_range() {
    let mut engine = LesionEngine::new(stored_pair("5000000000"), EngineConfig::default());
    assert_eq!(engine.get_all_lesion_ids(), ids(&[5_000_000_000]));

    let next = engine.add_new_lesion(Geometry::point(0.1, 0.1), false, false, true).unwrap();
    assert_eq!(next, LesionId::new(5_000_000_001));
}

#[test]
fn test_exhausted_ids_leave_store_untouched() {
    let mut engine = LesionEngine::new(stored_pair("18446744073709551615"), EngineConfig::default());
    let log = record(&mut engine);

    let result = engine.add_new_lesion(Geometry::point(0.1, 0.1), false, false, true);
    assert!(matches!(result, Err(ScintiError::InvalidLesionId(_))));
    assert_eq!(engine.store().count(), 2);
    assert!(engine.regions_for(LesionId::new(u64::MAX)).is_some());
    assert!(log.borrow().is_empty());
}

#[test]
fn test_new_lesion_zone_defaults() {
    let mut engine = engine();
    let plain = engine.add_new_lesion(Geometry::point(0.1, 0.1), false, true, true).unwrap();
    let soft = engine.add_new_lesion(Geometry::point(0.2, 0.2), true, false, true).unwrap();

    assert_eq!(engine.get_zone_for_lesion(plain), Some(ZoneAssignment::Unassigned));
    assert_eq!(
        engine.get_zone_for_lesion(soft),
        Some(ZoneAssignment::Assigned(Zone::Z10))
    );
    assert!(engine.is_score3(plain));
    assert!(!engine.is_score3(soft));
    assert!(engine.is_soft_tissue(soft));
    assert_eq!(engine.get_zone_for_lesion(LesionId::new(9)), None);

    let (_, peer) = engine.regions_for(soft).unwrap();
    assert_eq!(attr(&engine, peer, keys::ZONE), Some("10"));
    assert_eq!(attr(&engine, peer, keys::GENERAL_ZONE), Some("10"));
}

#[test]
fn test_invalid_geometry_leaves_store_untouched() {
    let mut engine = engine();
    let log = record(&mut engine);
    let degenerate = Geometry::polygon(vec![Point::new(0.1, 0.1), Point::new(0.2, 0.2)]);

    let result = engine.add_new_lesion(degenerate, false, false, true);
    assert!(matches!(result, Err(ScintiError::InvalidGeometry(_))));
    assert_eq!(engine.store().count(), 0);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_create_from_display_pixels() {
    let mut engine = engine();
    let frame = DisplayFrame::new(500.0, 100.0).unwrap();
    let id = engine
        .add_new_lesion_from_display(
            &Geometry::point(100.0, 50.0),
            &frame,
            false,
            StyleChoice::default(),
            true,
        )
        .unwrap();
    assert!(engine
        .lesion_geometry(id)
        .unwrap()
        .approx_eq(&Geometry::point(0.2, 0.5)));
}

#[test]
fn test_assign_zone_is_idempotent() {
    let mut engine = engine();
    let id = engine.add_new_lesion(Geometry::point(0.2, 0.5), false, false, true).unwrap();
    let log = record(&mut engine);

    engine.assign_zone_to_lesion(Zone::Z6L, id, true).unwrap();
    engine.assign_zone_to_lesion(Zone::Z6L, id, true).unwrap();

    assert_eq!(count(&log, EventKind::Changed), 1);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn test_soft_tissue_zone_is_permanent() {
    let mut engine = engine();
    let id = engine.add_new_lesion(Geometry::point(0.2, 0.5), true, false, true).unwrap();
    let log = record(&mut engine);

    let result = engine.assign_zone_to_lesion(Zone::Z3L, id, true);
    assert!(matches!(result, Err(ScintiError::SoftTissueImmutable(_))));
    assert_eq!(engine.remove_zone_from_lesions(&BTreeSet::from([id]), true), 0);

    assert_eq!(
        engine.get_zone_for_lesion(id),
        Some(ZoneAssignment::Assigned(Zone::Z10))
    );
    assert!(log.borrow().is_empty());
}

#[test]
fn test_zone_ten_is_not_assignable() {
    let mut engine = engine();
    let id = engine.add_new_lesion(Geometry::point(0.2, 0.5), false, false, true).unwrap();

    let result = engine.assign_zone_to_lesion(Zone::Z10, id, true);
    assert!(matches!(result, Err(ScintiError::InvalidZone(_))));
    assert_eq!(engine.get_zone_for_lesion(id), Some(ZoneAssignment::Unassigned));
}

#[test]
fn test_unknown_lesion_is_reported() {
    let mut engine = engine();
    let missing = LesionId::new(42);
    assert!(matches!(
        engine.assign_zone_to_lesion(Zone::Z1, missing, true),
        Err(ScintiError::UnknownLesion(_))
    ));
    assert!(matches!(
        engine.delete_lesion(missing, true),
        Err(ScintiError::UnknownLesion(_))
    ));
    assert!(matches!(
        engine.set_lesion_score3_type(missing, true, true),
        Err(ScintiError::UnknownLesion(_))
    ));
    assert_eq!(engine.regions_for(missing), None);
}

#[test]
fn test_orphan_is_healed_with_one_event() {
    let mut engine = engine();
    let id = engine.add_new_lesion(Geometry::point(0.2, 0.5), false, false, true).unwrap();
    let log = record(&mut engine);

    let (original, _) = engine.regions_for(id).unwrap();
    engine.store_mut().remove_at(&BTreeSet::from([original]));
    engine.on_region_list_changed();

    assert_eq!(engine.store().count(), 0);
    assert!(engine.get_all_lesion_ids().is_empty());
    assert_eq!(
        *log.borrow(),
        vec![LesionEvent::ListChanged {
            created: BTreeSet::new(),
            deleted: BTreeSet::from([id]),
        }]
    );
}

#[test]
fn test_orphan_original_is_healed() {
    let mut engine = engine();
    let id = engine.add_new_lesion(Geometry::point(0.2, 0.5), false, false, true).unwrap();
    let log = record(&mut engine);

    let (_, peer) = engine.regions_for(id).unwrap();
    engine.store_mut().remove_at(&BTreeSet::from([peer]));
    engine.on_region_list_changed();

    assert_eq!(engine.store().count(), 0);
    assert_eq!(
        *log.borrow(),
        vec![LesionEvent::ListChanged {
            created: BTreeSet::new(),
            deleted: BTreeSet::from([id]),
        }]
    );
}

#[test]
fn test_several_orphans_heal_in_one_event() {
    let mut engine = engine();
    let a = engine.add_new_lesion(Geometry::point(0.1, 0.5), false, false, true).unwrap();
    let b = engine.add_new_lesion(Geometry::point(0.2, 0.5), false, false, true).unwrap();
    let c = engine.add_new_lesion(Geometry::point(0.3, 0.5), false, false, true).unwrap();
    let log = record(&mut engine);

    let (a_original, _) = engine.regions_for(a).unwrap();
    let (_, c_peer) = engine.regions_for(c).unwrap();
    engine.store_mut().remove_at(&BTreeSet::from([a_original, c_peer]));
    engine.on_region_list_changed();

    assert_eq!(engine.store().count(), 2);
    assert_eq!(engine.get_all_lesion_ids(), BTreeSet::from([b]));
    assert!(engine.regions_for(b).is_some());
    assert_eq!(
        *log.borrow(),
        vec![LesionEvent::ListChanged {
            created: BTreeSet::new(),
            deleted: BTreeSet::from([a, c]),
        }]
    );
}

#[test]
fn test_echo_of_own_write_is_ignored() {
    let mut engine = engine();
    let log = record(&mut engine);
    engine.add_new_lesion(Geometry::point(0.2, 0.5), false, false, true).unwrap();
    assert_eq!(count(&log, EventKind::ListChanged), 1);

    engine.on_region_list_changed();
    assert_eq!(count(&log, EventKind::ListChanged), 1);
    assert_eq!(engine.store().count(), 2);
}

#[test]
fn test_host_created_lesion_is_reported() {
    let mut engine = engine();
    let log = record(&mut engine);
    engine.store_mut().append(
        Region::new(Geometry::point(0.3, 0.3))
            .with_attribute(keys::ID, "7")
            .with_attribute(keys::ORIGINAL, true),
    );
    engine
        .store_mut()
        .append(Region::new(Geometry::point(0.7, 0.3)).with_attribute(keys::ID, "7"));
    engine.on_region_list_changed();

    assert_eq!(
        *log.borrow(),
        vec![LesionEvent::ListChanged {
            created: ids(&[7]),
            deleted: BTreeSet::new(),
        }]
    );
}

#[test]
fn test_overfull_lesion_is_left_alone() {
    let mut engine = engine();
    let id = engine.add_new_lesion(Geometry::point(0.2, 0.5), false, false, true).unwrap();
    let (original, _) = engine.regions_for(id).unwrap();
    let copy = engine.store().get(original).cloned().unwrap();
    engine.store_mut().append(copy);
    engine.on_region_list_changed();

    assert_eq!(engine.store().count(), 3);
    assert_eq!(engine.regions_for(id), None);
    assert_eq!(engine.get_all_lesion_ids(), ids(&[1]));
}

#[test]
fn test_score3_dominates_zone() {
    let mut engine = engine();
    let severe = engine.add_new_lesion(Geometry::point(0.1, 0.1), false, true, true).unwrap();
    let mild = engine.add_new_lesion(Geometry::point(0.2, 0.2), false, false, true).unwrap();
    engine
        .assign_zone_to_lesions(Zone::Z4, &BTreeSet::from([severe, mild]), true);

    let scores = engine.get_zone_scores();
    assert_eq!(scores.score("4"), Some(3));
    assert_eq!(scores.score("5L"), Some(0));
    assert_eq!(scores.lesion_count(Zone::Z4), 2);

    engine.set_lesion_score3_type(severe, false, true).unwrap();
    assert_eq!(engine.get_zone_scores().score("4"), Some(1));

    engine.delete_lesions(&BTreeSet::from([severe, mild]), true);
    assert_eq!(engine.get_zone_scores().score("4"), Some(0));
}

#[test]
fn test_create_assign_delete_scenario() {
    let mut engine = engine();
    let id = engine.add_new_lesion(Geometry::point(0.2, 0.5), false, false, true).unwrap();

    let (original, peer) = engine.regions_for(id).unwrap();
    assert!(engine
        .store()
        .get(peer)
        .unwrap()
        .geometry
        .approx_eq(&Geometry::point(0.8, 0.5)));

    engine.assign_zone_label("4R", id, true).unwrap();
    assert_eq!(attr(&engine, original, keys::GENERAL_ZONE), Some("4"));
    assert_eq!(attr(&engine, peer, keys::GENERAL_ZONE), Some("4"));
    assert_eq!(attr(&engine, peer, keys::ZONE), Some("4"));

    engine.delete_lesion(id, true).unwrap();
    assert_eq!(engine.store().count(), 0);
    assert!(!engine.get_all_lesion_ids().contains(&id));
}

#[test]
fn test_zone_written_to_both_halves() {
    let mut engine = engine();
    let id = engine.add_new_lesion(Geometry::point(0.2, 0.5), false, false, true).unwrap();
    engine.assign_zone_to_lesion(Zone::Z7R, id, true).unwrap();

    let (original, peer) = engine.regions_for(id).unwrap();
    for position in [original, peer] {
        assert_eq!(attr(&engine, position, keys::ZONE), Some("7R"));
        assert_eq!(attr(&engine, position, keys::GENERAL_ZONE), Some("7"));
    }

    engine.remove_zone_from_lesions(&BTreeSet::from([id]), true);
    for position in [original, peer] {
        assert_eq!(attr(&engine, position, keys::ZONE), Some("unassigned"));
        assert_eq!(attr(&engine, position, keys::GENERAL_ZONE), Some("unassigned"));
    }
}

#[test]
fn test_bulk_assign_fires_one_event() {
    let mut engine = engine();
    let a = engine.add_new_lesion(Geometry::point(0.1, 0.1), false, false, true).unwrap();
    let b = engine.add_new_lesion(Geometry::point(0.2, 0.2), false, false, true).unwrap();
    let soft = engine.add_new_lesion(Geometry::point(0.3, 0.3), true, false, true).unwrap();
    let log = record(&mut engine);

    let changed =
        engine.assign_zone_to_lesions(Zone::Z5L, &BTreeSet::from([a, b, soft, LesionId::new(99)]), true);

    assert_eq!(changed, 2);
    assert_eq!(
        *log.borrow(),
        vec![LesionEvent::Changed {
            ids: BTreeSet::from([a, b])
        }]
    );
}

#[test]
fn test_bulk_delete_fires_one_event() {
    let mut engine = engine();
    let a = engine.add_new_lesion(Geometry::point(0.1, 0.1), false, false, true).unwrap();
    let b = engine.add_new_lesion(Geometry::point(0.2, 0.2), false, false, true).unwrap();
    let c = engine.add_new_lesion(Geometry::point(0.3, 0.3), false, false, true).unwrap();
    let log = record(&mut engine);

    let deleted = engine.delete_lesions(&BTreeSet::from([a, c, LesionId::new(50)]), true);

    assert_eq!(deleted, 2);
    assert_eq!(engine.get_all_lesion_ids(), BTreeSet::from([b]));
    assert_eq!(engine.store().count(), 2);
    assert_eq!(count(&log, EventKind::ListChanged), 1);
}

#[test]
fn test_notify_false_discards_events() {
    let mut engine = engine();
    let log = record(&mut engine);
    let id = engine.add_new_lesion(Geometry::point(0.2, 0.5), false, false, false).unwrap();
    engine.assign_zone_to_lesion(Zone::Z2, id, false).unwrap();
    assert!(log.borrow().is_empty());

    // Later operations do not replay the silent ones
    engine.set_lesion_score3_type(id, true, true).unwrap();
    assert_eq!(
        *log.borrow(),
        vec![LesionEvent::Changed {
            ids: BTreeSet::from([id])
        }]
    );
}

#[test]
fn test_mixed_selection_is_empty() {
    let mut engine = engine();
    let id = engine.add_new_lesion(Geometry::point(0.2, 0.5), false, false, true).unwrap();
    let other = engine.store_mut().append(Region::new(Geometry::point(0.5, 0.9)));
    engine.on_region_list_changed();
    let (original, peer) = engine.regions_for(id).unwrap();

    engine.store_mut().select(&BTreeSet::from([original, other]));
    assert!(engine.get_selected_lesion_ids().is_empty());

    engine.store_mut().select(&BTreeSet::from([original, peer]));
    assert_eq!(engine.get_selected_lesion_ids(), BTreeSet::from([id]));
}

#[test]
fn test_host_selection_expands_to_peer() {
    let mut engine = engine();
    let id = engine.add_new_lesion(Geometry::point(0.2, 0.5), false, false, true).unwrap();
    let log = record(&mut engine);
    let (original, peer) = engine.regions_for(id).unwrap();

    engine.store_mut().select(&BTreeSet::from([peer]));
    engine.on_region_selections_changed();

    assert_eq!(
        engine.store().selected_indices(),
        BTreeSet::from([original, peer])
    );
    assert_eq!(
        *log.borrow(),
        vec![LesionEvent::SelectionChanged {
            added: BTreeSet::from([id]),
            removed: BTreeSet::new(),
        }]
    );

    // The host echoing the expanded selection changes nothing
    engine.on_region_selections_changed();
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn test_selection_without_mirroring() {
    let config = EngineConfig::default().mirror_selection(false);
    let mut engine = LesionEngine::new(MemoryRegionStore::new(), config);
    let id = engine.add_new_lesion(Geometry::point(0.2, 0.5), false, false, true).unwrap();
    let (_, peer) = engine.regions_for(id).unwrap();

    engine.store_mut().select(&BTreeSet::from([peer]));
    engine.on_region_selections_changed();
    assert_eq!(engine.store().selected_indices(), BTreeSet::from([peer]));
    assert_eq!(engine.get_selected_lesion_ids(), BTreeSet::from([id]));
}

#[test]
fn test_select_and_delete_clears_selection() {
    let mut engine = engine();
    let a = engine.add_new_lesion(Geometry::point(0.1, 0.1), false, false, true).unwrap();
    let b = engine.add_new_lesion(Geometry::point(0.2, 0.2), false, false, true).unwrap();
    let log = record(&mut engine);

    assert_eq!(engine.select_lesions(&BTreeSet::from([a, b]), true), 2);
    assert_eq!(engine.store().selected_indices().len(), 4);

    engine.delete_lesion(a, true).unwrap();
    assert_eq!(engine.get_selected_lesion_ids(), BTreeSet::from([b]));
    assert_eq!(
        log.borrow().last(),
        Some(&LesionEvent::SelectionChanged {
            added: BTreeSet::new(),
            removed: BTreeSet::from([a]),
        })
    );
}

#[test]
fn test_edit_resyncs_peer() {
    let mut engine = engine();
    let id = engine.add_new_lesion(Geometry::point(0.2, 0.5), false, false, true).unwrap();
    let log = record(&mut engine);
    let (original, peer) = engine.regions_for(id).unwrap();

    if let Some(region) = engine.store_mut().get_mut(original) {
        region.geometry = Geometry::point(0.3, 0.4);
    }
    engine.on_region_changed(original);

    assert!(engine
        .store()
        .get(peer)
        .unwrap()
        .geometry
        .approx_eq(&Geometry::point(0.7, 0.4)));
    assert_eq!(count(&log, EventKind::Changed), 1);

    // Nothing left to sync when the host reports the peer write
    engine.on_region_changed(peer);
    assert_eq!(count(&log, EventKind::Changed), 1);
}

#[test]
fn test_edit_of_peer_moves_original() {
    let mut engine = engine();
    let id = engine.add_new_lesion(Geometry::point(0.2, 0.5), false, false, true).unwrap();
    let (original, peer) = engine.regions_for(id).unwrap();

    if let Some(region) = engine.store_mut().get_mut(peer) {
        region.geometry = Geometry::point(0.9, 0.1);
        region.set_attribute(keys::SCORE3, true);
    }
    engine.on_region_changed(peer);

    assert!(engine
        .lesion_geometry(id)
        .unwrap()
        .approx_eq(&Geometry::point(0.1, 0.1)));
    assert!(engine.store().get(original).unwrap().flag(keys::SCORE3));
    assert!(engine.is_score3(id));
}

#[test]
fn test_peer_edit_cannot_move_soft_tissue() {
    let mut engine = engine();
    let id = engine.add_new_lesion(Geometry::point(0.2, 0.5), true, false, true).unwrap();
    let log = record(&mut engine);
    let (original, peer) = engine.regions_for(id).unwrap();

    if let Some(region) = engine.store_mut().get_mut(peer) {
        region.set_attribute(keys::ZONE, "3L");
        region.set_attribute(keys::GENERAL_ZONE, "3");
    }
    engine.on_region_changed(peer);

    assert!(engine.is_soft_tissue(id));
    for position in [original, peer] {
        assert_eq!(attr(&engine, position, keys::ZONE), Some("10"));
        assert_eq!(attr(&engine, position, keys::GENERAL_ZONE), Some("10"));
    }
    assert_eq!(count(&log, EventKind::Changed), 1);
}

#[test]
fn test_peer_edit_cannot_make_soft_tissue() {
    let mut engine = engine();
    let id = engine.add_new_lesion(Geometry::point(0.2, 0.5), false, false, true).unwrap();
    let (original, peer) = engine.regions_for(id).unwrap();

    if let Some(region) = engine.store_mut().get_mut(peer) {
        region.set_attribute(keys::ZONE, "10");
        region.set_attribute(keys::GENERAL_ZONE, "10");
    }
    engine.on_region_changed(peer);

    assert!(!engine.is_soft_tissue(id));
    assert_eq!(engine.get_zone_for_lesion(id), Some(ZoneAssignment::Unassigned));
    for position in [original, peer] {
        assert_eq!(attr(&engine, position, keys::ZONE), Some("unassigned"));
        assert_eq!(attr(&engine, position, keys::GENERAL_ZONE), Some("unassigned"));
    }
}

#[test]
fn test_host_zone_edit_reaches_other_half() {
    let mut engine = engine();
    let id = engine.add_new_lesion(Geometry::point(0.2, 0.5), false, false, true).unwrap();
    let (original, peer) = engine.regions_for(id).unwrap();

    if let Some(region) = engine.store_mut().get_mut(peer) {
        region.set_attribute(keys::ZONE, "3L");
        region.set_attribute(keys::GENERAL_ZONE, "3");
    }
    engine.on_region_changed(peer);

    assert_eq!(attr(&engine, original, keys::ZONE), Some("3L"));
    assert_eq!(attr(&engine, original, keys::GENERAL_ZONE), Some("3"));
}

#[test]
fn test_ellipse_lesion_overlays() {
    let mut engine = engine();
    let axis = Geometry::segment(Point::new(0.1, 0.3), Point::new(0.3, 0.3));
    let id = engine
        .add_new_lesion_styled(axis, false, StyleChoice::new(LesionStyle::Ellipse, false), true)
        .unwrap();
    engine.assign_zone_to_lesion(Zone::Z3L, id, true).unwrap();

    assert_eq!(engine.store().count(), 4);
    assert_eq!(engine.index().overlays_for(id).len(), 2);
    assert_eq!(engine.get_zone_scores().lesion_count(Zone::Z3L), 1);

    let start = Point::new(0.2, 0.4);
    let end = Point::new(0.4, 0.5);
    engine
        .set_lesion_geometry(id, Geometry::segment(start, end), true)
        .unwrap();
    let expected = ellipse_from_axis(&start, &end, 0.6, 32).unwrap();
    let index = engine.index();
    let overlays = index.overlays_for(id);
    let store = engine.store();
    assert!(store.get(overlays[0]).unwrap().geometry.approx_eq(&expected));
    assert!(store
        .get(overlays[1])
        .unwrap()
        .geometry
        .approx_eq(&expected.mirrored()));

    engine.delete_lesion(id, true).unwrap();
    assert_eq!(engine.store().count(), 0);
}

#[test]
fn test_circle_needs_line_axis() {
    let mut engine = engine();
    let result = engine.add_new_lesion_styled(
        Geometry::point(0.2, 0.2),
        false,
        StyleChoice::new(LesionStyle::Circle, false),
        true,
    );
    assert!(matches!(result, Err(ScintiError::InvalidGeometry(_))));
    assert_eq!(engine.store().count(), 0);
}

#[test]
fn test_stray_overlays_are_removed() {
    let mut engine = engine();
    let axis = Geometry::segment(Point::new(0.1, 0.3), Point::new(0.3, 0.3));
    let id = engine
        .add_new_lesion_styled(axis, false, StyleChoice::new(LesionStyle::Circle, true), true)
        .unwrap();
    let log = record(&mut engine);

    let (original, peer) = engine.regions_for(id).unwrap();
    engine
        .store_mut()
        .remove_at(&BTreeSet::from([original, peer]));
    engine.on_region_list_changed();

    assert_eq!(engine.store().count(), 0);
    assert_eq!(count(&log, EventKind::ListChanged), 1);
}

#[test]
fn test_placement_fires_placed_once() {
    let mut engine = engine();
    let log = record(&mut engine);

    let id = engine
        .begin_placement(Geometry::point(0.1, 0.1), false, StyleChoice::default())
        .unwrap();
    engine.update_placement(Geometry::point(0.12, 0.15)).unwrap();
    engine.update_placement(Geometry::point(0.15, 0.2)).unwrap();
    assert_eq!(engine.placement(), Some(id));
    assert_eq!(engine.finish_placement().unwrap(), id);

    assert_eq!(count(&log, EventKind::ListChanged), 1);
    assert_eq!(count(&log, EventKind::Changed), 0);
    assert_eq!(
        log.borrow().last(),
        Some(&LesionEvent::Placed { id })
    );
    assert!(engine
        .lesion_geometry(id)
        .unwrap()
        .approx_eq(&Geometry::point(0.15, 0.2)));
    assert!(matches!(
        engine.update_placement(Geometry::point(0.2, 0.2)),
        Err(ScintiError::NoActivePlacement)
    ));
}

#[test]
fn test_cancelled_placement_removes_lesion() {
    let mut engine = engine();
    let log = record(&mut engine);
    let id = engine
        .begin_placement(Geometry::point(0.1, 0.1), false, StyleChoice::default())
        .unwrap();
    engine.cancel_placement().unwrap();

    assert_eq!(engine.store().count(), 0);
    assert_eq!(engine.placement(), None);
    assert_eq!(count(&log, EventKind::Placed), 0);
    assert_eq!(
        log.borrow().last(),
        Some(&LesionEvent::ListChanged {
            created: BTreeSet::new(),
            deleted: BTreeSet::from([id]),
        })
    );
}

#[test]
fn test_hidden_flag_on_both_halves() {
    let mut engine = engine();
    let id = engine.add_new_lesion(Geometry::point(0.2, 0.5), false, false, true).unwrap();
    let log = record(&mut engine);

    assert_eq!(engine.set_lesions_hidden(&BTreeSet::from([id]), true, true), 1);
    assert_eq!(engine.set_lesions_hidden(&BTreeSet::from([id]), true, true), 0);
    assert!(engine.is_hidden(id));
    let (_, peer) = engine.regions_for(id).unwrap();
    assert!(engine.store().get(peer).unwrap().flag(keys::HIDDEN));
    assert_eq!(count(&log, EventKind::Changed), 1);
}

#[test]
fn test_failing_listener_does_not_block_others() {
    let mut engine = engine();
    engine.add_list_changed_listener(|_| Err("listener failed".into()));
    let log = record(&mut engine);

    engine.add_new_lesion(Geometry::point(0.2, 0.5), false, false, true).unwrap();
    assert_eq!(count(&log, EventKind::ListChanged), 1);
    assert_eq!(engine.store().count(), 2);
}

#[test]
fn test_removed_listener_is_not_called() {
    let mut engine = engine();
    let log = EventLog::default();
    let handle = engine.add_list_changed_listener(recorder(&log));

    assert!(!engine.remove_changed_listener(handle));
    assert!(engine.remove_list_changed_listener(handle));
    engine.add_new_lesion(Geometry::point(0.2, 0.5), false, false, true).unwrap();
    assert!(log.borrow().is_empty());
}

#[test]
fn test_builder_requires_store() {
    let result = LesionEngine::<MemoryRegionStore>::builder().build();
    assert!(matches!(result, Err(ScintiError::MissingDependency(_))));
}

#[test]
fn test_open_existing_case_and_close() {
    let regions = vec![
        Region::new(Geometry::point(0.2, 0.2))
            .with_attribute(keys::ID, "3")
            .with_attribute(keys::ORIGINAL, true)
            .with_attribute(keys::ZONE, "8L"),
        Region::new(Geometry::point(0.8, 0.2))
            .with_attribute(keys::ID, "3")
            .with_attribute(keys::ZONE, "8L"),
    ];
    let mut engine = LesionEngine::builder()
        .store(MemoryRegionStore::from_regions(regions))
        .config(EngineConfig::default())
        .build()
        .unwrap();
    let log = record(&mut engine);

    engine.on_region_list_changed();
    assert!(log.borrow().is_empty());
    assert_eq!(engine.get_zone_scores().score("8"), Some(1));

    let id = engine.add_new_lesion(Geometry::point(0.4, 0.4), false, false, true).unwrap();
    assert_eq!(id, LesionId::new(4));
    assert_eq!(engine.close().count(), 4);
}
