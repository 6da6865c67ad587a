use cubesat_editor::component::{ComponentDraft, ComponentUpdate, Vec3};
use cubesat_editor::history::{DEFAULT_HISTORY_CAPACITY, HistoryStore};
use cubesat_editor::registry::ComponentRegistry;

fn draft(id: &str) -> ComponentDraft {
    ComponentDraft::new(id.to_uppercase(), "U1", [1.0, 2.0, 3.0], [0.0; 3], 0x336699).with_id(id)
}

#[test]
fn test_undo_redo_restore_equal_state() {
    let mut registry = ComponentRegistry::default();
    let mut history = HistoryStore::new();

    registry.add(draft("a")).unwrap();
    history.save_state(&registry);
    let first = registry.export_snapshot_data();

    let update = ComponentUpdate {
        color: Some(0xff0000),
        size: Some(Vec3::splat(4.0)),
        ..Default::default()
    };
    registry.edit("a", update).unwrap();
    registry.add(draft("b")).unwrap();
    history.save_state(&registry);
    let second = registry.export_snapshot_data();

    assert!(history.undo(&mut registry));
    assert_eq!(registry.export_snapshot_data(), first);

    assert!(history.redo(&mut registry));
    assert_eq!(registry.export_snapshot_data(), second);
    assert!(!history.redo(&mut registry));
}

#[test]
fn test_undo_restores_section_visibility() {
    let mut registry = ComponentRegistry::default();
    let mut history = HistoryStore::new();
    history.save_state(&registry);

    registry.toggle_section("U2").unwrap();
    history.save_state(&registry);

    assert!(history.undo(&mut registry));
    assert_eq!(registry.is_section_visible("U2"), Some(true));
}

#[test]
fn test_history_is_capped_at_fifty() {
    let mut registry = ComponentRegistry::default();
    let mut history = HistoryStore::new();
    assert_eq!(history.capacity(), DEFAULT_HISTORY_CAPACITY);

    registry.add(draft("first")).unwrap();
    history.save_state(&registry);
    registry.clear();
    for i in 0..50 {
        registry.add(draft(&format!("c{i}"))).unwrap();
        history.save_state(&registry);
    }

    assert_eq!(history.len(), 50);
    assert_eq!(history.cursor(), Some(49));

    let mut undos = 0;
    while history.undo(&mut registry) {
        undos += 1;
    }
    assert_eq!(undos, 49);
    assert!(registry.get("first").is_none());
    assert!(registry.get("c0").is_some());
}

#[test]
fn test_save_after_undo_discards_redo() {
    let mut registry = ComponentRegistry::default();
    let mut history = HistoryStore::new();
    history.save_state(&registry);
    registry.add(draft("a")).unwrap();
    history.save_state(&registry);

    history.undo(&mut registry);
    registry.add(draft("b")).unwrap();
    history.save_state(&registry);

    assert!(!history.can_redo());
    assert_eq!(history.len(), 2);
    assert!(registry.get("a").is_none());
}
