use cubesat_editor::component::{ComponentDraft, ComponentUpdate, Vec3};
use cubesat_editor::registry::ComponentRegistry;
use cubesat_editor::RegistryError;

// A small registry with one component per section
fn create_test_registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::default();
    registry
        .add(ComponentDraft::new("Furnace", "U1", [9.0, 6.0, 10.5], [0.0, 0.0, 11.33], 0xe06161).with_id("furnace"))
        .unwrap();
    registry
        .add(ComponentDraft::new("Camera", "U2", [4.0, 3.5, 3.0], [-2.4, 0.0, 4.0], 0x61b3e0).with_id("camera"))
        .unwrap();
    registry
        .add(ComponentDraft::new("DAQ", "U3", [8.6, 3.6, 8.6], [0.0, 0.0, -10.3], 0x9be26b).with_id("daq"))
        .unwrap();
    registry
}

#[test]
fn test_added_component_is_listed_once() {
    let mut registry = create_test_registry();
    let id = registry
        .add(ComponentDraft::new("Magnetometer", "U2", [1.0, 1.0, 1.0], [0.0; 3], 0xffffff))
        .unwrap()
        .id
        .clone();

    assert!(id.starts_with("comp_"));
    assert_eq!(registry.all().filter(|c| c.id == id).count(), 1);
    assert_eq!(registry.by_section("U2").filter(|c| c.id == id).count(), 1);
    assert_eq!(registry.by_section("U1").filter(|c| c.id == id).count(), 0);
    assert_eq!(registry.get(&id).unwrap().category, "generic");
}

#[test]
fn test_removed_component_is_gone() {
    let mut registry = create_test_registry();
    let removed = registry.remove("camera").unwrap();
    assert_eq!(removed.name, "Camera");

    assert!(registry.get("camera").is_none());
    assert_eq!(registry.section_count("U2"), 0);
    assert_eq!(registry.remove("camera"), Err(RegistryError::NotFound("camera".into())));
}

#[test]
fn test_partial_edit_changes_only_given_fields() {
    let mut registry = create_test_registry();
    let before = registry.get("daq").unwrap().clone();

    let update = ComponentUpdate {
        position: Some(Vec3::new(1.0, 2.0, -9.0)),
        ..Default::default()
    };
    registry.edit("daq", update).unwrap();

    let after = registry.get("daq").unwrap();
    assert_eq!(after.position, Vec3::new(1.0, 2.0, -9.0));
    assert_eq!(after.size, before.size);
    assert_eq!(after.color, before.color);
    assert_eq!(after.name, before.name);
    assert_eq!(after.section, before.section);
}

#[test]
fn test_edit_with_invalid_size_changes_nothing() {
    let mut registry = create_test_registry();
    let before = registry.get("daq").cloned();

    let update = ComponentUpdate {
        name: Some("Shrunk".into()),
        position: Some(Vec3::new(1.0, 1.0, 1.0)),
        size: Some(Vec3::new(8.6, -1.0, 8.6)),
        ..Default::default()
    };
    let result = registry.edit("daq", update);

    assert!(matches!(result, Err(RegistryError::InvalidSize(_))));
    assert_eq!(registry.get("daq").cloned(), before);

    let update = ComponentUpdate {
        size: Some(Vec3::new(f32::NAN, 1.0, 1.0)),
        ..Default::default()
    };
    assert!(registry.edit("daq", update).is_err());
    assert_eq!(registry.get("daq").cloned(), before);
}

#[test]
fn test_edit_moves_section_membership() {
    let mut registry = create_test_registry();
    let update = ComponentUpdate {
        section: Some("U3".into()),
        ..Default::default()
    };
    registry.edit("camera", update).unwrap();

    assert_eq!(registry.section_count("U2"), 0);
    assert_eq!(registry.section_count("U3"), 2);
    assert_eq!(registry.get("camera").unwrap().section, "U3");
}

#[test]
fn test_edit_of_missing_id_mutates_nothing() {
    let mut registry = create_test_registry();
    let before = registry.export_snapshot_data();

    let update = ComponentUpdate {
        name: Some("ghost".into()),
        ..Default::default()
    };
    assert_eq!(
        registry.edit("missing-id", update).unwrap_err(),
        RegistryError::NotFound("missing-id".into())
    );
    assert_eq!(registry.export_snapshot_data(), before);
}

#[test]
fn test_edit_into_unknown_section_is_rejected_whole() {
    let mut registry = create_test_registry();
    let update = ComponentUpdate {
        name: Some("Renamed".into()),
        section: Some("U9".into()),
        ..Default::default()
    };
    assert!(matches!(
        registry.edit("camera", update),
        Err(RegistryError::InvalidSection(_))
    ));
    assert_eq!(registry.get("camera").unwrap().name, "Camera");
}

#[test]
fn test_add_into_unknown_section_fails() {
    let mut registry = create_test_registry();
    let result = registry.add(ComponentDraft::new("Magnetometer", "U7", [1.0, 1.0, 1.0], [0.0; 3], 0));
    assert!(matches!(result, Err(RegistryError::InvalidSection(_))));
    assert_eq!(registry.len(), 3);
}

#[test]
fn test_scenario_add_then_remove() {
    let mut registry = ComponentRegistry::default();
    registry
        .add(ComponentDraft::new("Cam", "U2", [4.0, 3.0, 3.0], [0.0; 3], 0x61b3e0).with_id("x"))
        .unwrap();
    assert_eq!(registry.by_section("U2").count(), 1);

    registry.remove("x").unwrap();
    assert_eq!(registry.by_section("U2").count(), 0);
    assert!(registry.is_empty());
}

#[test]
fn test_section_visibility_toggles() {
    let mut registry = create_test_registry();
    assert_eq!(registry.is_section_visible("U1"), Some(true));
    assert!(!registry.toggle_section("U1").unwrap());
    assert_eq!(registry.is_section_visible("U1"), Some(false));
    assert!(registry.toggle_section("U1").unwrap());
    assert!(registry.toggle_section("nope").is_err());
}

#[test]
fn test_snapshot_import_skips_bad_records() {
    let mut registry = create_test_registry();
    let report = registry.import_snapshot_data(vec![
        ComponentDraft::new("A", "U1", [1.0, 1.0, 1.0], [0.0; 3], 0).with_id("a"),
        ComponentDraft::new("B", "U9", [1.0, 1.0, 1.0], [0.0; 3], 0).with_id("b"),
        ComponentDraft::new("C", "U2", [1.0, 1.0, 1.0], [0.0; 3], 0).with_id("a"),
    ]);

    assert_eq!(report.imported, 1);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.skipped[0].index, 1);
    assert_eq!(registry.len(), 1);
    assert!(registry.get("camera").is_none());
}
