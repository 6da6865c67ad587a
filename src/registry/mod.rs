//! The component registry: every component of the layout, keyed by id, plus
//! the sections they are partitioned into.
//!
//! The registry owns plain data only. Each mutation is announced on the
//! registry's [`EventBus`] so the visual proxies (see [`crate::scene`]) can
//! follow without the registry knowing how anything is drawn.

mod section;

use std::collections::{BTreeMap, HashMap};
use std::collections::hash_map::Entry;

use crate::component::{Component, ComponentDraft, ComponentUpdate, DEFAULT_CATEGORY, Material, Vec3};
use crate::error::{RegistryError, RegistryResult};
use crate::event::{EventBus, EventHandler, SceneEvent};
use crate::id_generator::generate_component_id;

pub use section::Section;
use section::find_section;

/// The sections of a 3U CubeSat, front to back
pub const DEFAULT_SECTIONS: [&str; 3] = ["U1", "U2", "U3"];

/// A record that bulk import left out, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub index: usize,
    pub id: Option<String>,
    pub reason: String,
}

/// Outcome of a bulk import. Bulk imports never fail as a whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    pub(crate) fn skip(&mut self, index: usize, id: Option<String>, reason: String) {
        log::warn!(
            "Skipping component record #{} ({}): {}",
            index,
            id.as_deref().unwrap_or("no id"),
            reason
        );
        self.skipped.push(SkippedRecord { index, id, reason });
    }
}

#[derive(Debug)]
pub struct ComponentRegistry {
    components: HashMap<String, Component>,
    /// Insertion order of `components`
    order: Vec<String>,
    sections: Vec<Section>,
    material_defaults: Material,
    event_bus: EventBus,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SECTIONS)
    }
}

impl ComponentRegistry {
    /// Creates an empty registry whose set of sections is fixed from here on.
    pub fn new<I, S>(sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            components: HashMap::new(),
            order: Vec::new(),
            sections: sections.into_iter().map(Section::new).collect(),
            material_defaults: Material::default(),
            event_bus: EventBus::new(),
        }
    }

    /// Material given to components added without one.
    pub fn with_material_defaults(mut self, material: Material) -> Self {
        self.material_defaults = material;
        self
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Brings a late subscriber up to date, then subscribes it.
    pub fn attach(&self, handler: Box<dyn EventHandler>) {
        self.event_bus.attach(handler, self.replay_events());
    }

    /// Events that rebuild the current state from nothing, in insertion order
    fn replay_events(&self) -> impl Iterator<Item = SceneEvent> + '_ {
        let added = self.all().map(|component| SceneEvent::ComponentAdded(component.clone()));
        let visibility = self.sections.iter().map(|section| SceneEvent::SectionVisibilityChanged {
            section: section.name().to_owned(),
            visible: section.is_visible(),
        });
        added.chain(visibility)
    }

    /// Adds a component and returns the stored record.
    ///
    /// A missing id is generated. Fails without touching the registry when the
    /// section is unknown, the size is not strictly positive, or the id is taken.
    pub fn add(&mut self, draft: ComponentDraft) -> RegistryResult<&Component> {
        let section_index = find_section(&self.sections, &draft.section)
            .ok_or_else(|| RegistryError::InvalidSection(draft.section.clone()))?;
        validate_size(draft.size)?;

        let id = match draft.id {
            Some(id) if !id.is_empty() => id,
            _ => generate_component_id(),
        };

        match self.components.entry(id.clone()) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateId(id)),
            Entry::Vacant(slot) => {
                let component = Component {
                    id: id.clone(),
                    name: draft.name,
                    size: draft.size,
                    position: draft.position,
                    color: draft.color & 0x00ff_ffff,
                    section: draft.section,
                    category: draft.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_owned()),
                    description: draft.description,
                    specs: draft.specs,
                    material: draft.material.unwrap_or(self.material_defaults),
                };
                log::debug!("Adding component {} to {}", id, component.section);

                self.sections[section_index].insert(id.clone());
                self.order.push(id);
                self.event_bus.emit(SceneEvent::ComponentAdded(component.clone()));
                Ok(slot.insert(component))
            }
        }
    }

    /// Applies the fields present in `update` and returns the updated record.
    ///
    /// Everything is validated before the first field is written, so a failed
    /// edit leaves the component exactly as it was. A section change moves the
    /// membership in one step.
    pub fn edit(&mut self, id: &str, update: ComponentUpdate) -> RegistryResult<&Component> {
        let current_section = match self.components.get(id) {
            Some(component) => component.section.clone(),
            None => return Err(RegistryError::NotFound(id.to_owned())),
        };
        let section_move = match update.section.as_deref() {
            Some(target) if target != current_section => {
                let to = find_section(&self.sections, target)
                    .ok_or_else(|| RegistryError::InvalidSection(target.to_owned()))?;
                let from = find_section(&self.sections, &current_section)
                    .ok_or_else(|| RegistryError::InvalidSection(current_section.clone()))?;
                Some((from, to))
            }
            _ => None,
        };
        if let Some(size) = update.size {
            validate_size(size)?;
        }

        let touches_visuals = update.touches_visuals();
        let Some(component) = self.components.get_mut(id) else {
            return Err(RegistryError::NotFound(id.to_owned()));
        };

        if let Some(position) = update.position {
            component.position = position;
        }
        if let Some(size) = update.size {
            component.size = size;
        }
        if let Some(color) = update.color {
            component.color = color & 0x00ff_ffff;
        }
        if let Some(metalness) = update.metalness {
            component.material.metalness = metalness.clamp(0.0, 1.0);
        }
        if let Some(roughness) = update.roughness {
            component.material.roughness = roughness.clamp(0.0, 1.0);
        }
        if let Some(opacity) = update.opacity {
            component.material.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(name) = update.name {
            component.name = name;
        }
        if let Some(category) = update.category {
            component.category = category;
        }
        if let Some(description) = update.description {
            component.description = description;
        }
        if let Some(specs) = update.specs {
            component.specs.extend(specs);
        }
        for key in &update.removed_specs {
            component.specs.remove(key);
        }

        if let Some((from, to)) = section_move {
            let new_section = self.sections[to].name().to_owned();
            self.sections[from].remove(id);
            self.sections[to].insert(id.to_owned());
            let old_section = std::mem::replace(&mut component.section, new_section.clone());
            self.event_bus.emit(SceneEvent::ComponentMoved {
                id: id.to_owned(),
                old_section,
                new_section,
            });
        }
        if touches_visuals {
            self.event_bus.emit(SceneEvent::changed(component));
        }

        Ok(component)
    }

    /// Removes a component and returns its last record.
    pub fn remove(&mut self, id: &str) -> RegistryResult<Component> {
        let component = self
            .components
            .remove(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_owned()))?;

        if let Some(index) = find_section(&self.sections, &component.section) {
            self.sections[index].remove(id);
        }
        self.order.retain(|existing| existing != id);
        log::debug!("Removed component {}", id);
        self.event_bus.emit(SceneEvent::ComponentRemoved { id: id.to_owned() });
        Ok(component)
    }

    pub fn get(&self, id: &str) -> Option<&Component> {
        self.components.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.components.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// All components in insertion order
    pub fn all(&self) -> impl Iterator<Item = &Component> + '_ {
        self.order.iter().filter_map(move |id| self.components.get(id))
    }

    pub fn by_section<'a>(&'a self, section: &'a str) -> impl Iterator<Item = &'a Component> + 'a {
        self.all().filter(move |component| component.section == section)
    }

    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Component> + 'a {
        self.all().filter(move |component| component.category == category)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.sections.iter().map(Section::name)
    }

    pub fn has_section(&self, section: &str) -> bool {
        find_section(&self.sections, section).is_some()
    }

    pub fn section_count(&self, section: &str) -> usize {
        find_section(&self.sections, section)
            .map(|index| self.sections[index].members().len())
            .unwrap_or(0)
    }

    /// `None` for an unknown section
    pub fn is_section_visible(&self, section: &str) -> Option<bool> {
        find_section(&self.sections, section).map(|index| self.sections[index].is_visible())
    }

    pub fn section_visibility(&self) -> BTreeMap<String, bool> {
        self.sections
            .iter()
            .map(|section| (section.name().to_owned(), section.is_visible()))
            .collect()
    }

    pub fn set_section_visibility(&mut self, section: &str, visible: bool) -> RegistryResult<()> {
        let index = find_section(&self.sections, section)
            .ok_or_else(|| RegistryError::InvalidSection(section.to_owned()))?;
        if self.sections[index].is_visible() != visible {
            self.sections[index].set_visible(visible);
            self.event_bus.emit(SceneEvent::SectionVisibilityChanged {
                section: section.to_owned(),
                visible,
            });
        }
        Ok(())
    }

    /// Flips a section's visibility and returns the new flag.
    pub fn toggle_section(&mut self, section: &str) -> RegistryResult<bool> {
        let visible = !self
            .is_section_visible(section)
            .ok_or_else(|| RegistryError::InvalidSection(section.to_owned()))?;
        self.set_section_visibility(section, visible)?;
        Ok(visible)
    }

    /// Asks the proxies to glow a component. Highlight is presentation state
    /// and is not part of the record.
    pub fn highlight(&self, id: &str, intensity: f32) -> RegistryResult<()> {
        if !self.contains(id) {
            return Err(RegistryError::NotFound(id.to_owned()));
        }
        self.event_bus.emit(SceneEvent::HighlightChanged {
            id: id.to_owned(),
            intensity,
        });
        Ok(())
    }

    pub fn reset_highlights(&self) {
        for id in &self.order {
            self.event_bus.emit(SceneEvent::HighlightChanged {
                id: id.clone(),
                intensity: 0.0,
            });
        }
    }

    /// Deep copies of every record, in insertion order.
    pub fn export_snapshot_data(&self) -> Vec<Component> {
        self.all().cloned().collect()
    }

    /// Replaces the whole content with `records`, in order.
    ///
    /// Records that cannot be added are skipped and reported instead of
    /// aborting the import.
    pub fn import_snapshot_data<I>(&mut self, records: I) -> ImportReport
    where
        I: IntoIterator<Item = ComponentDraft>,
    {
        self.clear();

        let mut report = ImportReport::default();
        for (index, record) in records.into_iter().enumerate() {
            let id = record.id.clone();
            match self.add(record) {
                Ok(_) => report.imported += 1,
                Err(err) => report.skip(index, id, err.to_string()),
            }
        }
        report
    }

    /// Removes every component. Sections and their visibility stay.
    pub fn clear(&mut self) {
        if self.components.is_empty() {
            return;
        }
        self.components.clear();
        self.order.clear();
        for section in &mut self.sections {
            section.clear();
        }
        self.event_bus.emit(SceneEvent::Cleared);
    }
}

fn validate_size(size: Vec3) -> RegistryResult<()> {
    if size.is_finite() && size.cmpgt(Vec3::ZERO).all() {
        Ok(())
    } else {
        Err(RegistryError::InvalidSize(size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> ComponentDraft {
        ComponentDraft::new("Cam", "U2", [4.0, 3.0, 3.0], [0.0, 0.0, 0.0], 0x61b3e0).with_id("x")
    }

    #[test]
    fn add_assigns_missing_ids() {
        let mut registry = ComponentRegistry::default();
        let draft = ComponentDraft::new("Heater", "U3", [1.0, 1.0, 1.0], [0.0, 0.0, -12.0], 0x7fb86f);
        let id = registry.add(draft).unwrap().id.clone();
        assert!(id.starts_with(crate::id_generator::COMPONENT_ID_PREFIX));
        assert_eq!(registry.section_count("U3"), 1);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut registry = ComponentRegistry::default();
        registry.add(camera()).unwrap();
        let err = registry.add(camera()).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateId("x".into()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.section_count("U2"), 1);
    }

    #[test]
    fn non_positive_sizes_are_rejected() {
        let mut registry = ComponentRegistry::default();
        let mut draft = camera();
        draft.size = Vec3::new(4.0, 0.0, 3.0);
        assert!(matches!(registry.add(draft), Err(RegistryError::InvalidSize(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn edit_with_bad_section_changes_nothing() {
        let mut registry = ComponentRegistry::default();
        registry.add(camera()).unwrap();
        let before = registry.get("x").cloned();

        let update = ComponentUpdate {
            name: Some("Renamed".into()),
            section: Some("U9".into()),
            ..Default::default()
        };
        assert_eq!(
            registry.edit("x", update).unwrap_err(),
            RegistryError::InvalidSection("U9".into())
        );
        assert_eq!(registry.get("x").cloned(), before);
        assert_eq!(registry.section_count("U2"), 1);
    }

    #[test]
    fn edit_moves_section_membership() {
        let mut registry = ComponentRegistry::default();
        registry.add(camera()).unwrap();
        let update = ComponentUpdate {
            section: Some("U1".into()),
            ..Default::default()
        };
        registry.edit("x", update).unwrap();
        assert_eq!(registry.section_count("U2"), 0);
        assert_eq!(registry.section_count("U1"), 1);
        assert!(registry.sections()[0].contains("x"));
        assert_eq!(registry.by_section("U1").count(), 1);
    }

    #[test]
    fn toggle_unknown_section_reports_invalid() {
        let mut registry = ComponentRegistry::default();
        assert!(registry.toggle_section("U4").is_err());
        assert_eq!(registry.toggle_section("U1"), Ok(false));
        assert_eq!(registry.is_section_visible("U1"), Some(false));
        assert_eq!(registry.toggle_section("U1"), Ok(true));
    }

    #[test]
    fn import_skips_bad_records() {
        let mut registry = ComponentRegistry::default();
        registry.add(camera()).unwrap();

        let records = vec![
            ComponentDraft::new("A", "U1", [1.0, 1.0, 1.0], [0.0; 3], 0).with_id("a"),
            ComponentDraft::new("B", "nowhere", [1.0, 1.0, 1.0], [0.0; 3], 0).with_id("b"),
            ComponentDraft::new("C", "U3", [1.0, 1.0, 1.0], [0.0; 3], 0).with_id("c"),
        ];
        let report = registry.import_snapshot_data(records);

        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 1);
        assert_eq!(report.skipped[0].id.as_deref(), Some("b"));
        assert!(!registry.contains("x"));
        let ids: Vec<_> = registry.all().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn highlight_requires_known_component() {
        let mut registry = ComponentRegistry::default();
        assert!(registry.highlight("x", 0.5).is_err());
        registry.add(camera()).unwrap();
        assert!(registry.highlight("x", 0.5).is_ok());
    }

    #[test]
    fn removed_specs_are_dropped_after_the_merge() {
        let mut registry = ComponentRegistry::default();
        registry
            .add(camera().with_spec("resolution", "2MP").with_spec("lens", "M12"))
            .unwrap();
        let update = ComponentUpdate {
            specs: Some([("fps".to_owned(), "30".to_owned())].into()),
            removed_specs: vec!["lens".into()],
            ..Default::default()
        };
        let specs = &registry.edit("x", update).unwrap().specs;
        assert_eq!(specs.keys().collect::<Vec<_>>(), ["fps", "resolution"]);
    }

    #[test]
    fn stock_material_survives_overridden_defaults() {
        let shiny = Material {
            metalness: 0.9,
            roughness: 0.1,
            opacity: 1.0,
        };
        let mut source = ComponentRegistry::default().with_material_defaults(shiny);
        let mut draft = camera();
        draft.material = Some(Material::default());
        source.add(draft).unwrap();

        let json = serde_json::to_string(&source.export_snapshot_data()).unwrap();
        let records: Vec<ComponentDraft> = serde_json::from_str(&json).unwrap();
        let mut target = ComponentRegistry::default().with_material_defaults(shiny);
        target.import_snapshot_data(records);
        assert_eq!(target.get("x").map(|c| c.material), Some(Material::default()));
    }
}
