use serde::Deserialize;
use serde_json::Value;

use super::Snapshot;
use crate::component::ComponentDraft;
use crate::document::{CONFIG_VERSION, ConfigDocument, CubesatDimensions};
use crate::error::{ConfigError, ConfigResult};
use crate::registry::{ComponentRegistry, ImportReport};

/// Number of snapshots kept before the oldest is dropped
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Snapshot-based undo/redo over a [`ComponentRegistry`].
///
/// The store never holds on to the registry; callers pass it in for every
/// operation that reads or restores it.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    history: Vec<Snapshot>,
    /// Index of the snapshot matching the registry, `None` while empty
    cursor: Option<usize>,
    capacity: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore {
    /// Creates a new empty history
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            history: Vec::new(),
            cursor: None,
            capacity: capacity.max(1),
        }
    }

    /// Records the registry's current content.
    ///
    /// Anything after the cursor (the redo branch) is dropped first. Once the
    /// history is full the oldest snapshot is evicted and the cursor stays put.
    pub fn save_state(&mut self, registry: &ComponentRegistry) {
        let snapshot = Snapshot::capture(registry);

        match self.cursor {
            Some(cursor) => self.history.truncate(cursor + 1),
            None => self.history.clear(),
        }
        self.history.push(snapshot);

        if self.history.len() > self.capacity {
            self.history.remove(0);
        } else {
            self.cursor = Some(self.history.len() - 1);
        }
        log::debug!("Saved state {}/{}", self.history.len(), self.capacity);
    }

    /// Steps back one snapshot. Returns false when there is nothing to undo.
    pub fn undo(&mut self, registry: &mut ComponentRegistry) -> bool {
        match self.cursor {
            Some(cursor) if cursor > 0 => {
                self.cursor = Some(cursor - 1);
                Self::restore(registry, &self.history[cursor - 1]);
                log::debug!("Undo to state {}", cursor - 1);
                true
            }
            _ => false,
        }
    }

    /// Steps forward one snapshot. Returns false when there is nothing to redo.
    pub fn redo(&mut self, registry: &mut ComponentRegistry) -> bool {
        match self.cursor {
            Some(cursor) if cursor + 1 < self.history.len() => {
                self.cursor = Some(cursor + 1);
                Self::restore(registry, &self.history[cursor + 1]);
                log::debug!("Redo to state {}", cursor + 1);
                true
            }
            _ => false,
        }
    }

    /// Replays a snapshot into the registry: components first, then section
    /// visibility.
    pub fn restore(registry: &mut ComponentRegistry, snapshot: &Snapshot) -> ImportReport {
        let report = registry.import_snapshot_data(
            snapshot.components().iter().cloned().map(ComponentDraft::from),
        );
        for (section, visible) in snapshot.sections() {
            if let Err(err) = registry.set_section_visibility(section, *visible) {
                log::warn!("Ignoring visibility of {}: {}", section, err);
            }
        }
        report
    }

    /// Returns true if there are states that can be undone
    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor > 0)
    }

    /// Returns true if there are states that can be redone
    pub fn can_redo(&self) -> bool {
        match self.cursor {
            Some(cursor) => cursor + 1 < self.history.len(),
            None => false,
        }
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.cursor.map(|cursor| &self.history[cursor])
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget every snapshot
    pub fn clear(&mut self) {
        self.history.clear();
        self.cursor = None;
    }

    /// Builds the exchange document for the registry's current content.
    pub fn export_config(&self, registry: &ComponentRegistry, cubesat: &CubesatDimensions) -> ConfigDocument {
        ConfigDocument::from_registry(registry, cubesat)
    }

    /// Loads an exchange document into the registry and records the result as
    /// a new history entry.
    ///
    /// The payload must be an object with a `components` array, otherwise
    /// nothing is touched. A different `version` only logs a warning. Records
    /// that cannot be read or added are skipped and listed in the report.
    pub fn import_config(&mut self, registry: &mut ComponentRegistry, payload: &Value) -> ConfigResult<ImportReport> {
        let object = payload
            .as_object()
            .ok_or_else(|| ConfigError::InvalidFormat("expected a JSON object".to_owned()))?;
        let records = object
            .get("components")
            .and_then(Value::as_array)
            .ok_or_else(|| ConfigError::InvalidFormat("missing components array".to_owned()))?;

        if let Some(version) = object.get("version").and_then(Value::as_str) {
            if version != CONFIG_VERSION {
                log::warn!(
                    "Configuration version {} differs from {}, attempting to import anyway",
                    version,
                    CONFIG_VERSION
                );
            }
        }

        let mut report = ImportReport::default();
        let mut indices = Vec::with_capacity(records.len());
        let mut drafts = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            match ComponentDraft::deserialize(record) {
                Ok(draft) => {
                    indices.push(index);
                    drafts.push(draft);
                }
                Err(err) => {
                    let id = record.get("id").and_then(Value::as_str).map(str::to_owned);
                    report.skip(index, id, format!("malformed record: {}", err));
                }
            }
        }

        let added = registry.import_snapshot_data(drafts);
        report.imported = added.imported;
        report.skipped.extend(added.skipped.into_iter().map(|mut skipped| {
            skipped.index = indices[skipped.index];
            skipped
        }));
        report.skipped.sort_by_key(|skipped| skipped.index);

        if let Some(sections) = object.get("sections").and_then(Value::as_object) {
            for (section, visible) in sections {
                let Some(visible) = visible.as_bool() else {
                    log::warn!("Ignoring non-boolean visibility for {}", section);
                    continue;
                };
                if let Err(err) = registry.set_section_visibility(section, visible) {
                    log::warn!("Ignoring visibility of {}: {}", section, err);
                }
            }
        }

        log::info!(
            "Imported {} components ({} skipped)",
            report.imported,
            report.skipped.len()
        );
        self.save_state(registry);
        Ok(report)
    }
}
