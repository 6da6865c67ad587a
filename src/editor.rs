use std::path::Path;

use crate::component::{Component, ComponentDraft, ComponentUpdate};
use crate::document::ConfigDocument;
use crate::error::{ConfigError, ConfigResult, RegistryResult};
use crate::event::EventHandler;
use crate::history::HistoryStore;
use crate::registry::{ComponentRegistry, ImportReport};
use crate::settings::Settings;
use crate::state::ConfigStore;

/// Key used by "save"/"load" when the user does not pick one
pub const DEFAULT_STORE_KEY: &str = "cubesat-config";

/// The editing context handed to the UI: registry, history and storage
/// behind one set of user-level operations.
///
/// Successful add/edit/remove calls record a history entry; the registry and
/// history are otherwise reachable read-only.
#[derive(Debug)]
pub struct Editor {
    settings: Settings,
    registry: ComponentRegistry,
    history: HistoryStore,
    store: ConfigStore,
}

impl Editor {
    /// Builds the registry from `settings`, loads its default layout and
    /// records that as the first history entry.
    pub fn new(settings: Settings) -> Self {
        let registry = ComponentRegistry::new(settings.section_keys().map(str::to_owned))
            .with_material_defaults(settings.material_defaults);
        let history = HistoryStore::with_capacity(settings.history_capacity);
        let store = ConfigStore::new(&settings.store_dir).with_max_autosaves(settings.max_autosaves);

        let mut editor = Self {
            settings,
            registry,
            history,
            store,
        };
        editor.load_defaults();
        editor.history.save_state(&editor.registry);
        editor
    }

    /// Swap the storage backend, e.g. to point it at another directory.
    pub fn with_store(mut self, store: ConfigStore) -> Self {
        self.store = store;
        self
    }

    fn load_defaults(&mut self) {
        let report = self
            .registry
            .import_snapshot_data(self.settings.components.iter().cloned());
        log::info!("Loaded {} default components", report.imported);
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Subscribe a visual collaborator, replaying the current content to it first.
    pub fn attach(&self, handler: Box<dyn EventHandler>) {
        self.registry.attach(handler);
    }

    pub fn add_component(&mut self, draft: ComponentDraft) -> RegistryResult<String> {
        let id = self.registry.add(draft)?.id.clone();
        self.history.save_state(&self.registry);
        Ok(id)
    }

    pub fn edit_component(&mut self, id: &str, update: ComponentUpdate) -> RegistryResult<()> {
        self.registry.edit(id, update)?;
        self.history.save_state(&self.registry);
        Ok(())
    }

    pub fn remove_component(&mut self, id: &str) -> RegistryResult<Component> {
        let removed = self.registry.remove(id)?;
        self.history.save_state(&self.registry);
        Ok(removed)
    }

    /// Visibility toggles are view state and do not create history entries.
    pub fn toggle_section(&mut self, section: &str) -> RegistryResult<bool> {
        self.registry.toggle_section(section)
    }

    pub fn set_section_visibility(&mut self, section: &str, visible: bool) -> RegistryResult<()> {
        self.registry.set_section_visibility(section, visible)
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.registry)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.registry)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn export_config(&self) -> ConfigDocument {
        self.history.export_config(&self.registry, &self.settings.cubesat)
    }

    pub fn export_json(&self) -> ConfigResult<String> {
        self.export_config().to_json_pretty().map_err(ConfigError::Serialize)
    }

    pub fn import_config(&mut self, payload: &serde_json::Value) -> ConfigResult<ImportReport> {
        self.history.import_config(&mut self.registry, payload)
    }

    pub fn import_json(&mut self, json: &str) -> ConfigResult<ImportReport> {
        let payload: serde_json::Value = serde_json::from_str(json)?;
        self.import_config(&payload)
    }

    pub fn export_to_file(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.export_json()?)?;
        log::info!("Exported configuration to {}", path.display());
        Ok(())
    }

    pub fn import_from_file(&mut self, path: impl AsRef<Path>) -> ConfigResult<ImportReport> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        log::info!("Importing configuration from {}", path.display());
        self.import_json(&json)
    }

    pub fn save_to_store(&mut self, key: &str) -> ConfigResult<()> {
        let document = self.export_config();
        self.store.save(key, &document)?;
        Ok(())
    }

    /// Imports the document saved under `key`. Returns `Ok(None)` when there
    /// is nothing stored there.
    pub fn load_from_store(&mut self, key: &str) -> ConfigResult<Option<ImportReport>> {
        match self.store.load(key)? {
            Some(payload) => self.import_config(&payload).map(Some),
            None => Ok(None),
        }
    }

    pub fn remove_from_store(&mut self, key: &str) -> ConfigResult<()> {
        self.store.remove(key)?;
        Ok(())
    }

    /// `now` is in seconds since the UNIX epoch
    pub fn enable_autosave(&mut self, now: u64) {
        self.store.enable_autosave(self.settings.autosave_interval_secs, now);
    }

    pub fn disable_autosave(&mut self) {
        self.store.disable_autosave();
    }

    /// Writes an auto-save when one is due. Failures are logged, not returned.
    pub fn tick_autosave(&mut self, now: u64) -> bool {
        if !self.store.autosave_due(now) {
            return false;
        }
        let document = self.export_config();
        match self.store.try_autosave(now, &document) {
            Ok(written) => written,
            Err(err) => {
                log::error!("Auto-save failed: {}", err);
                false
            }
        }
    }

    /// Throws away the current layout and the whole history, then starts
    /// over from the default layout.
    pub fn reset_to_default(&mut self) {
        self.registry.clear();
        self.load_defaults();
        self.history.clear();
        self.history.save_state(&self.registry);
    }
}
