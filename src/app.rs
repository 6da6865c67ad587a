use parking_lot::Mutex;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use crate::component::{ComponentDraft, ComponentUpdate};
use crate::editor::{DEFAULT_STORE_KEY, Editor};
use crate::geometry::Camera;
use crate::input::{FrameInput, Shortcut};
use crate::interaction::InteractionState;
use crate::panels::{self, EditorPanelState};
use crate::registry::ImportReport;
use crate::scene::{ProxyScene, SceneSync};
use crate::settings::Settings;
use crate::state::ConfigStore;
use crate::util::time;

/// Optional settings file read at start-up, next to the working directory
pub const SETTINGS_FILE: &str = "cubesat_settings.json";

/// eframe storage key of the saved configurations on the web
pub const CONFIG_STORE_KEY: &str = "cubesat_configs";

/// The bits of UI state we persist across restarts.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct AppMemory {
    /// Path used by export/import
    pub file_path: String,
    /// Key used by save/load
    pub store_key: String,
    pub autosave: bool,
    pub show_editor: bool,
}

impl Default for AppMemory {
    fn default() -> Self {
        Self {
            file_path: "cubesat-config.json".to_owned(),
            store_key: DEFAULT_STORE_KEY.to_owned(),
            autosave: true,
            show_editor: true,
        }
    }
}

/// Outcome of the last user operation, shown in the toolbar
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Error(String),
}

pub struct CubeSatApp {
    pub(crate) editor: Editor,
    pub(crate) scene: Arc<Mutex<ProxyScene>>,
    pub(crate) camera: Camera,
    pub(crate) interaction: InteractionState,
    pub(crate) memory: AppMemory,
    pub(crate) editor_panel: EditorPanelState,
    pub(crate) status: Option<Status>,
    /// Set by the selection listener, consumed once per frame
    selection_changed: Rc<Cell<bool>>,
}

impl CubeSatApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let memory = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        let settings = load_settings();
        let store = open_store(&settings, cc.storage);
        Self::with_editor(Editor::new(settings).with_store(store), memory)
    }

    pub fn with_settings(settings: Settings, memory: AppMemory) -> Self {
        Self::with_editor(Editor::new(settings), memory)
    }

    pub fn with_editor(mut editor: Editor, memory: AppMemory) -> Self {
        let mut interaction = InteractionState::new(editor.settings().interaction.clone());

        let scene = Arc::new(Mutex::new(ProxyScene::new()));
        editor.attach(Box::new(SceneSync::new(scene.clone())));

        let selection_changed = Rc::new(Cell::new(false));
        let flag = selection_changed.clone();
        interaction.on_select(move |id| {
            log::debug!("Selection changed to {:?}", id);
            flag.set(true);
        });

        if memory.autosave {
            editor.enable_autosave(time::timestamp_secs());
        }

        Self {
            editor,
            scene,
            camera: Camera::default(),
            interaction,
            memory,
            editor_panel: EditorPanelState::default(),
            status: None,
            selection_changed,
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn scene(&self) -> &Arc<Mutex<ProxyScene>> {
        &self.scene
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{}", message);
        self.status = Some(Status::Info(message));
    }

    fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{}", message);
        self.status = Some(Status::Error(message));
    }

    /// Brings the glow and the edit form back in line after the registry was
    /// rebuilt wholesale.
    fn after_rebuild(&mut self) {
        self.interaction.refresh(self.editor.registry());
        self.editor_panel.reload(self.editor.registry());
    }

    fn report_import(&mut self, report: &ImportReport, source: &str) {
        self.after_rebuild();
        if report.is_clean() {
            self.info(format!("Imported {} components from {}", report.imported, source));
        } else {
            self.error(format!(
                "Imported {} components from {}, skipped {}",
                report.imported,
                source,
                report.skipped.len()
            ));
        }
    }

    pub fn add_component(&mut self, draft: ComponentDraft) -> bool {
        match self.editor.add_component(draft) {
            Ok(id) => {
                self.info(format!("Added {}", id));
                true
            }
            Err(err) => {
                self.error(format!("Could not add component: {}", err));
                false
            }
        }
    }

    pub fn edit_component(&mut self, id: &str, update: ComponentUpdate) -> bool {
        match self.editor.edit_component(id, update) {
            Ok(()) => {
                self.info(format!("Updated {}", id));
                true
            }
            Err(err) => {
                self.error(format!("Could not update component: {}", err));
                false
            }
        }
    }

    pub fn remove_component(&mut self, id: &str) -> bool {
        match self.editor.remove_component(id) {
            Ok(removed) => {
                self.interaction.prune(self.editor.registry());
                self.info(format!("Removed {}", removed.name));
                true
            }
            Err(err) => {
                self.error(format!("Could not remove component: {}", err));
                false
            }
        }
    }

    pub fn toggle_section(&mut self, section: &str) {
        if let Err(err) = self.editor.toggle_section(section) {
            self.error(err.to_string());
        }
    }

    pub fn undo(&mut self) {
        if self.editor.undo() {
            self.after_rebuild();
            self.info("Undo");
        }
    }

    pub fn redo(&mut self) {
        if self.editor.redo() {
            self.after_rebuild();
            self.info("Redo");
        }
    }

    pub fn export_to_file(&mut self) {
        let path = self.memory.file_path.clone();
        match self.editor.export_to_file(&path) {
            Ok(()) => self.info(format!("Exported to {}", path)),
            Err(err) => self.error(format!("Export failed: {}", err)),
        }
    }

    pub fn import_from_file(&mut self) {
        let path = self.memory.file_path.clone();
        match self.editor.import_from_file(&path) {
            Ok(report) => self.report_import(&report, &path),
            Err(err) => self.error(format!("Import failed: {}", err)),
        }
    }

    pub fn save_to_store(&mut self) {
        let key = self.memory.store_key.clone();
        match self.editor.save_to_store(&key) {
            Ok(()) => self.info(format!("Saved configuration '{}'", key)),
            Err(err) => self.error(format!("Save failed: {}", err)),
        }
    }

    pub fn load_from_store(&mut self) {
        let key = self.memory.store_key.clone();
        match self.editor.load_from_store(&key) {
            Ok(Some(report)) => self.report_import(&report, &key),
            Ok(None) => self.error(format!("No saved configuration named '{}'", key)),
            Err(err) => self.error(format!("Load failed: {}", err)),
        }
    }

    pub fn set_autosave(&mut self, enabled: bool) {
        self.memory.autosave = enabled;
        if enabled {
            self.editor.enable_autosave(time::timestamp_secs());
        } else {
            self.editor.disable_autosave();
        }
    }

    pub fn reset_to_default(&mut self) {
        self.editor.reset_to_default();
        self.interaction.refresh(self.editor.registry());
        self.editor_panel = EditorPanelState::default();
        self.info("Reset to the default layout");
    }

    pub fn apply_shortcuts(&mut self, input: &FrameInput) {
        for shortcut in &input.shortcuts {
            match shortcut {
                Shortcut::Undo => self.undo(),
                Shortcut::Redo => self.redo(),
                Shortcut::ToggleEditor => self.memory.show_editor = !self.memory.show_editor,
            }
        }
    }

    /// Ask the backend for a frame capture; it arrives as an event next frame.
    pub fn request_screenshot(&mut self, ctx: &egui::Context) {
        ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
    }

    fn handle_screenshots(&mut self, ctx: &egui::Context) {
        let images: Vec<Arc<egui::ColorImage>> = ctx.input(|i| {
            i.raw
                .events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Screenshot { image, .. } => Some(image.clone()),
                    _ => None,
                })
                .collect()
        });

        for image in images {
            let path = format!("cubesat-screenshot-{}.png", time::timestamp_secs());
            match save_png(&image, &path) {
                Ok(()) => self.info(format!("Saved screenshot to {}", path)),
                Err(err) => self.error(format!("Screenshot failed: {}", err)),
            }
        }
    }

    /// Load the selected component into the edit form when the selection moves.
    fn sync_selection(&mut self) {
        if !self.selection_changed.replace(false) {
            return;
        }
        let selected = self
            .interaction
            .selected()
            .and_then(|id| self.editor.registry().get(id));
        self.editor_panel.load_selection(selected);
    }
}

fn load_settings() -> Settings {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if std::path::Path::new(SETTINGS_FILE).exists() {
            match Settings::from_file(SETTINGS_FILE) {
                Ok(settings) => return settings,
                Err(err) => log::warn!("Ignoring {}: {}", SETTINGS_FILE, err),
            }
        }
    }
    Settings::default()
}

/// Directory store on native, an in-memory store backed by eframe storage on
/// the web.
fn open_store(settings: &Settings, storage: Option<&dyn eframe::Storage>) -> ConfigStore {
    let store = if cfg!(target_arch = "wasm32") {
        let entries = storage
            .and_then(|storage| eframe::get_value(storage, CONFIG_STORE_KEY))
            .unwrap_or_default();
        ConfigStore::in_memory(entries)
    } else {
        ConfigStore::new(&settings.store_dir)
    };
    store.with_max_autosaves(settings.max_autosaves)
}

fn save_png(image: &egui::ColorImage, path: &str) -> image::ImageResult<()> {
    let [width, height] = image.size;
    let pixels: Vec<u8> = image.pixels.iter().flat_map(|pixel| pixel.to_array()).collect();
    let buffer = image::RgbaImage::from_raw(width as u32, height as u32, pixels).ok_or_else(|| {
        image::ImageError::Parameter(image::error::ParameterError::from_kind(
            image::error::ParameterErrorKind::DimensionMismatch,
        ))
    })?;
    buffer.save_with_format(path, image::ImageFormat::Png)
}

impl eframe::App for CubeSatApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.memory);
        if let Some(entries) = self.editor.store().entries() {
            eframe::set_value(storage, CONFIG_STORE_KEY, entries);
        }
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let input = FrameInput::from_egui(ctx);
        self.apply_shortcuts(&input);
        self.handle_screenshots(ctx);

        panels::toolbar(self, ctx);
        if self.memory.show_editor {
            panels::editor_panel(self, ctx);
        }
        panels::viewport(self, ctx, &input);
        self.sync_selection();

        self.interaction.tick(self.editor.registry(), time::current_time_secs());
        self.editor.tick_autosave(time::timestamp_secs());

        if self.interaction.is_flashing() {
            ctx.request_repaint();
        } else if self.memory.autosave {
            ctx.request_repaint_after(std::time::Duration::from_secs(1));
        }
    }
}
