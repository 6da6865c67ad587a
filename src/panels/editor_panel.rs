use crate::CubeSatApp;
use crate::component::{
    Component, ComponentDraft, ComponentUpdate, Specs, Vec3, color_from_rgb, color_to_rgb,
};
use crate::registry::ComponentRegistry;
use crate::util::time;

pub const CATEGORIES: [&str; 6] = ["experiment", "sensor", "optics", "electronics", "power", "generic"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorTab {
    #[default]
    Add,
    Edit,
    List,
}

/// Field values of the add and edit forms.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentForm {
    pub name: String,
    pub section: String,
    pub category: String,
    pub description: String,
    pub size: Vec3,
    pub position: Vec3,
    pub color: [u8; 3],
    /// One `key: value` pair per line
    pub specs: String,
    /// Specs of the record this form was loaded from
    loaded_specs: Specs,
}

impl Default for ComponentForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            section: "U1".to_owned(),
            category: "experiment".to_owned(),
            description: String::new(),
            size: Vec3::new(5.0, 3.0, 3.0),
            position: Vec3::ZERO,
            color: color_to_rgb(0x61b3e0),
            specs: String::new(),
            loaded_specs: Specs::new(),
        }
    }
}

impl ComponentForm {
    pub fn from_component(component: &Component) -> Self {
        Self {
            name: component.name.clone(),
            section: component.section.clone(),
            category: component.category.clone(),
            description: component.description.clone(),
            size: component.size,
            position: component.position,
            color: color_to_rgb(component.color),
            specs: specs_to_text(&component.specs),
            loaded_specs: component.specs.clone(),
        }
    }

    /// First problem found, phrased for the user
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Component name is required".to_owned());
        }
        if !self.size.is_finite() || self.size.cmple(Vec3::ZERO).any() {
            return Err("Width, height and depth must be greater than zero".to_owned());
        }
        Ok(())
    }

    pub fn to_draft(&self) -> Result<ComponentDraft, String> {
        self.validate()?;
        let mut draft = ComponentDraft::new(
            self.name.trim(),
            self.section.clone(),
            self.size,
            self.position,
            color_from_rgb(self.color),
        )
        .with_category(self.category.clone())
        .with_description(self.description.trim());
        draft.specs = parse_specs(&self.specs);
        Ok(draft)
    }

    /// Lines deleted from the specs text since loading become `removed_specs`.
    pub fn to_update(&self) -> Result<ComponentUpdate, String> {
        self.validate()?;
        let specs = parse_specs(&self.specs);
        let removed_specs = self
            .loaded_specs
            .keys()
            .filter(|key| !specs.contains_key(*key))
            .cloned()
            .collect();
        Ok(ComponentUpdate {
            name: Some(self.name.trim().to_owned()),
            size: Some(self.size),
            position: Some(self.position),
            color: Some(color_from_rgb(self.color)),
            section: Some(self.section.clone()),
            category: Some(self.category.clone()),
            description: Some(self.description.trim().to_owned()),
            specs: Some(specs),
            removed_specs,
            ..Default::default()
        })
    }
}

/// Parses `key: value` (or `key = value`) lines, skipping blank or keyless ones.
pub fn parse_specs(text: &str) -> Specs {
    text.lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':').or_else(|| line.split_once('='))?;
            let key = key.trim();
            (!key.is_empty()).then(|| (key.to_owned(), value.trim().to_owned()))
        })
        .collect()
}

fn specs_to_text(specs: &Specs) -> String {
    specs
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Default)]
pub struct EditorPanelState {
    pub tab: EditorTab,
    pub add_form: ComponentForm,
    pub edit_form: ComponentForm,
    editing: Option<String>,
    /// Validation message for the visible form
    message: Option<String>,
}

impl EditorPanelState {
    /// Id of the component the edit form is bound to
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn load_selection(&mut self, component: Option<&Component>) {
        self.message = None;
        match component {
            Some(component) => {
                self.edit_form = ComponentForm::from_component(component);
                self.editing = Some(component.id.clone());
                self.tab = EditorTab::Edit;
            }
            None => self.editing = None,
        }
    }

    /// Reloads the edit form from the registry after its record may have
    /// changed underneath it. Keeps the current tab.
    pub fn reload(&mut self, registry: &ComponentRegistry) {
        let Some(id) = self.editing.as_deref() else {
            return;
        };
        match registry.get(id) {
            Some(component) => self.edit_form = ComponentForm::from_component(component),
            None => {
                self.editing = None;
                self.edit_form = ComponentForm::default();
            }
        }
    }
}

pub fn editor_panel(app: &mut CubeSatApp, ctx: &egui::Context) {
    let sections: Vec<String> = app.editor.registry().section_names().map(str::to_owned).collect();

    egui::SidePanel::right("editor_panel")
        .resizable(true)
        .default_width(300.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Component Editor");
                ui.label("(E)");
            });
            ui.horizontal(|ui| {
                for (tab, label) in [
                    (EditorTab::Add, "Add"),
                    (EditorTab::Edit, "Edit"),
                    (EditorTab::List, "Components"),
                ] {
                    if ui.selectable_label(app.editor_panel.tab == tab, label).clicked() {
                        app.editor_panel.tab = tab;
                        app.editor_panel.message = None;
                    }
                }
            });
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| match app.editor_panel.tab {
                EditorTab::Add => add_tab(app, ui, &sections),
                EditorTab::Edit => edit_tab(app, ui, &sections),
                EditorTab::List => list_tab(app, ui, &sections),
            });

            if let Some(message) = &app.editor_panel.message {
                ui.separator();
                ui.colored_label(ui.visuals().error_fg_color, message);
            }
        });
}

fn add_tab(app: &mut CubeSatApp, ui: &mut egui::Ui, sections: &[String]) {
    form_ui(ui, &mut app.editor_panel.add_form, sections, "add_form");
    ui.add_space(8.0);
    if ui.button("Add Component").clicked() {
        match app.editor_panel.add_form.to_draft() {
            Ok(draft) => {
                if app.add_component(draft) {
                    app.editor_panel.add_form = ComponentForm::default();
                    app.editor_panel.message = None;
                }
            }
            Err(message) => app.editor_panel.message = Some(message),
        }
    }
}

fn edit_tab(app: &mut CubeSatApp, ui: &mut egui::Ui, sections: &[String]) {
    let Some(id) = app.editor_panel.editing.clone() else {
        ui.label("Select a component to edit");
        return;
    };

    ui.label(format!("ID: {}", id));
    form_ui(ui, &mut app.editor_panel.edit_form, sections, "edit_form");
    ui.add_space(8.0);

    ui.horizontal(|ui| {
        if ui.button("Apply").clicked() {
            match app.editor_panel.edit_form.to_update() {
                Ok(update) => {
                    if app.edit_component(&id, update) {
                        app.editor_panel.message = None;
                    }
                }
                Err(message) => app.editor_panel.message = Some(message),
            }
        }
        if ui.button("Delete").clicked() && app.remove_component(&id) {
            app.editor_panel.load_selection(None);
        }
    });
}

fn list_tab(app: &mut CubeSatApp, ui: &mut egui::Ui, sections: &[String]) {
    let mut clicked = None;
    {
        let registry = app.editor.registry();
        for section in sections {
            let count = registry.section_count(section);
            egui::CollapsingHeader::new(format!("{} ({})", section, count))
                .id_salt(section)
                .default_open(true)
                .show(ui, |ui| {
                    for component in registry.by_section(section) {
                        let selected = app.interaction.selected() == Some(component.id.as_str());
                        let response = ui
                            .selectable_label(selected, &component.name)
                            .on_hover_text(format!("{} - {}", component.category, component.description));
                        if response.clicked() {
                            clicked = Some(component.id.clone());
                        }
                    }
                });
        }
    }

    if let Some(id) = clicked {
        let registry = app.editor.registry();
        app.interaction.select(registry, Some(id), time::current_time_secs());
    }
}

fn form_ui(ui: &mut egui::Ui, form: &mut ComponentForm, sections: &[String], id_salt: &str) {
    egui::Grid::new(id_salt)
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label("Name");
            ui.text_edit_singleline(&mut form.name);
            ui.end_row();

            ui.label("Section");
            egui::ComboBox::from_id_salt((id_salt, "section"))
                .selected_text(form.section.as_str())
                .show_ui(ui, |ui| {
                    for section in sections {
                        ui.selectable_value(&mut form.section, section.clone(), section.as_str());
                    }
                });
            ui.end_row();

            ui.label("Category");
            egui::ComboBox::from_id_salt((id_salt, "category"))
                .selected_text(form.category.as_str())
                .show_ui(ui, |ui| {
                    for category in CATEGORIES {
                        ui.selectable_value(&mut form.category, category.to_owned(), category);
                    }
                });
            ui.end_row();

            ui.label("Size (cm)");
            ui.horizontal(|ui| {
                for extent in form.size.as_mut() {
                    ui.add(egui::DragValue::new(extent).speed(0.1).range(0.0..=40.0));
                }
            });
            ui.end_row();

            ui.label("Position");
            ui.horizontal(|ui| {
                for coordinate in form.position.as_mut() {
                    ui.add(egui::DragValue::new(coordinate).speed(0.1).range(-20.0..=20.0));
                }
            });
            ui.end_row();

            ui.label("Color");
            egui::color_picker::color_edit_button_srgb(ui, &mut form.color);
            ui.end_row();

            ui.label("Description");
            ui.text_edit_multiline(&mut form.description);
            ui.end_row();

            ui.label("Specs");
            ui.add(egui::TextEdit::multiline(&mut form.specs).hint_text("power: 5W"));
            ui.end_row();
        });
}
