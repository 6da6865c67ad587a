use crate::CubeSatApp;
use crate::app::Status;
use crate::component::color_to_rgb;

pub fn toolbar(app: &mut CubeSatApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.horizontal_wrapped(|ui| {
            ui.strong("CubeSat 3U");
            ui.separator();

            section_toggles(app, ui);
            ui.separator();

            let can_undo = app.editor.can_undo();
            let can_redo = app.editor.can_redo();
            if ui
                .add_enabled(can_undo, egui::Button::new("Undo"))
                .on_hover_text("Ctrl+Z")
                .clicked()
            {
                app.undo();
            }
            if ui
                .add_enabled(can_redo, egui::Button::new("Redo"))
                .on_hover_text("Ctrl+Shift+Z")
                .clicked()
            {
                app.redo();
            }
            ui.label(format!(
                "{}/{}",
                app.editor.history().cursor().map_or(0, |cursor| cursor + 1),
                app.editor.history().len()
            ));
            ui.separator();

            if ui.button("Reset").clicked() {
                app.reset_to_default();
            }
            if ui.button("Screenshot").clicked() {
                app.request_screenshot(ctx);
            }
            let label = if app.memory.show_editor { "Hide Editor" } else { "Show Editor" };
            if ui.button(label).on_hover_text("E").clicked() {
                app.memory.show_editor = !app.memory.show_editor;
            }
        });

        ui.horizontal_wrapped(|ui| {
            ui.label("File:");
            ui.add(egui::TextEdit::singleline(&mut app.memory.file_path).desired_width(180.0));
            if ui.button("Export").clicked() {
                app.export_to_file();
            }
            if ui.button("Import").clicked() {
                app.import_from_file();
            }
            ui.separator();

            ui.label("Saved:");
            ui.add(egui::TextEdit::singleline(&mut app.memory.store_key).desired_width(120.0));
            if ui.button("Save").clicked() {
                app.save_to_store();
            }
            if ui.button("Load").clicked() {
                app.load_from_store();
            }
            let mut autosave = app.memory.autosave;
            if ui.checkbox(&mut autosave, "Auto-save").changed() {
                app.set_autosave(autosave);
            }
        });

        if let Some(status) = &app.status {
            match status {
                Status::Info(message) => ui.label(message),
                Status::Error(message) => ui.colored_label(ui.visuals().error_fg_color, message),
            };
        }
    });
}

fn section_toggles(app: &mut CubeSatApp, ui: &mut egui::Ui) {
    let toggles: Vec<(String, String, u32, bool)> = app
        .editor
        .registry()
        .sections()
        .iter()
        .map(|section| {
            let def = app.editor.settings().section(section.name());
            (
                section.name().to_owned(),
                def.map_or_else(|| section.name().to_owned(), |def| def.label.clone()),
                def.map_or(0xaaaaaa, |def| def.color),
                section.is_visible(),
            )
        })
        .collect();

    for (name, label, color, visible) in toggles {
        let [r, g, b] = color_to_rgb(color);
        let text = egui::RichText::new(&name).color(egui::Color32::from_rgb(r, g, b));
        if ui.selectable_label(visible, text).on_hover_text(label).clicked() {
            app.toggle_section(&name);
        }
    }
}
