use eframe::egui::{self, Key, Modifiers, Pos2, Vec2};

/// Keyboard commands the editor reacts to outside of text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
    /// Show or hide the component editor panel
    ToggleEditor,
}

/// Maps a key press to a shortcut.
///
/// Ctrl/Cmd+Z undoes, Ctrl/Cmd+Shift+Z and Ctrl/Cmd+Y redo, a bare `E`
/// toggles the editor panel.
pub fn shortcut_for(key: Key, modifiers: Modifiers) -> Option<Shortcut> {
    match key {
        Key::Z if modifiers.command && modifiers.shift => Some(Shortcut::Redo),
        Key::Z if modifiers.command => Some(Shortcut::Undo),
        Key::Y if modifiers.command => Some(Shortcut::Redo),
        Key::E if !modifiers.command && !modifiers.alt => Some(Shortcut::ToggleEditor),
        _ => None,
    }
}

/// Pointer and keyboard input for one frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub pointer_pos: Option<Pos2>,
    pub pointer_delta: Vec2,
    pub primary_down: bool,
    pub secondary_down: bool,
    pub scroll_delta: Vec2,
    pub shortcuts: Vec<Shortcut>,
}

impl FrameInput {
    /// Collect the frame's input from egui.
    ///
    /// Shortcuts are skipped while a text field has focus so typing an `e`
    /// into the name field does not close the panel.
    pub fn from_egui(ctx: &egui::Context) -> Self {
        let typing = ctx.wants_keyboard_input();
        ctx.input(|i| Self {
            pointer_pos: i.pointer.hover_pos(),
            pointer_delta: i.pointer.delta(),
            primary_down: i.pointer.primary_down(),
            secondary_down: i.pointer.secondary_down(),
            scroll_delta: i.raw_scroll_delta,
            shortcuts: if typing {
                Vec::new()
            } else {
                i.events
                    .iter()
                    .filter_map(|event| match event {
                        egui::Event::Key {
                            key,
                            pressed: true,
                            repeat: false,
                            modifiers,
                            ..
                        } => shortcut_for(*key, *modifiers),
                        _ => None,
                    })
                    .collect()
            },
        })
    }

    pub fn has(&self, shortcut: Shortcut) -> bool {
        self.shortcuts.contains(&shortcut)
    }

    /// True while a drag should orbit the camera
    pub fn is_orbiting(&self) -> bool {
        (self.primary_down || self.secondary_down) && self.pointer_delta != Vec2::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_and_redo_chords() {
        assert_eq!(shortcut_for(Key::Z, Modifiers::COMMAND), Some(Shortcut::Undo));
        assert_eq!(
            shortcut_for(Key::Z, Modifiers::COMMAND | Modifiers::SHIFT),
            Some(Shortcut::Redo)
        );
        assert_eq!(shortcut_for(Key::Y, Modifiers::COMMAND), Some(Shortcut::Redo));
        assert_eq!(shortcut_for(Key::Z, Modifiers::NONE), None);
    }

    #[test]
    fn bare_e_toggles_editor() {
        assert_eq!(shortcut_for(Key::E, Modifiers::NONE), Some(Shortcut::ToggleEditor));
        assert_eq!(shortcut_for(Key::E, Modifiers::SHIFT), Some(Shortcut::ToggleEditor));
        assert_eq!(shortcut_for(Key::E, Modifiers::COMMAND), None);
    }

    #[test]
    fn orbiting_needs_button_and_motion() {
        let mut input = FrameInput {
            primary_down: true,
            ..Default::default()
        };
        assert!(!input.is_orbiting());
        input.pointer_delta = Vec2::new(3.0, 0.0);
        assert!(input.is_orbiting());
    }
}
