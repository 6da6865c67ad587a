mod editor_panel;
mod toolbar;
mod viewport;

pub use editor_panel::{ComponentForm, EditorPanelState, EditorTab, editor_panel, parse_specs};
pub use toolbar::toolbar;
pub use viewport::viewport;
