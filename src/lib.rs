#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod component;
pub mod document;
pub mod editor;
pub mod error;
pub mod event;
pub mod geometry;
pub mod history;
pub mod id_generator;
pub mod input;
pub mod interaction;
pub mod panels;
pub mod picking;
pub mod registry;
pub mod scene;
pub mod settings;
pub mod state;
pub mod util;

pub use app::CubeSatApp;
pub use component::{Component, ComponentDraft, ComponentUpdate, Material};
pub use document::{ConfigDocument, CubesatDimensions};
pub use editor::Editor;
pub use error::{ConfigError, RegistryError};
pub use event::{EventBus, EventHandler, SceneEvent};
pub use history::{HistoryStore, Snapshot};
pub use registry::{ComponentRegistry, ImportReport};
pub use scene::{ProxyScene, SceneSync};
pub use settings::Settings;
pub use state::ConfigStore;
