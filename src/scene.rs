use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::component::{Component, Material, Vec3};
use crate::event::{EventHandler, SceneEvent};
use crate::geometry::Aabb;

/// What the viewport draws for one component.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableBox {
    pub id: String,
    pub size: Vec3,
    pub position: Vec3,
    pub color: u32,
    pub material: Material,
    pub section: String,
    /// Emissive glow, 0 when idle
    pub highlight: f32,
}

impl DrawableBox {
    fn from_component(component: &Component) -> Self {
        Self {
            id: component.id.clone(),
            size: component.size,
            position: component.position,
            color: component.color,
            material: component.material,
            section: component.section.clone(),
            highlight: 0.0,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_size(self.position, self.size)
    }
}

/// The visual side of the registry: one proxy per component.
#[derive(Debug, Clone, Default)]
pub struct ProxyScene {
    boxes: HashMap<String, DrawableBox>,
    hidden_sections: BTreeSet<String>,
    /// Bumped on every applied event so the UI can tell when to repaint
    revision: u64,
}

impl ProxyScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &SceneEvent) {
        match event {
            SceneEvent::ComponentAdded(component) => {
                self.boxes
                    .insert(component.id.clone(), DrawableBox::from_component(component));
            }
            SceneEvent::ComponentRemoved { id } => {
                self.boxes.remove(id);
            }
            SceneEvent::ComponentChanged {
                id,
                size,
                position,
                color,
                material,
            } => {
                if let Some(proxy) = self.boxes.get_mut(id) {
                    proxy.size = *size;
                    proxy.position = *position;
                    proxy.color = *color;
                    proxy.material = *material;
                }
            }
            SceneEvent::ComponentMoved { id, new_section, .. } => {
                if let Some(proxy) = self.boxes.get_mut(id) {
                    proxy.section = new_section.clone();
                }
            }
            SceneEvent::SectionVisibilityChanged { section, visible } => {
                if *visible {
                    self.hidden_sections.remove(section);
                } else {
                    self.hidden_sections.insert(section.clone());
                }
            }
            SceneEvent::HighlightChanged { id, intensity } => {
                if let Some(proxy) = self.boxes.get_mut(id) {
                    proxy.highlight = *intensity;
                }
            }
            SceneEvent::Cleared => {
                self.boxes.clear();
            }
        }
        self.revision += 1;
    }

    pub fn get(&self, id: &str) -> Option<&DrawableBox> {
        self.boxes.get(id)
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_section_visible(&self, section: &str) -> bool {
        !self.hidden_sections.contains(section)
    }

    /// Proxies in visible sections
    pub fn visible_boxes(&self) -> impl Iterator<Item = &DrawableBox> + '_ {
        self.boxes
            .values()
            .filter(|proxy| self.is_section_visible(&proxy.section))
    }
}

/// Keeps a shared [`ProxyScene`] in step with the registry's event bus.
pub struct SceneSync {
    scene: Arc<Mutex<ProxyScene>>,
}

impl SceneSync {
    pub fn new(scene: Arc<Mutex<ProxyScene>>) -> Self {
        Self { scene }
    }
}

impl EventHandler for SceneSync {
    fn handle_event(&mut self, event: &SceneEvent) {
        self.scene.lock().apply(event);
    }
}
