use crate::component::{Component, Material, Vec3};

/// Something the visual proxies need to follow.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    ComponentAdded(Component),
    ComponentRemoved {
        id: String,
    },
    /// Geometry or surface of an existing component changed
    ComponentChanged {
        id: String,
        size: Vec3,
        position: Vec3,
        color: u32,
        material: Material,
    },
    ComponentMoved {
        id: String,
        old_section: String,
        new_section: String,
    },
    SectionVisibilityChanged {
        section: String,
        visible: bool,
    },
    HighlightChanged {
        id: String,
        intensity: f32,
    },
    /// Every proxy was dropped at once
    Cleared,
}

impl SceneEvent {
    pub(crate) fn changed(component: &Component) -> Self {
        SceneEvent::ComponentChanged {
            id: component.id.clone(),
            size: component.size,
            position: component.position,
            color: component.color,
            material: component.material,
        }
    }
}
