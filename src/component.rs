use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Width, height, depth or x, y, z, in chassis centimetres. Serialized as `[x, y, z]`.
pub use glam::Vec3;

use crate::geometry::Aabb;

pub type Specs = BTreeMap<String, String>;

pub const DEFAULT_CATEGORY: &str = "generic";

/// Surface parameters handed to the visual proxy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub metalness: f32,
    pub roughness: f32,
    pub opacity: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            metalness: 0.4,
            roughness: 0.6,
            opacity: 1.0,
        }
    }
}

impl Material {
    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// A component stored in the registry.
///
/// This is plain data: the drawable box that represents it on screen lives in
/// [`crate::scene::ProxyScene`] and follows it through [`crate::event::SceneEvent`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: String,
    pub name: String,
    pub size: Vec3,
    pub position: Vec3,
    pub color: u32,
    pub section: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_specs")]
    pub specs: Specs,
    #[serde(default)]
    pub material: Material,
}

impl Component {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_size(self.position, self.size)
    }
}

/// Input to [`crate::registry::ComponentRegistry::add`].
///
/// Everything the registry can default is optional here; this is also the shape
/// each record of an imported document is read into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub size: Vec3,
    pub position: Vec3,
    pub color: u32,
    pub section: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_specs")]
    pub specs: Specs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<Material>,
}

impl ComponentDraft {
    pub fn new(
        name: impl Into<String>,
        section: impl Into<String>,
        size: impl Into<Vec3>,
        position: impl Into<Vec3>,
        color: u32,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            size: size.into(),
            position: position.into(),
            color,
            section: section.into(),
            category: None,
            description: String::new(),
            specs: Specs::new(),
            material: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_spec(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.specs.insert(key.into(), value.into());
        self
    }
}

impl From<Component> for ComponentDraft {
    fn from(component: Component) -> Self {
        Self {
            id: Some(component.id),
            name: component.name,
            size: component.size,
            position: component.position,
            color: component.color,
            section: component.section,
            category: Some(component.category),
            description: component.description,
            specs: component.specs,
            material: Some(component.material),
        }
    }
}

/// A partial edit: `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentUpdate {
    pub name: Option<String>,
    pub size: Option<Vec3>,
    pub position: Option<Vec3>,
    pub color: Option<u32>,
    pub section: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    /// Merged into the existing specs, overwriting equal keys
    pub specs: Option<Specs>,
    /// Spec keys to drop, applied after `specs`
    pub removed_specs: Vec<String>,
    pub metalness: Option<f32>,
    pub roughness: Option<f32>,
    pub opacity: Option<f32>,
}

impl ComponentUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True when the update changes what the visual proxy shows.
    pub fn touches_visuals(&self) -> bool {
        self.size.is_some()
            || self.position.is_some()
            || self.color.is_some()
            || self.metalness.is_some()
            || self.roughness.is_some()
            || self.opacity.is_some()
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_owned()
}

/// Spec sheets are written by hand, so values show up as strings, numbers or
/// booleans. Keep them all as display text.
fn deserialize_specs<'de, D>(deserializer: D) -> Result<Specs, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(text) => text,
                other => other.to_string(),
            };
            (key, text)
        })
        .collect())
}

/// `0x61b3e0` -> `"#61b3e0"`
pub fn color_to_hex(color: u32) -> String {
    format!("#{:06x}", color & 0x00ff_ffff)
}

/// Accepts `#61b3e0`, `61b3e0` and `0x61b3e0`.
pub fn parse_hex_color(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .unwrap_or(trimmed);
    if digits.is_empty() || digits.len() > 6 {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

pub fn color_to_rgb(color: u32) -> [u8; 3] {
    [(color >> 16) as u8, (color >> 8) as u8, color as u8]
}

pub fn color_from_rgb(rgb: [u8; 3]) -> u32 {
    (u32::from(rgb[0]) << 16) | (u32::from(rgb[1]) << 8) | u32::from(rgb[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specs_accept_numbers_and_strings() {
        let json = r#"{
            "name": "Thermocouple Array",
            "size": [2.2, 0.6, 2.2],
            "position": [0, 3, 13.9],
            "color": 16762475,
            "section": "U1",
            "specs": { "channels": 8, "accuracy": "±0.5°C" }
        }"#;
        let draft: ComponentDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.id, None);
        assert_eq!(draft.specs["channels"], "8");
        assert_eq!(draft.specs["accuracy"], "±0.5°C");
    }

    #[test]
    fn vectors_serialize_as_arrays() {
        let component = Component {
            id: "camera".into(),
            name: "Mini CMOS Camera".into(),
            size: Vec3::new(4.0, 3.5, 3.0),
            position: Vec3::new(-2.4, 0.0, 4.0),
            color: 0x61b3e0,
            section: "U2".into(),
            category: "optics".into(),
            description: String::new(),
            specs: Specs::new(),
            material: Material::default(),
        };
        let value = serde_json::to_value(&component).unwrap();
        assert_eq!(value["size"], serde_json::json!([4.0, 3.5, 3.0]));
        assert_eq!(value["position"][2], serde_json::json!(4.0));
    }

    #[test]
    fn material_is_always_serialized() {
        let draft = ComponentDraft::new("Box", "U1", [1.0, 1.0, 1.0], [0.0; 3], 0);
        let component = Component {
            id: "box".into(),
            name: draft.name,
            size: draft.size,
            position: draft.position,
            color: draft.color,
            section: draft.section,
            category: DEFAULT_CATEGORY.into(),
            description: String::new(),
            specs: Specs::new(),
            material: Material::default(),
        };
        let value = serde_json::to_value(&component).unwrap();
        assert!(value["material"].is_object());
    }

    #[test]
    fn hex_colors() {
        assert_eq!(color_to_hex(0x61b3e0), "#61b3e0");
        assert_eq!(color_to_hex(0xff), "#0000ff");
        assert_eq!(parse_hex_color("#61b3e0"), Some(0x61b3e0));
        assert_eq!(parse_hex_color("0xE06161"), Some(0xe06161));
        assert_eq!(parse_hex_color("#1234567"), None);
        assert_eq!(parse_hex_color(""), None);
        assert_eq!(color_from_rgb(color_to_rgb(0x9be26b)), 0x9be26b);
    }

    #[test]
    fn bounds_are_centered_on_position() {
        let draft = ComponentDraft::new("Box", "U1", [2.0, 4.0, 6.0], [1.0, 1.0, 1.0], 0);
        let component = Component {
            id: "box".into(),
            name: draft.name,
            size: draft.size,
            position: draft.position,
            color: draft.color,
            section: draft.section,
            category: DEFAULT_CATEGORY.into(),
            description: String::new(),
            specs: Specs::new(),
            material: Material::default(),
        };
        let bounds = component.bounds();
        assert_eq!(bounds.min, Vec3::new(0.0, -1.0, -2.0));
        assert_eq!(bounds.max, Vec3::new(2.0, 3.0, 4.0));
    }
}
