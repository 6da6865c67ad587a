use glam::Vec2;

use crate::geometry::{Camera, Ray};
use crate::registry::ComponentRegistry;

#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub id: String,
    /// Distance from the ray origin to the entry point
    pub distance: f32,
}

/// Nearest component hit by `ray`, ignoring hidden sections.
///
/// Equal distances go to the component added first.
pub fn pick(registry: &ComponentRegistry, ray: &Ray) -> Option<PickHit> {
    let mut nearest: Option<PickHit> = None;
    for component in registry.all() {
        if registry.is_section_visible(&component.section) != Some(true) {
            continue;
        }
        let Some(distance) = component.bounds().intersect_ray(ray) else {
            continue;
        };
        if nearest.as_ref().is_none_or(|hit| distance < hit.distance) {
            nearest = Some(PickHit {
                id: component.id.clone(),
                distance,
            });
        }
    }
    nearest
}

/// Resolves a pointer position (in normalised device coordinates) to a component.
pub fn pick_at(registry: &ComponentRegistry, camera: &Camera, ndc: Vec2) -> Option<String> {
    pick(registry, &camera.ray_from_ndc(ndc)).map(|hit| hit.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentDraft, Vec3};

    fn registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::default();
        registry
            .add(ComponentDraft::new("Front", "U1", [2.0, 2.0, 2.0], [0.0, 0.0, 5.0], 0).with_id("front"))
            .unwrap();
        registry
            .add(ComponentDraft::new("Back", "U2", [2.0, 2.0, 2.0], [0.0, 0.0, 0.0], 0).with_id("back"))
            .unwrap();
        registry
    }

    #[test]
    fn nearest_box_wins() {
        let registry = registry();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 20.0), Vec3::NEG_Z);
        let hit = pick(&registry, &ray).unwrap();
        assert_eq!(hit.id, "front");
        assert_eq!(hit.distance, 14.0);
    }

    #[test]
    fn hidden_sections_are_not_pickable() {
        let mut registry = registry();
        registry.set_section_visibility("U1", false).unwrap();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 20.0), Vec3::NEG_Z);
        assert_eq!(pick(&registry, &ray).map(|hit| hit.id), Some("back".to_owned()));
    }

    #[test]
    fn empty_space_picks_nothing() {
        let registry = registry();
        let ray = Ray::new(Vec3::new(10.0, 10.0, 20.0), Vec3::NEG_Z);
        assert_eq!(pick(&registry, &ray), None);
    }

    #[test]
    fn camera_center_picks_origin_box() {
        let mut registry = ComponentRegistry::default();
        registry
            .add(ComponentDraft::new("Core", "U2", [4.0, 4.0, 4.0], [0.0; 3], 0).with_id("core"))
            .unwrap();
        assert_eq!(pick_at(&registry, &Camera::default(), Vec2::ZERO).as_deref(), Some("core"));
        assert_eq!(pick_at(&registry, &Camera::default(), Vec2::splat(0.9)), None);
    }
}
