use egui::{Color32, Pos2, Rect, Shape, Stroke};
use glam::{Vec2, Vec3};

use crate::CubeSatApp;
use crate::component::color_to_rgb;
use crate::geometry::{Aabb, Camera, ndc_from_screen, screen_from_ndc};
use crate::input::FrameInput;
use crate::picking::pick_at;
use crate::scene::DrawableBox;
use crate::util::time;

const BACKGROUND: Color32 = Color32::from_rgb(11, 15, 26);
const ORBIT_SPEED: f32 = 0.008;
const ZOOM_SPEED: f32 = 0.0015;
const LIGHT: Vec3 = Vec3::new(0.4, 0.8, 0.45);

/// Corner indices of each box face (see [`Aabb::corners`]) and its outward normal
const FACES: [([usize; 4], Vec3); 6] = [
    ([0, 3, 2, 1], Vec3::NEG_Y),
    ([4, 5, 6, 7], Vec3::Y),
    ([0, 1, 5, 4], Vec3::NEG_Z),
    ([2, 3, 7, 6], Vec3::Z),
    ([0, 4, 7, 3], Vec3::NEG_X),
    ([1, 2, 6, 5], Vec3::X),
];

#[rustfmt::skip]
const EDGES: [(usize, usize); 12] = [
    (0, 1), (1, 2), (2, 3), (3, 0),
    (4, 5), (5, 6), (6, 7), (7, 4),
    (0, 4), (1, 5), (2, 6), (3, 7),
];

pub fn viewport(app: &mut CubeSatApp, ctx: &egui::Context, input: &FrameInput) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none().fill(BACKGROUND))
        .show(ctx, |ui| {
            let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            app.camera.aspect = rect.width() / rect.height().max(1.0);

            if response.dragged() && input.is_orbiting() {
                app.camera
                    .orbit(-input.pointer_delta.x * ORBIT_SPEED, input.pointer_delta.y * ORBIT_SPEED);
            }
            if response.hovered() && input.scroll_delta.y != 0.0 {
                app.camera.zoom((-input.scroll_delta.y * ZOOM_SPEED).exp());
            }

            let hovered = response.hover_pos().and_then(|pos| {
                let ndc = ndc_from_screen(Vec2::new(pos.x, pos.y), viewport_min(rect), viewport_size(rect));
                pick_at(app.editor.registry(), &app.camera, ndc)
            });
            app.interaction.hover(app.editor.registry(), hovered.clone());
            if response.clicked() {
                app.interaction
                    .select(app.editor.registry(), hovered.clone(), time::current_time_secs());
            }

            draw_sections(app, &painter, rect);
            draw_boxes(app, &painter, rect);

            if let Some(component) = hovered.as_deref().and_then(|id| app.editor.registry().get(id)) {
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                response.on_hover_text(format!("{} ({})", component.name, component.section));
            }
        });
}

fn viewport_min(rect: Rect) -> Vec2 {
    Vec2::new(rect.min.x, rect.min.y)
}

fn viewport_size(rect: Rect) -> Vec2 {
    Vec2::new(rect.width(), rect.height())
}

fn to_screen(camera: &Camera, rect: Rect, point: Vec3) -> Option<Pos2> {
    let (ndc, _) = camera.project(point)?;
    let screen = screen_from_ndc(ndc, viewport_min(rect), viewport_size(rect));
    Some(egui::pos2(screen.x, screen.y))
}

/// Chassis outline, one wireframe per visible section
fn draw_sections(app: &CubeSatApp, painter: &egui::Painter, rect: Rect) {
    let settings = app.editor.settings();
    let registry = app.editor.registry();
    let dims = &settings.cubesat;

    for def in &settings.sections {
        if registry.is_section_visible(&def.key) != Some(true) {
            continue;
        }
        let [near, far] = def.range;
        let bounds = Aabb::new(
            Vec3::new(-dims.width * 0.5, -dims.height * 0.5, near),
            Vec3::new(dims.width * 0.5, dims.height * 0.5, far),
        );
        let [r, g, b] = color_to_rgb(def.color);
        let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(r, g, b, 140));
        draw_wireframe(&app.camera, painter, rect, &bounds, stroke);
    }
}

fn draw_wireframe(camera: &Camera, painter: &egui::Painter, rect: Rect, bounds: &Aabb, stroke: Stroke) {
    let corners = bounds.corners();
    for (from, to) in EDGES {
        if let (Some(a), Some(b)) = (
            to_screen(camera, rect, corners[from]),
            to_screen(camera, rect, corners[to]),
        ) {
            painter.line_segment([a, b], stroke);
        }
    }
}

fn draw_boxes(app: &CubeSatApp, painter: &egui::Painter, rect: Rect) {
    let camera = &app.camera;
    let eye = camera.eye();
    let light = LIGHT.normalize();
    let boxes: Vec<DrawableBox> = app.scene.lock().visible_boxes().cloned().collect();

    let mut faces: Vec<(f32, Shape)> = Vec::new();
    for drawable in &boxes {
        let corners = drawable.bounds().corners();
        let projected: Option<Vec<Pos2>> = corners
            .iter()
            .map(|corner| to_screen(camera, rect, *corner))
            .collect();
        let Some(projected) = projected else {
            continue;
        };

        for (indices, normal) in facing_faces(eye, &corners) {
            let fill = shade(drawable, normal, light);
            let stroke = if drawable.highlight > 0.0 {
                Stroke::new(1.5, Color32::WHITE)
            } else {
                Stroke::new(0.5, fill.gamma_multiply(0.6))
            };
            let points = indices.iter().map(|&index| projected[index]).collect();
            let depth = face_center(&corners, indices).distance(eye);
            faces.push((depth, Shape::convex_polygon(points, fill, stroke)));
        }
    }

    // Far to near
    faces.sort_by(|a, b| b.0.total_cmp(&a.0));
    painter.extend(faces.into_iter().map(|(_, shape)| shape));
}

fn face_center(corners: &[Vec3; 8], indices: [usize; 4]) -> Vec3 {
    indices.iter().map(|&index| corners[index]).sum::<Vec3>() * 0.25
}

/// Faces whose outward normal points towards `eye`
fn facing_faces(eye: Vec3, corners: &[Vec3; 8]) -> impl Iterator<Item = ([usize; 4], Vec3)> + '_ {
    FACES
        .into_iter()
        .filter(move |(indices, normal)| normal.dot(eye - face_center(corners, *indices)) > 0.0)
}

fn shade(drawable: &DrawableBox, normal: Vec3, light: Vec3) -> Color32 {
    let material = drawable.material;
    let diffuse = normal.dot(light).max(0.0);
    let ambient = 0.35 + 0.15 * material.roughness - 0.1 * material.metalness;
    let factor = (ambient + 0.65 * diffuse).clamp(0.0, 1.0);
    let glow = drawable.highlight.clamp(0.0, 1.0) * 0.6;

    let [r, g, b] = color_to_rgb(drawable.color).map(|channel| {
        let lit = f32::from(channel) * factor;
        (lit + (255.0 - lit) * glow).round() as u8
    });
    let alpha = (material.opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(r, g, b, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Material;

    fn drawable(highlight: f32) -> DrawableBox {
        DrawableBox {
            id: "a".into(),
            size: Vec3::splat(2.0),
            position: Vec3::ZERO,
            color: 0x406080,
            material: Material::default(),
            section: "U1".into(),
            highlight,
        }
    }

    #[test]
    fn three_faces_face_a_corner_view() {
        let corners = drawable(0.0).bounds().corners();
        assert_eq!(facing_faces(Vec3::new(40.0, 25.0, 60.0), &corners).count(), 3);
        assert_eq!(facing_faces(Vec3::new(0.0, 0.0, 60.0), &corners).count(), 1);
    }

    #[test]
    fn highlight_brightens_every_channel() {
        let normal = Vec3::Y;
        let light = LIGHT.normalize();
        let idle = shade(&drawable(0.0), normal, light);
        let lit = shade(&drawable(0.5), normal, light);
        assert!(lit.r() > idle.r() && lit.g() > idle.g() && lit.b() > idle.b());
        assert_eq!(idle.a(), 255);
    }
}
