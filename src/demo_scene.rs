//! Scene shown by the viewer.

use glam::{Mat4, Quat, Vec3};
use scenekit_core::{Components, Label, Mesh, Plane, Scene};

/// Build the demo scene and register its pickable meshes and clipping plane
/// with `components`.
pub fn build(components: &Components) -> Scene {
    let mut scene = Scene::new("demo");
    scene.background = [0.08, 0.09, 0.12, 1.0];

    let floor = scene.add_mesh(
        Mesh::quad("floor", 12.0, 12.0)
            .with_transform(Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2))
            .with_translation(Vec3::new(0.0, -1.0, 0.0))
            .with_color([0.3, 0.32, 0.35, 1.0]),
    );

    let crate_box = scene.add_mesh(
        Mesh::cuboid("crate", Vec3::splat(1.5))
            .with_translation(Vec3::new(-2.0, -0.25, 0.0))
            .with_color([0.85, 0.55, 0.2, 1.0]),
    );

    // Cut in half by the clipping plane below.
    let pillar = scene.add_mesh(
        Mesh::cuboid("pillar", Vec3::new(1.0, 3.0, 1.0))
            .with_transform(Mat4::from_rotation_translation(
                Quat::from_rotation_y(0.4),
                Vec3::new(2.0, 0.5, -0.5),
            ))
            .with_color([0.25, 0.6, 0.9, 1.0]),
    );

    let panel = scene.add_mesh(
        Mesh::quad("panel", 3.0, 1.5)
            .with_translation(Vec3::new(0.0, 1.0, -3.0))
            .with_color([0.4, 0.85, 0.45, 0.8]),
    );

    scene.add_label(Label::new(Vec3::new(-2.0, 0.9, 0.0), "crate"));
    scene.add_label(Label::new(Vec3::new(2.0, 1.0, -0.5), "pillar (clipped)"));
    scene.add_label(
        Label::new(Vec3::new(0.0, 2.1, -3.0), "click a mesh to pick it")
            .with_color([0.9, 0.9, 0.6, 1.0])
            .with_font_size(16.0),
    );

    for mesh in [floor, crate_box, pillar, panel] {
        components.add_mesh(mesh);
    }
    // Keep everything below y = 1.2.
    components.add_clipping_plane(Plane::from_normal_and_point(
        Vec3::NEG_Y,
        Vec3::new(0.0, 1.2, 0.0),
    ));

    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenekit_core::{Container, HostEvents};
    use std::rc::Rc;

    #[test]
    fn registers_every_mesh_and_the_plane() {
        let components = Components::new(
            Rc::new(Container::new(640, 480)),
            Rc::new(HostEvents::new()),
        );
        let scene = build(&components);

        assert_eq!(components.meshes().len(), scene.meshes.len());
        assert_eq!(components.clipping_planes().len(), 1);
        assert_eq!(scene.visible_labels().count(), 3);
    }
}
