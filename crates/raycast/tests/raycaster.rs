use std::rc::Rc;

use glam::Vec3;
use scenekit_core::{Component, Disposable, HostEventKind, Plane};
use scenekit_raycast::SimpleRaycaster;
use scenekit_testkit::{two_wall_scene, wall, Harness};

// Off-center so the ray does not run along a quad diagonal.
const POINTER: (f64, f64) = (500.0, 250.0);

fn setup() -> (Harness, SimpleRaycaster) {
    let (scene, front, back) = two_wall_scene("picking");
    let harness = Harness::new(800, 600).with_scene(scene, 0.0);
    harness.components.add_mesh(front);
    harness.components.add_mesh(back);
    let raycaster = SimpleRaycaster::new(Rc::clone(&harness.components));
    harness.move_pointer(POINTER.0, POINTER.1);
    (harness, raycaster)
}

#[test]
fn pointer_ray_hits_nearest_registered_mesh() {
    let (_harness, raycaster) = setup();

    let hit = raycaster.cast_ray(None).expect("hit");
    assert_eq!(hit.mesh.name, "front");
    assert!((hit.point.z + 5.0).abs() < 1e-4);
    assert!(hit.distance > 5.0);
}

#[test]
fn all_hits_are_sorted_nearest_first() {
    let (_harness, raycaster) = setup();

    let hits = raycaster.cast_ray_all(None);
    let names: Vec<_> = hits.iter().map(|h| h.mesh.name.as_str()).collect();
    assert_eq!(names, vec!["front", "back"]);
    assert!(hits[0].distance < hits[1].distance);
}

#[test]
fn clipping_plane_reveals_mesh_behind() {
    let (harness, raycaster) = setup();
    // Keep only z < -7.
    harness
        .components
        .add_clipping_plane(Plane::from_normal_and_point(Vec3::NEG_Z, Vec3::new(0.0, 0.0, -7.0)));

    let hit = raycaster.cast_ray(None).expect("hit");
    assert_eq!(hit.mesh.name, "back");

    // Nothing survives once the back wall is cut away too.
    harness
        .components
        .add_clipping_plane(Plane::from_normal_and_point(Vec3::Z, Vec3::new(0.0, 0.0, -9.0)));
    assert!(raycaster.cast_ray(None).is_none());
}

#[test]
fn explicit_candidates_replace_registry() {
    let (_harness, raycaster) = setup();
    let other = wall("other", -3.0, 10.0);

    let hit = raycaster
        .cast_ray(Some(std::slice::from_ref(&other)))
        .expect("hit");
    assert!(Rc::ptr_eq(&hit.mesh, &other));

    assert!(raycaster.cast_ray(Some(&[])).is_none());
}

#[test]
fn no_camera_means_no_hit() {
    let (harness, raycaster) = setup();
    harness.components.set_camera(None);
    assert!(raycaster.cast_ray(None).is_none());
    assert!(raycaster.cast_ray_all(None).is_empty());
}

#[test]
fn explicit_ray_ignores_pointer_and_camera() {
    let (harness, raycaster) = setup();
    harness.components.set_camera(None);

    let hit = raycaster
        .cast_ray_from_vector(Vec3::new(0.5, 0.25, 10.0), Vec3::NEG_Z, None)
        .expect("hit");
    assert_eq!(hit.mesh.name, "front");
    assert!((hit.distance - 15.0).abs() < 1e-4);

    harness.move_pointer(0.0, 0.0);
    let again = raycaster
        .cast_ray_from_vector(Vec3::new(0.5, 0.25, 10.0), Vec3::NEG_Z, None)
        .expect("hit");
    assert_eq!(again.distance, hit.distance);
}

#[test]
fn handle_exposes_last_ray() {
    let (_harness, raycaster) = setup();
    raycaster.cast_ray(None);
    assert_eq!(raycaster.get().ray.origin, Vec3::ZERO);
    assert!(raycaster.get().ray.direction.z < 0.0);
    assert_eq!(raycaster.name(), "SimpleRaycaster");
}

#[test]
fn casting_while_handle_is_held_keeps_working() {
    let (_harness, raycaster) = setup();
    raycaster.cast_ray(None);
    let handle = raycaster.get();
    let aimed = handle.ray;

    let hit = raycaster.cast_ray_from_vector(Vec3::new(0.5, 0.25, 10.0), Vec3::NEG_Z, None);
    assert_eq!(hit.expect("hit").mesh.name, "front");
    assert!(raycaster.cast_ray(Some(&[])).is_none());
    assert_eq!(handle.ray, aimed);

    drop(handle);
    raycaster.cast_ray_from_vector(Vec3::new(0.5, 0.25, 10.0), Vec3::NEG_Z, Some(&[]));
    assert_eq!(raycaster.get().ray.origin, Vec3::new(0.5, 0.25, 10.0));
}

#[test]
fn ray_along_quad_edge_hits() {
    let (_harness, raycaster) = setup();
    let edge = wall("edge", -5.0, 4.0);

    let hit = raycaster
        .cast_ray_from_vector(Vec3::new(2.0, 0.5, 10.0), Vec3::NEG_Z, Some(&[edge]))
        .expect("edge hit");
    assert_eq!(hit.mesh.name, "edge");
    assert!((hit.distance - 15.0).abs() < 1e-4);
}

#[test]
fn dispose_releases_pointer_listeners() {
    let (harness, mut raycaster) = setup();
    assert_eq!(harness.events.listener_count(HostEventKind::Pointer), 1);

    raycaster.dispose();
    raycaster.dispose();
    assert_eq!(harness.events.listener_count(HostEventKind::Pointer), 0);
    assert_eq!(harness.events.listener_count(HostEventKind::Touch), 0);

    let before = raycaster.mouse().raw_position();
    harness.move_pointer(10.0, 10.0);
    assert_eq!(raycaster.mouse().raw_position(), before);
}
