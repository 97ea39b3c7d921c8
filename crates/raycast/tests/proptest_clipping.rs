//! Property tests for clipping-plane filtering of raycasts.

use std::rc::Rc;

use glam::Vec3;
use proptest::prelude::*;
use scenekit_core::{Mesh, Plane};
use scenekit_raycast::{filter_clipping_planes, Intersection, RayQuery, SimpleRaycaster};
use scenekit_testkit::{two_wall_scene, Harness};

fn plane_strategy() -> impl Strategy<Value = Plane> {
    (-1.0f32..1.0, -1.0f32..1.0, -1.0f32..1.0, -12.0f32..12.0)
        .prop_map(|(x, y, z, constant)| Plane::new(Vec3::new(x, y, z), constant))
}

fn point_strategy() -> impl Strategy<Value = Vec3> {
    (-20.0f32..20.0, -20.0f32..20.0, -20.0f32..20.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn setup(x: f64, y: f64) -> (Harness, SimpleRaycaster) {
    let (scene, front, back) = two_wall_scene("props");
    let harness = Harness::new(800, 600).with_scene(scene, 0.0);
    harness.components.add_mesh(front);
    harness.components.add_mesh(back);
    let raycaster = SimpleRaycaster::new(Rc::clone(&harness.components));
    harness.move_pointer(x, y);
    (harness, raycaster)
}

proptest! {
    /// Property: a returned hit always lies on the kept side of every plane
    #[test]
    fn hits_satisfy_every_plane(
        x in 0.0f64..800.0,
        y in 0.0f64..600.0,
        planes in prop::collection::vec(plane_strategy(), 0..4),
    ) {
        let (harness, raycaster) = setup(x, y);
        harness.components.set_clipping_planes(planes.clone());

        if let Some(hit) = raycaster.cast_ray(None) {
            for plane in &planes {
                prop_assert!(plane.distance_to_point(hit.point) > 0.0);
            }
        }
    }

    /// Property: an empty candidate set never hits
    #[test]
    fn empty_candidates_never_hit(x in 0.0f64..800.0, y in 0.0f64..600.0) {
        let (_harness, raycaster) = setup(x, y);
        prop_assert!(raycaster.cast_ray(Some(&[])).is_none());
    }

    /// Property: without planes the result equals the raw intersection
    #[test]
    fn no_planes_is_identity(x in 0.0f64..800.0, y in 0.0f64..600.0) {
        let (harness, raycaster) = setup(x, y);

        let camera = harness.components.camera().unwrap();
        let mut query = RayQuery::new();
        query.set_from_camera(raycaster.mouse().position(), &camera.borrow());
        let raw = query.intersect_objects(&harness.components.meshes());

        let filtered = raycaster.cast_ray_all(None);
        prop_assert_eq!(raw.len(), filtered.len());
        for (a, b) in raw.iter().zip(&filtered) {
            prop_assert_eq!(a.distance, b.distance);
            prop_assert!(Rc::ptr_eq(&a.mesh, &b.mesh));
        }
    }

    /// Property: the filter partitions hits by the positive-distance predicate
    #[test]
    fn filter_partitions_hits(
        points in prop::collection::vec(point_strategy(), 0..16),
        planes in prop::collection::vec(plane_strategy(), 0..4),
    ) {
        let mesh = Rc::new(Mesh::quad("q", 1.0, 1.0));
        let hits: Vec<Intersection> = points
            .iter()
            .map(|&point| Intersection {
                mesh: Rc::clone(&mesh),
                point,
                distance: point.length(),
                face_index: 0,
            })
            .collect();

        let kept = filter_clipping_planes(hits, &planes);
        let expected: Vec<Vec3> = points
            .into_iter()
            .filter(|p| planes.iter().all(|plane| plane.distance_to_point(*p) > 0.0))
            .collect();
        let kept_points: Vec<Vec3> = kept.iter().map(|h| h.point).collect();
        prop_assert_eq!(kept_points, expected);
    }
}
