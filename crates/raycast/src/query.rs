//! Ray queries against meshes.

use std::rc::Rc;

use glam::{Vec2, Vec3};
use scenekit_core::{Camera, Mesh, Ray};

/// One hit of a [`RayQuery`].
#[derive(Debug, Clone)]
pub struct Intersection {
    /// Mesh that was hit.
    pub mesh: Rc<Mesh>,
    /// World-space hit point.
    pub point: Vec3,
    /// Distance from the ray origin.
    pub distance: f32,
    /// Triangle index inside the mesh.
    pub face_index: usize,
}

/// A re-aimable ray with distance bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct RayQuery {
    /// Current ray.
    pub ray: Ray,
    /// Hits closer than this are ignored.
    pub near: f32,
    /// Hits farther than this are ignored.
    pub far: f32,
}

impl Default for RayQuery {
    fn default() -> Self {
        Self {
            ray: Ray::default(),
            near: 0.0,
            far: f32::INFINITY,
        }
    }
}

impl RayQuery {
    /// Create an unbounded query along `-Z`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Aim along an explicit ray. `direction` is normalized.
    pub fn set(&mut self, origin: Vec3, direction: Vec3) {
        self.ray = Ray::new(origin, direction);
    }

    /// Aim from the camera through a point in normalized device coordinates.
    pub fn set_from_camera(&mut self, ndc: Vec2, camera: &Camera) {
        self.ray = camera.ray_from_ndc(ndc);
    }

    /// Every hit on `meshes`, nearest first. Hits at equal distance keep the
    /// order of `meshes`.
    pub fn intersect_objects(&self, meshes: &[Rc<Mesh>]) -> Vec<Intersection> {
        let mut hits: Vec<Intersection> = meshes
            .iter()
            .flat_map(|mesh| {
                mesh.raycast(&self.ray, self.near, self.far)
                    .into_iter()
                    .map(move |hit| Intersection {
                        mesh: Rc::clone(mesh),
                        point: hit.point,
                        distance: hit.distance,
                        face_index: hit.face_index,
                    })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}
