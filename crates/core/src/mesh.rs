//! Triangle meshes placed in world space.

use glam::{Mat4, Vec3};

use crate::geometry::{ray_triangle, Aabb, Ray};

/// Indexed triangle mesh with a world transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Name used in logs and hit reports.
    pub name: String,
    /// Local-space vertex positions.
    pub positions: Vec<Vec3>,
    /// Triangle list indices into `positions`.
    pub indices: Vec<u32>,
    /// Local to world transform.
    pub transform: Mat4,
    /// Base color (RGBA).
    pub color: [f32; 4],
    /// Hidden meshes are neither drawn nor hit.
    pub visible: bool,
}

/// One triangle hit on a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshHit {
    /// World-space hit point.
    pub point: Vec3,
    /// Distance from the ray origin.
    pub distance: f32,
    /// Index of the triangle in the index list.
    pub face_index: usize,
}

impl Mesh {
    /// Create a mesh from local positions and triangle indices.
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            positions,
            indices,
            transform: Mat4::IDENTITY,
            color: [0.8, 0.8, 0.8, 1.0],
            visible: true,
        }
    }

    /// Axis-aligned box centered on the local origin.
    pub fn cuboid(name: impl Into<String>, size: Vec3) -> Self {
        let h = size * 0.5;
        let positions = vec![
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        #[rustfmt::skip]
        let indices = vec![
            4, 5, 6, 4, 6, 7, // +Z
            1, 0, 3, 1, 3, 2, // -Z
            5, 1, 2, 5, 2, 6, // +X
            0, 4, 7, 0, 7, 3, // -X
            7, 6, 2, 7, 2, 3, // +Y
            0, 1, 5, 0, 5, 4, // -Y
        ];
        Self::new(name, positions, indices)
    }

    /// Square in the local XY plane facing +Z.
    pub fn quad(name: impl Into<String>, width: f32, height: f32) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        let positions = vec![
            Vec3::new(-hw, -hh, 0.0),
            Vec3::new(hw, -hh, 0.0),
            Vec3::new(hw, hh, 0.0),
            Vec3::new(-hw, hh, 0.0),
        ];
        Self::new(name, positions, vec![0, 1, 2, 0, 2, 3])
    }

    /// Builder: set the world transform.
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    /// Builder: translate in world space.
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.transform = Mat4::from_translation(translation) * self.transform;
        self
    }

    /// Builder: set the color.
    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    /// Number of complete triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// World-space corners of triangle `face`. `None` if an index is out of
    /// range.
    pub fn world_triangle(&self, face: usize) -> Option<[Vec3; 3]> {
        let base = face * 3;
        let corner = |offset: usize| -> Option<Vec3> {
            let index = *self.indices.get(base + offset)? as usize;
            let local = *self.positions.get(index)?;
            Some(self.transform.transform_point3(local))
        };
        Some([corner(0)?, corner(1)?, corner(2)?])
    }

    /// World-space bounding box.
    pub fn world_bounds(&self) -> Option<Aabb> {
        Aabb::from_points(
            self.positions
                .iter()
                .map(|p| self.transform.transform_point3(*p)),
        )
    }

    /// Every triangle hit within `[near, far]`, in index order.
    pub fn raycast(&self, ray: &Ray, near: f32, far: f32) -> Vec<MeshHit> {
        if !self.visible {
            return Vec::new();
        }

        match self.world_bounds() {
            Some(bounds) if bounds.ray_intersection(ray).is_some() => {}
            _ => return Vec::new(),
        }

        (0..self.triangle_count())
            .filter_map(|face| {
                let [a, b, c] = self.world_triangle(face)?;
                let distance = ray_triangle(ray, a, b, c)?;
                (near..=far).contains(&distance).then(|| MeshHit {
                    point: ray.at(distance),
                    distance,
                    face_index: face,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_is_hit_on_both_faces() {
        let cube = Mesh::cuboid("cube", Vec3::splat(2.0)).with_translation(Vec3::new(0.0, 0.0, -5.0));
        let ray = Ray::new(Vec3::new(0.3, -0.2, 0.0), Vec3::NEG_Z);

        let mut hits = cube.raycast(&ray, 0.0, f32::INFINITY);
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        assert_eq!(hits.len(), 2);
        assert!((hits[0].distance - 4.0).abs() < 1e-4);
        assert!((hits[1].distance - 6.0).abs() < 1e-4);
        assert!((hits[0].point - Vec3::new(0.3, -0.2, -4.0)).length() < 1e-4);
    }

    #[test]
    fn far_limit_and_visibility() {
        let mut quad = Mesh::quad("quad", 2.0, 2.0).with_translation(Vec3::new(0.0, 0.0, -10.0));
        let ray = Ray::new(Vec3::new(0.5, -0.25, 0.0), Vec3::NEG_Z);

        assert!(quad.raycast(&ray, 0.0, 5.0).is_empty());
        assert_eq!(quad.raycast(&ray, 0.0, 20.0).len(), 1);

        quad.visible = false;
        assert!(quad.raycast(&ray, 0.0, 20.0).is_empty());
    }

    #[test]
    fn world_bounds_follow_transform() {
        let quad = Mesh::quad("quad", 2.0, 4.0).with_translation(Vec3::new(1.0, 0.0, 0.0));
        let bounds = quad.world_bounds().expect("bounds");
        assert_eq!(bounds.min, Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(2.0, 2.0, 0.0));
    }
}
