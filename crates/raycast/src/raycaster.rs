//! Pointer-driven raycaster component.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use glam::Vec3;
use scenekit_core::{Component, Components, Disposable, Mesh, Plane, Ray};
use scenekit_input::Mouse;
use tracing::{info, trace};

use crate::query::{Intersection, RayQuery};

/// Keep the hits whose point lies strictly on the positive side of every
/// plane. An empty plane set keeps everything.
pub fn filter_clipping_planes(hits: Vec<Intersection>, planes: &[Plane]) -> Vec<Intersection> {
    if planes.is_empty() {
        return hits;
    }
    hits.into_iter()
        .filter(|hit| planes.iter().all(|plane| plane.keeps(hit.point)))
        .collect()
}

/// Finds the nearest mesh under the pointer, or along an explicit ray,
/// ignoring hits cut away by the registry's clipping planes.
#[derive(Debug)]
pub struct SimpleRaycaster {
    enabled: bool,
    components: Rc<Components>,
    mouse: Mouse,
    query: RefCell<RayQuery>,
}

impl SimpleRaycaster {
    /// Create a raycaster tracking the pointer over the registry container.
    pub fn new(components: Rc<Components>) -> Self {
        let mouse = Mouse::new(
            Rc::clone(components.container()),
            Rc::clone(components.events()),
        );
        info!("Raycaster created");
        Self {
            enabled: true,
            components,
            mouse,
            query: RefCell::new(RayQuery::new()),
        }
    }

    /// Pointer tracker feeding the camera ray.
    pub fn mouse(&self) -> &Mouse {
        &self.mouse
    }

    /// Nearest unclipped hit under the pointer. `candidates` defaults to the
    /// registry meshes. `None` without a camera or without a surviving hit.
    pub fn cast_ray(&self, candidates: Option<&[Rc<Mesh>]>) -> Option<Intersection> {
        self.cast_ray_all(candidates).into_iter().next()
    }

    /// Every unclipped hit under the pointer, nearest first.
    pub fn cast_ray_all(&self, candidates: Option<&[Rc<Mesh>]>) -> Vec<Intersection> {
        let Some(camera) = self.components.camera() else {
            trace!("No camera registered, skipping raycast");
            return Vec::new();
        };
        let mut query = self.query.borrow().clone();
        query.set_from_camera(self.mouse.position(), &camera.borrow());
        self.intersect(query, candidates)
    }

    /// Nearest unclipped hit along an explicit ray. Pointer and camera are
    /// not consulted.
    pub fn cast_ray_from_vector(
        &self,
        origin: Vec3,
        direction: Vec3,
        candidates: Option<&[Rc<Mesh>]>,
    ) -> Option<Intersection> {
        let mut query = self.query.borrow().clone();
        query.ray = Ray::new(origin, direction);
        self.intersect(query, candidates).into_iter().next()
    }

    fn intersect(&self, query: RayQuery, candidates: Option<&[Rc<Mesh>]>) -> Vec<Intersection> {
        let registered;
        let meshes = match candidates {
            Some(meshes) => meshes,
            None => {
                registered = self.components.meshes();
                registered.as_slice()
            }
        };

        let hits = query.intersect_objects(meshes);
        // A handle from `get()` may still be alive; the stored query then
        // keeps its previous aim.
        match self.query.try_borrow_mut() {
            Ok(mut stored) => *stored = query,
            Err(_) => trace!("Ray query handle in use, last ray not stored"),
        }
        let planes = self.components.clipping_planes();
        let total = hits.len();
        let hits = filter_clipping_planes(hits, &planes);
        trace!(
            candidates = meshes.len(),
            hits = total,
            kept = hits.len(),
            planes = planes.len(),
            "Raycast"
        );
        hits
    }
}

impl Component for SimpleRaycaster {
    type Handle<'a> = Ref<'a, RayQuery>;

    fn name(&self) -> &str {
        "SimpleRaycaster"
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn get(&self) -> Self::Handle<'_> {
        self.query.borrow()
    }
}

impl Disposable for SimpleRaycaster {
    fn dispose(&mut self) {
        if !self.mouse.is_listening() {
            return;
        }
        self.mouse.dispose();
        info!("Raycaster disposed");
    }
}
