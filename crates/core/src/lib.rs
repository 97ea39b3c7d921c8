#![warn(missing_docs)]
//! Core primitives shared across the workspace: the host registry, host
//! event dispatch, capability traits and the small engine surface (camera,
//! scene, meshes, rays and planes) the components are built on.

pub mod camera;
pub mod component;
pub mod components;
pub mod config;
pub mod container;
pub mod event;
pub mod geometry;
pub mod host;
pub mod mesh;
pub mod scene;

use std::cell::RefCell;
use std::rc::Rc;

pub use camera::Camera;
pub use component::{Component, Disposable, Resizeable, Updateable};
pub use components::Components;
pub use config::{ConfigError, RendererParameters};
pub use container::{Container, Layer, LayerId, LayerPosition, LayerStyle};
pub use event::{Event, HandlerId};
pub use geometry::{ray_triangle, Aabb, Plane, Ray};
pub use host::{HostEvent, HostEventKind, HostEvents, ListenerId};
pub use mesh::{Mesh, MeshHit};
pub use scene::{Label, Scene};

/// Single-threaded shared, mutable handle used for host-owned objects
/// (scenes, cameras) that components read but never own.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wrap a value in a [`Shared`] handle.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}
