#![warn(missing_docs)]
//! Pointer and explicit-ray picking against registered meshes.

pub mod query;
pub mod raycaster;

pub use query::{Intersection, RayQuery};
pub use raycaster::{filter_clipping_planes, SimpleRaycaster};
