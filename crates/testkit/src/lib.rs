#![warn(missing_docs)]
//! Test surfaces and fixtures: recording stand-ins for the GPU surfaces and
//! a host harness wiring a registry to a container and event dispatcher.

mod fixtures;
mod recording;

pub use fixtures::*;
pub use recording::*;
