//! Capability traits implemented by components.
//!
//! Components compose the capabilities they need instead of inheriting from
//! a common base: a renderer is `Updateable + Resizeable + Disposable`, a
//! raycaster only `Disposable`.

use anyhow::Result;
use glam::UVec2;

use crate::event::Event;

/// Base contract shared by every component registered with a host.
pub trait Component {
    /// Handle returned by [`Component::get`], usually the wrapped engine object.
    type Handle<'a>
    where
        Self: 'a;

    /// Human-readable component name.
    fn name(&self) -> &str;

    /// Whether the component currently reacts to updates.
    fn enabled(&self) -> bool;

    /// Enable or disable the component.
    fn set_enabled(&mut self, enabled: bool);

    /// Expose the wrapped engine object for advanced callers.
    fn get(&self) -> Self::Handle<'_>;
}

/// Components that hold resources which must be released explicitly.
pub trait Disposable {
    /// Release every resource. Calling it twice must not panic.
    fn dispose(&mut self);
}

/// Components driven once per frame by the host loop.
pub trait Updateable: Sized {
    /// Advance one frame. `delta` is the frame time in seconds.
    fn update(&mut self, delta: f32) -> Result<()>;

    /// Triggered at the start of every enabled update.
    fn on_before_update(&self) -> &Event<Self>;

    /// Triggered at the end of every update that completed its work.
    fn on_after_update(&self) -> &Event<Self>;
}

/// Components whose output follows the size of a container.
pub trait Resizeable: Sized {
    /// Re-read the container size and apply it.
    fn resize(&mut self);

    /// Current size in pixels, queried from the live surface.
    fn get_size(&self) -> UVec2;

    /// Triggered after every resize.
    fn on_resize(&self) -> &Event<Self>;
}
