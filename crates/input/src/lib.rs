#![warn(missing_docs)]
//! Pointer tracking over a container.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::{DVec2, Vec2};
use scenekit_core::{Container, Disposable, HostEvent, HostEventKind, HostEvents, ListenerId};
use tracing::debug;

/// Tracks the last pointer position over a container.
///
/// The pixel position is stored as received; [`Mouse::position`] normalizes
/// it against the container size at read time, so a resize between the
/// event and the read is taken into account.
#[derive(Debug)]
pub struct Mouse {
    container: Rc<Container>,
    events: Rc<HostEvents>,
    raw: Rc<Cell<Option<DVec2>>>,
    listeners: RefCell<Vec<ListenerId>>,
}

impl Mouse {
    /// Start listening to pointer and touch events.
    pub fn new(container: Rc<Container>, events: Rc<HostEvents>) -> Self {
        let raw = Rc::new(Cell::new(None));

        let listeners = [HostEventKind::Pointer, HostEventKind::Touch]
            .into_iter()
            .map(|kind| {
                let raw = Rc::clone(&raw);
                events.add_listener(kind, move |event| match *event {
                    HostEvent::PointerMoved { x, y } | HostEvent::Touch { x, y } => {
                        raw.set(Some(DVec2::new(x, y)));
                    }
                    HostEvent::Resized { .. } => {}
                })
            })
            .collect();

        Self {
            container,
            events,
            raw,
            listeners: RefCell::new(listeners),
        }
    }

    /// Last pointer position in container pixels, `None` before any input.
    pub fn raw_position(&self) -> Option<DVec2> {
        self.raw.get()
    }

    /// Last pointer position in normalized device coordinates: `x` grows to
    /// the right, `y` grows upwards, both span `[-1, 1]` over the container.
    /// `(0, 0)` before any input.
    pub fn position(&self) -> Vec2 {
        let Some(raw) = self.raw.get() else {
            return Vec2::ZERO;
        };
        let size = self.container.client_size();
        normalize(raw, size.x, size.y)
    }

    /// Whether the listeners are still attached.
    pub fn is_listening(&self) -> bool {
        !self.listeners.borrow().is_empty()
    }
}

fn normalize(raw: DVec2, width: u32, height: u32) -> Vec2 {
    // Zero-sized axes map to the center instead of dividing by zero.
    let x = if width == 0 {
        0.0
    } else {
        raw.x / f64::from(width) * 2.0 - 1.0
    };
    let y = if height == 0 {
        0.0
    } else {
        -(raw.y / f64::from(height)) * 2.0 + 1.0
    };
    Vec2::new(x as f32, y as f32)
}

impl Disposable for Mouse {
    fn dispose(&mut self) {
        let listeners: Vec<ListenerId> = self.listeners.borrow_mut().drain(..).collect();
        if listeners.is_empty() {
            return;
        }
        for id in listeners {
            self.events.remove_listener(id);
        }
        debug!("Pointer tracker detached");
    }
}
