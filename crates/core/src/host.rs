//! Host event dispatch.
//!
//! [`HostEvents`] is the event target components attach listeners to
//! (window resize, pointer and touch input). The host feeds it from its event
//! loop; listeners run synchronously on dispatch.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use winit::dpi::{LogicalPosition, LogicalSize};
use winit::event::{TouchPhase, WindowEvent};

/// Event delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// The window (and usually the container) changed size.
    ///
    /// Listeners re-read [`Container::client_size`](crate::Container::client_size)
    /// rather than this payload, so the host must update the container before
    /// dispatching.
    Resized {
        /// New width in pixels.
        width: u32,
        /// New height in pixels.
        height: u32,
    },
    /// The pointer moved, in container-relative pixels.
    PointerMoved {
        /// Horizontal position.
        x: f64,
        /// Vertical position.
        y: f64,
    },
    /// A touch started or moved, in container-relative pixels.
    Touch {
        /// Horizontal position.
        x: f64,
        /// Vertical position.
        y: f64,
    },
}

/// Listener categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEventKind {
    /// [`HostEvent::Resized`].
    Resize,
    /// [`HostEvent::PointerMoved`].
    Pointer,
    /// [`HostEvent::Touch`].
    Touch,
}

impl HostEvent {
    /// Category this event is dispatched under.
    pub fn kind(&self) -> HostEventKind {
        match self {
            HostEvent::Resized { .. } => HostEventKind::Resize,
            HostEvent::PointerMoved { .. } => HostEventKind::Pointer,
            HostEvent::Touch { .. } => HostEventKind::Touch,
        }
    }

    /// Translate a winit window event into logical pixels using the
    /// window's `scale_factor`. Returns `None` for events no component
    /// listens to.
    pub fn from_window_event(event: &WindowEvent, scale_factor: f64) -> Option<Self> {
        match event {
            WindowEvent::Resized(size) => {
                let logical: LogicalSize<u32> = size.to_logical(scale_factor);
                Some(HostEvent::Resized {
                    width: logical.width,
                    height: logical.height,
                })
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical: LogicalPosition<f64> = position.to_logical(scale_factor);
                Some(HostEvent::PointerMoved {
                    x: logical.x,
                    y: logical.y,
                })
            }
            WindowEvent::Touch(touch) => match touch.phase {
                TouchPhase::Started | TouchPhase::Moved => {
                    let logical: LogicalPosition<f64> = touch.location.to_logical(scale_factor);
                    Some(HostEvent::Touch {
                        x: logical.x,
                        y: logical.y,
                    })
                }
                TouchPhase::Ended | TouchPhase::Cancelled => None,
            },
            _ => None,
        }
    }
}

/// Identifies a listener registered on [`HostEvents`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn(&HostEvent)>;

/// Event target for host-level input and window events.
///
/// On a resize, call [`Container::set_client_size`](crate::Container::set_client_size)
/// first and dispatch [`HostEvent::Resized`] after it.
pub struct HostEvents {
    listeners: RefCell<Vec<(ListenerId, HostEventKind, Listener)>>,
    next_id: Cell<u64>,
}

impl HostEvents {
    /// Create a dispatcher with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    /// Attach a listener for one event category.
    pub fn add_listener(
        &self,
        kind: HostEventKind,
        listener: impl Fn(&HostEvent) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners
            .borrow_mut()
            .push((id, kind, Rc::new(listener)));
        id
    }

    /// Detach a listener. Removing an unknown or already removed listener is
    /// a no-op that returns `false`.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener_id, _, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Deliver an event to every listener of its category, in registration
    /// order.
    pub fn dispatch(&self, event: &HostEvent) {
        let kind = event.kind();
        let matching: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, listener_kind, _)| *listener_kind == kind)
            .map(|(_, _, listener)| Rc::clone(listener))
            .collect();
        for listener in matching {
            listener(event);
        }
    }

    /// Translate and dispatch a winit window event. Returns whether anything
    /// was dispatched.
    pub fn dispatch_window_event(&self, event: &WindowEvent, scale_factor: f64) -> bool {
        match HostEvent::from_window_event(event, scale_factor) {
            Some(host_event) => {
                self.dispatch(&host_event);
                true
            }
            None => false,
        }
    }

    /// Number of listeners attached for a category.
    pub fn listener_count(&self, kind: HostEventKind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(_, listener_kind, _)| *listener_kind == kind)
            .count()
    }
}

impl Default for HostEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HostEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostEvents")
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}
