//! Bounded broadcast queue for [`EngineEvent`]s.
//!
//! One producer (the event loop) publishes, any number of [`EventReceiver`]s
//! consume. Every receiver sees every event published after it was created
//! (fan-out, not work stealing). The ring is backed by `tokio::sync::broadcast`;
//! no async runtime is involved, all operations here are synchronous.
//!
//! ## Lifecycle
//! - [`EventQueue::close`] stops all future sends. Receivers still drain what was
//!   already buffered, then report [`TryRecvError::Closed`].
//! - An [`EventSender`] can be released on its own; sending through a released
//!   sender reports [`SendError::Released`] instead of touching the queue.
//!
//! ## Overflow
//! The queue has a fixed number of slots. A receiver that falls more than
//! `capacity` events behind loses the oldest ones; the loss is logged and the
//! receiver resumes with the oldest event still buffered.
//!
//! ## Filters
//! Receivers can be narrowed with an [`EventFilter`]; events that do not pass
//! are skipped on receive.

use crate::error::{InputError, Result};
use crate::event::{EngineEvent, EventKind};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::warn;

/// Why [`EventSender::send`] did not publish.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("event queue is closed")]
    Closed,
    #[error("event sender was released")]
    Released,
}

/// Why [`EventReceiver::try_recv`] returned no event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TryRecvError {
    #[error("no event buffered")]
    Empty,
    #[error("event queue is closed")]
    Closed,
}

/// Selects which events a receiver yields.
///
/// Device notifications (`DeviceAdded` / `DeviceRemoved`) pass every category
/// filter so consumers always learn about unplugged peripherals.
#[derive(Clone, Copy, Debug, Default)]
pub enum EventFilter {
    #[default]
    All,
    /// Keyboard keys only.
    Keys,
    /// Mouse buttons, motion and wheel.
    Mouse,
    /// Gamepad buttons and axes.
    Gamepad,
    /// Everything from one peripheral.
    Device(usize),
    Custom(fn(&EngineEvent) -> bool),
}

impl EventFilter {
    pub fn accepts(&self, event: &EngineEvent) -> bool {
        let device_note = matches!(event.kind, EventKind::DeviceAdded | EventKind::DeviceRemoved);
        match *self {
            EventFilter::All => true,
            EventFilter::Keys => device_note || matches!(event.kind, EventKind::Key { .. }),
            EventFilter::Mouse => {
                device_note
                    || matches!(
                        event.kind,
                        EventKind::MouseButton { .. }
                            | EventKind::MouseMove { .. }
                            | EventKind::MouseWheel { .. }
                    )
            }
            EventFilter::Gamepad => {
                device_note
                    || matches!(
                        event.kind,
                        EventKind::GamepadButton { .. } | EventKind::GamepadAxis { .. }
                    )
            }
            EventFilter::Device(id) => event.device_id == id,
            EventFilter::Custom(f) => f(event),
        }
    }
}

struct Shared {
    // `None` once closed; dropping the last tokio sender is what lets receivers
    // observe closure after draining.
    tx: RwLock<Option<broadcast::Sender<EngineEvent>>>,
    capacity: usize,
}

impl Shared {
    fn is_closed(&self) -> bool {
        self.tx
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

/// The queue itself. Dropping it does not close it; call [`EventQueue::close`].
#[derive(Clone)]
pub struct EventQueue {
    shared: Arc<Shared>,
}

impl EventQueue {
    /// Create a queue with `capacity` slots.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 || capacity > usize::MAX / 2 {
            return Err(InputError::InvalidConfig(format!(
                "queue capacity {capacity} out of range"
            )));
        }
        let (tx, _) = broadcast::channel(capacity);
        Ok(Self {
            shared: Arc::new(Shared {
                tx: RwLock::new(Some(tx)),
                capacity,
            }),
        })
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// A new producer handle.
    pub fn sender(&self) -> EventSender {
        EventSender {
            shared: Some(Arc::clone(&self.shared)),
        }
    }

    /// A new consumer handle. Fails once the queue is closed.
    pub fn receiver(&self) -> Result<EventReceiver> {
        let guard = self.shared.tx.read().unwrap_or_else(PoisonError::into_inner);
        let tx = guard.as_ref().ok_or(InputError::QueueClosed)?;
        Ok(EventReceiver {
            rx: tx.subscribe(),
            filter: EventFilter::All,
        })
    }

    /// Stop accepting events. Idempotent.
    pub fn close(&self) {
        self.shared
            .tx
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }
}

/// Producer handle.
#[derive(Clone)]
pub struct EventSender {
    shared: Option<Arc<Shared>>,
}

impl EventSender {
    /// Publish one event to every current receiver.
    ///
    /// An open queue without receivers accepts and discards the event.
    pub fn send(&self, event: &EngineEvent) -> std::result::Result<(), SendError> {
        let shared = self.shared.as_ref().ok_or(SendError::Released)?;
        let guard = shared.tx.read().unwrap_or_else(PoisonError::into_inner);
        let tx = guard.as_ref().ok_or(SendError::Closed)?;
        // Err only means nobody is subscribed right now.
        let _ = tx.send(*event);
        Ok(())
    }

    /// Detach from the queue. Later sends report [`SendError::Released`].
    pub fn release(&mut self) {
        self.shared = None;
    }

    pub fn is_released(&self) -> bool {
        self.shared.is_none()
    }

    /// Whether sends would currently fail.
    pub fn is_closed(&self) -> bool {
        self.shared.as_ref().map_or(true, |s| s.is_closed())
    }
}

/// Consumer handle.
pub struct EventReceiver {
    rx: broadcast::Receiver<EngineEvent>,
    filter: EventFilter,
}

impl EventReceiver {
    /// Only yield events accepted by `filter`.
    pub fn with_filter(mut self, filter: EventFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Next buffered event, without blocking.
    pub fn try_recv(&mut self) -> std::result::Result<EngineEvent, TryRecvError> {
        loop {
            match self.rx.try_recv() {
                Ok(event) if self.filter.accepts(&event) => return Ok(event),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Empty) => return Err(TryRecvError::Empty),
                Err(broadcast::error::TryRecvError::Closed) => return Err(TryRecvError::Closed),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "event receiver lagged behind, oldest events dropped");
                }
            }
        }
    }

    /// Next event, blocking the calling thread. `None` once the queue is closed
    /// and drained.
    ///
    /// Must not be called from inside an async runtime.
    pub fn recv(&mut self) -> Option<EngineEvent> {
        loop {
            match self.rx.blocking_recv() {
                Ok(event) if self.filter.accepts(&event) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event receiver lagged behind, oldest events dropped");
                }
            }
        }
    }

    /// Drain everything currently buffered.
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.try_recv() {
            out.push(event);
        }
        out
    }

    /// Detach this consumer. Other receivers and the producer are unaffected.
    pub fn close(self) {}
}
