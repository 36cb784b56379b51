#![cfg(target_os = "linux")]

//! Linux evdev backend.
//!
//! The pipeline, in order:
//! - [`discovery`]: parse `/proc/bus/input/devices` into classified
//!   [`PeripheralDescriptor`]s
//! - [`handles`]: open the `eventN` node of every keyboard, mouse and gamepad
//! - [`multiplexer`]: wait on all open nodes with epoll, translate raw records
//!   ([`raw_event`]) and broadcast them
//!
//! [`caps`] holds the capability bitmap parsing and the kernel constants shared
//! by classification and translation.
//!
//! Most users should start with [`InputManager`](crate::manager::InputManager),
//! which wires the pipeline together.

pub mod caps;
pub mod discovery;
pub mod handles;
pub mod multiplexer;
pub mod raw_event;

pub use discovery::{
    discover_peripherals, discover_peripherals_with, PeripheralDescriptor, PeripheralList,
};
pub use handles::{materialize, materialize_kinds, DeviceHandle, DeviceHandleList};
pub use multiplexer::{spawn_event_loop, EventMultiplexer};
pub use raw_event::{translate, RawEvent};
