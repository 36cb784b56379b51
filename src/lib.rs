//! evmux: input peripheral discovery and event multiplexing.
//!
//! Finds keyboards, mice and gamepads, opens their event nodes and turns their
//! raw record streams into one typed, broadcast stream of [`EngineEvent`]s.
//!
//! - [`backends::linux`]: discovery from `/proc/bus/input/devices`, device
//!   handles and the epoll [`EventMultiplexer`](backends::linux::EventMultiplexer)
//! - [`queue`]: the bounded fan-out queue consumers read from
//! - [`event`] / [`keys`]: the engine event vocabulary
//! - [`manager`]: [`InputManager`], the whole pipeline behind one call
//!
//! # Example
//! ```no_run
//! use evmux::{InputConfig, InputManager};
//!
//! # fn main() -> evmux::Result<()> {
//! let mut input = InputManager::start(InputConfig::default())?;
//! let mut rx = input.receiver()?;
//! while let Some(event) = rx.recv() {
//!     println!("device {} -> {:?}", event.device_id, event.kind);
//! }
//! input.shutdown()?;
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod keys;
#[cfg(target_os = "linux")]
pub mod manager;
pub mod queue;
pub mod text;

pub use config::InputConfig;
pub use device::{PeripheralKind, PeripheralKinds};
pub use error::{InputError, Result};
pub use event::*;
pub use keys::Key;
#[cfg(target_os = "linux")]
pub use manager::InputManager;
pub use queue::{EventFilter, EventQueue, EventReceiver, EventSender, SendError, TryRecvError};
