//! Error type shared by discovery, materialization and the event multiplexer.
//!
//! Errors fall into two classes (see [`InputError::is_fatal`]):
//! - **fatal**: the operation that produced them cannot continue (the device list
//!   could not be read, an event node could not be opened, the readiness context
//!   failed). The caller decides whether that terminates the process.
//! - **reported**: the operation failed for one item but the subsystem is still
//!   usable (an unsubscribe failed, the queue was already closed, ...).
//!
//! Nothing in this crate exits the process on its own.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, InputError>;

#[derive(Debug, Error)]
pub enum InputError {
    /// The device list pseudo-file could not be opened.
    #[error("could not open device list {path:?}")]
    DeviceListOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading the device list pseudo-file failed midway.
    #[error("could not read device list {path:?}")]
    DeviceListRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A line of the device list exceeded the scan window without a terminator.
    #[error("device list has no line terminator within {max_len} bytes (at byte {offset})")]
    NoRecordTerminator { max_len: usize, offset: usize },

    /// Opening a classified peripheral's event node failed.
    #[error("could not open event node {path:?} for peripheral {id}")]
    OpenDevice {
        id: usize,
        path: String,
        #[source]
        source: io::Error,
    },

    /// A handle with this id is already present in the list.
    #[error("device handle {0} is already present")]
    DuplicateHandle(usize),

    /// Creating the readiness context (epoll / wake eventfd) failed.
    #[error("could not create readiness context")]
    ReadinessContext(#[source] io::Error),

    /// Waiting on the readiness context failed.
    #[error("readiness wait failed")]
    Wait(#[source] io::Error),

    /// Registering a device handle for readiness failed.
    #[error("could not subscribe device {id}")]
    Subscribe {
        id: usize,
        #[source]
        source: io::Error,
    },

    /// Deregistering a device handle failed.
    #[error("could not unsubscribe device {id}")]
    Unsubscribe {
        id: usize,
        #[source]
        source: io::Error,
    },

    /// The broadcast queue was closed (the multiplexer was destroyed).
    #[error("event queue is closed")]
    QueueClosed,

    /// Spawning the event loop thread failed.
    #[error("could not spawn event loop thread")]
    Spawn(#[source] io::Error),

    /// Configuration could not be read from disk.
    #[error("could not read config {path:?}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration TOML was malformed.
    #[error("malformed config")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration values are out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl InputError {
    /// Whether the failing operation had to stop as a whole.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            InputError::DeviceListOpen { .. }
                | InputError::DeviceListRead { .. }
                | InputError::NoRecordTerminator { .. }
                | InputError::OpenDevice { .. }
                | InputError::ReadinessContext(_)
                | InputError::Wait(_)
                | InputError::Subscribe { .. }
                | InputError::Spawn(_)
        )
    }
}
