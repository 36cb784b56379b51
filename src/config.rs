//! Runtime configuration.
//!
//! [`InputConfig`] collects every tunable of the discovery parser and the event
//! loop. All fields have defaults, so an empty TOML document is a valid config:
//!
//! ```toml
//! devices_list_path = "/proc/bus/input/devices"
//! event_dir = "/dev/input/"
//! max_peripherals = 99
//! queue_capacity = 5000
//! wait_timeout_ms = 250   # omit to block forever
//! ```
//!
//! Use [`InputConfig::load`] for files and [`InputConfig::from_toml_str`] for
//! embedded strings. Both validate the result.

use crate::error::{InputError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Kernel pseudo-file listing input devices, one record per device.
pub const DEFAULT_DEVICES_LIST_PATH: &str = "/proc/bus/input/devices";
/// Directory holding the `eventN` / `jsN` nodes.
pub const DEFAULT_EVENT_DIR: &str = "/dev/input/";
/// Discovery slot count. Records past this are not represented.
pub const DEFAULT_MAX_PERIPHERALS: usize = 99;
/// Scan window for a single line of the device list.
pub const DEFAULT_MAX_LINE_LEN: usize = 1024;
/// Growth step while reading the device list.
pub const DEFAULT_READ_CHUNK: usize = 4096;
/// Slots in the broadcast queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 5000;
/// Ready handles collected per readiness wait.
pub const DEFAULT_MAX_READY_EVENTS: usize = 64;
/// Retries of `EAGAIN`/`EINTR` while assembling one raw record.
pub const DEFAULT_READ_RETRY_LIMIT: usize = 1024;

/// Tunables for discovery and the event loop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Device list pseudo-file.
    pub devices_list_path: PathBuf,
    /// Prefix of resolved event node paths. Must end with `/`.
    pub event_dir: String,
    /// Maximum number of descriptors produced by one discovery call.
    pub max_peripherals: usize,
    /// Longest accepted device list line, terminator included.
    pub max_line_len: usize,
    /// Read size used while slurping the device list.
    pub read_chunk: usize,
    /// Broadcast queue capacity, in events.
    pub queue_capacity: usize,
    /// Maximum ready handles processed per wake.
    pub max_ready_events: usize,
    /// Readiness wait timeout. `None` blocks until a handle becomes ready.
    pub wait_timeout_ms: Option<u64>,
    /// Bound on `EINTR` retries while reading one raw record.
    pub read_retry_limit: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            devices_list_path: PathBuf::from(DEFAULT_DEVICES_LIST_PATH),
            event_dir: DEFAULT_EVENT_DIR.to_string(),
            max_peripherals: DEFAULT_MAX_PERIPHERALS,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            read_chunk: DEFAULT_READ_CHUNK,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_ready_events: DEFAULT_MAX_READY_EVENTS,
            wait_timeout_ms: None,
            read_retry_limit: DEFAULT_READ_RETRY_LIMIT,
        }
    }
}

impl InputConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: InputConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| InputError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject values the parser or the queue cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_peripherals == 0 {
            return Err(InputError::InvalidConfig("max_peripherals must be > 0".into()));
        }
        if self.max_line_len < 2 {
            return Err(InputError::InvalidConfig("max_line_len must be >= 2".into()));
        }
        if self.read_chunk == 0 {
            return Err(InputError::InvalidConfig("read_chunk must be > 0".into()));
        }
        // tokio's broadcast channel panics outside 1..=usize::MAX/2
        if self.queue_capacity == 0 || self.queue_capacity > usize::MAX / 2 {
            return Err(InputError::InvalidConfig(format!(
                "queue_capacity {} out of range",
                self.queue_capacity
            )));
        }
        if self.max_ready_events == 0 || self.max_ready_events > i32::MAX as usize {
            return Err(InputError::InvalidConfig(format!(
                "max_ready_events {} out of range",
                self.max_ready_events
            )));
        }
        if !self.event_dir.ends_with('/') {
            return Err(InputError::InvalidConfig(format!(
                "event_dir {:?} must end with '/'",
                self.event_dir
            )));
        }
        Ok(())
    }

    /// Readiness wait timeout as a [`Duration`].
    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_ms.map(Duration::from_millis)
    }
}
