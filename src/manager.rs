//! High-level input manager.
//!
//! [`InputManager`] runs the whole Linux pipeline behind one call:
//! discovery → materialization → multiplexer → event loop thread.
//!
//! Consumers only deal with [`EventReceiver`]s. Shutdown happens in a fixed
//! order: unsubscribe every handle, destroy the multiplexer, join the loop
//! thread, close the handles. Dropping the manager performs the same shutdown.
//!
//! # Example
//! ```no_run
//! use evmux::{EventFilter, InputConfig, InputManager};
//!
//! # fn main() -> evmux::Result<()> {
//! let mut input = InputManager::start(InputConfig::default())?;
//! for peri in input.peripherals() {
//!     println!("#{} {} {:?}", peri.id, peri.kind, peri.name);
//! }
//!
//! let mut keys = input.receiver()?.with_filter(EventFilter::Keys);
//! if let Some(event) = keys.recv() {
//!     println!("{:?}", event);
//! }
//! input.shutdown()?;
//! # Ok(())
//! # }
//! ```

use crate::backends::linux::{
    discover_peripherals_with, materialize, spawn_event_loop, DeviceHandleList, EventMultiplexer,
    PeripheralList,
};
use crate::config::InputConfig;
use crate::error::Result;
use crate::queue::EventReceiver;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{error, info, warn};

pub struct InputManager {
    config: InputConfig,
    peripherals: PeripheralList,
    handles: DeviceHandleList,
    mux: Arc<EventMultiplexer>,
    worker: Option<JoinHandle<Result<()>>>,
}

impl InputManager {
    /// Discover, open every classified peripheral and start the event loop.
    pub fn start(config: InputConfig) -> Result<Self> {
        let peripherals = discover_peripherals_with(&config)?;
        let handles = materialize(&peripherals)?;
        Self::with_handles(config, peripherals, handles)
    }

    /// Start the event loop over handles the caller already opened.
    pub fn with_handles(
        config: InputConfig,
        peripherals: PeripheralList,
        handles: DeviceHandleList,
    ) -> Result<Self> {
        let mux = Arc::new(EventMultiplexer::create_with(&config)?);
        mux.subscribe_many(&handles)?;
        let worker = spawn_event_loop(Arc::clone(&mux))?;

        info!(
            peripherals = peripherals.len(),
            watched = handles.len(),
            "input manager started"
        );
        Ok(Self {
            config,
            peripherals,
            handles,
            mux,
            worker: Some(worker),
        })
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// Everything discovery found, including unknown peripherals.
    pub fn peripherals(&self) -> &PeripheralList {
        &self.peripherals
    }

    /// Handles being watched. Empty after [`shutdown`](Self::shutdown).
    pub fn handles(&self) -> &DeviceHandleList {
        &self.handles
    }

    pub fn multiplexer(&self) -> &Arc<EventMultiplexer> {
        &self.mux
    }

    /// A new consumer of the event stream.
    pub fn receiver(&self) -> Result<EventReceiver> {
        self.mux.receiver()
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Stop the event loop and close every handle. Idempotent.
    ///
    /// Returns the loop's own error if it had stopped on a failed wait.
    pub fn shutdown(&mut self) -> Result<()> {
        let failures = self.mux.unsubscribe_all(&self.handles);
        if failures > 0 {
            warn!(failures, "some handles could not be unsubscribed");
        }
        self.mux.destroy();

        let outcome = match self.worker.take() {
            Some(worker) => match worker.join() {
                Ok(result) => result,
                Err(_) => {
                    error!("event loop thread panicked");
                    Ok(())
                }
            },
            None => Ok(()),
        };

        let closed = std::mem::take(&mut self.handles).free_all();
        if closed > 0 {
            info!(closed, "input manager shut down");
        }
        outcome
    }
}

impl Drop for InputManager {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!(error = %err, "event loop ended with an error");
        }
    }
}
