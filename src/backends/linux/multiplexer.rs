//! epoll based event multiplexer.
//!
//! [`EventMultiplexer`] watches any number of [`DeviceHandle`]s, reads raw
//! records from whichever become readable, translates them with
//! [`translate`](super::raw_event::translate) and publishes the result on its
//! [`EventQueue`].
//!
//! ## Lifecycle
//! - **Idle**: created, nothing subscribed. [`run`](EventMultiplexer::run) would
//!   just wait.
//! - **Watching**: at least one handle subscribed; `run` (usually on the thread
//!   started by [`spawn_event_loop`]) publishes events.
//! - **Closed**: [`destroy`](EventMultiplexer::destroy) closed the queue. `run`
//!   returns `Ok(())`, receivers drain what is buffered and then see
//!   [`TryRecvError::Closed`](crate::queue::TryRecvError::Closed).
//!
//! ## Threading
//! The multiplexer is `Send + Sync` and meant to be shared through an `Arc`:
//! one thread runs the loop, another subscribes and unsubscribes while it waits.
//! Two threads must not (un)subscribe the same handle concurrently.
//!
//! ## Example
//! ```no_run
//! use evmux::backends::linux::{discover_peripherals, materialize, spawn_event_loop, EventMultiplexer};
//! use std::sync::Arc;
//!
//! # fn main() -> evmux::Result<()> {
//! let peripherals = discover_peripherals()?;
//! let handles = materialize(&peripherals)?;
//!
//! let mux = Arc::new(EventMultiplexer::create()?);
//! let mut rx = mux.receiver()?;
//! mux.subscribe_many(&handles)?;
//! let worker = spawn_event_loop(Arc::clone(&mux))?;
//!
//! if let Some(event) = rx.recv() {
//!     println!("{:?}", event.event_type());
//! }
//!
//! mux.unsubscribe_all(&handles);
//! mux.destroy();
//! let _ = worker.join();
//! handles.free_all();
//! # Ok(())
//! # }
//! ```

use super::handles::{DeviceHandle, DeviceHandleList};
use super::raw_event::{translate, RawEvent};
use crate::config::InputConfig;
use crate::device::{PeripheralKind, PeripheralKinds};
use crate::error::{InputError, Result};
use crate::event::{EngineEvent, EventKind, Timestamp};
use crate::queue::{EventQueue, EventReceiver, EventSender};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// epoll user data marking the wake eventfd. Device entries carry their fd.
const WAKE_TOKEN: u64 = u64::MAX;

/// Name of the thread started by [`spawn_event_loop`].
pub const EVENT_THREAD_NAME: &str = "input-events";

struct Watched {
    id: usize,
    kind: PeripheralKind,
    file: Arc<File>,
    /// Leading bytes of a record whose tail has not arrived yet.
    pending: Vec<u8>,
}

enum ReadOutcome {
    Record(RawEvent),
    /// Spurious readiness, nothing buffered.
    Nothing,
    /// Part of a record was read; the rest comes with a later readiness.
    Partial(usize),
    /// EOF or `ENODEV`: the device is gone.
    Gone,
    Failed(io::Error),
}

/// Readiness context, watch set and broadcast queue.
pub struct EventMultiplexer {
    epoll: OwnedFd,
    wake: OwnedFd,
    queue: EventQueue,
    sender: Mutex<EventSender>,
    watched: Mutex<HashMap<RawFd, Watched>>,
    max_ready_events: usize,
    wait_timeout: Option<Duration>,
    read_retry_limit: usize,
}

impl EventMultiplexer {
    /// Create with the default configuration.
    pub fn create() -> Result<Self> {
        Self::create_with(&InputConfig::default())
    }

    pub fn create_with(cfg: &InputConfig) -> Result<Self> {
        cfg.validate()?;

        // SAFETY: plain syscall; the result is checked before use.
        let epoll = unsafe { libc::epoll_create1(libc::EPOLL_CLOEXEC) };
        if epoll < 0 {
            return Err(InputError::ReadinessContext(io::Error::last_os_error()));
        }
        // SAFETY: `epoll` is a fresh descriptor nobody else owns.
        let epoll = unsafe { OwnedFd::from_raw_fd(epoll) };

        // SAFETY: as above.
        let wake = unsafe { libc::eventfd(0, libc::EFD_CLOEXEC | libc::EFD_NONBLOCK) };
        if wake < 0 {
            return Err(InputError::ReadinessContext(io::Error::last_os_error()));
        }
        // SAFETY: as above.
        let wake = unsafe { OwnedFd::from_raw_fd(wake) };

        epoll_ctl(&epoll, libc::EPOLL_CTL_ADD, wake.as_raw_fd(), libc::EPOLLIN as u32, WAKE_TOKEN)
            .map_err(InputError::ReadinessContext)?;

        let queue = EventQueue::new(cfg.queue_capacity)?;
        let sender = Mutex::new(queue.sender());

        debug!(capacity = cfg.queue_capacity, "event multiplexer created");
        Ok(Self {
            epoll,
            wake,
            queue,
            sender,
            watched: Mutex::new(HashMap::new()),
            max_ready_events: cfg.max_ready_events,
            wait_timeout: cfg.wait_timeout(),
            read_retry_limit: cfg.read_retry_limit,
        })
    }

    /// A new independent consumer. Sees every event published from now on.
    pub fn receiver(&self) -> Result<EventReceiver> {
        self.queue.receiver()
    }

    /// A producer handle on the same queue, for injecting events.
    pub fn sender(&self) -> Result<EventSender> {
        if self.queue.is_closed() {
            return Err(InputError::QueueClosed);
        }
        Ok(self.queue.sender())
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue.capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    /// Number of handles currently watched.
    pub fn watched_count(&self) -> usize {
        self.watched().len()
    }

    /// Whether this exact handle is in the watch set.
    pub fn is_watching(&self, handle: &DeviceHandle) -> bool {
        self.watched()
            .get(&handle.as_raw_fd())
            .is_some_and(|w| Arc::ptr_eq(&w.file, handle.shared_file()))
    }

    /// Start watching `handle` for readability.
    ///
    /// Subscribing a handle twice fails with the OS error (`EEXIST`).
    pub fn subscribe(&self, handle: &DeviceHandle) -> Result<()> {
        let fd = handle.as_raw_fd();
        let mut watched = self.watched();

        epoll_ctl(&self.epoll, libc::EPOLL_CTL_ADD, fd, libc::EPOLLIN as u32, fd as u64).map_err(
            |source| InputError::Subscribe {
                id: handle.id(),
                source,
            },
        )?;
        watched.insert(
            fd,
            Watched {
                id: handle.id(),
                kind: handle.kind(),
                file: Arc::clone(handle.shared_file()),
                pending: Vec::with_capacity(RawEvent::SIZE),
            },
        );

        debug!(id = handle.id(), kind = %handle.kind(), path = handle.path(), "subscribed");
        Ok(())
    }

    /// Subscribe every handle in `list`. Stops at the first failure, which names
    /// the failing id; handles subscribed before it stay subscribed.
    pub fn subscribe_many(&self, list: &DeviceHandleList) -> Result<()> {
        self.subscribe_kinds(list, PeripheralKinds::ALL)
    }

    /// Subscribe the handles in `list` whose kind is in `kinds`.
    pub fn subscribe_kinds(&self, list: &DeviceHandleList, kinds: PeripheralKinds) -> Result<()> {
        for handle in list.iter().filter(|h| kinds.includes(h.kind())) {
            self.subscribe(handle)?;
        }
        Ok(())
    }

    /// Stop watching `handle`. Returns `Ok(false)` if it was not watched.
    pub fn unsubscribe(&self, handle: &DeviceHandle) -> Result<bool> {
        let fd = handle.as_raw_fd();
        let mut watched = self.watched();

        let owned = watched
            .get(&fd)
            .is_some_and(|w| Arc::ptr_eq(&w.file, handle.shared_file()));
        if !owned {
            return Ok(false);
        }

        epoll_ctl(&self.epoll, libc::EPOLL_CTL_DEL, fd, 0, 0).map_err(|source| {
            InputError::Unsubscribe {
                id: handle.id(),
                source,
            }
        })?;
        watched.remove(&fd);

        debug!(id = handle.id(), path = handle.path(), "unsubscribed");
        Ok(true)
    }

    /// Unsubscribe every handle in `list`, continuing past failures.
    ///
    /// Returns the number of failures; `0` means every handle is unwatched now.
    pub fn unsubscribe_all(&self, list: &DeviceHandleList) -> usize {
        let mut failures = 0;
        for handle in list {
            if let Err(err) = self.unsubscribe(handle) {
                warn!(id = handle.id(), error = %err, "unsubscribe failed");
                failures += 1;
            }
        }
        failures
    }

    /// Run the event loop on the calling thread until the queue is closed.
    ///
    /// Returns `Ok(())` after [`destroy`](Self::destroy). A failing readiness
    /// wait (other than `EINTR`) ends the loop with [`InputError::Wait`].
    pub fn run(&self) -> Result<()> {
        let empty = libc::epoll_event { events: 0, u64: 0 };
        let mut ready = vec![empty; self.max_ready_events];
        let timeout = wait_timeout_ms(self.wait_timeout);

        info!(watched = self.watched_count(), "event loop started");
        while !self.queue.is_closed() {
            // SAFETY: `ready` holds `max_ready_events` initialised entries and
            // `max_ready_events` fits an i32 (checked by config validation).
            let n = unsafe {
                libc::epoll_wait(
                    self.epoll.as_raw_fd(),
                    ready.as_mut_ptr(),
                    self.max_ready_events as i32,
                    timeout,
                )
            };
            if n < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(InputError::Wait(err));
            }
            if n == 0 {
                thread::yield_now();
                continue;
            }

            for entry in &ready[..n as usize] {
                // copy out, the struct is packed on some targets
                let token = entry.u64;
                if token == WAKE_TOKEN {
                    self.drain_wake();
                    continue;
                }
                self.service(token as RawFd);
            }
        }
        info!("event loop stopped");
        Ok(())
    }

    /// Close the queue and release the internal sender. A running loop wakes
    /// up and returns. Idempotent.
    pub fn destroy(&self) {
        self.queue.close();
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .release();
        self.wake();
        debug!("event multiplexer destroyed");
    }

    fn watched(&self) -> MutexGuard<'_, HashMap<RawFd, Watched>> {
        self.watched.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn service(&self, fd: RawFd) {
        let mut watched = self.watched();
        let Some(w) = watched.get_mut(&fd) else {
            // unsubscribed after the wait returned
            return;
        };
        let (id, kind, file) = (w.id, w.kind, Arc::clone(&w.file));
        let mut pending = std::mem::take(&mut w.pending);
        drop(watched);

        let outcome = self.read_record(&file, &mut pending);
        if !pending.is_empty() {
            self.keep_pending(fd, &file, pending);
        }

        match outcome {
            ReadOutcome::Record(raw) => {
                if let Some(event) = translate(&raw, id) {
                    self.publish(&event);
                }
            }
            ReadOutcome::Nothing => trace!(id, "spurious readiness"),
            ReadOutcome::Partial(filled) => {
                trace!(id, filled, "record incomplete, waiting for the rest")
            }
            ReadOutcome::Gone => self.remove_device(fd, id, kind, &file),
            ReadOutcome::Failed(err) => warn!(id, error = %err, "device read failed"),
        }
    }

    /// Read one record, starting from the bytes left in `pending` by an earlier
    /// call.
    ///
    /// Returns `Partial` once the handle runs dry mid-record, with the bytes
    /// read so far back in `pending`. They are also kept when the read fails,
    /// so the stream stays aligned on record boundaries.
    fn read_record(&self, file: &File, pending: &mut Vec<u8>) -> ReadOutcome {
        let mut buf = [0u8; RawEvent::SIZE];
        let mut filled = pending.len().min(RawEvent::SIZE);
        buf[..filled].copy_from_slice(&pending[..filled]);
        pending.clear();
        let mut interrupts = 0;

        while filled < RawEvent::SIZE {
            let mut reader = file;
            match reader.read(&mut buf[filled..]) {
                Ok(0) => return ReadOutcome::Gone,
                Ok(n) => filled += n,
                Err(err) if err.raw_os_error() == Some(libc::ENODEV) => return ReadOutcome::Gone,
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                    if filled == 0 {
                        return ReadOutcome::Nothing;
                    }
                    pending.extend_from_slice(&buf[..filled]);
                    return ReadOutcome::Partial(filled);
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {
                    interrupts += 1;
                    if interrupts > self.read_retry_limit {
                        pending.extend_from_slice(&buf[..filled]);
                        return ReadOutcome::Failed(err);
                    }
                }
                Err(err) => {
                    pending.extend_from_slice(&buf[..filled]);
                    return ReadOutcome::Failed(err);
                }
            }
        }

        match RawEvent::from_bytes(&buf) {
            Some(raw) => ReadOutcome::Record(raw),
            None => ReadOutcome::Nothing,
        }
    }

    /// Put unfinished record bytes back, unless the handle was unsubscribed
    /// (or its descriptor reused) while reading.
    fn keep_pending(&self, fd: RawFd, file: &Arc<File>, pending: Vec<u8>) {
        if let Some(w) = self.watched().get_mut(&fd) {
            if Arc::ptr_eq(&w.file, file) {
                w.pending = pending;
            }
        }
    }

    #[cfg(test)]
    fn pending_len(&self, handle: &DeviceHandle) -> usize {
        self.watched()
            .get(&handle.as_raw_fd())
            .map_or(0, |w| w.pending.len())
    }

    fn remove_device(&self, fd: RawFd, id: usize, kind: PeripheralKind, file: &Arc<File>) {
        {
            let mut watched = self.watched();
            let still_ours = watched.get(&fd).is_some_and(|w| Arc::ptr_eq(&w.file, file));
            if !still_ours {
                return;
            }
            if let Err(err) = epoll_ctl(&self.epoll, libc::EPOLL_CTL_DEL, fd, 0, 0) {
                debug!(id, error = %err, "removing vanished device from epoll failed");
            }
            watched.remove(&fd);
        }

        info!(id, %kind, "device removed");
        self.publish(&EngineEvent::new(id, Timestamp::now(), EventKind::DeviceRemoved));
    }

    fn publish(&self, event: &EngineEvent) {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = sender.send(event) {
            warn!(device_id = event.device_id, error = %err, "event not published");
        }
    }

    fn wake(&self) {
        let one: u64 = 1;
        // SAFETY: writes 8 bytes from a live u64 to our own eventfd.
        let rc = unsafe {
            libc::write(
                self.wake.as_raw_fd(),
                &one as *const u64 as *const libc::c_void,
                std::mem::size_of::<u64>(),
            )
        };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::WouldBlock {
                warn!(error = %err, "could not wake event loop");
            }
        }
    }

    fn drain_wake(&self) {
        let mut counter: u64 = 0;
        // SAFETY: reads at most 8 bytes into a live u64 from our own eventfd.
        let rc = unsafe {
            libc::read(
                self.wake.as_raw_fd(),
                &mut counter as *mut u64 as *mut libc::c_void,
                std::mem::size_of::<u64>(),
            )
        };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::WouldBlock {
                warn!(error = %err, "could not drain event loop wakeup");
            }
        } else {
            trace!(counter, "event loop woken");
        }
    }
}

impl Drop for EventMultiplexer {
    fn drop(&mut self) {
        self.queue.close();
    }
}

/// Run `mux.run()` on a new thread named [`EVENT_THREAD_NAME`].
pub fn spawn_event_loop(mux: Arc<EventMultiplexer>) -> Result<JoinHandle<Result<()>>> {
    thread::Builder::new()
        .name(EVENT_THREAD_NAME.to_string())
        .spawn(move || mux.run())
        .map_err(InputError::Spawn)
}

fn epoll_ctl(epoll: &OwnedFd, op: i32, fd: RawFd, events: u32, token: u64) -> io::Result<()> {
    // Zeroed for EPOLL_CTL_DEL; kernels before 2.6.9 rejected a null pointer there.
    let mut event = libc::epoll_event { events, u64: token };
    // SAFETY: `event` outlives the call; the kernel validates both descriptors.
    let rc = unsafe { libc::epoll_ctl(epoll.as_raw_fd(), op, fd, &mut event) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn wait_timeout_ms(timeout: Option<Duration>) -> i32 {
    match timeout {
        Some(d) => d.as_millis().min(i32::MAX as u128) as i32,
        None => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::linux::caps::{EV_KEY, EV_SYN};
    use crate::event::EventType;
    use crate::keys::Key;
    use crate::queue::{SendError, TryRecvError};
    use std::io::Write;
    use std::time::Instant;

    fn pipe() -> (File, File) {
        let mut fds = [0; 2];
        let rc = unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_NONBLOCK | libc::O_CLOEXEC) };
        assert_eq!(rc, 0);
        unsafe { (File::from_raw_fd(fds[0]), File::from_raw_fd(fds[1])) }
    }

    fn recv_timeout(rx: &mut EventReceiver, within: Duration) -> Option<EngineEvent> {
        let deadline = Instant::now() + within;
        while Instant::now() < deadline {
            match rx.try_recv() {
                Ok(ev) => return Some(ev),
                Err(TryRecvError::Empty) => thread::sleep(Duration::from_millis(2)),
                Err(TryRecvError::Closed) => return None,
            }
        }
        None
    }

    #[test]
    fn send_sync() {
        fn assert<T: Send + Sync>() {}

        assert::<EventMultiplexer>();
        assert::<DeviceHandle>();
        assert::<EventSender>();
    }

    #[test]
    fn wait_timeout_conversion() {
        assert_eq!(wait_timeout_ms(None), -1);
        assert_eq!(wait_timeout_ms(Some(Duration::from_millis(250))), 250);
        assert_eq!(wait_timeout_ms(Some(Duration::from_secs(u64::MAX))), i32::MAX);
    }

    #[test]
    fn subscribe_and_unsubscribe() {
        let mux = EventMultiplexer::create().unwrap();
        let (rd, _wr) = pipe();
        let handle = DeviceHandle::from_file(0, PeripheralKind::Keyboard, "pipe", rd);

        assert_eq!(mux.unsubscribe(&handle).unwrap(), false);
        mux.subscribe(&handle).unwrap();
        assert!(mux.is_watching(&handle));
        assert_eq!(mux.watched_count(), 1);

        let again = mux.subscribe(&handle).unwrap_err();
        assert!(matches!(again, InputError::Subscribe { id: 0, .. }));

        assert_eq!(mux.unsubscribe(&handle).unwrap(), true);
        assert!(!mux.is_watching(&handle));
        assert_eq!(mux.unsubscribe(&handle).unwrap(), false);
    }

    #[test]
    fn subscribe_kinds_filters() {
        let mux = EventMultiplexer::create().unwrap();
        let (kbd, _w1) = pipe();
        let (mouse, _w2) = pipe();
        let mut list = DeviceHandleList::new();
        list.push(DeviceHandle::from_file(0, PeripheralKind::Keyboard, "kbd", kbd))
            .unwrap();
        list.push(DeviceHandle::from_file(1, PeripheralKind::Mouse, "mouse", mouse))
            .unwrap();

        mux.subscribe_kinds(&list, PeripheralKinds::MOUSE).unwrap();
        assert_eq!(mux.watched_count(), 1);
        assert!(mux.is_watching(list.get(1).unwrap()));
        assert_eq!(mux.unsubscribe_all(&list), 0);
        assert_eq!(mux.watched_count(), 0);
    }

    #[test]
    fn translates_and_publishes() {
        let mux = Arc::new(EventMultiplexer::create().unwrap());
        let mut rx = mux.receiver().unwrap();
        let (rd, mut wr) = pipe();
        let handle = DeviceHandle::from_file(7, PeripheralKind::Keyboard, "pipe", rd);
        mux.subscribe(&handle).unwrap();

        let worker = spawn_event_loop(Arc::clone(&mux)).unwrap();
        wr.write_all(&RawEvent::new(EV_SYN, 0, 0).to_bytes()).unwrap();
        wr.write_all(&RawEvent::new(EV_KEY, 30, 1).at(5, 6).to_bytes())
            .unwrap();

        let ev = recv_timeout(&mut rx, Duration::from_secs(5)).unwrap();
        assert_eq!(ev.event_type(), EventType::KeyDown);
        assert_eq!(ev.device_id, 7);
        assert_eq!(ev.timestamp, Timestamp { seconds: 5, microseconds: 6 });

        mux.destroy();
        worker.join().unwrap().unwrap();
        // destroying does not touch the watch set
        assert!(mux.unsubscribe(&handle).unwrap());
    }

    #[test]
    fn destroy_stops_an_idle_loop() {
        let mux = Arc::new(EventMultiplexer::create().unwrap());
        let worker = spawn_event_loop(Arc::clone(&mux)).unwrap();
        thread::sleep(Duration::from_millis(20));
        mux.destroy();
        worker.join().unwrap().unwrap();
        assert!(mux.is_closed());
    }

    #[test]
    fn closed_after_destroy() {
        let mux = EventMultiplexer::create().unwrap();
        let external = mux.sender().unwrap();
        mux.destroy();
        mux.destroy();

        assert!(matches!(mux.receiver(), Err(InputError::QueueClosed)));
        assert!(matches!(mux.sender(), Err(InputError::QueueClosed)));
        let ev = EngineEvent::new(0, Timestamp::default(), EventKind::DeviceAdded);
        assert_eq!(external.send(&ev), Err(SendError::Closed));
        // run returns straight away on a closed queue
        mux.run().unwrap();
    }

    #[test]
    fn eof_removes_the_device() {
        let mux = Arc::new(EventMultiplexer::create().unwrap());
        let mut rx = mux.receiver().unwrap();
        let (rd, wr) = pipe();
        let handle = DeviceHandle::from_file(2, PeripheralKind::Gamepad, "pipe", rd);
        mux.subscribe(&handle).unwrap();

        let worker = spawn_event_loop(Arc::clone(&mux)).unwrap();
        drop(wr);

        let ev = recv_timeout(&mut rx, Duration::from_secs(5)).unwrap();
        assert_eq!(ev.kind, EventKind::DeviceRemoved);
        assert_eq!(ev.device_id, 2);
        assert!(!mux.is_watching(&handle));
        assert_eq!(mux.unsubscribe(&handle).unwrap(), false);

        mux.destroy();
        worker.join().unwrap().unwrap();
    }

    #[test]
    fn split_record_is_reassembled_across_wakeups() {
        let mux = Arc::new(EventMultiplexer::create().unwrap());
        let mut rx = mux.receiver().unwrap();
        let (rd, mut wr) = pipe();
        let handle = DeviceHandle::from_file(1, PeripheralKind::Keyboard, "pipe", rd);
        mux.subscribe(&handle).unwrap();
        let worker = spawn_event_loop(Arc::clone(&mux)).unwrap();

        let a_down = RawEvent::new(EV_KEY, 30, 1).to_bytes();
        let (head, tail) = a_down.split_at(12);
        wr.write_all(head).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while mux.pending_len(&handle) != head.len() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
        assert_eq!(mux.pending_len(&handle), head.len());
        thread::sleep(Duration::from_millis(100));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

        wr.write_all(tail).unwrap();
        wr.write_all(&RawEvent::new(EV_KEY, 48, 1).to_bytes()).unwrap();

        let first = recv_timeout(&mut rx, Duration::from_secs(5)).unwrap();
        let second = recv_timeout(&mut rx, Duration::from_secs(5)).unwrap();
        assert_eq!(first.key(), Some(Key::A));
        assert_eq!(second.key(), Some(Key::B));
        assert_eq!(second.event_type(), EventType::KeyDown);
        assert_eq!(mux.pending_len(&handle), 0);

        mux.destroy();
        worker.join().unwrap().unwrap();
    }

    #[test]
    fn pending_bytes_are_dropped_on_unsubscribe() {
        let mux = EventMultiplexer::create().unwrap();
        let (rd, mut wr) = pipe();
        let handle = DeviceHandle::from_file(0, PeripheralKind::Keyboard, "pipe", rd);
        mux.subscribe(&handle).unwrap();

        wr.write_all(&RawEvent::new(EV_KEY, 30, 1).to_bytes()[..5]).unwrap();
        mux.service(handle.as_raw_fd());
        assert_eq!(mux.pending_len(&handle), 5);

        assert!(mux.unsubscribe(&handle).unwrap());
        mux.subscribe(&handle).unwrap();
        assert_eq!(mux.pending_len(&handle), 0);
    }

    #[test]
    fn wakeup_is_drained() {
        let mux = EventMultiplexer::create().unwrap();
        mux.wake();
        mux.wake();
        mux.drain_wake();
        // empty eventfd: WouldBlock is swallowed
        mux.drain_wake();

        let mut counter: u64 = 0;
        let rc = unsafe {
            libc::read(
                mux.wake.as_raw_fd(),
                &mut counter as *mut u64 as *mut libc::c_void,
                std::mem::size_of::<u64>(),
            )
        };
        assert_eq!(rc, -1);
        assert_eq!(io::Error::last_os_error().kind(), io::ErrorKind::WouldBlock);
    }

    #[test]
    fn rejects_bad_config() {
        let cfg = InputConfig {
            max_ready_events: 0,
            ..InputConfig::default()
        };
        assert!(matches!(
            EventMultiplexer::create_with(&cfg),
            Err(InputError::InvalidConfig(_))
        ));
    }
}
