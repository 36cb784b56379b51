//! Open event nodes for classified peripherals.
//!
//! [`materialize`] turns a [`PeripheralList`] into a [`DeviceHandleList`]: one
//! non-blocking, read-only [`DeviceHandle`] per keyboard, mouse or gamepad.
//! Unknown peripherals are never opened.
//!
//! The file inside a handle is reference counted. When a handle is subscribed to
//! the [`EventMultiplexer`](super::multiplexer::EventMultiplexer), the watch set
//! holds a second reference, so the descriptor number cannot be recycled under
//! the event loop while it is still registered. The OS descriptor is closed when
//! the last holder drops it.

use super::discovery::{PeripheralDescriptor, PeripheralList};
use crate::device::{PeripheralKind, PeripheralKinds};
use crate::error::{InputError, Result};
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, RawFd};
use std::sync::Arc;
use tracing::{debug, trace};

/// An open event node, tagged with the peripheral it belongs to.
#[derive(Debug)]
pub struct DeviceHandle {
    id: usize,
    kind: PeripheralKind,
    path: String,
    file: Arc<File>,
}

impl DeviceHandle {
    /// Open `peri.event_path` read-only and non-blocking.
    pub fn open(peri: &PeripheralDescriptor) -> Result<Self> {
        let open_err = |source| InputError::OpenDevice {
            id: peri.id,
            path: peri.event_path.clone(),
            source,
        };

        if !peri.has_event_path() {
            return Err(open_err(io::Error::new(
                io::ErrorKind::NotFound,
                "peripheral has no event node",
            )));
        }

        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&peri.event_path)
            .map_err(open_err)?;

        debug!(
            id = peri.id,
            kind = %peri.kind,
            path = %peri.event_path,
            "opened event node"
        );
        Ok(Self::from_file(peri.id, peri.kind, peri.event_path.clone(), file))
    }

    /// Wrap an already open readable file. The caller is responsible for making
    /// it non-blocking if it is going to be multiplexed.
    pub fn from_file(id: usize, kind: PeripheralKind, path: impl Into<String>, file: File) -> Self {
        Self {
            id,
            kind,
            path: path.into(),
            file: Arc::new(file),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn kind(&self) -> PeripheralKind {
        self.kind
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn shared_file(&self) -> &Arc<File> {
        &self.file
    }
}

impl AsRawFd for DeviceHandle {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

/// Ordered set of handles, at most one per peripheral id.
#[derive(Debug, Default)]
pub struct DeviceHandleList {
    handles: Vec<DeviceHandle>,
}

impl DeviceHandleList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handle`. A handle with the same id already present is an error.
    pub fn push(&mut self, handle: DeviceHandle) -> Result<()> {
        if self.get(handle.id).is_some() {
            return Err(InputError::DuplicateHandle(handle.id));
        }
        self.handles.push(handle);
        Ok(())
    }

    pub fn get(&self, id: usize) -> Option<&DeviceHandle> {
        self.handles.iter().find(|h| h.id == id)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DeviceHandle> {
        self.handles.iter()
    }

    /// Remove and close the handle for `id`. Returns `false` if there was none.
    ///
    /// Unsubscribe the handle first; while the multiplexer still watches it the
    /// descriptor stays open.
    pub fn free(&mut self, id: usize) -> bool {
        match self.handles.iter().position(|h| h.id == id) {
            Some(idx) => {
                let handle = self.handles.remove(idx);
                trace!(id, path = %handle.path, "freed device handle");
                true
            }
            None => false,
        }
    }

    /// Close every handle. Returns how many were held.
    pub fn free_all(self) -> usize {
        let count = self.handles.len();
        drop(self.handles);
        trace!(count, "freed all device handles");
        count
    }
}

impl<'a> IntoIterator for &'a DeviceHandleList {
    type Item = &'a DeviceHandle;
    type IntoIter = std::slice::Iter<'a, DeviceHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.handles.iter()
    }
}

/// Open every keyboard, mouse and gamepad in `list`.
pub fn materialize(list: &PeripheralList) -> Result<DeviceHandleList> {
    materialize_kinds(list, PeripheralKinds::ALL_KNOWN)
}

/// Open every classified peripheral whose kind is in `kinds`.
///
/// The first node that fails to open aborts the call; handles opened before it
/// are closed again.
pub fn materialize_kinds(
    list: &PeripheralList,
    kinds: PeripheralKinds,
) -> Result<DeviceHandleList> {
    let mut handles = DeviceHandleList::new();
    for peri in list {
        if !peri.kind.is_known() || !kinds.includes(peri.kind) {
            continue;
        }
        handles.push(DeviceHandle::open(peri)?)?;
    }
    debug!(opened = handles.len(), discovered = list.len(), "materialized device handles");
    Ok(handles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::linux::discovery::parse_peripherals;
    use crate::config::InputConfig;
    use std::path::PathBuf;

    /// Temp dir with fake `eventN` nodes, removed on drop.
    struct FakeNodes {
        dir: PathBuf,
    }

    impl FakeNodes {
        fn new(tag: &str, nodes: &[&str]) -> Self {
            let dir = std::env::temp_dir().join(format!("evmux-{tag}-{}", std::process::id()));
            std::fs::create_dir_all(&dir).unwrap();
            for node in nodes {
                std::fs::write(dir.join(node), b"").unwrap();
            }
            Self { dir }
        }

        fn config(&self) -> InputConfig {
            InputConfig {
                event_dir: format!("{}/", self.dir.display()),
                ..InputConfig::default()
            }
        }
    }

    impl Drop for FakeNodes {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.dir).ok();
        }
    }

    // keyboard, mouse, unknown, gamepad
    const DEVICES: &str = "\
N: Name=\"kbd\"\nH: Handlers=kbd event0\nB: EV=3\n\n\
N: Name=\"mouse\"\nH: Handlers=mouse0 event1\nB: EV=7\nB: REL=3\n\n\
N: Name=\"speaker\"\nH: Handlers=kbd event2\nB: EV=40001\n\n\
N: Name=\"pad\"\nH: Handlers=event3 js0\nB: EV=b\nB: ABS=1b\n\n";

    fn list_for(nodes: &FakeNodes) -> PeripheralList {
        let list = parse_peripherals(DEVICES.as_bytes(), &nodes.config()).unwrap();
        assert_eq!(list.len(), 4);
        list
    }

    // event paths must fit EVENT_PATH_MAX, so these live directly under /tmp,
    // one dir per tag and test process
    fn short_nodes(tag: char) -> FakeNodes {
        let dir = PathBuf::from(format!("/tmp/{tag}{}", std::process::id() % 100_000));
        std::fs::create_dir_all(&dir).unwrap();
        for node in ["event0", "event1", "event2", "event3"] {
            std::fs::write(dir.join(node), b"").unwrap();
        }
        FakeNodes { dir }
    }

    #[test]
    fn short_node_dirs_are_per_process() {
        let nodes = short_nodes('d');
        let name = nodes.dir.file_name().unwrap().to_str().unwrap();
        assert_eq!(name, format!("d{}", std::process::id() % 100_000));

        let list = list_for(&nodes);
        let pad = list.get(3).unwrap();
        assert_eq!(pad.event_path, format!("{}/event3", nodes.dir.display()));
    }

    #[test]
    fn opens_known_kinds_only() {
        let nodes = short_nodes('a');
        let list = list_for(&nodes);
        let handles = materialize(&list).unwrap();

        assert_eq!(handles.len(), 3);
        let ids: Vec<_> = handles.iter().map(|h| h.id()).collect();
        assert_eq!(ids, [0, 1, 3]);
        assert!(handles.iter().all(|h| h.kind() != PeripheralKind::Unknown));
        assert!(handles.get(2).is_none());
        assert_eq!(handles.get(1).unwrap().path(), format!("{}/event1", nodes.dir.display()));
    }

    #[test]
    fn kind_mask_selects() {
        let nodes = short_nodes('b');
        let list = list_for(&nodes);

        let only_mice = materialize_kinds(&list, PeripheralKinds::MOUSE).unwrap();
        assert_eq!(only_mice.len(), 1);
        assert_eq!(only_mice.iter().next().unwrap().kind(), PeripheralKind::Mouse);

        // UNKNOWN in the mask still opens nothing unknown
        let all = materialize_kinds(&list, PeripheralKinds::ALL).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn missing_node_is_fatal() {
        let nodes = short_nodes('c');
        std::fs::remove_file(nodes.dir.join("event3")).unwrap();
        let list = list_for(&nodes);

        let err = materialize(&list).unwrap_err();
        match &err {
            InputError::OpenDevice { id, .. } => assert_eq!(*id, 3),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.is_fatal());
    }

    #[test]
    fn unresolved_path_is_an_open_error() {
        let peri = PeripheralDescriptor {
            id: 5,
            kind: PeripheralKind::Keyboard,
            ..PeripheralDescriptor::default()
        };
        assert!(matches!(
            DeviceHandle::open(&peri),
            Err(InputError::OpenDevice { id: 5, .. })
        ));
    }

    #[test]
    fn list_bookkeeping() {
        let nodes = FakeNodes::new("list", &["a", "b"]);
        let open = |name: &str| File::open(nodes.dir.join(name)).unwrap();

        let mut list = DeviceHandleList::new();
        list.push(DeviceHandle::from_file(0, PeripheralKind::Keyboard, "a", open("a")))
            .unwrap();
        list.push(DeviceHandle::from_file(1, PeripheralKind::Mouse, "b", open("b")))
            .unwrap();

        let dup = list.push(DeviceHandle::from_file(1, PeripheralKind::Mouse, "b", open("b")));
        assert!(matches!(dup, Err(InputError::DuplicateHandle(1))));
        assert_eq!(list.len(), 2);

        assert!(list.free(0));
        assert!(!list.free(0));
        assert_eq!(list.len(), 1);
        assert_eq!(list.free_all(), 1);
    }

    #[test]
    fn empty_list_materializes_nothing() {
        let list = parse_peripherals(b"", &InputConfig::default()).unwrap();
        let handles = materialize(&list).unwrap();
        assert!(handles.is_empty());
        assert_eq!(handles.free_all(), 0);
    }
}
