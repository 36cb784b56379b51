//! Peripheral discovery from `/proc/bus/input/devices`.
//!
//! The pseudo-file holds one record per input device, records separated by a
//! blank line, each line tagged with a one-letter prefix:
//!
//! ```text
//! I: Bus=0003 Vendor=046d Product=c077 Version=0111
//! N: Name="Logitech USB Optical Mouse"
//! P: Phys=usb-0000:00:14.0-2/input0
//! H: Handlers=mouse0 event1
//! B: EV=17
//! B: REL=1943
//! ```
//!
//! Discovery is a three stage pipeline:
//! 1. slurp the file in chunks (procfs reports no size up front) and split it
//!    into owned lines;
//! 2. fold lines into [`PeripheralDescriptor`]s, one per slot, using a table of
//!    `(prefix, setter)` pairs;
//! 3. at each blank line, classify the record from its capability bitmaps and
//!    resolve the `eventN` node its handlers point to.
//!
//! The returned [`PeripheralList`] is bounded by
//! [`InputConfig::max_peripherals`]; extra records are not represented.

use super::caps::Capabilities;
use crate::config::InputConfig;
use crate::device::PeripheralKind;
use crate::error::{InputError, Result};
use crate::text::{self, LineRead};
use serde::Serialize;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, Read};
use tracing::{debug, trace, warn};

/// Byte length bound for a resolved event node path, NUL slot included
/// (`/dev/input/event999` is 19 bytes).
pub const EVENT_PATH_MAX: usize = 20;
/// Digits of the event node number read after `event` in the handlers string.
pub const EVENT_NUMBER_DIGITS: usize = 3;

const LINE_TERMINATOR: u8 = b'\n';
const EVENT_TOKEN: &[u8] = b"event";
// Legacy joystick interface; always the first one, see DESIGN.md.
const LEGACY_JOYSTICK_TOKEN: &str = "js0";

/// One parsed device record.
///
/// String fields hold the raw value after the tag, without the line terminator.
/// A field the record did not carry stays `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PeripheralDescriptor {
    /// Slot index in the list that produced this descriptor.
    pub id: usize,
    pub kind: PeripheralKind,
    /// `N: Name=`, surrounding quotes removed.
    pub name: Option<String>,
    /// `P: Phys=`.
    pub phys: Option<String>,
    /// `H: Handlers=`, e.g. `"sysrq kbd leds event0"`.
    pub handlers: Option<String>,
    /// `B: EV=` event class bitmap.
    pub ev: Option<String>,
    /// `B: ABS=` absolute axis bitmap.
    pub abs: Option<String>,
    /// `B: REL=` relative axis bitmap.
    pub rel: Option<String>,
    /// Resolved event node, empty when resolution failed.
    pub event_path: String,
}

impl PeripheralDescriptor {
    fn new(id: usize) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Capability flags derived from the `B:` fields.
    pub fn caps(&self) -> Capabilities {
        Capabilities::from_fields(self.ev.as_deref(), self.abs.as_deref(), self.rel.as_deref())
    }

    pub fn has_event_path(&self) -> bool {
        !self.event_path.is_empty()
    }

    /// Classify and resolve the event node. Called once the record's blank line is hit.
    fn finish(&mut self, event_dir: &str) {
        self.kind = classify(&self.caps());

        let handlers = self.handlers.as_deref().unwrap_or("");
        match resolve_event_path(handlers, event_dir) {
            Some(path) => self.event_path = path,
            None if self.kind == PeripheralKind::Gamepad => {
                if let Some(path) = legacy_joystick_path(handlers, event_dir) {
                    debug!(id = self.id, %path, "gamepad has no event node, using legacy joystick");
                    self.event_path = path;
                }
            }
            None => {}
        }

        trace!(
            id = self.id,
            kind = %self.kind,
            name = self.name.as_deref().unwrap_or(""),
            path = %self.event_path,
            "classified peripheral"
        );
    }
}

/// Descriptors produced by one discovery call.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PeripheralList {
    items: Vec<PeripheralDescriptor>,
    capacity: usize,
}

impl PeripheralList {
    /// Number of populated descriptors. Authoritative; may be below the real
    /// device count when [`capacity`](Self::capacity) was reached.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Slot count this list was parsed with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, id: usize) -> Option<&PeripheralDescriptor> {
        self.items.get(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PeripheralDescriptor> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[PeripheralDescriptor] {
        &self.items
    }

    pub fn count_of(&self, kind: PeripheralKind) -> usize {
        self.items.iter().filter(|p| p.kind == kind).count()
    }

    /// Pretty JSON dump, for diagnostics.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl<'a> IntoIterator for &'a PeripheralList {
    type Item = &'a PeripheralDescriptor;
    type IntoIter = std::slice::Iter<'a, PeripheralDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Discover peripherals using the default configuration.
pub fn discover_peripherals() -> Result<PeripheralList> {
    discover_peripherals_with(&InputConfig::default())
}

/// Discover peripherals from `cfg.devices_list_path`.
pub fn discover_peripherals_with(cfg: &InputConfig) -> Result<PeripheralList> {
    cfg.validate()?;
    let path = &cfg.devices_list_path;

    let file = File::open(path).map_err(|source| InputError::DeviceListOpen {
        path: path.clone(),
        source,
    })?;
    let read_err = |source| InputError::DeviceListRead {
        path: path.clone(),
        source,
    };
    let buf = read_device_list(file, cfg.read_chunk).map_err(read_err)?;

    let list = parse_peripherals(&buf, cfg)?;
    debug!(
        path = %path.display(),
        bytes = buf.len(),
        count = list.len(),
        capacity = list.capacity(),
        "discovered peripherals"
    );
    Ok(list)
}

/// Read `reader` to the end, growing the buffer `chunk` bytes at a time.
pub fn read_device_list<R: Read>(mut reader: R, chunk: usize) -> io::Result<Vec<u8>> {
    let chunk = chunk.max(1);
    let mut buf = vec![0u8; chunk];
    let mut used = 0;

    loop {
        if used == buf.len() {
            buf.resize(buf.len() + chunk, 0);
        }
        match reader.read(&mut buf[used..]) {
            Ok(0) => break,
            Ok(n) => used += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    buf.truncate(used);
    Ok(buf)
}

/// Parse an in-memory copy of the device list.
pub fn parse_peripherals(bytes: &[u8], cfg: &InputConfig) -> Result<PeripheralList> {
    let mut lines = split_lines(bytes, cfg.max_line_len)?;
    let mut items = Vec::new();

    'slots: for slot in 0..cfg.max_peripherals {
        let mut peri = PeripheralDescriptor::new(slot);
        loop {
            let Some(line) = lines.pop_front() else {
                // a record without its blank line is end of input
                break 'slots;
            };
            if line == [LINE_TERMINATOR] {
                peri.finish(&cfg.event_dir);
                items.push(peri);
                break;
            }
            apply_field(&mut peri, &line);
        }
    }

    if !lines.is_empty() {
        debug!(
            capacity = cfg.max_peripherals,
            remaining_lines = lines.len(),
            "peripheral capacity reached, remaining records ignored"
        );
    }

    Ok(PeripheralList {
        items,
        capacity: cfg.max_peripherals,
    })
}

/// Split `bytes` into owned, terminator-inclusive lines.
fn split_lines(bytes: &[u8], max_line_len: usize) -> Result<VecDeque<Vec<u8>>> {
    let mut lines = VecDeque::new();
    let mut scratch = Vec::with_capacity(max_line_len);
    let mut offset = 0;

    loop {
        let rest = &bytes[offset..];
        match text::read_line(rest, LINE_TERMINATOR, max_line_len, &mut scratch) {
            LineRead::Complete(n) => {
                lines.push_back(scratch.clone());
                offset += n;
            }
            LineRead::EndOfInput => break,
            LineRead::Unterminated => {
                return Err(InputError::NoRecordTerminator {
                    max_len: max_line_len,
                    offset,
                })
            }
        }
    }

    let has_content = bytes.first().is_some_and(|b| *b != 0);
    if lines.is_empty() && has_content {
        return Err(InputError::NoRecordTerminator {
            max_len: max_line_len,
            offset: 0,
        });
    }
    Ok(lines)
}

type FieldSetter = fn(&mut PeripheralDescriptor, String);

/// Recognized line tags. The first matching prefix wins.
const FIELDS: &[(&str, FieldSetter)] = &[
    ("N: Name=", set_name),
    ("H: Handlers=", set_handlers),
    ("P: Phys=", set_phys),
    ("B: EV=", set_ev),
    ("B: ABS=", set_abs),
    ("B: REL=", set_rel),
];

fn set_name(p: &mut PeripheralDescriptor, v: String) {
    p.name = Some(strip_quotes(v));
}

fn set_handlers(p: &mut PeripheralDescriptor, v: String) {
    p.handlers = Some(v);
}

fn set_phys(p: &mut PeripheralDescriptor, v: String) {
    p.phys = Some(v);
}

fn set_ev(p: &mut PeripheralDescriptor, v: String) {
    p.ev = Some(v);
}

fn set_abs(p: &mut PeripheralDescriptor, v: String) {
    p.abs = Some(v);
}

fn set_rel(p: &mut PeripheralDescriptor, v: String) {
    p.rel = Some(v);
}

fn apply_field(peri: &mut PeripheralDescriptor, line: &[u8]) {
    for (prefix, setter) in FIELDS {
        let prefix = prefix.as_bytes();
        if text::starts_with(line, prefix, prefix.len()) != Some(true) {
            continue;
        }
        let body = &line[prefix.len()..];
        let body = body.strip_suffix(&[LINE_TERMINATOR]).unwrap_or(body);
        setter(peri, String::from_utf8_lossy(body).into_owned());
        return;
    }
}

fn strip_quotes(value: String) -> String {
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => inner.to_string(),
        None => value,
    }
}

/// Classification rules, first match wins:
/// 1. relative events with X and Y axes → mouse
/// 2. keys + absolute events with X, Y, RX and RY → gamepad
/// 3. keys without absolute events → keyboard
pub fn classify(caps: &Capabilities) -> PeripheralKind {
    if caps.is_pointer() {
        PeripheralKind::Mouse
    } else if caps.has_key && caps.has_abs && caps.has_dual_sticks() {
        PeripheralKind::Gamepad
    } else if caps.has_key && !caps.has_abs {
        PeripheralKind::Keyboard
    } else {
        PeripheralKind::Unknown
    }
}

/// Build `<event_dir>event<N>` from the first `event` token in `handlers`.
///
/// The number may be empty, in which case the node is plain `<event_dir>event`.
/// Returns `None` when there is no `event` token, the number has more than
/// [`EVENT_NUMBER_DIGITS`] digits, or the path would not fit [`EVENT_PATH_MAX`].
pub fn resolve_event_path(handlers: &str, event_dir: &str) -> Option<String> {
    let bytes = handlers.as_bytes();
    let start = text::contains_with_index(bytes, EVENT_TOKEN)? + EVENT_TOKEN.len();
    let tail = &bytes[start..];

    let digits = tail
        .iter()
        .take(EVENT_NUMBER_DIGITS)
        .take_while(|b| text::is_ascii_digit(**b))
        .count();
    if tail.get(digits).is_some_and(|b| text::is_ascii_digit(*b)) {
        warn!(
            handlers,
            "event node number has more than {EVENT_NUMBER_DIGITS} digits, ignoring"
        );
        return None;
    }

    let number = String::from_utf8_lossy(&tail[..digits]);
    let path = format!("{event_dir}event{number}");
    if path.len() >= EVENT_PATH_MAX {
        warn!(%path, max = EVENT_PATH_MAX - 1, "event node path too long, ignoring");
        return None;
    }
    Some(path)
}

fn legacy_joystick_path(handlers: &str, event_dir: &str) -> Option<String> {
    if !text::contains(handlers.as_bytes(), LEGACY_JOYSTICK_TOKEN.as_bytes()) {
        return None;
    }
    let path = format!("{event_dir}{LEGACY_JOYSTICK_TOKEN}");
    (path.len() < EVENT_PATH_MAX).then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const DEVICES: &str = "\
I: Bus=0011 Vendor=0001 Product=0001 Version=ab41
N: Name=\"AT Translated Set 2 keyboard\"
P: Phys=isa0060/serio0/input0
S: Sysfs=/devices/platform/i8042/serio0/input/input0
U: Uniq=
H: Handlers=sysrq kbd leds event0
B: PROP=0
B: EV=120013
B: KEY=402000000 3803078f800d001 feffffdfffefffff fffffffffffffffe
B: MSC=10
B: LED=7

I: Bus=0003 Vendor=046d Product=c077 Version=0111
N: Name=\"Logitech USB Optical Mouse\"
P: Phys=usb-0000:00:14.0-2/input0
S: Sysfs=/devices/pci0000:00/0000:00:14.0/usb1/1-2/1-2:1.0/input/input5
U: Uniq=
H: Handlers=mouse0 event1
B: PROP=0
B: EV=17
B: KEY=ff0000 0 0 0 0
B: REL=1943
B: MSC=10

I: Bus=0003 Vendor=054c Product=09cc Version=8111
N: Name=\"Sony Interactive Entertainment Wireless Controller\"
P: Phys=usb-0000:00:14.0-1/input3
S: Sysfs=/devices/pci0000:00/0000:00:14.0/usb1/1-1/1-1:1.3/input/input7
U: Uniq=
H: Handlers=event2 js0
B: PROP=0
B: EV=20000b
B: KEY=7fdb000000000000 0 0 0 0
B: ABS=3003f
B: MSC=10

I: Bus=0010 Vendor=001f Product=0001 Version=0100
N: Name=\"PC Speaker\"
P: Phys=isa0061/input0
S: Sysfs=/devices/platform/pcspkr/input/input4
U: Uniq=
H: Handlers=kbd event4
B: PROP=0
B: EV=40001
B: SND=6

";

    fn cfg() -> InputConfig {
        InputConfig::default()
    }

    /// One record, blank line included. `extra` is an optional additional line.
    fn record(name: &str, handlers: &str, ev: &str, extra: &str) -> String {
        let mut text = format!("N: Name=\"{name}\"\nH: Handlers={handlers}\nB: EV={ev}\n");
        if !extra.is_empty() {
            text.push_str(extra);
            text.push('\n');
        }
        text.push('\n');
        text
    }

    #[test]
    fn parses_a_realistic_list() {
        let list = parse_peripherals(DEVICES.as_bytes(), &cfg()).unwrap();
        assert_eq!(list.len(), 4);
        assert_eq!(list.capacity(), 99);

        let kinds: Vec<_> = list.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            [
                PeripheralKind::Keyboard,
                PeripheralKind::Mouse,
                PeripheralKind::Gamepad,
                PeripheralKind::Unknown
            ]
        );

        let kbd = list.get(0).unwrap();
        assert_eq!(kbd.name.as_deref(), Some("AT Translated Set 2 keyboard"));
        assert_eq!(kbd.phys.as_deref(), Some("isa0060/serio0/input0"));
        assert_eq!(kbd.handlers.as_deref(), Some("sysrq kbd leds event0"));
        assert_eq!(kbd.ev.as_deref(), Some("120013"));
        assert_eq!(kbd.event_path, "/dev/input/event0");

        assert_eq!(list.get(1).unwrap().rel.as_deref(), Some("1943"));
        assert_eq!(list.get(2).unwrap().abs.as_deref(), Some("3003f"));
        assert_eq!(list.get(2).unwrap().event_path, "/dev/input/event2");
        // unknown peripherals still get a path for diagnostics
        assert_eq!(list.get(3).unwrap().event_path, "/dev/input/event4");
    }

    #[test]
    fn ids_are_positional() {
        let list = parse_peripherals(DEVICES.as_bytes(), &cfg()).unwrap();
        for (idx, peri) in list.iter().enumerate() {
            assert_eq!(peri.id, idx);
        }
    }

    #[test]
    fn mouse_then_gamepad_round_trip() {
        let text = format!(
            "{}{}",
            record("mouse", "mouse0 event5", "7", "B: REL=3"),
            record("pad", "event6 js0", "b", "B: ABS=1b"),
        );
        let list = parse_peripherals(text.as_bytes(), &cfg()).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0).unwrap().kind, PeripheralKind::Mouse);
        assert_eq!(list.get(0).unwrap().id, 0);
        assert_eq!(list.get(1).unwrap().kind, PeripheralKind::Gamepad);
        assert_eq!(list.get(1).unwrap().id, 1);
    }

    #[test]
    fn mouse_wins_over_keyboard_and_gamepad() {
        // keys + relative X/Y, no absolute
        let caps = Capabilities::from_fields(Some("7"), None, Some("3"));
        assert_eq!(classify(&caps), PeripheralKind::Mouse);
        // keys + relative + a full set of absolute axes
        let caps = Capabilities::from_fields(Some("f"), Some("1b"), Some("3"));
        assert_eq!(classify(&caps), PeripheralKind::Mouse);
    }

    #[test]
    fn classification_rules() {
        // relative events but only one axis
        let caps = Capabilities::from_fields(Some("7"), None, Some("1"));
        assert_eq!(classify(&caps), PeripheralKind::Keyboard);
        // keys + absolute without right stick: not a gamepad, not a keyboard
        let caps = Capabilities::from_fields(Some("b"), Some("3"), None);
        assert_eq!(classify(&caps), PeripheralKind::Unknown);
        // keys only
        let caps = Capabilities::from_fields(Some("3"), None, None);
        assert_eq!(classify(&caps), PeripheralKind::Keyboard);
        // nothing
        assert_eq!(classify(&Capabilities::default()), PeripheralKind::Unknown);
    }

    #[test]
    fn event_path_resolution() {
        let base = "/dev/input/";
        assert_eq!(
            resolve_event_path("kbd mouse0 event3", base).as_deref(),
            Some("/dev/input/event3")
        );
        assert_eq!(
            resolve_event_path("event17 js1", base).as_deref(),
            Some("/dev/input/event17")
        );
        assert_eq!(
            resolve_event_path("event123", base).as_deref(),
            Some("/dev/input/event123")
        );
        assert_eq!(resolve_event_path("kbd leds", base), None);
        assert_eq!(resolve_event_path("", base), None);
    }

    #[test]
    fn bare_event_token_resolves_without_number() {
        let base = "/dev/input/";
        assert_eq!(
            resolve_event_path("eventx", base).as_deref(),
            Some("/dev/input/event")
        );
        assert_eq!(
            resolve_event_path("kbd event", base).as_deref(),
            Some("/dev/input/event")
        );

        let text = record("pad", "event js0", "b", "B: ABS=1b");
        let list = parse_peripherals(text.as_bytes(), &cfg()).unwrap();
        assert_eq!(list.get(0).unwrap().event_path, "/dev/input/event");
    }

    #[test]
    fn event_path_rejects_overflow() {
        assert_eq!(resolve_event_path("event1000", "/dev/input/"), None);
        assert_eq!(resolve_event_path("event1", "/a/very/long/input/dir/"), None);
    }

    #[test]
    fn unresolvable_handlers_leave_path_empty() {
        let text = record("odd pad", "kbd leds", "b", "B: ABS=1b");
        let list = parse_peripherals(text.as_bytes(), &cfg()).unwrap();
        let pad = list.get(0).unwrap();
        assert_eq!(pad.kind, PeripheralKind::Gamepad);
        assert!(!pad.has_event_path());
    }

    #[test]
    fn gamepad_falls_back_to_legacy_joystick() {
        let text = record("old pad", "js0", "b", "B: ABS=1b");
        let list = parse_peripherals(text.as_bytes(), &cfg()).unwrap();
        assert_eq!(list.get(0).unwrap().event_path, "/dev/input/js0");

        // only gamepads get the fallback
        let text = record("kbd", "js0", "3", "");
        let list = parse_peripherals(text.as_bytes(), &cfg()).unwrap();
        assert!(list.get(0).unwrap().event_path.is_empty());
    }

    #[test]
    fn capacity_truncates() {
        let mut small = cfg();
        small.max_peripherals = 2;
        let list = parse_peripherals(DEVICES.as_bytes(), &small).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.capacity(), 2);
        assert!(list.len() <= list.capacity());
        assert_eq!(list.get(1).unwrap().kind, PeripheralKind::Mouse);
        assert!(list.get(2).is_none());
    }

    #[test]
    fn trailing_record_without_blank_line_is_dropped() {
        let text = format!(
            "{}N: Name=\"half\"\nB: EV=3\n",
            record("mouse", "event5", "7", "B: REL=3")
        );
        let list = parse_peripherals(text.as_bytes(), &cfg()).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn unknown_tags_are_ignored() {
        let text = "I: Bus=0003\nS: Sysfs=/x\nU: Uniq=\nN: Name=\"x\"\n\n";
        let list = parse_peripherals(text.as_bytes(), &cfg()).unwrap();
        let p = list.get(0).unwrap();
        assert_eq!(p.name.as_deref(), Some("x"));
        assert_eq!(p.kind, PeripheralKind::Unknown);
        assert!(p.handlers.is_none());
    }

    #[test]
    fn empty_input_is_an_empty_list() {
        let list = parse_peripherals(b"", &cfg()).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn missing_terminator_is_fatal() {
        let err = parse_peripherals(b"N: Name=\"no newline\"", &cfg()).unwrap_err();
        assert!(matches!(err, InputError::NoRecordTerminator { .. }));
        assert!(err.is_fatal());

        let mut narrow = cfg();
        narrow.max_line_len = 16;
        let err = parse_peripherals(DEVICES.as_bytes(), &narrow).unwrap_err();
        assert!(matches!(err, InputError::NoRecordTerminator { max_len: 16, .. }));
    }

    #[test]
    fn chunked_read_sees_everything() {
        let bytes = read_device_list(Cursor::new(DEVICES.as_bytes()), 7).unwrap();
        assert_eq!(bytes, DEVICES.as_bytes());
        let bytes = read_device_list(Cursor::new(Vec::new()), 4096).unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn discovers_from_a_file() {
        let path = std::env::temp_dir().join(format!("evmux-devices-{}", std::process::id()));
        std::fs::write(&path, DEVICES).unwrap();

        let mut config = cfg();
        config.devices_list_path = path.clone();
        config.read_chunk = 64;
        let list = discover_peripherals_with(&config).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(list.len(), 4);
        assert_eq!(list.count_of(PeripheralKind::Unknown), 1);
    }

    #[test]
    fn missing_file_is_fatal() {
        let mut config = cfg();
        config.devices_list_path = "/nonexistent/evmux/devices".into();
        let err = discover_peripherals_with(&config).unwrap_err();
        assert!(matches!(err, InputError::DeviceListOpen { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn json_dump_names_fields() {
        let list = parse_peripherals(DEVICES.as_bytes(), &cfg()).unwrap();
        let json = list.to_json().unwrap();
        assert!(json.contains("\"event_path\": \"/dev/input/event1\""));
        assert!(json.contains("\"kind\": \"Gamepad\""));
    }
}
