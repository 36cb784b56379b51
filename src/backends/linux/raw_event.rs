//! Raw evdev records and their translation into [`EngineEvent`]s.
//!
//! Every read from an event node yields whole `struct input_event` records:
//!
//! ```text
//! struct input_event {
//!     struct timeval time;   // seconds + microseconds
//!     __u16 type;            // event class: EV_KEY, EV_REL, EV_ABS, ...
//!     __u16 code;            // key / axis code within the class
//!     __s32 value;           // 0/1/2 for keys, delta for REL, position for ABS
//! };
//! ```
//!
//! [`translate`] maps the classes the engine understands and drops the rest
//! (`EV_SYN` report boundaries, `EV_MSC` scancodes, LEDs, ...).

use super::caps::{
    ABS_HAT0X, ABS_HAT0Y, ABS_RX, ABS_RY, ABS_RZ, ABS_X, ABS_Y, ABS_Z, EV_ABS, EV_KEY, EV_REL,
    REL_HWHEEL, REL_HWHEEL_HI_RES, REL_RX, REL_RY, REL_WHEEL, REL_WHEEL_HI_RES, REL_X, REL_Y,
};
use crate::event::{EngineEvent, EventKind, GamepadAxis, KeyState, MouseAxis, Timestamp, WheelAxis};
use crate::keys::{Key, GAMEPAD_BUTTON_CODES, MOUSE_BUTTON_CODES};
use std::mem;
use tracing::trace;

/// One decoded `input_event`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawEvent {
    pub seconds: i64,
    pub microseconds: i64,
    /// Event class (`type` in the kernel struct).
    pub class: u16,
    pub code: u16,
    pub value: i32,
}

impl RawEvent {
    /// Size of one record as the kernel writes it.
    pub const SIZE: usize = mem::size_of::<libc::input_event>();

    pub fn new(class: u16, code: u16, value: i32) -> Self {
        Self {
            class,
            code,
            value,
            ..Self::default()
        }
    }

    pub fn at(mut self, seconds: i64, microseconds: i64) -> Self {
        self.seconds = seconds;
        self.microseconds = microseconds;
        self
    }

    /// Decode the first record in `bytes`. `None` if fewer than [`SIZE`](Self::SIZE) bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        // SAFETY: length checked above; input_event is plain old data and the
        // read tolerates any alignment.
        let ev: libc::input_event =
            unsafe { std::ptr::read_unaligned(bytes.as_ptr() as *const libc::input_event) };
        Some(Self {
            seconds: ev.time.tv_sec as i64,
            microseconds: ev.time.tv_usec as i64,
            class: ev.type_,
            code: ev.code,
            value: ev.value,
        })
    }

    /// Encode in the kernel layout. Used to feed pipes and fake nodes.
    pub fn to_bytes(&self) -> Vec<u8> {
        // SAFETY: all-zero is a valid input_event; zeroing also clears padding.
        let mut ev: libc::input_event = unsafe { mem::zeroed() };
        ev.time.tv_sec = self.seconds as libc::time_t;
        ev.time.tv_usec = self.microseconds as libc::suseconds_t;
        ev.type_ = self.class;
        ev.code = self.code;
        ev.value = self.value;

        // SAFETY: `ev` is a live, fully initialised value of SIZE bytes.
        let bytes = unsafe {
            std::slice::from_raw_parts(&ev as *const libc::input_event as *const u8, Self::SIZE)
        };
        bytes.to_vec()
    }

    pub fn timestamp(&self) -> Timestamp {
        Timestamp {
            seconds: self.seconds,
            microseconds: self.microseconds,
        }
    }
}

/// Translate one raw record from peripheral `device_id`.
///
/// Returns `None` for classes, codes and values the engine does not map.
pub fn translate(raw: &RawEvent, device_id: usize) -> Option<EngineEvent> {
    let kind = match raw.class {
        EV_KEY => translate_key(raw)?,
        EV_REL => translate_rel(raw)?,
        EV_ABS => translate_abs(raw)?,
        class => {
            trace!(device_id, class, code = raw.code, "dropped unhandled event class");
            return None;
        }
    };
    Some(EngineEvent::new(device_id, raw.timestamp(), kind))
}

fn key_state(value: i32) -> Option<KeyState> {
    match value {
        0 => Some(KeyState::Up),
        1 => Some(KeyState::Down),
        2 => Some(KeyState::Repeat),
        _ => None,
    }
}

fn translate_key(raw: &RawEvent) -> Option<EventKind> {
    let state = key_state(raw.value)?;
    let Some(key) = Key::from_code(raw.code) else {
        trace!(code = raw.code, "dropped unmapped key code");
        return None;
    };

    let kind = if MOUSE_BUTTON_CODES.contains(&raw.code) {
        EventKind::MouseButton { button: key, state }
    } else if GAMEPAD_BUTTON_CODES.contains(&raw.code) {
        EventKind::GamepadButton {
            button: key,
            state,
            pressure: None,
        }
    } else {
        EventKind::Key {
            key,
            state,
            pressure: None,
        }
    };
    Some(kind)
}

fn translate_rel(raw: &RawEvent) -> Option<EventKind> {
    let motion = |axis| EventKind::MouseMove {
        axis,
        delta: raw.value,
    };
    let wheel = |axis, hi_res| EventKind::MouseWheel {
        axis,
        ticks: raw.value,
        hi_res,
    };

    let kind = match raw.code {
        REL_X => motion(MouseAxis::X),
        REL_Y => motion(MouseAxis::Y),
        REL_RX => motion(MouseAxis::RotX),
        REL_RY => motion(MouseAxis::RotY),
        REL_WHEEL => wheel(WheelAxis::Vertical, false),
        REL_HWHEEL => wheel(WheelAxis::Horizontal, false),
        REL_WHEEL_HI_RES => wheel(WheelAxis::Vertical, true),
        REL_HWHEEL_HI_RES => wheel(WheelAxis::Horizontal, true),
        _ => return None,
    };
    Some(kind)
}

fn translate_abs(raw: &RawEvent) -> Option<EventKind> {
    let axis = match raw.code {
        ABS_X => GamepadAxis::LeftX,
        ABS_Y => GamepadAxis::LeftY,
        ABS_RX => GamepadAxis::RightX,
        ABS_RY => GamepadAxis::RightY,
        ABS_Z => GamepadAxis::LeftTrigger,
        ABS_RZ => GamepadAxis::RightTrigger,
        ABS_HAT0X => GamepadAxis::DpadX,
        ABS_HAT0Y => GamepadAxis::DpadY,
        _ => return None,
    };
    Some(EventKind::GamepadAxis {
        axis,
        value: raw.value,
    })
}
