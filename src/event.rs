//! Engine event vocabulary.
//!
//! Backends translate raw OS records into [`EngineEvent`]s, the stable vocabulary
//! the rest of the engine consumes from the broadcast queue.
//!
//! ## Value conventions
//! - **Keys / buttons:** a [`KeyState`] transition. Auto-repeat is its own
//!   transition ([`KeyState::Repeat`]) so consumers that ignore repeats can.
//! - **Mouse motion / wheel:** raw counts and ticks as reported by the device.
//!   Hi-res wheel values are in 1/120 detent units.
//! - **Gamepad axes:** raw device values; ranges differ per device and are not
//!   normalized here.
//!
//! `EngineEvent` is `Copy` and owns no heap memory or OS handle, so the queue can
//! fan it out freely.

use crate::keys::Key;
use serde::{Deserialize, Serialize};

/// OS timestamp of the raw record, copied verbatim.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub microseconds: i64,
}

impl Timestamp {
    /// Current wall-clock time, for events that have no OS record behind them.
    pub fn now() -> Self {
        let since_epoch = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            seconds: since_epoch.as_secs() as i64,
            microseconds: i64::from(since_epoch.subsec_micros()),
        }
    }
}

/// Key or button transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyState {
    Up,
    Down,
    /// Auto-repeat while held.
    Repeat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseAxis {
    X,
    Y,
    RotX,
    RotY,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WheelAxis {
    Vertical,
    Horizontal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamepadAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    LeftTrigger,
    RightTrigger,
    DpadX,
    DpadY,
}

/// What happened, with its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A keyboard key (anything outside the mouse and gamepad button ranges).
    Key {
        key: Key,
        state: KeyState,
        pressure: Option<u8>,
    },
    MouseButton { button: Key, state: KeyState },
    GamepadButton {
        button: Key,
        state: KeyState,
        pressure: Option<u8>,
    },
    MouseMove { axis: MouseAxis, delta: i32 },
    MouseWheel {
        axis: WheelAxis,
        ticks: i32,
        hi_res: bool,
    },
    GamepadAxis { axis: GamepadAxis, value: i32 },
    DeviceAdded,
    DeviceRemoved,
}

/// Flat event category, without payload.
///
/// Handy for `match`-free filtering and for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    KeyDown,
    KeyUp,
    KeyRepeat,
    MouseMoveX,
    MouseMoveY,
    MouseMoveXRot,
    MouseMoveYRot,
    MouseButtonDown,
    MouseButtonUp,
    MouseButtonRepeat,
    MouseWheel,
    MouseWheelHiRes,
    GamepadAxis,
    GamepadButtonDown,
    GamepadButtonUp,
    GamepadButtonRepeat,
    DeviceAdded,
    DeviceRemoved,
}

/// A translated input event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineEvent {
    pub timestamp: Timestamp,
    /// Id of the peripheral the event came from (its discovery slot).
    pub device_id: usize,
    pub kind: EventKind,
}

impl EngineEvent {
    pub fn new(device_id: usize, timestamp: Timestamp, kind: EventKind) -> Self {
        Self {
            timestamp,
            device_id,
            kind,
        }
    }

    /// Flat category of this event.
    pub fn event_type(&self) -> EventType {
        match self.kind {
            EventKind::Key { state, .. } => match state {
                KeyState::Down => EventType::KeyDown,
                KeyState::Up => EventType::KeyUp,
                KeyState::Repeat => EventType::KeyRepeat,
            },
            EventKind::MouseButton { state, .. } => match state {
                KeyState::Down => EventType::MouseButtonDown,
                KeyState::Up => EventType::MouseButtonUp,
                KeyState::Repeat => EventType::MouseButtonRepeat,
            },
            EventKind::GamepadButton { state, .. } => match state {
                KeyState::Down => EventType::GamepadButtonDown,
                KeyState::Up => EventType::GamepadButtonUp,
                KeyState::Repeat => EventType::GamepadButtonRepeat,
            },
            EventKind::MouseMove { axis, .. } => match axis {
                MouseAxis::X => EventType::MouseMoveX,
                MouseAxis::Y => EventType::MouseMoveY,
                MouseAxis::RotX => EventType::MouseMoveXRot,
                MouseAxis::RotY => EventType::MouseMoveYRot,
            },
            EventKind::MouseWheel { hi_res: false, .. } => EventType::MouseWheel,
            EventKind::MouseWheel { hi_res: true, .. } => EventType::MouseWheelHiRes,
            EventKind::GamepadAxis { .. } => EventType::GamepadAxis,
            EventKind::DeviceAdded => EventType::DeviceAdded,
            EventKind::DeviceRemoved => EventType::DeviceRemoved,
        }
    }

    /// The key or button involved, if any.
    pub fn key(&self) -> Option<Key> {
        match self.kind {
            EventKind::Key { key, .. } => Some(key),
            EventKind::MouseButton { button, .. } | EventKind::GamepadButton { button, .. } => {
                Some(button)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(kind: EventKind) -> EngineEvent {
        EngineEvent::new(3, Timestamp::default(), kind)
    }

    #[test]
    fn flat_types() {
        let down = at(EventKind::Key {
            key: Key::A,
            state: KeyState::Down,
            pressure: None,
        });
        assert_eq!(down.event_type(), EventType::KeyDown);
        assert_eq!(down.key(), Some(Key::A));

        let wheel = at(EventKind::MouseWheel {
            axis: WheelAxis::Vertical,
            ticks: -1,
            hi_res: true,
        });
        assert_eq!(wheel.event_type(), EventType::MouseWheelHiRes);
        assert_eq!(wheel.key(), None);

        let pad = at(EventKind::GamepadButton {
            button: Key::BtnSouth,
            state: KeyState::Repeat,
            pressure: None,
        });
        assert_eq!(pad.event_type(), EventType::GamepadButtonRepeat);
        assert_eq!(at(EventKind::DeviceRemoved).event_type(), EventType::DeviceRemoved);
    }

    #[test]
    fn serializes_to_json() {
        let ev = at(EventKind::MouseMove {
            axis: MouseAxis::X,
            delta: -4,
        });
        let json = serde_json::to_string(&ev).unwrap();
        let back: EngineEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ev);
    }

    #[test]
    fn now_is_after_epoch() {
        assert!(Timestamp::now().seconds > 0);
    }
}
