//! Peripheral classification shared by every backend.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a discovered peripheral was classified as.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeripheralKind {
    Keyboard,
    Mouse,
    Gamepad,
    /// No classification rule matched. Such peripherals are listed but never opened.
    #[default]
    Unknown,
}

bitflags! {
    /// Set of [`PeripheralKind`]s, used to select which peripherals to open or watch.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct PeripheralKinds: u8 {
        const KEYBOARD = 0x01;
        const MOUSE = 0x02;
        const GAMEPAD = 0x04;
        const UNKNOWN = 0x08;
        /// Every classified kind (excludes `UNKNOWN`).
        const ALL_KNOWN = Self::KEYBOARD.bits() | Self::MOUSE.bits() | Self::GAMEPAD.bits();
        const ALL = Self::ALL_KNOWN.bits() | Self::UNKNOWN.bits();
    }
}

impl PeripheralKind {
    /// The single-bit mask for this kind.
    pub fn as_flag(self) -> PeripheralKinds {
        match self {
            PeripheralKind::Keyboard => PeripheralKinds::KEYBOARD,
            PeripheralKind::Mouse => PeripheralKinds::MOUSE,
            PeripheralKind::Gamepad => PeripheralKinds::GAMEPAD,
            PeripheralKind::Unknown => PeripheralKinds::UNKNOWN,
        }
    }

    #[inline]
    pub fn is_known(self) -> bool {
        self != PeripheralKind::Unknown
    }
}

impl PeripheralKinds {
    /// Whether `kind` is selected by this mask.
    #[inline]
    pub fn includes(self, kind: PeripheralKind) -> bool {
        self.contains(kind.as_flag())
    }
}

impl fmt::Display for PeripheralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PeripheralKind::Keyboard => "keyboard",
            PeripheralKind::Mouse => "mouse",
            PeripheralKind::Gamepad => "gamepad",
            PeripheralKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}
