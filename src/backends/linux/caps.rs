//! Capability bitmasks from the `B:` lines of the device list.
//!
//! The kernel prints each bitmap as space separated hex words, most significant
//! word first, with leading zero words omitted:
//!
//! ```text
//! B: EV=120013
//! B: KEY=1000000000007 ff9f207ac14057ff febeffdfffefffff fffffffffffffffe
//! B: REL=1943
//! ```
//!
//! So the *last* word holds bits `0..64`. A single word is just the plain
//! base-16 integer.

/// Words kept per bitmap. Bits beyond `64 * MAX_BITMASK_WORDS` read as unset.
pub const MAX_BITMASK_WORDS: usize = 8;

// Event classes (`EV_*`).
pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_REL: u16 = 0x02;
pub const EV_ABS: u16 = 0x03;
pub const EV_MSC: u16 = 0x04;

// Relative axes (`REL_*`).
pub const REL_X: u16 = 0x00;
pub const REL_Y: u16 = 0x01;
pub const REL_RX: u16 = 0x03;
pub const REL_RY: u16 = 0x04;
pub const REL_HWHEEL: u16 = 0x06;
pub const REL_WHEEL: u16 = 0x08;
pub const REL_WHEEL_HI_RES: u16 = 0x0b;
pub const REL_HWHEEL_HI_RES: u16 = 0x0c;

// Absolute axes (`ABS_*`).
pub const ABS_X: u16 = 0x00;
pub const ABS_Y: u16 = 0x01;
pub const ABS_Z: u16 = 0x02;
pub const ABS_RX: u16 = 0x03;
pub const ABS_RY: u16 = 0x04;
pub const ABS_RZ: u16 = 0x05;
pub const ABS_HAT0X: u16 = 0x10;
pub const ABS_HAT0Y: u16 = 0x11;

/// A multi-word capability bitmap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bitmask {
    /// `words[0]` holds bits `0..64`.
    words: [u64; MAX_BITMASK_WORDS],
}

impl Bitmask {
    /// Parse a `B:` line value. Unparseable words read as zero, words beyond
    /// [`MAX_BITMASK_WORDS`] (the most significant ones) are discarded.
    pub fn parse(text: &str) -> Self {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let mut words = [0u64; MAX_BITMASK_WORDS];
        for (slot, token) in tokens.iter().rev().take(MAX_BITMASK_WORDS).enumerate() {
            words[slot] = parse_hex_word(token);
        }
        Self { words }
    }

    #[inline]
    pub fn test(&self, bit: u16) -> bool {
        let bit = bit as usize;
        match self.words.get(bit / 64) {
            Some(word) => (word >> (bit % 64)) & 1 == 1,
            None => false,
        }
    }

    /// Low 64 bits.
    #[inline]
    pub fn low_word(&self) -> u64 {
        self.words[0]
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }
}

/// Leading hex digits of `token`, like `strtoul(.., 16)`. Overflow saturates.
fn parse_hex_word(token: &str) -> u64 {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    let end = digits
        .find(|c: char| !c.is_ascii_hexdigit())
        .unwrap_or(digits.len());
    if end == 0 {
        return 0;
    }
    u64::from_str_radix(&digits[..end], 16).unwrap_or(u64::MAX)
}

/// Capability flags the classifier looks at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub has_key: bool,
    pub has_rel: bool,
    pub has_abs: bool,
    pub has_rel_x: bool,
    pub has_rel_y: bool,
    pub has_abs_x: bool,
    pub has_abs_y: bool,
    pub has_abs_rx: bool,
    pub has_abs_ry: bool,
}

impl Capabilities {
    /// Derive flags from the raw `EV`, `ABS` and `REL` values. Missing fields
    /// count as empty bitmaps.
    pub fn from_fields(ev: Option<&str>, abs: Option<&str>, rel: Option<&str>) -> Self {
        let ev = ev.map(Bitmask::parse).unwrap_or_default();
        let abs = abs.map(Bitmask::parse).unwrap_or_default();
        let rel = rel.map(Bitmask::parse).unwrap_or_default();

        Self {
            has_key: ev.test(EV_KEY),
            has_rel: ev.test(EV_REL),
            has_abs: ev.test(EV_ABS),
            has_rel_x: rel.test(REL_X),
            has_rel_y: rel.test(REL_Y),
            has_abs_x: abs.test(ABS_X),
            has_abs_y: abs.test(ABS_Y),
            has_abs_rx: abs.test(ABS_RX),
            has_abs_ry: abs.test(ABS_RY),
        }
    }

    pub fn is_pointer(&self) -> bool {
        self.has_rel && self.has_rel_x && self.has_rel_y
    }

    pub fn has_dual_sticks(&self) -> bool {
        self.has_abs_x && self.has_abs_y && self.has_abs_rx && self.has_abs_ry
    }
}
