//! Engine key vocabulary.
//!
//! [`Key`] mirrors the Linux `input-event-codes.h` key and button enumeration:
//! each variant's discriminant *is* the kernel code, so translation is a single
//! table lookup ([`Key::from_code`]) and codes missing from the table are simply
//! not representable (the event loop drops them).
//!
//! Two code ranges are routed to dedicated event kinds by the translator:
//! - [`MOUSE_BUTTON_CODES`] (`BTN_LEFT..=BTN_TASK`)
//! - [`GAMEPAD_BUTTON_CODES`] (`BTN_SOUTH..=BTN_THUMBR`)
//!
//! Everything else is reported as a keyboard key, including D-pad buttons,
//! legacy joystick buttons, digitizer tool buttons and `BTN_TRIGGER_HAPPY*`.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Mouse button codes (`BTN_LEFT` ..= `BTN_TASK`).
pub const MOUSE_BUTTON_CODES: RangeInclusive<u16> = 0x110..=0x117;
/// Gamepad face, shoulder and stick button codes (`BTN_SOUTH` ..= `BTN_THUMBR`).
pub const GAMEPAD_BUTTON_CODES: RangeInclusive<u16> = 0x130..=0x13e;

macro_rules! key_table {
    ($( $(#[$meta:meta])* $name:ident = $code:literal ),* $(,)?) => {
        /// A key or button, identified by its kernel code.
        #[repr(u16)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Key {
            $( $(#[$meta])* $name = $code, )*
        }

        impl Key {
            /// Every mapped key, in code order.
            pub const ALL: &'static [Key] = &[$(Key::$name),*];

            /// Look up the key for a kernel code. Unmapped codes return `None`.
            pub fn from_code(code: u16) -> Option<Key> {
                match code {
                    $( $code => Some(Key::$name), )*
                    _ => None,
                }
            }
        }
    };
}

key_table! {
    Esc = 1,
    Num1 = 2,
    Num2 = 3,
    Num3 = 4,
    Num4 = 5,
    Num5 = 6,
    Num6 = 7,
    Num7 = 8,
    Num8 = 9,
    Num9 = 10,
    Num0 = 11,
    Minus = 12,
    Equal = 13,
    Backspace = 14,
    Tab = 15,
    Q = 16,
    W = 17,
    E = 18,
    R = 19,
    T = 20,
    Y = 21,
    U = 22,
    I = 23,
    O = 24,
    P = 25,
    LeftBrace = 26,
    RightBrace = 27,
    Enter = 28,
    LeftCtrl = 29,
    A = 30,
    S = 31,
    D = 32,
    F = 33,
    G = 34,
    H = 35,
    J = 36,
    K = 37,
    L = 38,
    Semicolon = 39,
    Apostrophe = 40,
    Grave = 41,
    LeftShift = 42,
    Backslash = 43,
    Z = 44,
    X = 45,
    C = 46,
    V = 47,
    B = 48,
    N = 49,
    M = 50,
    Comma = 51,
    Dot = 52,
    Slash = 53,
    RightShift = 54,
    KpAsterisk = 55,
    LeftAlt = 56,
    Space = 57,
    CapsLock = 58,
    F1 = 59,
    F2 = 60,
    F3 = 61,
    F4 = 62,
    F5 = 63,
    F6 = 64,
    F7 = 65,
    F8 = 66,
    F9 = 67,
    F10 = 68,
    NumLock = 69,
    ScrollLock = 70,
    Kp7 = 71,
    Kp8 = 72,
    Kp9 = 73,
    KpMinus = 74,
    Kp4 = 75,
    Kp5 = 76,
    Kp6 = 77,
    KpPlus = 78,
    Kp1 = 79,
    Kp2 = 80,
    Kp3 = 81,
    Kp0 = 82,
    KpDot = 83,
    ZenkakuHankaku = 85,
    /// `KEY_102ND`, the extra key left of Z on ISO layouts.
    NonUsBackslash = 86,
    F11 = 87,
    F12 = 88,
    Ro = 89,
    Katakana = 90,
    Hiragana = 91,
    Henkan = 92,
    KatakanaHiragana = 93,
    Muhenkan = 94,
    KpJpComma = 95,
    KpEnter = 96,
    RightCtrl = 97,
    KpSlash = 98,
    SysRq = 99,
    RightAlt = 100,
    LineFeed = 101,
    Home = 102,
    Up = 103,
    PageUp = 104,
    Left = 105,
    Right = 106,
    End = 107,
    Down = 108,
    PageDown = 109,
    Insert = 110,
    Delete = 111,
    Macro = 112,
    Mute = 113,
    VolumeDown = 114,
    VolumeUp = 115,
    Power = 116,
    KpEqual = 117,
    KpPlusMinus = 118,
    Pause = 119,
    Scale = 120,
    KpComma = 121,
    Hangeul = 122,
    Hanja = 123,
    Yen = 124,
    LeftMeta = 125,
    RightMeta = 126,
    Compose = 127,
    Stop = 128,
    Again = 129,
    Props = 130,
    Undo = 131,
    Front = 132,
    Copy = 133,
    Open = 134,
    Paste = 135,
    Find = 136,
    Cut = 137,
    Help = 138,
    Menu = 139,
    Calc = 140,
    Setup = 141,
    Sleep = 142,
    WakeUp = 143,
    File = 144,
    SendFile = 145,
    DeleteFile = 146,
    Xfer = 147,
    Prog1 = 148,
    Prog2 = 149,
    Www = 150,
    MsDos = 151,
    /// `KEY_COFFEE` / `KEY_SCREENLOCK`.
    ScreenLock = 152,
    RotateDisplay = 153,
    CycleWindows = 154,
    Mail = 155,
    Bookmarks = 156,
    Computer = 157,
    Back = 158,
    Forward = 159,
    CloseCd = 160,
    EjectCd = 161,
    EjectCloseCd = 162,
    NextSong = 163,
    PlayPause = 164,
    PreviousSong = 165,
    StopCd = 166,
    Record = 167,
    Rewind = 168,
    Phone = 169,
    Iso = 170,
    Config = 171,
    HomePage = 172,
    Refresh = 173,
    Exit = 174,
    Move = 175,
    Edit = 176,
    ScrollUp = 177,
    ScrollDown = 178,
    KpLeftParen = 179,
    KpRightParen = 180,
    New = 181,
    Redo = 182,
    F13 = 183,
    F14 = 184,
    F15 = 185,
    F16 = 186,
    F17 = 187,
    F18 = 188,
    F19 = 189,
    F20 = 190,
    F21 = 191,
    F22 = 192,
    F23 = 193,
    F24 = 194,
    PlayCd = 200,
    PauseCd = 201,
    Prog3 = 202,
    Prog4 = 203,
    AllApplications = 204,
    Suspend = 205,
    Close = 206,
    Play = 207,
    FastForward = 208,
    BassBoost = 209,
    Print = 210,
    Hp = 211,
    Camera = 212,
    Sound = 213,
    Question = 214,
    Email = 215,
    Chat = 216,
    Search = 217,
    Connect = 218,
    Finance = 219,
    Sport = 220,
    Shop = 221,
    AltErase = 222,
    Cancel = 223,
    BrightnessDown = 224,
    BrightnessUp = 225,
    Media = 226,
    SwitchVideoMode = 227,
    KbdIllumToggle = 228,
    KbdIllumDown = 229,
    KbdIllumUp = 230,
    Send = 231,
    Reply = 232,
    ForwardMail = 233,
    Save = 234,
    Documents = 235,
    Battery = 236,
    Bluetooth = 237,
    Wlan = 238,
    Uwb = 239,
    /// `KEY_UNKNOWN`: the keyboard reported a key it has no code for.
    UnknownKey = 240,
    VideoNext = 241,
    VideoPrev = 242,
    BrightnessCycle = 243,
    BrightnessAuto = 244,
    DisplayOff = 245,
    Wwan = 246,
    RfKill = 247,
    MicMute = 248,

    Btn0 = 0x100,
    Btn1 = 0x101,
    Btn2 = 0x102,
    Btn3 = 0x103,
    Btn4 = 0x104,
    Btn5 = 0x105,
    Btn6 = 0x106,
    Btn7 = 0x107,
    Btn8 = 0x108,
    Btn9 = 0x109,

    BtnLeft = 0x110,
    BtnRight = 0x111,
    BtnMiddle = 0x112,
    BtnSide = 0x113,
    BtnExtra = 0x114,
    BtnForward = 0x115,
    BtnBack = 0x116,
    BtnTask = 0x117,

    BtnTrigger = 0x120,
    BtnThumb = 0x121,
    BtnThumb2 = 0x122,
    BtnTop = 0x123,
    BtnTop2 = 0x124,
    BtnPinkie = 0x125,
    BtnBase = 0x126,
    BtnBase2 = 0x127,
    BtnBase3 = 0x128,
    BtnBase4 = 0x129,
    BtnBase5 = 0x12a,
    BtnBase6 = 0x12b,
    BtnDead = 0x12f,

    /// `BTN_SOUTH` / `BTN_A`.
    BtnSouth = 0x130,
    /// `BTN_EAST` / `BTN_B`.
    BtnEast = 0x131,
    BtnC = 0x132,
    /// `BTN_NORTH` / `BTN_X`.
    BtnNorth = 0x133,
    /// `BTN_WEST` / `BTN_Y`.
    BtnWest = 0x134,
    BtnZ = 0x135,
    BtnTl = 0x136,
    BtnTr = 0x137,
    BtnTl2 = 0x138,
    BtnTr2 = 0x139,
    BtnSelect = 0x13a,
    BtnStart = 0x13b,
    BtnMode = 0x13c,
    BtnThumbL = 0x13d,
    BtnThumbR = 0x13e,

    /// `BTN_DIGI` / `BTN_TOOL_PEN`.
    BtnToolPen = 0x140,
    BtnToolRubber = 0x141,
    BtnToolBrush = 0x142,
    BtnToolPencil = 0x143,
    BtnToolAirbrush = 0x144,
    BtnToolFinger = 0x145,
    BtnToolMouse = 0x146,
    BtnToolLens = 0x147,
    BtnToolQuintTap = 0x148,
    BtnStylus3 = 0x149,
    BtnTouch = 0x14a,
    BtnStylus = 0x14b,
    BtnStylus2 = 0x14c,
    BtnToolDoubleTap = 0x14d,
    BtnToolTripleTap = 0x14e,
    BtnToolQuadTap = 0x14f,
    /// `BTN_WHEEL` / `BTN_GEAR_DOWN`.
    BtnGearDown = 0x150,
    BtnGearUp = 0x151,

    Ok = 0x160,
    Select = 0x161,
    Goto = 0x162,
    Clear = 0x163,
    Power2 = 0x164,
    Option = 0x165,
    Info = 0x166,
    Time = 0x167,
    Vendor = 0x168,
    Archive = 0x169,
    Program = 0x16a,
    Channel = 0x16b,
    Favorites = 0x16c,
    Epg = 0x16d,
    Pvr = 0x16e,
    Mhp = 0x16f,
    Language = 0x170,
    Title = 0x171,
    Subtitle = 0x172,
    Angle = 0x173,
    FullScreen = 0x174,
    Mode = 0x175,
    Keyboard = 0x176,
    AspectRatio = 0x177,
    Pc = 0x178,
    Tv = 0x179,
    Tv2 = 0x17a,
    Vcr = 0x17b,
    Vcr2 = 0x17c,
    Sat = 0x17d,
    Sat2 = 0x17e,
    Cd = 0x17f,
    Tape = 0x180,
    Radio = 0x181,
    Tuner = 0x182,
    Player = 0x183,
    Text = 0x184,
    Dvd = 0x185,
    Aux = 0x186,
    Mp3 = 0x187,
    Audio = 0x188,
    Video = 0x189,
    Directory = 0x18a,
    List = 0x18b,
    Memo = 0x18c,
    Calendar = 0x18d,
    Red = 0x18e,
    Green = 0x18f,
    Yellow = 0x190,
    Blue = 0x191,
    ChannelUp = 0x192,
    ChannelDown = 0x193,
    First = 0x194,
    Last = 0x195,
    Ab = 0x196,
    Next = 0x197,
    Restart = 0x198,
    Slow = 0x199,
    Shuffle = 0x19a,
    Break = 0x19b,
    Previous = 0x19c,
    Digits = 0x19d,
    Teen = 0x19e,
    Twen = 0x19f,
    VideoPhone = 0x1a0,
    Games = 0x1a1,
    ZoomIn = 0x1a2,
    ZoomOut = 0x1a3,
    ZoomReset = 0x1a4,
    WordProcessor = 0x1a5,
    Editor = 0x1a6,
    Spreadsheet = 0x1a7,
    GraphicsEditor = 0x1a8,
    Presentation = 0x1a9,
    Database = 0x1aa,
    News = 0x1ab,
    VoiceMail = 0x1ac,
    AddressBook = 0x1ad,
    Messenger = 0x1ae,
    DisplayToggle = 0x1af,
    SpellCheck = 0x1b0,
    LogOff = 0x1b1,
    Dollar = 0x1b2,
    Euro = 0x1b3,
    FrameBack = 0x1b4,
    FrameForward = 0x1b5,
    ContextMenu = 0x1b6,
    MediaRepeat = 0x1b7,
    TenChannelsUp = 0x1b8,
    TenChannelsDown = 0x1b9,
    Images = 0x1ba,

    NotificationCenter = 0x1bc,
    PickupPhone = 0x1bd,
    HangupPhone = 0x1be,
    LinkPhone = 0x1bf,
    DelEol = 0x1c0,
    DelEos = 0x1c1,
    InsLine = 0x1c2,
    DelLine = 0x1c3,

    Fn = 0x1d0,
    FnEsc = 0x1d1,
    FnF1 = 0x1d2,
    FnF2 = 0x1d3,
    FnF3 = 0x1d4,
    FnF4 = 0x1d5,
    FnF5 = 0x1d6,
    FnF6 = 0x1d7,
    FnF7 = 0x1d8,
    FnF8 = 0x1d9,
    FnF9 = 0x1da,
    FnF10 = 0x1db,
    FnF11 = 0x1dc,
    FnF12 = 0x1dd,
    Fn1 = 0x1de,
    Fn2 = 0x1df,
    FnD = 0x1e0,
    FnE = 0x1e1,
    FnF = 0x1e2,
    FnS = 0x1e3,
    FnB = 0x1e4,
    FnRightShift = 0x1e5,

    BrlDot1 = 0x1f1,
    BrlDot2 = 0x1f2,
    BrlDot3 = 0x1f3,
    BrlDot4 = 0x1f4,
    BrlDot5 = 0x1f5,
    BrlDot6 = 0x1f6,
    BrlDot7 = 0x1f7,
    BrlDot8 = 0x1f8,
    BrlDot9 = 0x1f9,
    BrlDot10 = 0x1fa,

    Numeric0 = 0x200,
    Numeric1 = 0x201,
    Numeric2 = 0x202,
    Numeric3 = 0x203,
    Numeric4 = 0x204,
    Numeric5 = 0x205,
    Numeric6 = 0x206,
    Numeric7 = 0x207,
    Numeric8 = 0x208,
    Numeric9 = 0x209,
    NumericStar = 0x20a,
    NumericPound = 0x20b,
    NumericA = 0x20c,
    NumericB = 0x20d,
    NumericC = 0x20e,
    NumericD = 0x20f,
    CameraFocus = 0x210,
    WpsButton = 0x211,
    TouchpadToggle = 0x212,
    TouchpadOn = 0x213,
    TouchpadOff = 0x214,
    CameraZoomIn = 0x215,
    CameraZoomOut = 0x216,
    CameraUp = 0x217,
    CameraDown = 0x218,
    CameraLeft = 0x219,
    CameraRight = 0x21a,
    AttendantOn = 0x21b,
    AttendantOff = 0x21c,
    AttendantToggle = 0x21d,
    LightsToggle = 0x21e,

    BtnDpadUp = 0x220,
    BtnDpadDown = 0x221,
    BtnDpadLeft = 0x222,
    BtnDpadRight = 0x223,

    AlsToggle = 0x230,
    RotateLockToggle = 0x231,
    RefreshRateToggle = 0x232,

    ButtonConfig = 0x240,
    TaskManager = 0x241,
    Journal = 0x242,
    ControlPanel = 0x243,
    AppSelect = 0x244,
    ScreenSaver = 0x245,
    VoiceCommand = 0x246,
    Assistant = 0x247,
    KbdLayoutNext = 0x248,
    EmojiPicker = 0x249,
    Dictate = 0x24a,

    BrightnessMin = 0x250,
    BrightnessMax = 0x251,

    KbdInputAssistPrev = 0x260,
    KbdInputAssistNext = 0x261,
    KbdInputAssistPrevGroup = 0x262,
    KbdInputAssistNextGroup = 0x263,
    KbdInputAssistAccept = 0x264,
    KbdInputAssistCancel = 0x265,
    RightUp = 0x266,
    RightDown = 0x267,
    LeftUp = 0x268,
    LeftDown = 0x269,
    RootMenu = 0x26a,
    MediaTopMenu = 0x26b,
    Numeric11 = 0x26c,
    Numeric12 = 0x26d,
    AudioDesc = 0x26e,
    Mode3d = 0x26f,
    NextFavorite = 0x270,
    StopRecord = 0x271,
    PauseRecord = 0x272,
    Vod = 0x273,
    Unmute = 0x274,
    FastReverse = 0x275,
    SlowReverse = 0x276,
    Data = 0x277,
    OnscreenKeyboard = 0x278,
    PrivacyScreenToggle = 0x279,
    SelectiveScreenshot = 0x27a,
    NextElement = 0x27b,
    PreviousElement = 0x27c,
    AutopilotEngageToggle = 0x27d,
    MarkWaypoint = 0x27e,
    Sos = 0x27f,
    NavChart = 0x280,
    FishingChart = 0x281,
    SingleRangeRadar = 0x282,
    DualRangeRadar = 0x283,
    RadarOverlay = 0x284,
    TraditionalSonar = 0x285,
    ClearVuSonar = 0x286,
    SideVuSonar = 0x287,
    NavInfo = 0x288,
    BrightnessMenu = 0x289,

    Macro1 = 0x290,
    Macro2 = 0x291,
    Macro3 = 0x292,
    Macro4 = 0x293,
    Macro5 = 0x294,
    Macro6 = 0x295,
    Macro7 = 0x296,
    Macro8 = 0x297,
    Macro9 = 0x298,
    Macro10 = 0x299,
    Macro11 = 0x29a,
    Macro12 = 0x29b,
    Macro13 = 0x29c,
    Macro14 = 0x29d,
    Macro15 = 0x29e,
    Macro16 = 0x29f,
    Macro17 = 0x2a0,
    Macro18 = 0x2a1,
    Macro19 = 0x2a2,
    Macro20 = 0x2a3,
    Macro21 = 0x2a4,
    Macro22 = 0x2a5,
    Macro23 = 0x2a6,
    Macro24 = 0x2a7,
    Macro25 = 0x2a8,
    Macro26 = 0x2a9,
    Macro27 = 0x2aa,
    Macro28 = 0x2ab,
    Macro29 = 0x2ac,
    Macro30 = 0x2ad,

    MacroRecordStart = 0x2b0,
    MacroRecordStop = 0x2b1,
    MacroPresetCycle = 0x2b2,
    MacroPreset1 = 0x2b3,
    MacroPreset2 = 0x2b4,
    MacroPreset3 = 0x2b5,

    KbdLcdMenu1 = 0x2b8,
    KbdLcdMenu2 = 0x2b9,
    KbdLcdMenu3 = 0x2ba,
    KbdLcdMenu4 = 0x2bb,
    KbdLcdMenu5 = 0x2bc,

    /// `BTN_TRIGGER_HAPPY` / `BTN_TRIGGER_HAPPY1`.
    BtnTriggerHappy1 = 0x2c0,
    BtnTriggerHappy2 = 0x2c1,
    BtnTriggerHappy3 = 0x2c2,
    BtnTriggerHappy4 = 0x2c3,
    BtnTriggerHappy5 = 0x2c4,
    BtnTriggerHappy6 = 0x2c5,
    BtnTriggerHappy7 = 0x2c6,
    BtnTriggerHappy8 = 0x2c7,
    BtnTriggerHappy9 = 0x2c8,
    BtnTriggerHappy10 = 0x2c9,
    BtnTriggerHappy11 = 0x2ca,
    BtnTriggerHappy12 = 0x2cb,
    BtnTriggerHappy13 = 0x2cc,
    BtnTriggerHappy14 = 0x2cd,
    BtnTriggerHappy15 = 0x2ce,
    BtnTriggerHappy16 = 0x2cf,
    BtnTriggerHappy17 = 0x2d0,
    BtnTriggerHappy18 = 0x2d1,
    BtnTriggerHappy19 = 0x2d2,
    BtnTriggerHappy20 = 0x2d3,
    BtnTriggerHappy21 = 0x2d4,
    BtnTriggerHappy22 = 0x2d5,
    BtnTriggerHappy23 = 0x2d6,
    BtnTriggerHappy24 = 0x2d7,
    BtnTriggerHappy25 = 0x2d8,
    BtnTriggerHappy26 = 0x2d9,
    BtnTriggerHappy27 = 0x2da,
    BtnTriggerHappy28 = 0x2db,
    BtnTriggerHappy29 = 0x2dc,
    BtnTriggerHappy30 = 0x2dd,
    BtnTriggerHappy31 = 0x2de,
    BtnTriggerHappy32 = 0x2df,
    BtnTriggerHappy33 = 0x2e0,
    BtnTriggerHappy34 = 0x2e1,
    BtnTriggerHappy35 = 0x2e2,
    BtnTriggerHappy36 = 0x2e3,
    BtnTriggerHappy37 = 0x2e4,
    BtnTriggerHappy38 = 0x2e5,
    BtnTriggerHappy39 = 0x2e6,
    BtnTriggerHappy40 = 0x2e7,
}

impl Key {
    /// Kernel code of this key.
    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }

    #[inline]
    pub fn is_mouse_button(self) -> bool {
        MOUSE_BUTTON_CODES.contains(&self.code())
    }

    #[inline]
    pub fn is_gamepad_button(self) -> bool {
        GAMEPAD_BUTTON_CODES.contains(&self.code())
    }
}
