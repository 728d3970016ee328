pub const HID_REPORT_LEN: usize = 4;

/// Left GUI (Windows/Command) in the keyboard modifier byte.
pub const MODIFIER_LEFT_GUI: u8 = 0x08;
/// HID keyboard usage for `L`.
pub const KEY_CODE_L: u8 = 0x0F;

/// Keys the strip can press. Consumer-control keys carry their bit position in
/// byte 0 as the discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum KeyAction {
    VolumeUp = 0,
    VolumeDown = 1,
    BrightnessUp = 2,
    BrightnessDown = 3,
    MicMute = 4,
    /// GUI+L on the keyboard collection.
    LockWorkstation = 5,
}

impl KeyAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::VolumeUp => "volume_up",
            Self::VolumeDown => "volume_down",
            Self::BrightnessUp => "brightness_up",
            Self::BrightnessDown => "brightness_down",
            Self::MicMute => "mic_mute",
            Self::LockWorkstation => "lock_workstation",
        }
    }

    /// Report fields with this key held down.
    pub const fn pressed(self) -> HidReport {
        match self {
            Self::LockWorkstation => HidReport {
                modifiers: MODIFIER_LEFT_GUI,
                key_code: KEY_CODE_L,
                ..HidReport::EMPTY
            },
            consumer => HidReport {
                consumer: 1 << consumer as u8,
                ..HidReport::EMPTY
            },
        }
    }
}

/// The device's single input report.
///
/// ```text
/// byte 0  consumer keys: b0 vol+, b1 vol-, b2 bright+, b3 bright-, b4 mic mute
/// byte 1  wheel, signed -127..=127
/// byte 2  keyboard modifiers
/// byte 3  keyboard key code
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HidReport {
    pub consumer: u8,
    pub scroll: i8,
    pub modifiers: u8,
    pub key_code: u8,
}

impl HidReport {
    /// Releases everything; also the key-up half of every key press.
    pub const EMPTY: Self = Self {
        consumer: 0,
        scroll: 0,
        modifiers: 0,
        key_code: 0,
    };

    pub const fn to_bytes(self) -> [u8; HID_REPORT_LEN] {
        [
            self.consumer,
            self.scroll as u8,
            self.modifiers,
            self.key_code,
        ]
    }

    pub const fn from_bytes(bytes: [u8; HID_REPORT_LEN]) -> Self {
        Self {
            consumer: bytes[0],
            scroll: bytes[1] as i8,
            modifiers: bytes[2],
            key_code: bytes[3],
        }
    }

    pub const fn with_scroll(self, scroll: i8) -> Self {
        Self { scroll, ..self }
    }
}
