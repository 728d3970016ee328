use core::fmt;

/// Sampling cadence of the gesture tick.
pub const TICK_MS: u64 = 20;
/// A touch shorter than this many ticks (300 ms) can still be a tap.
pub const TAP_MAX_TICKS: u32 = 15;
/// A second tap must land within this many ticks (400 ms) of the first.
pub const DOUBLE_TAP_WINDOW_TICKS: u32 = 20;
pub const SLIDE_QUEUE_LEN: usize = 4;
pub const MAX_CHANNELS: usize = 16;
pub const MAX_SCALE: u8 = 16;
/// Time the strip is ignored after power-up, so a finger still resting on it
/// while the device is plugged in does not produce gestures.
pub const STARTUP_GRACE_MS: u64 = 2_000;

/// What a slide along the strip controls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum SlideFunction {
    #[default]
    Volume = 0,
    Brightness = 1,
    Scroll = 2,
}

impl SlideFunction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::Brightness => "brightness",
            Self::Scroll => "scroll",
        }
    }
}

impl TryFrom<u8> for SlideFunction {
    type Error = ConfigError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Volume),
            1 => Ok(Self::Brightness),
            2 => Ok(Self::Scroll),
            other => Err(ConfigError::UnknownFunction(other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    ScaleOutOfRange { scale: u8 },
    UnknownFunction(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScaleOutOfRange { scale } => {
                write!(f, "scale {scale} outside 1..={MAX_SCALE}")
            }
            Self::UnknownFunction(raw) => write!(f, "unknown slide function {raw}"),
        }
    }
}

/// Device settings owned by the configuration store. The decoder only reads
/// them, once per tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceConfiguration {
    pub flip: bool,
    pub scale: u8,
    pub function: SlideFunction,
}

impl Default for DeviceConfiguration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl DeviceConfiguration {
    pub const DEFAULT: Self = Self {
        flip: false,
        scale: 1,
        function: SlideFunction::Volume,
    };

    pub fn new(flip: bool, scale: u8, function: SlideFunction) -> Result<Self, ConfigError> {
        if scale == 0 || scale > MAX_SCALE {
            return Err(ConfigError::ScaleOutOfRange { scale });
        }
        Ok(Self {
            flip,
            scale,
            function,
        })
    }

    /// Builds a configuration from the raw bytes a persisted record carries.
    pub fn from_raw(flip: u8, scale: u8, function: u8) -> Result<Self, ConfigError> {
        Self::new(flip != 0, scale, SlideFunction::try_from(function)?)
    }

    /// Applies flip and scale to a raw channel displacement, saturated to the
    /// signed range a single report field can carry.
    pub fn shape_delta(&self, delta: i32) -> i8 {
        let oriented = if self.flip { -delta } else { delta };
        oriented
            .saturating_mul(i32::from(self.scale))
            .clamp(-i32::from(i8::MAX), i32::from(i8::MAX)) as i8
    }
}

/// Read-only view of wherever the device settings live.
pub trait ConfigurationStore {
    fn configuration(&self) -> DeviceConfiguration;
}

impl ConfigurationStore for DeviceConfiguration {
    fn configuration(&self) -> DeviceConfiguration {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_and_oversized_scale() {
        assert_eq!(
            DeviceConfiguration::new(false, 0, SlideFunction::Volume),
            Err(ConfigError::ScaleOutOfRange { scale: 0 })
        );
        assert_eq!(
            DeviceConfiguration::new(false, MAX_SCALE + 1, SlideFunction::Volume),
            Err(ConfigError::ScaleOutOfRange {
                scale: MAX_SCALE + 1
            })
        );
        assert!(DeviceConfiguration::new(true, MAX_SCALE, SlideFunction::Scroll).is_ok());
    }

    #[test]
    fn raw_record_decodes_function_byte() {
        let config = DeviceConfiguration::from_raw(1, 3, 2).expect("valid record");
        assert!(config.flip);
        assert_eq!(config.scale, 3);
        assert_eq!(config.function, SlideFunction::Scroll);

        assert_eq!(
            DeviceConfiguration::from_raw(0, 1, 9),
            Err(ConfigError::UnknownFunction(9))
        );
    }

    #[test]
    fn shape_delta_flips_scales_and_saturates() {
        let plain = DeviceConfiguration::new(false, 4, SlideFunction::Volume).unwrap();
        assert_eq!(plain.shape_delta(-2), -8);

        let flipped = DeviceConfiguration::new(true, 4, SlideFunction::Volume).unwrap();
        assert_eq!(flipped.shape_delta(-2), 8);

        let wide = DeviceConfiguration::new(false, MAX_SCALE, SlideFunction::Scroll).unwrap();
        assert_eq!(wide.shape_delta(15), 127);
        assert_eq!(wide.shape_delta(-15), -127);
    }
}
