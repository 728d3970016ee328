use core::fmt;

use heapless::Vec;

use crate::config::MAX_CHANNELS;

/// Raw per-channel intensity source for the strip.
///
/// Called once per tick; reads must not have side effects the decoder could
/// observe.
pub trait SensorReader {
    fn channel_count(&self) -> usize;
    fn channel_value(&mut self, channel: usize) -> u16;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotError {
    TooManyChannels { count: usize },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyChannels { count } => {
                write!(f, "sensor reports {count} channels, capacity is {MAX_CHANNELS}")
            }
        }
    }
}

/// One tick's worth of channel readings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SensorSnapshot {
    values: Vec<u16, MAX_CHANNELS>,
}

impl SensorSnapshot {
    pub fn capture<S: SensorReader + ?Sized>(sensor: &mut S) -> Result<Self, SnapshotError> {
        let count = sensor.channel_count();
        if count > MAX_CHANNELS {
            return Err(SnapshotError::TooManyChannels { count });
        }

        let mut values = Vec::new();
        for channel in 0..count {
            // Capacity checked above.
            let _ = values.push(sensor.channel_value(channel));
        }
        Ok(Self { values })
    }

    pub fn from_slice(values: &[u16]) -> Result<Self, SnapshotError> {
        Vec::from_slice(values)
            .map(|values| Self { values })
            .map_err(|()| SnapshotError::TooManyChannels {
                count: values.len(),
            })
    }

    pub fn values(&self) -> &[u16] {
        &self.values
    }
}
