use esp_hal::{
    analog::adc::{Adc, AdcConfig, AdcPin, Attenuation},
    peripherals::{ADC1, GPIO1, GPIO2, GPIO3, GPIO4},
    Blocking,
};
use log::warn;
use soundslide::SensorReader;

const STRIP_CHANNELS: usize = 4;

/// Four sense pads along the strip, read through ADC1 one-shot conversions.
pub(crate) struct AdcStrip {
    adc: Adc<'static, ADC1<'static>, Blocking>,
    pad0: AdcPin<GPIO1<'static>, ADC1<'static>>,
    pad1: AdcPin<GPIO2<'static>, ADC1<'static>>,
    pad2: AdcPin<GPIO3<'static>, ADC1<'static>>,
    pad3: AdcPin<GPIO4<'static>, ADC1<'static>>,
}

impl AdcStrip {
    pub(crate) fn new(
        adc1: ADC1<'static>,
        pin0: GPIO1<'static>,
        pin1: GPIO2<'static>,
        pin2: GPIO3<'static>,
        pin3: GPIO4<'static>,
    ) -> Self {
        let mut config = AdcConfig::new();
        let pad0 = config.enable_pin(pin0, Attenuation::_11dB);
        let pad1 = config.enable_pin(pin1, Attenuation::_11dB);
        let pad2 = config.enable_pin(pin2, Attenuation::_11dB);
        let pad3 = config.enable_pin(pin3, Attenuation::_11dB);
        Self {
            adc: Adc::new(adc1, config),
            pad0,
            pad1,
            pad2,
            pad3,
        }
    }
}

impl SensorReader for AdcStrip {
    fn channel_count(&self) -> usize {
        STRIP_CHANNELS
    }

    fn channel_value(&mut self, channel: usize) -> u16 {
        let reading = match channel {
            0 => nb::block!(self.adc.read_oneshot(&mut self.pad0)),
            1 => nb::block!(self.adc.read_oneshot(&mut self.pad1)),
            2 => nb::block!(self.adc.read_oneshot(&mut self.pad2)),
            3 => nb::block!(self.adc.read_oneshot(&mut self.pad3)),
            _ => Ok(0),
        };
        reading.unwrap_or_else(|()| {
            warn!("strip: adc_read_failed channel={}", channel);
            0
        })
    }
}
