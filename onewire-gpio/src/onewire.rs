use crate::{OneWireGpio, timing};
use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};
use onewire_core::{OneWireMaster, OneWireResult};

impl<P, D> OneWireMaster for OneWireGpio<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    type BusError = P::Error;

    fn reset(&mut self) -> OneWireResult<bool, Self::BusError> {
        self.pin.set_high()?;
        let mut released = false;
        for _ in 0..self.wait_retries {
            if self.pin.is_high()? {
                released = true;
                break;
            }
            self.delay.delay_us(timing::WAIT_PROBE_INTERVAL_US);
        }
        if !released {
            // Something else is holding the line; to the protocol that is
            // indistinguishable from an empty bus.
            return Ok(false);
        }
        self.pin.set_low()?;
        self.delay.delay_us(timing::RESET_LOW_US);
        self.pin.set_high()?;
        self.delay.delay_us(timing::RESET_SAMPLE_DELAY_US);
        let presence = self.pin.is_low()?;
        self.delay.delay_us(timing::RESET_TAIL_US);
        Ok(presence)
    }

    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError> {
        if bit {
            self.pin.set_low()?;
            self.delay.delay_us(timing::WRITE_ONE_LOW_US);
            self.pin.set_high()?;
            self.delay.delay_us(timing::WRITE_ONE_RELEASE_US);
        } else {
            self.pin.set_low()?;
            self.delay.delay_us(timing::WRITE_ZERO_LOW_US);
            self.pin.set_high()?;
            self.delay.delay_us(timing::WRITE_ZERO_RELEASE_US);
        }
        Ok(())
    }

    fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError> {
        self.pin.set_low()?;
        self.delay.delay_us(timing::READ_INIT_LOW_US);
        self.pin.set_high()?;
        self.delay.delay_us(timing::READ_SAMPLE_DELAY_US);
        let bit = self.pin.is_high()?;
        self.delay.delay_us(timing::READ_TAIL_US);
        Ok(bit)
    }
}
