use crate::{OneWireGpioAsync, timing};
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;
use onewire_core::{OneWireMasterAsync, OneWireResult};

impl<P, D> OneWireMasterAsync for OneWireGpioAsync<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    type BusError = P::Error;

    async fn reset(&mut self) -> OneWireResult<bool, Self::BusError> {
        self.pin.set_high()?;
        let mut released = false;
        for _ in 0..self.wait_retries {
            if self.pin.is_high()? {
                released = true;
                break;
            }
            self.delay.delay_us(timing::WAIT_PROBE_INTERVAL_US).await;
        }
        if !released {
            return Ok(false);
        }
        self.pin.set_low()?;
        self.delay.delay_us(timing::RESET_LOW_US).await;
        self.pin.set_high()?;
        self.delay.delay_us(timing::RESET_SAMPLE_DELAY_US).await;
        let presence = self.pin.is_low()?;
        self.delay.delay_us(timing::RESET_TAIL_US).await;
        Ok(presence)
    }

    async fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError> {
        if bit {
            self.pin.set_low()?;
            self.delay.delay_us(timing::WRITE_ONE_LOW_US).await;
            self.pin.set_high()?;
            self.delay.delay_us(timing::WRITE_ONE_RELEASE_US).await;
        } else {
            self.pin.set_low()?;
            self.delay.delay_us(timing::WRITE_ZERO_LOW_US).await;
            self.pin.set_high()?;
            self.delay.delay_us(timing::WRITE_ZERO_RELEASE_US).await;
        }
        Ok(())
    }

    async fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError> {
        self.pin.set_low()?;
        self.delay.delay_us(timing::READ_INIT_LOW_US).await;
        self.pin.set_high()?;
        self.delay.delay_us(timing::READ_SAMPLE_DELAY_US).await;
        let bit = self.pin.is_high()?;
        self.delay.delay_us(timing::READ_TAIL_US).await;
        Ok(bit)
    }
}
