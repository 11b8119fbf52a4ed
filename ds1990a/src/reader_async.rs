use crate::control::{ControlMessage, ReaderEvent};
use crate::reader::{KeyReader, POLL_INTERVAL_US};
use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;
use onewire_core::{OneWireMasterAsync, OneWireResult, consts::ONEWIRE_READ_ROM_CMD};

impl<'k> KeyReader<'k> {
    /// One read attempt over an async bus; the async twin of
    /// [`poll`](Self::poll).
    ///
    /// # Errors
    /// Transport errors propagate; a missing key is `Ok(None)`, not an
    /// error.
    pub async fn poll_async<B: OneWireMasterAsync>(
        &mut self,
        bus: &mut B,
    ) -> OneWireResult<Option<ReaderEvent>, B::BusError> {
        let Some(dest) = self.dest.as_mut() else {
            return Ok(None);
        };
        if !self.enabled {
            return Ok(None);
        }
        if !bus.reset().await? {
            return Ok(None);
        }
        bus.write_byte(ONEWIRE_READ_ROM_CMD).await?;
        bus.read_bytes(dest.as_bytes_mut()).await?;
        self.enabled = false;
        self.dest = None;
        Ok(Some(ReaderEvent::KeyPresent))
    }

    /// Run the poll loop until a key is captured.
    ///
    /// While disabled the task parks on the control mailbox and costs
    /// nothing. While enabled it wakes every 50 ms for one read attempt,
    /// and reacts to a fresh control message within one interval, so a
    /// disable request cancels the polling after at most one more attempt.
    ///
    /// # Errors
    /// Transport errors from the underlying bus end the loop.
    pub async fn next_event<M, B, D>(
        &mut self,
        bus: &mut B,
        delay: &mut D,
        control: &Signal<M, ControlMessage<'k>>,
    ) -> OneWireResult<ReaderEvent, B::BusError>
    where
        M: RawMutex,
        B: OneWireMasterAsync,
        D: DelayNs,
    {
        loop {
            if !self.enabled {
                let message = control.wait().await;
                self.control(message);
                continue;
            }
            match select(control.wait(), delay.delay_us(POLL_INTERVAL_US)).await {
                Either::First(message) => self.control(message),
                Either::Second(()) => {
                    if let Some(event) = self.poll_async(bus).await? {
                        return Ok(event);
                    }
                }
            }
        }
    }
}
