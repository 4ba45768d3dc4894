//! Sub-GHz radio transmit trait

/// Transmit path of a sub-GHz transceiver
///
/// Implementations wrap a specific chip (CC1101, SX127x, ...). All calls
/// are synchronous; `start_tx` blocks until the chip reports that the
/// packet went out or that it failed.
pub trait SubGhzRadio {
    /// Error type for bus or chip failures
    type Error;

    /// Discard anything left in the transmit buffer
    fn flush_tx(&mut self) -> Result<(), Self::Error>;

    /// Tune to `frequency_hz` and select the matching RF path
    ///
    /// Returns the frequency actually achieved, which may differ from the
    /// request because of synthesizer quantization.
    fn set_frequency_and_path(&mut self, frequency_hz: u32) -> Result<u32, Self::Error>;

    /// Check whether `frequency_hz` is legal for this radio
    fn is_frequency_valid(&self, frequency_hz: u32) -> bool;

    /// Load a packet into the transmit buffer
    fn write_packet(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Transmit the loaded packet
    ///
    /// Returns an error if the hardware reports a failed transmission.
    fn start_tx(&mut self) -> Result<(), Self::Error>;

    /// Put the radio into its low-power state
    fn sleep(&mut self) -> Result<(), Self::Error>;
}

impl<T: SubGhzRadio + ?Sized> SubGhzRadio for &mut T {
    type Error = T::Error;

    fn flush_tx(&mut self) -> Result<(), Self::Error> {
        T::flush_tx(self)
    }

    fn set_frequency_and_path(&mut self, frequency_hz: u32) -> Result<u32, Self::Error> {
        T::set_frequency_and_path(self, frequency_hz)
    }

    fn is_frequency_valid(&self, frequency_hz: u32) -> bool {
        T::is_frequency_valid(self, frequency_hz)
    }

    fn write_packet(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        T::write_packet(self, data)
    }

    fn start_tx(&mut self) -> Result<(), Self::Error> {
        T::start_tx(self)
    }

    fn sleep(&mut self) -> Result<(), Self::Error> {
        T::sleep(self)
    }
}
