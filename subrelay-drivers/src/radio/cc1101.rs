//! CC1101 sub-GHz transceiver (transmit path only)
//!
//! The CC1101 is configured over a 4-wire SPI bus. Every transaction
//! starts with a header byte:
//!
//! ```text
//! bit 7: R/W (1 = read)
//! bit 6: burst
//! bits 5..0: register address
//! ```
//!
//! Addresses 0x30..=0x3D written without the burst bit are command
//! strobes. The same addresses read with the burst bit set are status
//! registers. Asserting chip-select while the chip sleeps wakes it.
//!
//! # Packet format
//!
//! Fixed length, no CRC, 2-FSK at roughly 9.6 kBaud with 5.2 kHz
//! deviation. The length register is rewritten for every packet.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use subrelay_core::traits::SubGhzRadio;

/// CC1101 configuration register addresses
pub mod reg {
    /// GDO0 output pin configuration
    pub const IOCFG0: u8 = 0x02;
    /// RX/TX FIFO thresholds
    pub const FIFOTHR: u8 = 0x03;
    /// Packet length (fixed length mode)
    pub const PKTLEN: u8 = 0x06;
    /// Packet automation control 1
    pub const PKTCTRL1: u8 = 0x07;
    /// Packet automation control 0
    pub const PKTCTRL0: u8 = 0x08;
    /// Frequency synthesizer control
    pub const FSCTRL1: u8 = 0x0B;
    /// Frequency control word, high byte
    pub const FREQ2: u8 = 0x0D;
    /// Frequency control word, middle byte
    pub const FREQ1: u8 = 0x0E;
    /// Frequency control word, low byte
    pub const FREQ0: u8 = 0x0F;
    /// Modem configuration (channel bandwidth, data rate exponent)
    pub const MDMCFG4: u8 = 0x10;
    /// Modem configuration (data rate mantissa)
    pub const MDMCFG3: u8 = 0x11;
    /// Modem configuration (modulation, sync mode)
    pub const MDMCFG2: u8 = 0x12;
    /// Modem configuration (preamble length)
    pub const MDMCFG1: u8 = 0x13;
    /// Modem deviation setting
    pub const DEVIATN: u8 = 0x15;
    /// Main radio control state machine configuration
    pub const MCSM1: u8 = 0x17;
    /// Main radio control state machine configuration
    pub const MCSM0: u8 = 0x18;
    /// Front end TX configuration
    pub const FREND0: u8 = 0x22;
    /// Power amplifier table
    pub const PATABLE: u8 = 0x3E;
    /// TX FIFO
    pub const FIFO: u8 = 0x3F;
}

/// CC1101 status register addresses (read with the burst bit set)
pub mod status {
    /// Chip version number
    pub const VERSION: u8 = 0x31;
    /// Main radio control state machine state
    pub const MARCSTATE: u8 = 0x35;
    /// Underflow flag and number of bytes in the TX FIFO
    pub const TXBYTES: u8 = 0x3A;
}

/// CC1101 command strobes
pub mod strobe {
    /// Reset chip
    pub const SRES: u8 = 0x30;
    /// Calibrate frequency synthesizer and turn it off
    pub const SCAL: u8 = 0x33;
    /// Enable TX
    pub const STX: u8 = 0x35;
    /// Exit RX/TX, enter IDLE
    pub const SIDLE: u8 = 0x36;
    /// Enter power down mode when CS goes high
    pub const SPWD: u8 = 0x39;
    /// Flush the TX FIFO
    pub const SFTX: u8 = 0x3B;
    /// No operation, returns the status byte
    pub const SNOP: u8 = 0x3D;
}

/// MARCSTATE values the transmit loop cares about
mod marc {
    pub const MASK: u8 = 0x1F;
    pub const IDLE: u8 = 0x01;
    #[cfg(test)]
    pub const TX: u8 = 0x13;
    pub const TXFIFO_UNDERFLOW: u8 = 0x16;
}

const READ: u8 = 0x80;
const BURST: u8 = 0x40;

/// TX FIFO depth in bytes
pub const FIFO_SIZE: usize = 64;

/// Crystal start-up allowance after chip-select wakes the chip from SLEEP
const WAKE_DELAY_US: u32 = 250;

/// Status reads until two consecutive values agree (SPI read errata)
const STATUS_READ_ATTEMPTS: usize = 4;

/// Register values written by [`Cc1101::init`]
///
/// Frequency and PA table are set per transmission.
const INIT_REGS: &[(u8, u8)] = &[
    // GDO0 asserts on sync word, deasserts at end of packet
    (reg::IOCFG0, 0x06),
    (reg::FIFOTHR, 0x47),
    // No address check, no status append
    (reg::PKTCTRL1, 0x00),
    // Whitening off, FIFO mode, CRC off, fixed length
    (reg::PKTCTRL0, 0x00),
    (reg::FSCTRL1, 0x06),
    // ~9.6 kBaud
    (reg::MDMCFG4, 0xC8),
    (reg::MDMCFG3, 0x83),
    // 2-FSK, 16/16 sync word bits
    (reg::MDMCFG2, 0x02),
    // 4 preamble bytes
    (reg::MDMCFG1, 0x22),
    // ~5.2 kHz deviation
    (reg::DEVIATN, 0x15),
    // Return to IDLE after TX
    (reg::MCSM1, 0x00),
    // Autocalibrate when going from IDLE to TX
    (reg::MCSM0, 0x18),
    // PA table index 0
    (reg::FREND0, 0x10),
];

/// Valid tuning ranges in Hz, inclusive, with the band they select
const BANDS: [(u32, u32, Band); 3] = [
    (299_999_755, 348_000_335, Band::Mhz315),
    (386_999_938, 464_000_000, Band::Mhz433),
    (778_999_847, 928_000_000, Band::Mhz868),
];

/// RF band, selected from the tuned frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Band {
    /// 300-348 MHz
    Mhz315,
    /// 387-464 MHz
    Mhz433,
    /// 779-928 MHz
    Mhz868,
}

impl Band {
    /// Band containing `frequency_hz`, if any
    pub fn for_frequency(frequency_hz: u32) -> Option<Self> {
        BANDS
            .iter()
            .find(|(lo, hi, _)| (*lo..=*hi).contains(&frequency_hz))
            .map(|(_, _, band)| *band)
    }

    /// PATABLE entry for roughly +10 dBm in this band
    pub fn pa_setting(self) -> u8 {
        match self {
            Band::Mhz315 => 0xC2,
            Band::Mhz433 => 0xC0,
            Band::Mhz868 => 0xC0,
        }
    }
}

/// CC1101 driver configuration
#[derive(Debug, Clone)]
pub struct Cc1101Config {
    /// Crystal frequency in Hz
    pub xosc_hz: u32,
    /// How long `start_tx` waits for the chip to return to IDLE
    pub tx_timeout_ms: u32,
}

impl Default for Cc1101Config {
    fn default() -> Self {
        Self {
            xosc_hz: 26_000_000,
            tx_timeout_ms: 100,
        }
    }
}

impl Cc1101Config {
    /// Frequency control word for `frequency_hz`
    ///
    /// FREQ = f * 2^16 / f_xosc, truncated to 22 bits.
    pub fn frequency_word(&self, frequency_hz: u32) -> u32 {
        let word = (u64::from(frequency_hz) << 16) / u64::from(self.xosc_hz.max(1));
        word.min(0x3F_FFFF) as u32
    }

    /// Carrier frequency produced by `word`
    pub fn word_to_frequency(&self, word: u32) -> u32 {
        ((u64::from(word) * u64::from(self.xosc_hz)) >> 16) as u32
    }
}

/// CC1101 driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cc1101Error<E> {
    /// SPI bus error
    Spi(E),
    /// Chip-select pin could not be driven
    ChipSelect,
    /// Chip did not answer with a plausible version number
    NotDetected,
    /// Packet does not fit in the TX FIFO
    PacketTooLong,
    /// TX FIFO ran dry during transmission
    TxUnderflow,
    /// Chip did not finish transmitting in time
    TxTimeout,
}

/// CC1101 driver
///
/// Owns the SPI bus exclusively. Chip-select is driven manually around
/// every transaction.
pub struct Cc1101<SPI, CS, D> {
    spi: SPI,
    cs: CS,
    delay: D,
    config: Cc1101Config,
    band: Option<Band>,
    asleep: bool,
}

impl<SPI, CS, D> Cc1101<SPI, CS, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    D: DelayNs,
{
    /// Create a new driver. Call [`init`](Self::init) before use.
    pub fn new(spi: SPI, cs: CS, delay: D, config: Cc1101Config) -> Self {
        Self {
            spi,
            cs,
            delay,
            config,
            band: None,
            asleep: true,
        }
    }

    /// Reset the chip, load the packet configuration and put it to sleep
    pub fn init(&mut self) -> Result<(), Cc1101Error<SPI::Error>> {
        self.cs.set_high().map_err(|_| Cc1101Error::ChipSelect)?;
        self.strobe(strobe::SRES)?;
        self.delay.delay_ms(1);

        let version = self.read_status(status::VERSION)?;
        if version == 0x00 || version == 0xFF {
            #[cfg(feature = "defmt")]
            defmt::error!("CC1101 not detected (version {=u8:#x})", version);
            return Err(Cc1101Error::NotDetected);
        }

        for &(addr, value) in INIT_REGS {
            self.write_reg(addr, value)?;
        }

        #[cfg(feature = "defmt")]
        defmt::info!("CC1101 version {=u8:#x} initialized", version);

        self.sleep()
    }

    /// Band selected by the last successful tune
    pub fn band(&self) -> Option<Band> {
        self.band
    }

    /// Driver configuration
    pub fn config(&self) -> &Cc1101Config {
        &self.config
    }

    /// Release the bus, chip-select and delay
    pub fn release(self) -> (SPI, CS, D) {
        (self.spi, self.cs, self.delay)
    }

    /// Send a command strobe, returning the chip status byte
    pub fn strobe(&mut self, command: u8) -> Result<u8, Cc1101Error<SPI::Error>> {
        self.with_cs(|spi| {
            let mut buf = [command];
            spi.transfer_in_place(&mut buf)?;
            Ok(buf[0])
        })
    }

    /// Write a single configuration register
    pub fn write_reg(&mut self, addr: u8, value: u8) -> Result<(), Cc1101Error<SPI::Error>> {
        self.with_cs(|spi| spi.write(&[addr, value]))
    }

    /// Write consecutive registers (or the FIFO) starting at `addr`
    pub fn write_burst(&mut self, addr: u8, data: &[u8]) -> Result<(), Cc1101Error<SPI::Error>> {
        self.with_cs(|spi| {
            spi.write(&[addr | BURST])?;
            spi.write(data)
        })
    }

    /// Read a status register
    pub fn read_status(&mut self, addr: u8) -> Result<u8, Cc1101Error<SPI::Error>> {
        self.with_cs(|spi| {
            let mut buf = [addr | READ | BURST, 0];
            spi.transfer_in_place(&mut buf)?;
            Ok(buf[1])
        })
    }

    /// Read a status register until two consecutive reads agree
    ///
    /// Status registers can change during the SPI read and return a
    /// corrupted value.
    pub fn read_status_stable(&mut self, addr: u8) -> Result<u8, Cc1101Error<SPI::Error>> {
        let mut last = self.read_status(addr)?;
        for _ in 0..STATUS_READ_ATTEMPTS {
            let value = self.read_status(addr)?;
            if value == last {
                return Ok(value);
            }
            last = value;
        }
        Ok(last)
    }

    fn marc_state(&mut self) -> Result<u8, Cc1101Error<SPI::Error>> {
        Ok(self.read_status_stable(status::MARCSTATE)? & marc::MASK)
    }

    /// Run `f` with chip-select asserted
    ///
    /// Chip-select is released even if the transfer fails. The first
    /// transaction after SLEEP waits for the crystal before clocking.
    fn with_cs<R>(
        &mut self,
        f: impl FnOnce(&mut SPI) -> Result<R, SPI::Error>,
    ) -> Result<R, Cc1101Error<SPI::Error>> {
        self.cs.set_low().map_err(|_| Cc1101Error::ChipSelect)?;
        if self.asleep {
            self.delay.delay_us(WAKE_DELAY_US);
            self.asleep = false;
        }
        let result = f(&mut self.spi).and_then(|value| self.spi.flush().map(|()| value));
        let released = self.cs.set_high();
        let value = result.map_err(Cc1101Error::Spi)?;
        released.map_err(|_| Cc1101Error::ChipSelect)?;
        Ok(value)
    }
}

impl<SPI, CS, D> SubGhzRadio for Cc1101<SPI, CS, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    D: DelayNs,
{
    type Error = Cc1101Error<SPI::Error>;

    fn flush_tx(&mut self) -> Result<(), Self::Error> {
        self.strobe(strobe::SIDLE)?;
        self.strobe(strobe::SFTX)?;
        Ok(())
    }

    /// Frequencies outside every band are not tuned; the request is handed
    /// back unchanged so `is_frequency_valid` rejects it.
    fn set_frequency_and_path(&mut self, frequency_hz: u32) -> Result<u32, Self::Error> {
        let Some(band) = Band::for_frequency(frequency_hz) else {
            #[cfg(feature = "defmt")]
            defmt::warn!("CC1101: {} Hz is outside every band", frequency_hz);
            return Ok(frequency_hz);
        };
        let word = self.config.frequency_word(frequency_hz);

        self.strobe(strobe::SIDLE)?;
        self.write_burst(
            reg::FREQ2,
            &[(word >> 16) as u8, (word >> 8) as u8, word as u8],
        )?;
        // PATABLE is lost in SLEEP
        self.write_reg(reg::PATABLE, band.pa_setting())?;
        self.band = Some(band);

        let achieved = self.config.word_to_frequency(word);

        #[cfg(feature = "defmt")]
        defmt::debug!("CC1101 tuned to {} Hz ({})", achieved, band);

        Ok(achieved)
    }

    fn is_frequency_valid(&self, frequency_hz: u32) -> bool {
        Band::for_frequency(frequency_hz).is_some()
    }

    fn write_packet(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        if data.len() > FIFO_SIZE {
            return Err(Cc1101Error::PacketTooLong);
        }
        self.write_reg(reg::PKTLEN, data.len() as u8)?;
        self.write_burst(reg::FIFO, data)
    }

    fn start_tx(&mut self) -> Result<(), Self::Error> {
        self.strobe(strobe::STX)?;

        let mut keyed = false;
        for _ in 0..self.config.tx_timeout_ms {
            match self.marc_state()? {
                marc::TXFIFO_UNDERFLOW => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("CC1101 TX FIFO underflow");
                    self.strobe(strobe::SFTX)?;
                    return Err(Cc1101Error::TxUnderflow);
                }
                marc::IDLE if keyed => return Ok(()),
                marc::IDLE => {}
                _ => keyed = true,
            }
            self.delay.delay_ms(1);
        }

        #[cfg(feature = "defmt")]
        defmt::warn!("CC1101 TX timeout (keyed: {})", keyed);
        self.strobe(strobe::SIDLE)?;
        Err(Cc1101Error::TxTimeout)
    }

    fn sleep(&mut self) -> Result<(), Self::Error> {
        self.strobe(strobe::SIDLE)?;
        self.strobe(strobe::SPWD)?;
        self.asleep = true;
        Ok(())
    }
}
