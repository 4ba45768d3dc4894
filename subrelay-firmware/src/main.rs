//! subrelay - Clocked Bit-Stream Capture and Sub-GHz Relay
//!
//! Firmware for STM32WB55 boards with a CC1101 transceiver (Flipper
//! Zero pinout). Reads an 8-byte message clocked in on PC0 (clock) and
//! PC1 (data), then retransmits it at 433.92 MHz once per second.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Flex, Level, Output, Speed};
use embassy_stm32::spi::{self, Spi};
use embassy_stm32::time::Hertz;
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use subrelay_core::config::RelayConfig;
use subrelay_core::RelayController;
use subrelay_drivers::radio::{Cc1101, Cc1101Config};
use subrelay_hal_stm32::{InputBank, Pin};

mod channels;
mod relay;
mod tasks;

/// Serial link clock input
const CLOCK_PIN: &str = "PC0";
/// Serial link data input
const DATA_PIN: &str = "PC1";

/// CC1101 SPI clock
const RADIO_SPI_HZ: u32 = 4_000_000;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("subrelay firmware starting");

    let p = embassy_stm32::init(Default::default());

    let config = RelayConfig::default();
    unwrap!(config.validate());

    // Serial link inputs
    let clock = unwrap!(Pin::parse(CLOCK_PIN));
    let data = unwrap!(Pin::parse(DATA_PIN));
    let mut inputs: InputBank<'static, 2> = InputBank::new();
    unwrap!(inputs.register(clock, Flex::new(p.PC0)));
    unwrap!(inputs.register(data, Flex::new(p.PC1)));

    // CC1101 on SPI1
    let mut spi_config = spi::Config::default();
    spi_config.frequency = Hertz(RADIO_SPI_HZ);
    let spi = Spi::new_blocking(p.SPI1, p.PA5, p.PB5, p.PB4, spi_config);
    let cs = Output::new(p.PD0, Level::High, Speed::VeryHigh);

    let mut radio = Cc1101::new(spi, cs, Delay, Cc1101Config::default());
    if let Err(e) = radio.init() {
        // Keep going: every transmit attempt will report the fault
        error!("CC1101 init failed: {}", e);
    }

    let relay = unwrap!(RelayController::new(
        inputs,
        Delay,
        radio,
        clock,
        data,
        &config
    ));

    spawner.spawn(tasks::status_task()).unwrap();
    info!("Status task spawned, entering relay loop");

    relay::run(relay, config.attempt_interval_ms).await
}
