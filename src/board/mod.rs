//! Board support for the pomo-ink status display (ESP32-C3).
//!
//! Maps the physical wiring to named subsystems so nothing else needs
//! to know GPIO numbers or bus sharing.
//!
//! GPIO |     Function    |      Notes
//! -----+-----------------+----------------------------------
//!  4   | EPD DC          | Data/Command select
//!  5   | EPD RST         | Reset (active low)
//!  6   | EPD BUSY        | Busy signal from display
//!  7   | SPI2 MISO       | SD card data out (display is write-only)
//!  8   | SPI2 SCK        | Shared SPI clock
//! 10   | SPI2 MOSI       | Shared SPI data out
//! 12   | SD CS           | SD card chip select
//! 21   | EPD CS          | Display chip select

use core::cell::RefCell;

use embedded_hal_bus::spi::RefCellDevice;
use esp_hal::{
    Blocking,
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    peripherals::Peripherals,
    rtc_cntl::Rtc,
    spi,
    time::Rate,
};
use log::warn;
use static_cell::StaticCell;

use pomo_kernel::drivers::ssd1677::{DisplayDriver, SPI_FREQ_MHZ};

use crate::drivers::sdcard::{SD_INIT_FREQ_HZ, SdStorage};

pub type SpiBus = spi::master::Spi<'static, Blocking>;
pub type SharedSpi = RefCellDevice<'static, SpiBus, Output<'static>, Delay>;
pub type Epd = DisplayDriver<SharedSpi, Output<'static>, Output<'static>, Input<'static>>;
pub type Sd = SdStorage<SharedSpi>;

static SPI_BUS: StaticCell<RefCell<SpiBus>> = StaticCell::new();

pub struct Board {
    pub epd: Epd,
    pub sd: Sd,
    pub rtc: Rtc<'static>,
}

impl Board {
    pub fn init(p: Peripherals) -> Self {
        let epd_cs = Output::new(p.GPIO21, Level::High, OutputConfig::default());
        let sd_cs = Output::new(p.GPIO12, Level::High, OutputConfig::default());
        let dc = Output::new(p.GPIO4, Level::High, OutputConfig::default());
        let rst = Output::new(p.GPIO5, Level::High, OutputConfig::default());
        let busy = Input::new(p.GPIO6, InputConfig::default().with_pull(Pull::None));

        // bus starts at SD init speed; raised once the card is up
        let slow = spi::master::Config::default().with_frequency(Rate::from_hz(SD_INIT_FREQ_HZ));
        let bus = spi::master::Spi::new(p.SPI2, slow)
            .expect("spi2 config")
            .with_sck(p.GPIO8)
            .with_mosi(p.GPIO10)
            .with_miso(p.GPIO7);
        let bus: &'static RefCell<SpiBus> = SPI_BUS.init(RefCell::new(bus));

        let Ok(sd_dev) = RefCellDevice::new(bus, sd_cs, Delay::new());
        let sd = SdStorage::new(sd_dev);

        let fast = spi::master::Config::default().with_frequency(Rate::from_mhz(SPI_FREQ_MHZ));
        if bus.borrow_mut().apply_config(&fast).is_err() {
            warn!("board: spi stays at init clock");
        }

        let Ok(epd_dev) = RefCellDevice::new(bus, epd_cs, Delay::new());
        let epd = DisplayDriver::new(epd_dev, dc, rst, busy);

        let rtc = Rtc::new(p.LPWR);

        Board { epd, sd, rtc }
    }
}
