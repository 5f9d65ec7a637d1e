// SD card over SPI with FAT volume manager
// Shares SPI2 with the panel; the board hands us a RefCellDevice.
// File timestamps are fixed: the RTC only keeps time of day.

use embedded_sdmmc::{SdCard, TimeSource, Timestamp, VolumeManager};
use log::{info, warn};

// SD cards must be brought up below 400kHz
pub const SD_INIT_FREQ_HZ: u32 = 400_000;

#[derive(Default, Clone, Copy)]
pub struct FixedTimeSource;

impl TimeSource for FixedTimeSource {
    fn get_timestamp(&self) -> Timestamp {
        Timestamp {
            year_since_1970: 56,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

pub struct SdStorage<SPI>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    pub volume_mgr: VolumeManager<SdCard<SPI, esp_hal::delay::Delay>, FixedTimeSource>,
}

impl<SPI> SdStorage<SPI>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    /// Probe the card (runs the SPI-mode init sequence) and wrap it.
    pub fn new(spi: SPI) -> Self {
        let sdcard = SdCard::new(spi, esp_hal::delay::Delay::new());

        match sdcard.num_bytes() {
            Ok(bytes) => info!("sd: {} MB card", bytes / 1024 / 1024),
            Err(e) => warn!("sd: probe failed: {:?}", e),
        }

        let volume_mgr = VolumeManager::new(sdcard, FixedTimeSource);
        Self { volume_mgr }
    }
}
