// Kernel backends on real hardware: status and tomato images on the SD
// card, frames on the SSD1677.

use alloc::vec::Vec;

use esp_hal::delay::Delay;
use log::{info, warn};

use pomo_kernel::app::{AssetStore, Panel, StatusStore};
use pomo_kernel::asset::{Bitmap, MAX_ASSET_BYTES, tomato_file};
use pomo_kernel::config::{SETTINGS_BUF_SIZE, SETTINGS_FILE, Settings};
use pomo_kernel::drivers::strip::StripBuffer;
use pomo_kernel::status::{MAX_STATUS_BYTES, STATUS_FILE};
use pomo_kernel::Error;

use crate::board::{Epd, Sd};
use crate::drivers::storage;

// PBM header plus comments on top of the raster
const ASSET_FILE_LIMIT: usize = MAX_ASSET_BYTES + 256;

/// Read `_POMO/SETTINGS.TXT`, writing the defaults if the card has none.
pub fn load_settings(sd: &Sd) -> Settings {
    if let Err(e) = storage::ensure_pomo_dir(sd) {
        warn!("settings: {}, using defaults", e);
        return Settings::defaults();
    }

    match storage::read_pomo_file(sd, SETTINGS_FILE, SETTINGS_BUF_SIZE) {
        Ok(Some(data)) => Settings::parse(&data),
        Ok(None) => {
            let settings = Settings::defaults();
            let mut buf = [0u8; SETTINGS_BUF_SIZE];
            let len = settings.write(&mut buf);
            match storage::write_pomo_file(sd, SETTINGS_FILE, &buf[..len]) {
                Ok(()) => info!("settings: wrote defaults"),
                Err(e) => warn!("settings: save failed: {}", e),
            }
            settings
        }
        Err(e) => {
            warn!("settings: {}, using defaults", e);
            Settings::defaults()
        }
    }
}

pub struct SdStatusStore<'a> {
    sd: &'a Sd,
}

impl<'a> SdStatusStore<'a> {
    pub fn new(sd: &'a Sd) -> Self {
        Self { sd }
    }
}

impl StatusStore for SdStatusStore<'_> {
    fn load(&mut self) -> Result<Option<Vec<u8>>, Error> {
        storage::read_pomo_file(self.sd, STATUS_FILE, MAX_STATUS_BYTES).map_err(Error::Storage)
    }

    fn save(&mut self, data: &[u8]) -> Result<(), Error> {
        storage::write_pomo_file(self.sd, STATUS_FILE, data).map_err(Error::Storage)
    }
}

pub struct SdAssetStore<'a> {
    sd: &'a Sd,
}

impl<'a> SdAssetStore<'a> {
    pub fn new(sd: &'a Sd) -> Self {
        Self { sd }
    }
}

impl AssetStore for SdAssetStore<'_> {
    fn tomato(&mut self, index: u8) -> Result<Bitmap, Error> {
        let name = tomato_file(index);
        match storage::read_pomo_file(self.sd, name, ASSET_FILE_LIMIT).map_err(Error::Storage)? {
            Some(data) => Bitmap::from_pbm(&data),
            None => {
                warn!("assets: {} missing", name);
                Err(Error::Asset("tomato image missing"))
            }
        }
    }
}

pub struct EpdPanel<'a> {
    epd: &'a mut Epd,
    strip: &'a mut StripBuffer,
    delay: Delay,
}

impl<'a> EpdPanel<'a> {
    pub fn new(epd: &'a mut Epd, strip: &'a mut StripBuffer) -> Self {
        Self {
            epd,
            strip,
            delay: Delay::new(),
        }
    }
}

impl Panel for EpdPanel<'_> {
    type Target = StripBuffer;

    fn size(&self) -> embedded_graphics_core::geometry::Size {
        self.epd.size()
    }

    fn show<F: Fn(&mut StripBuffer)>(&mut self, draw: F) -> Result<(), Error> {
        // controller was left in deep sleep by the previous wake
        self.epd.init(&mut self.delay).map_err(Error::Display)?;
        self.epd
            .render_full(self.strip, &mut self.delay, draw)
            .map_err(Error::Display)
    }
}
