// SD card file operations.
// Everything pomo-ink keeps on the card lives in one root directory;
// files are small and read whole.

use alloc::vec;
use alloc::vec::Vec;

use embedded_sdmmc::{Mode, VolumeIdx};
use log::warn;

use crate::drivers::sdcard::SdStorage;

// all app data lives under this directory on the SD root
pub const POMO_DIR: &str = "_POMO";

// open <dir>/ on the first volume and execute body with the dir handle
macro_rules! with_subdir {
    ($sd:expr, $dir:expr, |$sub:ident| $body:expr) => {{
        let volume = $sd
            .volume_mgr
            .open_volume(VolumeIdx(0))
            .map_err(|_| "open volume failed")?;
        let root = volume.open_root_dir().map_err(|_| "open root dir failed")?;
        let $sub = root.open_dir($dir).map_err(|_| "open dir failed")?;
        $body
    }};
}

// create dir in root if it doesn't already exist
pub fn ensure_dir<SPI>(sd: &SdStorage<SPI>, name: &str) -> Result<(), &'static str>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    let volume = sd
        .volume_mgr
        .open_volume(VolumeIdx(0))
        .map_err(|_| "open volume failed")?;
    let root = volume.open_root_dir().map_err(|_| "open root dir failed")?;

    if root.open_dir(name).is_ok() {
        return Ok(());
    }

    root.make_dir_in_dir(name).map_err(|_| "make dir failed")?;

    Ok(())
}

/// Read up to `limit` bytes of `dir/name`. `Ok(None)` if the file does
/// not exist. A longer file is cut at `limit` and logged.
pub fn read_file_in_dir<SPI>(
    sd: &SdStorage<SPI>,
    dir: &str,
    name: &str,
    limit: usize,
) -> Result<Option<Vec<u8>>, &'static str>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    with_subdir!(sd, dir, |sub| {
        let file = match sub.open_file_in_dir(name, Mode::ReadOnly) {
            Ok(file) => file,
            Err(embedded_sdmmc::Error::NotFound) => return Ok(None),
            Err(_) => return Err("open file failed"),
        };

        let size = file.length() as usize;
        if size > limit {
            warn!("storage: {}/{} is {} bytes, reading first {}", dir, name, size, limit);
        }
        let len = size.min(limit);
        let mut buf = vec![0u8; len];
        let mut total = 0;
        while !file.is_eof() && total < len {
            let n = file.read(&mut buf[total..]).map_err(|_| "read failed")?;
            if n == 0 {
                break;
            }
            total += n;
        }
        buf.truncate(total);
        Ok(Some(buf))
    })
}

// write (create-or-truncate) file inside a subdirectory of root
pub fn write_file_in_dir<SPI>(
    sd: &SdStorage<SPI>,
    dir: &str,
    name: &str,
    data: &[u8],
) -> Result<(), &'static str>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    with_subdir!(sd, dir, |sub| {
        let file = sub
            .open_file_in_dir(name, Mode::ReadWriteCreateOrTruncate)
            .map_err(|_| "create file in dir failed")?;
        if !data.is_empty() {
            file.write(data).map_err(|_| "write in dir failed")?;
        }
        file.flush().map_err(|_| "flush in dir failed")?;
        Ok(())
    })
}

pub fn ensure_pomo_dir<SPI>(sd: &SdStorage<SPI>) -> Result<(), &'static str>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    ensure_dir(sd, POMO_DIR)
}

pub fn read_pomo_file<SPI>(
    sd: &SdStorage<SPI>,
    name: &str,
    limit: usize,
) -> Result<Option<Vec<u8>>, &'static str>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    read_file_in_dir(sd, POMO_DIR, name, limit)
}

pub fn write_pomo_file<SPI>(sd: &SdStorage<SPI>, name: &str, data: &[u8]) -> Result<(), &'static str>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    write_file_in_dir(sd, POMO_DIR, name, data)
}
