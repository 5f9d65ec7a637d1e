// 1-bit tomato images.
//
// Assets are binary PBM (netpbm P4) files: an ASCII header
// "P4 <width> <height>" (with optional # comments) followed by rows of
// ceil(width/8) bytes, MSB first, 1 = black. That is already the layout
// ImageRaw<BinaryColor> expects, so the raster is used without copying
// into another format.

use alloc::vec::Vec;

use embedded_graphics::image::{Image, ImageRaw};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

use crate::error::Error;
use crate::phase::MAX_TOMATO;
use crate::scale::Scaled;
use crate::ui::Region;

/// Largest raster accepted; a full 800x480 panel at 1bpp.
pub const MAX_ASSET_BYTES: usize = 48_000 + 64;

const TOMATO_FILES: [&str; MAX_TOMATO as usize + 1] = [
    "TOMATO_0.PBM",
    "TOMATO_1.PBM",
    "TOMATO_2.PBM",
    "TOMATO_3.PBM",
];

/// 8.3 file name of the image for `index` (clamped to the last tomato).
pub fn tomato_file(index: u8) -> &'static str {
    TOMATO_FILES[index.min(MAX_TOMATO) as usize]
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Bitmap {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[cfg(test)]
    pub(crate) fn stride(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    pub fn from_pbm(bytes: &[u8]) -> Result<Self, Error> {
        let mut hdr = Header { bytes, pos: 0 };

        if hdr.token() != Some(&b"P4"[..]) {
            return Err(Error::Asset("not a binary pbm"));
        }
        let width = hdr.number().ok_or(Error::Asset("bad pbm width"))?;
        let height = hdr.number().ok_or(Error::Asset("bad pbm height"))?;
        if width == 0 || height == 0 {
            return Err(Error::Asset("empty pbm"));
        }

        // exactly one whitespace byte separates header and raster
        let start = hdr.pos + 1;
        let stride = (width as usize).div_ceil(8);
        let len = stride
            .checked_mul(height as usize)
            .ok_or(Error::Asset("pbm too large"))?;
        if len > MAX_ASSET_BYTES {
            return Err(Error::Asset("pbm too large"));
        }
        let raster = bytes
            .get(start..start + len)
            .ok_or(Error::Asset("truncated pbm"))?;

        Ok(Self {
            width,
            height,
            data: raster.to_vec(),
        })
    }

    #[cfg(test)]
    pub(crate) fn is_black(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let byte = self.data[y as usize * self.stride() + x as usize / 8];
        byte & (0x80 >> (x % 8)) != 0
    }

    /// Largest integer magnification that still fits `area` (at least 1).
    pub fn fit_scale(&self, area: Size) -> u32 {
        (area.width / self.width).min(area.height / self.height).max(1)
    }

    /// Draw at `scale`, with the scaled image's top-left at `origin`
    /// (in target pixels; snapped down to the scale grid).
    pub fn draw_scaled<D>(&self, target: &mut D, origin: Point, scale: u32) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor> + OriginDimensions,
    {
        let raw = ImageRaw::<BinaryColor>::new(&self.data, self.width);
        let mut scaled = Scaled::new(target, scale);
        let f = scaled.factor() as i32;
        let at = Point::new(origin.x.div_euclid(f), origin.y.div_euclid(f));
        Image::new(&raw, at).draw(&mut scaled)
    }

    /// Origin that centres this bitmap at `scale` on a canvas of `area`.
    pub fn centred_origin(&self, area: Size, scale: u32) -> Point {
        let scaled = Size::new(self.width * scale, self.height * scale);
        Region::full(area).centre(scaled)
    }
}

// whitespace / comment aware PBM header tokenizer
struct Header<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Header<'a> {
    fn skip_space(&mut self) {
        while let Some(&b) = self.bytes.get(self.pos) {
            if b == b'#' {
                while let Some(&c) = self.bytes.get(self.pos) {
                    if c == b'\n' {
                        break;
                    }
                    self.pos += 1;
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn token(&mut self) -> Option<&'a [u8]> {
        self.skip_space();
        let start = self.pos;
        while let Some(&b) = self.bytes.get(self.pos) {
            if b.is_ascii_whitespace() || b == b'#' {
                break;
            }
            self.pos += 1;
        }
        (self.pos > start).then(|| &self.bytes[start..self.pos])
    }

    fn number(&mut self) -> Option<u32> {
        let tok = self.token()?;
        let s = core::str::from_utf8(tok).ok()?;
        s.parse().ok()
    }
}
