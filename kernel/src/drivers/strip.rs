// Strip-based rendering buffer for e-paper.
// 4KB strip instead of 48KB framebuffer; display split into horizontal bands.
// Screens draw to logical coords, clipped here; the driver calls the same
// draw closure once per band.

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::BinaryColor,
    primitives::Rectangle,
};

use super::ssd1677::{HEIGHT, Rotation, WIDTH};

pub const STRIP_ROWS: u16 = 40; // 4000B per strip (800/8 * 40)
pub const PHYS_BYTES_PER_ROW: usize = (WIDTH as usize) / 8;

pub const STRIP_BUF_SIZE: usize = PHYS_BYTES_PER_ROW * STRIP_ROWS as usize; // 4000B
pub const STRIP_COUNT: u16 = HEIGHT / STRIP_ROWS; // 12 strips

pub struct StripBuffer {
    buf: [u8; STRIP_BUF_SIZE],
    rotation: Rotation,
    win_y: u16,
}

impl StripBuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0xFF; STRIP_BUF_SIZE],
            rotation: Rotation::Deg270,
            win_y: 0,
        }
    }

    /// Reset to white and move the window to band `strip_idx`.
    pub fn begin_strip(&mut self, rotation: Rotation, strip_idx: u16) {
        self.rotation = rotation;
        self.win_y = strip_idx * STRIP_ROWS;
        self.buf.fill(0xFF);
    }

    pub fn data(&self) -> &[u8] {
        &self.buf
    }

    #[inline]
    fn to_physical(&self, lx: u16, ly: u16) -> (u16, u16) {
        match self.rotation {
            Rotation::Deg0 => (lx, ly),
            Rotation::Deg90 => (WIDTH - 1 - ly, lx),
            Rotation::Deg180 => (WIDTH - 1 - lx, HEIGHT - 1 - ly),
            Rotation::Deg270 => (ly, HEIGHT - 1 - lx),
        }
    }

    #[inline]
    fn set_pixel_physical(&mut self, px: u16, py: u16, black: bool) {
        if px >= WIDTH {
            return;
        }
        if py < self.win_y || py >= self.win_y + STRIP_ROWS {
            return;
        }

        let local_x = px as usize;
        let local_y = (py - self.win_y) as usize;
        let idx = (local_x / 8) + (local_y * PHYS_BYTES_PER_ROW);
        let bit = 7 - (local_x as u16 % 8);

        if black {
            self.buf[idx] &= !(1 << bit);
        } else {
            self.buf[idx] |= 1 << bit;
        }
    }

    // byte-aligned rect fill in physical coords, clipped to window
    fn fill_physical_rect(&mut self, px0: u16, py0: u16, px1: u16, py1: u16, black: bool) {
        let cx0 = px0;
        let cx1 = px1.min(WIDTH);
        let cy0 = py0.max(self.win_y);
        let cy1 = py1.min(self.win_y + STRIP_ROWS);
        if cx0 >= cx1 || cy0 >= cy1 {
            return;
        }

        let lx0 = cx0 as usize;
        let lx1 = cx1 as usize;
        let ly0 = (cy0 - self.win_y) as usize;
        let ly1 = (cy1 - self.win_y) as usize;
        let rb = PHYS_BYTES_PER_ROW;

        let first_byte = lx0 / 8;
        let last_byte = (lx1 - 1) / 8;
        let first_mask: u8 = 0xFF >> (lx0 & 7);
        let last_mask: u8 = 0xFF << (7 - ((lx1 - 1) & 7));

        let (fill, edge_op): (u8, fn(&mut u8, u8)) = if black {
            (0x00, |b, m| *b &= !m)
        } else {
            (0xFF, |b, m| *b |= m)
        };

        for ly in ly0..ly1 {
            let row = ly * rb;
            if first_byte == last_byte {
                edge_op(&mut self.buf[row + first_byte], first_mask & last_mask);
            } else {
                edge_op(&mut self.buf[row + first_byte], first_mask);
                for b in first_byte + 1..last_byte {
                    self.buf[row + b] = fill;
                }
                edge_op(&mut self.buf[row + last_byte], last_mask);
            }
        }
    }
}

impl Default for StripBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for StripBuffer {
    fn size(&self) -> Size {
        self.rotation.logical_size()
    }
}

impl DrawTarget for StripBuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let size = self.size();
        let log_w = size.width as i32;
        let log_h = size.height as i32;

        for Pixel(coord, color) in pixels {
            if coord.x < 0 || coord.x >= log_w || coord.y < 0 || coord.y >= log_h {
                continue;
            }

            let (px, py) = self.to_physical(coord.x as u16, coord.y as u16);
            self.set_pixel_physical(px, py, color == BinaryColor::On);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let size = self.size();
        let sw = size.width as u16;
        let sh = size.height as u16;

        let lx0 = (area.top_left.x.max(0) as u16).min(sw);
        let ly0 = (area.top_left.y.max(0) as u16).min(sh);
        let lx1 = ((area.top_left.x.saturating_add(area.size.width as i32)).max(0) as u16).min(sw);
        let ly1 = ((area.top_left.y.saturating_add(area.size.height as i32)).max(0) as u16).min(sh);
        if lx0 >= lx1 || ly0 >= ly1 {
            return Ok(());
        }

        let black = color == BinaryColor::On;

        match self.rotation {
            Rotation::Deg270 => {
                // logical (lx,ly) -> physical (ly, HEIGHT-1-lx)
                self.fill_physical_rect(ly0, HEIGHT - lx1, ly1, HEIGHT - lx0, black);
            }
            Rotation::Deg0 => {
                self.fill_physical_rect(lx0, ly0, lx1, ly1, black);
            }
            _ => {
                for ly in ly0..ly1 {
                    for lx in lx0..lx1 {
                        let (px, py) = self.to_physical(lx, ly);
                        self.set_pixel_physical(px, py, black);
                    }
                }
            }
        }
        Ok(())
    }
}
