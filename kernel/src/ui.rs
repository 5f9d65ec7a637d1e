// Region geometry
// All coordinates are logical (rotation aware).

use embedded_graphics::prelude::*;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Region {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Region {
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    /// Region covering a whole canvas of `size`.
    pub fn full(size: Size) -> Self {
        Self::new(0, 0, size.width as u16, size.height as u16)
    }

    // may go negative when content is larger than the region
    pub fn centre(self, content: Size) -> Point {
        let cw = content.width as i32;
        let ch = content.height as i32;
        Point::new(
            self.x as i32 + (self.w as i32 - cw) / 2,
            self.y as i32 + (self.h as i32 - ch) / 2,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centers_content() {
        let r = Region::new(0, 0, 480, 800);
        assert_eq!(r.centre(Size::new(100, 200)), Point::new(190, 300));
    }

    #[test]
    fn offset_region() {
        let r = Region::new(40, 10, 20, 20);
        assert_eq!(r.centre(Size::new(10, 4)), Point::new(45, 18));
    }

    #[test]
    fn oversized_content_goes_negative() {
        let r = Region::new(0, 0, 100, 100);
        assert_eq!(r.centre(Size::new(120, 100)), Point::new(-10, 0));
    }
}
