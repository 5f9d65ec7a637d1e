// Integer magnification adapter.
//
// The panel is 800x480 and the embedded fonts top out at 10x20, so
// screens draw into a virtual canvas `size / factor` and every pixel
// becomes a factor x factor block on the wrapped target.

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    primitives::Rectangle,
};

pub struct Scaled<'a, D> {
    inner: &'a mut D,
    factor: u32,
}

impl<'a, D> Scaled<'a, D>
where
    D: DrawTarget + OriginDimensions,
{
    /// `factor` of 0 is treated as 1.
    pub fn new(inner: &'a mut D, factor: u32) -> Self {
        Self {
            inner,
            factor: factor.max(1),
        }
    }

    pub fn factor(&self) -> u32 {
        self.factor
    }

    fn block(&self, p: Point, size: Size) -> Rectangle {
        let f = self.factor as i32;
        Rectangle::new(
            Point::new(p.x * f, p.y * f),
            Size::new(size.width * self.factor, size.height * self.factor),
        )
    }
}

impl<D> OriginDimensions for Scaled<'_, D>
where
    D: DrawTarget + OriginDimensions,
{
    fn size(&self) -> Size {
        let s = self.inner.size();
        Size::new(s.width / self.factor, s.height / self.factor)
    }
}

impl<D> DrawTarget for Scaled<'_, D>
where
    D: DrawTarget + OriginDimensions,
{
    type Color = D::Color;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            let block = self.block(p, Size::new(1, 1));
            self.inner.fill_solid(&block, color)?;
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let block = self.block(area.top_left, area.size);
        self.inner.fill_solid(&block, color)
    }
}
