// What goes on the panel for one phase.
//
// A Screen is composed once (layout, asset decode) and then drawn once
// per strip by the driver, so `draw` must be cheap and deterministic.

use alloc::vec::Vec;

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, ascii::FONT_10X20};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};

use crate::asset::Bitmap;
use crate::layout::{PlacedLine, place_lines, wrap_text};
use crate::scale::Scaled;

pub const MESSAGE_FONT: &MonoFont<'static> = &FONT_10X20;

#[derive(Clone, Debug, PartialEq)]
pub enum Screen {
    /// Tomato image for the pomodoro in progress.
    Tomato {
        bitmap: Bitmap,
        scale: u32,
        origin: Point,
    },
    /// Centred break text; `lines` are in virtual (unscaled) pixels.
    Message { lines: Vec<PlacedLine>, scale: u32 },
}

impl Screen {
    pub fn tomato(bitmap: Bitmap, area: Size) -> Self {
        let scale = bitmap.fit_scale(area);
        let origin = bitmap.centred_origin(area, scale);
        Screen::Tomato {
            bitmap,
            scale,
            origin,
        }
    }

    pub fn message(text: &str, area: Size, scale: u32) -> Self {
        let scale = scale.max(1);
        let virt = Size::new(area.width / scale, area.height / scale);
        let lines = wrap_text(MESSAGE_FONT, text, virt.width);
        Screen::Message {
            lines: place_lines(MESSAGE_FONT, lines, virt),
            scale,
        }
    }

    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor> + OriginDimensions,
    {
        target.clear(BinaryColor::Off)?;
        match self {
            Screen::Tomato {
                bitmap,
                scale,
                origin,
            } => bitmap.draw_scaled(target, *origin, *scale),
            Screen::Message { lines, scale } => {
                let style = MonoTextStyle::new(MESSAGE_FONT, BinaryColor::On);
                let mut scaled = Scaled::new(target, *scale);
                for line in lines {
                    Text::with_baseline(&line.text, line.origin, style, Baseline::Top)
                        .draw(&mut scaled)?;
                }
                Ok(())
            }
        }
    }
}
