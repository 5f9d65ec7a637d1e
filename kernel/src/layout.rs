// Text layout: greedy word wrap to a pixel width and vertical centring.

use alloc::string::String;
use alloc::vec::Vec;

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics_core::geometry::{Point, Size};

pub trait TextMetrics {
    fn text_width(&self, text: &str) -> u32;
    fn line_height(&self) -> u32;
}

impl TextMetrics for MonoFont<'_> {
    fn text_width(&self, text: &str) -> u32 {
        let advance = self.character_size.width + self.character_spacing;
        text.chars().count() as u32 * advance
    }

    fn line_height(&self) -> u32 {
        self.character_size.height
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedLine {
    pub text: String,
    /// Top-left corner of the line.
    pub origin: Point,
}

/// Break `msg` into lines no wider than `max_width`.
///
/// A message that fits is returned as-is. Otherwise words are packed
/// greedily; a single word wider than `max_width` gets its own line and
/// overflows.
pub fn wrap_text<M: TextMetrics + ?Sized>(metrics: &M, msg: &str, max_width: u32) -> Vec<String> {
    let mut lines = Vec::new();
    if metrics.text_width(msg) <= max_width {
        lines.push(String::from(msg));
        return lines;
    }

    let space = metrics.text_width(" ");
    let mut current = String::new();
    let mut current_w = 0;

    for word in msg.split_whitespace() {
        let word_w = metrics.text_width(word);
        if current.is_empty() {
            current.push_str(word);
            current_w = word_w;
        } else if current_w + space + word_w <= max_width {
            current.push(' ');
            current.push_str(word);
            current_w += space + word_w;
        } else {
            lines.push(core::mem::take(&mut current));
            current.push_str(word);
            current_w = word_w;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Centre a block of lines inside `area`, each line centred on its own.
pub fn place_lines<M: TextMetrics + ?Sized>(
    metrics: &M,
    lines: Vec<String>,
    area: Size,
) -> Vec<PlacedLine> {
    let lh = metrics.line_height() as i32;
    let block_h = lh * lines.len() as i32;
    let mut y = area.height as i32 / 2 - block_h / 2;

    lines
        .into_iter()
        .map(|text| {
            let w = metrics.text_width(&text) as i32;
            let origin = Point::new(area.width as i32 / 2 - w / 2, y);
            y += lh;
            PlacedLine { text, origin }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mono_font::ascii::FONT_10X20;

    // every char 1px wide, lines 2px tall
    struct Unit;

    impl TextMetrics for Unit {
        fn text_width(&self, text: &str) -> u32 {
            text.chars().count() as u32
        }
        fn line_height(&self) -> u32 {
            2
        }
    }

    #[test]
    fn short_message_is_single_line() {
        assert_eq!(wrap_text(&Unit, "break time!", 20), ["break time!"]);
    }

    #[test]
    fn wraps_at_word_boundaries() {
        assert_eq!(
            wrap_text(&Unit, "looooong break time!", 12),
            ["looooong", "break time!"]
        );
        assert_eq!(wrap_text(&Unit, "a b c d", 3), ["a b", "c d"]);
    }

    #[test]
    fn exact_fit_stays_on_line() {
        assert_eq!(wrap_text(&Unit, "ab cd ef", 5), ["ab cd", "ef"]);
    }

    #[test]
    fn overlong_word_gets_own_line() {
        assert_eq!(
            wrap_text(&Unit, "hi supercalifragilistic yo", 6),
            ["hi", "supercalifragilistic", "yo"]
        );
    }

    #[test]
    fn mono_font_metrics() {
        assert_eq!(FONT_10X20.text_width("abc"), 30);
        assert_eq!(FONT_10X20.line_height(), 20);
        // 480px portrait panel at 4x -> 120px virtual width
        assert_eq!(
            wrap_text(&FONT_10X20, "looooong break time!", 120),
            ["looooong", "break time!"]
        );
    }

    #[test]
    fn lines_are_centred() {
        let lines = wrap_text(&Unit, "aaaa bb", 4);
        let placed = place_lines(&Unit, lines, Size::new(10, 10));
        assert_eq!(placed[0].origin, Point::new(3, 3));
        assert_eq!(placed[1].origin, Point::new(4, 5));
        assert_eq!(placed[1].text, "bb");
    }
}
