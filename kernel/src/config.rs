// Runtime settings with persistent storage.
// Text-based key=value format in _POMO/SETTINGS.TXT.
// Cycle lengths are fixed constants (see phase.rs) and have no key.

use crate::drivers::ssd1677::Rotation;

pub const SETTINGS_FILE: &str = "SETTINGS.TXT";

pub const MIN_WAKE_SECS: u16 = 10;
pub const MAX_WAKE_SECS: u16 = 900;
pub const MAX_TEXT_SCALE: u8 = 8;

// room for the rendered file; parse side reads at most this much
pub const SETTINGS_BUF_SIZE: usize = 512;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
    pub wake_secs: u16,     // upper bound on deep-sleep length
    pub rotation: Rotation, // panel orientation
    pub text_scale: u8,     // break text magnification of FONT_10X20
}

impl Default for Settings {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Settings {
    pub const fn defaults() -> Self {
        Self {
            wake_secs: 60,
            rotation: Rotation::Deg270,
            text_scale: 4,
        }
    }

    fn sanitize(&mut self) {
        self.wake_secs = self.wake_secs.clamp(MIN_WAKE_SECS, MAX_WAKE_SECS);
        self.text_scale = self.text_scale.clamp(1, MAX_TEXT_SCALE);
    }

    /// Parse a settings file on top of the defaults.
    pub fn parse(data: &[u8]) -> Self {
        let mut s = Self::defaults();
        for line in data.split(|&b| b == b'\n') {
            let line = trim(line);
            if line.is_empty() || line[0] == b'#' {
                continue;
            }
            if let Some(eq) = line.iter().position(|&b| b == b'=') {
                let key = trim(&line[..eq]);
                let val = trim(&line[eq + 1..]);
                apply_setting(key, val, &mut s);
            }
        }
        s.sanitize();
        s
    }

    /// Render as text into `buf`; returns the number of bytes used.
    pub fn write(&self, buf: &mut [u8]) -> usize {
        let mut wr = TxtWriter::new(buf);
        wr.put(b"# pomo-ink settings\n");
        wr.put(b"# lines starting with # are ignored\n\n");
        wr.put(b"# longest deep sleep between checks (10..900 seconds)\n");
        wr.kv_num(b"wake_secs", self.wake_secs);
        wr.put(b"# panel rotation: 0, 90, 180 or 270\n");
        wr.kv_num(b"rotation", self.rotation.degrees());
        wr.put(b"# break text size multiplier (1..8)\n");
        wr.kv_num(b"text_scale", self.text_scale as u16);
        wr.len()
    }
}

// Text format parser / writer
fn trim(s: &[u8]) -> &[u8] {
    let mut start = 0;
    let mut end = s.len();
    while start < end && matches!(s[start], b' ' | b'\t' | b'\r') {
        start += 1;
    }
    while end > start && matches!(s[end - 1], b' ' | b'\t' | b'\r') {
        end -= 1;
    }
    &s[start..end]
}

fn parse_u16(s: &[u8]) -> Option<u16> {
    if s.is_empty() {
        return None;
    }
    let mut val: u16 = 0;
    for &b in s {
        if !b.is_ascii_digit() {
            return None;
        }
        val = val.checked_mul(10)?.checked_add((b - b'0') as u16)?;
    }
    Some(val)
}

fn apply_setting(key: &[u8], val: &[u8], s: &mut Settings) {
    match key {
        b"wake_secs" => {
            if let Some(v) = parse_u16(val) {
                s.wake_secs = v;
            }
        }
        b"rotation" => {
            if let Some(r) = parse_u16(val).and_then(Rotation::from_degrees) {
                s.rotation = r;
            }
        }
        b"text_scale" => {
            if let Some(v) = parse_u16(val) {
                s.text_scale = v.min(u8::MAX as u16) as u8;
            }
        }
        _ => {} // unknown keys silently ignored for forward compat
    }
}

// tiny cursor writer for building the text representation
struct TxtWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> TxtWriter<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn put(&mut self, data: &[u8]) {
        let n = data.len().min(self.buf.len() - self.pos);
        self.buf[self.pos..self.pos + n].copy_from_slice(&data[..n]);
        self.pos += n;
    }

    fn put_u16(&mut self, val: u16) {
        if val == 0 {
            self.put(b"0");
            return;
        }
        let mut digits = [0u8; 5];
        let mut i = 5;
        let mut v = val;
        while v > 0 {
            i -= 1;
            digits[i] = b'0' + (v % 10) as u8;
            v /= 10;
        }
        self.put(&digits[i..5]);
    }

    fn kv_num(&mut self, key: &[u8], val: u16) {
        self.put(key);
        self.put(b"=");
        self.put_u16(val);
        self.put(b"\n");
    }

    fn len(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Settings::parse(b""), Settings::defaults());
    }

    #[test]
    fn parses_keys_comments_and_whitespace() {
        let txt = b"# comment\n wake_secs = 120 \r\nrotation=90\ntext_scale=3\n";
        let s = Settings::parse(txt);
        assert_eq!(s.wake_secs, 120);
        assert_eq!(s.rotation, Rotation::Deg90);
        assert_eq!(s.text_scale, 3);
    }

    #[test]
    fn clamps_out_of_range_values() {
        let s = Settings::parse(b"wake_secs=1\ntext_scale=40\n");
        assert_eq!(s.wake_secs, MIN_WAKE_SECS);
        assert_eq!(s.text_scale, MAX_TEXT_SCALE);

        let s = Settings::parse(b"wake_secs=60000\ntext_scale=0\n");
        assert_eq!(s.wake_secs, MAX_WAKE_SECS);
        assert_eq!(s.text_scale, 1);
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let s = Settings::parse(b"wake_secs=soon\nrotation=45\ntext_scale=-2\n");
        assert_eq!(s, Settings::defaults());
    }

    #[test]
    fn cycle_lengths_are_not_settable() {
        let s = Settings::parse(b"pomodoro=10\nlong_break=1\n");
        assert_eq!(s, Settings::defaults());
    }

    #[test]
    fn written_file_parses_back() {
        let s = Settings {
            wake_secs: 300,
            rotation: Rotation::Deg180,
            text_scale: 2,
        };
        let mut buf = [0u8; SETTINGS_BUF_SIZE];
        let n = s.write(&mut buf);
        assert!(n < SETTINGS_BUF_SIZE);
        assert_eq!(Settings::parse(&buf[..n]), s);
    }
}
