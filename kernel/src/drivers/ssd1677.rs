// SSD1677 e-paper driver (board-independent)
// Tested on GDEQ0426T82 (800x480). No framebuffer; pixels streamed
// through a 4KB StripBuffer. Only full (GC) refreshes: the panel changes
// a handful of times per hour and is hibernated between wakes, so there
// is no partial-refresh state to carry across deep sleep.

use embedded_graphics_core::geometry::Size;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use super::strip::{STRIP_COUNT, StripBuffer};

pub const WIDTH: u16 = 800;
pub const HEIGHT: u16 = 480;

pub const SPI_FREQ_MHZ: u32 = 20;

const POWER_OFF_TIMEOUT_MS: u32 = 500;
const FULL_REFRESH_TIMEOUT_MS: u32 = 5000;
const RESET_TIMEOUT_MS: u32 = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    #[default]
    Deg270,
}

impl Rotation {
    pub const fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    pub const fn from_degrees(deg: u16) -> Option<Self> {
        match deg {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    /// Drawing area as seen by screens after rotation.
    pub const fn logical_size(self) -> Size {
        match self {
            Rotation::Deg0 | Rotation::Deg180 => Size::new(WIDTH as u32, HEIGHT as u32),
            Rotation::Deg90 | Rotation::Deg270 => Size::new(HEIGHT as u32, WIDTH as u32),
        }
    }
}

// SSD1677 commands
mod cmd {
    pub const DRIVER_OUTPUT_CONTROL: u8 = 0x01;
    pub const BOOSTER_SOFT_START: u8 = 0x0C;
    pub const DEEP_SLEEP: u8 = 0x10;
    pub const DATA_ENTRY_MODE: u8 = 0x11;
    pub const SW_RESET: u8 = 0x12;
    pub const TEMPERATURE_SENSOR: u8 = 0x18;
    pub const MASTER_ACTIVATION: u8 = 0x20;
    pub const DISPLAY_UPDATE_CONTROL_1: u8 = 0x21;
    pub const DISPLAY_UPDATE_CONTROL_2: u8 = 0x22;
    pub const WRITE_RAM_BW: u8 = 0x24; // current/new buffer
    pub const WRITE_RAM_RED: u8 = 0x26; // previous buffer (differential)
    pub const BORDER_WAVEFORM: u8 = 0x3C;
    pub const SET_RAM_X_RANGE: u8 = 0x44;
    pub const SET_RAM_Y_RANGE: u8 = 0x45;
    pub const SET_RAM_X_COUNTER: u8 = 0x4E;
    pub const SET_RAM_Y_COUNTER: u8 = 0x4F;
}

pub struct DisplayDriver<SPI, DC, RST, BUSY> {
    spi: SPI,
    dc: DC,
    rst: RST,
    busy: BUSY,
    rotation: Rotation,
    power_is_on: bool,
    init_done: bool,
}

impl<SPI, DC, RST, BUSY> DisplayDriver<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
{
    pub fn new(spi: SPI, dc: DC, rst: RST, busy: BUSY) -> Self {
        Self {
            spi,
            dc,
            rst,
            busy,
            rotation: Rotation::Deg270,
            power_is_on: false,
            init_done: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    /// Logical (rotation-aware) panel size.
    pub fn size(&self) -> Size {
        self.rotation.logical_size()
    }

    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) {
        let _ = self.rst.set_high();
        delay.delay_ms(20);
        let _ = self.rst.set_low();
        delay.delay_ms(2);
        let _ = self.rst.set_high();
        delay.delay_ms(20);
    }

    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), &'static str> {
        self.reset(delay);
        self.init_display(delay)
    }

    // full refresh: identical content to RED then BW, GC update
    pub fn render_full<F, D>(
        &mut self,
        strip: &mut StripBuffer,
        delay: &mut D,
        draw: F,
    ) -> Result<(), &'static str>
    where
        F: Fn(&mut StripBuffer),
        D: DelayNs,
    {
        if !self.init_done {
            self.init_display(delay)?;
        }

        delay.delay_ms(1);

        for &ram_cmd in &[cmd::WRITE_RAM_RED, cmd::WRITE_RAM_BW] {
            self.set_ram_area(0, 0, WIDTH, HEIGHT)?;
            self.send_command(ram_cmd)?;
            delay.delay_ms(1);

            for i in 0..STRIP_COUNT {
                strip.begin_strip(self.rotation, i);
                draw(strip);
                self.send_data(strip.data())?;
            }
        }

        self.update_full(delay)
    }

    pub fn power_off<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), &'static str> {
        if self.power_is_on {
            self.send_command(cmd::DISPLAY_UPDATE_CONTROL_2)?;
            self.send_data(&[0x83])?;
            self.send_command(cmd::MASTER_ACTIVATION)?;
            self.wait_busy(delay, POWER_OFF_TIMEOUT_MS)?;
            self.power_is_on = false;
        }
        Ok(())
    }

    /// Controller deep sleep; only a hardware reset wakes it again.
    ///
    /// Deep sleep is entered even if power-off times out; that error is
    /// still returned.
    pub fn hibernate<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), &'static str> {
        let powered_off = self.power_off(delay);
        self.send_command(cmd::DEEP_SLEEP)?;
        self.send_data(&[0x01])?;
        self.init_done = false;
        self.power_is_on = false;
        powered_off
    }

    // ── Display init (matches GxEPD2 _InitDisplay) ──────────────

    fn init_display<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), &'static str> {
        self.send_command(cmd::SW_RESET)?;
        delay.delay_ms(10);
        self.wait_busy(delay, RESET_TIMEOUT_MS)?;

        self.send_command(cmd::TEMPERATURE_SENSOR)?;
        self.send_data(&[0x80])?;

        self.send_command(cmd::BOOSTER_SOFT_START)?;
        self.send_data(&[0xAE, 0xC7, 0xC3, 0xC0, 0x80])?;

        self.send_command(cmd::DRIVER_OUTPUT_CONTROL)?;
        self.send_data(&[((HEIGHT - 1) & 0xFF) as u8, ((HEIGHT - 1) >> 8) as u8, 0x02])?;

        self.send_command(cmd::BORDER_WAVEFORM)?;
        self.send_data(&[0x01])?;

        self.set_ram_area(0, 0, WIDTH, HEIGHT)?;

        self.init_done = true;
        Ok(())
    }

    // gates wired in reverse; Y flipped (per GxEPD2)
    fn set_ram_area(&mut self, x: u16, y: u16, w: u16, h: u16) -> Result<(), &'static str> {
        let y_flipped = HEIGHT - y - h;

        // X increment, Y decrement (compensates gate reversal)
        self.send_command(cmd::DATA_ENTRY_MODE)?;
        self.send_data(&[0x01])?;

        self.send_command(cmd::SET_RAM_X_RANGE)?;
        self.send_data(&[
            (x & 0xFF) as u8,
            (x >> 8) as u8,
            ((x + w - 1) & 0xFF) as u8,
            ((x + w - 1) >> 8) as u8,
        ])?;

        self.send_command(cmd::SET_RAM_Y_RANGE)?;
        self.send_data(&[
            ((y_flipped + h - 1) & 0xFF) as u8,
            ((y_flipped + h - 1) >> 8) as u8,
            (y_flipped & 0xFF) as u8,
            (y_flipped >> 8) as u8,
        ])?;

        self.send_command(cmd::SET_RAM_X_COUNTER)?;
        self.send_data(&[(x & 0xFF) as u8, (x >> 8) as u8])?;

        self.send_command(cmd::SET_RAM_Y_COUNTER)?;
        self.send_data(&[
            ((y_flipped + h - 1) & 0xFF) as u8,
            ((y_flipped + h - 1) >> 8) as u8,
        ])
    }

    fn update_full<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), &'static str> {
        // bypass RED as 0, BW normal
        self.send_command(cmd::DISPLAY_UPDATE_CONTROL_1)?;
        self.send_data(&[0x40, 0x00])?;

        // Mode 1 (GC full waveform), power stays on until power_off
        self.send_command(cmd::DISPLAY_UPDATE_CONTROL_2)?;
        self.send_data(&[0xF7])?;

        self.send_command(cmd::MASTER_ACTIVATION)?;
        self.power_is_on = true;
        self.wait_busy(delay, FULL_REFRESH_TIMEOUT_MS)
    }

    // ── Low-level SPI / busy ────────────────────────────────

    fn wait_busy<D: DelayNs>(&mut self, delay: &mut D, timeout_ms: u32) -> Result<(), &'static str> {
        let mut waited = 0;
        while self.busy.is_high().map_err(|_| "busy pin read failed")? {
            if waited >= timeout_ms {
                log::warn!("epd: busy after {}ms", timeout_ms);
                return Err("busy timeout");
            }
            delay.delay_ms(1);
            waited += 1;
        }
        Ok(())
    }

    fn send_command(&mut self, cmd: u8) -> Result<(), &'static str> {
        self.dc.set_low().map_err(|_| "dc pin failed")?;
        self.spi.write(&[cmd]).map_err(|_| "spi write failed")?;
        self.dc.set_high().map_err(|_| "dc pin failed")
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), &'static str> {
        self.dc.set_high().map_err(|_| "dc pin failed")?;
        self.spi.write(data).map_err(|_| "spi write failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::strip::STRIP_BUF_SIZE;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use embedded_hal::spi::Operation;
    use std::rc::Rc;

    // (dc_high, bytes) for every SPI write
    type Log = Rc<RefCell<Vec<(bool, Vec<u8>)>>>;

    struct FakeSpi {
        log: Log,
        dc: Rc<RefCell<bool>>,
    }

    impl embedded_hal::spi::ErrorType for FakeSpi {
        type Error = Infallible;
    }

    impl SpiDevice for FakeSpi {
        fn transaction(&mut self, ops: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
            for op in ops.iter_mut() {
                if let Operation::Write(data) = op {
                    self.log.borrow_mut().push((*self.dc.borrow(), data.to_vec()));
                }
            }
            Ok(())
        }
    }

    struct DcPin(Rc<RefCell<bool>>);

    impl embedded_hal::digital::ErrorType for DcPin {
        type Error = Infallible;
    }

    impl OutputPin for DcPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            *self.0.borrow_mut() = false;
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            *self.0.borrow_mut() = true;
            Ok(())
        }
    }

    struct Pin {
        level: bool,
    }

    impl embedded_hal::digital::ErrorType for Pin {
        type Error = Infallible;
    }

    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    impl InputPin for Pin {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.level)
        }
        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.level)
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn driver(busy: bool) -> (DisplayDriver<FakeSpi, DcPin, Pin, Pin>, Log) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let dc = Rc::new(RefCell::new(true));
        let spi = FakeSpi {
            log: log.clone(),
            dc: dc.clone(),
        };
        let epd = DisplayDriver::new(spi, DcPin(dc), Pin { level: false }, Pin { level: busy });
        (epd, log)
    }

    fn commands(log: &Log) -> Vec<u8> {
        log.borrow()
            .iter()
            .filter(|(dc, _)| !dc)
            .map(|(_, bytes)| bytes[0])
            .collect()
    }

    #[test]
    fn full_refresh_streams_both_planes() {
        let (mut epd, log) = driver(false);
        let mut strip = StripBuffer::new();
        epd.render_full(&mut strip, &mut NoDelay, |_| {}).unwrap();

        let strips = log
            .borrow()
            .iter()
            .filter(|(dc, bytes)| *dc && bytes.len() == STRIP_BUF_SIZE)
            .count();
        assert_eq!(strips, 2 * STRIP_COUNT as usize);

        let cmds = commands(&log);
        assert_eq!(cmds[0], cmd::SW_RESET);
        assert_eq!(cmds.last(), Some(&cmd::MASTER_ACTIVATION));
        let red = cmds.iter().position(|&c| c == cmd::WRITE_RAM_RED).unwrap();
        let bw = cmds.iter().position(|&c| c == cmd::WRITE_RAM_BW).unwrap();
        assert!(red < bw);
    }

    #[test]
    fn draw_closure_reaches_the_wire() {
        let (mut epd, log) = driver(false);
        epd.set_rotation(Rotation::Deg0);
        let mut strip = StripBuffer::new();
        epd.render_full(&mut strip, &mut NoDelay, |s| {
            use embedded_graphics_core::{Pixel, draw_target::DrawTarget, geometry::Point};
            use embedded_graphics_core::pixelcolor::BinaryColor;
            let _ = s.draw_iter([Pixel(Point::new(0, 0), BinaryColor::On)]);
        })
        .unwrap();

        let first_strip = log
            .borrow()
            .iter()
            .find(|(dc, bytes)| *dc && bytes.len() == STRIP_BUF_SIZE)
            .map(|(_, b)| b[0])
            .unwrap();
        assert_eq!(first_strip, 0x7F);
    }

    #[test]
    fn stuck_busy_is_an_error() {
        let (mut epd, _log) = driver(true);
        let mut strip = StripBuffer::new();
        assert_eq!(
            epd.render_full(&mut strip, &mut NoDelay, |_| {}),
            Err("busy timeout")
        );
    }

    #[test]
    fn hibernate_powers_off_then_sleeps() {
        let (mut epd, log) = driver(false);
        let mut strip = StripBuffer::new();
        epd.render_full(&mut strip, &mut NoDelay, |_| {}).unwrap();
        log.borrow_mut().clear();

        epd.hibernate(&mut NoDelay).unwrap();
        let cmds = commands(&log);
        assert_eq!(
            cmds,
            [
                cmd::DISPLAY_UPDATE_CONTROL_2,
                cmd::MASTER_ACTIVATION,
                cmd::DEEP_SLEEP
            ]
        );
        assert_eq!(log.borrow().last().unwrap().1, [0x01]);
    }

    #[test]
    fn hibernate_still_sleeps_when_power_off_times_out() {
        let (mut epd, log) = driver(false);
        let mut strip = StripBuffer::new();
        epd.render_full(&mut strip, &mut NoDelay, |_| {}).unwrap();
        log.borrow_mut().clear();

        epd.busy.level = true;
        assert_eq!(epd.hibernate(&mut NoDelay), Err("busy timeout"));
        assert_eq!(commands(&log).last(), Some(&cmd::DEEP_SLEEP));
        assert_eq!(log.borrow().last().unwrap().1, [0x01]);
        assert!(!epd.power_is_on);
        assert!(!epd.init_done);

        // nothing left to power off on a second call
        log.borrow_mut().clear();
        assert_eq!(epd.hibernate(&mut NoDelay), Ok(()));
        assert_eq!(commands(&log), [cmd::DEEP_SLEEP]);
    }

    #[test]
    fn rotation_degrees_round_trip() {
        for r in [Rotation::Deg0, Rotation::Deg90, Rotation::Deg180, Rotation::Deg270] {
            assert_eq!(Rotation::from_degrees(r.degrees()), Some(r));
        }
        assert_eq!(Rotation::from_degrees(45), None);
        assert_eq!(Rotation::Deg90.logical_size(), Size::new(480, 800));

        let (mut epd, _log) = driver(false);
        assert_eq!(epd.rotation(), Rotation::Deg270);
        epd.set_rotation(Rotation::Deg90);
        assert_eq!(epd.rotation(), Rotation::Deg90);
        assert_eq!(epd.size(), Size::new(480, 800));
    }
}
