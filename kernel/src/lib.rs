// Board-independent core of pomo-ink.
//
// Everything here builds on the host: the phase calculator, the status
// and settings codecs, text layout, the 1-bit asset decoder, and the
// SSD1677 driver written against embedded-hal traits. The firmware
// crate supplies the ESP32-C3 glue (SD card, RTC, deep sleep).

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod app;
pub mod asset;
pub mod clock;
pub mod config;
pub mod drivers;
pub mod error;
pub mod layout;
pub mod phase;
pub mod render;
pub mod scale;
pub mod status;
pub mod ui;

pub use error::Error;
pub use phase::{Phase, PhaseResult};
