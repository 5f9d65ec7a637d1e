// ESP32-C3 side of pomo-ink: board bring-up, SD card backends and the
// RTC clock. The logic lives in pomo-kernel.

#![no_std]

extern crate alloc;

pub mod board;
pub mod clock;
pub mod drivers;
pub mod stores;
