// Panel drivers: chip-level SSD1677 protocol and the strip buffer it
// streams from. Written against embedded-hal traits; pin and bus wiring
// lives in the firmware's board module.

pub mod ssd1677;
pub mod strip;
