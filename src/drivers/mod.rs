// SD card glue. The panel driver lives in pomo-kernel so it can be
// tested on the host.

pub mod sdcard;
pub mod storage;
