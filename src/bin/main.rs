// pomo-ink entry point
//
// One pass per wake: bring up the board, read settings, let the kernel
// decide whether the panel needs a new frame, put the panel to sleep and
// deep-sleep the chip until the next phase change (or the wake interval).
//
// Errors are logged and still end in deep sleep, so the next wake is
// the retry.

#![no_std]
#![no_main]

use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::rtc_cntl::sleep::TimerWakeupSource;
use esp_hal::rtc_cntl::{SocResetReason, reset_reason};
use esp_hal::system::Cpu;
use log::{error, info, warn};

use pomo_ink::board::Board;
use pomo_ink::clock::RtcClock;
use pomo_ink::stores::{self, EpdPanel, SdAssetStore, SdStatusStore};
use pomo_kernel::app::{Boot, Pomodoro};
use pomo_kernel::drivers::strip::StripBuffer;

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);
    // largest allocation is one decoded tomato image
    esp_alloc::heap_allocator!(size: 128 * 1024);

    let boot = match reset_reason(Cpu::ProCpu) {
        Some(SocResetReason::CoreDeepSleep) => Boot::Timer,
        _ => Boot::Cold,
    };
    info!("booting ({:?})", boot);

    let mut board = Board::init(peripherals);
    let mut delay = Delay::new();

    let settings = stores::load_settings(&board.sd);
    board.epd.set_rotation(settings.rotation);
    info!(
        "settings: wake {}s, rotation {}, text x{}",
        settings.wake_secs,
        settings.rotation.degrees(),
        settings.text_scale
    );

    let mut strip = StripBuffer::new();
    let mut app = Pomodoro::new(
        RtcClock::new(&board.rtc),
        SdStatusStore::new(&board.sd),
        SdAssetStore::new(&board.sd),
        EpdPanel::new(&mut board.epd, &mut strip),
        settings,
    );

    let sleep_secs = match app.run(boot) {
        Ok(outcome) => {
            info!(
                "pomodoro: tomato {} {} (redrawn: {})",
                outcome.result.tomato_index, outcome.result.phase, outcome.redrawn
            );
            outcome.sleep_secs
        }
        Err(e) => {
            error!("pomodoro: {}", e);
            settings.wake_secs as u32
        }
    };
    drop(app);

    if let Err(e) = board.epd.hibernate(&mut delay) {
        warn!("epd: hibernate failed: {}", e);
    }

    info!("sleeping {}s", sleep_secs);
    let timer = TimerWakeupSource::new(core::time::Duration::from_secs(sleep_secs as u64));
    board.rtc.sleep_deep(&[&timer]);
}
