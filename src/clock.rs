// Wall clock backed by the RTC slow timer, which keeps counting through
// deep sleep but restarts on power loss.

use esp_hal::rtc_cntl::Rtc;

use pomo_kernel::clock::WallClock;

pub struct RtcClock<'a> {
    rtc: &'a Rtc<'static>,
}

impl<'a> RtcClock<'a> {
    pub fn new(rtc: &'a Rtc<'static>) -> Self {
        Self { rtc }
    }
}

impl WallClock for RtcClock<'_> {
    fn now_secs(&mut self) -> u64 {
        self.rtc.current_time_us() / 1_000_000
    }
}
