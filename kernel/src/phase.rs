// Pomodoro phase calculator
//
// A cycle is four work intervals separated by three short breaks, then
// one long break; 8400s in total, repeating. The phase is a pure
// function of seconds elapsed since the cycle start, and elapsed time
// is taken modulo one day so a start stamped late in the evening still
// resolves after midnight.

use serde::{Deserialize, Serialize};

pub const POMODORO_SECS: u32 = 25 * 60;
pub const SHORT_BREAK_SECS: u32 = 5 * 60;
pub const LONG_BREAK_SECS: u32 = 25 * 60;

/// One work interval plus the short break after it.
pub const PAIR_SECS: u32 = POMODORO_SECS + SHORT_BREAK_SECS;

pub const CYCLE_SECS: u32 = 3 * PAIR_SECS + POMODORO_SECS + LONG_BREAK_SECS; // 8400

// positions strictly past this are long break
pub const LONG_BREAK_AFTER: u32 = 4 * POMODORO_SECS + 3 * SHORT_BREAK_SECS; // 6900

pub const DAY_SECS: u32 = 86_400;

pub const MAX_TOMATO: u8 = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    #[serde(rename = "still working")]
    Working,
    #[serde(rename = "break time!")]
    ShortBreak,
    #[serde(rename = "looooong break time!")]
    LongBreak,
}

impl Phase {
    /// Text shown on the panel (and stored in the status file).
    pub const fn label(self) -> &'static str {
        match self {
            Phase::Working => "still working",
            Phase::ShortBreak => "break time!",
            Phase::LongBreak => "looooong break time!",
        }
    }

    pub const fn is_break(self) -> bool {
        !matches!(self, Phase::Working)
    }
}

impl core::fmt::Display for Phase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PhaseResult {
    pub tomato_index: u8,
    pub phase: Phase,
}

impl PhaseResult {
    pub const fn new(tomato_index: u8, phase: Phase) -> Self {
        Self {
            tomato_index,
            phase,
        }
    }
}

/// Reduce a free-running seconds counter to seconds within the day.
#[inline]
pub fn seconds_of_day(clock_secs: u64) -> u32 {
    (clock_secs % DAY_SECS as u64) as u32
}

/// Seconds since `start_time`, wrapped into `[0, DAY_SECS)`.
///
/// Both arguments are seconds-of-day; larger values are reduced first.
/// A `now` earlier than `start_time` means midnight passed in between.
#[inline]
pub fn elapsed_since(start_time: u32, now: u32) -> u32 {
    (now as i64 - start_time as i64).rem_euclid(DAY_SECS as i64) as u32
}

/// Classify `elapsed` seconds into a tomato index and phase.
pub fn phase_for_elapsed(elapsed: u32) -> PhaseResult {
    let completed_cycles = elapsed / CYCLE_SECS;
    let position = elapsed - completed_cycles * CYCLE_SECS;

    // the long-break tail (7200..8400) would otherwise count as a fifth pair
    let tomato_index = (position / PAIR_SECS).min(MAX_TOMATO as u32) as u8;

    let phase = if tomato_index < MAX_TOMATO && position % PAIR_SECS >= POMODORO_SECS {
        Phase::ShortBreak
    } else if position > LONG_BREAK_AFTER {
        Phase::LongBreak
    } else {
        Phase::Working
    };

    PhaseResult::new(tomato_index, phase)
}

/// Phase at seconds-of-day `now` for a cycle that began at `start_time`.
#[inline]
pub fn phase_at(start_time: u32, now: u32) -> PhaseResult {
    phase_for_elapsed(elapsed_since(start_time, now))
}

/// Seconds until `phase_for_elapsed` next returns something different.
///
/// `elapsed` is expected in `[0, DAY_SECS)`; the day rollover back to
/// zero counts as a change because 86400 is not a whole number of cycles.
/// Always at least 1.
pub fn secs_until_change(elapsed: u32) -> u32 {
    let elapsed = elapsed % DAY_SECS;
    let position = elapsed % CYCLE_SECS;
    let pair = position / PAIR_SECS;

    let next = if pair < MAX_TOMATO as u32 {
        if position % PAIR_SECS < POMODORO_SECS {
            pair * PAIR_SECS + POMODORO_SECS
        } else {
            (pair + 1) * PAIR_SECS
        }
    } else if position <= LONG_BREAK_AFTER {
        LONG_BREAK_AFTER + 1
    } else {
        CYCLE_SECS
    };

    (next - position).min(DAY_SECS - elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_is_8400_seconds() {
        assert_eq!(CYCLE_SECS, 8400);
        assert_eq!(LONG_BREAK_AFTER, 6900);
    }

    #[test]
    fn start_of_cycle_is_first_tomato() {
        assert_eq!(phase_for_elapsed(0), PhaseResult::new(0, Phase::Working));
    }

    #[test]
    fn short_break_begins_at_pomodoro_boundary() {
        assert_eq!(phase_at(0, 1499), PhaseResult::new(0, Phase::Working));
        assert_eq!(phase_at(0, 1500), PhaseResult::new(0, Phase::ShortBreak));
        assert_eq!(phase_at(0, 1799), PhaseResult::new(0, Phase::ShortBreak));
        assert_eq!(phase_at(0, 1800), PhaseResult::new(1, Phase::Working));
    }

    #[test]
    fn fourth_tomato_has_no_short_break() {
        assert_eq!(phase_at(0, 5400), PhaseResult::new(3, Phase::Working));
        assert_eq!(phase_at(0, 6899), PhaseResult::new(3, Phase::Working));
        // boundary itself still counts as work
        assert_eq!(phase_at(0, 6900), PhaseResult::new(3, Phase::Working));
        assert_eq!(phase_at(0, 6901), PhaseResult::new(3, Phase::LongBreak));
    }

    #[test]
    fn long_break_tail_keeps_index_three() {
        assert_eq!(phase_at(0, 7200), PhaseResult::new(3, Phase::LongBreak));
        assert_eq!(phase_at(0, 8399), PhaseResult::new(3, Phase::LongBreak));
    }

    #[test]
    fn cycle_repeats() {
        assert_eq!(phase_for_elapsed(8400), phase_for_elapsed(0));
        assert_eq!(phase_at(0, 8400), PhaseResult::new(0, Phase::Working));
        assert_eq!(phase_at(0, 8400 + 1500), PhaseResult::new(0, Phase::ShortBreak));
    }

    #[test]
    fn wraps_across_midnight() {
        // started at 23:50, now 00:10 -> 20 minutes in
        let start = DAY_SECS - 600;
        assert_eq!(elapsed_since(start, 600), 1200);
        assert_eq!(phase_at(start, 600), PhaseResult::new(0, Phase::Working));
        // 23:50 + 26 minutes
        assert_eq!(phase_at(start, 960), PhaseResult::new(0, Phase::ShortBreak));
    }

    #[test]
    fn elapsed_reduces_oversized_inputs() {
        assert_eq!(elapsed_since(0, DAY_SECS + 5), 5);
        assert_eq!(elapsed_since(DAY_SECS + 10, 20), 10);
    }

    #[test]
    fn seconds_of_day_wraps() {
        assert_eq!(seconds_of_day(0), 0);
        assert_eq!(seconds_of_day(86_399), 86_399);
        assert_eq!(seconds_of_day(86_400 * 3 + 42), 42);
    }

    #[test]
    fn next_change_from_known_positions() {
        assert_eq!(secs_until_change(0), 1500);
        assert_eq!(secs_until_change(1499), 1);
        assert_eq!(secs_until_change(1500), 300);
        assert_eq!(secs_until_change(5400), 1501);
        assert_eq!(secs_until_change(6900), 1);
        assert_eq!(secs_until_change(6901), 1499);
        assert_eq!(secs_until_change(8399), 1);
    }

    #[test]
    fn next_change_stops_at_day_rollover() {
        // 86399 sits 2399s into the eleventh cycle; the wrap to 0 comes first
        assert_eq!(secs_until_change(DAY_SECS - 1), 1);
        assert_eq!(secs_until_change(DAY_SECS - 100), 100);
    }

    #[test]
    fn labels_match_status_strings() {
        assert_eq!(Phase::Working.label(), "still working");
        assert_eq!(Phase::ShortBreak.label(), "break time!");
        assert_eq!(Phase::LongBreak.label(), "looooong break time!");
        assert!(Phase::LongBreak.is_break());
        assert!(!Phase::Working.is_break());
    }
}
