// Persisted cycle state
//
// Stored as a small JSON object, e.g.
//   {"num_tomato":1,"status_cycle":"break time!","start_time":41400}
// status_cycle carries the human-readable phase label; comparisons
// are done on the decoded Phase, never on the string.

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::phase::{DAY_SECS, MAX_TOMATO, Phase, PhaseResult};

pub const STATUS_FILE: &str = "STATUS.JSN";

// anything longer is not ours
pub const MAX_STATUS_BYTES: usize = 256;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleState {
    #[serde(rename = "num_tomato")]
    pub tomato_index: u8,
    #[serde(rename = "status_cycle")]
    pub phase: Phase,
    pub start_time: u32,
}

impl CycleState {
    /// First-run state: a new cycle starting now.
    pub const fn fresh(now: u32) -> Self {
        Self {
            tomato_index: 0,
            phase: Phase::Working,
            start_time: now % DAY_SECS,
        }
    }

    /// Same cycle, updated to what the calculator reports now.
    pub const fn advance(self, result: PhaseResult) -> Self {
        Self {
            tomato_index: result.tomato_index,
            phase: result.phase,
            start_time: self.start_time,
        }
    }

    pub const fn result(&self) -> PhaseResult {
        PhaseResult::new(self.tomato_index, self.phase)
    }

    /// True when the panel already shows `result`.
    pub fn shows(&self, result: &PhaseResult) -> bool {
        self.result() == *result
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let mut state: CycleState = serde_json::from_slice(bytes)?;
        state.sanitize();
        Ok(state)
    }

    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec(self)?)
    }

    fn sanitize(&mut self) {
        self.start_time %= DAY_SECS;
        self.tomato_index = self.tomato_index.min(MAX_TOMATO);
    }
}
