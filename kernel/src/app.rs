// One wake of the status display.
//
// The board supplies a clock, the status and asset stores and the
// panel; `Pomodoro::run` decides what the panel should show, redraws it
// only when that changed, persists the new state and says how long the
// board may sleep before the next change.

use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use log::{debug, info, warn};

use crate::asset::Bitmap;
use crate::clock::WallClock;
use crate::config::Settings;
use crate::error::Error;
use crate::phase::{PhaseResult, elapsed_since, phase_at, secs_until_change};
use crate::render::Screen;
use crate::status::CycleState;

/// Persistent home of the encoded `CycleState`.
pub trait StatusStore {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&mut self) -> Result<Option<Vec<u8>>, Error>;
    fn save(&mut self, data: &[u8]) -> Result<(), Error>;
}

pub trait AssetStore {
    fn tomato(&mut self, index: u8) -> Result<Bitmap, Error>;
}

/// A 1-bit display refreshed as a whole frame.
pub trait Panel {
    type Target: DrawTarget<Color = BinaryColor, Error = Infallible> + OriginDimensions;

    /// Logical (rotation-aware) size.
    fn size(&self) -> Size;

    /// Push a new frame. `draw` may be called more than once (once per
    /// band on strip-buffered panels) and must draw the same thing each time.
    fn show<F: Fn(&mut Self::Target)>(&mut self, draw: F) -> Result<(), Error>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Boot {
    /// Power-on or reset; the clock has restarted.
    Cold,
    /// Scheduled wake from deep sleep.
    Timer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub result: PhaseResult,
    pub redrawn: bool,
    /// Seconds until the next wake is useful.
    pub sleep_secs: u32,
}

pub struct Pomodoro<C, S, A, P> {
    clock: C,
    store: S,
    assets: A,
    panel: P,
    settings: Settings,
}

impl<C, S, A, P> Pomodoro<C, S, A, P>
where
    C: WallClock,
    S: StatusStore,
    A: AssetStore,
    P: Panel,
{
    pub fn new(clock: C, store: S, assets: A, panel: P, settings: Settings) -> Self {
        Self {
            clock,
            store,
            assets,
            panel,
            settings,
        }
    }

    #[cfg(test)]
    pub(crate) fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    #[cfg(test)]
    pub(crate) fn into_parts(self) -> (C, S, A, P) {
        (self.clock, self.store, self.assets, self.panel)
    }

    pub fn run(&mut self, boot: Boot) -> Result<Outcome, Error> {
        let now = self.clock.seconds_of_day();

        let previous = match boot {
            Boot::Cold => {
                info!("pomodoro: cold boot, new cycle at {}", now);
                None
            }
            Boot::Timer => self.load_state()?,
        };
        let forced = previous.is_none();
        let state = previous.unwrap_or(CycleState::fresh(now));

        let result = phase_at(state.start_time, now);
        let redraw = forced || !state.shows(&result);
        debug!(
            "pomodoro: now={} start={} -> tomato {} {:?}",
            now, state.start_time, result.tomato_index, result.phase
        );

        if redraw {
            let screen = self.compose(result)?;
            self.panel.show(|target| {
                let Ok(()) = screen.draw(target);
            })?;
            self.store.save(&state.advance(result).encode()?)?;
            info!(
                "pomodoro: showing tomato {} ({})",
                result.tomato_index, result.phase
            );
        }

        let until = secs_until_change(elapsed_since(state.start_time, now));
        let sleep_secs = until.min(self.settings.wake_secs as u32).max(1);

        Ok(Outcome {
            result,
            redrawn: redraw,
            sleep_secs,
        })
    }

    fn load_state(&mut self) -> Result<Option<CycleState>, Error> {
        let Some(bytes) = self.store.load()? else {
            info!("status: none stored, starting cycle");
            return Ok(None);
        };
        match CycleState::decode(&bytes) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                warn!("status: discarding unreadable state: {}", e);
                Ok(None)
            }
        }
    }

    fn compose(&mut self, result: PhaseResult) -> Result<Screen, Error> {
        let area = self.panel.size();
        if result.phase.is_break() {
            let scale = self.settings.text_scale as u32;
            return Ok(Screen::message(result.phase.label(), area, scale));
        }
        let bitmap = self.assets.tomato(result.tomato_index)?;
        Ok(Screen::tomato(bitmap, area))
    }
}
