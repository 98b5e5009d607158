//! Drag-enter dwell: the timed "hold a drag here to open it" interaction.
//!
//! A dwell is one state value instead of a timer plus an animation, so the
//! deadline and the progress indicator cannot drift apart.

use std::time::Duration;

/// How long a drag has to hover over a nested tile before it is entered.
pub const ENTER_DELAY: Duration = Duration::from_millis(1000);

/// Progress reported while no dwell is running.
pub const NO_PROGRESS: f64 = -1.0;

const PROGRESS_START: f64 = 0.1;
const PROGRESS_END: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dwell {
    #[default]
    Idle,
    Dwelling { elapsed: Duration },
}

impl Dwell {
    /// Arm (or re-arm) the deadline from zero.
    pub fn start(&mut self) {
        *self = Dwell::Dwelling {
            elapsed: Duration::ZERO,
        };
    }

    /// Stop the dwell. Stopping an idle dwell is a no-op.
    pub fn cancel(&mut self) {
        *self = Dwell::Idle;
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Dwell::Dwelling { .. })
    }

    /// Advance the clock by `dt`. Returns `true` exactly once, when the
    /// deadline passes; the dwell is idle again afterwards.
    pub fn advance(&mut self, dt: Duration) -> bool {
        match self {
            Dwell::Idle => false,
            Dwell::Dwelling { elapsed } => {
                *elapsed += dt;
                if *elapsed >= ENTER_DELAY {
                    *self = Dwell::Idle;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Time left until the deadline, `None` when idle.
    pub fn remaining(&self) -> Option<Duration> {
        match self {
            Dwell::Idle => None,
            Dwell::Dwelling { elapsed } => Some(ENTER_DELAY.saturating_sub(*elapsed)),
        }
    }

    /// Linear progress from 0.1 to 100.0 over [`ENTER_DELAY`], or
    /// [`NO_PROGRESS`] when idle.
    pub fn progress(&self) -> f64 {
        match self {
            Dwell::Idle => NO_PROGRESS,
            Dwell::Dwelling { elapsed } => {
                let t = (elapsed.as_secs_f64() / ENTER_DELAY.as_secs_f64()).min(1.0);
                PROGRESS_START + (PROGRESS_END - PROGRESS_START) * t
            }
        }
    }
}
