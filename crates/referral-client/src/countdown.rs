//! Stake maturity countdown
//!
//! The display is a pure function of (maturity, now). Ticking is delegated to a
//! [`Scheduler`] so the browser can drive it with a real interval and tests can
//! drive it by hand.

use std::fmt;
use std::ops::ControlFlow;
use std::time::Duration;

use crate::constants::{MATURED_LABEL, PLACEHOLDER};

/// Wall clock in Unix seconds
pub trait Clock {
    fn now_secs(&self) -> u64;
}

/// Repeating timer facility. Dropping the returned handle cancels the timer;
/// a tick returning `Break` stops it for good.
pub trait Scheduler {
    type Handle;

    fn repeat(&self, period: Duration, tick: Box<dyn FnMut() -> ControlFlow<()>>) -> Self::Handle;
}

/// Remaining lock time split for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Remaining {
    pub fn from_secs(total: u64) -> Self {
        Self {
            days: total / 86_400,
            hours: total % 86_400 / 3_600,
            minutes: total % 3_600 / 60,
            seconds: total % 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownDisplay {
    /// No active stake
    Inactive,
    Remaining(Remaining),
    Matured,
}

impl CountdownDisplay {
    /// Display for a maturity timestamp at `now`. A zero maturity means no stake.
    pub fn at(maturity: u64, now: u64) -> Self {
        if maturity == 0 {
            CountdownDisplay::Inactive
        } else if maturity <= now {
            CountdownDisplay::Matured
        } else {
            CountdownDisplay::Remaining(Remaining::from_secs(maturity - now))
        }
    }

    pub fn is_final(&self) -> bool {
        !matches!(self, CountdownDisplay::Remaining(_))
    }
}

impl fmt::Display for CountdownDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountdownDisplay::Inactive => f.write_str(PLACEHOLDER),
            CountdownDisplay::Remaining(r) => {
                write!(f, "{}d {}h {}m {}s", r.days, r.hours, r.minutes, r.seconds)
            }
            CountdownDisplay::Matured => f.write_str(MATURED_LABEL),
        }
    }
}
