// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scheduler abstraction.
//!
//! The controller needs a clock, the local time of day, and single-shot
//! timers. Timers are identified by a [`TimerId`]; when a timer fires, the
//! scheduler delivers the id back to the controller as an event, and the
//! controller ignores any id that is not the one it currently holds. This
//! makes a cancelled timer whose fire was already in flight harmless.
//!
//! Daily triggers and sun tracking are not part of this trait. They are
//! produced by the runtime and arrive as [`ScheduleTrigger`] events.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::NaiveTime;

use crate::types::TimeWindow;

static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a single-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Allocates a fresh identifier, unique within the process.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timer({})", self.0)
    }
}

/// Position of the sun relative to the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SunPosition {
    /// Between sunrise and sunset.
    AboveHorizon,
    /// Between sunset and sunrise.
    BelowHorizon,
}

impl fmt::Display for SunPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AboveHorizon => f.write_str("above_horizon"),
            Self::BelowHorizon => f.write_str("below_horizon"),
        }
    }
}

/// A scheduled event that may change the default scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleTrigger {
    /// A configured time window opened or closed.
    TimeWindow,
    /// The sun crossed the horizon.
    Sun(SunPosition),
}

/// Clock and single-shot timers used by a controller.
pub trait Scheduler {
    /// Returns the current monotonic instant.
    fn now(&self) -> Instant;

    /// Returns the current local time of day.
    fn time_of_day(&self) -> NaiveTime;

    /// Starts a timer firing once after `delay`.
    fn run_once_after(&mut self, delay: Duration) -> TimerId;

    /// Cancels a timer. Unknown or already fired ids are ignored.
    fn cancel(&mut self, id: TimerId);

    /// Returns `true` if the current local time is inside `window`.
    fn now_is_between(&self, window: &TimeWindow) -> bool {
        window.contains(self.time_of_day())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_ids_are_unique() {
        let a = TimerId::next();
        let b = TimerId::next();
        assert_ne!(a, b);
        assert!(b.value() > a.value());
    }

    #[test]
    fn timer_id_display() {
        let id = TimerId(42);
        assert_eq!(id.to_string(), "Timer(42)");
    }

    #[test]
    fn sun_position_display() {
        assert_eq!(SunPosition::AboveHorizon.to_string(), "above_horizon");
        assert_eq!(SunPosition::BelowHorizon.to_string(), "below_horizon");
    }
}
