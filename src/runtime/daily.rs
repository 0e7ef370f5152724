// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Daily triggers at time window edges.

use std::time::Duration;

use chrono::{Local, NaiveTime, TimeDelta};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::controller::ControllerSettings;
use crate::router::InboundEvent;
use crate::scheduler::ScheduleTrigger;

/// Smallest delay added after a window edge.
pub const JITTER_MIN: Duration = Duration::from_secs(5);

/// Largest delay added after a window edge.
pub const JITTER_MAX: Duration = Duration::from_secs(10);

/// Returns a random duration in `[min, max]` with millisecond resolution.
#[must_use]
pub fn jitter(min: Duration, max: Duration) -> Duration {
    let span = max.saturating_sub(min).as_millis();
    let bits = Uuid::new_v4().as_u128();
    let offset = u64::try_from(bits % (span + 1)).unwrap_or(0);
    min + Duration::from_millis(offset)
}

/// Returns the time until the next occurrence of `at`, strictly in the
/// future.
#[must_use]
pub fn until_next(now: NaiveTime, at: NaiveTime) -> Duration {
    let mut delta = at.signed_duration_since(now);
    if delta <= TimeDelta::zero() {
        delta += TimeDelta::days(1);
    }
    delta.to_std().unwrap_or_default()
}

/// Spawns a task queueing `trigger` every day shortly after `at` local time.
///
/// The task ends when the queue is closed.
pub fn spawn_daily(
    queue: UnboundedSender<InboundEvent>,
    at: NaiveTime,
    trigger: ScheduleTrigger,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let delay = until_next(Local::now().time(), at) + jitter(JITTER_MIN, JITTER_MAX);
            tokio::time::sleep(delay).await;
            tracing::debug!(at = %at, "Daily trigger");
            if queue.send(InboundEvent::Schedule(trigger)).is_err() {
                break;
            }
        }
    })
}

/// Spawns a daily trigger for every edge of the light's time windows.
pub fn spawn_window_triggers(
    settings: &ControllerSettings,
    queue: &UnboundedSender<InboundEvent>,
) -> Vec<JoinHandle<()>> {
    let mut edges: Vec<NaiveTime> = [settings.cold_window, settings.warm_window]
        .into_iter()
        .flatten()
        .flat_map(|w| [w.start(), w.end()])
        .collect();
    edges.sort_unstable();
    edges.dedup();

    edges
        .into_iter()
        .map(|at| spawn_daily(queue.clone(), at, ScheduleTrigger::TimeWindow))
        .collect()
}
