// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sunrise and sunset tracking.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sunrise::{Coordinates, SolarDay, SolarEvent};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::config::Location;
use crate::router::InboundEvent;
use crate::scheduler::{ScheduleTrigger, SunPosition};

const RETRY_INTERVAL: Duration = Duration::from_secs(6 * 3600);

/// Returns the sun position at `now` and the time of the next crossing.
///
/// Returns `None` for invalid coordinates, or when no crossing is found
/// around `now` (polar day or night).
#[must_use]
pub fn sun_state(location: Location, now: DateTime<Utc>) -> Option<(SunPosition, DateTime<Utc>)> {
    let coord = Coordinates::new(location.latitude, location.longitude)?;
    let today = now.date_naive();

    let mut crossings: Vec<(DateTime<Utc>, SunPosition)> = [today.pred_opt(), Some(today), today.succ_opt()]
        .into_iter()
        .flatten()
        .flat_map(|date| {
            let day = SolarDay::new(coord, date);
            [
                (day.event_time(SolarEvent::Sunrise), SunPosition::AboveHorizon),
                (day.event_time(SolarEvent::Sunset), SunPosition::BelowHorizon),
            ]
        })
        .collect();
    crossings.sort_by_key(|(at, _)| *at);

    let position = crossings
        .iter()
        .rev()
        .find(|(at, _)| *at <= now)
        .map(|(_, position)| *position)?;
    let next = crossings.iter().find(|(at, _)| *at > now).map(|(at, _)| *at)?;
    Some((position, next))
}

/// Spawns a task queueing the sun position to every light.
///
/// The current position is sent once at startup, then again at each
/// sunrise and sunset. The task ends when every queue is closed.
pub fn spawn_sun_tracker(location: Location, mut queues: Vec<UnboundedSender<InboundEvent>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last = None;
        loop {
            let now = Utc::now();
            let delay = if let Some((position, next)) = sun_state(location, now) {
                if last != Some(position) {
                    tracing::info!(sun = %position, next = %next, "Sun position");
                    let event = InboundEvent::Schedule(ScheduleTrigger::Sun(position));
                    queues.retain(|queue| queue.send(event.clone()).is_ok());
                    if queues.is_empty() {
                        break;
                    }
                    last = Some(position);
                }
                (next - now).to_std().unwrap_or_default() + Duration::from_secs(1)
            } else {
                tracing::warn!(
                    latitude = location.latitude,
                    longitude = location.longitude,
                    "No sunrise or sunset found, retrying later"
                );
                RETRY_INTERVAL
            };
            tokio::time::sleep(delay).await;
        }
    })
}
