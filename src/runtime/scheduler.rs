// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scheduler backed by tokio timers.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveTime};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::router::InboundEvent;
use crate::scheduler::{Scheduler, TimerId};

/// A [`Scheduler`] delivering timer fires into a light's event queue.
///
/// Each timer is a task sleeping for the delay and then queueing
/// [`InboundEvent::TimerFired`]. Cancelling aborts the task; a fire queued
/// just before the abort is discarded by the controller's id check.
#[derive(Debug)]
pub struct TokioScheduler {
    queue: UnboundedSender<InboundEvent>,
    timers: HashMap<TimerId, JoinHandle<()>>,
}

impl TokioScheduler {
    /// Creates a scheduler feeding `queue`.
    #[must_use]
    pub fn new(queue: UnboundedSender<InboundEvent>) -> Self {
        Self {
            queue,
            timers: HashMap::new(),
        }
    }

    /// Returns the number of timers that have not fired or been cancelled.
    #[must_use]
    pub fn active_timers(&self) -> usize {
        self.timers.values().filter(|h| !h.is_finished()).count()
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn time_of_day(&self) -> NaiveTime {
        Local::now().time()
    }

    fn run_once_after(&mut self, delay: Duration) -> TimerId {
        self.timers.retain(|_, handle| !handle.is_finished());

        let id = TimerId::next();
        let queue = self.queue.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if queue.send(InboundEvent::TimerFired(id)).is_err() {
                tracing::trace!(timer = %id, "Timer fired after queue closed");
            }
        });
        self.timers.insert(id, handle);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(handle) = self.timers.remove(&id) {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for handle in self.timers.values() {
            handle.abort();
        }
    }
}
