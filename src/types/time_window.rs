// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Daily time windows in local time.
//!
//! A window is half-open, `[start, end)`, and may cross midnight. A window
//! whose start equals its end is empty.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;

use crate::error::ParseError;

/// Parses a `HH:MM` or `HH:MM:SS` time of day.
///
/// # Errors
///
/// Returns [`ParseError::InvalidValue`] if the string matches neither format.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, ParseError> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|e| ParseError::invalid("time", format!("{s:?}: {e}")))
}

/// A daily window between two times of day.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use scenectl::types::TimeWindow;
///
/// let night: TimeWindow = "22:00-06:00".parse().unwrap();
/// assert!(night.contains(NaiveTime::from_hms_opt(23, 30, 0).unwrap()));
/// assert!(night.contains(NaiveTime::from_hms_opt(5, 59, 59).unwrap()));
/// assert!(!night.contains(NaiveTime::from_hms_opt(6, 0, 0).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct TimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

#[derive(serde::Deserialize)]
struct RawWindow {
    start: String,
    end: String,
}

impl TryFrom<RawWindow> for TimeWindow {
    type Error = ParseError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        Ok(Self::new(
            parse_time_of_day(&raw.start)?,
            parse_time_of_day(&raw.end)?,
        ))
    }
}

impl TimeWindow {
    /// Creates a window from its two edges.
    #[must_use]
    pub const fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Returns the time the window opens.
    #[must_use]
    pub const fn start(&self) -> NaiveTime {
        self.start
    }

    /// Returns the time the window closes.
    #[must_use]
    pub const fn end(&self) -> NaiveTime {
        self.end
    }

    /// Returns `true` if `time` falls inside the window.
    #[must_use]
    pub fn contains(&self, time: NaiveTime) -> bool {
        match self.start.cmp(&self.end) {
            Ordering::Less => time >= self.start && time < self.end,
            // crosses midnight
            Ordering::Greater => time >= self.start || time < self.end,
            Ordering::Equal => false,
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M:%S"),
            self.end.format("%H:%M:%S")
        )
    }
}

impl FromStr for TimeWindow {
    type Err = ParseError;

    /// Parses `start-end`, for example `06:50-19:00`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| ParseError::invalid("time window", format!("{s:?}: expected start-end")))?;
        Ok(Self::new(
            parse_time_of_day(start.trim())?,
            parse_time_of_day(end.trim())?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn daytime_window_is_half_open() {
        let w = TimeWindow::new(t(6, 50, 0), t(19, 0, 0));
        assert!(w.contains(t(6, 50, 0)));
        assert!(w.contains(t(12, 0, 0)));
        assert!(w.contains(t(18, 59, 59)));
        assert!(!w.contains(t(19, 0, 0)));
        assert!(!w.contains(t(6, 49, 59)));
    }

    #[test]
    fn window_crossing_midnight() {
        let w = TimeWindow::new(t(22, 0, 0), t(6, 0, 0));
        assert!(w.contains(t(22, 0, 0)));
        assert!(w.contains(t(0, 0, 0)));
        assert!(w.contains(t(5, 59, 59)));
        assert!(!w.contains(t(6, 0, 0)));
        assert!(!w.contains(t(12, 0, 0)));
    }

    #[test]
    fn equal_edges_make_empty_window() {
        let w = TimeWindow::new(t(8, 0, 0), t(8, 0, 0));
        assert!(!w.contains(t(8, 0, 0)));
        assert!(!w.contains(t(20, 0, 0)));
    }

    #[test]
    fn parse_time_formats() {
        assert_eq!(parse_time_of_day("06:50:00").unwrap(), t(6, 50, 0));
        assert_eq!(parse_time_of_day("19:00").unwrap(), t(19, 0, 0));
        assert!(parse_time_of_day("7pm").is_err());
        assert!(parse_time_of_day("25:00").is_err());
    }

    #[test]
    fn deserialize_window_object() {
        let w: TimeWindow =
            serde_json::from_str(r#"{"start": "06:50:00", "end": "19:00"}"#).unwrap();
        assert_eq!(w.start(), t(6, 50, 0));
        assert_eq!(w.end(), t(19, 0, 0));

        let bad = serde_json::from_str::<TimeWindow>(r#"{"start": "noon", "end": "19:00"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn window_from_str_and_display() {
        let w: TimeWindow = "06:50-19:00".parse().unwrap();
        assert_eq!(w.to_string(), "06:50:00-19:00:00");
        assert!("06:50".parse::<TimeWindow>().is_err());
    }
}
