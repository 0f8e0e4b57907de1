// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Date-range enumeration for the extraction loop.
//!
//! A range `[start, end]` is swept in steps of one interval. Both bounds are
//! inclusive: the last window is the one whose start is on or before `end`.

use crate::domain::entities::DateWindow;
use crate::domain::errors::{ExportError, Result};
use chrono::{Days, Months, NaiveDate};
use std::str::FromStr;

const LABEL_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Day,
    Week,
    Month,
    Year,
}

impl FromStr for Interval {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Interval::Day),
            "week" => Ok(Interval::Week),
            "month" => Ok(Interval::Month),
            "year" => Ok(Interval::Year),
            other => Err(ExportError::ConfigError(format!(
                "wrong value for 'interval': expecting one of day, week, month, year; got '{}'",
                other
            ))),
        }
    }
}

impl Interval {
    /// `origin` advanced by `n` intervals, or `None` past chrono's range.
    fn advance(&self, origin: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self {
            Interval::Day => origin.checked_add_days(Days::new(n as u64)),
            Interval::Week => origin.checked_add_days(Days::new(7 * n as u64)),
            Interval::Month => origin.checked_add_months(Months::new(n)),
            Interval::Year => origin.checked_add_months(Months::new(12 * n)),
        }
    }
}

/// Resolves `today`, `yesterday` or a `YYYY-MM-DD` literal.
pub fn parse_date_expr(expr: &str, today: NaiveDate) -> Result<NaiveDate> {
    match expr.trim().to_lowercase().as_str() {
        "today" => Ok(today),
        "yesterday" => today
            .pred_opt()
            .ok_or_else(|| ExportError::ConfigError("date out of range".to_string())),
        literal => NaiveDate::parse_from_str(literal, LABEL_FORMAT).map_err(|e| {
            ExportError::ConfigError(format!("invalid date '{}': {}", expr, e))
        }),
    }
}

/// Lazy, ordered, contiguous sequence of windows over an inclusive range.
#[derive(Debug, Clone)]
pub struct DateWindows {
    start: NaiveDate,
    end: NaiveDate,
    interval: Interval,
    step: u32,
}

impl DateWindows {
    pub fn new(start: NaiveDate, end: NaiveDate, interval: Interval) -> Self {
        Self {
            start,
            end,
            interval,
            step: 0,
        }
    }

    /// Builds the sweep from the raw config strings.
    pub fn from_exprs(start: &str, end: &str, interval: &str, today: NaiveDate) -> Result<Self> {
        Ok(Self::new(
            parse_date_expr(start, today)?,
            parse_date_expr(end, today)?,
            interval.parse()?,
        ))
    }
}

impl Iterator for DateWindows {
    type Item = DateWindow;

    fn next(&mut self) -> Option<DateWindow> {
        let window_start = self.interval.advance(self.start, self.step)?;
        if window_start > self.end {
            return None;
        }

        let window_end = self
            .interval
            .advance(self.start, self.step + 1)
            .and_then(|next| next.pred_opt())
            .map_or(self.end, |last| last.min(self.end));
        self.step += 1;

        Some(DateWindow {
            label: window_start.format(LABEL_FORMAT).to_string(),
            start: window_start,
            end: window_end,
        })
    }
}
