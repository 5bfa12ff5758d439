// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Month grid for the calendar view.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::QueryError;
use crate::model::{MeetingId, Workspace};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            Self::Monday => Weekday::Mon,
            Self::Sunday => Weekday::Sun,
        }
    }

    /// Short day labels in display order.
    pub fn labels(self) -> [&'static str; 7] {
        match self {
            Self::Monday => ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"],
            Self::Sunday => ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub meetings: SmallVec<[MeetingId; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub week_start: WeekStart,
    /// Whole weeks covering the month, 7 days each.
    pub weeks: Vec<Vec<CalendarDay>>,
}

impl MonthGrid {
    pub fn title(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|first| first.format("%B %Y").to_string())
            .unwrap_or_default()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.weeks.iter().flatten().find(|day| day.date == date)
    }
}

/// Builds the grid for `year-month` with meetings bucketed per day (ordered by id).
pub fn month_grid(
    workspace: &Workspace,
    year: i32,
    month: u32,
    week_start: WeekStart,
) -> Result<MonthGrid, QueryError> {
    let invalid = || QueryError::InvalidMonth { year, month };
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let (next_year, next_month) = shift_month(year, month, 1);
    let next_first = NaiveDate::from_ymd_opt(next_year, next_month, 1).ok_or_else(invalid)?;

    let lead = u64::from(
        (first.weekday().num_days_from_monday() + 7 - week_start.weekday().num_days_from_monday()) % 7,
    );
    let mut cursor = first.checked_sub_days(Days::new(lead)).ok_or_else(invalid)?;

    let mut weeks = Vec::new();
    while cursor < next_first {
        let mut week = Vec::with_capacity(7);
        for _ in 0..7 {
            let meetings = workspace
                .meetings()
                .values()
                .filter(|meeting| meeting.date == cursor)
                .map(|meeting| meeting.meeting_id.clone())
                .collect();
            week.push(CalendarDay { date: cursor, in_month: cursor.month() == month, meetings });
            cursor = cursor.checked_add_days(Days::new(1)).ok_or_else(invalid)?;
        }
        weeks.push(week);
    }

    Ok(MonthGrid { year, month, week_start, weeks })
}

/// `(year, month)` moved by `delta` months.
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}
