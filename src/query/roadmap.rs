// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Timeline math for the roadmap view.

use chrono::{Datelike, Days, NaiveDate};
use smallvec::SmallVec;

use crate::model::{Research, Workspace};

/// A contiguous window of whole days, `days >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoadmapWindow {
    start: NaiveDate,
    days: u32,
}

impl RoadmapWindow {
    pub fn new(start: NaiveDate, days: u32) -> Self {
        Self { start, days: days.max(1) }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// Last day inside the window (inclusive).
    pub fn end(&self) -> NaiveDate {
        self.start
            .checked_add_days(Days::new(u64::from(self.days - 1)))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end()
    }

    /// The same-sized window moved by `delta_days`.
    pub fn shifted(&self, delta_days: i64) -> Self {
        let start = if delta_days >= 0 {
            self.start.checked_add_days(Days::new(delta_days.unsigned_abs()))
        } else {
            self.start.checked_sub_days(Days::new(delta_days.unsigned_abs()))
        };
        Self { start: start.unwrap_or(self.start), days: self.days }
    }
}

/// Where a date range lands inside a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarPlacement {
    /// Days from window start to the first visible day.
    pub offset_days: i64,
    /// Visible days, at least 1.
    pub span_days: i64,
    pub start_fraction: f64,
    pub width_fraction: f64,
    pub clipped_start: bool,
    pub clipped_end: bool,
}

/// Places the inclusive range `start..=end` in `window`; `None` when it lies fully outside.
pub fn place_bar(window: &RoadmapWindow, start: NaiveDate, end: NaiveDate) -> Option<BarPlacement> {
    let (start, end) = if end < start { (end, start) } else { (start, end) };
    let window_end = window.end();
    if end < window.start || start > window_end {
        return None;
    }

    let visible_start = start.max(window.start);
    let visible_end = end.min(window_end);
    let offset_days = (visible_start - window.start).num_days();
    let span_days = (visible_end - visible_start).num_days() + 1;
    let total = f64::from(window.days);

    Some(BarPlacement {
        offset_days,
        span_days,
        start_fraction: offset_days as f64 / total,
        width_fraction: span_days as f64 / total,
        clipped_start: start < window.start,
        clipped_end: end > window_end,
    })
}

/// Terminal cells `(column, len)` covered by a bar in a track `width` cells wide.
///
/// Every visible bar gets at least one cell.
pub fn bar_columns(placement: &BarPlacement, width: u16) -> (u16, u16) {
    if width == 0 {
        return (0, 0);
    }
    let width_f = f64::from(width);
    let col = (placement.start_fraction * width_f).floor().clamp(0.0, width_f - 1.0) as u16;
    let end = ((placement.start_fraction + placement.width_fraction) * width_f)
        .ceil()
        .clamp(0.0, width_f) as u16;
    let len = end.saturating_sub(col).max(1);
    (col, len.min(width - col))
}

/// Greedy lane assignment: ranges are taken by start date and placed in the first lane whose
/// last range ended before this one begins. Returns the lane of each input range.
pub fn assign_lanes(ranges: &[(NaiveDate, NaiveDate)]) -> Vec<usize> {
    let mut order = (0..ranges.len()).collect::<Vec<_>>();
    order.sort_by_key(|&idx| (ranges[idx].0, ranges[idx].1, idx));

    let mut lane_ends: SmallVec<[NaiveDate; 8]> = SmallVec::new();
    let mut lanes = vec![0usize; ranges.len()];
    for idx in order {
        let (start, end) = ranges[idx];
        let free = lane_ends.iter().position(|lane_end| *lane_end < start);
        let lane = match free {
            Some(lane) => {
                lane_ends[lane] = end;
                lane
            }
            None => {
                lane_ends.push(end);
                lane_ends.len() - 1
            }
        };
        lanes[idx] = lane;
    }
    lanes
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthTick {
    pub date: NaiveDate,
    pub offset_days: i64,
    pub label: String,
}

/// First day of each month that falls inside the window.
pub fn month_ticks(window: &RoadmapWindow) -> Vec<MonthTick> {
    let mut out = Vec::new();
    let mut cursor = if window.start.day() == 1 {
        Some(window.start)
    } else {
        first_of_next_month(window.start)
    };
    while let Some(date) = cursor {
        if !window.contains(date) {
            break;
        }
        out.push(MonthTick {
            date,
            offset_days: (date - window.start).num_days(),
            label: date.format("%b %Y").to_string(),
        });
        cursor = first_of_next_month(date);
    }
    out
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 { (date.year() + 1, 1) } else { (date.year(), date.month() + 1) };
    NaiveDate::from_ymd_opt(year, month, 1)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadmapRow<'a> {
    pub research: &'a Research,
    pub lane: usize,
    pub placement: BarPlacement,
}

/// Research projects visible in `window`, ordered by lane then start date.
pub fn roadmap_rows<'a>(workspace: &'a Workspace, window: &RoadmapWindow) -> Vec<RoadmapRow<'a>> {
    let visible = workspace
        .researches()
        .values()
        .filter_map(|research| {
            place_bar(window, research.start_date, research.end_date).map(|placement| (research, placement))
        })
        .collect::<Vec<_>>();
    let ranges = visible
        .iter()
        .map(|(research, _)| (research.start_date, research.end_date))
        .collect::<Vec<_>>();
    let lanes = assign_lanes(&ranges);

    let mut rows = visible
        .into_iter()
        .zip(lanes)
        .map(|((research, placement), lane)| RoadmapRow { research, lane, placement })
        .collect::<Vec<_>>();
    rows.sort_by_key(|row| (row.lane, row.research.start_date, row.research.research_id.clone()));
    rows
}
