// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::Workspace;
use crate::query::calendar::MonthGrid;

use super::text::truncate_with_ellipsis;
use super::{Canvas, RenderError};

const CELL_WIDTH: usize = 10;
const ROWS_PER_WEEK: usize = 3;

/// Boxed month grid followed by the month's meetings in date order.
pub fn render_calendar_text(workspace: &Workspace, grid: &MonthGrid) -> Result<String, RenderError> {
    let width = 7 * (CELL_WIDTH + 1) + 1;
    let height = grid.weeks.len() * ROWS_PER_WEEK + 1;
    let mut canvas = Canvas::new(width, height)?;

    for week in 0..=grid.weeks.len() {
        canvas.draw_hline(0, width - 1, week * ROWS_PER_WEEK)?;
    }
    for col in 0..=7 {
        canvas.draw_vline(col * (CELL_WIDTH + 1), 0, height - 1)?;
    }

    let mut listed = Vec::new();
    for (week_idx, week) in grid.weeks.iter().enumerate() {
        let y = week_idx * ROWS_PER_WEEK + 1;
        for (col, day) in week.iter().enumerate() {
            if !day.in_month {
                continue;
            }
            let x = col * (CELL_WIDTH + 1) + 1;
            let marker = if day.meetings.is_empty() { "" } else { " •" };
            canvas.write_str(x, y, &format!("{:>2}{marker}", chrono::Datelike::day(&day.date)))?;

            let summary = match day.meetings.as_slice() {
                [] => None,
                [only] => workspace.meetings().get(only).map(|meeting| meeting.title.clone()),
                many => Some(format!("{} meetings", many.len())),
            };
            if let Some(summary) = summary {
                canvas.write_str(x, y + 1, &truncate_with_ellipsis(&summary, CELL_WIDTH))?;
            }
            listed.extend(day.meetings.iter().filter_map(|id| workspace.meetings().get(id)));
        }
    }

    let mut out = format!("{}\n", grid.title());
    let labels = grid.week_start.labels();
    let mut header = String::new();
    for label in labels {
        header.push_str(&format!(" {label:<width$}", width = CELL_WIDTH));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&canvas.to_trimmed_string());
    out.push('\n');

    if !listed.is_empty() {
        out.push('\n');
        for meeting in listed {
            out.push_str(&format!(
                "{}  {}  {} ({})\n",
                meeting.date.format("%Y-%m-%d"),
                meeting.meeting_id,
                meeting.title,
                meeting.status.as_str()
            ));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::demo_workspace;
    use crate::query::calendar::{month_grid, WeekStart};

    #[test]
    fn draws_boxed_grid_with_meetings() {
        let workspace = demo_workspace();
        let grid = month_grid(&workspace, 2026, 2, WeekStart::Monday).expect("grid");
        let text = render_calendar_text(&workspace, &grid).expect("render");
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "February 2026");
        assert!(lines[1].starts_with(" Mo"));
        assert!(lines[2].starts_with('┌'));
        assert!(lines[2].ends_with('┐'));
        assert!(lines[3].contains(" 1"));
        assert!(lines[6].contains(" 3 •"));
        assert!(lines[7].contains("Buyer int…"));
        assert!(lines[17].starts_with('└'));
        assert!(text.contains("2026-02-03  m:2  Buyer interview #2 (completed)"));
        assert!(!text.contains("m:1"));
    }

    #[test]
    fn sunday_start_shifts_labels() {
        let workspace = demo_workspace();
        let grid = month_grid(&workspace, 2026, 2, WeekStart::Sunday).expect("grid");
        let text = render_calendar_text(&workspace, &grid).expect("render");
        assert!(text.lines().nth(1).expect("labels").starts_with(" Su"));
    }
}
