// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Roadmap timeline: month ticks, an axis, one track per lane and a legend.

use crate::model::Workspace;
use crate::query::roadmap::{bar_columns, month_ticks, roadmap_rows, RoadmapWindow};

use super::text::{text_len, truncate_with_ellipsis};
use super::{Canvas, RenderError};

pub const MIN_ROADMAP_WIDTH: usize = 10;
/// Bar columns are computed as `u16` terminal cells.
pub const MAX_ROADMAP_WIDTH: usize = u16::MAX as usize;

const BAR_FILL: char = '═';

/// Renders research projects overlapping `window` as bars on a track `width` cells wide.
pub fn render_roadmap_text(
    workspace: &Workspace,
    window: &RoadmapWindow,
    width: usize,
) -> Result<String, RenderError> {
    if width < MIN_ROADMAP_WIDTH {
        return Err(RenderError::TooNarrow { width, minimum: MIN_ROADMAP_WIDTH });
    }
    if width > MAX_ROADMAP_WIDTH {
        return Err(RenderError::TooWide { width, maximum: MAX_ROADMAP_WIDTH });
    }

    let rows = roadmap_rows(workspace, window);
    let lane_count = rows.iter().map(|row| row.lane + 1).max().unwrap_or(0);
    let mut canvas = Canvas::new(width, 2 + lane_count)?;

    let days = i64::from(window.days());
    let mut label_end = 0usize;
    for tick in month_ticks(window) {
        let col = usize::try_from(tick.offset_days * width as i64 / days).unwrap_or(0);
        if col < label_end {
            continue;
        }
        canvas.write_str(col, 0, &tick.label)?;
        label_end = col + text_len(&tick.label) + 1;
    }
    canvas.draw_hline(0, width - 1, 1)?;

    for row in &rows {
        let (col, len) = bar_columns(&row.placement, width as u16);
        let (col, len) = (usize::from(col), usize::from(len));
        let y = 2 + row.lane;
        if len == 1 {
            canvas.set(col, y, '■')?;
            continue;
        }

        for x in col..col + len {
            canvas.set(x, y, BAR_FILL)?;
        }
        canvas.set(col, y, if row.placement.clipped_start { '◀' } else { '[' })?;
        canvas.set(col + len - 1, y, if row.placement.clipped_end { '▶' } else { ']' })?;
        if len > 2 {
            canvas.write_str(col + 1, y, &truncate_with_ellipsis(&row.research.name, len - 2))?;
        }
    }

    let mut out = format!(
        "Roadmap {} .. {} ({} days)\n",
        window.start().format("%Y-%m-%d"),
        window.end().format("%Y-%m-%d"),
        window.days()
    );
    out.push_str(&canvas.to_trimmed_string());
    out.push('\n');

    if rows.is_empty() {
        out.push_str("(no research in this window)\n");
        return Ok(out);
    }

    out.push('\n');
    for row in &rows {
        let research = row.research;
        out.push_str(&format!(
            "{}  lane {}  {} .. {}  {}  {}\n",
            research.research_id,
            row.lane + 1,
            research.start_date.format("%Y-%m-%d"),
            research.end_date.format("%Y-%m-%d"),
            research.status.as_str(),
            research.name
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::demo_workspace;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn overlapping_projects_use_separate_lanes() {
        let workspace = demo_workspace();
        let window = RoadmapWindow::new(d(2026, 1, 1), 90);
        let text = render_roadmap_text(&workspace, &window, 90).expect("render");
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "Roadmap 2026-01-01 .. 2026-03-31 (90 days)");
        assert!(lines[1].starts_with("Jan 2026"));
        assert!(lines[2].chars().all(|ch| ch == '─'));
        assert_eq!(lines[3].chars().nth(11), Some('['));
        assert!(lines[3].contains("Procurement discovery"));
        assert_eq!(lines[4].chars().nth(32), Some('['));
        assert!(lines[4].contains("Onboarding usability"));
        assert!(!text.contains("Pricing page test"));
        assert!(text.contains("r:2  lane 2  2026-02-02 .. 2026-02-27  planned  Onboarding usability"));
    }

    #[test]
    fn clipped_bars_show_arrows() {
        let workspace = demo_workspace();
        let window = RoadmapWindow::new(d(2026, 2, 1), 30);
        let text = render_roadmap_text(&workspace, &window, 30).expect("render");
        let lane = text.lines().nth(3).expect("first lane");
        assert!(lane.starts_with('◀'));
        assert!(lane.ends_with('▶'));
    }

    #[test]
    fn empty_window_says_so() {
        let workspace = demo_workspace();
        let window = RoadmapWindow::new(d(2030, 1, 1), 30);
        let text = render_roadmap_text(&workspace, &window, 40).expect("render");
        assert!(text.contains("(no research in this window)"));
    }

    #[test]
    fn rejects_narrow_tracks() {
        let workspace = demo_workspace();
        let window = RoadmapWindow::new(d(2026, 1, 1), 30);
        assert_eq!(
            render_roadmap_text(&workspace, &window, 4).unwrap_err(),
            RenderError::TooNarrow { width: 4, minimum: MIN_ROADMAP_WIDTH }
        );
    }

    #[test]
    fn rejects_tracks_wider_than_a_terminal_can_address() {
        let workspace = demo_workspace();
        let window = RoadmapWindow::new(d(2026, 1, 1), 30);
        let width = MAX_ROADMAP_WIDTH + 1;
        assert_eq!(
            render_roadmap_text(&workspace, &window, width).unwrap_err(),
            RenderError::TooWide { width, maximum: MAX_ROADMAP_WIDTH }
        );
    }
}
