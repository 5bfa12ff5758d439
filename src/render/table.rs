// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::SortDirection;
use crate::query::table::{column, RowView, TablePage, ViewState};

use super::text::{fit, text_len};

const MAX_COLUMN_WIDTH: usize = 28;
const COLUMN_GAP: &str = "  ";

/// Header label with a sort arrow when the column is part of the sort.
pub(crate) fn header_label(view: &ViewState, key: &str) -> String {
    let label = column(view.table, key).map_or(key, |def| def.label);
    match view.sort.iter().find(|spec| spec.column == key) {
        Some(spec) if spec.direction == SortDirection::Asc => format!("{label} ▲"),
        Some(_) => format!("{label} ▼"),
        None => label.to_owned(),
    }
}

/// Fixed-width text table of the view's visible columns, with a paging footer.
pub fn render_table_page(view: &ViewState, page: &TablePage<RowView>) -> String {
    let keys = view.visible_columns();
    let headers = keys.iter().map(|key| header_label(view, key)).collect::<Vec<_>>();
    let cells = page
        .rows
        .iter()
        .map(|row| {
            keys.iter()
                .map(|key| row.cell(view.table, key).map(|cell| cell.display()).unwrap_or_default())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let widths = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            cells
                .iter()
                .map(|row| text_len(&row[idx]))
                .chain(std::iter::once(text_len(header)))
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect::<Vec<_>>();

    let mut out = String::new();
    push_row(&mut out, &headers, &widths);
    let rule_len = widths.iter().sum::<usize>() + COLUMN_GAP.len() * widths.len().saturating_sub(1);
    out.push_str(&"─".repeat(rule_len));
    out.push('\n');

    if cells.is_empty() {
        out.push_str("(no rows)\n");
    }
    for row in &cells {
        push_row(&mut out, row, &widths);
    }

    out.push_str(&format!(
        "page {}/{} · {} row{}\n",
        page.page + 1,
        page.page_count,
        page.total,
        if page.total == 1 { "" } else { "s" }
    ));
    out
}

fn push_row(out: &mut String, values: &[String], widths: &[usize]) {
    let line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| fit(value, *width))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{demo_workspace, SortSpec, TableKind};
    use crate::query::table::{query_workspace_table, TableQuery};

    #[test]
    fn renders_visible_columns_in_order_with_sort_arrow() {
        let workspace = demo_workspace();
        let mut view = ViewState::default_for(TableKind::Meetings, 25);
        view.sort = vec![SortSpec::asc("date")];
        let page = query_workspace_table(
            &workspace,
            TableKind::Meetings,
            &view.query(Vec::new(), None, 0),
        )
        .expect("query");
        let text = render_table_page(&view, &page);
        let lines = text.lines().collect::<Vec<_>>();

        assert!(lines[0].starts_with("Title"));
        assert!(lines[0].contains("Date ▲"));
        assert!(!lines[0].contains("Notes"));
        assert!(lines[1].starts_with('─'));
        assert!(lines[2].starts_with("Buyer interview #1"));
        assert_eq!(lines.last(), Some(&"page 1/1 · 5 rows"));
    }

    #[test]
    fn empty_page_says_so() {
        let workspace = demo_workspace();
        let view = ViewState::default_for(TableKind::Research, 25);
        let query = TableQuery { search: Some("no such project".to_owned()), ..TableQuery::default() };
        let page = query_workspace_table(&workspace, TableKind::Research, &query).expect("query");
        let text = render_table_page(&view, &page);
        assert!(text.contains("(no rows)"));
        assert!(text.ends_with("page 1/1 · 0 rows\n"));
    }

    #[test]
    fn hidden_columns_are_skipped() {
        let mut view = ViewState::default_for(TableKind::Jtbd, 25);
        view.toggle_column("tags").expect("toggle");
        assert_eq!(header_label(&view, "tags"), "Tags");
        let workspace = demo_workspace();
        let page = query_workspace_table(&workspace, TableKind::Jtbd, &view.query(Vec::new(), None, 0))
            .expect("query");
        assert!(!render_table_page(&view, &page).lines().next().unwrap_or_default().contains("Tags"));
    }
}
