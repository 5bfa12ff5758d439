// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Layout, title, footer, help, and style helpers used by TUI rendering.
fn stack_inspector_below(area: Rect) -> bool {
    area.width < 100
}

fn view_title(label: &str, tail: Option<&str>) -> String {
    let mut title = format!("─ {label}");
    if let Some(tail) = tail {
        let tail = tail.trim();
        if !tail.is_empty() {
            title.push_str(" · ");
            title.push_str(tail);
        }
    }
    title.push(' ');
    title
}

fn table_view_title(app: &App, table: TableKind, page: &TablePage<RowView>) -> String {
    let mut tail = format!(
        "page {}/{} · {} row{}",
        page.page + 1,
        page.page_count,
        page.total,
        if page.total == 1 { "" } else { "s" }
    );
    if let Some(filter) = app.active_filter(table) {
        tail.push_str(&format!(" · filter: {}", filter.name));
    }
    if let Some(query) = app.searches.get(&table).filter(|query| !query.is_empty()) {
        tail.push_str(&format!(" · /{query}"));
    }
    view_title(app.tab.title(), Some(&tail))
}

/// Display widths of the visible columns, capped so one long cell cannot starve the rest.
fn column_widths(headers: &[String], rows: &[Vec<String>]) -> Vec<u16> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let width = rows
                .iter()
                .filter_map(|row| row.get(idx))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH);
            u16::try_from(width).unwrap_or(u16::MAX)
        })
        .collect()
}

fn tab_titles() -> Vec<Line<'static>> {
    Tab::ALL.iter().map(|tab| Line::from(tab.title())).collect()
}

fn footer_line(app: &App, toast_suffix: &str) -> Line<'static> {
    let mut spans = Vec::<Span<'static>>::new();
    push_footer_entry(&mut spans, "TAB", "⇥/⇤");
    match app.tab {
        Tab::Research | Tab::Meetings | Tab::Jtbd => {
            push_footer_entry(&mut spans, "ROW", "↑↓");
            push_footer_entry(&mut spans, "PAGE", "n/p");
            push_footer_entry(&mut spans, "COLUMN", "1-9");
            push_footer_entry(&mut spans, "SORT", "←→ s");
            push_footer_entry(&mut spans, "SEARCH", "/");
            push_footer_entry(&mut spans, "FILTER", "f");
            push_footer_entry(&mut spans, "NEW", "a");
            push_footer_entry(&mut spans, "EDIT", "e");
        }
        Tab::Roadmap => {
            push_footer_entry(&mut spans, "SCROLL", "←→");
            push_footer_entry(&mut spans, "ZOOM", "+/-");
        }
        Tab::Calendar => {
            push_footer_entry(&mut spans, "MONTH", "←→");
        }
    }
    push_footer_entry(&mut spans, "HELP", "?");
    push_footer_entry(&mut spans, "QUIT", "q");
    push_toast(&mut spans, toast_suffix);
    Line::from(spans)
}

fn search_footer_line(app: &App, toast_suffix: &str) -> Line<'static> {
    let query = app.tab.table().and_then(|table| app.searches.get(&table)).cloned().unwrap_or_default();
    let mut spans = vec![
        Span::styled("/", Style::default().fg(FOOTER_KEY_COLOR).add_modifier(Modifier::BOLD)),
        Span::raw(query),
        Span::raw("   "),
    ];
    push_footer_entry_with_separator(&mut spans, "Accept", "Enter", " | ");
    push_footer_entry_with_separator(&mut spans, "Clear", "Esc", " | ");
    push_toast(&mut spans, toast_suffix);
    Line::from(spans)
}

fn form_footer_line(toast_suffix: &str) -> Line<'static> {
    let mut spans = Vec::<Span<'static>>::new();
    push_footer_entry(&mut spans, "FIELD", "⇥/⇤");
    push_footer_entry(&mut spans, "SAVE", "Enter");
    push_footer_entry(&mut spans, "CANCEL", "Esc");
    push_toast(&mut spans, toast_suffix);
    Line::from(spans)
}

fn push_toast(spans: &mut Vec<Span<'static>>, toast_suffix: &str) {
    let message = toast_suffix.strip_prefix(" | ").unwrap_or(toast_suffix).trim();
    if message.is_empty() {
        return;
    }
    spans.push(Span::styled(" | ", Style::default().fg(FOOTER_LABEL_COLOR)));
    spans.push(Span::raw(message.to_owned()));
}

fn push_footer_entry(spans: &mut Vec<Span<'static>>, label: &str, value: &str) {
    push_footer_entry_with_separator(spans, label, value, " | ");
}

fn push_footer_entry_with_separator(
    spans: &mut Vec<Span<'static>>,
    label: &str,
    value: &str,
    separator: &'static str,
) {
    if !spans.is_empty() {
        spans.push(Span::styled(separator.to_owned(), Style::default().fg(FOOTER_LABEL_COLOR)));
    }
    spans.push(Span::styled(
        format!("{}:", footer_label_ucfirst(label)),
        Style::default().fg(FOOTER_LABEL_COLOR),
    ));
    spans.push(Span::styled(
        value.to_owned(),
        Style::default().fg(FOOTER_KEY_COLOR).add_modifier(Modifier::BOLD),
    ));
}

fn footer_label_ucfirst(label: &str) -> String {
    let lower = label.to_lowercase();
    let mut chars = lower.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut out = first.to_uppercase().collect::<String>();
    out.push_str(chars.as_str());
    out
}

fn help_key_style() -> Style {
    Style::default().fg(FOOTER_KEY_COLOR).add_modifier(Modifier::BOLD)
}

fn help_header_style() -> Style {
    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
}

fn help_kv(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{key:>12}"), help_key_style()),
        Span::raw("  "),
        Span::raw(desc.to_owned()),
    ])
}

fn help_lines() -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled("Everywhere", help_header_style())),
        help_kv("Tab / S-Tab", "next / previous tab"),
        help_kv("i", "toggle the inspector"),
        help_kv("?", "toggle this help"),
        help_kv("q / Ctrl-C", "quit"),
        Line::from(""),
        Line::from(Span::styled("Tables", help_header_style())),
        help_kv("↑↓ / j k", "select row"),
        help_kv("n p / PgDn PgUp", "next / previous page"),
        help_kv("1-9", "show or hide the n-th column"),
        help_kv("←→ / h l", "move the sort cursor"),
        help_kv("s", "cycle sort on the cursor column"),
        help_kv("< >", "move the cursor column left / right"),
        help_kv("/", "search; Esc clears"),
        help_kv("f", "cycle saved filters"),
        help_kv("r", "reset the view"),
        help_kv("a / e", "new record / edit the selected record"),
        Line::from(""),
        Line::from(Span::styled("Roadmap", help_header_style())),
        help_kv("←→ / h l", "scroll by a week"),
        help_kv("PgUp PgDn", "scroll by a window"),
        help_kv("+ -", "zoom in / out"),
        Line::from(""),
        Line::from(Span::styled("Calendar", help_header_style())),
        help_kv("←→ / h l", "previous / next month"),
        Line::from(""),
        Line::from(Span::styled("Forms", help_header_style())),
        help_kv("Tab / S-Tab", "next / previous field"),
        help_kv("Enter", "save"),
        help_kv("Esc", "cancel"),
    ]
}

fn centered_rect(width_percent: u16, height_percent: u16, area: Rect) -> Rect {
    let vertical_margin = (100u16.saturating_sub(height_percent)) / 2;
    let horizontal_margin = (100u16.saturating_sub(width_percent)) / 2;

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(vertical_margin),
            Constraint::Percentage(height_percent),
            Constraint::Percentage(vertical_margin),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(horizontal_margin),
            Constraint::Percentage(width_percent),
            Constraint::Percentage(horizontal_margin),
        ])
        .split(vertical[1])[1]
}

/// Form overlay: one line per field, then the last submit error.
fn render_form(frame: &mut Frame<'_>, form: &RecordForm, main_area: Rect) {
    let area = centered_rect(60, 60, main_area);
    let label_width = form.fields.iter().map(|field| field.label.chars().count()).max().unwrap_or(0);

    let mut lines = form
        .fields
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let style = if idx == form.focus {
                Style::default().fg(FOCUS_COLOR).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(FOOTER_LABEL_COLOR)
            };
            let marker = if field.required { '*' } else { ' ' };
            Line::from(vec![
                Span::styled(format!("{:>label_width$}{marker} ", field.label), style),
                Span::raw(field.value.clone()),
            ])
        })
        .collect::<Vec<_>>();
    if let Some(error) = form.error.as_ref() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
    }

    let widget = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(FOCUS_COLOR))
            .title(view_title(&form.title(), Some("* required"))),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(widget, area);

    let offset = label_width + 2 + form.focused_value().chars().count();
    let x = area.x.saturating_add(1).saturating_add(u16::try_from(offset).unwrap_or(u16::MAX));
    let y = area.y.saturating_add(1).saturating_add(u16::try_from(form.focus).unwrap_or(u16::MAX));
    frame.set_cursor(
        x.min(area.right().saturating_sub(2)),
        y.min(area.bottom().saturating_sub(2)),
    );
}

fn render_help(frame: &mut Frame<'_>, main_area: Rect) {
    let area = centered_rect(70, 80, main_area);
    let help = Paragraph::new(Text::from(help_lines())).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(FOCUS_COLOR))
            .title(view_title("Help", Some("Esc closes"))),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(help, area);
}
