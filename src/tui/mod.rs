// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! Tabbed ratatui shell over a workspace: three record tables driven by persisted view state, a
//! research roadmap and a meeting calendar, plus an inspector for the selected record. Table
//! records are created and edited through forms that submit revision-checked ops.

mod form;

use std::{
    collections::BTreeMap,
    error::Error,
    io,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
};
use smol_str::SmolStr;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{Config, MAX_ROADMAP_DAYS};
use crate::model::{FilterId, RecordKind, RecordRef, SavedFilter, TableKind, Workspace};
use crate::ops::apply_ops;
use crate::query::calendar::{month_grid, shift_month};
use crate::query::jtbd::{ancestors, children};
use crate::query::roadmap::RoadmapWindow;
use crate::query::table::{query_workspace_table, RowView, TablePage, ViewState};
use crate::query::QueryError;
use crate::render::table::header_label;
use crate::render::{render_calendar_text, render_roadmap_text, render_transcript};
use crate::store::{StoreError, WorkspaceFolder};
use crate::ui::{Tab, UiState};

use form::{FormMode, RecordForm};

const FOCUS_COLOR: Color = Color::LightGreen;
const INSPECTOR_COLOR: Color = Color::DarkGray;
const FOOTER_LABEL_COLOR: Color = Color::Gray;
const FOOTER_KEY_COLOR: Color = Color::Cyan;
const MAX_COLUMN_WIDTH: usize = 32;
const ROADMAP_STEP_DAYS: i64 = 7;
const MIN_ROADMAP_DAYS: u32 = 7;
const TABLE_TABS: [TableKind; 3] = [TableKind::Research, TableKind::Meetings, TableKind::Jtbd];

/// Runs the interactive terminal UI until the user quits.
///
/// With a `folder`, view state is loaded from and saved to it, and the workspace is reloaded from
/// it whenever `ui_state` reports an external mutation.
pub fn run(
    workspace: Workspace,
    folder: Option<WorkspaceFolder>,
    config: Config,
    ui_state: Option<Arc<Mutex<UiState>>>,
) -> Result<(), Box<dyn Error>> {
    let mut terminal = TerminalSession::new()?;
    let mut app = App::new(workspace, folder, config);
    if let Some(ui_state) = ui_state {
        app.attach_ui_state(ui_state);
    }

    while !app.should_quit {
        app.sync_from_ui_state();
        terminal.draw(|frame| draw(frame, &mut app))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
    }

    Ok(())
}

fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let toast_suffix = app.toast_suffix();
    let area = frame.size();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    let (tabs_area, main_area, footer_area) = (layout[0], layout[1], layout[2]);

    let selected_tab = Tab::ALL.iter().position(|tab| *tab == app.tab).unwrap_or(0);
    let tabs = Tabs::new(tab_titles())
        .select(selected_tab)
        .style(Style::default().fg(FOOTER_LABEL_COLOR))
        .highlight_style(Style::default().fg(FOCUS_COLOR).add_modifier(Modifier::BOLD))
        .divider("│");
    frame.render_widget(tabs, tabs_area);

    match app.tab {
        Tab::Research | Tab::Meetings | Tab::Jtbd => {
            if let Some(table) = app.tab.table() {
                draw_table_tab(frame, app, table, main_area);
            }
        }
        Tab::Roadmap => draw_roadmap(frame, app, main_area),
        Tab::Calendar => draw_calendar(frame, app, main_area),
    }

    if let Some(form) = app.form.as_ref() {
        render_form(frame, form, main_area);
        frame.render_widget(Paragraph::new(form_footer_line(&toast_suffix)), footer_area);
    } else if app.search_mode {
        frame.render_widget(Paragraph::new(search_footer_line(app, &toast_suffix)), footer_area);
        let query_len = app
            .tab
            .table()
            .and_then(|table| app.searches.get(&table))
            .map_or(0, |query| query.chars().count());
        let x = footer_area.x.saturating_add(1).saturating_add(u16::try_from(query_len).unwrap_or(u16::MAX));
        frame.set_cursor(x.min(footer_area.right().saturating_sub(1)), footer_area.y);
    } else {
        frame.render_widget(Paragraph::new(footer_line(app, &toast_suffix)), footer_area);
    }

    if app.show_help {
        render_help(frame, main_area);
    }
}

fn split_inspector(area: Rect, inspector_visible: bool) -> (Rect, Option<Rect>) {
    if !inspector_visible {
        return (area, None);
    }
    let direction = if stack_inspector_below(area) { Direction::Vertical } else { Direction::Horizontal };
    let panes = Layout::default()
        .direction(direction)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);
    (panes[0], Some(panes[1]))
}

fn draw_table_tab(frame: &mut Frame<'_>, app: &App, table: TableKind, area: Rect) {
    let (table_area, inspector_area) = split_inspector(area, app.inspector_visible);
    let block = Block::default().borders(Borders::ALL).border_style(Style::default().fg(FOCUS_COLOR));

    match app.table_page(table) {
        Ok(page) => {
            let view = app.effective_view(table);
            let keys = view.visible_columns();
            let cursor = app.sort_cursor(table);
            let headers = keys.iter().map(|key| header_label(&view, key)).collect::<Vec<_>>();
            let cells = page
                .rows
                .iter()
                .map(|row| {
                    keys.iter()
                        .map(|key| row.cell(table, key).map(|cell| cell.display()).unwrap_or_default())
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>();
            let widths = column_widths(&headers, &cells);

            let header = Row::new(headers.iter().enumerate().map(|(idx, label)| {
                let style = if idx == cursor {
                    Style::default().fg(FOCUS_COLOR).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                } else {
                    Style::default().add_modifier(Modifier::BOLD)
                };
                Cell::from(label.clone()).style(style)
            }));
            let rows = cells.into_iter().map(|row| Row::new(row.into_iter().map(Cell::from)));
            let widget = Table::new(rows, widths.into_iter().map(Constraint::Length))
                .header(header)
                .column_spacing(2)
                .highlight_style(Style::default().bg(INSPECTOR_COLOR).add_modifier(Modifier::BOLD))
                .block(block.title(table_view_title(app, table, &page)));

            let mut state = TableState::default();
            if !page.rows.is_empty() {
                state.select(Some(app.selected_row(table).min(page.rows.len() - 1)));
            }
            frame.render_stateful_widget(widget, table_area, &mut state);
        }
        Err(err) => {
            let message = Paragraph::new(format!("Cannot query {table}: {err}"))
                .wrap(Wrap { trim: false })
                .block(block.title(view_title(app.tab.title(), None)));
            frame.render_widget(message, table_area);
        }
    }

    if let Some(inspector_area) = inspector_area {
        let selected = app.selected_record().map(|record| record.to_string());
        let inspector = Paragraph::new(Text::from(app.inspector_lines()))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(INSPECTOR_COLOR))
                    .title(view_title("Inspector", selected.as_deref())),
            );
        frame.render_widget(Clear, inspector_area);
        frame.render_widget(inspector, inspector_area);
    }
}

fn draw_roadmap(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let window = app.roadmap_window;
    let tail = format!("{} → {} · {} days", window.start(), window.end(), window.days());
    let width = usize::from(area.width.saturating_sub(2));
    let body = render_roadmap_text(&app.workspace, &window, width)
        .unwrap_or_else(|err| format!("Roadmap unavailable: {err}"));
    let widget = Paragraph::new(body).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(FOCUS_COLOR))
            .title(view_title("Roadmap", Some(&tail))),
    );
    frame.render_widget(widget, area);
}

fn draw_calendar(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let (year, month) = app.calendar_month;
    let (title, body) = match month_grid(&app.workspace, year, month, app.config.week_start) {
        Ok(grid) => {
            let body = render_calendar_text(&app.workspace, &grid)
                .unwrap_or_else(|err| format!("Calendar unavailable: {err}"));
            (grid.title(), body)
        }
        Err(err) => (format!("{year}-{month:02}"), format!("Calendar unavailable: {err}")),
    };
    let widget = Paragraph::new(body).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(FOCUS_COLOR))
            .title(view_title("Calendar", Some(&title))),
    );
    frame.render_widget(widget, area);
}

struct Toast {
    message: String,
    expires_at: Instant,
}

struct App {
    workspace: Workspace,
    folder: Option<WorkspaceFolder>,
    config: Config,
    ui_state: Option<Arc<Mutex<UiState>>>,
    ui_state_workspace_rev: u64,
    tab: Tab,
    views: BTreeMap<TableKind, ViewState>,
    pages: BTreeMap<TableKind, usize>,
    selected_rows: BTreeMap<TableKind, usize>,
    sort_cursors: BTreeMap<TableKind, usize>,
    searches: BTreeMap<TableKind, String>,
    search_mode: bool,
    form: Option<RecordForm>,
    filters: BTreeMap<TableKind, FilterId>,
    roadmap_window: RoadmapWindow,
    calendar_month: (i32, u32),
    inspector_visible: bool,
    show_help: bool,
    toast: Option<Toast>,
    should_quit: bool,
}

impl App {
    fn new(workspace: Workspace, folder: Option<WorkspaceFolder>, config: Config) -> Self {
        let views = TABLE_TABS
            .iter()
            .map(|&table| {
                let view = match folder.as_ref() {
                    Some(folder) => folder.load_view_state(table, config.page_size),
                    None => ViewState::default_for(table, config.page_size),
                };
                (table, view)
            })
            .collect();
        let roadmap_window = RoadmapWindow::new(
            roadmap_start(&workspace),
            config.roadmap_days.clamp(1, MAX_ROADMAP_DAYS),
        );
        let calendar_month = calendar_start(&workspace);

        Self {
            workspace,
            folder,
            config,
            ui_state: None,
            ui_state_workspace_rev: 0,
            tab: Tab::default(),
            views,
            pages: BTreeMap::new(),
            selected_rows: BTreeMap::new(),
            sort_cursors: BTreeMap::new(),
            searches: BTreeMap::new(),
            search_mode: false,
            form: None,
            filters: BTreeMap::new(),
            roadmap_window,
            calendar_month,
            inspector_visible: true,
            show_help: false,
            toast: None,
            should_quit: false,
        }
    }

    fn attach_ui_state(&mut self, ui_state: Arc<Mutex<UiState>>) {
        self.ui_state_workspace_rev = ui_state.blocking_lock().workspace_rev();
        self.ui_state = Some(ui_state);
        self.publish_to_ui_state();
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.handle_key_code(key.code) {
            self.should_quit = true;
        }
    }

    /// Applies one key press. Returns `true` when the app should quit.
    fn handle_key_code(&mut self, code: KeyCode) -> bool {
        if self.form.is_some() {
            self.handle_form_key(code);
            return false;
        }
        if self.search_mode {
            self.handle_search_key(code);
            return false;
        }
        if self.show_help {
            if matches!(code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab => self.switch_tab(self.tab.next()),
            KeyCode::BackTab => self.switch_tab(self.tab.prev()),
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('i') => self.inspector_visible = !self.inspector_visible,
            _ => match self.tab {
                Tab::Roadmap => self.handle_roadmap_key(code),
                Tab::Calendar => self.handle_calendar_key(code),
                Tab::Research | Tab::Meetings | Tab::Jtbd => {
                    if let Some(table) = self.tab.table() {
                        self.handle_table_key(table, code);
                    }
                }
            },
        }
        false
    }

    fn handle_table_key(&mut self, table: TableKind, code: KeyCode) {
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(table, 1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(table, -1),
            KeyCode::Char('n') | KeyCode::PageDown => self.turn_page(table, 1),
            KeyCode::Char('p') | KeyCode::PageUp => self.turn_page(table, -1),
            KeyCode::Char(ch @ '1'..='9') => {
                if let Some(digit) = ch.to_digit(10) {
                    self.toggle_column_at(table, digit as usize - 1);
                }
            }
            KeyCode::Left | KeyCode::Char('h') => self.move_sort_cursor(table, -1),
            KeyCode::Right | KeyCode::Char('l') => self.move_sort_cursor(table, 1),
            KeyCode::Char('s') => self.cycle_sort_at_cursor(table),
            KeyCode::Char('<') => self.shift_cursor_column(table, -1),
            KeyCode::Char('>') => self.shift_cursor_column(table, 1),
            KeyCode::Char('r') => self.reset_view(table),
            KeyCode::Char('f') => self.cycle_filter(table),
            KeyCode::Char('a') => {
                self.form = RecordForm::create(table, chrono::Local::now().date_naive());
            }
            KeyCode::Char('e') => self.open_edit_form(table),
            KeyCode::Char('/') => {
                self.search_mode = true;
                self.searches.entry(table).or_default();
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, code: KeyCode) {
        let Some(table) = self.tab.table() else {
            self.search_mode = false;
            return;
        };
        match code {
            KeyCode::Enter => {
                self.search_mode = false;
                return;
            }
            KeyCode::Esc => {
                self.search_mode = false;
                self.searches.remove(&table);
            }
            KeyCode::Backspace => {
                self.searches.entry(table).or_default().pop();
            }
            KeyCode::Char(ch) => self.searches.entry(table).or_default().push(ch),
            _ => return,
        }
        self.pages.insert(table, 0);
        self.selected_rows.insert(table, 0);
        self.publish_to_ui_state();
    }

    fn handle_form_key(&mut self, code: KeyCode) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => self.form = None,
            KeyCode::Enter => self.submit_form(),
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Backspace => form.pop_char(),
            KeyCode::Char(ch) => form.push_char(ch),
            _ => {}
        }
    }

    fn open_edit_form(&mut self, table: TableKind) {
        let Some(record) = self.selected_record() else {
            self.set_toast("No record selected");
            return;
        };
        self.form = RecordForm::edit(table, &self.workspace, &record);
    }

    /// Applies the form as one op against the current revision and persists the result. On
    /// failure the form stays open with the error.
    fn submit_form(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let op = match form.to_op(&self.workspace) {
            Ok(op) => op,
            Err(err) => return self.set_form_error(err.to_string()),
        };
        let created = matches!(form.mode, FormMode::Create);

        let mut candidate = self.workspace.clone();
        let base_rev = candidate.rev();
        let result = match apply_ops(&mut candidate, base_rev, std::slice::from_ref(&op)) {
            Ok(result) => result,
            Err(err) => return self.set_form_error(err.to_string()),
        };
        if let Some(folder) = self.folder.as_ref() {
            if let Err(err) = folder.save_workspace(&candidate) {
                warn!(error = %err, "cannot save workspace");
                return self.set_form_error(format!("Cannot save: {err}"));
            }
        }

        let record = result.delta.added.first().or_else(|| result.delta.updated.first()).cloned();
        self.workspace = candidate;
        self.form = None;
        if let Some(ui_state) = self.ui_state.as_ref() {
            let mut ui_state = ui_state.blocking_lock();
            ui_state.bump_workspace_rev();
            self.ui_state_workspace_rev = ui_state.workspace_rev();
        }

        let record = record.map(|record| record.to_string()).unwrap_or_default();
        info!(record = %record, rev = self.workspace.rev(), created, "saved record from form");
        self.set_toast(if created { format!("Created {record}") } else { format!("Saved {record}") });
        self.publish_to_ui_state();
    }

    fn set_form_error(&mut self, message: String) {
        if let Some(form) = self.form.as_mut() {
            form.error = Some(message);
        }
    }

    fn handle_roadmap_key(&mut self, code: KeyCode) {
        let window = self.roadmap_window;
        let days = i64::from(window.days());
        self.roadmap_window = match code {
            KeyCode::Left | KeyCode::Char('h') => window.shifted(-ROADMAP_STEP_DAYS),
            KeyCode::Right | KeyCode::Char('l') => window.shifted(ROADMAP_STEP_DAYS),
            KeyCode::PageUp => window.shifted(-days),
            KeyCode::PageDown => window.shifted(days),
            KeyCode::Char('+') => {
                RoadmapWindow::new(window.start(), (window.days() / 2).max(MIN_ROADMAP_DAYS))
            }
            KeyCode::Char('-') => {
                RoadmapWindow::new(window.start(), window.days().saturating_mul(2).min(MAX_ROADMAP_DAYS))
            }
            _ => return,
        };
        if self.roadmap_window.days() != window.days() {
            self.set_toast(format!("Roadmap shows {} days", self.roadmap_window.days()));
        }
    }

    fn handle_calendar_key(&mut self, code: KeyCode) {
        let (year, month) = self.calendar_month;
        self.calendar_month = match code {
            KeyCode::Left | KeyCode::Char('h') => shift_month(year, month, -1),
            KeyCode::Right | KeyCode::Char('l') => shift_month(year, month, 1),
            _ => return,
        };
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.search_mode = false;
        self.publish_to_ui_state();
    }

    fn effective_view(&self, table: TableKind) -> ViewState {
        let mut view = self
            .views
            .get(&table)
            .cloned()
            .unwrap_or_else(|| ViewState::default_for(table, self.config.page_size));
        if let Some(filter) = self.active_filter(table).filter(|filter| !filter.sort.is_empty()) {
            view.sort = filter.sort.clone();
        }
        view
    }

    fn view_mut(&mut self, table: TableKind) -> &mut ViewState {
        let page_size = self.config.page_size;
        self.views.entry(table).or_insert_with(|| ViewState::default_for(table, page_size))
    }

    fn active_filter(&self, table: TableKind) -> Option<&SavedFilter> {
        let filter_id = self.filters.get(&table)?;
        self.workspace.filters().get(filter_id)
    }

    fn table_page(&self, table: TableKind) -> Result<TablePage<RowView>, QueryError> {
        let view = self.effective_view(table);
        let conditions = self.active_filter(table).map(|filter| filter.conditions.clone()).unwrap_or_default();
        let search = self.searches.get(&table).filter(|query| !query.trim().is_empty()).cloned();
        let page = self.pages.get(&table).copied().unwrap_or(0);
        query_workspace_table(&self.workspace, table, &view.query(conditions, search, page))
    }

    fn selected_row(&self, table: TableKind) -> usize {
        self.selected_rows.get(&table).copied().unwrap_or(0)
    }

    fn sort_cursor(&self, table: TableKind) -> usize {
        let visible = self.views.get(&table).map_or(0, |view| view.visible_columns().len());
        self.sort_cursors.get(&table).copied().unwrap_or(0).min(visible.saturating_sub(1))
    }

    fn cursor_column(&self, table: TableKind) -> Option<SmolStr> {
        let view = self.views.get(&table)?;
        view.visible_columns().get(self.sort_cursor(table)).map(|key| SmolStr::new(key))
    }

    fn selected_record(&self) -> Option<RecordRef> {
        let table = self.tab.table()?;
        let page = self.table_page(table).ok()?;
        let row = page.rows.get(self.selected_row(table).min(page.rows.len().checked_sub(1)?))?;
        RecordRef::parse(&row.record).ok()
    }

    fn move_selection(&mut self, table: TableKind, delta: i64) {
        let rows = self.table_page(table).map_or(0, |page| page.rows.len());
        let last = i64::try_from(rows.saturating_sub(1)).unwrap_or(i64::MAX);
        let current = i64::try_from(self.selected_row(table)).unwrap_or(0);
        let next = (current + delta).clamp(0, last);
        self.selected_rows.insert(table, usize::try_from(next).unwrap_or(0));
        self.publish_to_ui_state();
    }

    fn turn_page(&mut self, table: TableKind, delta: i64) {
        let (current, page_count) = match self.table_page(table) {
            Ok(page) => (page.page, page.page_count),
            Err(err) => {
                self.set_toast(err.to_string());
                return;
            }
        };
        let last = i64::try_from(page_count.saturating_sub(1)).unwrap_or(i64::MAX);
        let next = (i64::try_from(current).unwrap_or(0) + delta).clamp(0, last);
        let next = usize::try_from(next).unwrap_or(0);
        if next == current {
            self.set_toast(if delta < 0 { "First page" } else { "Last page" });
            return;
        }
        self.pages.insert(table, next);
        self.selected_rows.insert(table, 0);
        self.publish_to_ui_state();
    }

    fn toggle_column_at(&mut self, table: TableKind, index: usize) {
        let Some(key) = self.views.get(&table).and_then(|view| view.columns.get(index)).map(|column| column.key.clone())
        else {
            self.set_toast(format!("No column {}", index + 1));
            return;
        };
        match self.view_mut(table).toggle_column(&key) {
            Ok(visible) => {
                let label = header_label(&self.effective_view(table), &key);
                self.set_toast(format!("{label} {}", if visible { "shown" } else { "hidden" }));
                self.persist_view(table);
            }
            Err(err) => self.set_toast(err.to_string()),
        }
    }

    fn move_sort_cursor(&mut self, table: TableKind, delta: i64) {
        let visible = self.views.get(&table).map_or(0, |view| view.visible_columns().len());
        let last = i64::try_from(visible.saturating_sub(1)).unwrap_or(i64::MAX);
        let current = i64::try_from(self.sort_cursor(table)).unwrap_or(0);
        let next = (current + delta).clamp(0, last);
        self.sort_cursors.insert(table, usize::try_from(next).unwrap_or(0));
    }

    fn cycle_sort_at_cursor(&mut self, table: TableKind) {
        if let Some(filter) = self.active_filter(table).filter(|filter| !filter.sort.is_empty()) {
            let message = format!("Sorted by filter '{}'; press f to clear it", filter.name);
            self.set_toast(message);
            return;
        }
        let Some(key) = self.cursor_column(table) else {
            return;
        };
        match self.view_mut(table).cycle_sort(&key) {
            Ok(()) => {
                self.pages.insert(table, 0);
                self.persist_view(table);
            }
            Err(err) => self.set_toast(err.to_string()),
        }
    }

    /// Swaps the cursor column with its visible neighbour.
    fn shift_cursor_column(&mut self, table: TableKind, delta: i64) {
        let Some(key) = self.cursor_column(table) else {
            return;
        };
        let Some(view) = self.views.get(&table) else {
            return;
        };
        let visible = view.visible_columns();
        let cursor = self.sort_cursor(table);
        let neighbour = if delta < 0 { cursor.checked_sub(1) } else { Some(cursor + 1) };
        let Some(neighbour_key) = neighbour.and_then(|idx| visible.get(idx)).map(|key| SmolStr::new(key)) else {
            self.set_toast("Column is already at the edge");
            return;
        };
        let Some(target) = view.columns.iter().position(|column| column.key == neighbour_key) else {
            return;
        };

        match self.view_mut(table).move_column(&key, target) {
            Ok(()) => {
                let next_cursor = if delta < 0 { cursor - 1 } else { cursor + 1 };
                self.sort_cursors.insert(table, next_cursor);
                self.persist_view(table);
            }
            Err(err) => self.set_toast(err.to_string()),
        }
    }

    fn reset_view(&mut self, table: TableKind) {
        self.view_mut(table).reset();
        self.pages.insert(table, 0);
        self.selected_rows.insert(table, 0);
        self.sort_cursors.insert(table, 0);
        self.persist_view(table);
        self.set_toast("View reset");
        self.publish_to_ui_state();
    }

    /// Steps through the table's saved filters, then back to unfiltered.
    fn cycle_filter(&mut self, table: TableKind) {
        let candidates = self
            .workspace
            .filters()
            .values()
            .filter(|filter| filter.table == table)
            .map(|filter| filter.filter_id.clone())
            .collect::<Vec<_>>();
        if candidates.is_empty() {
            self.set_toast(format!("No saved filters for {table}"));
            return;
        }

        let next = match self.filters.get(&table) {
            None => candidates.first().cloned(),
            Some(current) => candidates
                .iter()
                .position(|filter_id| filter_id == current)
                .and_then(|idx| candidates.get(idx + 1))
                .cloned(),
        };
        match next {
            Some(filter_id) => {
                self.filters.insert(table, filter_id);
            }
            None => {
                self.filters.remove(&table);
            }
        }
        self.pages.insert(table, 0);
        self.selected_rows.insert(table, 0);

        let message = match self.active_filter(table) {
            Some(filter) => format!("Filter: {}", filter.name),
            None => "Filter cleared".to_owned(),
        };
        self.set_toast(message);
        self.publish_to_ui_state();
    }

    fn persist_view(&mut self, table: TableKind) {
        let (Some(folder), Some(view)) = (self.folder.as_ref(), self.views.get(&table)) else {
            return;
        };
        if let Err(err) = folder.save_view_state(view) {
            warn!(table = %table, error = %err, "cannot save view state");
            self.set_toast(format!("Cannot save view: {err}"));
        }
    }

    fn publish_to_ui_state(&mut self) {
        let Some(ui_state) = self.ui_state.as_ref() else {
            return;
        };
        let selected = self.selected_record();
        let mut ui_state = ui_state.blocking_lock();
        ui_state.set_active_tab(self.tab);
        ui_state.set_selected_record(selected);
    }

    fn sync_from_ui_state(&mut self) {
        let Some(ui_state) = self.ui_state.as_ref() else {
            return;
        };
        let workspace_rev = ui_state.blocking_lock().workspace_rev();
        if workspace_rev == self.ui_state_workspace_rev {
            return;
        }
        match self.reload_from_disk() {
            Ok(()) => self.ui_state_workspace_rev = workspace_rev,
            // Keep the old marker so the next tick retries.
            Err(err) => warn!(error = %err, "cannot reload workspace"),
        }
    }

    fn reload_from_disk(&mut self) -> Result<(), StoreError> {
        let Some(folder) = self.folder.as_ref() else {
            return Ok(());
        };
        let workspace = folder.load_workspace()?;
        if workspace == self.workspace {
            return Ok(());
        }

        debug!(rev = workspace.rev(), "reloaded workspace from disk");
        self.workspace = workspace;
        self.filters.retain(|_, filter_id| self.workspace.filters().contains_key(filter_id));
        for table in TABLE_TABS {
            let rows = self.table_page(table).map_or(0, |page| page.rows.len());
            let selected = self.selected_row(table).min(rows.saturating_sub(1));
            self.selected_rows.insert(table, selected);
        }
        self.publish_to_ui_state();
        Ok(())
    }

    fn set_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(2),
        });
    }

    fn toast_suffix(&mut self) -> String {
        match self.toast.as_ref() {
            Some(toast) if toast.expires_at > Instant::now() => format!(" | {}", toast.message),
            Some(_) => {
                self.toast = None;
                String::new()
            }
            None => String::new(),
        }
    }

    fn inspector_lines(&self) -> Vec<Line<'static>> {
        let Some(record) = self.selected_record() else {
            return vec![Line::from("No record selected")];
        };
        let lines = match record.kind() {
            RecordKind::Research => self.research_lines(&record),
            RecordKind::Meeting => self.meeting_lines(&record),
            RecordKind::Jtbd => self.jtbd_lines(&record),
            _ => None,
        };
        lines.unwrap_or_else(|| vec![Line::from(format!("{record} not found"))])
    }

    fn research_lines(&self, record: &RecordRef) -> Option<Vec<Line<'static>>> {
        let research = self.workspace.researches().get(record.id())?;
        let mut lines = vec![
            field_line("Name", &research.name),
            field_line("Status", research.status.as_str()),
            field_line(
                "Dates",
                &format!(
                    "{} → {} ({} days)",
                    research.start_date,
                    research.end_date,
                    research.duration_days()
                ),
            ),
            field_line("Team", &research.team.join(", ")),
            field_line("Customer", research.customer.as_deref().unwrap_or("—")),
        ];
        if !research.description.is_empty() {
            lines.push(Line::from(""));
            lines.extend(research.description.lines().map(|line| Line::from(line.to_owned())));
        }

        lines.push(Line::from(""));
        lines.push(section_line("Meetings"));
        let mut meetings = self.workspace.meetings_of(&research.research_id).collect::<Vec<_>>();
        meetings.sort_by_key(|meeting| (meeting.date, meeting.meeting_id.clone()));
        if meetings.is_empty() {
            lines.push(Line::from("  none"));
        }
        for meeting in meetings {
            lines.push(Line::from(format!(
                "  {} {} ({})",
                meeting.date,
                meeting.title,
                meeting.status.as_str()
            )));
        }

        let guides = self
            .workspace
            .guides()
            .values()
            .filter(|guide| guide.research_id.as_ref() == Some(&research.research_id))
            .collect::<Vec<_>>();
        if !guides.is_empty() {
            lines.push(Line::from(""));
            lines.push(section_line("Guides"));
            for guide in guides {
                lines.push(Line::from(format!(
                    "  {} · {} blocks, {} questions",
                    guide.name,
                    guide.block_count(),
                    guide.question_count()
                )));
            }
        }
        Some(lines)
    }

    fn meeting_lines(&self, record: &RecordRef) -> Option<Vec<Line<'static>>> {
        let meeting = self.workspace.meetings().get(record.id())?;
        let research = meeting
            .research_id
            .as_ref()
            .and_then(|research_id| self.workspace.researches().get(research_id))
            .map_or_else(|| "—".to_owned(), |research| research.name.clone());
        let respondent = if meeting.respondent_position.is_empty() {
            meeting.respondent_name.clone()
        } else {
            format!("{}, {}", meeting.respondent_name, meeting.respondent_position)
        };

        let mut lines = vec![
            field_line("Title", &meeting.title),
            field_line("Date", &meeting.date.to_string()),
            field_line("Status", meeting.status.as_str()),
            field_line("Respondent", &respondent),
            field_line("Company", &meeting.company),
            field_line("Research", &research),
        ];
        if !meeting.notes.is_empty() {
            lines.push(Line::from(""));
            lines.extend(meeting.notes.lines().map(|line| Line::from(line.to_owned())));
        }

        for attachment in self.workspace.attachments_of(&meeting.meeting_id) {
            lines.push(Line::from(""));
            lines.push(section_line(&format!(
                "{} · {}",
                attachment.file_name,
                attachment.transcription_status.label()
            )));
            if let Some(text) = attachment.transcript.as_deref() {
                let annotations = self.workspace.annotations_of(&attachment.attachment_id);
                let rendered = render_transcript(text, annotations);
                lines.extend(rendered.lines().map(|line| Line::from(line.to_owned())));
            }
        }
        Some(lines)
    }

    fn jtbd_lines(&self, record: &RecordRef) -> Option<Vec<Line<'static>>> {
        let jtbd = self.workspace.jtbds().get(record.id())?;
        let mut path = ancestors(&self.workspace, &jtbd.jtbd_id)
            .iter()
            .filter_map(|jtbd_id| self.workspace.jtbds().get(jtbd_id))
            .map(|ancestor| ancestor.title.clone())
            .collect::<Vec<_>>();
        path.reverse();
        let research = jtbd
            .research_id
            .as_ref()
            .and_then(|research_id| self.workspace.researches().get(research_id))
            .map_or_else(|| "—".to_owned(), |research| research.name.clone());

        let mut lines = vec![
            field_line("Title", &jtbd.title),
            field_line("Priority", jtbd.priority.as_str()),
            field_line("Category", jtbd.category.as_deref().unwrap_or("—")),
            field_line("Tags", &jtbd.tags.join(", ")),
            field_line("Research", &research),
            field_line("Path", &if path.is_empty() { "(root)".to_owned() } else { path.join(" › ") }),
        ];
        if !jtbd.description.is_empty() {
            lines.push(Line::from(""));
            lines.extend(jtbd.description.lines().map(|line| Line::from(line.to_owned())));
        }

        let children = children(&self.workspace, &jtbd.jtbd_id);
        if !children.is_empty() {
            lines.push(Line::from(""));
            lines.push(section_line("Children"));
            for child in children {
                lines.push(Line::from(format!("  {} ({})", child.title, child.priority.as_str())));
            }
        }
        Some(lines)
    }
}

fn field_line(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(FOOTER_LABEL_COLOR)),
        Span::raw(value.to_owned()),
    ])
}

fn section_line(label: &str) -> Line<'static> {
    Line::from(Span::styled(label.to_owned(), help_header_style()))
}

fn roadmap_start(workspace: &Workspace) -> NaiveDate {
    workspace
        .researches()
        .values()
        .map(|research| research.start_date)
        .min()
        .unwrap_or_else(|| chrono::Local::now().date_naive())
}

/// Month of the latest meeting, or the current month.
fn calendar_start(workspace: &Workspace) -> (i32, u32) {
    let date = workspace
        .meetings()
        .values()
        .map(|meeting| meeting.date)
        .max()
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    (date.year(), date.month())
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen);
}

include!("chrome.rs");
