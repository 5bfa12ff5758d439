// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Column-configurable, filterable, sortable, paginated tables over workspace records.

use std::cmp::Ordering;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::filter::compile_conditions;
use super::QueryError;
use crate::model::{
    Attachment, FilterCondition, Jtbd, Meeting, RecordKind, RecordRef, Research, SavedFilter,
    SortDirection, SortSpec, TableKind, Workspace,
};

pub const DEFAULT_PAGE_SIZE: usize = 25;
pub const MAX_PAGE_SIZE: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
    Date,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: ColumnKind,
    pub default_visible: bool,
}

const fn col(key: &'static str, label: &'static str, kind: ColumnKind, default_visible: bool) -> ColumnDef {
    ColumnDef { key, label, kind, default_visible }
}

const RESEARCH_COLUMNS: &[ColumnDef] = &[
    col("id", "ID", ColumnKind::Text, false),
    col("name", "Name", ColumnKind::Text, true),
    col("status", "Status", ColumnKind::Text, true),
    col("team", "Team", ColumnKind::List, true),
    col("customer", "Customer", ColumnKind::Text, true),
    col("start_date", "Start", ColumnKind::Date, true),
    col("end_date", "End", ColumnKind::Date, true),
    col("duration_days", "Days", ColumnKind::Number, false),
    col("description", "Description", ColumnKind::Text, false),
];

const MEETING_COLUMNS: &[ColumnDef] = &[
    col("id", "ID", ColumnKind::Text, false),
    col("title", "Title", ColumnKind::Text, true),
    col("date", "Date", ColumnKind::Date, true),
    col("status", "Status", ColumnKind::Text, true),
    col("respondent_name", "Respondent", ColumnKind::Text, true),
    col("respondent_position", "Position", ColumnKind::Text, false),
    col("company", "Company", ColumnKind::Text, true),
    col("research_id", "Research", ColumnKind::Text, false),
    col("notes", "Notes", ColumnKind::Text, false),
];

const JTBD_COLUMNS: &[ColumnDef] = &[
    col("id", "ID", ColumnKind::Text, false),
    col("title", "Title", ColumnKind::Text, true),
    col("priority", "Priority", ColumnKind::Text, true),
    col("category", "Category", ColumnKind::Text, true),
    col("tags", "Tags", ColumnKind::List, true),
    col("parent_id", "Parent", ColumnKind::Text, false),
    col("research_id", "Research", ColumnKind::Text, false),
    col("description", "Description", ColumnKind::Text, false),
];

const ATTACHMENT_COLUMNS: &[ColumnDef] = &[
    col("id", "ID", ColumnKind::Text, false),
    col("file_name", "File", ColumnKind::Text, true),
    col("meeting_id", "Meeting", ColumnKind::Text, true),
    col("media_type", "Type", ColumnKind::Text, true),
    col("size_bytes", "Size", ColumnKind::Number, false),
    col("transcription_status", "Transcription", ColumnKind::Text, true),
];

/// Column catalog of a table, in default order.
pub fn columns(table: TableKind) -> &'static [ColumnDef] {
    match table {
        TableKind::Research => RESEARCH_COLUMNS,
        TableKind::Meetings => MEETING_COLUMNS,
        TableKind::Jtbd => JTBD_COLUMNS,
        TableKind::Attachments => ATTACHMENT_COLUMNS,
    }
}

pub fn column(table: TableKind, key: &str) -> Option<&'static ColumnDef> {
    columns(table).iter().find(|column| column.key == key)
}

pub(crate) fn require_column(table: TableKind, key: &str) -> Result<&'static ColumnDef, QueryError> {
    column(table, key).ok_or_else(|| QueryError::UnknownColumn { table, column: key.to_owned() })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Text(String),
    Number(i64),
    Date(NaiveDate),
    List(Vec<String>),
    Empty,
}

impl CellValue {
    fn text(value: &str) -> Self {
        if value.trim().is_empty() {
            Self::Empty
        } else {
            Self::Text(value.to_owned())
        }
    }

    fn opt_text(value: Option<&str>) -> Self {
        value.map_or(Self::Empty, Self::text)
    }

    fn list(values: &[String]) -> Self {
        if values.is_empty() {
            Self::Empty
        } else {
            Self::List(values.to_vec())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Display form used for rendering, free-text search and text operators.
    pub fn display(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(number) => number.to_string(),
            Self::Date(date) => date.format("%Y-%m-%d").to_string(),
            Self::List(items) => items.join(", "),
            Self::Empty => String::new(),
        }
    }

    /// Ordering of two non-empty cells. Text compares case-insensitively.
    fn cmp_values(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            _ => self.display().to_lowercase().cmp(&other.display().to_lowercase()),
        }
    }
}

/// A record that can be shown as a table row.
pub trait TableRow {
    fn record_ref(&self) -> RecordRef;
    fn cell(&self, column: &str) -> CellValue;
}

impl TableRow for Research {
    fn record_ref(&self) -> RecordRef {
        RecordRef::new(RecordKind::Research, &self.research_id)
    }

    fn cell(&self, column: &str) -> CellValue {
        match column {
            "id" => CellValue::text(self.research_id.as_str()),
            "name" => CellValue::text(&self.name),
            "status" => CellValue::text(self.status.as_str()),
            "team" => CellValue::list(&self.team),
            "customer" => CellValue::opt_text(self.customer.as_deref()),
            "start_date" => CellValue::Date(self.start_date),
            "end_date" => CellValue::Date(self.end_date),
            "duration_days" => CellValue::Number(self.duration_days()),
            "description" => CellValue::text(&self.description),
            _ => CellValue::Empty,
        }
    }
}

impl TableRow for Meeting {
    fn record_ref(&self) -> RecordRef {
        RecordRef::new(RecordKind::Meeting, &self.meeting_id)
    }

    fn cell(&self, column: &str) -> CellValue {
        match column {
            "id" => CellValue::text(self.meeting_id.as_str()),
            "title" => CellValue::text(&self.title),
            "date" => CellValue::Date(self.date),
            "status" => CellValue::text(self.status.as_str()),
            "respondent_name" => CellValue::text(&self.respondent_name),
            "respondent_position" => CellValue::text(&self.respondent_position),
            "company" => CellValue::text(&self.company),
            "research_id" => CellValue::opt_text(self.research_id.as_ref().map(|id| id.as_str())),
            "notes" => CellValue::text(&self.notes),
            _ => CellValue::Empty,
        }
    }
}

impl TableRow for Jtbd {
    fn record_ref(&self) -> RecordRef {
        RecordRef::new(RecordKind::Jtbd, &self.jtbd_id)
    }

    fn cell(&self, column: &str) -> CellValue {
        match column {
            "id" => CellValue::text(self.jtbd_id.as_str()),
            "title" => CellValue::text(&self.title),
            "priority" => CellValue::text(self.priority.as_str()),
            "category" => CellValue::opt_text(self.category.as_deref()),
            "tags" => CellValue::list(&self.tags),
            "parent_id" => CellValue::opt_text(self.parent_id.as_ref().map(|id| id.as_str())),
            "research_id" => CellValue::opt_text(self.research_id.as_ref().map(|id| id.as_str())),
            "description" => CellValue::text(&self.description),
            _ => CellValue::Empty,
        }
    }
}

impl TableRow for Attachment {
    fn record_ref(&self) -> RecordRef {
        RecordRef::new(RecordKind::Attachment, &self.attachment_id)
    }

    fn cell(&self, column: &str) -> CellValue {
        match column {
            "id" => CellValue::text(self.attachment_id.as_str()),
            "file_name" => CellValue::text(&self.file_name),
            "meeting_id" => CellValue::text(self.meeting_id.as_str()),
            "media_type" => CellValue::text(&self.media_type),
            "size_bytes" => CellValue::Number(i64::try_from(self.size_bytes).unwrap_or(i64::MAX)),
            "transcription_status" => CellValue::text(self.transcription_status.label()),
            _ => CellValue::Empty,
        }
    }
}

/// Filters, free-text search, sort keys and the requested page (0-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableQuery {
    #[serde(default)]
    pub conditions: Vec<FilterCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: Vec<SortSpec>,
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for TableQuery {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
            search: None,
            sort: Vec::new(),
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TableQuery {
    /// Query equivalent of a saved filter, first page.
    pub fn from_saved(filter: &SavedFilter, page_size: usize) -> Self {
        Self {
            conditions: filter.conditions.clone(),
            search: None,
            sort: filter.sort.clone(),
            page: 0,
            page_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePage<T> {
    pub rows: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
    pub page_size: usize,
}

/// Runs `query` over `rows`: filter, search, stable sort, then paginate.
pub fn run_table_query<'a, R: TableRow>(
    table: TableKind,
    rows: impl IntoIterator<Item = &'a R>,
    query: &TableQuery,
) -> Result<TablePage<&'a R>, QueryError>
where
    R: 'a,
{
    let conditions = compile_conditions(table, &query.conditions)?;
    for spec in &query.sort {
        require_column(table, &spec.column)?;
    }

    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|needle| !needle.is_empty())
        .map(str::to_lowercase);

    let mut matched = rows
        .into_iter()
        .filter(|row| conditions.iter().all(|condition| condition.matches(*row)))
        .filter(|row| match &needle {
            Some(needle) => row_contains(table, *row, needle),
            None => true,
        })
        .collect::<Vec<_>>();

    if !query.sort.is_empty() {
        matched.sort_by(|a, b| compare_rows(*a, *b, &query.sort));
    }

    let page_size = query.page_size.clamp(1, MAX_PAGE_SIZE);
    let total = matched.len();
    let page_count = total.div_ceil(page_size).max(1);
    let page = query.page.min(page_count - 1);
    let rows = matched.into_iter().skip(page * page_size).take(page_size).collect();

    Ok(TablePage { rows, total, page, page_count, page_size })
}

fn row_contains<R: TableRow>(table: TableKind, row: &R, needle: &str) -> bool {
    columns(table)
        .iter()
        .any(|column| row.cell(column.key).display().to_lowercase().contains(needle))
}

fn compare_rows<R: TableRow>(a: &R, b: &R, sort: &[SortSpec]) -> Ordering {
    for spec in sort {
        let left = a.cell(&spec.column);
        let right = b.cell(&spec.column);
        // Empty cells sort last in both directions.
        let ordering = match (left.is_empty(), right.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ordering = left.cmp_values(&right);
                match spec.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            }
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// A materialized row: the record plus every catalog cell, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RowView {
    pub record: String,
    pub cells: Vec<CellValue>,
}

impl RowView {
    fn of<R: TableRow>(table: TableKind, row: &R) -> Self {
        Self {
            record: row.record_ref().to_string(),
            cells: columns(table).iter().map(|column| row.cell(column.key)).collect(),
        }
    }

    pub fn cell(&self, table: TableKind, key: &str) -> Option<&CellValue> {
        let index = columns(table).iter().position(|column| column.key == key)?;
        self.cells.get(index)
    }
}

fn materialize<'a, R: TableRow + 'a>(
    table: TableKind,
    rows: impl IntoIterator<Item = &'a R>,
    query: &TableQuery,
) -> Result<TablePage<RowView>, QueryError> {
    let page = run_table_query(table, rows, query)?;
    Ok(TablePage {
        rows: page.rows.into_iter().map(|row| RowView::of(table, row)).collect(),
        total: page.total,
        page: page.page,
        page_count: page.page_count,
        page_size: page.page_size,
    })
}

/// Runs `query` against the workspace collection behind `table`.
pub fn query_workspace_table(
    workspace: &Workspace,
    table: TableKind,
    query: &TableQuery,
) -> Result<TablePage<RowView>, QueryError> {
    match table {
        TableKind::Research => materialize(table, workspace.researches().values(), query),
        TableKind::Meetings => materialize(table, workspace.meetings().values(), query),
        TableKind::Jtbd => materialize(table, workspace.jtbds().values(), query),
        TableKind::Attachments => materialize(table, workspace.attachments().values(), query),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnState {
    #[schemars(with = "String")]
    pub key: SmolStr,
    pub visible: bool,
}

/// Persisted per-table view: column visibility and order, sort keys and page size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ViewState {
    pub table: TableKind,
    pub columns: Vec<ColumnState>,
    #[serde(default)]
    pub sort: Vec<SortSpec>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl ViewState {
    pub fn default_for(table: TableKind, page_size: usize) -> Self {
        Self {
            table,
            columns: columns(table)
                .iter()
                .map(|column| ColumnState { key: SmolStr::new_static(column.key), visible: column.default_visible })
                .collect(),
            sort: Vec::new(),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Visible column keys in display order.
    pub fn visible_columns(&self) -> Vec<&str> {
        self.columns.iter().filter(|column| column.visible).map(|column| column.key.as_str()).collect()
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.columns.iter().any(|column| column.visible && column.key == key)
    }

    /// Flips visibility of `key`; returns the new visibility.
    pub fn toggle_column(&mut self, key: &str) -> Result<bool, QueryError> {
        require_column(self.table, key)?;
        let visible_count = self.columns.iter().filter(|column| column.visible).count();
        let Some(state) = self.columns.iter_mut().find(|column| column.key == key) else {
            return Err(QueryError::UnknownColumn { table: self.table, column: key.to_owned() });
        };
        if state.visible && visible_count <= 1 {
            return Err(QueryError::LastVisibleColumn { column: key.to_owned() });
        }
        state.visible = !state.visible;
        Ok(state.visible)
    }

    /// Moves `key` to `index` (clamped) in the column order.
    pub fn move_column(&mut self, key: &str, index: usize) -> Result<(), QueryError> {
        let Some(from) = self.columns.iter().position(|column| column.key == key) else {
            return Err(QueryError::UnknownColumn { table: self.table, column: key.to_owned() });
        };
        let state = self.columns.remove(from);
        let index = index.min(self.columns.len());
        self.columns.insert(index, state);
        Ok(())
    }

    /// Cycles the primary sort on `key`: ascending, descending, then unsorted.
    pub fn cycle_sort(&mut self, key: &str) -> Result<(), QueryError> {
        require_column(self.table, key)?;
        let next = match self.sort.first() {
            Some(spec) if spec.column == key => match spec.direction {
                SortDirection::Asc => Some(SortSpec::desc(key)),
                SortDirection::Desc => None,
            },
            _ => Some(SortSpec::asc(key)),
        };
        self.sort.retain(|spec| spec.column != key);
        if let Some(spec) = next {
            self.sort.insert(0, spec);
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default_for(self.table, self.page_size);
    }

    /// Aligns the stored columns with the current catalog.
    ///
    /// Unknown columns and sort keys are dropped, new catalog columns are appended with their
    /// default visibility. Returns whether anything changed.
    pub fn reconcile(&mut self) -> bool {
        let before = self.clone();
        let table = self.table;

        let mut seen = Vec::<SmolStr>::new();
        self.columns.retain(|state| {
            let keep = column(table, &state.key).is_some() && !seen.contains(&state.key);
            if keep {
                seen.push(state.key.clone());
            }
            keep
        });
        for def in columns(table) {
            if !seen.iter().any(|key| key == def.key) {
                self.columns.push(ColumnState { key: SmolStr::new_static(def.key), visible: def.default_visible });
            }
        }
        if !self.columns.iter().any(|state| state.visible) {
            if let Some(first) = self.columns.first_mut() {
                first.visible = true;
            }
        }
        self.sort.retain(|spec| column(table, &spec.column).is_some());
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);

        *self != before
    }

    /// The query this view implies for `page` with extra filtering.
    pub fn query(&self, conditions: Vec<FilterCondition>, search: Option<String>, page: usize) -> TableQuery {
        TableQuery { conditions, search, sort: self.sort.clone(), page, page_size: self.page_size }
    }
}
