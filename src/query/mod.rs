// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only queries over a workspace.
//!
//! Queries provide the derived views (table pages, trees, timelines, calendars, search hits)
//! that power the UI and MCP tools.

use thiserror::Error;

use crate::model::{FilterOperator, TableKind};

pub mod calendar;
pub mod filter;
pub mod jtbd;
pub mod roadmap;
pub mod search;
pub mod table;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("unknown column '{column}' for table {table}")]
    UnknownColumn { table: TableKind, column: String },
    #[error("operator {operator:?} expects {expected} value(s), got {got}")]
    Arity { operator: FilterOperator, expected: String, got: usize },
    #[error("operator {operator:?} is not supported on column '{column}'")]
    UnsupportedOperator { column: String, operator: FilterOperator },
    #[error("invalid regex '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },
    #[error("invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { value: String },
    #[error("invalid number '{value}'")]
    InvalidNumber { value: String },
    #[error("column '{column}' is the last visible column")]
    LastVisibleColumn { column: String },
    #[error("invalid month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
}
