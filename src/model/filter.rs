// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::ids::FilterId;
use super::validate::{require_text, ValidationError};

/// Which table a view state or saved filter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Research,
    Meetings,
    Jtbd,
    Attachments,
}

impl TableKind {
    pub const ALL: [TableKind; 4] = [Self::Research, Self::Meetings, Self::Jtbd, Self::Attachments];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Meetings => "meetings",
            Self::Jtbd => "jtbd",
            Self::Attachments => "attachments",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    StartsWith,
    Matches,
    Before,
    After,
    Between,
    IsEmpty,
    IsNotEmpty,
    AnyOf,
}

impl FilterOperator {
    /// How many operand values the operator expects (`None` = one or more).
    pub fn arity(self) -> Option<usize> {
        match self {
            Self::IsEmpty | Self::IsNotEmpty => Some(0),
            Self::Between => Some(2),
            Self::AnyOf => None,
            _ => Some(1),
        }
    }
}

/// One predicate over a table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FilterCondition {
    #[schemars(with = "String")]
    pub column: SmolStr,
    pub operator: FilterOperator,
    #[serde(default)]
    pub values: Vec<String>,
}

impl FilterCondition {
    pub fn new(column: impl Into<SmolStr>, operator: FilterOperator, values: Vec<String>) -> Self {
        Self { column: column.into(), operator, values }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct SortSpec {
    #[schemars(with = "String")]
    pub column: SmolStr,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(column: impl Into<SmolStr>) -> Self {
        Self { column: column.into(), direction: SortDirection::Asc }
    }

    pub fn desc(column: impl Into<SmolStr>) -> Self {
        Self { column: column.into(), direction: SortDirection::Desc }
    }
}

/// A named, reusable filter for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SavedFilter {
    pub filter_id: FilterId,
    pub name: String,
    pub table: TableKind,
    #[serde(default)]
    pub conditions: Vec<FilterCondition>,
    #[serde(default)]
    pub sort: Vec<SortSpec>,
}

impl SavedFilter {
    pub fn new(filter_id: FilterId, name: impl Into<String>, table: TableKind) -> Self {
        Self { filter_id, name: name.into(), table, conditions: Vec::new(), sort: Vec::new() }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        for condition in &self.conditions {
            let count = condition.values.len();
            let ok = match condition.operator.arity() {
                Some(expected) => count == expected,
                None => count > 0,
            };
            if !ok {
                return Err(ValidationError::Invalid {
                    field: "conditions",
                    reason: format!(
                        "operator {:?} on column '{}' got {count} value(s)",
                        condition.operator, condition.column
                    ),
                });
            }
        }
        Ok(())
    }
}
