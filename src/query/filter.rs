// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Filter conditions compiled against a table's column catalog.

use std::cmp::Ordering;

use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};

use super::table::{require_column, CellValue, ColumnKind, TableRow};
use super::QueryError;
use crate::model::{FilterCondition, FilterOperator, SavedFilter, TableKind};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Scalar {
    Text(String),
    Number(i64),
    Date(NaiveDate),
}

#[derive(Debug, Clone)]
enum Predicate {
    Equals(Scalar),
    NotEquals(Scalar),
    AnyOf(Vec<Scalar>),
    Contains(String),
    StartsWith(String),
    Matches(Regex),
    Before(Scalar),
    After(Scalar),
    Between(Scalar, Scalar),
    IsEmpty,
    IsNotEmpty,
}

/// A condition checked once against the catalog, ready to evaluate rows.
#[derive(Debug, Clone)]
pub struct CompiledCondition {
    column: &'static str,
    predicate: Predicate,
}

pub fn parse_date(value: &str) -> Result<NaiveDate, QueryError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| QueryError::InvalidDate { value: value.to_owned() })
}

fn parse_scalar(kind: ColumnKind, value: &str) -> Result<Scalar, QueryError> {
    match kind {
        ColumnKind::Text | ColumnKind::List => Ok(Scalar::Text(value.trim().to_lowercase())),
        ColumnKind::Number => value
            .trim()
            .parse::<i64>()
            .map(Scalar::Number)
            .map_err(|_| QueryError::InvalidNumber { value: value.to_owned() }),
        ColumnKind::Date => parse_date(value).map(Scalar::Date),
    }
}

pub fn compile_condition(
    table: TableKind,
    condition: &FilterCondition,
) -> Result<CompiledCondition, QueryError> {
    let column = require_column(table, &condition.column)?;
    let operator = condition.operator;
    let values = &condition.values;

    let arity_ok = match operator.arity() {
        Some(expected) => values.len() == expected,
        None => !values.is_empty(),
    };
    if !arity_ok {
        return Err(QueryError::Arity {
            operator,
            expected: operator.arity().map_or_else(|| "1+".to_owned(), |n| n.to_string()),
            got: values.len(),
        });
    }

    let ordered = matches!(column.kind, ColumnKind::Number | ColumnKind::Date);
    let unsupported = || QueryError::UnsupportedOperator { column: column.key.to_owned(), operator };

    let predicate = match operator {
        FilterOperator::Equals => Predicate::Equals(parse_scalar(column.kind, &values[0])?),
        FilterOperator::NotEquals => Predicate::NotEquals(parse_scalar(column.kind, &values[0])?),
        FilterOperator::AnyOf => Predicate::AnyOf(
            values
                .iter()
                .map(|value| parse_scalar(column.kind, value))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        FilterOperator::Contains => Predicate::Contains(values[0].to_lowercase()),
        FilterOperator::StartsWith => Predicate::StartsWith(values[0].to_lowercase()),
        FilterOperator::Matches => {
            let regex = RegexBuilder::new(&values[0])
                .case_insensitive(true)
                .build()
                .map_err(|err| QueryError::InvalidRegex {
                    pattern: values[0].clone(),
                    reason: err.to_string(),
                })?;
            Predicate::Matches(regex)
        }
        FilterOperator::Before if ordered => Predicate::Before(parse_scalar(column.kind, &values[0])?),
        FilterOperator::After if ordered => Predicate::After(parse_scalar(column.kind, &values[0])?),
        FilterOperator::Between if ordered => {
            let low = parse_scalar(column.kind, &values[0])?;
            let high = parse_scalar(column.kind, &values[1])?;
            Predicate::Between(low, high)
        }
        FilterOperator::Before | FilterOperator::After | FilterOperator::Between => {
            return Err(unsupported())
        }
        FilterOperator::IsEmpty => Predicate::IsEmpty,
        FilterOperator::IsNotEmpty => Predicate::IsNotEmpty,
    };

    Ok(CompiledCondition { column: column.key, predicate })
}

pub fn compile_conditions(
    table: TableKind,
    conditions: &[FilterCondition],
) -> Result<Vec<CompiledCondition>, QueryError> {
    conditions.iter().map(|condition| compile_condition(table, condition)).collect()
}

/// Checks that a saved filter can run: every condition compiles and every sort key is a
/// column of its table.
pub fn check_saved_filter(filter: &SavedFilter) -> Result<(), QueryError> {
    compile_conditions(filter.table, &filter.conditions)?;
    for spec in &filter.sort {
        require_column(filter.table, &spec.column)?;
    }
    Ok(())
}

fn cell_equals(cell: &CellValue, scalar: &Scalar) -> bool {
    match (cell, scalar) {
        (CellValue::List(items), Scalar::Text(text)) => {
            items.iter().any(|item| item.trim().to_lowercase() == *text)
        }
        (CellValue::Text(value), Scalar::Text(text)) => value.trim().to_lowercase() == *text,
        (CellValue::Number(value), Scalar::Number(number)) => value == number,
        (CellValue::Date(value), Scalar::Date(date)) => value == date,
        _ => false,
    }
}

fn cell_cmp(cell: &CellValue, scalar: &Scalar) -> Option<Ordering> {
    match (cell, scalar) {
        (CellValue::Number(value), Scalar::Number(number)) => Some(value.cmp(number)),
        (CellValue::Date(value), Scalar::Date(date)) => Some(value.cmp(date)),
        _ => None,
    }
}

fn text_items(cell: &CellValue) -> Vec<String> {
    match cell {
        CellValue::List(items) => items.iter().map(|item| item.to_lowercase()).collect(),
        CellValue::Empty => Vec::new(),
        other => vec![other.display().to_lowercase()],
    }
}

impl CompiledCondition {
    pub fn column(&self) -> &'static str {
        self.column
    }

    pub fn matches_cell(&self, cell: &CellValue) -> bool {
        match &self.predicate {
            Predicate::IsEmpty => cell.is_empty(),
            Predicate::IsNotEmpty => !cell.is_empty(),
            Predicate::Equals(scalar) => cell_equals(cell, scalar),
            Predicate::NotEquals(scalar) => !cell_equals(cell, scalar),
            Predicate::AnyOf(scalars) => scalars.iter().any(|scalar| cell_equals(cell, scalar)),
            Predicate::Contains(needle) => text_items(cell).iter().any(|item| item.contains(needle.as_str())),
            Predicate::StartsWith(needle) => {
                text_items(cell).iter().any(|item| item.starts_with(needle.as_str()))
            }
            Predicate::Matches(regex) => !cell.is_empty() && regex.is_match(&cell.display()),
            Predicate::Before(bound) => cell_cmp(cell, bound) == Some(Ordering::Less),
            Predicate::After(bound) => cell_cmp(cell, bound) == Some(Ordering::Greater),
            Predicate::Between(low, high) => {
                matches!(cell_cmp(cell, low), Some(Ordering::Greater | Ordering::Equal))
                    && matches!(cell_cmp(cell, high), Some(Ordering::Less | Ordering::Equal))
            }
        }
    }

    pub fn matches<R: TableRow + ?Sized>(&self, row: &R) -> bool {
        self.matches_cell(&row.cell(self.column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(column: &str, operator: FilterOperator, values: &[&str]) -> FilterCondition {
        FilterCondition::new(column, operator, values.iter().map(|v| (*v).to_owned()).collect())
    }

    fn check(table: TableKind, condition: FilterCondition, cell: CellValue) -> bool {
        compile_condition(table, &condition).unwrap().matches_cell(&cell)
    }

    fn date(y: i32, m: u32, d: u32) -> CellValue {
        CellValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn saved_filters_are_checked_against_the_catalog() {
        let mut filter = SavedFilter::new(
            crate::model::FilterId::new("f:1").unwrap(),
            "Recent",
            TableKind::Meetings,
        );
        filter.conditions.push(cond("date", FilterOperator::After, &["2026-01-01"]));
        filter.sort.push(crate::model::SortSpec::desc("date"));
        assert!(check_saved_filter(&filter).is_ok());

        filter.sort.push(crate::model::SortSpec::asc("mood"));
        assert!(matches!(check_saved_filter(&filter), Err(QueryError::UnknownColumn { .. })));
        filter.sort.pop();

        filter.conditions.push(cond("company", FilterOperator::Before, &["m"]));
        assert!(matches!(
            check_saved_filter(&filter),
            Err(QueryError::UnsupportedOperator { .. })
        ));
        filter.conditions.pop();

        filter.conditions.push(cond("title", FilterOperator::Matches, &["(unclosed"]));
        assert!(matches!(check_saved_filter(&filter), Err(QueryError::InvalidRegex { .. })));
    }

    #[test]
    fn text_operators_ignore_case() {
        let cell = CellValue::Text("Contoso Ltd".to_owned());
        assert!(check(TableKind::Meetings, cond("company", FilterOperator::Equals, &["contoso ltd"]), cell.clone()));
        assert!(check(TableKind::Meetings, cond("company", FilterOperator::Contains, &["SO L"]), cell.clone()));
        assert!(check(TableKind::Meetings, cond("company", FilterOperator::StartsWith, &["cont"]), cell.clone()));
        assert!(check(TableKind::Meetings, cond("company", FilterOperator::Matches, &["^contoso\\s"]), cell.clone()));
        assert!(!check(TableKind::Meetings, cond("company", FilterOperator::NotEquals, &["CONTOSO LTD"]), cell));
    }

    #[test]
    fn list_cells_match_any_item() {
        let cell = CellValue::List(vec!["Price".to_owned(), "speed".to_owned()]);
        assert!(check(TableKind::Jtbd, cond("tags", FilterOperator::Equals, &["price"]), cell.clone()));
        assert!(check(TableKind::Jtbd, cond("tags", FilterOperator::AnyOf, &["cost", "SPEED"]), cell.clone()));
        assert!(!check(TableKind::Jtbd, cond("tags", FilterOperator::AnyOf, &["cost"]), cell));
    }

    #[test]
    fn date_bounds_are_inclusive_for_between() {
        let between = cond("date", FilterOperator::Between, &["2026-02-01", "2026-02-28"]);
        assert!(check(TableKind::Meetings, between.clone(), date(2026, 2, 1)));
        assert!(check(TableKind::Meetings, between.clone(), date(2026, 2, 28)));
        assert!(!check(TableKind::Meetings, between.clone(), date(2026, 3, 1)));
        assert!(!check(TableKind::Meetings, between, CellValue::Empty));
        assert!(check(TableKind::Meetings, cond("date", FilterOperator::Before, &["2026-02-02"]), date(2026, 2, 1)));
        assert!(!check(TableKind::Meetings, cond("date", FilterOperator::After, &["2026-02-01"]), date(2026, 2, 1)));
    }

    #[test]
    fn numbers_compare_numerically() {
        let cell = CellValue::Number(1_500);
        assert!(check(TableKind::Attachments, cond("size_bytes", FilterOperator::After, &["999"]), cell.clone()));
        assert!(check(TableKind::Attachments, cond("size_bytes", FilterOperator::Equals, &["1500"]), cell));
    }

    #[test]
    fn emptiness_operators() {
        assert!(check(TableKind::Research, cond("customer", FilterOperator::IsEmpty, &[]), CellValue::Empty));
        assert!(check(
            TableKind::Research,
            cond("customer", FilterOperator::IsNotEmpty, &[]),
            CellValue::Text("Acme".to_owned())
        ));
    }

    #[test]
    fn invalid_inputs_are_reported() {
        let err = compile_condition(TableKind::Meetings, &cond("date", FilterOperator::Before, &["soon"])).unwrap_err();
        assert_eq!(err, QueryError::InvalidDate { value: "soon".to_owned() });

        let err = compile_condition(TableKind::Meetings, &cond("title", FilterOperator::Matches, &["("])).unwrap_err();
        assert!(matches!(err, QueryError::InvalidRegex { .. }));

        let err = compile_condition(TableKind::Meetings, &cond("title", FilterOperator::Before, &["x"])).unwrap_err();
        assert!(matches!(err, QueryError::UnsupportedOperator { .. }));

        let err = compile_condition(TableKind::Meetings, &cond("title", FilterOperator::Between, &["a"])).unwrap_err();
        assert!(matches!(err, QueryError::Arity { got: 1, .. }));

        let err = compile_condition(TableKind::Meetings, &cond("ghost", FilterOperator::IsEmpty, &[])).unwrap_err();
        assert!(matches!(err, QueryError::UnknownColumn { .. }));
    }
}
