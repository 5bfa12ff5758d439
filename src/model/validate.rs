// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Field-level validation shared by every record form.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field '{field}' is required")]
    Required { field: &'static str },
    #[error("field '{field}' is too long ({len} > {max} characters)")]
    TooLong { field: &'static str, len: usize, max: usize },
    #[error("end_date {end} is before start_date {start}")]
    DateRange { start: NaiveDate, end: NaiveDate },
    #[error("field '{field}' is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub(crate) const MAX_TITLE_LEN: usize = 200;

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    let len = trimmed.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(ValidationError::TooLong { field, len, max: MAX_TITLE_LEN });
    }
    Ok(())
}

pub(crate) fn require_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if end < start {
        return Err(ValidationError::DateRange { start, end });
    }
    Ok(())
}

/// Trims every entry, drops blanks and duplicates while keeping first-seen order.
pub(crate) fn normalize_list(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() || out.iter().any(|existing| existing == trimmed) {
            continue;
        }
        out.push(trimmed.to_owned());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_text_rejects_whitespace_only() {
        assert_eq!(require_text("name", "   "), Err(ValidationError::Required { field: "name" }));
        assert!(require_text("name", " Onboarding study ").is_ok());
    }

    #[test]
    fn normalize_list_dedupes_in_order() {
        let values = vec![" Ann ".to_owned(), "Bob".to_owned(), "Ann".to_owned(), "".to_owned()];
        assert_eq!(normalize_list(&values), vec!["Ann".to_owned(), "Bob".to_owned()]);
    }
}
