// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ids::ResearchId;
use super::validate::{normalize_list, require_date_range, require_text, ValidationError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResearchStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

impl ResearchStatus {
    pub const ALL: [ResearchStatus; 4] =
        [Self::Planned, Self::InProgress, Self::Completed, Self::Cancelled];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == raw)
    }
}

/// A research project: a date range under which meetings are grouped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Research {
    pub research_id: ResearchId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub team: Vec<String>,
    #[serde(default)]
    pub status: ResearchStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
}

impl Research {
    pub fn new(
        research_id: ResearchId,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            research_id,
            name: name.into(),
            description: String::new(),
            team: Vec::new(),
            status: ResearchStatus::default(),
            start_date,
            end_date,
            customer: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_date_range(self.start_date, self.end_date)
    }

    /// Trims free-text fields and dedupes the team list.
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_owned();
        self.team = normalize_list(&self.team);
        self.customer = self
            .customer
            .take()
            .map(|customer| customer.trim().to_owned())
            .filter(|customer| !customer.is_empty());
    }

    /// Length of the project in days, counting both endpoints.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let research = Research::new(
            ResearchId::new("r:1").unwrap(),
            "Checkout study",
            date(2026, 3, 10),
            date(2026, 3, 1),
        );
        assert!(matches!(research.validate(), Err(ValidationError::DateRange { .. })));
    }

    #[test]
    fn single_day_research_lasts_one_day() {
        let research =
            Research::new(ResearchId::new("r:1").unwrap(), "Pilot", date(2026, 1, 5), date(2026, 1, 5));
        assert_eq!(research.duration_days(), 1);
        assert!(research.contains_date(date(2026, 1, 5)));
    }

    #[test]
    fn status_parses_snake_case_labels() {
        assert_eq!(ResearchStatus::parse("in_progress"), Some(ResearchStatus::InProgress));
        assert_eq!(ResearchStatus::parse("InProgress"), None);
    }
}
