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

use super::ids::{MeetingId, ResearchId};
use super::validate::{require_text, ValidationError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl MeetingStatus {
    pub const ALL: [MeetingStatus; 3] = [Self::Scheduled, Self::Completed, Self::Cancelled];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == raw)
    }
}

/// An interview session, optionally grouped under a research project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Meeting {
    pub meeting_id: MeetingId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_id: Option<ResearchId>,
    pub title: String,
    pub respondent_name: String,
    #[serde(default)]
    pub respondent_position: String,
    #[serde(default)]
    pub company: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub status: MeetingStatus,
    #[serde(default)]
    pub notes: String,
}

impl Meeting {
    pub fn new(
        meeting_id: MeetingId,
        title: impl Into<String>,
        respondent_name: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            meeting_id,
            research_id: None,
            title: title.into(),
            respondent_name: respondent_name.into(),
            respondent_position: String::new(),
            company: String::new(),
            date,
            status: MeetingStatus::default(),
            notes: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_text("respondent_name", &self.respondent_name)
    }

    pub fn normalize(&mut self) {
        self.title = self.title.trim().to_owned();
        self.respondent_name = self.respondent_name.trim().to_owned();
        self.respondent_position = self.respondent_position.trim().to_owned();
        self.company = self.company.trim().to_owned();
    }
}
