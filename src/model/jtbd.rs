// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ids::{JtbdId, ResearchId};
use super::validate::{normalize_list, require_text, ValidationError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|priority| priority.as_str() == raw)
    }

    /// Numeric rank used for sorting (higher is more urgent).
    pub fn rank(self) -> i64 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::Critical => 3,
        }
    }
}

/// A job to be done. Jobs form a forest through `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Jtbd {
    pub jtbd_id: JtbdId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<JtbdId>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_id: Option<ResearchId>,
}

impl Jtbd {
    pub fn new(jtbd_id: JtbdId, title: impl Into<String>) -> Self {
        Self {
            jtbd_id,
            title: title.into(),
            description: String::new(),
            parent_id: None,
            priority: Priority::default(),
            category: None,
            tags: Vec::new(),
            research_id: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        if self.parent_id.as_ref() == Some(&self.jtbd_id) {
            return Err(ValidationError::Invalid {
                field: "parent_id",
                reason: "a job cannot be its own parent".to_owned(),
            });
        }
        Ok(())
    }

    pub fn normalize(&mut self) {
        self.title = self.title.trim().to_owned();
        self.tags = normalize_list(&self.tags);
        self.category = self
            .category
            .take()
            .map(|category| category.trim().to_owned())
            .filter(|category| !category.is_empty());
    }
}
