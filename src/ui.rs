// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Shared UI state for cross-component coordination.
//!
//! The TUI publishes what the human is looking at; the MCP server reads it for context and bumps
//! the workspace revision counter after it mutates records so the TUI reloads.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{RecordRef, TableKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Research,
    Meetings,
    Jtbd,
    Roadmap,
    Calendar,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Self::Research, Self::Meetings, Self::Jtbd, Self::Roadmap, Self::Calendar];

    pub fn title(self) -> &'static str {
        match self {
            Self::Research => "Research",
            Self::Meetings => "Meetings",
            Self::Jtbd => "JTBD",
            Self::Roadmap => "Roadmap",
            Self::Calendar => "Calendar",
        }
    }

    /// The table shown by this tab, if it is a table tab.
    pub fn table(self) -> Option<TableKind> {
        match self {
            Self::Research => Some(TableKind::Research),
            Self::Meetings => Some(TableKind::Meetings),
            Self::Jtbd => Some(TableKind::Jtbd),
            Self::Roadmap | Self::Calendar => None,
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|tab| *tab == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|tab| *tab == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    rev: u64,
    active_tab: Tab,
    selected_record: Option<RecordRef>,
    workspace_rev: u64,
}

impl UiState {
    /// Bumped on every change below.
    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn selected_record(&self) -> Option<&RecordRef> {
        self.selected_record.as_ref()
    }

    /// Count of external workspace mutations the TUI has been told about.
    pub fn workspace_rev(&self) -> u64 {
        self.workspace_rev
    }

    pub fn set_active_tab(&mut self, tab: Tab) {
        if self.active_tab == tab {
            return;
        }
        self.active_tab = tab;
        self.rev = self.rev.wrapping_add(1);
    }

    pub fn set_selected_record(&mut self, record: Option<RecordRef>) {
        if self.selected_record == record {
            return;
        }
        self.selected_record = record;
        self.rev = self.rev.wrapping_add(1);
    }

    pub fn bump_workspace_rev(&mut self) {
        self.workspace_rev = self.workspace_rev.wrapping_add(1);
        self.rev = self.rev.wrapping_add(1);
    }
}
