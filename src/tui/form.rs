// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Record forms for the table tabs: one text input per field, submitted as a single op.

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{
    allocate_id, Id, Jtbd, JtbdId, Meeting, MeetingId, MeetingStatus, Priority, RecordKind,
    RecordRef, Research, ResearchId, ResearchStatus, TableKind, Workspace,
};
use crate::ops::{
    JtbdOp, JtbdPatch, MeetingOp, MeetingPatch, Op, ResearchOp, ResearchPatch,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(super) enum FormError {
    #[error("{label} is required")]
    Required { label: &'static str },
    #[error("{label}: {reason}")]
    Invalid { label: &'static str, reason: String },
    #[error("{0} no longer exists")]
    Gone(RecordRef),
    #[error("{0} records have no form")]
    Unsupported(TableKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum FormMode {
    Create,
    Edit(RecordRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct FormField {
    pub(super) key: &'static str,
    pub(super) label: &'static str,
    pub(super) required: bool,
    pub(super) value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RecordForm {
    pub(super) table: TableKind,
    pub(super) mode: FormMode,
    pub(super) fields: Vec<FormField>,
    pub(super) focus: usize,
    pub(super) error: Option<String>,
}

fn field(key: &'static str, label: &'static str, required: bool, value: impl Into<String>) -> FormField {
    FormField { key, label, required, value: value.into() }
}

fn optional_id<T>(id: Option<&Id<T>>) -> String {
    id.map(|id| id.as_str().to_owned()).unwrap_or_default()
}

impl RecordForm {
    /// Blank form for a new record; dates default to `today`.
    pub(super) fn create(table: TableKind, today: NaiveDate) -> Option<Self> {
        let today = today.to_string();
        let fields = match table {
            TableKind::Research => vec![
                field("name", "Name", true, ""),
                field("start_date", "Start date", true, today.clone()),
                field("end_date", "End date", true, today),
                field("status", "Status", false, ResearchStatus::default().as_str()),
                field("team", "Team", false, ""),
                field("customer", "Customer", false, ""),
            ],
            TableKind::Meetings => vec![
                field("title", "Title", true, ""),
                field("respondent_name", "Respondent", true, ""),
                field("date", "Date", true, today),
                field("respondent_position", "Position", false, ""),
                field("company", "Company", false, ""),
                field("research_id", "Research id", false, ""),
                field("status", "Status", false, MeetingStatus::default().as_str()),
            ],
            TableKind::Jtbd => vec![
                field("title", "Title", true, ""),
                field("priority", "Priority", false, Priority::default().as_str()),
                field("parent_id", "Parent id", false, ""),
                field("category", "Category", false, ""),
                field("research_id", "Research id", false, ""),
            ],
            TableKind::Attachments => return None,
        };
        Some(Self { table, mode: FormMode::Create, fields, focus: 0, error: None })
    }

    /// Form prefilled from an existing record; `None` if the record is not in `table`.
    pub(super) fn edit(table: TableKind, workspace: &Workspace, record: &RecordRef) -> Option<Self> {
        let fields = match (table, record.kind()) {
            (TableKind::Research, RecordKind::Research) => {
                let research = workspace.researches().get(record.id())?;
                vec![
                    field("name", "Name", true, research.name.clone()),
                    field("start_date", "Start date", true, research.start_date.to_string()),
                    field("end_date", "End date", true, research.end_date.to_string()),
                    field("status", "Status", false, research.status.as_str()),
                    field("team", "Team", false, research.team.join(", ")),
                    field("customer", "Customer", false, research.customer.clone().unwrap_or_default()),
                ]
            }
            (TableKind::Meetings, RecordKind::Meeting) => {
                let meeting = workspace.meetings().get(record.id())?;
                vec![
                    field("title", "Title", true, meeting.title.clone()),
                    field("respondent_name", "Respondent", true, meeting.respondent_name.clone()),
                    field("date", "Date", true, meeting.date.to_string()),
                    field("respondent_position", "Position", false, meeting.respondent_position.clone()),
                    field("company", "Company", false, meeting.company.clone()),
                    field("research_id", "Research id", false, optional_id(meeting.research_id.as_ref())),
                    field("status", "Status", false, meeting.status.as_str()),
                ]
            }
            (TableKind::Jtbd, RecordKind::Jtbd) => {
                let jtbd = workspace.jtbds().get(record.id())?;
                vec![
                    field("title", "Title", true, jtbd.title.clone()),
                    field("priority", "Priority", false, jtbd.priority.as_str()),
                    field("parent_id", "Parent id", false, optional_id(jtbd.parent_id.as_ref())),
                    field("category", "Category", false, jtbd.category.clone().unwrap_or_default()),
                    field("research_id", "Research id", false, optional_id(jtbd.research_id.as_ref())),
                ]
            }
            _ => return None,
        };
        Some(Self { table, mode: FormMode::Edit(record.clone()), fields, focus: 0, error: None })
    }

    pub(super) fn title(&self) -> String {
        match &self.mode {
            FormMode::Create => format!("New {}", record_noun(self.table)),
            FormMode::Edit(record) => format!("Edit {record}"),
        }
    }

    pub(super) fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len().max(1);
    }

    pub(super) fn focus_prev(&mut self) {
        let len = self.fields.len().max(1);
        self.focus = (self.focus + len - 1) % len;
    }

    pub(super) fn push_char(&mut self, ch: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(ch);
        }
        self.error = None;
    }

    pub(super) fn pop_char(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
        self.error = None;
    }

    pub(super) fn focused_value(&self) -> &str {
        self.fields.get(self.focus).map_or("", |field| field.value.as_str())
    }

    fn value(&self, key: &str) -> &str {
        self.fields.iter().find(|field| field.key == key).map_or("", |field| field.value.trim())
    }

    fn label(&self, key: &'static str) -> &'static str {
        self.fields.iter().find(|field| field.key == key).map_or(key, |field| field.label)
    }

    fn check_required(&self) -> Result<(), FormError> {
        match self.fields.iter().find(|field| field.required && field.value.trim().is_empty()) {
            Some(field) => Err(FormError::Required { label: field.label }),
            None => Ok(()),
        }
    }

    fn date(&self, key: &'static str) -> Result<NaiveDate, FormError> {
        NaiveDate::parse_from_str(self.value(key), "%Y-%m-%d").map_err(|_| FormError::Invalid {
            label: self.label(key),
            reason: "expected YYYY-MM-DD".to_owned(),
        })
    }

    fn optional_text(&self, key: &str) -> Option<String> {
        Some(self.value(key)).filter(|value| !value.is_empty()).map(str::to_owned)
    }

    fn optional_id<T>(&self, key: &'static str) -> Result<Option<Id<T>>, FormError> {
        let value = self.value(key);
        if value.is_empty() {
            return Ok(None);
        }
        Id::new(value.to_owned())
            .map(Some)
            .map_err(|err| FormError::Invalid { label: self.label(key), reason: err.to_string() })
    }

    fn choice<T>(
        &self,
        key: &'static str,
        parse: impl Fn(&str) -> Option<T>,
        options: impl IntoIterator<Item = &'static str>,
    ) -> Result<T, FormError> {
        parse(self.value(key)).ok_or_else(|| FormError::Invalid {
            label: self.label(key),
            reason: format!("one of {}", options.into_iter().collect::<Vec<_>>().join(", ")),
        })
    }

    fn team(&self) -> Vec<String> {
        self.value("team")
            .split(',')
            .map(str::trim)
            .filter(|member| !member.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Parses the fields into the op that creates or updates the record.
    pub(super) fn to_op(&self, workspace: &Workspace) -> Result<Op, FormError> {
        self.check_required()?;
        match self.table {
            TableKind::Research => self.research_op(workspace),
            TableKind::Meetings => self.meeting_op(workspace),
            TableKind::Jtbd => self.jtbd_op(workspace),
            TableKind::Attachments => Err(FormError::Unsupported(self.table)),
        }
    }

    fn research_op(&self, workspace: &Workspace) -> Result<Op, FormError> {
        let start_date = self.date("start_date")?;
        let end_date = self.date("end_date")?;
        let status = self.choice(
            "status",
            ResearchStatus::parse,
            ResearchStatus::ALL.map(ResearchStatus::as_str),
        )?;
        let op = match &self.mode {
            FormMode::Create => {
                let research_id: ResearchId =
                    allocate_id("r", |candidate| workspace.researches().contains_key(candidate));
                let mut research = Research::new(research_id, self.value("name"), start_date, end_date);
                research.status = status;
                research.team = self.team();
                research.customer = self.optional_text("customer");
                ResearchOp::Create { research }
            }
            FormMode::Edit(record) => ResearchOp::Update {
                research_id: self.existing_id(workspace.researches().contains_key(record.id()), record)?,
                patch: ResearchPatch {
                    name: Some(self.value("name").to_owned()),
                    team: Some(self.team()),
                    status: Some(status),
                    start_date: Some(start_date),
                    end_date: Some(end_date),
                    customer: Some(self.optional_text("customer")),
                    ..ResearchPatch::default()
                },
            },
        };
        Ok(Op::Research(op))
    }

    fn meeting_op(&self, workspace: &Workspace) -> Result<Op, FormError> {
        let date = self.date("date")?;
        let research_id: Option<ResearchId> = self.optional_id("research_id")?;
        let status =
            self.choice("status", MeetingStatus::parse, MeetingStatus::ALL.map(MeetingStatus::as_str))?;
        let op = match &self.mode {
            FormMode::Create => {
                let meeting_id: MeetingId =
                    allocate_id("m", |candidate| workspace.meetings().contains_key(candidate));
                let mut meeting =
                    Meeting::new(meeting_id, self.value("title"), self.value("respondent_name"), date);
                meeting.respondent_position = self.value("respondent_position").to_owned();
                meeting.company = self.value("company").to_owned();
                meeting.research_id = research_id;
                meeting.status = status;
                MeetingOp::Create { meeting }
            }
            FormMode::Edit(record) => MeetingOp::Update {
                meeting_id: self.existing_id(workspace.meetings().contains_key(record.id()), record)?,
                patch: MeetingPatch {
                    research_id: Some(research_id),
                    title: Some(self.value("title").to_owned()),
                    respondent_name: Some(self.value("respondent_name").to_owned()),
                    respondent_position: Some(self.value("respondent_position").to_owned()),
                    company: Some(self.value("company").to_owned()),
                    date: Some(date),
                    status: Some(status),
                    notes: None,
                },
            },
        };
        Ok(Op::Meeting(op))
    }

    fn jtbd_op(&self, workspace: &Workspace) -> Result<Op, FormError> {
        let priority = self.choice("priority", Priority::parse, Priority::ALL.map(Priority::as_str))?;
        let parent_id: Option<JtbdId> = self.optional_id("parent_id")?;
        let research_id: Option<ResearchId> = self.optional_id("research_id")?;
        let op = match &self.mode {
            FormMode::Create => {
                let jtbd_id: JtbdId =
                    allocate_id("j", |candidate| workspace.jtbds().contains_key(candidate));
                let mut jtbd = Jtbd::new(jtbd_id, self.value("title"));
                jtbd.priority = priority;
                jtbd.parent_id = parent_id;
                jtbd.category = self.optional_text("category");
                jtbd.research_id = research_id;
                JtbdOp::Create { jtbd }
            }
            FormMode::Edit(record) => JtbdOp::Update {
                jtbd_id: self.existing_id(workspace.jtbds().contains_key(record.id()), record)?,
                patch: JtbdPatch {
                    title: Some(self.value("title").to_owned()),
                    parent_id: Some(parent_id),
                    priority: Some(priority),
                    category: Some(self.optional_text("category")),
                    research_id: Some(research_id),
                    ..JtbdPatch::default()
                },
            },
        };
        Ok(Op::Jtbd(op))
    }

    fn existing_id<T>(&self, exists: bool, record: &RecordRef) -> Result<Id<T>, FormError> {
        if !exists {
            return Err(FormError::Gone(record.clone()));
        }
        Ok(record.typed_id())
    }
}

fn record_noun(table: TableKind) -> &'static str {
    match table {
        TableKind::Research => "research",
        TableKind::Meetings => "meeting",
        TableKind::Jtbd => "job",
        TableKind::Attachments => "attachment",
    }
}
