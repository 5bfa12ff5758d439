// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::annotation::Annotation;
use super::attachment::Attachment;
use super::filter::SavedFilter;
use super::guide::Guide;
use super::ids::{
    AnnotationId, AttachmentId, FilterId, GuideId, JtbdId, MeetingId, ResearchId, WorkspaceId,
};
use super::jtbd::Jtbd;
use super::meeting::Meeting;
use super::record_ref::{RecordKind, RecordRef};
use super::research::Research;

/// The top-level container the TUI and MCP server run against.
///
/// `rev` is bumped once per successfully applied op batch and is used for optimistic
/// concurrency between the interactive UI and programmatic clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    workspace_id: WorkspaceId,
    rev: u64,
    researches: BTreeMap<ResearchId, Research>,
    meetings: BTreeMap<MeetingId, Meeting>,
    jtbds: BTreeMap<JtbdId, Jtbd>,
    attachments: BTreeMap<AttachmentId, Attachment>,
    annotations: BTreeMap<AnnotationId, Annotation>,
    guides: BTreeMap<GuideId, Guide>,
    filters: BTreeMap<FilterId, SavedFilter>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RecordCounts {
    pub researches: usize,
    pub meetings: usize,
    pub jtbds: usize,
    pub attachments: usize,
    pub annotations: usize,
    pub guides: usize,
    pub filters: usize,
}

impl Workspace {
    pub fn new(workspace_id: WorkspaceId) -> Self {
        Self {
            workspace_id,
            rev: 0,
            researches: BTreeMap::new(),
            meetings: BTreeMap::new(),
            jtbds: BTreeMap::new(),
            attachments: BTreeMap::new(),
            annotations: BTreeMap::new(),
            guides: BTreeMap::new(),
            filters: BTreeMap::new(),
        }
    }

    pub fn workspace_id(&self) -> &WorkspaceId {
        &self.workspace_id
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn set_rev(&mut self, rev: u64) {
        self.rev = rev;
    }

    pub fn bump_rev(&mut self) {
        self.rev = self.rev.wrapping_add(1);
    }

    pub fn researches(&self) -> &BTreeMap<ResearchId, Research> {
        &self.researches
    }

    pub fn researches_mut(&mut self) -> &mut BTreeMap<ResearchId, Research> {
        &mut self.researches
    }

    pub fn meetings(&self) -> &BTreeMap<MeetingId, Meeting> {
        &self.meetings
    }

    pub fn meetings_mut(&mut self) -> &mut BTreeMap<MeetingId, Meeting> {
        &mut self.meetings
    }

    pub fn jtbds(&self) -> &BTreeMap<JtbdId, Jtbd> {
        &self.jtbds
    }

    pub fn jtbds_mut(&mut self) -> &mut BTreeMap<JtbdId, Jtbd> {
        &mut self.jtbds
    }

    pub fn attachments(&self) -> &BTreeMap<AttachmentId, Attachment> {
        &self.attachments
    }

    pub fn attachments_mut(&mut self) -> &mut BTreeMap<AttachmentId, Attachment> {
        &mut self.attachments
    }

    pub fn annotations(&self) -> &BTreeMap<AnnotationId, Annotation> {
        &self.annotations
    }

    pub fn annotations_mut(&mut self) -> &mut BTreeMap<AnnotationId, Annotation> {
        &mut self.annotations
    }

    pub fn guides(&self) -> &BTreeMap<GuideId, Guide> {
        &self.guides
    }

    pub fn guides_mut(&mut self) -> &mut BTreeMap<GuideId, Guide> {
        &mut self.guides
    }

    pub fn filters(&self) -> &BTreeMap<FilterId, SavedFilter> {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut BTreeMap<FilterId, SavedFilter> {
        &mut self.filters
    }

    pub fn meetings_of<'a>(
        &'a self,
        research_id: &'a ResearchId,
    ) -> impl Iterator<Item = &'a Meeting> + 'a {
        self.meetings
            .values()
            .filter(move |meeting| meeting.research_id.as_ref() == Some(research_id))
    }

    pub fn attachments_of<'a>(
        &'a self,
        meeting_id: &'a MeetingId,
    ) -> impl Iterator<Item = &'a Attachment> + 'a {
        self.attachments.values().filter(move |attachment| &attachment.meeting_id == meeting_id)
    }

    /// Annotations over one transcript, ordered by start offset then id.
    pub fn annotations_of(&self, attachment_id: &AttachmentId) -> Vec<&Annotation> {
        let mut out = self
            .annotations
            .values()
            .filter(|annotation| &annotation.attachment_id == attachment_id)
            .collect::<Vec<_>>();
        out.sort_by(|a, b| {
            a.start_offset
                .cmp(&b.start_offset)
                .then_with(|| a.annotation_id.cmp(&b.annotation_id))
        });
        out
    }

    pub fn children_of<'a>(&'a self, parent_id: &'a JtbdId) -> impl Iterator<Item = &'a Jtbd> + 'a {
        self.jtbds.values().filter(move |jtbd| jtbd.parent_id.as_ref() == Some(parent_id))
    }

    pub fn record_exists(&self, record_ref: &RecordRef) -> bool {
        let id = record_ref.id();
        match record_ref.kind() {
            RecordKind::Research => self.researches.contains_key(id),
            RecordKind::Meeting => self.meetings.contains_key(id),
            RecordKind::Jtbd => self.jtbds.contains_key(id),
            RecordKind::Attachment => self.attachments.contains_key(id),
            RecordKind::Annotation => self.annotations.contains_key(id),
            RecordKind::Guide => self.guides.contains_key(id),
            RecordKind::Filter => self.filters.contains_key(id),
        }
    }

    pub fn counts(&self) -> RecordCounts {
        RecordCounts {
            researches: self.researches.len(),
            meetings: self.meetings.len(),
            jtbds: self.jtbds.len(),
            attachments: self.attachments.len(),
            annotations: self.annotations.len(),
            guides: self.guides.len(),
            filters: self.filters.len(),
        }
    }

    /// Whether two workspaces hold the same records, ignoring the revision counter.
    pub fn same_records(&self, other: &Workspace) -> bool {
        self.researches == other.researches
            && self.meetings == other.meetings
            && self.jtbds == other.jtbds
            && self.attachments == other.attachments
            && self.annotations == other.annotations
            && self.guides == other.guides
            && self.filters == other.filters
    }
}
