// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation operations for workspaces: the CRUD calls behind every form.
//!
//! Operations are applied with optimistic concurrency (revision checks) and produce a minimal
//! delta that the UI can use to refresh derived state.

use std::collections::HashSet;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::annotate::{validate_selection, AnnotationError, AnnotationSink};
use crate::guide::{apply_guide_ops, GuideError, GuideOp};
use crate::query::filter::check_saved_filter;
use crate::model::{
    Annotation, AnnotationId, Attachment, AttachmentId, ErrorType, FilterId, Guide, GuideId, Jtbd,
    JtbdId, Meeting, MeetingId, MeetingStatus, Priority, RecordKind, RecordRef, Research,
    ResearchId, ResearchStatus, SavedFilter, TranscriptionStatus, TranscriptionTransitionError,
    ValidationError, Workspace,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Research(ResearchOp),
    Meeting(MeetingOp),
    Jtbd(JtbdOp),
    Attachment(AttachmentOp),
    Annotation(AnnotationOp),
    Guide(GuideRecordOp),
    Filter(FilterOp),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResearchOp {
    Create { research: Research },
    Update { research_id: ResearchId, patch: ResearchPatch },
    Delete { research_id: ResearchId },
}

/// Partial update; `None` leaves a field untouched. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResearchPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub team: Option<Vec<String>>,
    pub status: Option<ResearchStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub customer: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeetingOp {
    Create { meeting: Meeting },
    Update { meeting_id: MeetingId, patch: MeetingPatch },
    Delete { meeting_id: MeetingId },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingPatch {
    pub research_id: Option<Option<ResearchId>>,
    pub title: Option<String>,
    pub respondent_name: Option<String>,
    pub respondent_position: Option<String>,
    pub company: Option<String>,
    pub date: Option<NaiveDate>,
    pub status: Option<MeetingStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JtbdOp {
    Create { jtbd: Jtbd },
    Update { jtbd_id: JtbdId, patch: JtbdPatch },
    Delete { jtbd_id: JtbdId },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JtbdPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub parent_id: Option<Option<JtbdId>>,
    pub priority: Option<Priority>,
    pub category: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub research_id: Option<Option<ResearchId>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentOp {
    Create { attachment: Attachment },
    Update { attachment_id: AttachmentId, patch: AttachmentPatch },
    /// Replaces the transcript text. Annotations are not touched here; stale ones are pruned by
    /// the caller through [`crate::annotate::prune_stale_annotations`].
    SetTranscript { attachment_id: AttachmentId, text: Option<String> },
    SetTranscriptionStatus { attachment_id: AttachmentId, status: TranscriptionStatus },
    Delete { attachment_id: AttachmentId },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentPatch {
    pub file_name: Option<String>,
    pub media_type: Option<String>,
    pub size_bytes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationOp {
    Add { annotation: Annotation },
    Update {
        annotation_id: AnnotationId,
        error_type: Option<ErrorType>,
        correction: Option<Option<String>>,
    },
    Remove { annotation_id: AnnotationId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuideRecordOp {
    Create { guide: Guide },
    Update { guide_id: GuideId, name: Option<String>, research_id: Option<Option<ResearchId>> },
    Edit { guide_id: GuideId, ops: Vec<GuideOp> },
    Delete { guide_id: GuideId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOp {
    /// Creates the filter or replaces an existing one with the same id.
    Save { filter: SavedFilter },
    Delete { filter_id: FilterId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub new_rev: u64,
    pub applied: usize,
    pub delta: Delta,
}

/// Minimal delta describing which records changed as the result of applying ops.
///
/// This is intentionally coarse: it reports only added/removed/updated `RecordRef`s.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<RecordRef>,
    pub removed: Vec<RecordRef>,
    pub updated: Vec<RecordRef>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: HashSet<RecordRef>,
    removed: HashSet<RecordRef>,
    updated: HashSet<RecordRef>,
}

impl DeltaBuilder {
    fn record_added(&mut self, record_ref: RecordRef) {
        self.removed.remove(&record_ref);
        self.updated.remove(&record_ref);
        self.added.insert(record_ref);
    }

    fn record_removed(&mut self, record_ref: RecordRef) {
        self.added.remove(&record_ref);
        self.updated.remove(&record_ref);
        self.removed.insert(record_ref);
    }

    fn record_updated(&mut self, record_ref: RecordRef) {
        if self.added.contains(&record_ref) || self.removed.contains(&record_ref) {
            return;
        }
        self.updated.insert(record_ref);
    }

    fn finish(self) -> Delta {
        let mut added = self.added.into_iter().collect::<Vec<_>>();
        let mut removed = self.removed.into_iter().collect::<Vec<_>>();
        let mut updated = self.updated.into_iter().collect::<Vec<_>>();

        added.sort();
        removed.sort();
        updated.sort();

        Delta { added, removed, updated }
    }
}

pub fn apply_ops(
    workspace: &mut Workspace,
    base_rev: u64,
    ops: &[Op],
) -> Result<ApplyResult, ApplyError> {
    let current_rev = workspace.rev();
    if base_rev != current_rev {
        return Err(ApplyError::Conflict { base_rev, current_rev });
    }

    if ops.is_empty() {
        return Ok(ApplyResult { new_rev: current_rev, applied: 0, delta: Delta::default() });
    }

    let mut candidate = workspace.clone();
    let mut delta = DeltaBuilder::default();

    for op in ops {
        match op {
            Op::Research(op) => apply_research_op(&mut candidate, op, &mut delta)?,
            Op::Meeting(op) => apply_meeting_op(&mut candidate, op, &mut delta)?,
            Op::Jtbd(op) => apply_jtbd_op(&mut candidate, op, &mut delta)?,
            Op::Attachment(op) => apply_attachment_op(&mut candidate, op, &mut delta)?,
            Op::Annotation(op) => apply_annotation_op(&mut candidate, op, &mut delta)?,
            Op::Guide(op) => apply_guide_record_op(&mut candidate, op, &mut delta)?,
            Op::Filter(op) => apply_filter_op(&mut candidate, op, &mut delta)?,
        }
    }

    candidate.bump_rev();
    let new_rev = candidate.rev();
    *workspace = candidate;

    let delta = delta.finish();
    debug!(
        new_rev,
        applied = ops.len(),
        added = delta.added.len(),
        removed = delta.removed.len(),
        updated = delta.updated.len(),
        "applied workspace ops"
    );
    Ok(ApplyResult { new_rev, applied: ops.len(), delta })
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("stale base_rev (base_rev={base_rev}, current_rev={current_rev})")]
    Conflict { base_rev: u64, current_rev: u64 },
    #[error("record already exists ({record})")]
    AlreadyExists { record: RecordRef },
    #[error("record not found ({record})")]
    NotFound { record: RecordRef },
    #[error("invalid {record}: {source}")]
    Validation {
        record: RecordRef,
        #[source]
        source: ValidationError,
    },
    #[error("{record} references missing {reference}")]
    MissingReference { record: RecordRef, reference: RecordRef },
    #[error("setting parent of {jtbd_id} to {parent_id} would create a cycle")]
    JtbdCycle { jtbd_id: JtbdId, parent_id: JtbdId },
    #[error("attachment {attachment_id}: {source}")]
    Transcription {
        attachment_id: AttachmentId,
        #[source]
        source: TranscriptionTransitionError,
    },
    #[error("annotation {annotation_id}: {source}")]
    Annotation {
        annotation_id: AnnotationId,
        #[source]
        source: AnnotationError,
    },
    #[error("guide {guide_id}: {source}")]
    Guide {
        guide_id: GuideId,
        #[source]
        source: GuideError,
    },
}

/// Deletes annotations from an in-memory workspace, one revision per deletion.
pub struct WorkspaceAnnotationSink<'a> {
    workspace: &'a mut Workspace,
}

impl<'a> WorkspaceAnnotationSink<'a> {
    pub fn new(workspace: &'a mut Workspace) -> Self {
        Self { workspace }
    }
}

impl AnnotationSink for WorkspaceAnnotationSink<'_> {
    type Error = ApplyError;

    fn delete_annotation(&mut self, annotation_id: &AnnotationId) -> Result<(), Self::Error> {
        let base_rev = self.workspace.rev();
        apply_ops(
            self.workspace,
            base_rev,
            &[Op::Annotation(AnnotationOp::Remove { annotation_id: annotation_id.clone() })],
        )
        .map(|_| ())
    }
}

fn research_ref(research_id: &ResearchId) -> RecordRef {
    RecordRef::new(RecordKind::Research, research_id)
}

fn meeting_ref(meeting_id: &MeetingId) -> RecordRef {
    RecordRef::new(RecordKind::Meeting, meeting_id)
}

fn jtbd_ref(jtbd_id: &JtbdId) -> RecordRef {
    RecordRef::new(RecordKind::Jtbd, jtbd_id)
}

fn attachment_ref(attachment_id: &AttachmentId) -> RecordRef {
    RecordRef::new(RecordKind::Attachment, attachment_id)
}

fn annotation_ref(annotation_id: &AnnotationId) -> RecordRef {
    RecordRef::new(RecordKind::Annotation, annotation_id)
}

fn guide_ref(guide_id: &GuideId) -> RecordRef {
    RecordRef::new(RecordKind::Guide, guide_id)
}

fn filter_ref(filter_id: &FilterId) -> RecordRef {
    RecordRef::new(RecordKind::Filter, filter_id)
}

// Extracted op-application implementation for per-record mutations.
include!("ops_impl.rs");

#[cfg(test)]
mod tests;
