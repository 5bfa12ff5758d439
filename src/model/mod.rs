// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core record model.
//!
//! A workspace contains research projects, meetings, jobs to be done, attachments with their
//! transcripts and annotations, interview guides and saved filters.

pub mod annotation;
pub mod attachment;
pub(crate) mod fixtures;
pub mod filter;
pub mod guide;
pub mod ids;
pub mod jtbd;
pub mod meeting;
pub mod record_ref;
pub mod research;
pub mod validate;
pub mod workspace;

pub use annotation::{Annotation, ErrorType};
pub use attachment::{Attachment, TranscriptionStatus, TranscriptionTransitionError};
pub use filter::{
    FilterCondition, FilterOperator, SavedFilter, SortDirection, SortSpec, TableKind,
};
pub use fixtures::demo_workspace;
pub use guide::{Guide, GuideBlock, OutlineEntry, OutlineItem, Question};
pub use ids::{
    allocate_id, AnnotationId, AttachmentId, BlockId, FilterId, GuideId, Id, IdError, JtbdId,
    MeetingId, QuestionId, ResearchId, WorkspaceId,
};
pub use jtbd::{Jtbd, Priority};
pub use meeting::{Meeting, MeetingStatus};
pub use record_ref::{ParseRecordRefError, RecordKind, RecordRef};
pub use research::{Research, ResearchStatus};
pub use validate::ValidationError;
pub use workspace::{RecordCounts, Workspace};
