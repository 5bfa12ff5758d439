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

use crate::model::{
    Annotation, Attachment, ErrorType, FilterCondition, Guide, Jtbd, Meeting, MeetingStatus,
    Priority, RecordCounts, RecordKind, Research, ResearchStatus, SavedFilter, SortSpec, TableKind,
    TranscriptionStatus,
};
use crate::query::calendar::WeekStart;
use crate::query::search::{SearchHit, SearchMode, TranscriptMatch};
use crate::query::table::{RowView, ViewState};
use crate::store::WorkspaceStatus;
use crate::ui::Tab;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReadContext {
    pub human_active_tab: Option<Tab>,
    pub human_selected_record: Option<String>,
    pub ui_rev: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkspaceStatResponse {
    pub workspace_id: String,
    pub rev: u64,
    pub counts: RecordCounts,
    pub context: ReadContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StatusReadResponse {
    pub persistent: bool,
    pub rev: u64,
    /// Folder health; absent for in-memory workspaces.
    pub store: Option<WorkspaceStatus>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecordsListParams {
    pub kind: RecordKind,
    /// Only records linked to this parent (`research/<id>`, `meeting/<id>`, `attachment/<id>` or
    /// `jtbd/<id>`).
    pub parent: Option<String>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecordSummary {
    pub record: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecordsListResponse {
    pub rev: u64,
    pub records: Vec<RecordSummary>,
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecordReadParams {
    /// `<kind>/<id>`, e.g. `meeting/m:1`.
    pub record: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecordReadResponse {
    pub rev: u64,
    pub record: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeltaSummary {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub updated: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ApplyOpsParams {
    pub base_rev: u64,
    pub ops: Vec<McpOp>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ApplyOpsResponse {
    pub new_rev: u64,
    pub applied: u64,
    pub delta: DeltaSummary,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ProposeOpsParams {
    pub base_rev: u64,
    pub ops: Vec<McpOp>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProposeOpsResponse {
    pub new_rev: u64,
    pub applied: u64,
    pub delta: DeltaSummary,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TranscriptReadParams {
    pub attachment_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptReadResponse {
    pub rev: u64,
    pub attachment_id: String,
    pub transcription_status: TranscriptionStatus,
    pub text: Option<String>,
    pub annotations: Vec<Annotation>,
    /// Transcript with `«…»[n]` markers and numbered notes.
    pub rendered: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TranscriptUpdateParams {
    pub base_rev: u64,
    pub attachment_id: String,
    /// New transcript text; `null` clears it.
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PruneFailure {
    pub annotation_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptUpdateResponse {
    pub new_rev: u64,
    pub removed_annotations: Vec<String>,
    pub failed_annotations: Vec<PruneFailure>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TableQueryParams {
    pub table: TableKind,
    pub conditions: Option<Vec<FilterCondition>>,
    pub search: Option<String>,
    /// Overrides the persisted view's sort.
    pub sort: Option<Vec<SortSpec>>,
    /// Zero-based page; out-of-range pages clamp to the last page.
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TableQueryResponse {
    pub rev: u64,
    pub table: TableKind,
    /// Visible column keys, in view order.
    pub columns: Vec<String>,
    pub rows: Vec<RowView>,
    pub total: u64,
    pub page: u64,
    pub page_count: u64,
    pub page_size: u64,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ViewReadParams {
    pub table: TableKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ViewResponse {
    pub view: ViewState,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct MoveColumnParams {
    pub column: String,
    pub index: u64,
}

/// View edits, applied in field order: reset, toggle, move, sort, page size.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ViewUpdateParams {
    pub table: TableKind,
    pub reset: Option<bool>,
    pub toggle_column: Option<String>,
    pub move_column: Option<MoveColumnParams>,
    /// Cycles the column's sort: ascending, descending, off.
    pub cycle_sort: Option<String>,
    pub sort: Option<Vec<SortSpec>>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FilterApplyParams {
    pub filter_id: String,
    pub search: Option<String>,
    pub page: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GuideRenderParams {
    pub guide_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TextResponse {
    pub rev: u64,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct JtbdTreeParams {
    /// Limit the tree to this JTBD and its descendants.
    pub root_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JtbdTreeItem {
    pub depth: u64,
    pub jtbd_id: String,
    pub title: String,
    pub priority: Priority,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JtbdTreeResponse {
    pub rev: u64,
    pub items: Vec<JtbdTreeItem>,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RoadmapRenderParams {
    /// First day of the window (`YYYY-MM-DD`); defaults to the earliest research start.
    pub start: Option<NaiveDate>,
    pub days: Option<u32>,
    /// Track width in cells.
    pub width: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CalendarRenderParams {
    pub year: i32,
    pub month: u32,
    pub week_start: Option<WeekStart>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchParams {
    pub query: String,
    pub mode: Option<SearchMode>,
    pub limit: Option<u64>,
    /// Also return character offsets of matches inside transcripts.
    pub include_transcripts: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchResponse {
    pub rev: u64,
    pub hits: Vec<SearchHit>,
    pub transcript_matches: Vec<TranscriptMatch>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum McpGuideOp {
    AddBlock {
        parent_id: Option<String>,
        block_id: String,
        name: String,
        index: Option<u64>,
    },
    RenameBlock {
        block_id: String,
        name: String,
    },
    RemoveBlock {
        block_id: String,
    },
    MoveBlock {
        block_id: String,
        new_parent_id: Option<String>,
        index: Option<u64>,
    },
    AddQuestion {
        block_id: String,
        question_id: String,
        text: String,
        index: Option<u64>,
    },
    UpdateQuestion {
        question_id: String,
        text: String,
    },
    RemoveQuestion {
        question_id: String,
    },
    MoveQuestion {
        question_id: String,
        to_block_id: String,
        index: Option<u64>,
    },
}

/// One mutation. Update ops only touch the fields that are set; `clear_*` flags reset optional
/// links and values.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum McpOp {
    ResearchCreate {
        research: Research,
    },
    ResearchUpdate {
        research_id: String,
        name: Option<String>,
        description: Option<String>,
        team: Option<Vec<String>>,
        status: Option<ResearchStatus>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        customer: Option<String>,
        clear_customer: Option<bool>,
    },
    ResearchDelete {
        research_id: String,
    },
    MeetingCreate {
        meeting: Meeting,
    },
    MeetingUpdate {
        meeting_id: String,
        research_id: Option<String>,
        clear_research: Option<bool>,
        title: Option<String>,
        respondent_name: Option<String>,
        respondent_position: Option<String>,
        company: Option<String>,
        date: Option<NaiveDate>,
        status: Option<MeetingStatus>,
        notes: Option<String>,
    },
    MeetingDelete {
        meeting_id: String,
    },
    JtbdCreate {
        jtbd: Jtbd,
    },
    JtbdUpdate {
        jtbd_id: String,
        title: Option<String>,
        description: Option<String>,
        parent_id: Option<String>,
        clear_parent: Option<bool>,
        priority: Option<Priority>,
        category: Option<String>,
        clear_category: Option<bool>,
        tags: Option<Vec<String>>,
        research_id: Option<String>,
        clear_research: Option<bool>,
    },
    JtbdDelete {
        jtbd_id: String,
    },
    AttachmentCreate {
        attachment: Attachment,
    },
    AttachmentUpdate {
        attachment_id: String,
        file_name: Option<String>,
        media_type: Option<String>,
        size_bytes: Option<u64>,
    },
    AttachmentSetTranscriptionStatus {
        attachment_id: String,
        status: TranscriptionStatus,
    },
    AttachmentDelete {
        attachment_id: String,
    },
    AnnotationAdd {
        annotation: Annotation,
    },
    AnnotationUpdate {
        annotation_id: String,
        error_type: Option<ErrorType>,
        correction: Option<String>,
        clear_correction: Option<bool>,
    },
    AnnotationRemove {
        annotation_id: String,
    },
    GuideCreate {
        guide: Guide,
    },
    GuideUpdate {
        guide_id: String,
        name: Option<String>,
        research_id: Option<String>,
        clear_research: Option<bool>,
    },
    GuideEdit {
        guide_id: String,
        ops: Vec<McpGuideOp>,
    },
    GuideDelete {
        guide_id: String,
    },
    FilterSave {
        filter: SavedFilter,
    },
    FilterDelete {
        filter_id: String,
    },
}
