// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::{Json, Parameters};
use rmcp::model::{ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData, ServerHandler, ServiceExt};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::annotate::prune_stale_annotations;
use crate::config::{Config, MAX_ROADMAP_DAYS};
use crate::guide::GuideOp;
use crate::model::{
    Annotation, AttachmentId, FilterId, GuideId, Id, Jtbd, JtbdId, RecordKind, RecordRef,
    TableKind, Workspace,
};
use crate::ops::{
    apply_ops, ApplyError, AttachmentOp, AttachmentPatch, AnnotationOp, Delta, FilterOp,
    GuideRecordOp, JtbdOp, JtbdPatch, MeetingOp, MeetingPatch, Op, ResearchOp, ResearchPatch,
    WorkspaceAnnotationSink,
};
use crate::query::calendar::month_grid;
use crate::query::jtbd::{ancestors, descendants, flatten_tree};
use crate::query::roadmap::RoadmapWindow;
use crate::query::search::{search_records, search_transcripts};
use crate::query::table::{column, query_workspace_table, TableQuery, ViewState, MAX_PAGE_SIZE};
use crate::query::QueryError;
use crate::render::{
    render_calendar_text, render_guide_outline, render_jtbd_tree, render_roadmap_text,
    render_table_page, render_transcript, RenderError,
};
use crate::store::{StoreError, WorkspaceFolder};
use crate::ui::UiState;

use super::types::*;

const DEFAULT_ROADMAP_WIDTH: u64 = 80;
const DEFAULT_SEARCH_LIMIT: u64 = 20;

#[derive(Debug)]
struct McpState {
    workspace: Workspace,
    /// View states for in-memory workspaces; persistent workspaces keep them in the folder.
    views: BTreeMap<TableKind, ViewState>,
}

#[derive(Clone)]
pub struct ParleyMcp {
    state: Arc<Mutex<McpState>>,
    folder: Option<Arc<WorkspaceFolder>>,
    ui_state: Option<Arc<Mutex<UiState>>>,
    config: Config,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ParleyMcp {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            state: Arc::new(Mutex::new(McpState { workspace, views: BTreeMap::new() })),
            folder: None,
            ui_state: None,
            config: Config::default(),
            tool_router: Self::tool_router(),
        }
    }

    pub fn new_persistent(workspace: Workspace, folder: WorkspaceFolder) -> Self {
        Self { folder: Some(Arc::new(folder)), ..Self::new(workspace) }
    }

    pub fn with_ui_state(mut self, ui_state: Arc<Mutex<UiState>>) -> Self {
        self.ui_state = Some(ui_state);
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub async fn serve_stdio(self) -> Result<(), rmcp::RmcpError> {
        let service = self.serve((tokio::io::stdin(), tokio::io::stdout())).await?;
        service.waiting().await?;
        Ok(())
    }

    async fn notify_ui_workspace_changed(&self) {
        if let Some(ui_state) = self.ui_state.as_ref() {
            ui_state.lock().await.bump_workspace_rev();
        }
    }

    async fn read_context(&self) -> ReadContext {
        let mut context =
            ReadContext { human_active_tab: None, human_selected_record: None, ui_rev: None };
        if let Some(ui_state) = self.ui_state.as_ref() {
            let snapshot = ui_state.lock().await.clone();
            context.human_active_tab = Some(snapshot.active_tab());
            context.human_selected_record = snapshot.selected_record().map(ToString::to_string);
            context.ui_rev = Some(snapshot.rev());
        }
        context
    }

    async fn lock_state_synced(&self) -> Result<tokio::sync::MutexGuard<'_, McpState>, ErrorData> {
        let mut state = self.state.lock().await;
        if let Some(folder) = &self.folder {
            let disk = folder.load_workspace().map_err(|err| store_error("load workspace", err))?;
            if disk != state.workspace {
                debug!(disk_rev = disk.rev(), memory_rev = state.workspace.rev(), "reloading workspace from disk");
                state.workspace = disk;
            }
        }
        Ok(state)
    }

    /// Persists `candidate` (when backed by a folder) and then swaps it in.
    fn commit(&self, state: &mut McpState, candidate: Workspace) -> Result<(), ErrorData> {
        if let Some(folder) = &self.folder {
            folder.save_workspace(&candidate).map_err(|err| store_error("persist workspace", err))?;
        }
        state.workspace = candidate;
        Ok(())
    }

    fn view_for(&self, state: &mut McpState, table: TableKind) -> ViewState {
        match &self.folder {
            Some(folder) => folder.load_view_state(table, self.config.page_size),
            None => state
                .views
                .entry(table)
                .or_insert_with(|| ViewState::default_for(table, self.config.page_size))
                .clone(),
        }
    }

    fn store_view(&self, state: &mut McpState, view: ViewState) -> Result<(), ErrorData> {
        if let Some(folder) = &self.folder {
            folder.save_view_state(&view).map_err(|err| store_error("persist view state", err))?;
        }
        state.views.insert(view.table, view);
        Ok(())
    }

    /// Workspace id, revision and record counts; call first and keep `rev` as `base_rev` for
    /// writes.
    #[tool(name = "workspace.stat")]
    async fn workspace_stat(&self) -> Result<Json<WorkspaceStatResponse>, ErrorData> {
        let state = self.lock_state_synced().await?;
        let workspace_id = state.workspace.workspace_id().as_str().to_owned();
        let rev = state.workspace.rev();
        let counts = state.workspace.counts();
        drop(state);
        let context = self.read_context().await;
        Ok(Json(WorkspaceStatResponse { workspace_id, rev, counts, context }))
    }

    /// Storage health: whether the workspace is persisted and whether its folder is reachable and
    /// writable.
    #[tool(name = "status.read")]
    async fn status_read(&self) -> Result<Json<StatusReadResponse>, ErrorData> {
        let rev = self.state.lock().await.workspace.rev();
        let store = self.folder.as_ref().map(|folder| folder.status());
        Ok(Json(StatusReadResponse { persistent: self.folder.is_some(), rev, store }))
    }

    /// List records of one kind, optionally only those linked to `parent` (`<kind>/<id>`).
    #[tool(name = "records.list")]
    async fn records_list(
        &self,
        params: Parameters<RecordsListParams>,
    ) -> Result<Json<RecordsListResponse>, ErrorData> {
        let RecordsListParams { kind, parent, limit } = params.0;
        let parent = parent.as_deref().map(parse_record_ref).transpose()?;
        let state = self.lock_state_synced().await?;
        let mut records = record_summaries(&state.workspace, kind, parent.as_ref())?;
        let total = records.len() as u64;
        if let Some(limit) = to_index(limit) {
            records.truncate(limit);
        }
        Ok(Json(RecordsListResponse { rev: state.workspace.rev(), records, total }))
    }

    /// Read one record as JSON by reference (`<kind>/<id>`).
    #[tool(name = "record.read")]
    async fn record_read(
        &self,
        params: Parameters<RecordReadParams>,
    ) -> Result<Json<RecordReadResponse>, ErrorData> {
        let record = parse_record_ref(&params.0.record)?;
        let state = self.lock_state_synced().await?;
        let value = record_value(&state.workspace, &record)
            .map_err(|err| {
                ErrorData::internal_error(format!("failed to serialize record: {err}"), None)
            })?
            .ok_or_else(|| {
                ErrorData::resource_not_found(
                    "record not found",
                    Some(serde_json::json!({ "record": record.to_string() })),
                )
            })?;
        Ok(Json(RecordReadResponse {
            rev: state.workspace.rev(),
            record: record.to_string(),
            value,
        }))
    }

    /// Apply create/update/delete ops atomically, gated by `base_rev`; prefer
    /// `workspace.propose_ops` first.
    #[tool(name = "workspace.apply_ops")]
    async fn workspace_apply_ops(
        &self,
        params: Parameters<ApplyOpsParams>,
    ) -> Result<Json<ApplyOpsResponse>, ErrorData> {
        let ops = params.0.ops.iter().map(mcp_op_to_internal).collect::<Result<Vec<_>, _>>()?;
        let base_rev = params.0.base_rev;

        let mut state = self.lock_state_synced().await?;
        let mut candidate = state.workspace.clone();
        let result = apply_ops(&mut candidate, base_rev, &ops).map_err(map_apply_error)?;
        self.commit(&mut state, candidate)?;
        drop(state);

        info!(base_rev, new_rev = result.new_rev, applied = result.applied, "applied ops");
        self.notify_ui_workspace_changed().await;
        Ok(Json(ApplyOpsResponse {
            new_rev: result.new_rev,
            applied: result.applied as u64,
            delta: delta_summary(&result.delta),
        }))
    }

    /// Validate ops against `base_rev` and return the predicted delta without mutating anything.
    #[tool(name = "workspace.propose_ops")]
    async fn workspace_propose_ops(
        &self,
        params: Parameters<ProposeOpsParams>,
    ) -> Result<Json<ProposeOpsResponse>, ErrorData> {
        let ops = params.0.ops.iter().map(mcp_op_to_internal).collect::<Result<Vec<_>, _>>()?;
        let state = self.lock_state_synced().await?;
        let mut candidate = state.workspace.clone();
        drop(state);
        let result = apply_ops(&mut candidate, params.0.base_rev, &ops).map_err(map_apply_error)?;
        Ok(Json(ProposeOpsResponse {
            new_rev: result.new_rev,
            applied: result.applied as u64,
            delta: delta_summary(&result.delta),
        }))
    }

    /// Transcript text of an attachment with its annotations and an annotated rendering.
    #[tool(name = "transcript.read")]
    async fn transcript_read(
        &self,
        params: Parameters<TranscriptReadParams>,
    ) -> Result<Json<TranscriptReadResponse>, ErrorData> {
        let attachment_id: AttachmentId = parse_id("attachment_id", &params.0.attachment_id)?;
        let state = self.lock_state_synced().await?;
        let attachment = state.workspace.attachments().get(&attachment_id).ok_or_else(|| {
            ErrorData::resource_not_found(
                "attachment not found",
                Some(serde_json::json!({ "attachment_id": attachment_id.as_str() })),
            )
        })?;
        let annotations = state.workspace.annotations_of(&attachment_id);
        let rendered = render_transcript(attachment.transcript_text(), annotations.iter().copied());
        Ok(Json(TranscriptReadResponse {
            rev: state.workspace.rev(),
            attachment_id: attachment_id.as_str().to_owned(),
            transcription_status: attachment.transcription_status.clone(),
            text: attachment.transcript.clone(),
            annotations: annotations.into_iter().cloned().collect(),
            rendered,
        }))
    }

    /// Replace a transcript and delete every annotation whose range no longer matches the new
    /// text. Deletions that fail are reported, not rolled back.
    #[tool(name = "transcript.update")]
    async fn transcript_update(
        &self,
        params: Parameters<TranscriptUpdateParams>,
    ) -> Result<Json<TranscriptUpdateResponse>, ErrorData> {
        let TranscriptUpdateParams { base_rev, attachment_id, text } = params.0;
        let attachment_id: AttachmentId = parse_id("attachment_id", &attachment_id)?;

        let mut state = self.lock_state_synced().await?;
        let mut candidate = state.workspace.clone();
        let set_text =
            Op::Attachment(AttachmentOp::SetTranscript { attachment_id: attachment_id.clone(), text });
        apply_ops(&mut candidate, base_rev, &[set_text]).map_err(map_apply_error)?;

        let text = candidate
            .attachments()
            .get(&attachment_id)
            .map(|attachment| attachment.transcript_text().to_owned())
            .unwrap_or_default();
        let annotations: Vec<Annotation> =
            candidate.annotations_of(&attachment_id).into_iter().cloned().collect();
        let report = prune_stale_annotations(
            &text,
            &annotations,
            &mut WorkspaceAnnotationSink::new(&mut candidate),
        );
        for (annotation_id, error) in &report.failed {
            warn!(annotation_id = %annotation_id, error = %error, "failed to prune stale annotation");
        }

        self.commit(&mut state, candidate)?;
        let new_rev = state.workspace.rev();
        drop(state);

        info!(
            attachment_id = %attachment_id,
            removed = report.removed.len(),
            failed = report.failed.len(),
            "updated transcript"
        );
        self.notify_ui_workspace_changed().await;
        Ok(Json(TranscriptUpdateResponse {
            new_rev,
            removed_annotations: report.removed.iter().map(ToString::to_string).collect(),
            failed_annotations: report
                .failed
                .iter()
                .map(|(annotation_id, error)| PruneFailure {
                    annotation_id: annotation_id.to_string(),
                    error: error.clone(),
                })
                .collect(),
        }))
    }

    /// Filter, search, sort and paginate a table. Unset sort and page size fall back to the
    /// table's saved view state.
    #[tool(name = "table.query")]
    async fn table_query(
        &self,
        params: Parameters<TableQueryParams>,
    ) -> Result<Json<TableQueryResponse>, ErrorData> {
        let TableQueryParams { table, conditions, search, sort, page, page_size } = params.0;
        let mut state = self.lock_state_synced().await?;
        let mut view = self.view_for(&mut state, table);
        if let Some(sort) = sort {
            view.sort = sort;
        }
        if let Some(page_size) = to_index(page_size) {
            view.page_size = page_size.max(1);
        }
        let query = view.query(conditions.unwrap_or_default(), search, to_index(page).unwrap_or(0));
        let result =
            query_workspace_table(&state.workspace, table, &query).map_err(map_query_error)?;
        let text = render_table_page(&view, &result);
        Ok(Json(TableQueryResponse {
            rev: state.workspace.rev(),
            table,
            columns: view.visible_columns().into_iter().map(str::to_owned).collect(),
            rows: result.rows,
            total: result.total as u64,
            page: result.page as u64,
            page_count: result.page_count as u64,
            page_size: result.page_size as u64,
            text,
        }))
    }

    /// Saved column order, visibility, sort and page size of a table.
    #[tool(name = "view.read")]
    async fn view_read(
        &self,
        params: Parameters<ViewReadParams>,
    ) -> Result<Json<ViewResponse>, ErrorData> {
        let mut state = self.state.lock().await;
        let view = self.view_for(&mut state, params.0.table);
        Ok(Json(ViewResponse { view }))
    }

    /// Change a table's view state. Steps run in order: reset, toggle, move, cycle sort, replace
    /// sort, page size.
    #[tool(name = "view.update")]
    async fn view_update(
        &self,
        params: Parameters<ViewUpdateParams>,
    ) -> Result<Json<ViewResponse>, ErrorData> {
        let ViewUpdateParams { table, reset, toggle_column, move_column, cycle_sort, sort, page_size } =
            params.0;
        let mut state = self.state.lock().await;
        let mut view = self.view_for(&mut state, table);

        if reset == Some(true) {
            view.reset();
        }
        if let Some(key) = toggle_column.as_deref() {
            view.toggle_column(key).map_err(map_query_error)?;
        }
        if let Some(MoveColumnParams { column, index }) = move_column {
            let index = to_index(Some(index)).unwrap_or(usize::MAX);
            view.move_column(&column, index).map_err(map_query_error)?;
        }
        if let Some(key) = cycle_sort.as_deref() {
            view.cycle_sort(key).map_err(map_query_error)?;
        }
        if let Some(sort) = sort {
            if let Some(unknown) = sort.iter().find(|spec| column(table, &spec.column).is_none()) {
                return Err(map_query_error(QueryError::UnknownColumn {
                    table,
                    column: unknown.column.to_string(),
                }));
            }
            view.sort = sort;
        }
        if let Some(page_size) = to_index(page_size) {
            view.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        }

        self.store_view(&mut state, view.clone())?;
        debug!(table = %table, "updated view state");
        Ok(Json(ViewResponse { view }))
    }

    /// Run a saved filter against its table.
    #[tool(name = "filter.apply")]
    async fn filter_apply(
        &self,
        params: Parameters<FilterApplyParams>,
    ) -> Result<Json<TableQueryResponse>, ErrorData> {
        let FilterApplyParams { filter_id, search, page } = params.0;
        let filter_id: FilterId = parse_id("filter_id", &filter_id)?;
        let mut state = self.lock_state_synced().await?;
        let filter = state.workspace.filters().get(&filter_id).cloned().ok_or_else(|| {
            ErrorData::resource_not_found(
                "filter not found",
                Some(serde_json::json!({ "filter_id": filter_id.as_str() })),
            )
        })?;

        let mut view = self.view_for(&mut state, filter.table);
        let mut query = TableQuery::from_saved(&filter, view.page_size);
        if query.sort.is_empty() {
            query.sort = view.sort.clone();
        }
        query.search = search;
        query.page = to_index(page).unwrap_or(0);
        view.sort = query.sort.clone();

        let result = query_workspace_table(&state.workspace, filter.table, &query)
            .map_err(map_query_error)?;
        let text = render_table_page(&view, &result);
        Ok(Json(TableQueryResponse {
            rev: state.workspace.rev(),
            table: filter.table,
            columns: view.visible_columns().into_iter().map(str::to_owned).collect(),
            rows: result.rows,
            total: result.total as u64,
            page: result.page as u64,
            page_count: result.page_count as u64,
            page_size: result.page_size as u64,
            text,
        }))
    }

    /// Interview guide as an indented outline of blocks and questions.
    #[tool(name = "guide.render_text")]
    async fn guide_render_text(
        &self,
        params: Parameters<GuideRenderParams>,
    ) -> Result<Json<TextResponse>, ErrorData> {
        let guide_id: GuideId = parse_id("guide_id", &params.0.guide_id)?;
        let state = self.lock_state_synced().await?;
        let guide = state.workspace.guides().get(&guide_id).ok_or_else(|| {
            ErrorData::resource_not_found(
                "guide not found",
                Some(serde_json::json!({ "guide_id": guide_id.as_str() })),
            )
        })?;
        Ok(Json(TextResponse { rev: state.workspace.rev(), text: render_guide_outline(guide) }))
    }

    /// JTBD hierarchy, either the whole forest or the subtree under `root_id`.
    #[tool(name = "jtbd.tree")]
    async fn jtbd_tree(
        &self,
        params: Parameters<JtbdTreeParams>,
    ) -> Result<Json<JtbdTreeResponse>, ErrorData> {
        let root_id: Option<JtbdId> =
            params.0.root_id.as_deref().map(|raw| parse_id("root_id", raw)).transpose()?;
        let state = self.lock_state_synced().await?;
        let workspace = &state.workspace;

        let (items, text) = match root_id {
            None => {
                let items = flatten_tree(workspace)
                    .into_iter()
                    .map(|entry| jtbd_item(entry.depth, entry.jtbd))
                    .collect::<Vec<_>>();
                (items, render_jtbd_tree(workspace))
            }
            Some(root_id) => {
                let root = workspace.jtbds().get(&root_id).ok_or_else(|| {
                    ErrorData::resource_not_found(
                        "jtbd not found",
                        Some(serde_json::json!({ "jtbd_id": root_id.as_str() })),
                    )
                })?;
                let root_depth = ancestors(workspace, &root_id).len();
                let mut items = vec![jtbd_item(0, root)];
                items.extend(descendants(workspace, &root_id).into_iter().map(|jtbd| {
                    let depth = ancestors(workspace, &jtbd.jtbd_id).len().saturating_sub(root_depth);
                    jtbd_item(depth, jtbd)
                }));
                let text = items
                    .iter()
                    .map(|item| {
                        format!(
                            "{}{} [{}] {}\n",
                            "  ".repeat(item.depth as usize),
                            item.title,
                            item.jtbd_id,
                            item.priority.as_str()
                        )
                    })
                    .collect::<String>();
                (items, text)
            }
        };
        Ok(Json(JtbdTreeResponse { rev: workspace.rev(), items, text }))
    }

    /// Research timeline as text bars. `start` defaults to the earliest research start.
    #[tool(name = "roadmap.render_text")]
    async fn roadmap_render_text(
        &self,
        params: Parameters<RoadmapRenderParams>,
    ) -> Result<Json<TextResponse>, ErrorData> {
        let RoadmapRenderParams { start, days, width } = params.0;
        let state = self.lock_state_synced().await?;
        let start = start
            .or_else(|| state.workspace.researches().values().map(|research| research.start_date).min())
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let days = days.unwrap_or(self.config.roadmap_days).clamp(1, MAX_ROADMAP_DAYS);
        let width = to_index(Some(width.unwrap_or(DEFAULT_ROADMAP_WIDTH))).unwrap_or(usize::MAX);

        let window = RoadmapWindow::new(start, days);
        let text =
            render_roadmap_text(&state.workspace, &window, width).map_err(map_render_error)?;
        Ok(Json(TextResponse { rev: state.workspace.rev(), text }))
    }

    /// Month calendar with the meetings scheduled on each day.
    #[tool(name = "calendar.render_text")]
    async fn calendar_render_text(
        &self,
        params: Parameters<CalendarRenderParams>,
    ) -> Result<Json<TextResponse>, ErrorData> {
        let CalendarRenderParams { year, month, week_start } = params.0;
        let state = self.lock_state_synced().await?;
        let grid = month_grid(
            &state.workspace,
            year,
            month,
            week_start.unwrap_or(self.config.week_start),
        )
        .map_err(map_query_error)?;
        let text = render_calendar_text(&state.workspace, &grid).map_err(map_render_error)?;
        Ok(Json(TextResponse { rev: state.workspace.rev(), text }))
    }

    /// Search record labels (substring or fuzzy) and optionally transcript text.
    #[tool(name = "search")]
    async fn search(&self, params: Parameters<SearchParams>) -> Result<Json<SearchResponse>, ErrorData> {
        let SearchParams { query, mode, limit, include_transcripts } = params.0;
        let limit = to_index(Some(limit.unwrap_or(DEFAULT_SEARCH_LIMIT))).unwrap_or(usize::MAX);
        let state = self.lock_state_synced().await?;
        let hits = search_records(&state.workspace, &query, mode.unwrap_or_default(), limit);
        let transcript_matches = if include_transcripts == Some(true) {
            search_transcripts(&state.workspace, &query)
        } else {
            Vec::new()
        };
        Ok(Json(SearchResponse { rev: state.workspace.rev(), hits, transcript_matches }))
    }
}

fn jtbd_item(depth: usize, jtbd: &Jtbd) -> JtbdTreeItem {
    JtbdTreeItem {
        depth: depth as u64,
        jtbd_id: jtbd.jtbd_id.as_str().to_owned(),
        title: jtbd.title.clone(),
        priority: jtbd.priority,
        parent_id: jtbd.parent_id.as_ref().map(|id| id.as_str().to_owned()),
    }
}

#[tool_handler]
impl ServerHandler for ParleyMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Parley research workspace server (tools: workspace.stat, status.read, records.list, record.read, workspace.apply_ops, workspace.propose_ops, transcript.read, transcript.update, table.query, view.read, view.update, filter.apply, guide.render_text, jtbd.tree, roadmap.render_text, calendar.render_text, search)"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// Extracted mapping/parsing helpers for MCP tool handlers.
include!("server/helpers.rs");

#[cfg(test)]
mod tests;
