// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::model::{demo_workspace, MeetingId};
use crate::ui::Tab;

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: std::path::PathBuf,
}

impl TempDir {
    fn new(test_name: &str) -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};

        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = std::env::temp_dir();
        path.push(format!("parley-mcp-{test_name}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).expect("create temp dir");
        Self { path }
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

fn demo_server() -> ParleyMcp {
    ParleyMcp::new(demo_workspace())
}

fn rename_meeting(meeting_id: &str, title: &str) -> McpOp {
    McpOp::MeetingUpdate {
        meeting_id: meeting_id.to_owned(),
        research_id: None,
        clear_research: None,
        title: Some(title.to_owned()),
        respondent_name: None,
        respondent_position: None,
        company: None,
        date: None,
        status: None,
        notes: None,
    }
}

fn table_params(table: TableKind) -> TableQueryParams {
    TableQueryParams {
        table,
        conditions: None,
        search: None,
        sort: None,
        page: None,
        page_size: None,
    }
}

#[tokio::test]
async fn workspace_stat_reports_counts_and_ui_context() {
    let ui_state = Arc::new(Mutex::new(UiState::default()));
    ui_state.lock().await.set_active_tab(Tab::Calendar);
    let server = demo_server().with_ui_state(ui_state);

    let stat = server.workspace_stat().await.expect("stat").0;
    assert_eq!(stat.workspace_id, "w:demo");
    assert_eq!(stat.rev, 0);
    assert_eq!(stat.counts.meetings, 5);
    assert_eq!(stat.counts.annotations, 1);
    assert_eq!(stat.context.human_active_tab, Some(Tab::Calendar));
    assert!(stat.context.ui_rev.is_some());
}

#[tokio::test]
async fn status_read_without_folder_is_not_persistent() {
    let status = demo_server().status_read().await.expect("status").0;
    assert!(!status.persistent);
    assert!(status.store.is_none());
}

#[tokio::test]
async fn apply_ops_updates_record_and_notifies_ui() {
    let ui_state = Arc::new(Mutex::new(UiState::default()));
    let server = demo_server().with_ui_state(ui_state.clone());

    let response = server
        .workspace_apply_ops(Parameters(ApplyOpsParams {
            base_rev: 0,
            ops: vec![rename_meeting("m:1", "Buyer interview (pilot)")],
        }))
        .await
        .expect("apply")
        .0;
    assert_eq!(response.new_rev, 1);
    assert_eq!(response.applied, 1);
    assert_eq!(response.delta.updated, vec!["meeting/m:1".to_owned()]);
    assert_eq!(ui_state.lock().await.workspace_rev(), 1);

    let read = server
        .record_read(Parameters(RecordReadParams { record: "meeting/m:1".to_owned() }))
        .await
        .expect("read")
        .0;
    assert_eq!(read.value["title"], "Buyer interview (pilot)");
}

#[tokio::test]
async fn apply_ops_rejects_stale_base_rev() {
    let server = demo_server();
    let err = server
        .workspace_apply_ops(Parameters(ApplyOpsParams {
            base_rev: 7,
            ops: vec![rename_meeting("m:1", "Late")],
        }))
        .await
        .err().expect("stale base_rev");
    assert!(err.message.contains("conflict"));
    let data = err.data.expect("conflict data");
    assert_eq!(data["base_rev"], 7);
    assert_eq!(data["current_rev"], 0);
}

#[tokio::test]
async fn failing_batch_leaves_workspace_untouched() {
    let server = demo_server();
    let err = server
        .workspace_apply_ops(Parameters(ApplyOpsParams {
            base_rev: 0,
            ops: vec![rename_meeting("m:1", "Renamed"), rename_meeting("m:404", "Missing")],
        }))
        .await
        .err().expect("missing meeting");
    assert_eq!(err.data.expect("data")["record"], "meeting/m:404");

    let stat = server.workspace_stat().await.expect("stat").0;
    assert_eq!(stat.rev, 0);
    let read = server
        .record_read(Parameters(RecordReadParams { record: "meeting/m:1".to_owned() }))
        .await
        .expect("read")
        .0;
    assert_eq!(read.value["title"], "Buyer interview #1");
}

#[tokio::test]
async fn propose_ops_predicts_without_mutating() {
    let server = demo_server();
    let proposal = server
        .workspace_propose_ops(Parameters(ProposeOpsParams {
            base_rev: 0,
            ops: vec![McpOp::JtbdDelete { jtbd_id: "j:2".to_owned() }],
        }))
        .await
        .expect("propose")
        .0;
    assert_eq!(proposal.new_rev, 1);
    assert!(proposal.delta.removed.contains(&"jtbd/j:2".to_owned()));
    assert!(proposal.delta.updated.contains(&"jtbd/j:4".to_owned()));

    assert_eq!(server.workspace_stat().await.expect("stat").0.counts.jtbds, 5);
}

#[tokio::test]
async fn invalid_ids_are_rejected_before_applying() {
    let server = demo_server();
    let err = server
        .workspace_apply_ops(Parameters(ApplyOpsParams {
            base_rev: 0,
            ops: vec![McpOp::MeetingDelete { meeting_id: String::new() }],
        }))
        .await
        .err().expect("empty id");
    assert!(err.message.contains("meeting_id"));
}

#[tokio::test]
async fn records_list_narrows_to_parent() {
    let server = demo_server();
    let listed = server
        .records_list(Parameters(RecordsListParams {
            kind: RecordKind::Meeting,
            parent: Some("research/r:1".to_owned()),
            limit: Some(2),
        }))
        .await
        .expect("list")
        .0;
    assert_eq!(listed.total, 3);
    assert_eq!(listed.records.len(), 2);
    assert_eq!(listed.records[0].record, "meeting/m:1");

    let err = server
        .records_list(Parameters(RecordsListParams {
            kind: RecordKind::Research,
            parent: Some("meeting/m:1".to_owned()),
            limit: None,
        }))
        .await
        .err().expect("research has no parent");
    assert!(err.message.contains("unsupported parent"));
}

#[tokio::test]
async fn record_read_reports_missing_records() {
    let err = demo_server()
        .record_read(Parameters(RecordReadParams { record: "guide/g:404".to_owned() }))
        .await
        .err().expect("missing guide");
    assert_eq!(err.message, "record not found");
}

#[tokio::test]
async fn transcript_read_renders_annotation_markers() {
    let transcript = demo_server()
        .transcript_read(Parameters(TranscriptReadParams { attachment_id: "a:1".to_owned() }))
        .await
        .expect("transcript")
        .0;
    assert_eq!(transcript.annotations.len(), 1);
    assert!(transcript.rendered.contains("«price»[1]"));
}

#[tokio::test]
async fn transcript_update_prunes_annotations_that_no_longer_match() {
    let server = demo_server();
    let response = server
        .transcript_update(Parameters(TranscriptUpdateParams {
            base_rev: 0,
            attachment_id: "a:1".to_owned(),
            text: Some("Interviewer: Hi.\nRespondent: Hello.".to_owned()),
        }))
        .await
        .expect("update")
        .0;
    assert_eq!(response.removed_annotations, vec!["an:1".to_owned()]);
    assert!(response.failed_annotations.is_empty());
    assert_eq!(response.new_rev, 2);

    let transcript = server
        .transcript_read(Parameters(TranscriptReadParams { attachment_id: "a:1".to_owned() }))
        .await
        .expect("transcript")
        .0;
    assert!(transcript.annotations.is_empty());
    assert_eq!(transcript.text.as_deref(), Some("Interviewer: Hi.\nRespondent: Hello."));
}

#[tokio::test]
async fn transcript_update_keeps_annotations_that_still_match() {
    let server = demo_server();
    let text = format!("{}\nInterviewer: Thanks!", crate::model::fixtures::DEMO_TRANSCRIPT);
    let response = server
        .transcript_update(Parameters(TranscriptUpdateParams {
            base_rev: 0,
            attachment_id: "a:1".to_owned(),
            text: Some(text),
        }))
        .await
        .expect("update")
        .0;
    assert!(response.removed_annotations.is_empty());
    assert_eq!(response.new_rev, 1);
}

#[tokio::test]
async fn table_query_uses_view_state_and_paginates() {
    let server = demo_server();
    let mut params = table_params(TableKind::Meetings);
    params.sort = Some(vec![crate::model::SortSpec::desc("date")]);
    params.page_size = Some(2);
    params.page = Some(1);

    let page = server.table_query(Parameters(params)).await.expect("query").0;
    assert_eq!(page.total, 5);
    assert_eq!(page.page_count, 3);
    assert_eq!(page.rows.len(), 2);
    assert_eq!(page.rows[0].record, "meeting/m:4");
    assert!(page.columns.contains(&"title".to_owned()));
    assert!(page.text.contains("page 2/3"));
}

#[tokio::test]
async fn table_query_reports_unknown_columns() {
    let mut params = table_params(TableKind::Research);
    params.conditions = Some(vec![crate::model::FilterCondition::new(
        "budget",
        crate::model::FilterOperator::Equals,
        vec!["1".to_owned()],
    )]);
    let err = demo_server().table_query(Parameters(params)).await.err().expect("unknown column");
    assert!(err.message.contains("budget"));
}

#[tokio::test]
async fn view_update_keeps_one_visible_column() {
    let server = demo_server();
    let view = server
        .view_read(Parameters(ViewReadParams { table: TableKind::Jtbd }))
        .await
        .expect("view")
        .0
        .view;
    let visible = view.visible_columns().into_iter().map(str::to_owned).collect::<Vec<_>>();
    let (last, rest) = visible.split_last().expect("visible columns");

    for key in rest {
        server
            .view_update(Parameters(ViewUpdateParams {
                table: TableKind::Jtbd,
                reset: None,
                toggle_column: Some(key.clone()),
                move_column: None,
                cycle_sort: None,
                sort: None,
                page_size: None,
            }))
            .await
            .expect("hide column");
    }
    let err = server
        .view_update(Parameters(ViewUpdateParams {
            table: TableKind::Jtbd,
            reset: None,
            toggle_column: Some(last.clone()),
            move_column: None,
            cycle_sort: None,
            sort: None,
            page_size: None,
        }))
        .await
        .err().expect("last visible column");
    assert!(err.message.contains("last visible column"));

    let reset = server
        .view_update(Parameters(ViewUpdateParams {
            table: TableKind::Jtbd,
            reset: Some(true),
            toggle_column: None,
            move_column: None,
            cycle_sort: Some("priority".to_owned()),
            sort: None,
            page_size: Some(10),
        }))
        .await
        .expect("reset")
        .0
        .view;
    assert_eq!(reset.visible_columns().len(), visible.len());
    assert_eq!(reset.sort.len(), 1);
    assert_eq!(reset.page_size, 10);
}

#[tokio::test]
async fn filter_apply_runs_saved_conditions_and_sort() {
    let page = demo_server()
        .filter_apply(Parameters(FilterApplyParams {
            filter_id: "f:1".to_owned(),
            search: None,
            page: None,
        }))
        .await
        .expect("filter")
        .0;
    assert_eq!(page.table, TableKind::Meetings);
    assert_eq!(page.total, 2);
    let records = page.rows.iter().map(|row| row.record.as_str()).collect::<Vec<_>>();
    assert_eq!(records, vec!["meeting/m:4", "meeting/m:3"]);
    assert!(page.text.contains("Date ▲"));
}

#[tokio::test]
async fn guide_and_jtbd_text_views() {
    let server = demo_server();
    let guide = server
        .guide_render_text(Parameters(GuideRenderParams { guide_id: "g:1".to_owned() }))
        .await
        .expect("guide")
        .0;
    assert!(guide.text.starts_with("Buyer interview [g:1]\n"));

    let subtree = server
        .jtbd_tree(Parameters(JtbdTreeParams { root_id: Some("j:2".to_owned()) }))
        .await
        .expect("subtree")
        .0;
    let items = subtree.items.iter().map(|item| (item.depth, item.jtbd_id.as_str())).collect::<Vec<_>>();
    assert_eq!(items, vec![(0, "j:2"), (1, "j:4")]);
    assert_eq!(
        subtree.text,
        "Compare offers quickly [j:2] critical\n  Normalize quotes to one currency [j:4] low\n"
    );

    let forest = server.jtbd_tree(Parameters(JtbdTreeParams { root_id: None })).await.expect("forest").0;
    assert_eq!(forest.items.len(), 5);
}

#[tokio::test]
async fn roadmap_and_calendar_render() {
    let server = demo_server();
    let roadmap = server
        .roadmap_render_text(Parameters(RoadmapRenderParams { start: None, days: None, width: None }))
        .await
        .expect("roadmap")
        .0;
    assert!(roadmap.text.starts_with("Roadmap 2025-11-03"));
    assert!(roadmap.text.contains("Pricing page test"));

    let err = server
        .roadmap_render_text(Parameters(RoadmapRenderParams { start: None, days: None, width: Some(3) }))
        .await
        .err().expect("too narrow");
    assert!(err.message.contains("cannot render"));

    let calendar = server
        .calendar_render_text(Parameters(CalendarRenderParams { year: 2026, month: 2, week_start: None }))
        .await
        .expect("calendar")
        .0;
    assert!(calendar.text.contains("First-run walkthrough"));

    let err = server
        .calendar_render_text(Parameters(CalendarRenderParams { year: 2026, month: 13, week_start: None }))
        .await
        .err().expect("invalid month");
    assert!(err.message.contains("invalid month"));
}

#[tokio::test]
async fn search_covers_labels_and_transcripts() {
    let response = demo_server()
        .search(Parameters(SearchParams {
            query: "delivery".to_owned(),
            mode: None,
            limit: None,
            include_transcripts: Some(true),
        }))
        .await
        .expect("search")
        .0;
    assert!(response.hits.iter().any(|hit| hit.record == "jtbd/j:3"));
    assert_eq!(response.transcript_matches.len(), 1);
}

#[tokio::test]
async fn persistent_server_writes_through_and_picks_up_external_changes() {
    let tmp = TempDir::new("persist");
    let folder = WorkspaceFolder::new(&tmp.path);
    folder.save_workspace(&demo_workspace()).expect("seed folder");
    let server = ParleyMcp::new_persistent(folder.load_workspace().expect("load"), WorkspaceFolder::new(&tmp.path));

    server
        .workspace_apply_ops(Parameters(ApplyOpsParams {
            base_rev: 0,
            ops: vec![rename_meeting("m:2", "Renamed on disk")],
        }))
        .await
        .expect("apply");
    let on_disk = folder.load_workspace().expect("reload");
    assert_eq!(on_disk.rev(), 1);
    assert_eq!(on_disk.meetings()[&MeetingId::new("m:2").expect("id")].title, "Renamed on disk");

    let mut external = on_disk.clone();
    let base_rev = external.rev();
    apply_ops(
        &mut external,
        base_rev,
        &[Op::Jtbd(JtbdOp::Delete { jtbd_id: JtbdId::new("j:5").expect("id") })],
    )
    .expect("external edit");
    folder.save_workspace(&external).expect("external save");

    let stat = server.workspace_stat().await.expect("stat").0;
    assert_eq!(stat.rev, 2);
    assert_eq!(stat.counts.jtbds, 4);

    let status = server.status_read().await.expect("status").0;
    assert!(status.persistent);
    assert!(status.store.expect("store status").writable);
}

#[tokio::test]
async fn persistent_view_state_is_saved_in_the_folder() {
    let tmp = TempDir::new("views");
    let folder = WorkspaceFolder::new(&tmp.path);
    folder.save_workspace(&demo_workspace()).expect("seed folder");
    let server = ParleyMcp::new_persistent(demo_workspace(), WorkspaceFolder::new(&tmp.path));

    server
        .view_update(Parameters(ViewUpdateParams {
            table: TableKind::Research,
            reset: None,
            toggle_column: None,
            move_column: None,
            cycle_sort: Some("name".to_owned()),
            sort: None,
            page_size: None,
        }))
        .await
        .expect("update view");

    let saved = folder.load_view_state(TableKind::Research, 25);
    assert_eq!(saved.sort.len(), 1);
    assert_eq!(saved.sort[0].column.as_str(), "name");
}
