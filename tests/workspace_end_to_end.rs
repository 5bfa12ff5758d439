// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;

use parley::annotate::prune_stale_annotations;
use parley::model::{demo_workspace, AttachmentId, Meeting, MeetingId, TableKind};
use parley::ops::{apply_ops, AttachmentOp, MeetingOp, Op, WorkspaceAnnotationSink};
use parley::query::calendar::{month_grid, WeekStart};
use parley::query::table::{query_workspace_table, ViewState};
use parley::render::{render_calendar_text, render_table_page};
use parley::store::WorkspaceFolder;

struct TempDir(std::path::PathBuf);

impl TempDir {
    fn new() -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let path = env::temp_dir().join(format!("parley-e2e-{}-{nanos}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        Self(path)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

#[test]
fn edit_prune_persist_and_render() {
    let tmp = TempDir::new();
    let folder = WorkspaceFolder::new(&tmp.0);
    folder.save_workspace(&demo_workspace()).unwrap();

    let mut workspace = folder.load_workspace().unwrap();
    let mut meeting = Meeting::new(
        MeetingId::new("m:6").unwrap(),
        "Follow-up call",
        "Eva Ruiz",
        NaiveDate::from_ymd_opt(2026, 2, 24).unwrap(),
    );
    meeting.company = "Northwind".to_owned();
    let attachment_id = AttachmentId::new("a:1").unwrap();
    let result = apply_ops(
        &mut workspace,
        0,
        &[
            Op::Meeting(MeetingOp::Create { meeting }),
            Op::Attachment(AttachmentOp::SetTranscript {
                attachment_id: attachment_id.clone(),
                text: Some("We rarely talk about cost.".to_owned()),
            }),
        ],
    )
    .unwrap();
    assert_eq!(result.new_rev, 1);

    let text = workspace.attachments()[&attachment_id].transcript_text().to_owned();
    let annotations = workspace.annotations_of(&attachment_id).into_iter().cloned().collect::<Vec<_>>();
    let report = prune_stale_annotations(&text, &annotations, &mut WorkspaceAnnotationSink::new(&mut workspace));
    assert!(report.is_clean());
    assert_eq!(report.removed.len(), 1);
    assert!(workspace.annotations().is_empty());
    assert_eq!(workspace.rev(), 2);

    folder.save_workspace(&workspace).unwrap();
    let reloaded = folder.load_workspace().unwrap();
    assert_eq!(reloaded, workspace);

    let view = ViewState::default_for(TableKind::Meetings, 10);
    let page = query_workspace_table(&reloaded, TableKind::Meetings, &view.query(Vec::new(), Some("northwind".to_owned()), 0))
        .unwrap();
    assert_eq!(page.total, 2);
    let table = render_table_page(&view, &page);
    assert!(table.contains("Follow-up call"));

    let grid = month_grid(&reloaded, 2026, 2, WeekStart::Monday).unwrap();
    let calendar = render_calendar_text(&reloaded, &grid).unwrap();
    assert!(calendar.contains("Follow-up call"));
}
