// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::NaiveDate;

use crate::annotate::{prune_stale_annotations, AnnotationError};
use crate::guide::{GuideError, GuideOp};
use crate::model::{
    demo_workspace, Annotation, AnnotationId, Attachment, AttachmentId, BlockId, FilterCondition,
    FilterId, FilterOperator, Guide, GuideBlock, GuideId, Jtbd, JtbdId, Meeting, MeetingId,
    Priority, Question, QuestionId, RecordKind, RecordRef, Research, ResearchId, SavedFilter,
    TableKind, TranscriptionStatus, TranscriptionTransitionError, ValidationError, Workspace,
    WorkspaceId,
};

use super::{
    apply_ops, AnnotationOp, ApplyError, AttachmentOp, FilterOp, GuideRecordOp, JtbdOp, JtbdPatch,
    MeetingOp, MeetingPatch, Op, ResearchOp, ResearchPatch, WorkspaceAnnotationSink,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("date")
}

fn empty_workspace() -> Workspace {
    Workspace::new(WorkspaceId::new("w:test").expect("workspace id"))
}

#[test]
fn create_research_bumps_rev_and_reports_added() {
    let mut workspace = empty_workspace();
    let research_id = ResearchId::new("r:1").expect("research id");
    let research = Research::new(research_id.clone(), "  Pricing study ", date(2026, 3, 1), date(2026, 3, 31));

    let result = apply_ops(&mut workspace, 0, &[Op::Research(ResearchOp::Create { research })])
        .expect("apply");

    assert_eq!(result.new_rev, 1);
    assert_eq!(workspace.rev(), 1);
    assert_eq!(result.applied, 1);
    assert_eq!(result.delta.added, vec![RecordRef::new(RecordKind::Research, &research_id)]);
    assert_eq!(workspace.researches()[&research_id].name, "Pricing study");
}

#[test]
fn stale_base_rev_is_a_conflict_and_changes_nothing() {
    let mut workspace = demo_workspace();
    let before = workspace.clone();
    let err = apply_ops(
        &mut workspace,
        before.rev() + 1,
        &[Op::Research(ResearchOp::Delete { research_id: ResearchId::new("r:1").expect("id") })],
    )
    .unwrap_err();

    assert_eq!(
        err,
        ApplyError::Conflict { base_rev: before.rev() + 1, current_rev: before.rev() }
    );
    assert_eq!(workspace, before);
}

#[test]
fn failing_op_rolls_back_the_whole_batch() {
    let mut workspace = empty_workspace();
    let ok = Research::new(ResearchId::new("r:1").expect("id"), "Ok", date(2026, 1, 1), date(2026, 1, 2));
    let bad = Research::new(ResearchId::new("r:2").expect("id"), "Bad", date(2026, 2, 2), date(2026, 2, 1));

    let err = apply_ops(
        &mut workspace,
        0,
        &[
            Op::Research(ResearchOp::Create { research: ok }),
            Op::Research(ResearchOp::Create { research: bad }),
        ],
    )
    .unwrap_err();

    assert!(matches!(
        err,
        ApplyError::Validation { source: ValidationError::DateRange { .. }, .. }
    ));
    assert_eq!(workspace.rev(), 0);
    assert!(workspace.researches().is_empty());
}

#[test]
fn empty_batch_keeps_revision() {
    let mut workspace = demo_workspace();
    let rev = workspace.rev();
    let result = apply_ops(&mut workspace, rev, &[]).expect("apply");
    assert_eq!(result.new_rev, rev);
    assert!(result.delta.is_empty());
}

#[test]
fn update_research_rejects_blank_name() {
    let mut workspace = demo_workspace();
    let rev = workspace.rev();
    let err = apply_ops(
        &mut workspace,
        rev,
        &[Op::Research(ResearchOp::Update {
            research_id: ResearchId::new("r:1").expect("id"),
            patch: ResearchPatch { name: Some("   ".to_owned()), ..ResearchPatch::default() },
        })],
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ApplyError::Validation { source: ValidationError::Required { field: "name" }, .. }
    ));
}

#[test]
fn deleting_research_detaches_meetings() {
    let mut workspace = demo_workspace();
    let research_id = ResearchId::new("r:1").expect("id");
    let attached = workspace.meetings_of(&research_id).count();
    assert!(attached > 0);

    let rev = workspace.rev();
    let result = apply_ops(&mut workspace, rev, &[Op::Research(ResearchOp::Delete { research_id: research_id.clone() })])
        .expect("apply");

    assert_eq!(workspace.meetings_of(&research_id).count(), 0);
    assert_eq!(result.delta.removed.len(), 1);
    assert!(result.delta.updated.iter().any(|r| r.kind() == RecordKind::Meeting));
    assert!(workspace.meetings().len() >= attached);
}

#[test]
fn meeting_requires_existing_research() {
    let mut workspace = empty_workspace();
    let mut meeting = Meeting::new(MeetingId::new("m:1").expect("id"), "Intro", "Dana", date(2026, 4, 2));
    meeting.research_id = Some(ResearchId::new("r:missing").expect("id"));

    let err = apply_ops(&mut workspace, 0, &[Op::Meeting(MeetingOp::Create { meeting })]).unwrap_err();
    assert!(matches!(err, ApplyError::MissingReference { .. }));
}

#[test]
fn meeting_update_can_clear_research() {
    let mut workspace = demo_workspace();
    let meeting_id = MeetingId::new("m:1").expect("id");
    let rev = workspace.rev();
    apply_ops(
        &mut workspace,
        rev,
        &[Op::Meeting(MeetingOp::Update {
            meeting_id: meeting_id.clone(),
            patch: MeetingPatch { research_id: Some(None), ..MeetingPatch::default() },
        })],
    )
    .expect("apply");
    assert_eq!(workspace.meetings()[&meeting_id].research_id, None);
}

#[test]
fn deleting_meeting_cascades_to_attachments_and_annotations() {
    let mut workspace = demo_workspace();
    let rev = workspace.rev();
    let result = apply_ops(
        &mut workspace,
        rev,
        &[Op::Meeting(MeetingOp::Delete { meeting_id: MeetingId::new("m:1").expect("id") })],
    )
    .expect("apply");

    assert!(!workspace.attachments().contains_key("a:1"));
    assert!(!workspace.annotations().contains_key("an:1"));
    let removed_kinds = result.delta.removed.iter().map(RecordRef::kind).collect::<Vec<_>>();
    assert!(removed_kinds.contains(&RecordKind::Meeting));
    assert!(removed_kinds.contains(&RecordKind::Attachment));
    assert!(removed_kinds.contains(&RecordKind::Annotation));
}

#[test]
fn jtbd_parent_cycle_is_rejected() {
    let mut workspace = demo_workspace();
    let rev = workspace.rev();
    // j:4 sits under j:2 which sits under j:1.
    let err = apply_ops(
        &mut workspace,
        rev,
        &[Op::Jtbd(JtbdOp::Update {
            jtbd_id: JtbdId::new("j:1").expect("id"),
            patch: JtbdPatch { parent_id: Some(Some(JtbdId::new("j:4").expect("id"))), ..JtbdPatch::default() },
        })],
    )
    .unwrap_err();

    assert_eq!(
        err,
        ApplyError::JtbdCycle {
            jtbd_id: JtbdId::new("j:1").expect("id"),
            parent_id: JtbdId::new("j:4").expect("id"),
        }
    );
}

#[test]
fn jtbd_self_parent_fails_validation() {
    let mut workspace = demo_workspace();
    let rev = workspace.rev();
    let jtbd_id = JtbdId::new("j:2").expect("id");
    let err = apply_ops(
        &mut workspace,
        rev,
        &[Op::Jtbd(JtbdOp::Update {
            jtbd_id: jtbd_id.clone(),
            patch: JtbdPatch { parent_id: Some(Some(jtbd_id)), ..JtbdPatch::default() },
        })],
    )
    .unwrap_err();
    assert!(matches!(err, ApplyError::Validation { .. }));
}

#[test]
fn deleting_jtbd_lifts_children_to_grandparent() {
    let mut workspace = demo_workspace();
    let rev = workspace.rev();
    apply_ops(
        &mut workspace,
        rev,
        &[Op::Jtbd(JtbdOp::Delete { jtbd_id: JtbdId::new("j:2").expect("id") })],
    )
    .expect("apply");

    assert_eq!(
        workspace.jtbds()["j:4"].parent_id,
        Some(JtbdId::new("j:1").expect("id"))
    );
}

#[test]
fn jtbd_create_normalizes_tags() {
    let mut workspace = empty_workspace();
    let mut jtbd = Jtbd::new(JtbdId::new("j:1").expect("id"), "Compare offers");
    jtbd.tags = vec![" price ".to_owned(), "price".to_owned(), "speed".to_owned()];
    jtbd.priority = Priority::High;
    apply_ops(&mut workspace, 0, &[Op::Jtbd(JtbdOp::Create { jtbd })]).expect("apply");
    assert_eq!(workspace.jtbds()["j:1"].tags, vec!["price".to_owned(), "speed".to_owned()]);
}

#[test]
fn transcription_status_follows_lifecycle() {
    let mut workspace = demo_workspace();
    let attachment_id = AttachmentId::new("a:2").expect("id");
    let rev = workspace.rev();

    // a:2 is processing and has no transcript yet.
    let err = apply_ops(
        &mut workspace,
        rev,
        &[Op::Attachment(AttachmentOp::SetTranscriptionStatus {
            attachment_id: attachment_id.clone(),
            status: TranscriptionStatus::Completed,
        })],
    )
    .unwrap_err();
    assert!(matches!(err, ApplyError::Transcription { .. }));

    apply_ops(
        &mut workspace,
        rev,
        &[
            Op::Attachment(AttachmentOp::SetTranscript {
                attachment_id: attachment_id.clone(),
                text: Some("Hello there".to_owned()),
            }),
            Op::Attachment(AttachmentOp::SetTranscriptionStatus {
                attachment_id: attachment_id.clone(),
                status: TranscriptionStatus::Completed,
            }),
        ],
    )
    .expect("apply");
    assert_eq!(
        workspace.attachments()[&attachment_id].transcription_status,
        TranscriptionStatus::Completed
    );
}

#[test]
fn attachment_requires_meeting() {
    let mut workspace = empty_workspace();
    let attachment = Attachment::new(
        AttachmentId::new("a:1").expect("id"),
        MeetingId::new("m:nope").expect("id"),
        "call.mp3",
    );
    let err = apply_ops(&mut workspace, 0, &[Op::Attachment(AttachmentOp::Create { attachment })])
        .unwrap_err();
    assert!(matches!(err, ApplyError::MissingReference { .. }));
}

#[test]
fn attachment_create_starts_the_transcription_lifecycle() {
    let mut workspace = demo_workspace();
    let rev = workspace.rev();
    let mut attachment = Attachment::new(
        AttachmentId::new("a:9").expect("id"),
        MeetingId::new("m:1").expect("id"),
        "call.m4a",
    );
    attachment.transcription_status = TranscriptionStatus::Completed;

    let err = apply_ops(
        &mut workspace,
        rev,
        &[Op::Attachment(AttachmentOp::Create { attachment: attachment.clone() })],
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ApplyError::Validation { source: ValidationError::Invalid { field: "transcript", .. }, .. }
    ));

    attachment.transcript = Some("Already transcribed".to_owned());
    let err = apply_ops(
        &mut workspace,
        rev,
        &[Op::Attachment(AttachmentOp::Create { attachment: attachment.clone() })],
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ApplyError::Validation {
            source: ValidationError::Invalid { field: "transcription_status", .. },
            ..
        }
    ));
    assert!(!workspace.attachments().contains_key("a:9"));

    attachment.transcription_status = TranscriptionStatus::NotStarted;
    apply_ops(&mut workspace, rev, &[Op::Attachment(AttachmentOp::Create { attachment })])
        .expect("apply");
    assert_eq!(
        workspace.attachments()["a:9"].transcription_status,
        TranscriptionStatus::NotStarted
    );
}

#[test]
fn completed_transcript_cannot_be_cleared() {
    let mut workspace = demo_workspace();
    let attachment_id = AttachmentId::new("a:1").expect("id");
    let rev = workspace.rev();
    assert_eq!(
        workspace.attachments()[&attachment_id].transcription_status,
        TranscriptionStatus::Completed
    );

    let clear = Op::Attachment(AttachmentOp::SetTranscript {
        attachment_id: attachment_id.clone(),
        text: None,
    });
    let err = apply_ops(&mut workspace, rev, &[clear.clone()]).unwrap_err();
    assert_eq!(
        err,
        ApplyError::Transcription {
            attachment_id: attachment_id.clone(),
            source: TranscriptionTransitionError::ClearCompleted,
        }
    );
    assert!(workspace.attachments()[&attachment_id].transcript.is_some());

    apply_ops(
        &mut workspace,
        rev,
        &[
            Op::Attachment(AttachmentOp::SetTranscriptionStatus {
                attachment_id: attachment_id.clone(),
                status: TranscriptionStatus::Pending,
            }),
            clear,
        ],
    )
    .expect("apply");
    assert_eq!(workspace.attachments()[&attachment_id].transcript, None);
}

#[test]
fn annotation_add_checks_selection_against_transcript() {
    let mut workspace = demo_workspace();
    let rev = workspace.rev();
    let annotation = Annotation::new(
        AnnotationId::new("an:9").expect("id"),
        AttachmentId::new("a:1").expect("id"),
        0,
        5,
        "Wrong",
    );
    let err = apply_ops(&mut workspace, rev, &[Op::Annotation(AnnotationOp::Add { annotation })])
        .unwrap_err();
    assert!(matches!(
        err,
        ApplyError::Annotation { source: AnnotationError::TextMismatch { .. }, .. }
    ));

    let annotation = Annotation::new(
        AnnotationId::new("an:9").expect("id"),
        AttachmentId::new("a:1").expect("id"),
        0,
        11,
        "Interviewer",
    );
    apply_ops(&mut workspace, rev, &[Op::Annotation(AnnotationOp::Add { annotation })])
        .expect("apply");
    assert!(workspace.annotations().contains_key("an:9"));
}

#[test]
fn transcript_edit_then_prune_removes_only_stale_annotations() {
    let mut workspace = demo_workspace();
    let attachment_id = AttachmentId::new("a:1").expect("id");
    let rev = workspace.rev();
    apply_ops(
        &mut workspace,
        rev,
        &[Op::Attachment(AttachmentOp::SetTranscript {
            attachment_id: attachment_id.clone(),
            text: Some("Interviewer: How do you pick a supplier?\nRespondent: Mostly on cost.".to_owned()),
        })],
    )
    .expect("apply");

    let text = workspace.attachments()[&attachment_id].transcript_text().to_owned();
    let annotations = workspace.annotations_of(&attachment_id).into_iter().cloned().collect::<Vec<_>>();
    let rev_before = workspace.rev();
    let report = {
        let mut sink = WorkspaceAnnotationSink::new(&mut workspace);
        prune_stale_annotations(&text, &annotations, &mut sink)
    };

    assert!(report.is_clean());
    assert_eq!(report.removed, vec![AnnotationId::new("an:1").expect("id")]);
    assert!(workspace.annotations_of(&attachment_id).is_empty());
    assert_eq!(workspace.rev(), rev_before + 1);
}

#[test]
fn prune_reports_missing_annotation_without_stopping() {
    let mut workspace = demo_workspace();
    let attachment_id = AttachmentId::new("a:1").expect("id");
    let mut annotations = workspace.annotations_of(&attachment_id).into_iter().cloned().collect::<Vec<_>>();
    let mut ghost = annotations[0].clone();
    ghost.annotation_id = AnnotationId::new("an:0").expect("id");
    annotations.push(ghost);

    let report = {
        let mut sink = WorkspaceAnnotationSink::new(&mut workspace);
        prune_stale_annotations("completely different", &annotations, &mut sink)
    };

    assert_eq!(report.removed, vec![AnnotationId::new("an:1").expect("id")]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, AnnotationId::new("an:0").expect("id"));
}

#[test]
fn guide_edit_runs_tree_ops_atomically() {
    let mut workspace = demo_workspace();
    let guide_id = GuideId::new("g:1").expect("id");
    let rev = workspace.rev();
    let err = apply_ops(
        &mut workspace,
        rev,
        &[Op::Guide(GuideRecordOp::Edit {
            guide_id: guide_id.clone(),
            ops: vec![
                GuideOp::RenameBlock { block_id: BlockId::new("b:1").expect("id"), name: "Opening".to_owned() },
                GuideOp::RemoveBlock { block_id: BlockId::new("b:missing").expect("id") },
            ],
        })],
    )
    .unwrap_err();

    assert!(matches!(err, ApplyError::Guide { source: GuideError::BlockNotFound(_), .. }));
    assert_ne!(workspace.guides()[&guide_id].blocks[0].name, "Opening");
}

#[test]
fn guide_create_rejects_duplicate_ids_and_blank_names() {
    let mut workspace = empty_workspace();
    let block = |id: &str, name: &str| GuideBlock::new(BlockId::new(id).expect("id"), name);
    let create = |guide: Guide| Op::Guide(GuideRecordOp::Create { guide });

    let mut guide = Guide::new(GuideId::new("g:1").expect("id"), "Discovery");
    let mut nested = block("b:2", "Process");
    nested.sub_blocks.push(block("b:1", "Again"));
    guide.blocks = vec![block("b:1", "Intro"), nested];
    let err = apply_ops(&mut workspace, 0, &[create(guide.clone())]).unwrap_err();
    assert!(matches!(
        err,
        ApplyError::Validation { source: ValidationError::Invalid { field: "blocks", .. }, .. }
    ));

    guide.blocks = vec![block("b:1", "Intro"), block("b:2", "  ")];
    let err = apply_ops(&mut workspace, 0, &[create(guide.clone())]).unwrap_err();
    assert!(matches!(
        err,
        ApplyError::Validation { source: ValidationError::Invalid { field: "blocks", .. }, .. }
    ));

    let mut intro = block("b:1", "Intro");
    intro.questions.push(Question::new(QuestionId::new("q:1").expect("id"), "Role?"));
    let mut wrap = block("b:2", "Wrap-up");
    wrap.questions.push(Question::new(QuestionId::new("q:1").expect("id"), "Anything else?"));
    guide.blocks = vec![intro.clone(), wrap];
    let err = apply_ops(&mut workspace, 0, &[create(guide.clone())]).unwrap_err();
    assert!(matches!(
        err,
        ApplyError::Validation { source: ValidationError::Invalid { field: "questions", .. }, .. }
    ));
    assert!(workspace.guides().is_empty());
    assert_eq!(workspace.rev(), 0);

    let mut wrap = block("b:2", " Wrap-up ");
    wrap.questions.push(Question::new(QuestionId::new("q:2").expect("id"), " Anything else? "));
    guide.blocks = vec![intro, wrap];
    apply_ops(&mut workspace, 0, &[create(guide)]).expect("apply");
    let stored = &workspace.guides()["g:1"];
    assert_eq!(stored.blocks[1].name, "Wrap-up");
    assert_eq!(stored.blocks[1].questions[0].text, "Anything else?");
}

#[test]
fn saving_filter_checks_columns_and_values() {
    let mut workspace = empty_workspace();
    let mut filter = SavedFilter::new(FilterId::new("f:1").expect("id"), "Odd", TableKind::Meetings);
    filter.conditions.push(FilterCondition::new(
        "title",
        FilterOperator::Matches,
        vec!["(unclosed".to_owned()],
    ));
    let err = apply_ops(&mut workspace, 0, &[Op::Filter(FilterOp::Save { filter: filter.clone() })])
        .unwrap_err();
    assert!(matches!(
        err,
        ApplyError::Validation { source: ValidationError::Invalid { field: "conditions", .. }, .. }
    ));

    filter.conditions = vec![FilterCondition::new(
        "date",
        FilterOperator::Before,
        vec!["next tuesday".to_owned()],
    )];
    assert!(apply_ops(&mut workspace, 0, &[Op::Filter(FilterOp::Save { filter: filter.clone() })])
        .is_err());

    filter.conditions = vec![FilterCondition::new(
        "mood",
        FilterOperator::Equals,
        vec!["happy".to_owned()],
    )];
    assert!(apply_ops(&mut workspace, 0, &[Op::Filter(FilterOp::Save { filter: filter.clone() })])
        .is_err());
    assert!(workspace.filters().is_empty());

    filter.conditions = vec![FilterCondition::new(
        "date",
        FilterOperator::Before,
        vec!["2026-03-01".to_owned()],
    )];
    apply_ops(&mut workspace, 0, &[Op::Filter(FilterOp::Save { filter })]).expect("apply");
    assert_eq!(workspace.filters().len(), 1);
}

#[test]
fn saving_filter_twice_reports_update() {
    let mut workspace = empty_workspace();
    let filter = SavedFilter::new(FilterId::new("f:1").expect("id"), "Mine", TableKind::Meetings);
    let first = apply_ops(&mut workspace, 0, &[Op::Filter(FilterOp::Save { filter: filter.clone() })])
        .expect("apply");
    assert_eq!(first.delta.added.len(), 1);

    let second = apply_ops(&mut workspace, 1, &[Op::Filter(FilterOp::Save { filter })]).expect("apply");
    assert!(second.delta.added.is_empty());
    assert_eq!(second.delta.updated.len(), 1);
}

#[test]
fn add_then_remove_in_one_batch_reports_removed_only() {
    let mut workspace = empty_workspace();
    let research_id = ResearchId::new("r:1").expect("id");
    let research = Research::new(research_id.clone(), "Short", date(2026, 1, 1), date(2026, 1, 1));
    let result = apply_ops(
        &mut workspace,
        0,
        &[
            Op::Research(ResearchOp::Create { research }),
            Op::Research(ResearchOp::Update {
                research_id: research_id.clone(),
                patch: ResearchPatch { description: Some("x".to_owned()), ..ResearchPatch::default() },
            }),
            Op::Research(ResearchOp::Delete { research_id }),
        ],
    )
    .expect("apply");

    assert!(result.delta.added.is_empty());
    assert!(result.delta.updated.is_empty());
    assert_eq!(result.delta.removed.len(), 1);
}
