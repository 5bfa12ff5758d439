// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

fn parse_id<T>(field: &'static str, raw: &str) -> Result<Id<T>, ErrorData> {
    Id::new(raw.to_owned()).map_err(|err| {
        ErrorData::invalid_params(
            format!("invalid {field}: {err}"),
            Some(serde_json::json!({ field: raw })),
        )
    })
}

fn parse_record_ref(raw: &str) -> Result<RecordRef, ErrorData> {
    RecordRef::parse(raw).map_err(|err| {
        ErrorData::invalid_params(
            format!("invalid record ref: {err}"),
            Some(serde_json::json!({ "record": raw })),
        )
    })
}

/// `clear` wins over `value`; neither leaves the link untouched.
fn patch_link<T>(
    field: &'static str,
    value: &Option<String>,
    clear: Option<bool>,
) -> Result<Option<Option<Id<T>>>, ErrorData> {
    if clear == Some(true) {
        return Ok(Some(None));
    }
    value.as_deref().map(|raw| parse_id(field, raw).map(Some)).transpose()
}

fn patch_text(value: &Option<String>, clear: Option<bool>) -> Option<Option<String>> {
    if clear == Some(true) {
        return Some(None);
    }
    value.clone().map(Some)
}

fn to_index(value: Option<u64>) -> Option<usize> {
    value.map(|value| usize::try_from(value).unwrap_or(usize::MAX))
}

fn delta_summary(delta: &Delta) -> DeltaSummary {
    DeltaSummary {
        added: delta.added.iter().map(ToString::to_string).collect(),
        removed: delta.removed.iter().map(ToString::to_string).collect(),
        updated: delta.updated.iter().map(ToString::to_string).collect(),
    }
}

fn map_apply_error(err: ApplyError) -> ErrorData {
    let message = err.to_string();
    match err {
        ApplyError::Conflict { base_rev, current_rev } => ErrorData::invalid_request(
            "conflict: stale base_rev",
            Some(serde_json::json!({
                "base_rev": base_rev,
                "current_rev": current_rev,
                "snapshot_tool": "workspace.stat",
            })),
        ),
        ApplyError::AlreadyExists { record } => ErrorData::invalid_params(
            "record already exists",
            Some(serde_json::json!({ "record": record.to_string() })),
        ),
        ApplyError::NotFound { record } => ErrorData::resource_not_found(
            "record not found",
            Some(serde_json::json!({ "record": record.to_string() })),
        ),
        ApplyError::Validation { record, source } => ErrorData::invalid_params(
            message,
            Some(serde_json::json!({ "record": record.to_string(), "reason": source.to_string() })),
        ),
        ApplyError::MissingReference { record, reference } => ErrorData::invalid_params(
            message,
            Some(serde_json::json!({
                "record": record.to_string(),
                "reference": reference.to_string(),
            })),
        ),
        ApplyError::JtbdCycle { jtbd_id, parent_id } => ErrorData::invalid_params(
            message,
            Some(serde_json::json!({
                "jtbd_id": jtbd_id.as_str(),
                "parent_id": parent_id.as_str(),
            })),
        ),
        ApplyError::Transcription { attachment_id, source } => ErrorData::invalid_params(
            message,
            Some(serde_json::json!({
                "attachment_id": attachment_id.as_str(),
                "reason": source.to_string(),
            })),
        ),
        ApplyError::Annotation { annotation_id, source } => ErrorData::invalid_params(
            message,
            Some(serde_json::json!({
                "annotation_id": annotation_id.as_str(),
                "reason": source.to_string(),
            })),
        ),
        ApplyError::Guide { guide_id, source } => ErrorData::invalid_params(
            message,
            Some(serde_json::json!({ "guide_id": guide_id.as_str(), "reason": source.to_string() })),
        ),
    }
}

fn map_query_error(err: QueryError) -> ErrorData {
    ErrorData::invalid_params(err.to_string(), Some(serde_json::json!({ "error": err.to_string() })))
}

fn map_render_error(err: RenderError) -> ErrorData {
    ErrorData::invalid_params(
        format!("cannot render: {err}"),
        Some(serde_json::json!({ "render_error": err.to_string() })),
    )
}

fn store_error(action: &str, err: StoreError) -> ErrorData {
    ErrorData::internal_error(
        format!("failed to {action}: {err}"),
        Some(serde_json::json!({ "store_error": err.to_string() })),
    )
}

fn mcp_guide_op_to_internal(op: &McpGuideOp) -> Result<GuideOp, ErrorData> {
    Ok(match op {
        McpGuideOp::AddBlock { parent_id, block_id, name, index } => GuideOp::AddBlock {
            parent_id: parent_id.as_deref().map(|raw| parse_id("parent_id", raw)).transpose()?,
            block_id: parse_id("block_id", block_id)?,
            name: name.clone(),
            index: to_index(*index),
        },
        McpGuideOp::RenameBlock { block_id, name } => GuideOp::RenameBlock {
            block_id: parse_id("block_id", block_id)?,
            name: name.clone(),
        },
        McpGuideOp::RemoveBlock { block_id } => {
            GuideOp::RemoveBlock { block_id: parse_id("block_id", block_id)? }
        }
        McpGuideOp::MoveBlock { block_id, new_parent_id, index } => GuideOp::MoveBlock {
            block_id: parse_id("block_id", block_id)?,
            new_parent_id: new_parent_id
                .as_deref()
                .map(|raw| parse_id("new_parent_id", raw))
                .transpose()?,
            index: to_index(*index),
        },
        McpGuideOp::AddQuestion { block_id, question_id, text, index } => GuideOp::AddQuestion {
            block_id: parse_id("block_id", block_id)?,
            question_id: parse_id("question_id", question_id)?,
            text: text.clone(),
            index: to_index(*index),
        },
        McpGuideOp::UpdateQuestion { question_id, text } => GuideOp::UpdateQuestion {
            question_id: parse_id("question_id", question_id)?,
            text: text.clone(),
        },
        McpGuideOp::RemoveQuestion { question_id } => {
            GuideOp::RemoveQuestion { question_id: parse_id("question_id", question_id)? }
        }
        McpGuideOp::MoveQuestion { question_id, to_block_id, index } => GuideOp::MoveQuestion {
            question_id: parse_id("question_id", question_id)?,
            to_block_id: parse_id("to_block_id", to_block_id)?,
            index: to_index(*index),
        },
    })
}

fn mcp_op_to_internal(op: &McpOp) -> Result<Op, ErrorData> {
    Ok(match op {
        McpOp::ResearchCreate { research } => {
            Op::Research(ResearchOp::Create { research: research.clone() })
        }
        McpOp::ResearchUpdate {
            research_id,
            name,
            description,
            team,
            status,
            start_date,
            end_date,
            customer,
            clear_customer,
        } => Op::Research(ResearchOp::Update {
            research_id: parse_id("research_id", research_id)?,
            patch: ResearchPatch {
                name: name.clone(),
                description: description.clone(),
                team: team.clone(),
                status: *status,
                start_date: *start_date,
                end_date: *end_date,
                customer: patch_text(customer, *clear_customer),
            },
        }),
        McpOp::ResearchDelete { research_id } => {
            Op::Research(ResearchOp::Delete { research_id: parse_id("research_id", research_id)? })
        }
        McpOp::MeetingCreate { meeting } => Op::Meeting(MeetingOp::Create { meeting: meeting.clone() }),
        McpOp::MeetingUpdate {
            meeting_id,
            research_id,
            clear_research,
            title,
            respondent_name,
            respondent_position,
            company,
            date,
            status,
            notes,
        } => Op::Meeting(MeetingOp::Update {
            meeting_id: parse_id("meeting_id", meeting_id)?,
            patch: MeetingPatch {
                research_id: patch_link("research_id", research_id, *clear_research)?,
                title: title.clone(),
                respondent_name: respondent_name.clone(),
                respondent_position: respondent_position.clone(),
                company: company.clone(),
                date: *date,
                status: *status,
                notes: notes.clone(),
            },
        }),
        McpOp::MeetingDelete { meeting_id } => {
            Op::Meeting(MeetingOp::Delete { meeting_id: parse_id("meeting_id", meeting_id)? })
        }
        McpOp::JtbdCreate { jtbd } => Op::Jtbd(JtbdOp::Create { jtbd: jtbd.clone() }),
        McpOp::JtbdUpdate {
            jtbd_id,
            title,
            description,
            parent_id,
            clear_parent,
            priority,
            category,
            clear_category,
            tags,
            research_id,
            clear_research,
        } => Op::Jtbd(JtbdOp::Update {
            jtbd_id: parse_id("jtbd_id", jtbd_id)?,
            patch: JtbdPatch {
                title: title.clone(),
                description: description.clone(),
                parent_id: patch_link("parent_id", parent_id, *clear_parent)?,
                priority: *priority,
                category: patch_text(category, *clear_category),
                tags: tags.clone(),
                research_id: patch_link("research_id", research_id, *clear_research)?,
            },
        }),
        McpOp::JtbdDelete { jtbd_id } => {
            Op::Jtbd(JtbdOp::Delete { jtbd_id: parse_id("jtbd_id", jtbd_id)? })
        }
        McpOp::AttachmentCreate { attachment } => {
            Op::Attachment(AttachmentOp::Create { attachment: attachment.clone() })
        }
        McpOp::AttachmentUpdate { attachment_id, file_name, media_type, size_bytes } => {
            Op::Attachment(AttachmentOp::Update {
                attachment_id: parse_id("attachment_id", attachment_id)?,
                patch: AttachmentPatch {
                    file_name: file_name.clone(),
                    media_type: media_type.clone(),
                    size_bytes: *size_bytes,
                },
            })
        }
        McpOp::AttachmentSetTranscriptionStatus { attachment_id, status } => {
            Op::Attachment(AttachmentOp::SetTranscriptionStatus {
                attachment_id: parse_id("attachment_id", attachment_id)?,
                status: status.clone(),
            })
        }
        McpOp::AttachmentDelete { attachment_id } => Op::Attachment(AttachmentOp::Delete {
            attachment_id: parse_id("attachment_id", attachment_id)?,
        }),
        McpOp::AnnotationAdd { annotation } => {
            Op::Annotation(AnnotationOp::Add { annotation: annotation.clone() })
        }
        McpOp::AnnotationUpdate { annotation_id, error_type, correction, clear_correction } => {
            Op::Annotation(AnnotationOp::Update {
                annotation_id: parse_id("annotation_id", annotation_id)?,
                error_type: *error_type,
                correction: patch_text(correction, *clear_correction),
            })
        }
        McpOp::AnnotationRemove { annotation_id } => Op::Annotation(AnnotationOp::Remove {
            annotation_id: parse_id("annotation_id", annotation_id)?,
        }),
        McpOp::GuideCreate { guide } => Op::Guide(GuideRecordOp::Create { guide: guide.clone() }),
        McpOp::GuideUpdate { guide_id, name, research_id, clear_research } => {
            Op::Guide(GuideRecordOp::Update {
                guide_id: parse_id("guide_id", guide_id)?,
                name: name.clone(),
                research_id: patch_link("research_id", research_id, *clear_research)?,
            })
        }
        McpOp::GuideEdit { guide_id, ops } => Op::Guide(GuideRecordOp::Edit {
            guide_id: parse_id("guide_id", guide_id)?,
            ops: ops.iter().map(mcp_guide_op_to_internal).collect::<Result<Vec<_>, _>>()?,
        }),
        McpOp::GuideDelete { guide_id } => {
            Op::Guide(GuideRecordOp::Delete { guide_id: parse_id("guide_id", guide_id)? })
        }
        McpOp::FilterSave { filter } => Op::Filter(FilterOp::Save { filter: filter.clone() }),
        McpOp::FilterDelete { filter_id } => {
            Op::Filter(FilterOp::Delete { filter_id: parse_id("filter_id", filter_id)? })
        }
    })
}

fn summary(kind: RecordKind, id: &str, label: impl Into<String>) -> RecordSummary {
    RecordSummary { record: format!("{kind}/{id}"), label: label.into() }
}

fn unsupported_parent(kind: RecordKind, parent: &RecordRef) -> ErrorData {
    ErrorData::invalid_params(
        "unsupported parent for record kind",
        Some(serde_json::json!({ "kind": kind.as_str(), "parent": parent.to_string() })),
    )
}

/// Summaries of every `kind` record, optionally narrowed to children of `parent`.
fn record_summaries(
    workspace: &Workspace,
    kind: RecordKind,
    parent: Option<&RecordRef>,
) -> Result<Vec<RecordSummary>, ErrorData> {
    let parent_kind = parent.map(RecordRef::kind);
    let parent_id = parent.map(RecordRef::id);
    let linked = |link: Option<&str>| parent_id.is_none() || link == parent_id;

    let out = match (kind, parent_kind) {
        (RecordKind::Research, None) => workspace
            .researches()
            .values()
            .map(|research| summary(kind, research.research_id.as_str(), research.name.clone()))
            .collect(),
        (RecordKind::Meeting, None | Some(RecordKind::Research)) => workspace
            .meetings()
            .values()
            .filter(|meeting| linked(meeting.research_id.as_ref().map(|id| id.as_str())))
            .map(|meeting| summary(kind, meeting.meeting_id.as_str(), meeting.title.clone()))
            .collect(),
        (RecordKind::Jtbd, None | Some(RecordKind::Research)) => workspace
            .jtbds()
            .values()
            .filter(|jtbd| linked(jtbd.research_id.as_ref().map(|id| id.as_str())))
            .map(|jtbd| summary(kind, jtbd.jtbd_id.as_str(), jtbd.title.clone()))
            .collect(),
        (RecordKind::Jtbd, Some(RecordKind::Jtbd)) => workspace
            .jtbds()
            .values()
            .filter(|jtbd| linked(jtbd.parent_id.as_ref().map(|id| id.as_str())))
            .map(|jtbd| summary(kind, jtbd.jtbd_id.as_str(), jtbd.title.clone()))
            .collect(),
        (RecordKind::Attachment, None | Some(RecordKind::Meeting)) => workspace
            .attachments()
            .values()
            .filter(|attachment| linked(Some(attachment.meeting_id.as_str())))
            .map(|attachment| {
                summary(
                    kind,
                    attachment.attachment_id.as_str(),
                    format!("{} ({})", attachment.file_name, attachment.transcription_status),
                )
            })
            .collect(),
        (RecordKind::Annotation, None | Some(RecordKind::Attachment)) => workspace
            .annotations()
            .values()
            .filter(|annotation| linked(Some(annotation.attachment_id.as_str())))
            .map(|annotation| {
                summary(
                    kind,
                    annotation.annotation_id.as_str(),
                    format!("{:?} ({})", annotation.selected_text, annotation.error_type.as_str()),
                )
            })
            .collect(),
        (RecordKind::Guide, None | Some(RecordKind::Research)) => workspace
            .guides()
            .values()
            .filter(|guide| linked(guide.research_id.as_ref().map(|id| id.as_str())))
            .map(|guide| summary(kind, guide.guide_id.as_str(), guide.name.clone()))
            .collect(),
        (RecordKind::Filter, None) => workspace
            .filters()
            .values()
            .map(|filter| {
                summary(kind, filter.filter_id.as_str(), format!("{} ({})", filter.name, filter.table))
            })
            .collect(),
        (_, Some(_)) => {
            let parent = parent.ok_or_else(|| ErrorData::internal_error("parent missing", None))?;
            return Err(unsupported_parent(kind, parent));
        }
    };
    Ok(out)
}

/// The record as JSON, or `None` when it does not exist.
fn record_value(
    workspace: &Workspace,
    record: &RecordRef,
) -> Result<Option<serde_json::Value>, serde_json::Error> {
    let id = record.id();
    match record.kind() {
        RecordKind::Research => workspace.researches().get(id).map(serde_json::to_value),
        RecordKind::Meeting => workspace.meetings().get(id).map(serde_json::to_value),
        RecordKind::Jtbd => workspace.jtbds().get(id).map(serde_json::to_value),
        RecordKind::Attachment => workspace.attachments().get(id).map(serde_json::to_value),
        RecordKind::Annotation => workspace.annotations().get(id).map(serde_json::to_value),
        RecordKind::Guide => workspace.guides().get(id).map(serde_json::to_value),
        RecordKind::Filter => workspace.filters().get(id).map(serde_json::to_value),
    }
    .transpose()
}
