// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Per-record mutation helpers used by `apply_ops`.
/// Keeps `ops::mod` focused on public op types and orchestration.
fn validated<T>(
    record: RecordRef,
    value: &T,
    validate: impl Fn(&T) -> Result<(), ValidationError>,
) -> Result<(), ApplyError> {
    validate(value).map_err(|source| ApplyError::Validation { record, source })
}

fn ensure_research(
    workspace: &Workspace,
    record: &RecordRef,
    research_id: Option<&ResearchId>,
) -> Result<(), ApplyError> {
    match research_id {
        Some(research_id) if !workspace.researches().contains_key(research_id) => {
            Err(ApplyError::MissingReference {
                record: record.clone(),
                reference: research_ref(research_id),
            })
        }
        _ => Ok(()),
    }
}

fn apply_research_op(
    workspace: &mut Workspace,
    op: &ResearchOp,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        ResearchOp::Create { research } => {
            let record = research_ref(&research.research_id);
            if workspace.researches().contains_key(&research.research_id) {
                return Err(ApplyError::AlreadyExists { record });
            }
            let mut research = research.clone();
            research.normalize();
            validated(record.clone(), &research, Research::validate)?;
            workspace.researches_mut().insert(research.research_id.clone(), research);
            delta.record_added(record);
            Ok(())
        }
        ResearchOp::Update { research_id, patch } => {
            let record = research_ref(research_id);
            let Some(existing) = workspace.researches().get(research_id) else {
                return Err(ApplyError::NotFound { record });
            };
            let mut next = existing.clone();
            if let Some(name) = &patch.name {
                next.name = name.clone();
            }
            if let Some(description) = &patch.description {
                next.description = description.clone();
            }
            if let Some(team) = &patch.team {
                next.team = team.clone();
            }
            if let Some(status) = patch.status {
                next.status = status;
            }
            if let Some(start_date) = patch.start_date {
                next.start_date = start_date;
            }
            if let Some(end_date) = patch.end_date {
                next.end_date = end_date;
            }
            if let Some(customer) = &patch.customer {
                next.customer = customer.clone();
            }
            next.normalize();
            validated(record.clone(), &next, Research::validate)?;
            workspace.researches_mut().insert(research_id.clone(), next);
            delta.record_updated(record);
            Ok(())
        }
        ResearchOp::Delete { research_id } => {
            let record = research_ref(research_id);
            if workspace.researches_mut().remove(research_id).is_none() {
                return Err(ApplyError::NotFound { record });
            }
            delta.record_removed(record);

            // Dependents survive, detached from the deleted research.
            for meeting in workspace.meetings_mut().values_mut() {
                if meeting.research_id.as_ref() == Some(research_id) {
                    meeting.research_id = None;
                    delta.record_updated(meeting_ref(&meeting.meeting_id));
                }
            }
            for jtbd in workspace.jtbds_mut().values_mut() {
                if jtbd.research_id.as_ref() == Some(research_id) {
                    jtbd.research_id = None;
                    delta.record_updated(jtbd_ref(&jtbd.jtbd_id));
                }
            }
            for guide in workspace.guides_mut().values_mut() {
                if guide.research_id.as_ref() == Some(research_id) {
                    guide.research_id = None;
                    delta.record_updated(guide_ref(&guide.guide_id));
                }
            }
            Ok(())
        }
    }
}

fn apply_meeting_op(
    workspace: &mut Workspace,
    op: &MeetingOp,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        MeetingOp::Create { meeting } => {
            let record = meeting_ref(&meeting.meeting_id);
            if workspace.meetings().contains_key(&meeting.meeting_id) {
                return Err(ApplyError::AlreadyExists { record });
            }
            let mut meeting = meeting.clone();
            meeting.normalize();
            validated(record.clone(), &meeting, Meeting::validate)?;
            ensure_research(workspace, &record, meeting.research_id.as_ref())?;
            workspace.meetings_mut().insert(meeting.meeting_id.clone(), meeting);
            delta.record_added(record);
            Ok(())
        }
        MeetingOp::Update { meeting_id, patch } => {
            let record = meeting_ref(meeting_id);
            let Some(existing) = workspace.meetings().get(meeting_id) else {
                return Err(ApplyError::NotFound { record });
            };
            let mut next = existing.clone();
            if let Some(research_id) = &patch.research_id {
                next.research_id = research_id.clone();
            }
            if let Some(title) = &patch.title {
                next.title = title.clone();
            }
            if let Some(respondent_name) = &patch.respondent_name {
                next.respondent_name = respondent_name.clone();
            }
            if let Some(respondent_position) = &patch.respondent_position {
                next.respondent_position = respondent_position.clone();
            }
            if let Some(company) = &patch.company {
                next.company = company.clone();
            }
            if let Some(date) = patch.date {
                next.date = date;
            }
            if let Some(status) = patch.status {
                next.status = status;
            }
            if let Some(notes) = &patch.notes {
                next.notes = notes.clone();
            }
            next.normalize();
            validated(record.clone(), &next, Meeting::validate)?;
            ensure_research(workspace, &record, next.research_id.as_ref())?;
            workspace.meetings_mut().insert(meeting_id.clone(), next);
            delta.record_updated(record);
            Ok(())
        }
        MeetingOp::Delete { meeting_id } => {
            let record = meeting_ref(meeting_id);
            if workspace.meetings_mut().remove(meeting_id).is_none() {
                return Err(ApplyError::NotFound { record });
            }
            delta.record_removed(record);

            let attachment_ids = workspace
                .attachments_of(meeting_id)
                .map(|attachment| attachment.attachment_id.clone())
                .collect::<Vec<_>>();
            for attachment_id in attachment_ids {
                remove_attachment(workspace, &attachment_id, delta);
            }
            Ok(())
        }
    }
}

fn apply_jtbd_op(
    workspace: &mut Workspace,
    op: &JtbdOp,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        JtbdOp::Create { jtbd } => {
            let record = jtbd_ref(&jtbd.jtbd_id);
            if workspace.jtbds().contains_key(&jtbd.jtbd_id) {
                return Err(ApplyError::AlreadyExists { record });
            }
            let mut jtbd = jtbd.clone();
            jtbd.normalize();
            validated(record.clone(), &jtbd, Jtbd::validate)?;
            ensure_research(workspace, &record, jtbd.research_id.as_ref())?;
            if let Some(parent_id) = &jtbd.parent_id {
                if !workspace.jtbds().contains_key(parent_id) {
                    return Err(ApplyError::MissingReference { record, reference: jtbd_ref(parent_id) });
                }
            }
            workspace.jtbds_mut().insert(jtbd.jtbd_id.clone(), jtbd);
            delta.record_added(record);
            Ok(())
        }
        JtbdOp::Update { jtbd_id, patch } => {
            let record = jtbd_ref(jtbd_id);
            let Some(existing) = workspace.jtbds().get(jtbd_id) else {
                return Err(ApplyError::NotFound { record });
            };
            let mut next = existing.clone();
            if let Some(title) = &patch.title {
                next.title = title.clone();
            }
            if let Some(description) = &patch.description {
                next.description = description.clone();
            }
            if let Some(parent_id) = &patch.parent_id {
                next.parent_id = parent_id.clone();
            }
            if let Some(priority) = patch.priority {
                next.priority = priority;
            }
            if let Some(category) = &patch.category {
                next.category = category.clone();
            }
            if let Some(tags) = &patch.tags {
                next.tags = tags.clone();
            }
            if let Some(research_id) = &patch.research_id {
                next.research_id = research_id.clone();
            }
            next.normalize();
            validated(record.clone(), &next, Jtbd::validate)?;
            ensure_research(workspace, &record, next.research_id.as_ref())?;
            if let Some(parent_id) = &next.parent_id {
                if !workspace.jtbds().contains_key(parent_id) {
                    return Err(ApplyError::MissingReference { record, reference: jtbd_ref(parent_id) });
                }
                if is_jtbd_ancestor_or_self(workspace, jtbd_id, parent_id) {
                    return Err(ApplyError::JtbdCycle {
                        jtbd_id: jtbd_id.clone(),
                        parent_id: parent_id.clone(),
                    });
                }
            }
            workspace.jtbds_mut().insert(jtbd_id.clone(), next);
            delta.record_updated(record);
            Ok(())
        }
        JtbdOp::Delete { jtbd_id } => {
            let record = jtbd_ref(jtbd_id);
            let Some(removed) = workspace.jtbds_mut().remove(jtbd_id) else {
                return Err(ApplyError::NotFound { record });
            };
            delta.record_removed(record);

            // Children move up one level.
            for child in workspace.jtbds_mut().values_mut() {
                if child.parent_id.as_ref() == Some(jtbd_id) {
                    child.parent_id = removed.parent_id.clone();
                    delta.record_updated(jtbd_ref(&child.jtbd_id));
                }
            }
            Ok(())
        }
    }
}

/// Whether `candidate` is `jtbd_id` itself or one of its descendants.
fn is_jtbd_ancestor_or_self(workspace: &Workspace, jtbd_id: &JtbdId, candidate: &JtbdId) -> bool {
    let mut cursor = Some(candidate.clone());
    let mut steps = 0usize;
    while let Some(current) = cursor {
        if &current == jtbd_id {
            return true;
        }
        steps += 1;
        if steps > workspace.jtbds().len() {
            // Existing data already cycles; treat as a cycle.
            return true;
        }
        cursor = workspace.jtbds().get(&current).and_then(|jtbd| jtbd.parent_id.clone());
    }
    false
}

fn remove_attachment(workspace: &mut Workspace, attachment_id: &AttachmentId, delta: &mut DeltaBuilder) {
    if workspace.attachments_mut().remove(attachment_id).is_none() {
        return;
    }
    delta.record_removed(attachment_ref(attachment_id));
    let annotation_ids = workspace
        .annotations_of(attachment_id)
        .into_iter()
        .map(|annotation| annotation.annotation_id.clone())
        .collect::<Vec<_>>();
    for annotation_id in annotation_ids {
        workspace.annotations_mut().remove(&annotation_id);
        delta.record_removed(annotation_ref(&annotation_id));
    }
}

fn apply_attachment_op(
    workspace: &mut Workspace,
    op: &AttachmentOp,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        AttachmentOp::Create { attachment } => {
            let record = attachment_ref(&attachment.attachment_id);
            if workspace.attachments().contains_key(&attachment.attachment_id) {
                return Err(ApplyError::AlreadyExists { record });
            }
            let mut attachment = attachment.clone();
            attachment.file_name = attachment.file_name.trim().to_owned();
            validated(record.clone(), &attachment, Attachment::validate_new)?;
            if !workspace.meetings().contains_key(&attachment.meeting_id) {
                return Err(ApplyError::MissingReference {
                    record,
                    reference: meeting_ref(&attachment.meeting_id),
                });
            }
            workspace.attachments_mut().insert(attachment.attachment_id.clone(), attachment);
            delta.record_added(record);
            Ok(())
        }
        AttachmentOp::Update { attachment_id, patch } => {
            let record = attachment_ref(attachment_id);
            let Some(existing) = workspace.attachments_mut().get_mut(attachment_id) else {
                return Err(ApplyError::NotFound { record });
            };
            let mut next = existing.clone();
            if let Some(file_name) = &patch.file_name {
                next.file_name = file_name.trim().to_owned();
            }
            if let Some(media_type) = &patch.media_type {
                next.media_type = media_type.clone();
            }
            if let Some(size_bytes) = patch.size_bytes {
                next.size_bytes = size_bytes;
            }
            validated(record.clone(), &next, Attachment::validate)?;
            *existing = next;
            delta.record_updated(record);
            Ok(())
        }
        AttachmentOp::SetTranscript { attachment_id, text } => {
            let record = attachment_ref(attachment_id);
            let Some(existing) = workspace.attachments_mut().get_mut(attachment_id) else {
                return Err(ApplyError::NotFound { record });
            };
            existing.set_transcript(text.clone()).map_err(|source| {
                ApplyError::Transcription { attachment_id: attachment_id.clone(), source }
            })?;
            delta.record_updated(record);
            Ok(())
        }
        AttachmentOp::SetTranscriptionStatus { attachment_id, status } => {
            let record = attachment_ref(attachment_id);
            let Some(existing) = workspace.attachments_mut().get_mut(attachment_id) else {
                return Err(ApplyError::NotFound { record });
            };
            existing
                .set_transcription_status(status.clone())
                .map_err(|source| ApplyError::Transcription {
                    attachment_id: attachment_id.clone(),
                    source,
                })?;
            delta.record_updated(record);
            Ok(())
        }
        AttachmentOp::Delete { attachment_id } => {
            if !workspace.attachments().contains_key(attachment_id) {
                return Err(ApplyError::NotFound { record: attachment_ref(attachment_id) });
            }
            remove_attachment(workspace, attachment_id, delta);
            Ok(())
        }
    }
}

fn apply_annotation_op(
    workspace: &mut Workspace,
    op: &AnnotationOp,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        AnnotationOp::Add { annotation } => {
            let record = annotation_ref(&annotation.annotation_id);
            if workspace.annotations().contains_key(&annotation.annotation_id) {
                return Err(ApplyError::AlreadyExists { record });
            }
            let Some(attachment) = workspace.attachments().get(&annotation.attachment_id) else {
                return Err(ApplyError::MissingReference {
                    record,
                    reference: attachment_ref(&annotation.attachment_id),
                });
            };
            validate_selection(
                attachment.transcript_text(),
                annotation.start_offset,
                annotation.end_offset,
                &annotation.selected_text,
            )
            .map_err(|source| ApplyError::Annotation {
                annotation_id: annotation.annotation_id.clone(),
                source,
            })?;
            let mut annotation = annotation.clone();
            annotation.correction = annotation
                .correction
                .take()
                .map(|correction| correction.trim().to_owned())
                .filter(|correction| !correction.is_empty());
            workspace.annotations_mut().insert(annotation.annotation_id.clone(), annotation);
            delta.record_added(record);
            Ok(())
        }
        AnnotationOp::Update { annotation_id, error_type, correction } => {
            let record = annotation_ref(annotation_id);
            let Some(existing) = workspace.annotations_mut().get_mut(annotation_id) else {
                return Err(ApplyError::NotFound { record });
            };
            if let Some(error_type) = error_type {
                existing.error_type = *error_type;
            }
            if let Some(correction) = correction {
                existing.correction = correction
                    .as_deref()
                    .map(str::trim)
                    .filter(|correction| !correction.is_empty())
                    .map(str::to_owned);
            }
            delta.record_updated(record);
            Ok(())
        }
        AnnotationOp::Remove { annotation_id } => {
            let record = annotation_ref(annotation_id);
            if workspace.annotations_mut().remove(annotation_id).is_none() {
                return Err(ApplyError::NotFound { record });
            }
            delta.record_removed(record);
            Ok(())
        }
    }
}

fn apply_guide_record_op(
    workspace: &mut Workspace,
    op: &GuideRecordOp,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        GuideRecordOp::Create { guide } => {
            let record = guide_ref(&guide.guide_id);
            if workspace.guides().contains_key(&guide.guide_id) {
                return Err(ApplyError::AlreadyExists { record });
            }
            let mut guide = guide.clone();
            guide.normalize();
            validated(record.clone(), &guide, Guide::validate)?;
            ensure_research(workspace, &record, guide.research_id.as_ref())?;
            workspace.guides_mut().insert(guide.guide_id.clone(), guide);
            delta.record_added(record);
            Ok(())
        }
        GuideRecordOp::Update { guide_id, name, research_id } => {
            let record = guide_ref(guide_id);
            if let Some(Some(research_id)) = research_id {
                ensure_research(workspace, &record, Some(research_id))?;
            }
            let Some(existing) = workspace.guides_mut().get_mut(guide_id) else {
                return Err(ApplyError::NotFound { record });
            };
            if let Some(name) = name {
                let name = name.trim();
                if name.is_empty() {
                    return Err(ApplyError::Validation {
                        record,
                        source: ValidationError::Required { field: "name" },
                    });
                }
                existing.name = name.to_owned();
            }
            if let Some(research_id) = research_id {
                existing.research_id = research_id.clone();
            }
            delta.record_updated(record);
            Ok(())
        }
        GuideRecordOp::Edit { guide_id, ops } => {
            let record = guide_ref(guide_id);
            let Some(existing) = workspace.guides_mut().get_mut(guide_id) else {
                return Err(ApplyError::NotFound { record });
            };
            apply_guide_ops(existing, ops)
                .map_err(|source| ApplyError::Guide { guide_id: guide_id.clone(), source })?;
            delta.record_updated(record);
            Ok(())
        }
        GuideRecordOp::Delete { guide_id } => {
            let record = guide_ref(guide_id);
            if workspace.guides_mut().remove(guide_id).is_none() {
                return Err(ApplyError::NotFound { record });
            }
            delta.record_removed(record);
            Ok(())
        }
    }
}

fn apply_filter_op(
    workspace: &mut Workspace,
    op: &FilterOp,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        FilterOp::Save { filter } => {
            let record = filter_ref(&filter.filter_id);
            let mut filter = filter.clone();
            filter.name = filter.name.trim().to_owned();
            validated(record.clone(), &filter, SavedFilter::validate)?;
            check_saved_filter(&filter).map_err(|err| ApplyError::Validation {
                record: record.clone(),
                source: ValidationError::Invalid { field: "conditions", reason: err.to_string() },
            })?;
            let replaced = workspace.filters_mut().insert(filter.filter_id.clone(), filter);
            if replaced.is_some() {
                delta.record_updated(record);
            } else {
                delta.record_added(record);
            }
            Ok(())
        }
        FilterOp::Delete { filter_id } => {
            let record = filter_ref(filter_id);
            if workspace.filters_mut().remove(filter_id).is_none() {
                return Err(ApplyError::NotFound { record });
            }
            delta.record_removed(record);
            Ok(())
        }
    }
}
