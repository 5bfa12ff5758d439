// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::NaiveDate;

use super::annotation::{Annotation, ErrorType};
use super::attachment::{Attachment, TranscriptionStatus};
use super::filter::{FilterCondition, FilterOperator, SavedFilter, SortSpec, TableKind};
use super::guide::{Guide, GuideBlock, Question};
use super::ids::{
    AnnotationId, AttachmentId, BlockId, FilterId, GuideId, JtbdId, MeetingId, QuestionId,
    ResearchId, WorkspaceId,
};
use super::jtbd::{Jtbd, Priority};
use super::meeting::{Meeting, MeetingStatus};
use super::research::{Research, ResearchStatus};
use super::workspace::Workspace;

pub(crate) const DEMO_TRANSCRIPT: &str =
    "Interviewer: How do you pick a supplier?\nRespondent: Mostly on price, then delivery time.";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("hard-coded demo date is valid")
}

fn rid(value: &str) -> ResearchId {
    ResearchId::new(value).expect("hard-coded demo id is valid")
}

fn mid(value: &str) -> MeetingId {
    MeetingId::new(value).expect("hard-coded demo id is valid")
}

fn jid(value: &str) -> JtbdId {
    JtbdId::new(value).expect("hard-coded demo id is valid")
}

fn bid(value: &str) -> BlockId {
    BlockId::new(value).expect("hard-coded demo id is valid")
}

fn qid(value: &str) -> QuestionId {
    QuestionId::new(value).expect("hard-coded demo id is valid")
}

/// A small, fully linked workspace used by `--demo` and by tests.
pub fn demo_workspace() -> Workspace {
    let mut workspace =
        Workspace::new(WorkspaceId::new("w:demo").expect("hard-coded demo id is valid"));

    let mut procurement =
        Research::new(rid("r:1"), "Procurement discovery", date(2026, 1, 12), date(2026, 3, 20));
    procurement.status = ResearchStatus::InProgress;
    procurement.team = vec!["Ada".to_owned(), "Bruno".to_owned()];
    procurement.customer = Some("Acme Supply".to_owned());
    procurement.description = "How mid-size buyers choose suppliers.".to_owned();

    let mut onboarding =
        Research::new(rid("r:2"), "Onboarding usability", date(2026, 2, 2), date(2026, 2, 27));
    onboarding.status = ResearchStatus::Planned;
    onboarding.team = vec!["Chen".to_owned()];

    let mut pricing =
        Research::new(rid("r:3"), "Pricing page test", date(2025, 11, 3), date(2025, 12, 19));
    pricing.status = ResearchStatus::Completed;
    pricing.team = vec!["Ada".to_owned(), "Dana".to_owned()];

    for research in [procurement, onboarding, pricing] {
        workspace.researches_mut().insert(research.research_id.clone(), research);
    }

    let meetings = [
        ("m:1", Some("r:1"), "Buyer interview #1", "Eva Ruiz", "Head of Procurement", "Northwind", date(2026, 1, 20), MeetingStatus::Completed),
        ("m:2", Some("r:1"), "Buyer interview #2", "Femi Ade", "Category Manager", "Contoso", date(2026, 2, 3), MeetingStatus::Completed),
        ("m:3", Some("r:1"), "Buyer interview #3", "Gus Hahn", "Purchasing Lead", "Fabrikam", date(2026, 2, 17), MeetingStatus::Scheduled),
        ("m:4", Some("r:2"), "First-run walkthrough", "Hana Ito", "Office Manager", "Litware", date(2026, 2, 10), MeetingStatus::Scheduled),
        ("m:5", None, "Ad-hoc customer call", "Ivan Petrov", "CTO", "Tailspin", date(2026, 2, 12), MeetingStatus::Cancelled),
    ];
    for (id, research_id, title, respondent, position, company, when, status) in meetings {
        let mut meeting = Meeting::new(mid(id), title, respondent, when);
        meeting.research_id = research_id.map(rid);
        meeting.respondent_position = position.to_owned();
        meeting.company = company.to_owned();
        meeting.status = status;
        workspace.meetings_mut().insert(meeting.meeting_id.clone(), meeting);
    }

    let attachment_id = AttachmentId::new("a:1").expect("hard-coded demo id is valid");
    let mut recording = Attachment::new(attachment_id.clone(), mid("m:1"), "buyer-1.m4a");
    recording.media_type = "audio/mp4".to_owned();
    recording.size_bytes = 18_432_000;
    recording.transcript = Some(DEMO_TRANSCRIPT.to_owned());
    recording.transcription_status = TranscriptionStatus::Completed;
    workspace.attachments_mut().insert(attachment_id.clone(), recording);

    let mut notes = Attachment::new(
        AttachmentId::new("a:2").expect("hard-coded demo id is valid"),
        mid("m:2"),
        "buyer-2.m4a",
    );
    notes.media_type = "audio/mp4".to_owned();
    notes.transcription_status = TranscriptionStatus::Processing;
    workspace.attachments_mut().insert(notes.attachment_id.clone(), notes);

    let price_start = DEMO_TRANSCRIPT.find("price").expect("demo transcript mentions price");
    let price_start = DEMO_TRANSCRIPT[..price_start].chars().count();
    let mut annotation = Annotation::new(
        AnnotationId::new("an:1").expect("hard-coded demo id is valid"),
        attachment_id,
        price_start,
        price_start + "price".chars().count(),
        "price",
    );
    annotation.error_type = ErrorType::Misheard;
    annotation.correction = Some("prices".to_owned());
    workspace.annotations_mut().insert(annotation.annotation_id.clone(), annotation);

    let jtbds = [
        ("j:1", None, "Choose a reliable supplier", Priority::High, Some("procurement")),
        ("j:2", Some("j:1"), "Compare offers quickly", Priority::Critical, Some("procurement")),
        ("j:3", Some("j:1"), "Verify delivery track record", Priority::Medium, None),
        ("j:4", Some("j:2"), "Normalize quotes to one currency", Priority::Low, None),
        ("j:5", None, "Get a new hire productive", Priority::Medium, Some("onboarding")),
    ];
    for (id, parent, title, priority, category) in jtbds {
        let mut jtbd = Jtbd::new(jid(id), title);
        jtbd.parent_id = parent.map(jid);
        jtbd.priority = priority;
        jtbd.category = category.map(ToOwned::to_owned);
        jtbd.research_id = Some(if category == Some("onboarding") { rid("r:2") } else { rid("r:1") });
        workspace.jtbds_mut().insert(jtbd.jtbd_id.clone(), jtbd);
    }

    let mut guide =
        Guide::new(GuideId::new("g:1").expect("hard-coded demo id is valid"), "Buyer interview");
    guide.research_id = Some(rid("r:1"));
    let mut intro = GuideBlock::new(bid("b:1"), "Warm-up");
    intro.questions.push(Question::new(qid("q:1"), "Tell me about your role."));
    let mut process = GuideBlock::new(bid("b:2"), "Supplier selection");
    process.questions.push(Question::new(qid("q:2"), "Walk me through the last purchase."));
    process.questions.push(Question::new(qid("q:3"), "Who else is involved?"));
    let mut criteria = GuideBlock::new(bid("b:3"), "Criteria");
    criteria.questions.push(Question::new(qid("q:4"), "What matters most when comparing offers?"));
    process.sub_blocks.push(criteria);
    guide.blocks = vec![intro, process];
    workspace.guides_mut().insert(guide.guide_id.clone(), guide);

    let mut upcoming = SavedFilter::new(
        FilterId::new("f:1").expect("hard-coded demo id is valid"),
        "Upcoming interviews",
        TableKind::Meetings,
    );
    upcoming.conditions.push(FilterCondition::new(
        "status",
        FilterOperator::Equals,
        vec!["scheduled".to_owned()],
    ));
    upcoming.sort.push(SortSpec::asc("date"));
    workspace.filters_mut().insert(upcoming.filter_id.clone(), upcoming);

    workspace
}
