// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Ranked record search and transcript text search.

use memchr::memmem;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::annotate::CharIndex;
use crate::model::{AttachmentId, RecordKind, RecordRef, Workspace};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    Substring,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCandidate {
    pub record: RecordRef,
    pub label: String,
    haystack: String,
}

impl SearchCandidate {
    pub fn new(record: RecordRef, label: impl Into<String>, extra: &[&str]) -> Self {
        let label = label.into();
        let mut haystack = label.to_lowercase();
        for part in extra.iter().filter(|part| !part.is_empty()) {
            haystack.push(' ');
            haystack.push_str(&part.to_lowercase());
        }
        Self { record, label, haystack }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchHit {
    pub record: String,
    pub label: String,
    pub score: i64,
}

/// Searchable text of every record in the workspace.
pub fn candidates(workspace: &Workspace) -> Vec<SearchCandidate> {
    let mut out = Vec::new();
    for research in workspace.researches().values() {
        let team = research.team.join(" ");
        out.push(SearchCandidate::new(
            RecordRef::new(RecordKind::Research, &research.research_id),
            research.name.clone(),
            &[research.customer.as_deref().unwrap_or(""), &team, &research.description],
        ));
    }
    for meeting in workspace.meetings().values() {
        out.push(SearchCandidate::new(
            RecordRef::new(RecordKind::Meeting, &meeting.meeting_id),
            meeting.title.clone(),
            &[&meeting.respondent_name, &meeting.company, &meeting.respondent_position],
        ));
    }
    for jtbd in workspace.jtbds().values() {
        let tags = jtbd.tags.join(" ");
        out.push(SearchCandidate::new(
            RecordRef::new(RecordKind::Jtbd, &jtbd.jtbd_id),
            jtbd.title.clone(),
            &[jtbd.category.as_deref().unwrap_or(""), &tags],
        ));
    }
    for attachment in workspace.attachments().values() {
        out.push(SearchCandidate::new(
            RecordRef::new(RecordKind::Attachment, &attachment.attachment_id),
            attachment.file_name.clone(),
            &[&attachment.media_type],
        ));
    }
    for guide in workspace.guides().values() {
        out.push(SearchCandidate::new(RecordRef::new(RecordKind::Guide, &guide.guide_id), guide.name.clone(), &[]));
    }
    for filter in workspace.filters().values() {
        out.push(SearchCandidate::new(RecordRef::new(RecordKind::Filter, &filter.filter_id), filter.name.clone(), &[]));
    }
    out
}

/// Ranks `candidates` against `query`, best first, at most `limit` hits.
pub fn rank(candidates: &[SearchCandidate], query: &str, mode: SearchMode, limit: usize) -> Vec<SearchHit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut scored = candidates
        .iter()
        .filter_map(|candidate| {
            let score = match mode {
                SearchMode::Substring => substring_score(&needle, &candidate.haystack),
                SearchMode::Fuzzy => fuzzy_score(&needle, &candidate.haystack),
            }?;
            Some((score, candidate))
        })
        .collect::<Vec<_>>();

    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b.cmp(score_a).then_with(|| a.label.cmp(&b.label)).then_with(|| a.record.cmp(&b.record))
    });

    scored
        .into_iter()
        .take(limit)
        .map(|(score, candidate)| SearchHit {
            record: candidate.record.to_string(),
            label: candidate.label.clone(),
            score,
        })
        .collect()
}

pub fn search_records(workspace: &Workspace, query: &str, mode: SearchMode, limit: usize) -> Vec<SearchHit> {
    rank(&candidates(workspace), query, mode, limit)
}

fn substring_score(needle: &str, haystack: &str) -> Option<i64> {
    let first = haystack.find(needle)?;
    let starts = first == 0;
    let start_boundary =
        starts || haystack[..first].chars().last().is_some_and(is_boundary_char);
    let occurrences = haystack.match_indices(needle).count() as i64;

    let mut score = 200_000i64.saturating_sub((first as i64) * 1000);
    score += occurrences * 200;
    score -= haystack.chars().count() as i64;
    if starts {
        score += 50_000;
    }
    if start_boundary {
        score += 20_000;
    }
    if haystack == needle {
        score += 100_000;
    }
    Some(score)
}

fn fuzzy_score(needle: &str, haystack: &str) -> Option<i64> {
    let subseq = subsequence_stats(needle, haystack)?;
    let ratio = rapidfuzz::fuzz::ratio(needle.chars(), haystack.chars());
    let mut score = (ratio * 1000.0).round() as i64;
    score -= subseq.span as i64;
    score -= (subseq.first as i64) / 4;
    score += (subseq.consecutive as i64) * 40;
    if subseq.start_boundary {
        score += 150;
    }
    score += if haystack.contains(needle) { 2000 } else { 500 };
    Some(score)
}

#[derive(Debug, Clone, Copy)]
struct SubsequenceStats {
    first: usize,
    span: usize,
    consecutive: usize,
    start_boundary: bool,
}

fn subsequence_stats(needle: &str, haystack: &str) -> Option<SubsequenceStats> {
    let mut needle_iter = needle.chars().peekable();
    let mut first: Option<usize> = None;
    let mut last = 0usize;
    let mut prev_match: Option<usize> = None;
    let mut consecutive = 0usize;
    let mut start_boundary = false;
    let mut prev_hay: Option<char> = None;

    for (idx, ch) in haystack.chars().enumerate() {
        let Some(&want) = needle_iter.peek() else {
            break;
        };
        if ch == want {
            needle_iter.next();
            if first.is_none() {
                first = Some(idx);
                start_boundary = prev_hay.map_or(true, is_boundary_char);
            }
            if prev_match.is_some_and(|prev| idx == prev + 1) {
                consecutive += 1;
            }
            prev_match = Some(idx);
            last = idx;
        }
        prev_hay = Some(ch);
    }

    if needle_iter.peek().is_some() {
        return None;
    }
    let first = first?;
    Some(SubsequenceStats {
        first,
        span: last.saturating_sub(first).saturating_add(1),
        consecutive,
        start_boundary,
    })
}

fn is_boundary_char(ch: char) -> bool {
    matches!(ch, '/' | ':' | '-' | '_' | ' ' | '.' | ',')
}

/// Character offsets `[start, end)` of every non-overlapping occurrence of `needle`.
///
/// Matching is exact (case-sensitive) so results can seed new annotations.
pub fn find_in_text(text: &str, needle: &str) -> Vec<(usize, usize)> {
    if needle.is_empty() {
        return Vec::new();
    }
    let index = CharIndex::new(text);
    let needle_chars = needle.chars().count();
    let mut out = Vec::new();
    let mut next_free = 0usize;
    for byte in memmem::find_iter(text.as_bytes(), needle.as_bytes()) {
        if byte < next_free {
            continue;
        }
        if let Some(start) = index.byte_to_char(byte) {
            out.push((start, start + needle_chars));
            next_free = byte + needle.len();
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptMatch {
    pub attachment_id: AttachmentId,
    pub start_offset: usize,
    pub end_offset: usize,
}

pub fn search_transcripts(workspace: &Workspace, needle: &str) -> Vec<TranscriptMatch> {
    workspace
        .attachments()
        .values()
        .flat_map(|attachment| {
            find_in_text(attachment.transcript_text(), needle).into_iter().map(|(start, end)| {
                TranscriptMatch {
                    attachment_id: attachment.attachment_id.clone(),
                    start_offset: start,
                    end_offset: end,
                }
            })
        })
        .collect()
}
