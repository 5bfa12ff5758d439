// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Annotated-text overlay.
//!
//! Annotations are `[start, end)` character ranges over a transcript that remember the text they
//! covered when recorded. Whenever the transcript changes, every annotation whose range no longer
//! covers exactly that text (including ranges that now run past the end of the text) is stale and
//! must be deleted. Deletion goes through an [`AnnotationSink`], one independent call per
//! annotation: there is no batching and no rollback if some deletions fail.

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{Annotation, AnnotationId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    #[error("annotation range is empty (start={start}, end={end})")]
    EmptyRange { start: usize, end: usize },
    #[error("annotation range ends at {end} but the text has {len} characters")]
    OutOfBounds { end: usize, len: usize },
    #[error("selected text {expected:?} does not match text at range {found:?}")]
    TextMismatch { expected: String, found: String },
}

/// Char-offset to byte-offset table for one text, built once per scan.
#[derive(Debug, Clone)]
pub struct CharIndex<'a> {
    text: &'a str,
    boundaries: Vec<usize>,
}

impl<'a> CharIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut boundaries = text.char_indices().map(|(byte, _)| byte).collect::<Vec<_>>();
        boundaries.push(text.len());
        Self { text, boundaries }
    }

    /// Number of characters in the text.
    pub fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// The text covered by the character range `[start, end)`, or `None` if out of bounds.
    pub fn slice(&self, start: usize, end: usize) -> Option<&'a str> {
        if start > end {
            return None;
        }
        let from = *self.boundaries.get(start)?;
        let to = *self.boundaries.get(end)?;
        Some(&self.text[from..to])
    }

    pub fn byte_to_char(&self, byte: usize) -> Option<usize> {
        self.boundaries.binary_search(&byte).ok()
    }
}

/// Checks a new selection before it is stored as an annotation.
pub fn validate_selection(
    text: &str,
    start: usize,
    end: usize,
    selected_text: &str,
) -> Result<(), AnnotationError> {
    if start >= end {
        return Err(AnnotationError::EmptyRange { start, end });
    }
    let index = CharIndex::new(text);
    let Some(found) = index.slice(start, end) else {
        return Err(AnnotationError::OutOfBounds { end, len: index.char_len() });
    };
    if found != selected_text {
        return Err(AnnotationError::TextMismatch {
            expected: selected_text.to_owned(),
            found: found.to_owned(),
        });
    }
    Ok(())
}

fn is_valid_in(index: &CharIndex<'_>, annotation: &Annotation) -> bool {
    annotation.start_offset < annotation.end_offset
        && index
            .slice(annotation.start_offset, annotation.end_offset)
            .is_some_and(|found| found == annotation.selected_text)
}

/// Whether `annotation` still covers its recorded text inside `text`.
pub fn annotation_is_valid(text: &str, annotation: &Annotation) -> bool {
    is_valid_in(&CharIndex::new(text), annotation)
}

/// Ids of annotations that no longer match `text`, in input order.
pub fn stale_annotations<'a>(
    text: &str,
    annotations: impl IntoIterator<Item = &'a Annotation>,
) -> Vec<AnnotationId> {
    let index = CharIndex::new(text);
    annotations
        .into_iter()
        .filter(|annotation| !is_valid_in(&index, annotation))
        .map(|annotation| annotation.annotation_id.clone())
        .collect()
}

/// The delete endpoint annotations are pruned through.
pub trait AnnotationSink {
    type Error: fmt::Display;

    fn delete_annotation(&mut self, annotation_id: &AnnotationId) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub removed: Vec<AnnotationId>,
    pub failed: Vec<(AnnotationId, String)>,
}

impl PruneReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Deletes every stale annotation through `sink`, one call each.
///
/// A failed deletion is logged and recorded; the scan continues with the next annotation.
pub fn prune_stale_annotations<'a, S: AnnotationSink>(
    text: &str,
    annotations: impl IntoIterator<Item = &'a Annotation>,
    sink: &mut S,
) -> PruneReport {
    let mut report = PruneReport::default();
    for annotation_id in stale_annotations(text, annotations) {
        match sink.delete_annotation(&annotation_id) {
            Ok(()) => {
                debug!(annotation_id = %annotation_id, "pruned stale annotation");
                report.removed.push(annotation_id);
            }
            Err(err) => {
                warn!(annotation_id = %annotation_id, error = %err, "failed to prune stale annotation");
                report.failed.push((annotation_id, err.to_string()));
            }
        }
    }
    report
}

/// A run of transcript text, either plain or covered by an annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlaySegment<'a> {
    pub text: &'a str,
    pub annotation: Option<&'a Annotation>,
}

/// Splits `text` into plain and annotated segments for display.
///
/// Stale annotations are skipped. When ranges overlap, the one starting first wins and later
/// overlapping ranges are not highlighted; the stored annotations are not touched.
pub fn overlay_segments<'a>(
    text: &'a str,
    annotations: impl IntoIterator<Item = &'a Annotation>,
) -> Vec<OverlaySegment<'a>> {
    let index = CharIndex::new(text);
    let mut valid = annotations
        .into_iter()
        .filter(|annotation| is_valid_in(&index, annotation))
        .collect::<Vec<_>>();
    valid.sort_by(|a, b| {
        a.start_offset.cmp(&b.start_offset).then_with(|| a.annotation_id.cmp(&b.annotation_id))
    });

    let mut segments = Vec::new();
    let mut cursor = 0usize;
    for annotation in valid {
        if annotation.start_offset < cursor {
            continue;
        }
        if annotation.start_offset > cursor {
            if let Some(plain) = index.slice(cursor, annotation.start_offset) {
                segments.push(OverlaySegment { text: plain, annotation: None });
            }
        }
        if let Some(covered) = index.slice(annotation.start_offset, annotation.end_offset) {
            segments.push(OverlaySegment { text: covered, annotation: Some(annotation) });
        }
        cursor = annotation.end_offset;
    }
    if cursor < index.char_len() {
        if let Some(rest) = index.slice(cursor, index.char_len()) {
            segments.push(OverlaySegment { text: rest, annotation: None });
        }
    }
    segments
}

#[cfg(test)]
mod tests;
