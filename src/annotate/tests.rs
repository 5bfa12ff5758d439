// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::*;
use crate::model::AttachmentId;

fn annotation(id: &str, start: usize, end: usize, selected: &str) -> Annotation {
    Annotation::new(
        AnnotationId::new(id).expect("annotation id"),
        AttachmentId::new("a:1").expect("attachment id"),
        start,
        end,
        selected,
    )
}

#[derive(Default)]
struct RecordingSink {
    deleted: Vec<AnnotationId>,
    fail_on: Option<&'static str>,
}

impl AnnotationSink for RecordingSink {
    type Error = String;

    fn delete_annotation(&mut self, annotation_id: &AnnotationId) -> Result<(), Self::Error> {
        if self.fail_on == Some(annotation_id.as_str()) {
            return Err("backend unavailable".to_owned());
        }
        self.deleted.push(annotation_id.clone());
        Ok(())
    }
}

#[test]
fn char_index_slices_by_characters_not_bytes() {
    let index = CharIndex::new("héllo wörld");
    assert_eq!(index.char_len(), 11);
    assert_eq!(index.slice(1, 5), Some("éllo"));
    assert_eq!(index.slice(6, 11), Some("wörld"));
    assert_eq!(index.slice(6, 12), None);
    assert_eq!(index.byte_to_char(2), None);
    assert_eq!(index.byte_to_char(3), Some(2));
}

#[test]
fn validate_selection_reports_each_failure() {
    let text = "price and delivery";
    assert!(validate_selection(text, 0, 5, "price").is_ok());
    assert_eq!(
        validate_selection(text, 3, 3, ""),
        Err(AnnotationError::EmptyRange { start: 3, end: 3 })
    );
    assert_eq!(
        validate_selection(text, 10, 40, "delivery"),
        Err(AnnotationError::OutOfBounds { end: 40, len: 18 })
    );
    assert_eq!(
        validate_selection(text, 0, 5, "Price"),
        Err(AnnotationError::TextMismatch { expected: "Price".into(), found: "price".into() })
    );
}

#[test]
fn edit_before_range_makes_annotation_stale() {
    let stored = annotation("an:1", 10, 18, "delivery");
    assert!(annotation_is_valid("price and delivery", &stored));
    // Inserting text before the range shifts the content; offsets are not rebased.
    assert!(!annotation_is_valid("the price and delivery", &stored));
}

#[test]
fn edit_after_range_keeps_annotation() {
    let stored = annotation("an:1", 0, 5, "price");
    assert!(annotation_is_valid("price and delivery time", &stored));
}

#[test]
fn truncated_text_invalidates_ranges_past_the_end() {
    let stored = annotation("an:1", 10, 18, "delivery");
    assert!(!annotation_is_valid("price and deliv", &stored));
    assert!(!annotation_is_valid("", &stored));
}

#[test]
fn stale_annotations_keeps_input_order() {
    let list = vec![
        annotation("an:3", 0, 5, "price"),
        annotation("an:1", 6, 9, "and"),
        annotation("an:2", 10, 18, "delivery"),
    ];
    let stale = stale_annotations("price or delivery", &list);
    assert_eq!(
        stale.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
        vec!["an:1", "an:2"]
    );
}

#[test]
fn prune_continues_after_failed_deletion() {
    let list = vec![
        annotation("an:1", 0, 5, "price"),
        annotation("an:2", 6, 9, "and"),
        annotation("an:3", 10, 18, "delivery"),
    ];
    let mut sink = RecordingSink { fail_on: Some("an:2"), ..RecordingSink::default() };

    let report = prune_stale_annotations("cost", &list, &mut sink);

    assert_eq!(sink.deleted.iter().map(|id| id.as_str()).collect::<Vec<_>>(), vec!["an:1", "an:3"]);
    assert_eq!(report.removed, sink.deleted);
    assert_eq!(
        report.failed,
        vec![(AnnotationId::new("an:2").unwrap(), "backend unavailable".to_owned())]
    );
    assert!(!report.is_clean());
}

#[test]
fn prune_is_noop_when_text_still_matches() {
    let list = vec![annotation("an:1", 0, 5, "price")];
    let mut sink = RecordingSink::default();
    let report = prune_stale_annotations("price and delivery", &list, &mut sink);
    assert!(report.removed.is_empty());
    assert!(report.is_clean());
    assert!(sink.deleted.is_empty());
}

#[test]
fn overlapping_ranges_are_both_kept_valid() {
    let a = annotation("an:1", 0, 9, "price and");
    let b = annotation("an:2", 6, 18, "and delivery");
    assert!(a.overlaps(&b));
    assert!(stale_annotations("price and delivery", [&a, &b]).is_empty());
}

#[test]
fn overlay_segments_split_text_and_skip_overlaps() {
    let text = "price and delivery";
    let a = annotation("an:1", 0, 5, "price");
    let b = annotation("an:2", 3, 9, "ce and");
    let c = annotation("an:3", 10, 18, "delivery");
    let stale = annotation("an:4", 0, 4, "cost");

    let segments = overlay_segments(text, [&c, &stale, &b, &a]);
    let rendered = segments
        .iter()
        .map(|segment| match segment.annotation {
            Some(annotation) => format!("[{}:{}]", annotation.annotation_id, segment.text),
            None => segment.text.to_owned(),
        })
        .collect::<String>();
    assert_eq!(rendered, "[an:1:price] and [an:3:delivery]");
}
