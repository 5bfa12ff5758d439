// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Transcript text with inline annotation markers and numbered notes.

use crate::annotate::{overlay_segments, stale_annotations};
use crate::model::Annotation;

/// Marks each displayed annotation as `«text»[n]` and lists the notes below the text.
///
/// Stale annotations are not drawn; their count is reported so the caller can prune them.
pub fn render_transcript<'a>(
    text: &'a str,
    annotations: impl IntoIterator<Item = &'a Annotation> + Clone,
) -> String {
    let mut body = String::with_capacity(text.len());
    let mut notes = Vec::new();
    for segment in overlay_segments(text, annotations.clone()) {
        match segment.annotation {
            None => body.push_str(segment.text),
            Some(annotation) => {
                notes.push(annotation);
                body.push_str(&format!("«{}»[{}]", segment.text, notes.len()));
            }
        }
    }

    let mut out = body;
    if !out.ends_with('\n') {
        out.push('\n');
    }
    if !notes.is_empty() {
        out.push('\n');
    }
    for (idx, annotation) in notes.iter().enumerate() {
        out.push_str(&format!(
            "[{}] {} {} {}..{}",
            idx + 1,
            annotation.annotation_id,
            annotation.error_type.as_str(),
            annotation.start_offset,
            annotation.end_offset
        ));
        if let Some(correction) = &annotation.correction {
            out.push_str(&format!(": {:?} -> {correction:?}", annotation.selected_text));
        }
        out.push('\n');
    }

    let stale = stale_annotations(text, annotations).len();
    if stale > 0 {
        out.push_str(&format!("({stale} stale annotation{} hidden)\n", if stale == 1 { "" } else { "s" }));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{demo_workspace, AnnotationId, AttachmentId};

    #[test]
    fn marks_annotated_ranges_and_lists_notes() {
        let workspace = demo_workspace();
        let attachment_id = AttachmentId::new("a:1").unwrap();
        let attachment = &workspace.attachments()[&attachment_id];
        let annotations = workspace.annotations_of(&attachment_id);

        let text = render_transcript(attachment.transcript_text(), annotations.iter().copied());
        assert!(text.contains("Mostly on «price»[1], then delivery time."));
        assert!(text.contains("[1] an:1 misheard"));
        assert!(text.contains(": \"price\" -> \"prices\""));
        assert!(!text.contains("stale"));
    }

    #[test]
    fn reports_stale_annotations() {
        let annotation = Annotation::new(
            AnnotationId::new("an:9").unwrap(),
            AttachmentId::new("a:1").unwrap(),
            0,
            5,
            "Hello",
        );
        let text = render_transcript("Howdy there", [&annotation]);
        assert_eq!(text, "Howdy there\n(1 stale annotation hidden)\n");
    }
}
