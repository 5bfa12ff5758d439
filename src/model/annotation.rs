// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ids::{AnnotationId, AttachmentId};

/// Classification of a transcription error marked by an annotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    Misheard,
    Spelling,
    Punctuation,
    Speaker,
    Terminology,
    #[default]
    Other,
}

impl ErrorType {
    pub const ALL: [ErrorType; 6] = [
        Self::Misheard,
        Self::Spelling,
        Self::Punctuation,
        Self::Speaker,
        Self::Terminology,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Misheard => "misheard",
            Self::Spelling => "spelling",
            Self::Punctuation => "punctuation",
            Self::Speaker => "speaker",
            Self::Terminology => "terminology",
            Self::Other => "other",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|error_type| error_type.as_str() == raw)
    }
}

/// A tagged `[start_offset, end_offset)` character range over an attachment transcript.
///
/// `selected_text` is the text the range covered when the annotation was recorded; the range is
/// only meaningful while the transcript still holds exactly that text at those offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Annotation {
    pub annotation_id: AnnotationId,
    pub attachment_id: AttachmentId,
    pub start_offset: usize,
    pub end_offset: usize,
    pub selected_text: String,
    #[serde(default)]
    pub error_type: ErrorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction: Option<String>,
}

impl Annotation {
    pub fn new(
        annotation_id: AnnotationId,
        attachment_id: AttachmentId,
        start_offset: usize,
        end_offset: usize,
        selected_text: impl Into<String>,
    ) -> Self {
        Self {
            annotation_id,
            attachment_id,
            start_offset,
            end_offset,
            selected_text: selected_text.into(),
            error_type: ErrorType::default(),
            correction: None,
        }
    }

    pub fn len(&self) -> usize {
        self.end_offset.saturating_sub(self.start_offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn overlaps(&self, other: &Annotation) -> bool {
        self.start_offset < other.end_offset && other.start_offset < self.end_offset
    }
}
