// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ids::{AttachmentId, MeetingId};
use super::validate::{require_text, ValidationError};

/// Progress of the transcription job attached to a media file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TranscriptionStatus {
    #[default]
    NotStarted,
    Pending,
    Processing,
    Completed,
    Failed { reason: String },
}

impl TranscriptionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed { .. } => "failed",
        }
    }

    /// Whether moving from `self` to `next` is a legal step of the job lifecycle.
    ///
    /// `not_started -> pending -> processing -> completed | failed`, plus retry
    /// (`failed -> pending`) and re-run (`completed -> pending`).
    pub fn can_transition_to(&self, next: &TranscriptionStatus) -> bool {
        matches!(
            (self, next),
            (Self::NotStarted, Self::Pending)
                | (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed { .. })
                | (Self::Failed { .. }, Self::Pending)
                | (Self::Completed, Self::Pending)
        )
    }
}

impl fmt::Display for TranscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { reason } => write!(f, "failed ({reason})"),
            other => f.write_str(other.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptionTransitionError {
    #[error("illegal transcription transition {from} -> {to}")]
    Illegal { from: String, to: String },
    #[error("cannot mark transcription completed without transcript text")]
    MissingTranscript,
    #[error("cannot clear the transcript of a completed transcription; re-run it first")]
    ClearCompleted,
}

/// A file attached to a meeting (recording, notes, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Attachment {
    pub attachment_id: AttachmentId,
    pub meeting_id: MeetingId,
    pub file_name: String,
    #[serde(default)]
    pub media_type: String,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub transcription_status: TranscriptionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl Attachment {
    pub fn new(
        attachment_id: AttachmentId,
        meeting_id: MeetingId,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            attachment_id,
            meeting_id,
            file_name: file_name.into(),
            media_type: String::new(),
            size_bytes: 0,
            transcription_status: TranscriptionStatus::default(),
            transcript: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("file_name", &self.file_name)?;
        if self.transcription_status == TranscriptionStatus::Completed && self.transcript.is_none() {
            return Err(ValidationError::Invalid {
                field: "transcript",
                reason: "a completed transcription needs transcript text".to_owned(),
            });
        }
        Ok(())
    }

    /// New attachments enter the lifecycle at `not_started`.
    pub fn validate_new(&self) -> Result<(), ValidationError> {
        self.validate()?;
        if self.transcription_status != TranscriptionStatus::NotStarted {
            return Err(ValidationError::Invalid {
                field: "transcription_status",
                reason: format!(
                    "new attachments start as not_started, got {}",
                    self.transcription_status
                ),
            });
        }
        Ok(())
    }

    /// Replaces the transcript. Clearing it is refused while the job is `completed`.
    pub fn set_transcript(
        &mut self,
        text: Option<String>,
    ) -> Result<(), TranscriptionTransitionError> {
        if text.is_none() && self.transcription_status == TranscriptionStatus::Completed {
            return Err(TranscriptionTransitionError::ClearCompleted);
        }
        self.transcript = text;
        Ok(())
    }

    pub fn transcript_text(&self) -> &str {
        self.transcript.as_deref().unwrap_or("")
    }

    pub fn set_transcription_status(
        &mut self,
        next: TranscriptionStatus,
    ) -> Result<(), TranscriptionTransitionError> {
        if !self.transcription_status.can_transition_to(&next) {
            return Err(TranscriptionTransitionError::Illegal {
                from: self.transcription_status.to_string(),
                to: next.to_string(),
            });
        }
        if next == TranscriptionStatus::Completed && self.transcript.is_none() {
            return Err(TranscriptionTransitionError::MissingTranscript);
        }
        self.transcription_status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment() -> Attachment {
        Attachment::new(
            AttachmentId::new("a:1").unwrap(),
            MeetingId::new("m:1").unwrap(),
            "call.m4a",
        )
    }

    #[test]
    fn lifecycle_happy_path() {
        let mut attachment = attachment();
        attachment.set_transcription_status(TranscriptionStatus::Pending).unwrap();
        attachment.set_transcription_status(TranscriptionStatus::Processing).unwrap();
        attachment.transcript = Some("hello".to_owned());
        attachment.set_transcription_status(TranscriptionStatus::Completed).unwrap();
        assert_eq!(attachment.transcription_status, TranscriptionStatus::Completed);
    }

    #[test]
    fn skipping_steps_is_rejected() {
        let mut attachment = attachment();
        let err = attachment.set_transcription_status(TranscriptionStatus::Processing).unwrap_err();
        assert_eq!(
            err,
            TranscriptionTransitionError::Illegal {
                from: "not_started".to_owned(),
                to: "processing".to_owned()
            }
        );
    }

    #[test]
    fn completion_requires_transcript() {
        let mut attachment = attachment();
        attachment.set_transcription_status(TranscriptionStatus::Pending).unwrap();
        attachment.set_transcription_status(TranscriptionStatus::Processing).unwrap();
        assert_eq!(
            attachment.set_transcription_status(TranscriptionStatus::Completed),
            Err(TranscriptionTransitionError::MissingTranscript)
        );
    }

    #[test]
    fn completed_without_transcript_is_invalid() {
        let mut attachment = attachment();
        attachment.transcription_status = TranscriptionStatus::Completed;
        assert!(matches!(
            attachment.validate(),
            Err(ValidationError::Invalid { field: "transcript", .. })
        ));
        attachment.transcript = Some("hi".to_owned());
        assert!(attachment.validate().is_ok());
    }

    #[test]
    fn new_attachments_must_start_not_started() {
        let mut attachment = attachment();
        assert!(attachment.validate_new().is_ok());
        attachment.transcription_status = TranscriptionStatus::Processing;
        assert!(attachment.validate().is_ok());
        assert!(matches!(
            attachment.validate_new(),
            Err(ValidationError::Invalid { field: "transcription_status", .. })
        ));
    }

    #[test]
    fn clearing_completed_transcript_is_refused() {
        let mut attachment = attachment();
        attachment.set_transcription_status(TranscriptionStatus::Pending).unwrap();
        attachment.set_transcription_status(TranscriptionStatus::Processing).unwrap();
        attachment.set_transcript(Some("done".to_owned())).unwrap();
        attachment.set_transcription_status(TranscriptionStatus::Completed).unwrap();

        assert_eq!(attachment.set_transcript(None), Err(TranscriptionTransitionError::ClearCompleted));
        assert_eq!(attachment.transcript.as_deref(), Some("done"));

        attachment.set_transcription_status(TranscriptionStatus::Pending).unwrap();
        attachment.set_transcript(None).unwrap();
        assert_eq!(attachment.transcript, None);
    }

    #[test]
    fn failed_jobs_can_be_retried() {
        let failed = TranscriptionStatus::Failed { reason: "timeout".to_owned() };
        assert!(failed.can_transition_to(&TranscriptionStatus::Pending));
        assert!(!failed.can_transition_to(&TranscriptionStatus::Completed));
        assert_eq!(failed.to_string(), "failed (timeout)");
    }

    #[test]
    fn status_serializes_with_state_tag() {
        let failed = TranscriptionStatus::Failed { reason: "bad audio".to_owned() };
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "failed", "reason": "bad audio" }));
    }
}
