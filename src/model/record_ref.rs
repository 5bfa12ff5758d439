// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ids::{Id, IdError};

/// The kind of record stored in a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Research,
    Meeting,
    Jtbd,
    Attachment,
    Annotation,
    Guide,
    Filter,
}

impl RecordKind {
    pub const ALL: [RecordKind; 7] = [
        Self::Research,
        Self::Meeting,
        Self::Jtbd,
        Self::Attachment,
        Self::Annotation,
        Self::Guide,
        Self::Filter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Meeting => "meeting",
            Self::Jtbd => "jtbd",
            Self::Attachment => "attachment",
            Self::Annotation => "annotation",
            Self::Guide => "guide",
            Self::Filter => "filter",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = ParseRecordRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseRecordRefError::UnknownKind(s.to_owned()))
    }
}

/// Canonical reference to a record, used in deltas, UI selection and MCP payloads.
///
/// Canonical format: `<kind>/<id>`, e.g. `meeting/m:3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordRef {
    kind: RecordKind,
    id: String,
}

impl RecordRef {
    pub fn new<T>(kind: RecordKind, id: &Id<T>) -> Self {
        Self { kind, id: id.as_str().to_owned() }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Converts the raw id back into a typed id.
    pub fn typed_id<T>(&self) -> Id<T> {
        Id::new(self.id.clone()).expect("record ref ids are validated on construction")
    }

    pub fn parse(input: &str) -> Result<Self, ParseRecordRefError> {
        let (kind, id) = input.split_once('/').ok_or(ParseRecordRefError::MissingSeparator)?;
        let kind = kind.parse::<RecordKind>()?;
        let id: Id<()> = Id::new(id.to_owned()).map_err(ParseRecordRefError::InvalidId)?;
        Ok(Self { kind, id: id.into_string() })
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

impl FromStr for RecordRef {
    type Err = ParseRecordRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseRecordRefError {
    #[error("record ref must look like '<kind>/<id>'")]
    MissingSeparator,
    #[error("unknown record kind '{0}'")]
    UnknownKind(String),
    #[error("invalid record id: {0}")]
    InvalidId(IdError),
}
