// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{
    Annotation, Attachment, Guide, GuideId, IdError, Jtbd, Meeting, RecordCounts, Research,
    SavedFilter, TableKind, Workspace, WorkspaceId,
};
use crate::query::table::ViewState;

const WORKSPACE_META_FILENAME: &str = "parley-workspace.meta.json";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("json error at {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid id for {field}: {value:?}: {source}")]
    InvalidId {
        field: &'static str,
        value: String,
        #[source]
        source: IdError,
    },
    #[error("duplicate record {record} in {path:?}")]
    DuplicateRecord { path: PathBuf, record: String },
    #[error("guide file {path:?} holds {found}, expected {expected}")]
    GuideMismatch { path: PathBuf, expected: GuideId, found: GuideId },
    #[error("unsupported workspace format version {version} in {path:?}")]
    UnsupportedFormat { path: PathBuf, version: u32 },
    #[error("invalid relative path for {field}: {value:?}")]
    InvalidRelativePath { field: &'static str, value: PathBuf },
    #[error("path is outside workspace dir: workspace_dir={workspace_dir:?} path={path:?}")]
    PathOutsideWorkspace { workspace_dir: PathBuf, path: PathBuf },
    #[error("refusing to write through symlink at {path:?}")]
    SymlinkRefused { path: PathBuf },
}

impl StoreError {
    fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Index file describing where the workspace records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceMeta {
    pub workspace_id: WorkspaceId,
    pub rev: u64,
    pub guides: Vec<WorkspaceMetaGuide>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceMetaGuide {
    pub guide_id: GuideId,
    /// Absolute path resolved against the workspace root.
    pub path: PathBuf,
}

/// Health of the backing folder, as shown by the status surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WorkspaceStatus {
    pub root: String,
    pub reachable: bool,
    pub writable: bool,
    pub initialized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counts: Option<RecordCounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WorkspaceFolder {
    root: PathBuf,
    durability: WriteDurability,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to stable storage where
    /// possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

/// One JSON file per record collection, under `records/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    Research,
    Meetings,
    Jtbds,
    Attachments,
    Annotations,
    Filters,
}

impl Collection {
    fn file_name(self) -> &'static str {
        match self {
            Self::Research => "research.json",
            Self::Meetings => "meetings.json",
            Self::Jtbds => "jtbds.json",
            Self::Attachments => "attachments.json",
            Self::Annotations => "annotations.json",
            Self::Filters => "filters.json",
        }
    }
}

fn encode_persisted_id_segment(segment: &str) -> String {
    if !needs_windows_safe_filename_segment_encoding(segment) {
        return segment.to_owned();
    }

    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(1 + segment.len().saturating_mul(2));
    out.push('~');
    for &b in segment.as_bytes() {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}

fn needs_windows_safe_filename_segment_encoding(segment: &str) -> bool {
    if segment.starts_with('~') || segment == "." || segment == ".." {
        return true;
    }
    if segment.ends_with(' ') || segment.ends_with('.') {
        return true;
    }

    let trimmed = segment.trim_end_matches([' ', '.']);
    let base = trimmed.split('.').next().unwrap_or(trimmed);
    if is_windows_device_name(base) {
        return true;
    }

    segment.chars().any(|ch| {
        matches!(ch, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*')
            || ch <= '\u{1f}'
            || ch == '\u{7f}'
    })
}

fn is_windows_device_name(base: &str) -> bool {
    let base = base.to_ascii_uppercase();
    match base.as_str() {
        "CON" | "PRN" | "AUX" | "NUL" => true,
        _ => base
            .strip_prefix("COM")
            .or_else(|| base.strip_prefix("LPT"))
            .is_some_and(|num| matches!(num, "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9")),
    }
}

impl WorkspaceFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), durability: WriteDurability::default() }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn meta_path(&self) -> PathBuf {
        self.root.join(WORKSPACE_META_FILENAME)
    }

    fn collection_path(&self, collection: Collection) -> PathBuf {
        self.root.join("records").join(collection.file_name())
    }

    pub fn default_guide_path(&self, guide_id: &GuideId) -> PathBuf {
        let file_stem = encode_persisted_id_segment(guide_id.as_str());
        self.root.join("guides").join(format!("{file_stem}.guide.json"))
    }

    pub fn view_state_path(&self, table: TableKind) -> PathBuf {
        self.root.join("views").join(format!("{}.view.json", table.as_str()))
    }

    /// Directory for local, non-record files such as the log.
    pub fn local_dir(&self) -> PathBuf {
        self.root.join(".parley")
    }

    fn initial_workspace_id(&self) -> WorkspaceId {
        let candidate = self
            .root
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .map(|name| format!("w:{name}"))
            .unwrap_or_else(|| "w:workspace".to_owned());

        WorkspaceId::new(candidate).unwrap_or_else(|_| {
            WorkspaceId::new("w:workspace").expect("hard-coded fallback workspace id is valid")
        })
    }

    pub fn load_or_init_workspace(&self) -> Result<Workspace, StoreError> {
        match self.load_workspace() {
            Ok(workspace) => Ok(workspace),
            Err(StoreError::Io { path, source })
                if source.kind() == io::ErrorKind::NotFound && path == self.meta_path() =>
            {
                let workspace = Workspace::new(self.initial_workspace_id());
                self.save_workspace(&workspace)?;
                info!(root = %self.root.display(), "initialized empty workspace");
                Ok(workspace)
            }
            Err(err) => Err(err),
        }
    }

    pub fn save_workspace(&self, workspace: &Workspace) -> Result<(), StoreError> {
        let previous_guides = match self.load_meta() {
            Ok(meta) => meta.guides.into_iter().map(|guide| guide.path).collect::<Vec<_>>(),
            Err(err) if err.is_not_found() => Vec::new(),
            Err(err) => {
                warn!(error = %err, "ignoring unreadable workspace meta while saving");
                Vec::new()
            }
        };

        self.write_collection(Collection::Research, workspace.researches().values())?;
        self.write_collection(Collection::Meetings, workspace.meetings().values())?;
        self.write_collection(Collection::Jtbds, workspace.jtbds().values())?;
        self.write_collection(Collection::Attachments, workspace.attachments().values())?;
        self.write_collection(Collection::Annotations, workspace.annotations().values())?;
        self.write_collection(Collection::Filters, workspace.filters().values())?;

        let mut guides = Vec::with_capacity(workspace.guides().len());
        for (guide_id, guide) in workspace.guides() {
            let path = self.default_guide_path(guide_id);
            self.write_json(&path, guide)?;
            guides.push(WorkspaceMetaGuide { guide_id: guide_id.clone(), path });
        }

        let meta = WorkspaceMeta {
            workspace_id: workspace.workspace_id().clone(),
            rev: workspace.rev(),
            guides,
        };
        self.save_meta(&meta)?;

        let kept = meta.guides.iter().map(|guide| guide.path.clone()).collect::<BTreeSet<_>>();
        for stale in previous_guides.into_iter().filter(|path| !kept.contains(path)) {
            match fs::remove_file(&stale) {
                Ok(()) => debug!(path = %stale.display(), "removed stale guide file"),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => warn!(path = %stale.display(), error = %err, "cannot remove stale guide file"),
            }
        }

        debug!(rev = workspace.rev(), root = %self.root.display(), "saved workspace");
        Ok(())
    }

    pub fn load_workspace(&self) -> Result<Workspace, StoreError> {
        let meta = self.load_meta()?;
        let mut workspace = Workspace::new(meta.workspace_id);
        workspace.set_rev(meta.rev);

        let path = self.collection_path(Collection::Research);
        for research in self.read_collection::<Research>(Collection::Research)? {
            let key = research.research_id.clone();
            if workspace.researches_mut().insert(key.clone(), research).is_some() {
                return Err(StoreError::DuplicateRecord { path, record: key.to_string() });
            }
        }
        let path = self.collection_path(Collection::Meetings);
        for meeting in self.read_collection::<Meeting>(Collection::Meetings)? {
            let key = meeting.meeting_id.clone();
            if workspace.meetings_mut().insert(key.clone(), meeting).is_some() {
                return Err(StoreError::DuplicateRecord { path, record: key.to_string() });
            }
        }
        let path = self.collection_path(Collection::Jtbds);
        for jtbd in self.read_collection::<Jtbd>(Collection::Jtbds)? {
            let key = jtbd.jtbd_id.clone();
            if workspace.jtbds_mut().insert(key.clone(), jtbd).is_some() {
                return Err(StoreError::DuplicateRecord { path, record: key.to_string() });
            }
        }
        let path = self.collection_path(Collection::Attachments);
        for attachment in self.read_collection::<Attachment>(Collection::Attachments)? {
            let key = attachment.attachment_id.clone();
            if workspace.attachments_mut().insert(key.clone(), attachment).is_some() {
                return Err(StoreError::DuplicateRecord { path, record: key.to_string() });
            }
        }
        let path = self.collection_path(Collection::Annotations);
        for annotation in self.read_collection::<Annotation>(Collection::Annotations)? {
            let key = annotation.annotation_id.clone();
            if workspace.annotations_mut().insert(key.clone(), annotation).is_some() {
                return Err(StoreError::DuplicateRecord { path, record: key.to_string() });
            }
        }
        let path = self.collection_path(Collection::Filters);
        for filter in self.read_collection::<SavedFilter>(Collection::Filters)? {
            let key = filter.filter_id.clone();
            if workspace.filters_mut().insert(key.clone(), filter).is_some() {
                return Err(StoreError::DuplicateRecord { path, record: key.to_string() });
            }
        }

        for entry in meta.guides {
            let guide: Guide = self.read_json(&entry.path)?;
            if guide.guide_id != entry.guide_id {
                return Err(StoreError::GuideMismatch {
                    path: entry.path,
                    expected: entry.guide_id,
                    found: guide.guide_id,
                });
            }
            workspace.guides_mut().insert(entry.guide_id, guide);
        }

        debug!(rev = workspace.rev(), root = %self.root.display(), "loaded workspace");
        Ok(workspace)
    }

    pub fn load_meta(&self) -> Result<WorkspaceMeta, StoreError> {
        let meta_path = self.meta_path();
        let meta_json: WorkspaceMetaJson = self.read_json(&meta_path)?;
        workspace_meta_from_json(self.root(), &meta_path, meta_json)
    }

    /// Revision recorded on disk, without loading records.
    pub fn load_rev(&self) -> Result<u64, StoreError> {
        self.load_meta().map(|meta| meta.rev)
    }

    pub fn save_meta(&self, meta: &WorkspaceMeta) -> Result<(), StoreError> {
        fs::create_dir_all(self.root()).map_err(|source| StoreError::io(&self.root, source))?;
        let meta_json = workspace_meta_to_json(self.root(), meta)?;
        self.write_json(&self.meta_path(), &meta_json)
    }

    /// Persisted view state for `table`, reconciled against the current column catalog.
    ///
    /// Missing files yield the default view; unreadable or corrupt files are logged and also
    /// yield the default.
    pub fn load_view_state(&self, table: TableKind, default_page_size: usize) -> ViewState {
        let path = self.view_state_path(table);
        let mut view = match self.read_json::<ViewState>(&path) {
            Ok(view) if view.table == table => view,
            Ok(view) => {
                warn!(path = %path.display(), found = %view.table, "view state belongs to another table; using defaults");
                ViewState::default_for(table, default_page_size)
            }
            Err(err) if err.is_not_found() => ViewState::default_for(table, default_page_size),
            Err(err) => {
                warn!(error = %err, "cannot read view state; using defaults");
                ViewState::default_for(table, default_page_size)
            }
        };
        if view.reconcile() {
            debug!(table = %table, "reconciled view state with column catalog");
        }
        view
    }

    pub fn save_view_state(&self, view: &ViewState) -> Result<(), StoreError> {
        self.write_json(&self.view_state_path(view.table), view)
    }

    /// Reachability, writability and record counts of the folder. Never fails.
    pub fn status(&self) -> WorkspaceStatus {
        let root = self.root.display().to_string();
        let metadata = match fs::metadata(&self.root) {
            Ok(metadata) if metadata.is_dir() => metadata,
            Ok(_) => {
                return WorkspaceStatus {
                    root,
                    reachable: false,
                    writable: false,
                    initialized: false,
                    rev: None,
                    counts: None,
                    error: Some("workspace path is not a directory".to_owned()),
                };
            }
            Err(err) => {
                return WorkspaceStatus {
                    root,
                    reachable: false,
                    writable: false,
                    initialized: false,
                    rev: None,
                    counts: None,
                    error: Some(err.to_string()),
                };
            }
        };

        let writable = !metadata.permissions().readonly();
        match self.load_workspace() {
            Ok(workspace) => WorkspaceStatus {
                root,
                reachable: true,
                writable,
                initialized: true,
                rev: Some(workspace.rev()),
                counts: Some(workspace.counts()),
                error: None,
            },
            Err(err) if err.is_not_found() && !self.meta_path().exists() => WorkspaceStatus {
                root,
                reachable: true,
                writable,
                initialized: false,
                rev: None,
                counts: None,
                error: None,
            },
            Err(err) => WorkspaceStatus {
                root,
                reachable: true,
                writable,
                initialized: true,
                rev: None,
                counts: None,
                error: Some(err.to_string()),
            },
        }
    }

    fn read_collection<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>, StoreError> {
        match self.read_json::<Vec<T>>(&self.collection_path(collection)) {
            Ok(records) => Ok(records),
            Err(err) if err.is_not_found() => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    fn write_collection<'a, T: Serialize + 'a>(
        &self,
        collection: Collection,
        records: impl Iterator<Item = &'a T>,
    ) -> Result<(), StoreError> {
        let records = records.collect::<Vec<_>>();
        self.write_json(&self.collection_path(collection), &records)
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, StoreError> {
        let raw = fs::read_to_string(path).map_err(|source| StoreError::io(path, source))?;
        serde_json::from_str(&raw).map_err(|source| StoreError::Json { path: path.to_path_buf(), source })
    }

    fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|source| StoreError::Json { path: path.to_path_buf(), source })?;
        write_atomic_in_workspace(self.root(), path, format!("{json}\n").as_bytes(), self.durability)
    }
}

// Extracted JSON mapping and atomic write helpers for `WorkspaceFolder`.
include!("workspace_folder/helpers.rs");
