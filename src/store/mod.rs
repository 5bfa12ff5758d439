// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for workspaces on disk.
//!
//! The store module reads/writes the workspace folder format (meta file, record collections,
//! guide files and per-table view state) used by both the TUI and MCP server.

pub mod workspace_folder;

pub use workspace_folder::{
    StoreError, WorkspaceFolder, WorkspaceMeta, WorkspaceMetaGuide, WorkspaceStatus,
    WriteDurability,
};
