// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Parley: research projects, interview meetings, jobs-to-be-done and annotated transcripts.
//!
//! Records live in a folder of JSON files ([`store`]), change only through op batches ([`ops`]),
//! and are shown by a ratatui TUI ([`tui`]) and an MCP tool server ([`mcp`]).

pub mod annotate;
pub mod config;
pub mod guide;
pub mod mcp;
pub mod model;
pub mod ops;
pub mod query;
pub mod render;
pub mod store;
pub mod tui;
pub mod ui;
