// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Plain-text rendering shared by the TUI and the MCP tools.
//!
//! Everything here produces deterministic Unicode text; the TUI wraps it in widgets and the MCP
//! `*.render_text` tools return it verbatim.

use std::fmt;

pub mod calendar;
pub mod outline;
pub mod roadmap;
pub mod table;
mod text;
pub mod transcript;

pub use calendar::render_calendar_text;
pub use outline::{render_guide_outline, render_jtbd_tree};
pub use roadmap::render_roadmap_text;
pub use table::render_table_page;
pub use transcript::render_transcript;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("canvas error: {0}")]
    Canvas(#[from] CanvasError),
    #[error("render width {width} is too small (minimum {minimum})")]
    TooNarrow { width: usize, minimum: usize },
    #[error("render width {width} is too large (maximum {maximum})")]
    TooWide { width: usize, maximum: usize },
}

pub const BOX_HORIZONTAL: char = '─';
pub const BOX_VERTICAL: char = '│';

const LEFT: u8 = 1 << 0;
const RIGHT: u8 = 1 << 1;
const UP: u8 = 1 << 2;
const DOWN: u8 = 1 << 3;

fn edges_of(ch: char) -> u8 {
    match ch {
        BOX_HORIZONTAL => LEFT | RIGHT,
        BOX_VERTICAL => UP | DOWN,
        _ => 0,
    }
}

fn junction(edges: u8) -> char {
    match edges {
        0 => ' ',
        1..=3 => '─',
        4 | 8 | 12 => '│',
        10 => '┌',
        9 => '┐',
        6 => '└',
        5 => '┘',
        14 => '├',
        13 => '┤',
        11 => '┬',
        7 => '┴',
        _ => '┼',
    }
}

/// A fixed-size character grid.
///
/// Plain characters overwrite. Horizontal and vertical rules merge into junctions where they meet,
/// so grids can be drawn line by line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<char>,
    edges: Vec<u8>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Result<Self, CanvasError> {
        let len = width.checked_mul(height).ok_or(CanvasError::AreaOverflow { width, height })?;
        Ok(Self { width, height, cells: vec![' '; len], edges: vec![0; len] })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Result<char, CanvasError> {
        let idx = self.index_of(x, y)?;
        Ok(self.render_at(x, y, idx))
    }

    pub fn set(&mut self, x: usize, y: usize, ch: char) -> Result<(), CanvasError> {
        let idx = self.index_of(x, y)?;
        match edges_of(ch) {
            0 => {
                self.cells[idx] = ch;
                self.edges[idx] = 0;
            }
            edges => self.edges[idx] |= edges,
        }
        Ok(())
    }

    /// Writes `text` starting at `(x, y)`, clipping at the right edge.
    pub fn write_str(&mut self, x: usize, y: usize, text: &str) -> Result<(), CanvasError> {
        if y >= self.height {
            return Err(self.out_of_bounds(x, y));
        }
        for (col, ch) in (x..self.width).zip(text.chars()) {
            self.set(col, y, ch)?;
        }
        Ok(())
    }

    pub fn draw_hline(&mut self, x0: usize, x1: usize, y: usize) -> Result<(), CanvasError> {
        let (min_x, max_x) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        self.index_of(max_x, y)?;
        for x in min_x..=max_x {
            self.set(x, y, BOX_HORIZONTAL)?;
        }
        Ok(())
    }

    pub fn draw_vline(&mut self, x: usize, y0: usize, y1: usize) -> Result<(), CanvasError> {
        let (min_y, max_y) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        self.index_of(x, max_y)?;
        for y in min_y..=max_y {
            self.set(x, y, BOX_VERTICAL)?;
        }
        Ok(())
    }

    /// Rendered rows with trailing blanks trimmed and trailing empty rows dropped.
    pub fn to_trimmed_string(&self) -> String {
        let rendered = self.to_string();
        let mut lines = rendered.split('\n').map(str::trim_end).collect::<Vec<_>>();
        while matches!(lines.last(), Some(line) if line.is_empty()) {
            lines.pop();
        }
        lines.join("\n")
    }

    fn index_of(&self, x: usize, y: usize) -> Result<usize, CanvasError> {
        if x >= self.width || y >= self.height {
            return Err(self.out_of_bounds(x, y));
        }
        Ok(y * self.width + x)
    }

    fn out_of_bounds(&self, x: usize, y: usize) -> CanvasError {
        CanvasError::OutOfBounds { x, y, width: self.width, height: self.height }
    }

    fn render_at(&self, x: usize, y: usize, idx: usize) -> char {
        let edges = self.edges[idx];
        if edges == 0 {
            return self.cells[idx];
        }

        let mut connected = 0u8;
        if edges & LEFT != 0 && x > 0 && self.edges[idx - 1] & RIGHT != 0 {
            connected |= LEFT;
        }
        if edges & RIGHT != 0 && x + 1 < self.width && self.edges[idx + 1] & LEFT != 0 {
            connected |= RIGHT;
        }
        if edges & UP != 0 && y > 0 && self.edges[idx - self.width] & DOWN != 0 {
            connected |= UP;
        }
        if edges & DOWN != 0 && y + 1 < self.height && self.edges[idx + self.width] & UP != 0 {
            connected |= DOWN;
        }

        junction(if connected == 0 { edges } else { connected })
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use std::fmt::Write as _;

        for y in 0..self.height {
            for x in 0..self.width {
                f.write_char(self.render_at(x, y, y * self.width + x))?;
            }
            if y + 1 < self.height {
                f.write_char('\n')?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanvasError {
    #[error("canvas area overflow: {width}*{height}")]
    AreaOverflow { width: usize, height: usize },
    #[error("out of bounds: ({x},{y}) for {width}x{height} canvas")]
    OutOfBounds { x: usize, y: usize, width: usize, height: usize },
}
