//! Line/column positions.
//!
//! The AST and diagnostics carry byte offsets. Positions are 0-based
//! internally; reporters add one when printing. Columns count characters,
//! not bytes.

use serde::{Deserialize, Serialize};

/// A position in a source file (0-indexed line and column).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    /// 0-indexed line number
    pub line: u32,
    /// 0-indexed column, in characters
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

/// Line map for efficient offset <-> position conversion.
/// Stores the starting offset of each line.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Starting offset of each line (line_starts[0] is always 0)
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Build a line map from source text.
    ///
    /// `\n`, `\r\n` and a lone `\r` all end a line.
    pub fn build(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut line_starts = vec![0u32];
        for i in memchr::memchr2_iter(b'\n', b'\r', bytes) {
            if bytes[i] == b'\r' && bytes.get(i + 1) == Some(&b'\n') {
                // the \n will create the line start
                continue;
            }
            line_starts.push((i + 1) as u32);
        }
        LineMap { line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset of the first character of `line`.
    pub fn line_start(&self, line: u32) -> Option<u32> {
        self.line_starts.get(line as usize).copied()
    }

    /// 0-based line containing `offset`.
    pub fn line_of(&self, offset: u32) -> u32 {
        match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact as u32,
            Err(insert_point) => insert_point.saturating_sub(1) as u32,
        }
    }

    /// Convert a byte offset to a Position (line, column).
    pub fn offset_to_position(&self, offset: u32, source: &str) -> Position {
        let line = self.line_of(offset);
        let line_start = self.line_start(line).unwrap_or(0);
        let clamped_end = (offset as usize).min(source.len());
        let start = (line_start as usize).min(clamped_end);
        let column = source
            .get(start..clamped_end)
            .map(|slice| slice.chars().count() as u32)
            .unwrap_or(0);
        Position { line, column }
    }

    /// Convert a Position (line, column) to a byte offset.
    pub fn position_to_offset(&self, position: Position, source: &str) -> Option<u32> {
        let line_start = self.line_start(position.line)? as usize;
        let rest = source.get(line_start..)?;
        let mut remaining = position.column;
        for (idx, ch) in rest.char_indices() {
            if remaining == 0 || ch == '\n' || ch == '\r' {
                return Some((line_start + idx) as u32);
            }
            remaining -= 1;
        }
        Some(source.len() as u32)
    }

    /// The text of `line` without its terminator.
    pub fn line_text<'a>(&self, line: u32, source: &'a str) -> &'a str {
        let Some(start) = self.line_start(line) else {
            return "";
        };
        let end = self
            .line_start(line + 1)
            .unwrap_or(source.len() as u32)
            .min(source.len() as u32);
        source
            .get(start as usize..end as usize)
            .unwrap_or("")
            .trim_end_matches(['\n', '\r'])
    }
}
