/// Position tracking for documents and diagnostics
///
/// Stores editor locations (line/column, 0-indexed) and converts the
/// 1-indexed coordinates reported by the chemistry engine into them.
/// A span representing a range in a document (0-indexed for LSP compatibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// A position in a document (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a span from line/column coordinates
    pub fn from_coords(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start: Position::new(start_line, start_col),
            end: Position::new(end_line, end_col),
        }
    }

    /// Convert a single-line engine range (1-indexed line/column) to editor
    /// coordinates.
    ///
    /// The engine omits `end_column` for point diagnostics; the span then
    /// covers exactly one character, so the converted end column equals the
    /// converted start column plus one.
    pub fn from_engine(line: u32, column: u32, end_column: Option<u32>) -> Self {
        let start = Position::from_engine(line, column);
        let end_column = end_column.unwrap_or(column + 1);
        let end = Position::from_engine(line, end_column);
        Self { start, end }
    }

    /// Check if a position falls within this span
    pub fn contains(&self, position: Position) -> bool {
        if position.line < self.start.line || position.line > self.end.line {
            return false;
        }
        if position.line == self.start.line && position.column < self.start.column {
            return false;
        }
        if position.line == self.end.line && position.column > self.end.column {
            return false;
        }
        true
    }
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Convert a 1-indexed engine position to a 0-indexed editor position.
    ///
    /// Saturating: a malformed 0 coordinate from the engine maps to 0
    /// rather than wrapping.
    pub fn from_engine(line: u32, column: u32) -> Self {
        Self {
            line: line.saturating_sub(1),
            column: column.saturating_sub(1),
        }
    }
}
