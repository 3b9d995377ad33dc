use serde::Serialize;

/// A location within a normalized document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
	/// 1-indexed line number.
	pub line: usize,
	/// 0-indexed byte offset into the document.
	pub offset: usize,
}

/// The span covered by a block, from the first byte of its start marker line
/// to the last byte of its end marker line (excluding the line break).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
	pub start: Point,
	pub end: Point,
}

impl Position {
	/// Byte range of the span within the document.
	pub fn range(&self) -> std::ops::Range<usize> {
		self.start.offset..self.end.offset
	}
}
