use serde::Serialize;

use crate::MarkerPattern;
use crate::PartialsError;
use crate::PartialsResult;
use crate::Point;
use crate::Position;

/// Separator used between lines of a normalized document and between the
/// contents of consecutive partial files.
pub const LINE_SEPARATOR: &str = "\n";

/// A marker-delimited region of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
	/// The block type taken from the start marker, e.g. `partial`.
	pub r#type: String,
	/// Lookup name taken from the start marker. May be empty.
	pub name: String,
	/// Whether the start marker carried the `optional` flag.
	pub optional: bool,
	/// Every line from the start marker through the end marker inclusive.
	pub lines: Vec<String>,
	/// Span of the block within the normalized document.
	pub position: Position,
}

impl Block {
	/// The original text of the block as it appears in the document.
	pub fn raw(&self) -> String {
		self.lines.join(LINE_SEPARATOR)
	}
}

/// How the scanner treats a block that is still open at the end of the
/// document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanMode {
	/// Unterminated blocks are dropped and left untouched in the document.
	#[default]
	Lenient,
	/// Unterminated blocks of a registered type are reported as
	/// [`PartialsError::UnclosedBlock`].
	Strict,
}

impl ScanMode {
	pub fn from_strict(strict: bool) -> Self {
		if strict { Self::Strict } else { Self::Lenient }
	}
}

struct BlockCreator {
	r#type: String,
	name: String,
	optional: bool,
	lines: Vec<String>,
	start: Point,
}

impl BlockCreator {
	fn into_block(self, end: Point) -> Block {
		Block {
			r#type: self.r#type,
			name: self.name,
			optional: self.optional,
			lines: self.lines,
			position: Position { start: self.start, end },
		}
	}
}

/// Normalize CRLF and lone CR line endings to LF.
pub fn normalize_line_endings(content: &str) -> String {
	if content.contains('\r') {
		content.replace("\r\n", "\n").replace('\r', "\n")
	} else {
		content.to_string()
	}
}

/// Walk the lines of a normalized document and collect every closed block in
/// document order.
///
/// A line matching the start marker opens a block; every following line is
/// appended to it until a line matching the end marker, which is appended
/// before the block is closed. A start marker that also contains the end
/// marker forms a single-line block.
///
/// Only blocks whose type satisfies `is_registered` are held to the marker
/// rules: opening a block while one of them is open is an error, and in
/// [`ScanMode::Strict`] so is leaving one open. A block of any other type,
/// such as `<!-- build:js app.js -->` closed by a foreign `<!-- endbuild -->`,
/// is dropped when another start marker supersedes it or the document ends,
/// leaving its lines untouched. It is only returned when it closes with the
/// end marker.
pub fn scan(
	content: &str,
	pattern: &MarkerPattern,
	mode: ScanMode,
	is_registered: impl Fn(&str) -> bool,
) -> PartialsResult<Vec<Block>> {
	let mut blocks = Vec::new();
	let mut current: Option<BlockCreator> = None;
	let mut offset = 0;

	for (index, line) in content.split(LINE_SEPARATOR).enumerate() {
		let line_number = index + 1;
		let line_start = offset;
		let line_end = offset + line.len();
		offset = line_end + LINE_SEPARATOR.len();

		if let Some(marker) = pattern.match_start(line) {
			if let Some(open) = current.take() {
				if is_registered(&open.r#type) {
					return Err(PartialsError::NestedBlock {
						name: marker.name,
						line: line_number,
					});
				}

				tracing::debug!(
					block_type = %open.r#type,
					line = open.start.line,
					"dropping superseded block of an unregistered type"
				);
			}

			current = Some(BlockCreator {
				r#type: marker.r#type,
				name: marker.name,
				optional: marker.optional,
				lines: Vec::new(),
				start: Point {
					line: line_number,
					offset: line_start,
				},
			});
		}

		let Some(creator) = current.as_mut() else {
			continue;
		};
		creator.lines.push(line.to_string());

		if pattern.is_end(line) {
			if let Some(creator) = current.take() {
				blocks.push(creator.into_block(Point {
					line: line_number,
					offset: line_end,
				}));
			}
		}
	}

	if let Some(creator) = current {
		match mode {
			ScanMode::Strict if is_registered(&creator.r#type) => {
				return Err(PartialsError::UnclosedBlock {
					name: creator.name,
					line: creator.start.line,
				});
			}
			_ => {
				tracing::debug!(
					name = %creator.name,
					line = creator.start.line,
					"dropping block without a closing marker"
				);
			}
		}
	}

	Ok(blocks)
}
