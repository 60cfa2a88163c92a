//! Line-start offsets and conversion between positions and flat character offsets.

use ropey::Rope;

use crate::position::{CharIdx, OffsetEncoding, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineBounds {
	/// First character of the line.
	start: CharIdx,
	/// One past the last character before the line terminator.
	content_end: CharIdx,
}

/// Line table derived from a fixed text.
///
/// Recognised terminators are `\n`, `\r\n` and a lone `\r`. A text always has at least one
/// line, and a trailing terminator opens an empty final line.
///
/// The index keeps a clone of the rope it was built from, so it stays valid while the
/// original rope is edited.
#[derive(Debug, Clone)]
pub struct LineIndex {
	lines: Vec<LineBounds>,
	text: Rope,
	encoding: OffsetEncoding,
}

impl LineIndex {
	/// Builds the index for `text`, measuring columns in `encoding`.
	pub fn new(text: &Rope, encoding: OffsetEncoding) -> Self {
		let mut lines = Vec::new();
		let mut start = 0;
		let mut idx = 0;
		let mut chars = text.chars().peekable();

		while let Some(c) = chars.next() {
			match c {
				'\n' => {
					lines.push(LineBounds { start, content_end: idx });
					idx += 1;
					start = idx;
				}
				'\r' => {
					let content_end = idx;
					idx += 1;
					if chars.peek() == Some(&'\n') {
						chars.next();
						idx += 1;
					}
					lines.push(LineBounds { start, content_end });
					start = idx;
				}
				_ => idx += 1,
			}
		}
		lines.push(LineBounds { start, content_end: idx });

		Self {
			lines,
			text: text.clone(),
			encoding,
		}
	}

	/// Builds the index for a string slice.
	pub fn for_text(text: &str, encoding: OffsetEncoding) -> Self {
		Self::new(&Rope::from_str(text), encoding)
	}

	/// Number of lines, counting the empty line after a trailing terminator.
	pub fn line_count(&self) -> usize {
		self.lines.len()
	}

	/// Character offset where `line` starts.
	pub fn line_start(&self, line: usize) -> Option<CharIdx> {
		self.lines.get(line).map(|l| l.start)
	}

	/// Length of the indexed text in characters.
	pub fn len_chars(&self) -> CharIdx {
		self.text.len_chars()
	}

	/// Encoding used for columns.
	pub fn encoding(&self) -> OffsetEncoding {
		self.encoding
	}

	/// Converts a position to a flat character offset.
	///
	/// Columns past the end of a line clamp to the line's last character before the
	/// terminator. Lines past the end clamp to the end of the text. A column that falls in
	/// the middle of a multi-unit character rounds down to that character's start.
	pub fn offset(&self, pos: Position) -> CharIdx {
		let Some(bounds) = self.lines.get(pos.line as usize) else {
			return self.text.len_chars();
		};

		let mut remaining = pos.character as usize;
		let mut offset = bounds.start;
		let mut chars = self.text.chars_at(bounds.start);
		while remaining > 0 && offset < bounds.content_end {
			let Some(c) = chars.next() else { break };
			let width = self.encoding.len_of(c);
			if width > remaining {
				break;
			}
			remaining -= width;
			offset += 1;
		}
		offset
	}

	/// Converts a flat character offset back to a position.
	///
	/// Offsets inside a line terminator map to the end of that line's content, and offsets
	/// past the end map to the end of the text.
	pub fn position(&self, offset: CharIdx) -> Position {
		let offset = offset.min(self.text.len_chars());
		let line = self.lines.partition_point(|l| l.start <= offset).saturating_sub(1);
		let Some(bounds) = self.lines.get(line) else {
			return Position::default();
		};

		let end = offset.min(bounds.content_end);
		let character: usize = self
			.text
			.slice(bounds.start..end)
			.chars()
			.map(|c| self.encoding.len_of(c))
			.sum();
		Position::new(line as u32, character as u32)
	}
}
