use serde::{Deserialize, Serialize};

/// A position in the text, measured in characters (not bytes).
///
/// This is the canonical flat-offset space of a document buffer.
pub type CharIdx = usize;

/// Position in line/character coordinates.
///
/// `character` is counted in the units of the active [`OffsetEncoding`], which is UTF-16
/// code units unless a host negotiated something else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
	/// Zero-based line index.
	pub line: u32,
	/// Zero-based character offset in the line.
	pub character: u32,
}

impl Position {
	/// Creates a new position.
	pub const fn new(line: u32, character: u32) -> Self {
		Self { line, character }
	}
}

impl std::fmt::Display for Position {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}", self.line, self.character)
	}
}

impl From<lsp_types::Position> for Position {
	fn from(pos: lsp_types::Position) -> Self {
		Self::new(pos.line, pos.character)
	}
}

impl From<Position> for lsp_types::Position {
	fn from(pos: Position) -> Self {
		lsp_types::Position {
			line: pos.line,
			character: pos.character,
		}
	}
}

/// Source span with start and end positions.
///
/// Both ends count as inside the span, so a cursor sitting right after the last character
/// of a name is still "on" that name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
	/// Start position.
	pub start: Position,
	/// End position.
	pub end: Position,
}

impl Span {
	/// Creates a new span.
	pub const fn new(start: Position, end: Position) -> Self {
		Self { start, end }
	}

	/// Creates a zero-length span at a position.
	pub const fn point(pos: Position) -> Self {
		Self { start: pos, end: pos }
	}

	/// Shorthand for a span from `(start_line, start_char)` to `(end_line, end_char)`.
	pub const fn from_coords(start_line: u32, start_char: u32, end_line: u32, end_char: u32) -> Self {
		Self::new(Position::new(start_line, start_char), Position::new(end_line, end_char))
	}

	/// Returns true when the span covers no text.
	pub fn is_empty(&self) -> bool {
		self.start >= self.end
	}

	/// Returns true when `pos` lies within the span, ends included.
	pub fn contains(&self, pos: Position) -> bool {
		self.start <= pos && pos <= self.end
	}

	/// Returns true when `other` lies entirely within this span.
	pub fn encloses(&self, other: &Span) -> bool {
		self.start <= other.start && other.end <= self.end
	}

	/// Returns true when this span is a tighter fit than `other` for the same position.
	///
	/// An enclosed span always wins. Because ends are inclusive, two spans that only share a
	/// boundary both contain it without either enclosing the other; there the later start
	/// wins, even when the earlier span is the smaller one. A cursor right after `a` in
	/// `a+bc` therefore resolves to `bc`'s side of the boundary, not to `a`.
	pub fn is_narrower_than(&self, other: &Span) -> bool {
		if other.encloses(self) {
			return self != other;
		}
		if self.encloses(other) {
			return false;
		}
		self.start > other.start
	}
}

impl From<lsp_types::Range> for Span {
	fn from(range: lsp_types::Range) -> Self {
		Self::new(range.start.into(), range.end.into())
	}
}

impl From<Span> for lsp_types::Range {
	fn from(span: Span) -> Self {
		lsp_types::Range {
			start: span.start.into(),
			end: span.end.into(),
		}
	}
}

/// Offset encoding for the `character` column of a [`Position`].
///
/// Editors speaking LSP use UTF-16 by default, but hosts can negotiate different encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OffsetEncoding {
	/// UTF-8 byte offsets.
	#[serde(rename = "utf-8")]
	Utf8,
	/// UTF-16 code unit offsets.
	#[default]
	#[serde(rename = "utf-16")]
	Utf16,
	/// UTF-32 / Unicode codepoint offsets.
	#[serde(rename = "utf-32")]
	Utf32,
}

impl OffsetEncoding {
	/// Parse from an LSP position encoding kind.
	pub fn from_lsp(kind: &lsp_types::PositionEncodingKind) -> Option<Self> {
		match kind.as_str() {
			"utf-8" => Some(Self::Utf8),
			"utf-16" => Some(Self::Utf16),
			"utf-32" => Some(Self::Utf32),
			_ => None,
		}
	}

	/// Number of column units `c` occupies in this encoding.
	#[inline]
	pub fn len_of(self, c: char) -> usize {
		match self {
			Self::Utf8 => c.len_utf8(),
			Self::Utf16 => c.len_utf16(),
			Self::Utf32 => 1,
		}
	}
}
