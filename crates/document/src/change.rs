use lsp_types::TextDocumentContentChangeEvent;
use quarry_primitives::{Position, Span};

/// A single edit inside a [`ChangeSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
	/// Replace the entire content.
	WholeBuffer {
		/// New document text.
		text: String,
	},
	/// Replace the text covered by `span` (pre-batch positions).
	Span {
		/// Replaced range. Equal start and end is a pure insertion.
		span: Span,
		/// Text spliced in at the span start.
		text: String,
	},
}

impl Change {
	/// Creates a whole-buffer replacement.
	pub fn whole(text: impl Into<String>) -> Self {
		Self::WholeBuffer { text: text.into() }
	}

	/// Creates a replacement of `span` with `text`.
	pub fn replace(span: Span, text: impl Into<String>) -> Self {
		Self::Span {
			span,
			text: text.into(),
		}
	}

	/// Creates an insertion at `pos`.
	pub fn insert(pos: Position, text: impl Into<String>) -> Self {
		Self::replace(Span::point(pos), text)
	}

	/// Creates a deletion of `span`.
	pub fn delete(span: Span) -> Self {
		Self::replace(span, String::new())
	}

	/// Returns true for a whole-buffer replacement.
	pub fn is_whole_buffer(&self) -> bool {
		matches!(self, Self::WholeBuffer { .. })
	}

	/// Inserted text of this change.
	pub fn text(&self) -> &str {
		match self {
			Self::WholeBuffer { text } | Self::Span { text, .. } => text,
		}
	}
}

impl From<TextDocumentContentChangeEvent> for Change {
	fn from(event: TextDocumentContentChangeEvent) -> Self {
		match event.range {
			Some(range) => Self::replace(range.into(), event.text),
			None => Self::whole(event.text),
		}
	}
}

/// One host-originated edit notification.
///
/// Span positions refer to the document as it was at `from_version`, and spans must be
/// listed from the end of the document backwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
	/// Version the changes were computed against.
	pub from_version: i32,
	/// Version the document has once the changes are applied.
	pub to_version: i32,
	/// Ordered changes.
	pub changes: Vec<Change>,
}

impl ChangeSet {
	/// Creates a batch.
	pub fn new(from_version: i32, to_version: i32, changes: Vec<Change>) -> Self {
		Self {
			from_version,
			to_version,
			changes,
		}
	}

	/// Creates a batch holding one change.
	pub fn single(from_version: i32, to_version: i32, change: Change) -> Self {
		Self::new(from_version, to_version, vec![change])
	}

	/// Returns true when any change replaces the whole buffer.
	pub fn has_whole_buffer(&self) -> bool {
		self.changes.iter().any(Change::is_whole_buffer)
	}
}
