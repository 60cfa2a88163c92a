use quarry_primitives::{CharIdx, LineIndex, OffsetEncoding};
use ropey::Rope;
use tracing::{debug, trace, warn};

use crate::{BufferError, Change, ChangeSet, OwnerToken, Result};

/// Result of a successful [`DocumentBuffer::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
	/// The batch was applied and the buffer moved to `version`.
	Applied {
		/// Buffer version after the batch.
		version: i32,
	},
	/// The batch predates the buffer and was dropped without touching it.
	Stale {
		/// Buffer version, unchanged.
		version: i32,
		/// Start version of the dropped batch.
		from: i32,
	},
}

impl UpdateOutcome {
	/// Returns true when the batch changed the buffer.
	pub fn is_applied(&self) -> bool {
		matches!(self, Self::Applied { .. })
	}
}

/// Mutable text of one open document.
///
/// Created when the document is opened (see [`reset`](Self::reset)), fed every edit
/// notification by its owner, and dropped on close.
#[derive(Debug)]
pub struct DocumentBuffer {
	text: Rope,
	/// `-1` until the first reset establishes a baseline.
	version: i32,
	owner: OwnerToken,
	encoding: OffsetEncoding,
}

impl Default for DocumentBuffer {
	fn default() -> Self {
		Self::new()
	}
}

impl DocumentBuffer {
	/// Version of a buffer that has not seen a baseline yet.
	pub const NO_BASELINE: i32 = -1;

	/// Creates an empty buffer owned by the calling thread, with UTF-16 columns.
	pub fn new() -> Self {
		Self::with_encoding(OffsetEncoding::default())
	}

	/// Creates an empty buffer owned by the calling thread.
	pub fn with_encoding(encoding: OffsetEncoding) -> Self {
		Self {
			text: Rope::new(),
			version: Self::NO_BASELINE,
			owner: OwnerToken::current(),
			encoding,
		}
	}

	/// Current version.
	pub fn version(&self) -> i32 {
		self.version
	}

	/// Returns true once a baseline version has been established.
	pub fn has_baseline(&self) -> bool {
		self.version >= 0
	}

	/// Snapshot of the current text. Cloning a rope is cheap.
	pub fn text(&self) -> Rope {
		self.text.clone()
	}

	/// Current text as an owned string.
	pub fn contents(&self) -> String {
		self.text.to_string()
	}

	/// Length of the text in characters.
	pub fn len_chars(&self) -> CharIdx {
		self.text.len_chars()
	}

	/// Encoding used for position columns.
	pub fn encoding(&self) -> OffsetEncoding {
		self.encoding
	}

	/// Thread allowed to mutate this buffer.
	pub fn owner(&self) -> OwnerToken {
		self.owner
	}

	/// Replaces the text and version unconditionally.
	///
	/// Used when the document is opened and for a full resync.
	pub fn reset(&mut self, version: i32, content: &str) -> Result<()> {
		self.owner.check()?;
		debug!(version, previous = self.version, len = content.len(), "Buffer reset");
		self.version = version;
		self.text = Rope::from_str(content);
		Ok(())
	}

	/// Applies batches in order, stopping at the first failure.
	pub fn update_all<'a>(&mut self, sets: impl IntoIterator<Item = &'a ChangeSet>) -> Result<Vec<UpdateOutcome>> {
		sets.into_iter().map(|set| self.update(set)).collect()
	}

	/// Applies one batch.
	///
	/// A batch behind the buffer is dropped and reported as [`UpdateOutcome::Stale`]. A
	/// batch ahead of it fails with [`BufferError::MissingVersions`]. Both checks, and the
	/// requirement that the batch moves the version forward, are skipped when the batch
	/// contains a whole-buffer change.
	pub fn update(&mut self, set: &ChangeSet) -> Result<UpdateOutcome> {
		self.owner.check()?;

		if !set.has_whole_buffer() {
			if self.has_baseline() {
				if set.from_version < self.version {
					debug!(version = self.version, from = set.from_version, "Dropping stale change set");
					return Ok(UpdateOutcome::Stale {
						version: self.version,
						from: set.from_version,
					});
				}
				if set.from_version > self.version {
					warn!(version = self.version, from = set.from_version, "Change set skips versions");
					return Err(BufferError::MissingVersions {
						current: self.version,
						from: set.from_version,
					});
				}
			}
			if set.from_version >= set.to_version {
				warn!(from = set.from_version, to = set.to_version, "Change set does not advance version");
				return Err(BufferError::NonMonotonicVersion {
					from: set.from_version,
					to: set.to_version,
				});
			}
		}

		let index = LineIndex::new(&self.text, self.encoding);
		let mut last_start = CharIdx::MAX;

		for change in &set.changes {
			match change {
				Change::WholeBuffer { text } => {
					trace!(len = text.len(), "Whole-buffer change");
					self.text = Rope::from_str(text);
				}
				Change::Span { span, text } => {
					let len = self.text.len_chars();
					let start = index.offset(span.start).min(len);
					if start > last_start {
						warn!(previous = last_start, start, "Change set spans out of order");
						return Err(BufferError::OutOfOrderChanges {
							previous: last_start,
							start,
						});
					}
					last_start = start;

					let end = index.offset(span.end).min(len);
					trace!(start, end, inserted = text.len(), "Span change");
					if end > start {
						self.text.remove(start..end);
					}
					if !text.is_empty() {
						self.text.insert(start, text);
					}
				}
			}
		}

		debug!(from = self.version, to = set.to_version, changes = set.changes.len(), "Change set applied");
		self.version = set.to_version;
		Ok(UpdateOutcome::Applied { version: self.version })
	}
}
