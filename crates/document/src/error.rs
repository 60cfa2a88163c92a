use quarry_primitives::CharIdx;
use thiserror::Error;

/// Errors produced while mutating a [`DocumentBuffer`](crate::DocumentBuffer).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
	/// The host skipped at least one notification. The buffer is left unmodified.
	#[error("missing prior versions: buffer is at {current}, batch starts at {from}")]
	MissingVersions {
		/// Version the buffer holds.
		current: i32,
		/// Version the rejected batch was computed against.
		from: i32,
	},
	/// A batch without a whole-buffer change does not move the version forward.
	#[error("cannot reduce version without resetting buffer ({from} -> {to})")]
	NonMonotonicVersion {
		/// Batch start version.
		from: i32,
		/// Batch end version.
		to: i32,
	},
	/// A span starts after the span that preceded it in the same batch.
	///
	/// Earlier changes of the batch have already been applied when this is reported.
	#[error("changes must be in reverse order of start location (offset {start} follows {previous})")]
	OutOfOrderChanges {
		/// Start offset of the previous change.
		previous: CharIdx,
		/// Start offset of the offending change.
		start: CharIdx,
	},
	/// Mutation attempted from a thread that does not own the buffer.
	#[error("document buffer must be mutated from the thread that created it")]
	CrossThreadAccess,
}

impl BufferError {
	/// Returns true when the host must send the full document again before further edits
	/// can be trusted.
	pub fn requires_resync(&self) -> bool {
		!matches!(self, Self::CrossThreadAccess)
	}

	/// Returns true when the rejected batch was partly applied, leaving text that matches
	/// no version.
	pub fn leaves_partial_edit(&self) -> bool {
		matches!(self, Self::OutOfOrderChanges { .. })
	}
}
