//! Document text buffer kept in sync with a host editor.
//!
//! A [`DocumentBuffer`] owns the text of one open document and applies [`ChangeSet`]s as the
//! host delivers them. Batches carry before/after version numbers; the buffer drops stale
//! duplicates, refuses gaps, and requires the spans inside a batch to arrive in reverse
//! document order so that one line index built from the pre-batch text stays valid for the
//! whole batch.
//!
//! Mutation is single-writer: only the thread that created a buffer may change it. The
//! check is a runtime assertion ([`OwnerToken`]) rather than a lock.

mod buffer;
mod change;
mod error;
mod owner;

pub use buffer::{DocumentBuffer, UpdateOutcome};
pub use change::{Change, ChangeSet};
pub use error::BufferError;
pub use owner::OwnerToken;

/// A convenient type alias for `Result` with `E` = [`BufferError`].
pub type Result<T, E = BufferError> = std::result::Result<T, E>;
