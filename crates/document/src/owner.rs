use std::thread::{self, ThreadId};

use crate::BufferError;

/// Identity of the single thread allowed to mutate a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerToken {
	thread: ThreadId,
}

impl OwnerToken {
	/// Claims ownership for the calling thread.
	pub fn current() -> Self {
		Self {
			thread: thread::current().id(),
		}
	}

	/// Returns true when called from the owning thread.
	pub fn is_current(&self) -> bool {
		self.thread == thread::current().id()
	}

	/// Fails with [`BufferError::CrossThreadAccess`] off the owning thread.
	pub fn check(&self) -> Result<(), BufferError> {
		if self.is_current() {
			Ok(())
		} else {
			Err(BufferError::CrossThreadAccess)
		}
	}
}

impl Default for OwnerToken {
	fn default() -> Self {
		Self::current()
	}
}
