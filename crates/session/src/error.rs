use lsp_types::Uri;
use quarry_document::BufferError;
use thiserror::Error;

/// Errors reported by the session layer.
#[derive(Debug, Error)]
pub enum SessionError {
	/// The document buffer rejected an edit or reset.
	#[error(transparent)]
	Buffer(#[from] BufferError),
	/// No open document has this URI.
	#[error("document is not open: {}", .0.as_str())]
	UnknownDocument(Uri),
	/// A document with this URI is already open.
	#[error("document is already open: {}", .0.as_str())]
	AlreadyOpen(Uri),
	/// The analysis configuration could not be parsed.
	#[error("failed to parse analysis config: {0}")]
	Config(#[from] toml::de::Error),
}

impl SessionError {
	/// Returns true when the host must resend the full document.
	pub fn requires_resync(&self) -> bool {
		matches!(self, Self::Buffer(e) if e.requires_resync())
	}
}
