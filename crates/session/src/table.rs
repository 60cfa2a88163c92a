use std::collections::HashMap;
use std::sync::Arc;

use lsp_types::Uri;
use quarry_analysis::AnalysisSnapshot;
use quarry_document::{ChangeSet, UpdateOutcome};
use tokio::runtime::Handle;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::document::OpenDocument;
use crate::scheduler::{AnalysisScheduler, Analyzer};
use crate::{Result, SessionError};

/// Open documents of one session, keyed by URI.
pub struct DocumentTable {
	analyzer: Arc<dyn Analyzer>,
	runtime: Handle,
	config: AnalysisConfig,
	documents: HashMap<Uri, OpenDocument>,
}

impl std::fmt::Debug for DocumentTable {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DocumentTable")
			.field("config", &self.config)
			.field("documents", &self.documents.len())
			.finish()
	}
}

impl DocumentTable {
	/// Creates an empty table whose passes run on `runtime`.
	pub fn new(analyzer: Arc<dyn Analyzer>, runtime: Handle, config: AnalysisConfig) -> Self {
		Self {
			analyzer,
			runtime,
			config,
			documents: HashMap::new(),
		}
	}

	/// Session configuration.
	pub fn config(&self) -> &AnalysisConfig {
		&self.config
	}

	/// Opens `uri` with its initial text.
	pub fn open(&mut self, uri: Uri, version: i32, text: &str) -> Result<&OpenDocument> {
		if self.documents.contains_key(&uri) {
			return Err(SessionError::AlreadyOpen(uri));
		}
		let scheduler =
			AnalysisScheduler::new(Arc::clone(&self.analyzer), self.runtime.clone()).with_debounce(self.config.debounce());
		let document = OpenDocument::open(uri.clone(), version, text, self.config.position_encoding, scheduler)?;
		Ok(&*self.documents.entry(uri).or_insert(document))
	}

	/// Applies edit batches to an open document.
	pub fn change<'a>(&mut self, uri: &Uri, sets: impl IntoIterator<Item = &'a ChangeSet>) -> Result<Vec<UpdateOutcome>> {
		self.get_mut(uri)?.apply(sets)
	}

	/// Replaces the text of an open document.
	pub fn reset(&mut self, uri: &Uri, version: i32, text: &str) -> Result<()> {
		self.get_mut(uri)?.reset(version, text)
	}

	/// Closes `uri`, cancelling its pending analysis.
	pub fn close(&mut self, uri: &Uri) -> Result<()> {
		let document = self
			.documents
			.remove(uri)
			.ok_or_else(|| SessionError::UnknownDocument(uri.clone()))?;
		document.scheduler().cancel();
		debug!(uri = uri.as_str(), version = document.version(), "Document closed");
		Ok(())
	}

	/// Open document for `uri`.
	pub fn get(&self, uri: &Uri) -> Option<&OpenDocument> {
		self.documents.get(uri)
	}

	/// Newest published snapshot of `uri`.
	pub fn latest_snapshot(&self, uri: &Uri) -> Result<Option<Arc<AnalysisSnapshot>>> {
		self.documents
			.get(uri)
			.map(OpenDocument::snapshot)
			.ok_or_else(|| SessionError::UnknownDocument(uri.clone()))
	}

	/// URIs of every open document.
	pub fn uris(&self) -> impl Iterator<Item = &Uri> + '_ {
		self.documents.keys()
	}

	/// Number of open documents.
	pub fn len(&self) -> usize {
		self.documents.len()
	}

	/// Returns true when no document is open.
	pub fn is_empty(&self) -> bool {
		self.documents.is_empty()
	}

	fn get_mut(&mut self, uri: &Uri) -> Result<&mut OpenDocument> {
		self.documents
			.get_mut(uri)
			.ok_or_else(|| SessionError::UnknownDocument(uri.clone()))
	}
}
