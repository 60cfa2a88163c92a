use std::sync::Arc;

use lsp_types::Uri;
use quarry_analysis::AnalysisSnapshot;
use quarry_document::{ChangeSet, DocumentBuffer, UpdateOutcome};
use quarry_primitives::OffsetEncoding;
use tracing::{debug, warn};

use crate::Result;
use crate::scheduler::{AnalysisRequest, AnalysisScheduler, SnapshotReceiver};

/// One open document: its buffer plus the analysis passes run over it.
///
/// Must be edited from the thread that opened it.
#[derive(Debug)]
pub struct OpenDocument {
	uri: Uri,
	buffer: DocumentBuffer,
	scheduler: AnalysisScheduler,
	scheduled: u64,
}

impl OpenDocument {
	/// Establishes the baseline text and schedules the first analysis.
	pub fn open(uri: Uri, version: i32, text: &str, encoding: OffsetEncoding, scheduler: AnalysisScheduler) -> Result<Self> {
		let mut buffer = DocumentBuffer::with_encoding(encoding);
		buffer.reset(version, text)?;
		debug!(uri = uri.as_str(), version, "Document opened");
		let mut document = Self {
			uri,
			buffer,
			scheduler,
			scheduled: 0,
		};
		document.reanalyze();
		Ok(document)
	}

	/// Applies edit batches in order and re-analyses when any of them changed the text.
	///
	/// Batches before a rejected one stay applied. When the rejection left the buffer at a
	/// committed version, that version is re-analysed before the error is returned; when it
	/// left a partial edit, no pass is scheduled and the host is expected to
	/// [`reset`](Self::reset) the document.
	pub fn apply<'a>(&mut self, sets: impl IntoIterator<Item = &'a ChangeSet>) -> Result<Vec<UpdateOutcome>> {
		let mut outcomes = Vec::new();
		for set in sets {
			match self.buffer.update(set) {
				Ok(outcome) => outcomes.push(outcome),
				Err(error) => {
					warn!(uri = self.uri.as_str(), version = self.buffer.version(), %error, "Edit rejected");
					if outcomes.iter().any(UpdateOutcome::is_applied) && !error.leaves_partial_edit() {
						self.reanalyze();
					}
					return Err(error.into());
				}
			}
		}
		if outcomes.iter().any(UpdateOutcome::is_applied) {
			self.reanalyze();
		}
		Ok(outcomes)
	}

	/// Replaces the whole text and re-analyses.
	pub fn reset(&mut self, version: i32, text: &str) -> Result<()> {
		self.buffer.reset(version, text)?;
		self.reanalyze();
		Ok(())
	}

	/// Document URI.
	pub fn uri(&self) -> &Uri {
		&self.uri
	}

	/// Buffer version.
	pub fn version(&self) -> i32 {
		self.buffer.version()
	}

	/// Underlying buffer.
	pub fn buffer(&self) -> &DocumentBuffer {
		&self.buffer
	}

	/// Scheduler running this document's passes.
	pub fn scheduler(&self) -> &AnalysisScheduler {
		&self.scheduler
	}

	/// Newest published snapshot. It may trail [`version`](Self::version).
	pub fn snapshot(&self) -> Option<Arc<AnalysisSnapshot>> {
		self.scheduler.latest()
	}

	/// Receiver notified on every new snapshot.
	pub fn subscribe(&self) -> SnapshotReceiver {
		self.scheduler.subscribe()
	}

	/// Waits for the snapshot of the pass scheduled last, which reflects the current text.
	pub async fn current_snapshot(&self) -> Option<Arc<AnalysisSnapshot>> {
		self.scheduler.wait_for_generation(self.scheduled).await
	}

	fn reanalyze(&mut self) {
		self.scheduled = self.scheduler.schedule(AnalysisRequest {
			document: self.uri.clone(),
			version: self.buffer.version(),
			text: self.buffer.text(),
		});
	}
}
