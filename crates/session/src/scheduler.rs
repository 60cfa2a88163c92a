//! Background re-analysis with supersession.
//!
//! Every call to [`AnalysisScheduler::schedule`] starts a new generation and cancels the
//! pass of the previous one. A finished pass publishes its snapshot only if its generation
//! is still current; the check and the publication happen under one lock, so a superseded
//! pass can never overwrite a newer snapshot. The generation of the newest publication is
//! tracked next to the snapshot, so waiting for "the pass scheduled last" does not depend on
//! versions, which a reset may lower.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lsp_types::Uri;
use parking_lot::Mutex;
use quarry_analysis::AnalysisSnapshot;
use ropey::Rope;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Text handed to an [`Analyzer`] for one pass.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
	/// Document being analysed.
	pub document: Uri,
	/// Buffer version the text belongs to.
	pub version: i32,
	/// Buffer text at `version`.
	pub text: Rope,
}

/// Parser, binder and inference front end that turns text into a snapshot.
#[async_trait]
pub trait Analyzer: Send + Sync + 'static {
	/// Analyses `request.text`.
	///
	/// Long passes should poll `cancel` and bail out early; the result of a cancelled pass
	/// is discarded either way.
	async fn analyze(&self, request: AnalysisRequest, cancel: CancellationToken) -> anyhow::Result<AnalysisSnapshot>;
}

/// Latest published snapshot, `None` until the first pass completes.
pub type SnapshotReceiver = watch::Receiver<Option<Arc<AnalysisSnapshot>>>;

struct SchedulerState {
	generation: u64,
	in_flight: Option<CancellationToken>,
}

/// Runs analysis passes for one document and publishes their snapshots.
pub struct AnalysisScheduler {
	analyzer: Arc<dyn Analyzer>,
	runtime: Handle,
	debounce: Duration,
	state: Arc<Mutex<SchedulerState>>,
	published: Arc<watch::Sender<Option<Arc<AnalysisSnapshot>>>>,
	published_generation: Arc<watch::Sender<u64>>,
}

impl std::fmt::Debug for AnalysisScheduler {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.state.lock();
		f.debug_struct("AnalysisScheduler")
			.field("generation", &state.generation)
			.field("in_flight", &state.in_flight.is_some())
			.field("debounce", &self.debounce)
			.finish()
	}
}

impl AnalysisScheduler {
	/// Creates a scheduler that spawns passes on `runtime`.
	pub fn new(analyzer: Arc<dyn Analyzer>, runtime: Handle) -> Self {
		let (published, _) = watch::channel(None);
		let (published_generation, _) = watch::channel(0);
		Self {
			analyzer,
			runtime,
			debounce: Duration::ZERO,
			state: Arc::new(Mutex::new(SchedulerState {
				generation: 0,
				in_flight: None,
			})),
			published: Arc::new(published),
			published_generation: Arc::new(published_generation),
		}
	}

	/// Waits this long before starting each pass. A newer request during the wait
	/// cancels the pass before it starts.
	pub fn with_debounce(mut self, debounce: Duration) -> Self {
		self.debounce = debounce;
		self
	}

	/// Returns the current generation.
	pub fn generation(&self) -> u64 {
		self.state.lock().generation
	}

	/// Returns true while a pass is pending or running.
	pub fn is_pending(&self) -> bool {
		self.state.lock().in_flight.is_some()
	}

	/// Generation of the newest published snapshot, 0 before the first.
	pub fn published_generation(&self) -> u64 {
		*self.published_generation.borrow()
	}

	/// Newest published snapshot.
	pub fn latest(&self) -> Option<Arc<AnalysisSnapshot>> {
		self.published.borrow().clone()
	}

	/// Receiver notified on every publication.
	pub fn subscribe(&self) -> SnapshotReceiver {
		self.published.subscribe()
	}

	/// Cancels the pending pass, if any. The latest snapshot stays published.
	pub fn cancel(&self) {
		if let Some(cancel) = self.state.lock().in_flight.take() {
			debug!("Analysis cancelled");
			cancel.cancel();
		}
	}

	/// Starts a pass for `request`, superseding any pass still running.
	///
	/// Returns the generation of the new pass.
	pub fn schedule(&self, request: AnalysisRequest) -> u64 {
		let cancel = CancellationToken::new();
		let generation = {
			let mut state = self.state.lock();
			state.generation = state.generation.wrapping_add(1);
			if let Some(previous) = state.in_flight.replace(cancel.clone()) {
				previous.cancel();
			}
			state.generation
		};
		debug!(generation, version = request.version, uri = request.document.as_str(), "Analysis scheduled");

		let analyzer = Arc::clone(&self.analyzer);
		let state = Arc::clone(&self.state);
		let published = Arc::clone(&self.published);
		let published_generation = Arc::clone(&self.published_generation);
		let debounce = self.debounce;

		self.runtime.spawn(async move {
			if debounce > Duration::ZERO {
				tokio::select! {
					_ = cancel.cancelled() => return,
					_ = sleep(debounce) => {}
				}
			} else if cancel.is_cancelled() {
				return;
			}

			let version = request.version;
			let result = tokio::select! {
				_ = cancel.cancelled() => {
					trace!(generation, version, "Analysis pass abandoned");
					return;
				}
				result = analyzer.analyze(request, cancel.clone()) => result,
			};

			let snapshot = match result {
				Ok(snapshot) => snapshot,
				Err(error) => {
					warn!(generation, version, error = %error, "Analysis failed");
					let mut state = state.lock();
					if state.generation == generation {
						state.in_flight = None;
					}
					return;
				}
			};

			let mut state = state.lock();
			if state.generation != generation || cancel.is_cancelled() {
				debug!(generation, current = state.generation, version, "Discarding superseded analysis");
				return;
			}
			state.in_flight = None;
			published.send_replace(Some(Arc::new(snapshot)));
			published_generation.send_replace(generation);
			debug!(generation, version, "Analysis published");
		});

		generation
	}

	/// Waits until the pass of `generation`, or of a later one, publishes its snapshot.
	///
	/// Unlike [`wait_for_version`](Self::wait_for_version) this cannot be satisfied by a
	/// snapshot taken before a reset that lowered the version. A failed or cancelled pass
	/// publishes nothing, so the wait continues until a later pass succeeds.
	pub async fn wait_for_generation(&self, generation: u64) -> Option<Arc<AnalysisSnapshot>> {
		let mut rx = self.published_generation.subscribe();
		rx.wait_for(|published| *published >= generation).await.ok()?;
		self.latest()
	}

	/// Waits until a snapshot of at least `version` is published.
	///
	/// Returns immediately when the latest snapshot is already new enough. A pass that is
	/// cancelled and never rescheduled leaves this waiting, so callers wanting a bound wrap
	/// it in [`tokio::time::timeout`].
	pub async fn wait_for_version(&self, version: i32) -> Option<Arc<AnalysisSnapshot>> {
		let mut rx = self.subscribe();
		let snapshot = rx
			.wait_for(|snapshot| snapshot.as_ref().is_some_and(|s| s.version() >= version))
			.await
			.ok()?;
		snapshot.clone()
	}
}

impl Drop for AnalysisScheduler {
	fn drop(&mut self) {
		self.cancel();
	}
}
