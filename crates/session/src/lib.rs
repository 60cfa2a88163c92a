//! Open-document sessions for the analysis backbone.
//!
//! Ties a [`DocumentBuffer`](quarry_document::DocumentBuffer) to background re-analysis:
//! every applied edit schedules a pass through an [`Analyzer`], superseding any pass still
//! running, and the resulting [`AnalysisSnapshot`](quarry_analysis::AnalysisSnapshot) is
//! published once complete. Readers take the latest snapshot and query it from any thread
//! while the next pass runs.
//!
//! [`DocumentTable`] tracks every open document of a session. Settings come from an
//! [`AnalysisConfig`] parsed from TOML.

pub mod config;
mod document;
mod error;
pub mod scheduler;
mod table;

pub use config::AnalysisConfig;
pub use document::OpenDocument;
pub use error::SessionError;
pub use scheduler::{AnalysisRequest, AnalysisScheduler, Analyzer, SnapshotReceiver};
pub use table::DocumentTable;

/// A convenient type alias for `Result` with `E` = [`SessionError`].
pub type Result<T, E = SessionError> = std::result::Result<T, E>;
