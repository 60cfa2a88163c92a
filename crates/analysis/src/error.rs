use quarry_primitives::Position;
use thiserror::Error;

/// Errors returned by snapshot queries.
///
/// Positions that resolve but have nothing to report yield empty results instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
	/// The position lies outside every scope of the snapshot, e.g. past end of file.
	#[error("no scope contains position {0}")]
	LocationNotFound(Position),
}
