//! Analysis settings read from TOML.

use std::time::Duration;

use quarry_analysis::QueryOptions;
use quarry_primitives::OffsetEncoding;
use serde::Deserialize;

use crate::Result;

/// Settings shared by every document of a session.
///
/// ```toml
/// debounce_ms = 50
/// position_encoding = "utf-8"
/// include_builtins = false
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
	/// Delay before a re-analysis pass starts, in milliseconds.
	pub debounce_ms: u64,
	/// Unit of position columns.
	pub position_encoding: OffsetEncoding,
	/// Whether visible-name queries continue into the built-ins scope.
	pub include_builtins: bool,
}

impl Default for AnalysisConfig {
	fn default() -> Self {
		Self {
			debounce_ms: 0,
			position_encoding: OffsetEncoding::default(),
			include_builtins: true,
		}
	}
}

impl AnalysisConfig {
	/// Parses a TOML document. Missing keys take their defaults.
	pub fn from_toml(source: &str) -> Result<Self> {
		Ok(toml::from_str(source)?)
	}

	/// Debounce as a duration.
	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}

	/// Query options an analyzer should attach to the snapshots it builds.
	pub fn query_options(&self) -> QueryOptions {
		QueryOptions {
			include_builtins: self.include_builtins,
		}
	}
}
