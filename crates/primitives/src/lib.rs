//! Core text coordinates shared by the document buffer and the analysis query layer.

/// Line-start tables and position/offset conversion.
pub mod line_index;
/// Positions, spans and column encodings.
pub mod position;

pub use line_index::LineIndex;
pub use position::{CharIdx, OffsetEncoding, Position, Span};
pub use ropey::{Rope, RopeSlice};
