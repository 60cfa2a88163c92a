//! Versioned analysis snapshots and the query layer over them.
//!
//! An [`AnalysisSnapshot`] bundles one frozen result of analysing a document: the syntax
//! tree, the scope/variable arena, and handles to the external inference engine and module
//! resolver. Queries resolve a [`Position`](quarry_primitives::Position) to the innermost
//! scope and syntax node and answer:
//!
//! - [`get_members`](AnalysisSnapshot::get_members): members of the expression here, or
//!   every visible name when there is no expression,
//! - [`get_values`](AnalysisSnapshot::get_values): possible types of the expression,
//! - [`get_signatures`](AnalysisSnapshot::get_signatures): overloads of callables,
//! - [`get_all_available_items`](AnalysisSnapshot::get_all_available_items): every visible
//!   name, regardless of the expression.
//!
//! Snapshots are `Send + Sync` and never change after construction, so any number of
//! callers may query one concurrently.

pub mod ast;
pub mod engine;
mod error;
pub mod member;
mod query;
pub mod scope;
mod snapshot;
pub mod types;

pub use ast::{NodeId, NodeKind, SyntaxNode, SyntaxTree};
pub use engine::{EvalContext, ModuleResolver, NoInference, NoModules, TypeEvaluator};
pub use error::QueryError;
pub use member::MemberResult;
pub use query::Resolution;
pub use scope::{Location, Scope, ScopeId, ScopeKind, ScopeTree, Variable, VariableId};
pub use snapshot::{AnalysisSnapshot, QueryOptions};
pub use types::{ClassType, FunctionType, MemberKind, ModuleType, Overload, Parameter, ParameterKind, PropertyType, TypeDescriptor};

/// A convenient type alias for `Result` with `E` = [`QueryError`].
pub type Result<T, E = QueryError> = std::result::Result<T, E>;
