//! Seams to the external inference engine and module resolver.
//!
//! Both are black boxes to this crate. A snapshot holds shared handles to the
//! implementations that produced it and calls them from queries, possibly from several
//! threads at once.

use crate::ast::NodeId;
use crate::member::MemberResult;
use crate::scope::ScopeId;
use crate::snapshot::AnalysisSnapshot;
use crate::types::TypeDescriptor;

/// Everything an evaluator needs to know about the expression being queried.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
	/// Snapshot the query runs against.
	pub snapshot: &'a AnalysisSnapshot,
	/// Innermost scope containing the expression.
	pub scope: ScopeId,
	/// Expression node to evaluate.
	pub node: NodeId,
}

/// Type inference over one snapshot's syntax tree.
pub trait TypeEvaluator: Send + Sync {
	/// Possible types of the expression at `cx.node`. A union is several entries.
	fn evaluate(&self, cx: &EvalContext<'_>) -> Vec<TypeDescriptor>;

	/// Members exposed by a type the query layer does not know how to open itself.
	///
	/// Classes, instances and modules are handled by the snapshot; this is consulted for
	/// functions, properties and unknown types.
	fn members(&self, ty: &TypeDescriptor) -> Vec<MemberResult> {
		let _ = ty;
		Vec::new()
	}
}

/// Import system lookups.
pub trait ModuleResolver: Send + Sync {
	/// Exported members of `module`, or `None` when the module cannot be resolved.
	fn exports(&self, module: &str) -> Option<Vec<MemberResult>>;
}

/// Evaluator that knows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInference;

impl TypeEvaluator for NoInference {
	fn evaluate(&self, _cx: &EvalContext<'_>) -> Vec<TypeDescriptor> {
		Vec::new()
	}
}

/// Resolver that resolves no module.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoModules;

impl ModuleResolver for NoModules {
	fn exports(&self, _module: &str) -> Option<Vec<MemberResult>> {
		None
	}
}
