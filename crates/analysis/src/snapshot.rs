use std::sync::Arc;

use lsp_types::Uri;

use crate::ast::SyntaxTree;
use crate::engine::{ModuleResolver, NoInference, NoModules, TypeEvaluator};
use crate::scope::{Scope, ScopeTree, Variable};

/// Knobs applied to queries of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
	/// Whether visible-name queries continue into the built-ins scope.
	pub include_builtins: bool,
}

impl Default for QueryOptions {
	fn default() -> Self {
		Self { include_builtins: true }
	}
}

/// One immutable result of analysing a document at some version.
///
/// `version` is the buffer version the analysis saw. It may trail the buffer while a newer
/// pass is pending; a newer pass produces a new snapshot and never touches this one.
pub struct AnalysisSnapshot {
	document: Uri,
	version: i32,
	ast: Arc<SyntaxTree>,
	scopes: ScopeTree,
	evaluator: Arc<dyn TypeEvaluator>,
	resolver: Arc<dyn ModuleResolver>,
	options: QueryOptions,
}

impl std::fmt::Debug for AnalysisSnapshot {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AnalysisSnapshot")
			.field("document", &self.document.as_str())
			.field("version", &self.version)
			.field("nodes", &self.ast.len())
			.field("scopes", &self.scopes.len())
			.field("options", &self.options)
			.finish()
	}
}

impl AnalysisSnapshot {
	/// Creates a snapshot with no inference and no module resolution.
	///
	/// Attach the engines with [`with_evaluator`](Self::with_evaluator) and
	/// [`with_resolver`](Self::with_resolver).
	pub fn new(document: Uri, version: i32, ast: Arc<SyntaxTree>, scopes: ScopeTree) -> Self {
		Self {
			document,
			version,
			ast,
			scopes,
			evaluator: Arc::new(NoInference),
			resolver: Arc::new(NoModules),
			options: QueryOptions::default(),
		}
	}

	/// Sets the inference engine.
	pub fn with_evaluator(mut self, evaluator: Arc<dyn TypeEvaluator>) -> Self {
		self.evaluator = evaluator;
		self
	}

	/// Sets the module resolver.
	pub fn with_resolver(mut self, resolver: Arc<dyn ModuleResolver>) -> Self {
		self.resolver = resolver;
		self
	}

	/// Sets query options.
	pub fn with_options(mut self, options: QueryOptions) -> Self {
		self.options = options;
		self
	}

	/// Analysed document.
	pub fn document(&self) -> &Uri {
		&self.document
	}

	/// Buffer version this snapshot reflects.
	pub fn version(&self) -> i32 {
		self.version
	}

	/// Syntax tree the analysis ran on.
	pub fn ast(&self) -> &SyntaxTree {
		&self.ast
	}

	/// Shared handle to the syntax tree.
	pub fn ast_handle(&self) -> Arc<SyntaxTree> {
		Arc::clone(&self.ast)
	}

	/// Scope and variable arena.
	pub fn scopes(&self) -> &ScopeTree {
		&self.scopes
	}

	/// Module scope.
	pub fn global_scope(&self) -> &Scope {
		self.scopes.global()
	}

	/// Module-level variables in declaration order.
	pub fn top_level_variables(&self) -> impl Iterator<Item = &Variable> + '_ {
		self.scopes.top_level_variables()
	}

	/// Variables of every scope of the module.
	pub fn all_variables(&self) -> impl Iterator<Item = &Variable> + '_ {
		self.scopes.all_variables()
	}

	/// Inference engine.
	pub fn evaluator(&self) -> &dyn TypeEvaluator {
		self.evaluator.as_ref()
	}

	/// Module resolver.
	pub fn resolver(&self) -> &dyn ModuleResolver {
		self.resolver.as_ref()
	}

	/// Query options.
	pub fn options(&self) -> QueryOptions {
		self.options
	}
}
