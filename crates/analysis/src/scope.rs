//! Arena of lexical scopes and the variables bound in them.
//!
//! Parent/child links and the declaring scope of a variable are [`ScopeId`] handles into
//! one [`ScopeTree`], so the graph has no ownership cycles.

use indexmap::IndexMap;
use lsp_types::Uri;
use quarry_primitives::{Position, Span};

use crate::ast::NodeId;
use crate::types::TypeDescriptor;

/// Handle of a scope inside one [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
	/// Arena index of this scope.
	pub const fn index(self) -> usize {
		self.0 as usize
	}
}

/// Handle of a variable inside one [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariableId(u32);

impl VariableId {
	/// Arena index of this variable.
	pub const fn index(self) -> usize {
		self.0 as usize
	}
}

/// What kind of region a scope covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
	/// Names available everywhere without import.
	Builtins,
	/// Module (global) scope.
	Module,
	/// Class body.
	Class,
	/// Function body.
	Function,
}

/// A source location in some document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
	/// Document the span belongs to.
	pub document: Uri,
	/// Covered source span.
	pub span: Span,
}

impl Location {
	/// Creates a location.
	pub fn new(document: Uri, span: Span) -> Self {
		Self { document, span }
	}
}

/// A name bound in a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
	name: String,
	types: Vec<TypeDescriptor>,
	scope: ScopeId,
	locations: Vec<Location>,
}

impl Variable {
	/// Bound name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Declared or inferred types, one entry per union member.
	pub fn types(&self) -> &[TypeDescriptor] {
		&self.types
	}

	/// Scope declaring this variable.
	pub fn scope(&self) -> ScopeId {
		self.scope
	}

	/// Where the binding is declared. Empty for synthesized names.
	pub fn locations(&self) -> &[Location] {
		&self.locations
	}
}

/// A lexical region owning a name table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
	id: ScopeId,
	kind: ScopeKind,
	name: String,
	span: Span,
	node: Option<NodeId>,
	parent: Option<ScopeId>,
	children: Vec<ScopeId>,
	bindings: IndexMap<String, VariableId>,
}

impl Scope {
	/// Handle of this scope.
	pub fn id(&self) -> ScopeId {
		self.id
	}

	/// Scope kind.
	pub fn kind(&self) -> ScopeKind {
		self.kind
	}

	/// Module, class or function name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Source region covered by the scope.
	pub fn span(&self) -> Span {
		self.span
	}

	/// Syntax node defining the scope, if any.
	pub fn node(&self) -> Option<NodeId> {
		self.node
	}

	/// Enclosing scope.
	pub fn parent(&self) -> Option<ScopeId> {
		self.parent
	}

	/// Nested scopes in creation order.
	pub fn children(&self) -> &[ScopeId] {
		&self.children
	}

	/// Bound variable for `name`.
	pub fn lookup(&self, name: &str) -> Option<VariableId> {
		self.bindings.get(name).copied()
	}

	/// Bindings in first-declaration order.
	pub fn bindings(&self) -> impl Iterator<Item = (&str, VariableId)> + '_ {
		self.bindings.iter().map(|(name, id)| (name.as_str(), *id))
	}

	/// Number of bound names.
	pub fn len(&self) -> usize {
		self.bindings.len()
	}

	/// Returns true when nothing is bound here.
	pub fn is_empty(&self) -> bool {
		self.bindings.is_empty()
	}
}

/// Scopes and variables of one analysed module.
///
/// The analyzer builds the tree through [`add_scope`](Self::add_scope) and
/// [`declare`](Self::declare); a snapshot then owns it read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTree {
	scopes: Vec<Scope>,
	variables: Vec<Variable>,
	global: ScopeId,
	builtins: Option<ScopeId>,
}

impl ScopeTree {
	/// Creates a tree holding the module scope.
	pub fn new(module_name: impl Into<String>, span: Span, node: Option<NodeId>) -> Self {
		let global = ScopeId(0);
		Self {
			scopes: vec![Scope {
				id: global,
				kind: ScopeKind::Module,
				name: module_name.into(),
				span,
				node,
				parent: None,
				children: Vec::new(),
				bindings: IndexMap::new(),
			}],
			variables: Vec::new(),
			global,
			builtins: None,
		}
	}

	/// Returns the built-ins scope, creating it above the module scope on first use.
	///
	/// The built-ins scope has no source span, so position resolution never lands in it;
	/// it is only reached by walking outwards from the module scope.
	pub fn builtins_scope(&mut self) -> ScopeId {
		if let Some(id) = self.builtins {
			return id;
		}
		let id = ScopeId(self.scopes.len() as u32);
		self.scopes.push(Scope {
			id,
			kind: ScopeKind::Builtins,
			name: "builtins".into(),
			span: Span::default(),
			node: None,
			parent: None,
			children: vec![self.global],
			bindings: IndexMap::new(),
		});
		self.scopes[self.global.index()].parent = Some(id);
		self.builtins = Some(id);
		id
	}

	/// Adds a nested scope under `parent`.
	///
	/// # Panics
	///
	/// Panics if `parent` does not belong to this tree.
	pub fn add_scope(&mut self, parent: ScopeId, kind: ScopeKind, name: impl Into<String>, span: Span, node: Option<NodeId>) -> ScopeId {
		let id = ScopeId(self.scopes.len() as u32);
		self.scopes[parent.index()].children.push(id);
		self.scopes.push(Scope {
			id,
			kind,
			name: name.into(),
			span,
			node,
			parent: Some(parent),
			children: Vec::new(),
			bindings: IndexMap::new(),
		});
		id
	}

	/// Binds `name` in `scope`.
	///
	/// Redeclaring a name overwrites the earlier binding in place: the variable keeps its
	/// handle and its position in the scope's ordering, and takes the new types and
	/// location.
	///
	/// # Panics
	///
	/// Panics if `scope` does not belong to this tree.
	pub fn declare(&mut self, scope: ScopeId, name: impl Into<String>, types: Vec<TypeDescriptor>, location: Option<Location>) -> VariableId {
		let name = name.into();
		let locations: Vec<Location> = location.into_iter().collect();

		if let Some(id) = self.scopes[scope.index()].bindings.get(&name).copied() {
			let variable = &mut self.variables[id.index()];
			variable.types = types;
			variable.locations = locations;
			return id;
		}

		let id = VariableId(self.variables.len() as u32);
		self.variables.push(Variable {
			name: name.clone(),
			types,
			scope,
			locations,
		});
		self.scopes[scope.index()].bindings.insert(name, id);
		id
	}

	/// Module scope handle.
	pub fn global_id(&self) -> ScopeId {
		self.global
	}

	/// Module scope.
	pub fn global(&self) -> &Scope {
		&self.scopes[self.global.index()]
	}

	/// Built-ins scope handle, if one was created.
	pub fn builtins_id(&self) -> Option<ScopeId> {
		self.builtins
	}

	/// Looks up a scope.
	pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
		self.scopes.get(id.index())
	}

	/// Looks up a variable.
	pub fn variable(&self, id: VariableId) -> Option<&Variable> {
		self.variables.get(id.index())
	}

	/// Resolves `name` in `scope` only.
	pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Variable> {
		self.scope(scope)?.lookup(name).and_then(|id| self.variable(id))
	}

	/// Resolves `name` from `scope` outwards, the innermost binding winning.
	pub fn resolve_name(&self, scope: ScopeId, name: &str) -> Option<&Variable> {
		self.ancestors(scope).find_map(|id| self.lookup(id, name))
	}

	/// Variables bound at module level, in declaration order.
	pub fn top_level_variables(&self) -> impl Iterator<Item = &Variable> + '_ {
		self.variables_in(self.global)
	}

	/// Variables of `scope`, in declaration order.
	pub fn variables_in(&self, scope: ScopeId) -> impl Iterator<Item = &Variable> + '_ {
		self.scope(scope)
			.into_iter()
			.flat_map(|s| s.bindings.values())
			.filter_map(|id| self.variable(*id))
	}

	/// Variables of the module scope and every scope nested in it, depth first.
	///
	/// Names are unique per scope only; the same name bound in two scopes appears twice.
	/// Built-ins are not part of the module and are excluded.
	pub fn all_variables(&self) -> impl Iterator<Item = &Variable> + '_ {
		self.descendants(self.global).flat_map(|id| self.variables_in(id))
	}

	/// `scope` followed by its enclosing scopes, ending with built-ins when present.
	pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
		std::iter::successors(self.scope(scope).map(Scope::id), |id| self.scope(*id).and_then(Scope::parent))
	}

	/// `scope` and every scope nested in it, depth first in creation order.
	pub fn descendants(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
		let mut stack: Vec<ScopeId> = self.scope(scope).map(Scope::id).into_iter().collect();
		std::iter::from_fn(move || {
			let id = stack.pop()?;
			if let Some(s) = self.scope(id) {
				stack.extend(s.children.iter().rev().copied());
			}
			Some(id)
		})
	}

	/// Innermost scope whose span contains `pos`, starting the descent at the module scope.
	///
	/// A position on the boundary shared by two sibling scopes, such as the last column of
	/// one function that is also the first column of the next, resolves to the later one.
	/// Returns `None` when the module scope itself does not contain `pos`.
	pub fn scope_at(&self, pos: Position) -> Option<ScopeId> {
		let mut current = self.global();
		if !current.span.contains(pos) {
			return None;
		}
		loop {
			let best = current
				.children
				.iter()
				.filter_map(|id| self.scope(*id))
				.filter(|child| child.span.contains(pos))
				.reduce(|best, child| if child.span.is_narrower_than(&best.span) { child } else { best });
			match best {
				Some(child) => current = child,
				None => return Some(current.id),
			}
		}
	}

	/// Number of scopes, built-ins included.
	pub fn len(&self) -> usize {
		self.scopes.len()
	}

	#[doc(hidden)]
	pub fn is_empty(&self) -> bool {
		self.scopes.is_empty()
	}
}
