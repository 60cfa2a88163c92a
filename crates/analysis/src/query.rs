//! Position-addressed queries over an [`AnalysisSnapshot`].

use indexmap::IndexMap;
use quarry_primitives::Position;
use tracing::trace;

use crate::ast::{NodeId, NodeKind};
use crate::engine::EvalContext;
use crate::member::MemberResult;
use crate::scope::{ScopeId, ScopeKind};
use crate::snapshot::AnalysisSnapshot;
use crate::types::{Overload, TypeDescriptor};
use crate::{QueryError, Result};

/// Where a position lands in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
	/// Innermost scope containing the position.
	pub scope: ScopeId,
	/// Smallest syntax node covering the position, searched from the scope's node.
	pub node: Option<NodeId>,
}

impl AnalysisSnapshot {
	/// Resolves `pos` to its innermost scope and syntax node.
	pub fn resolve(&self, pos: Position) -> Result<Resolution> {
		let scope = self.scopes().scope_at(pos).ok_or(QueryError::LocationNotFound(pos))?;
		let ast = self.ast();
		let start = self.scopes().scope(scope).and_then(|s| s.node()).unwrap_or_else(|| ast.root());
		let node = ast.node_at(start, pos).or_else(|| ast.node_at(ast.root(), pos));
		trace!(%pos, ?scope, ?node, "Resolved position");
		Ok(Resolution { scope, node })
	}

	/// Members of the expression at `pos`.
	///
	/// Where no expression is present (nothing typed yet, or the position is between
	/// statements) this returns every name visible at `pos`, like
	/// [`get_all_available_items`](Self::get_all_available_items). Otherwise the expression
	/// is evaluated and the members of all its possible types are merged by name.
	pub fn get_members(&self, pos: Position) -> Result<Vec<MemberResult>> {
		let resolution = self.resolve(pos)?;
		match self.expression(resolution) {
			Some(node) => {
				let types = self.evaluate(resolution.scope, node);
				Ok(self.members_of_types(&types))
			}
			None => Ok(self.visible_members(resolution.scope)),
		}
	}

	/// Possible types of the expression at `pos`, one entry per union member.
	///
	/// Empty when the position does not address an evaluable expression.
	pub fn get_values(&self, pos: Position) -> Result<Vec<TypeDescriptor>> {
		let resolution = self.resolve(pos)?;
		Ok(self
			.expression(resolution)
			.map(|node| self.evaluate(resolution.scope, node))
			.unwrap_or_default())
	}

	/// Every overload of every callable the expression at `pos` may be.
	///
	/// When there is no expression at `pos`, or it cannot be called, the callee of the
	/// enclosing call is used instead, so signatures stay available in an empty argument
	/// slot or on the whitespace between arguments.
	pub fn get_signatures(&self, pos: Position) -> Result<Vec<Overload>> {
		let resolution = self.resolve(pos)?;
		if let Some(expr) = self.expression(resolution) {
			let overloads = self.overloads_of(resolution.scope, expr);
			if !overloads.is_empty() {
				return Ok(overloads);
			}
		}
		Ok(resolution
			.node
			.and_then(|node| self.ast().enclosing_callee(node))
			.map(|callee| self.overloads_of(resolution.scope, callee))
			.unwrap_or_default())
	}

	/// Every name visible at `pos`, whatever expression is there.
	pub fn get_all_available_items(&self, pos: Position) -> Result<Vec<MemberResult>> {
		let resolution = self.resolve(pos)?;
		Ok(self.visible_members(resolution.scope))
	}

	/// Members exposed by one type.
	pub fn members_of(&self, ty: &TypeDescriptor) -> Vec<MemberResult> {
		match ty {
			TypeDescriptor::Module(module) => self.resolver().exports(&module.name).unwrap_or_default(),
			TypeDescriptor::Class(class) | TypeDescriptor::Instance(class) => class.members.clone(),
			_ => self.evaluator().members(ty),
		}
	}

	fn expression(&self, resolution: Resolution) -> Option<NodeId> {
		resolution
			.node
			.filter(|node| self.ast().kind(*node).is_some_and(NodeKind::is_expression))
	}

	fn evaluate(&self, scope: ScopeId, node: NodeId) -> Vec<TypeDescriptor> {
		let cx = EvalContext {
			snapshot: self,
			scope,
			node,
		};
		self.evaluator().evaluate(&cx)
	}

	fn overloads_of(&self, scope: ScopeId, node: NodeId) -> Vec<Overload> {
		self.evaluate(scope, node)
			.iter()
			.filter(|ty| ty.is_callable())
			.flat_map(|ty| ty.overloads().iter().cloned())
			.collect()
	}

	fn members_of_types(&self, types: &[TypeDescriptor]) -> Vec<MemberResult> {
		let mut merged: IndexMap<String, MemberResult> = IndexMap::new();
		for member in types.iter().flat_map(|ty| self.members_of(ty)) {
			merged.entry(member.name().to_owned()).or_insert(member);
		}
		merged.into_values().collect()
	}

	/// Names bound in `scope` and every enclosing scope, innermost binding first.
	fn visible_members(&self, scope: ScopeId) -> Vec<MemberResult> {
		let scopes = self.scopes();
		let include_builtins = self.options().include_builtins;
		let mut visible: IndexMap<&str, MemberResult> = IndexMap::new();

		for id in scopes.ancestors(scope) {
			let Some(s) = scopes.scope(id) else { continue };
			if s.kind() == ScopeKind::Builtins && !include_builtins {
				continue;
			}
			for (name, var) in s.bindings() {
				if visible.contains_key(name) {
					continue;
				}
				if let Some(variable) = scopes.variable(var) {
					visible.insert(name, MemberResult::from_variable(variable));
				}
			}
		}
		visible.into_values().collect()
	}
}
