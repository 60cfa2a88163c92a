//! Position-addressable syntax tree produced by the external parser.
//!
//! The tree is grammar-agnostic: nodes only carry a coarse [`NodeKind`] and a source
//! [`Span`]. The parser fills a [`SyntaxTree`] once; afterwards it is shared read-only
//! behind an `Arc` by every snapshot built from it.

use quarry_primitives::{Position, Span};
use smallvec::SmallVec;

/// Handle of a node inside one [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
	/// The module node every tree starts with.
	pub const ROOT: NodeId = NodeId(0);

	/// Arena index of this node.
	pub const fn index(self) -> usize {
		self.0 as usize
	}
}

/// Coarse node classification the query layer relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
	/// Whole module.
	Module,
	/// Function or lambda definition.
	FunctionDef,
	/// Class definition.
	ClassDef,
	/// Any other statement.
	Statement,
	/// An evaluable expression (name, member access, literal, ...).
	Expression,
	/// A call expression. Its first child is the callee.
	Call,
	/// Placeholder where an expression is expected but nothing has been typed, such as
	/// right after `obj.`.
	EmptyExpression,
	/// Anything else (parameters, decorators, error recovery nodes).
	Other,
}

impl NodeKind {
	/// Returns true for nodes the inference engine can evaluate.
	pub fn is_expression(self) -> bool {
		matches!(self, Self::Expression | Self::Call)
	}

	/// Returns true for nodes that end an upward search for an enclosing call.
	fn is_statement_boundary(self) -> bool {
		matches!(self, Self::Module | Self::FunctionDef | Self::ClassDef | Self::Statement)
	}
}

/// One node of a [`SyntaxTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
	kind: NodeKind,
	span: Span,
	parent: Option<NodeId>,
	children: SmallVec<[NodeId; 4]>,
}

impl SyntaxNode {
	/// Node kind.
	pub fn kind(&self) -> NodeKind {
		self.kind
	}

	/// Source span.
	pub fn span(&self) -> Span {
		self.span
	}

	/// Parent node, `None` for the root.
	pub fn parent(&self) -> Option<NodeId> {
		self.parent
	}

	/// Children in source order.
	pub fn children(&self) -> &[NodeId] {
		&self.children
	}
}

/// Arena of syntax nodes rooted at a [`NodeKind::Module`] node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
	nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
	/// Creates a tree holding only a module node covering `span`.
	pub fn new(span: Span) -> Self {
		Self {
			nodes: vec![SyntaxNode {
				kind: NodeKind::Module,
				span,
				parent: None,
				children: SmallVec::new(),
			}],
		}
	}

	/// Appends a child under `parent` and returns its handle.
	///
	/// # Panics
	///
	/// Panics if `parent` does not belong to this tree.
	pub fn add(&mut self, parent: NodeId, kind: NodeKind, span: Span) -> NodeId {
		let id = NodeId(self.nodes.len() as u32);
		self.nodes[parent.index()].children.push(id);
		self.nodes.push(SyntaxNode {
			kind,
			span,
			parent: Some(parent),
			children: SmallVec::new(),
		});
		id
	}

	/// The module node.
	pub fn root(&self) -> NodeId {
		NodeId::ROOT
	}

	/// Number of nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	#[doc(hidden)]
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Looks up a node.
	pub fn node(&self, id: NodeId) -> Option<&SyntaxNode> {
		self.nodes.get(id.index())
	}

	/// Kind of a node.
	pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
		self.node(id).map(SyntaxNode::kind)
	}

	/// `id` followed by its parent chain up to the root.
	pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
		std::iter::successors(self.node(id).map(|_| id), |current| self.node(*current).and_then(SyntaxNode::parent))
	}

	/// Smallest node under `from` (inclusive) whose span contains `pos`.
	///
	/// At each level the narrowest containing child wins. When `pos` sits on the boundary
	/// shared by two adjacent children, the later-starting child is chosen regardless of
	/// size, see [`Span::is_narrower_than`].
	pub fn node_at(&self, from: NodeId, pos: Position) -> Option<NodeId> {
		let mut current = self.node(from).filter(|n| n.span.contains(pos)).map(|_| from)?;
		loop {
			let best = self.nodes[current.index()]
				.children
				.iter()
				.copied()
				.filter(|child| self.nodes[child.index()].span.contains(pos))
				.reduce(|best, child| {
					if self.nodes[child.index()].span.is_narrower_than(&self.nodes[best.index()].span) {
						child
					} else {
						best
					}
				});
			match best {
				Some(child) => current = child,
				None => return Some(current),
			}
		}
	}

	/// Callee of the nearest call enclosing `id`, without leaving the current statement.
	pub fn enclosing_callee(&self, id: NodeId) -> Option<NodeId> {
		self.ancestors(id)
			.take_while(|n| self.kind(*n).is_some_and(|k| !k.is_statement_boundary()))
			.find(|n| self.kind(*n) == Some(NodeKind::Call))
			.and_then(|call| self.node(call)?.children.first().copied())
	}
}
