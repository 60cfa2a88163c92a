//! Read-only descriptors returned by member and completion queries.

use crate::scope::{Location, ScopeId, Variable};
use crate::types::{MemberKind, TypeDescriptor};

/// A name offered by a member or completion query.
///
/// `locations` is empty for synthesized and built-in members. `documentation` is an
/// empty string when there is none.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberResult {
	name: String,
	kind: MemberKind,
	completion: String,
	scope: Option<ScopeId>,
	locations: Vec<Location>,
	values: Vec<TypeDescriptor>,
	documentation: String,
}

impl MemberResult {
	/// Creates a member whose completion text is its name.
	pub fn new(name: impl Into<String>, kind: MemberKind) -> Self {
		let name = name.into();
		Self {
			completion: name.clone(),
			name,
			kind,
			..Default::default()
		}
	}

	/// Describes a bound variable.
	///
	/// The kind and documentation come from the first possible type that has them.
	pub fn from_variable(variable: &Variable) -> Self {
		let kind = variable.types().first().map(TypeDescriptor::kind).unwrap_or_default();
		let documentation = variable
			.types()
			.iter()
			.map(TypeDescriptor::documentation)
			.find(|doc| !doc.is_empty())
			.unwrap_or_default()
			.to_owned();
		Self {
			scope: Some(variable.scope()),
			locations: variable.locations().to_vec(),
			values: variable.types().to_vec(),
			documentation,
			..Self::new(variable.name(), kind)
		}
	}

	/// Describes a single value bound to `name`.
	pub fn from_value(name: impl Into<String>, value: TypeDescriptor) -> Self {
		let kind = value.kind();
		Self {
			documentation: value.documentation().to_owned(),
			values: vec![value],
			..Self::new(name, kind)
		}
	}

	/// Sets the completion text.
	pub fn with_completion(mut self, completion: impl Into<String>) -> Self {
		self.completion = completion.into();
		self
	}

	/// Sets the owning scope.
	pub fn with_scope(mut self, scope: ScopeId) -> Self {
		self.scope = Some(scope);
		self
	}

	/// Adds a source location.
	pub fn with_location(mut self, location: Location) -> Self {
		self.locations.push(location);
		self
	}

	/// Adds a possible value.
	pub fn with_value(mut self, value: TypeDescriptor) -> Self {
		self.values.push(value);
		self
	}

	/// Sets the documentation.
	pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
		self.documentation = documentation.into();
		self
	}

	/// Member name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Member kind.
	pub fn kind(&self) -> MemberKind {
		self.kind
	}

	/// Text to insert when the member is picked.
	pub fn completion(&self) -> &str {
		&self.completion
	}

	/// Scope the member was found in, `None` for members of types.
	pub fn scope(&self) -> Option<ScopeId> {
		self.scope
	}

	/// Declaration sites.
	pub fn locations(&self) -> &[Location] {
		&self.locations
	}

	/// Possible runtime values.
	pub fn values(&self) -> &[TypeDescriptor] {
		&self.values
	}

	/// Documentation, empty when absent.
	pub fn documentation(&self) -> &str {
		&self.documentation
	}
}
