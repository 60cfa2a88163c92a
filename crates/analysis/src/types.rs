//! Closed representation of the types the inference engine reports.

use std::sync::Arc;

use crate::member::MemberResult;

/// What a bound name denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemberKind {
	/// A function or method.
	Function,
	/// A class.
	Class,
	/// An imported module.
	Module,
	/// A property or attribute with a computed value.
	Property,
	/// An instance of a class.
	Instance,
	/// Nothing is known.
	#[default]
	Unknown,
}

impl std::fmt::Display for MemberKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::Function => "function",
			Self::Class => "class",
			Self::Module => "module",
			Self::Property => "property",
			Self::Instance => "instance",
			Self::Unknown => "unknown",
		})
	}
}

/// How an argument binds to a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParameterKind {
	/// Ordinary positional-or-keyword parameter.
	#[default]
	Positional,
	/// `*args`.
	VarPositional,
	/// Keyword-only parameter.
	KeywordOnly,
	/// `**kwargs`.
	VarKeyword,
}

/// One parameter of an [`Overload`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Parameter {
	/// Parameter name.
	pub name: String,
	/// Annotation as written, if any.
	pub annotation: Option<String>,
	/// Default value as written, if any.
	pub default: Option<String>,
	/// Binding kind.
	pub kind: ParameterKind,
}

impl Parameter {
	/// Creates a positional parameter.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Default::default()
		}
	}

	/// Sets the default value.
	pub fn with_default(mut self, default: impl Into<String>) -> Self {
		self.default = Some(default.into());
		self
	}

	/// Sets the annotation.
	pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
		self.annotation = Some(annotation.into());
		self
	}

	/// Sets the binding kind.
	pub fn with_kind(mut self, kind: ParameterKind) -> Self {
		self.kind = kind;
		self
	}
}

/// One concrete signature of a callable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Overload {
	/// Name of the callable.
	pub name: String,
	/// Parameters in declaration order.
	pub parameters: Vec<Parameter>,
	/// Possible return types.
	pub returns: Vec<TypeDescriptor>,
	/// Overload-specific documentation, empty when absent.
	pub documentation: String,
}

impl Overload {
	/// Creates an overload with no parameters.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Default::default()
		}
	}

	/// Appends a parameter.
	pub fn with_parameter(mut self, parameter: Parameter) -> Self {
		self.parameters.push(parameter);
		self
	}

	/// Adds a possible return type.
	pub fn returning(mut self, ty: TypeDescriptor) -> Self {
		self.returns.push(ty);
		self
	}

	/// Sets the documentation.
	pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
		self.documentation = documentation.into();
		self
	}
}

/// Payload of [`TypeDescriptor::Function`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunctionType {
	/// Function name.
	pub name: String,
	/// Every known signature.
	pub overloads: Vec<Overload>,
	/// Docstring, empty when absent.
	pub documentation: String,
}

/// Payload of [`TypeDescriptor::Class`] and [`TypeDescriptor::Instance`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassType {
	/// Class name.
	pub name: String,
	/// Attributes and methods, inherited ones included.
	pub members: Vec<MemberResult>,
	/// Signatures of calling the class.
	pub constructors: Vec<Overload>,
	/// Docstring, empty when absent.
	pub documentation: String,
}

/// Payload of [`TypeDescriptor::Module`].
///
/// Exports are not stored here; they are looked up through the
/// [`ModuleResolver`](crate::ModuleResolver) by name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleType {
	/// Fully qualified module name.
	pub name: String,
	/// Module docstring, empty when absent.
	pub documentation: String,
}

/// Payload of [`TypeDescriptor::Property`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertyType {
	/// Property name.
	pub name: String,
	/// Possible types of the property value.
	pub value: Vec<TypeDescriptor>,
	/// Docstring, empty when absent.
	pub documentation: String,
}

/// A possible type of an expression.
///
/// Payloads sit behind `Arc` so results can be cloned freely out of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeDescriptor {
	/// A function.
	Function(Arc<FunctionType>),
	/// A class object.
	Class(Arc<ClassType>),
	/// A module.
	Module(Arc<ModuleType>),
	/// A property.
	Property(Arc<PropertyType>),
	/// An instance of the given class.
	Instance(Arc<ClassType>),
	/// Nothing is known.
	#[default]
	Unknown,
}

impl TypeDescriptor {
	/// Wraps a function payload.
	pub fn function(ty: FunctionType) -> Self {
		Self::Function(Arc::new(ty))
	}

	/// Wraps a class payload.
	pub fn class(ty: ClassType) -> Self {
		Self::Class(Arc::new(ty))
	}

	/// Wraps a module payload.
	pub fn module(name: impl Into<String>) -> Self {
		Self::Module(Arc::new(ModuleType {
			name: name.into(),
			documentation: String::new(),
		}))
	}

	/// Wraps a property payload.
	pub fn property(ty: PropertyType) -> Self {
		Self::Property(Arc::new(ty))
	}

	/// Instance of an existing class descriptor, or `Unknown` for any other kind.
	pub fn instance_of(class: &TypeDescriptor) -> Self {
		match class {
			Self::Class(c) => Self::Instance(Arc::clone(c)),
			_ => Self::Unknown,
		}
	}

	/// Member kind this type denotes.
	pub fn kind(&self) -> MemberKind {
		match self {
			Self::Function(_) => MemberKind::Function,
			Self::Class(_) => MemberKind::Class,
			Self::Module(_) => MemberKind::Module,
			Self::Property(_) => MemberKind::Property,
			Self::Instance(_) => MemberKind::Instance,
			Self::Unknown => MemberKind::Unknown,
		}
	}

	/// Name of the type. Instances report their class name.
	pub fn name(&self) -> &str {
		match self {
			Self::Function(f) => &f.name,
			Self::Class(c) | Self::Instance(c) => &c.name,
			Self::Module(m) => &m.name,
			Self::Property(p) => &p.name,
			Self::Unknown => "",
		}
	}

	/// Documentation, empty when absent.
	pub fn documentation(&self) -> &str {
		match self {
			Self::Function(f) => &f.documentation,
			Self::Class(c) | Self::Instance(c) => &c.documentation,
			Self::Module(m) => &m.documentation,
			Self::Property(p) => &p.documentation,
			Self::Unknown => "",
		}
	}

	/// Signatures of calling a value of this type. Empty for anything not callable.
	pub fn overloads(&self) -> &[Overload] {
		match self {
			Self::Function(f) => &f.overloads,
			Self::Class(c) => &c.constructors,
			_ => &[],
		}
	}

	/// Returns true for functions and classes.
	pub fn is_callable(&self) -> bool {
		matches!(self, Self::Function(_) | Self::Class(_))
	}
}
