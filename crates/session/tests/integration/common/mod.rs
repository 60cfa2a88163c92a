//! Common utilities for session integration tests.
//!
//! [`FixtureAnalyzer`] understands a line-oriented Python subset: `import m`,
//! `from m import *`, `def f(a, b=0):` with an indented body, and `name = expr`. Every
//! identifier, literal and call becomes an expression node; a `.` with nothing after it
//! becomes an empty expression.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use lsp_types::Uri;
use parking_lot::Mutex;
use quarry_analysis::{
	AnalysisSnapshot, ClassType, EvalContext, FunctionType, Location, MemberKind, MemberResult, ModuleResolver, NodeId, NodeKind,
	Overload, Parameter, QueryOptions, ScopeId, ScopeKind, ScopeTree, SyntaxTree, TypeDescriptor, TypeEvaluator,
};
use quarry_primitives::Span;
use quarry_session::{AnalysisConfig, AnalysisRequest, Analyzer, DocumentTable};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

pub const WAIT: Duration = Duration::from_secs(5);

const KEYWORDS: &[&str] = &["def", "import", "from", "return", "pass", "None", "True", "False"];

/// Built-ins and importable modules.
pub struct Library {
	pub int: TypeDescriptor,
	pub str_: TypeDescriptor,
	builtins: Vec<(&'static str, TypeDescriptor)>,
	modules: HashMap<&'static str, Vec<MemberResult>>,
}

fn function(name: &str, documentation: &str, parameters: &[&str], returns: Option<&TypeDescriptor>) -> TypeDescriptor {
	let mut overload = Overload::new(name).with_documentation(documentation);
	for parameter in parameters {
		overload = overload.with_parameter(match parameter.split_once('=') {
			Some((name, default)) => Parameter::new(name).with_default(default),
			None => Parameter::new(*parameter),
		});
	}
	if let Some(ty) = returns {
		overload = overload.returning(ty.clone());
	}
	TypeDescriptor::function(FunctionType {
		name: name.into(),
		overloads: vec![overload],
		documentation: documentation.into(),
	})
}

fn class(name: &str, documentation: &str, members: Vec<MemberResult>, constructor: &[&str]) -> TypeDescriptor {
	let mut overload = Overload::new(name);
	for parameter in constructor {
		overload = overload.with_parameter(Parameter::new(*parameter));
	}
	TypeDescriptor::class(ClassType {
		name: name.into(),
		members,
		constructors: vec![overload],
		documentation: documentation.into(),
	})
}

fn method(name: &str, documentation: &str) -> MemberResult {
	MemberResult::from_value(name, function(name, documentation, &["self"], None))
}

impl Default for Library {
	fn default() -> Self {
		let int = class(
			"int",
			"int([x]) -> integer",
			vec![method("bit_length", "Number of bits necessary to represent self in binary.")],
			&["x"],
		);
		let str_ = class(
			"str",
			"str(object='') -> str",
			vec![method("upper", "Return a copy of the string converted to uppercase."), method("split", "Return a list of the substrings.")],
			&["object"],
		);
		let int_value = TypeDescriptor::instance_of(&int);

		let random = vec![
			MemberResult::from_value("seed", function("seed", "Initialize the random number generator.", &["a=None"], None)),
			MemberResult::from_value(
				"randint",
				function(
					"randint",
					"Return random integer in range [a, b], including both end points.",
					&["a", "b"],
					Some(&int_value),
				),
			),
			MemberResult::from_value("choice", function("choice", "Choose a random element from a non-empty sequence.", &["seq"], None)),
		];

		let datetime_class = class(
			"datetime",
			"datetime(year, month, day[, hour[, minute[, second]]])",
			vec![
				MemberResult::from_value("year", int_value.clone()),
				method("strftime", "format -> strftime() style string."),
				method("isoformat", "Return the time formatted according to ISO."),
			],
			&["year", "month", "day"],
		);
		let datetime = vec![
			MemberResult::from_value("datetime", datetime_class),
			MemberResult::from_value("date", class("date", "date(year, month, day) --> date object", Vec::new(), &["year", "month", "day"])),
			MemberResult::from_value("timedelta", class("timedelta", "Difference between two datetime values.", Vec::new(), &["days"])),
			MemberResult::from_value("MAXYEAR", int_value.clone()),
		];

		let builtins = vec![
			("int", int.clone()),
			("str", str_.clone()),
			("print", function("print", "Prints the values to a stream.", &["value"], None)),
			("len", function("len", "Return the number of items in a container.", &["obj"], Some(&int_value))),
		];

		Self {
			int,
			str_,
			builtins,
			modules: HashMap::from([("random", random), ("datetime", datetime)]),
		}
	}
}

impl ModuleResolver for Library {
	fn exports(&self, module: &str) -> Option<Vec<MemberResult>> {
		self.modules.get(module).cloned()
	}
}

impl Library {
	/// Possible types of a source expression.
	fn infer(&self, scopes: &ScopeTree, scope: ScopeId, expr: &str) -> Vec<TypeDescriptor> {
		let expr = expr.trim();
		if let Some(open) = expr.find('(') {
			return self
				.infer(scopes, scope, &expr[..open])
				.iter()
				.flat_map(|ty| match ty {
					TypeDescriptor::Class(_) => vec![TypeDescriptor::instance_of(ty)],
					_ => ty.overloads().iter().flat_map(|o| o.returns.iter().cloned()).collect(),
				})
				.collect();
		}
		if expr.starts_with(|c: char| c.is_ascii_digit()) {
			return vec![TypeDescriptor::instance_of(&self.int)];
		}
		if expr.starts_with(['"', '\'']) {
			return vec![TypeDescriptor::instance_of(&self.str_)];
		}
		if let Some((base, attr)) = expr.rsplit_once('.') {
			return self
				.infer(scopes, scope, base)
				.iter()
				.flat_map(|ty| self.member_values(ty, attr))
				.collect();
		}
		scopes.resolve_name(scope, expr).map(|v| v.types().to_vec()).unwrap_or_default()
	}

	fn member_values(&self, ty: &TypeDescriptor, attr: &str) -> Vec<TypeDescriptor> {
		let members = match ty {
			TypeDescriptor::Module(module) => self.exports(&module.name).unwrap_or_default(),
			TypeDescriptor::Class(class) | TypeDescriptor::Instance(class) => class.members.clone(),
			_ => Vec::new(),
		};
		members
			.into_iter()
			.find(|m| m.name() == attr)
			.map(|m| m.values().to_vec())
			.unwrap_or_default()
	}
}

/// Evaluates expression nodes by re-reading their source text.
struct SourceEvaluator {
	library: Arc<Library>,
	sources: HashMap<NodeId, String>,
}

impl TypeEvaluator for SourceEvaluator {
	fn evaluate(&self, cx: &EvalContext<'_>) -> Vec<TypeDescriptor> {
		self.sources
			.get(&cx.node)
			.map(|source| self.library.infer(cx.snapshot.scopes(), cx.scope, source))
			.unwrap_or_default()
	}
}

struct Builder<'a> {
	uri: &'a Uri,
	library: &'a Library,
	ast: SyntaxTree,
	scopes: ScopeTree,
	sources: HashMap<NodeId, String>,
}

impl Builder<'_> {
	fn location(&self, line: usize, start: usize, len: usize) -> Option<Location> {
		Some(Location::new(self.uri.clone(), span(line, start, line, start + len)))
	}

	/// Adds expression nodes for one line, nesting the contents of calls under their call node.
	fn expressions(&mut self, statement: NodeId, line_no: usize, line: &[char]) {
		let mut parents: Vec<(NodeId, usize)> = vec![(statement, usize::MAX)];
		let mut i = 0;
		while i < line.len() {
			while parents.len() > 1 && parents.last().is_some_and(|(_, end)| i >= *end) {
				parents.pop();
			}
			let parent = parents.last().map_or(statement, |(node, _)| *node);
			let c = line[i];

			if c.is_alphabetic() || c == '_' {
				let mut start = i;
				while i < line.len() && (line[i].is_alphanumeric() || line[i] == '_') {
					i += 1;
				}
				while start > 0 && line[start - 1] == '.' {
					start -= 1;
					while start > 0 && (line[start - 1].is_alphanumeric() || line[start - 1] == '_') {
						start -= 1;
					}
				}
				let ident_start = line[..i].iter().rposition(|c| *c == '.').map_or(start, |dot| (dot + 1).max(start));
				let source: String = line[start..i].iter().collect();
				if KEYWORDS.contains(&source.as_str()) {
					continue;
				}

				if line.get(i) == Some(&'(') {
					let close = matching_paren(line, i);
					let call = self.ast.add(parent, NodeKind::Call, span(line_no, ident_start, line_no, close));
					self.sources.insert(call, line[start..close].iter().collect());
					let callee = self.ast.add(call, NodeKind::Expression, span(line_no, ident_start, line_no, i));
					self.sources.insert(callee, source);
					parents.push((call, close));
					i += 1;
				} else {
					let node = self.ast.add(parent, NodeKind::Expression, span(line_no, ident_start, line_no, i));
					self.sources.insert(node, source);
				}
			} else if c.is_ascii_digit() || c == '"' || c == '\'' {
				let start = i;
				i += 1;
				if c.is_ascii_digit() {
					while i < line.len() && line[i].is_ascii_digit() {
						i += 1;
					}
				} else {
					while i < line.len() && line[i] != c {
						i += 1;
					}
					i = (i + 1).min(line.len());
				}
				let node = self.ast.add(parent, NodeKind::Expression, span(line_no, start, line_no, i));
				self.sources.insert(node, line[start..i].iter().collect());
			} else if c == '.' && !line.get(i + 1).is_some_and(|n| n.is_alphabetic() || *n == '_') {
				self.ast.add(parent, NodeKind::EmptyExpression, span(line_no, i + 1, line_no, i + 1));
				i += 1;
			} else {
				i += 1;
			}
		}
	}
}

fn span(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Span {
	Span::from_coords(start_line as u32, start_col as u32, end_line as u32, end_col as u32)
}

/// Index just past the `)` closing the `(` at `open`, or the line end.
fn matching_paren(line: &[char], open: usize) -> usize {
	let mut depth = 0;
	for (i, c) in line.iter().enumerate().skip(open) {
		match c {
			'(' => depth += 1,
			')' => {
				depth -= 1;
				if depth == 0 {
					return i + 1;
				}
			}
			_ => {}
		}
	}
	line.len()
}

/// Builds a snapshot for `request` without any cancellation points.
pub fn analyze_source(request: &AnalysisRequest, library: &Arc<Library>, options: QueryOptions) -> AnalysisSnapshot {
	let text = request.text.to_string();
	let lines: Vec<Vec<char>> = text.split('\n').map(|l| l.trim_end_matches('\r').chars().collect()).collect();
	let last = lines.len() - 1;
	let module_span = span(0, 0, last, lines[last].len());

	let ast = SyntaxTree::new(module_span);
	let root = ast.root();
	let mut b = Builder {
		uri: &request.document,
		library: library.as_ref(),
		ast,
		scopes: ScopeTree::new("test", module_span, Some(root)),
		sources: HashMap::new(),
	};
	let builtins = b.scopes.builtins_scope();
	for (name, ty) in &library.builtins {
		b.scopes.declare(builtins, *name, vec![ty.clone()], None);
	}
	let global = b.scopes.global_id();
	let mut current: Option<(ScopeId, NodeId)> = None;

	for (line_no, line) in lines.iter().enumerate() {
		let source: String = line.iter().collect();
		let body = source.trim();
		if body.is_empty() {
			continue;
		}
		let indent = line.iter().take_while(|c| c.is_whitespace()).count();
		if indent == 0 {
			current = None;
		}
		let (scope, parent) = current.unwrap_or((global, root));

		if let Some(rest) = body.strip_prefix("def ") {
			let name = rest.split('(').next().unwrap_or_default().trim();
			let params = rest
				.split_once('(')
				.and_then(|(_, rest)| rest.split_once(')'))
				.map(|(params, _)| params)
				.unwrap_or_default();
			let end = line_no + lines[line_no + 1..].iter().take_while(|l| l.first().is_some_and(|c| c.is_whitespace())).count();
			let def_span = span(line_no, indent, end, lines[end].len());
			let def = b.ast.add(parent, NodeKind::FunctionDef, def_span);

			let mut overload = Overload::new(name);
			let mut names = Vec::new();
			for param in params.split(',').map(str::trim).filter(|p| !p.is_empty()) {
				let parameter = match param.split_once('=') {
					Some((p, default)) => Parameter::new(p.trim()).with_default(default.trim()),
					None => Parameter::new(param),
				};
				names.push(parameter.name.clone());
				overload = overload.with_parameter(parameter);
			}
			let ty = TypeDescriptor::function(FunctionType {
				name: name.into(),
				overloads: vec![overload],
				documentation: String::new(),
			});
			let location = b.location(line_no, indent + 4, name.len());
			b.scopes.declare(scope, name, vec![ty], location);
			let inner = b.scopes.add_scope(scope, ScopeKind::Function, name, def_span, Some(def));
			for param in names {
				b.scopes.declare(inner, param, Vec::new(), None);
			}
			current = Some((inner, def));
			continue;
		}

		let statement = b.ast.add(parent, NodeKind::Statement, span(line_no, indent, line_no, line.len()));
		if let Some(module) = body.strip_prefix("import ") {
			let module = module.trim();
			let location = b.location(line_no, indent + 7, module.len());
			b.scopes.declare(scope, module, vec![TypeDescriptor::module(module)], location);
			continue;
		}
		if let Some((module, "*")) = body
			.strip_prefix("from ")
			.and_then(|rest| rest.split_once(" import "))
			.map(|(m, n)| (m.trim(), n.trim()))
		{
			for member in b.library.exports(module).unwrap_or_default() {
				b.scopes.declare(scope, member.name(), member.values().to_vec(), None);
			}
			continue;
		}

		b.expressions(statement, line_no, line);
		if let Some((target, value)) = body.split_once('=') {
			let target = target.trim();
			if !target.is_empty() && target.chars().all(|c| c.is_alphanumeric() || c == '_') {
				let types = b.library.infer(&b.scopes, scope, value);
				let location = b.location(line_no, indent, target.len());
				b.scopes.declare(scope, target, types, location);
			}
		}
	}

	let evaluator = SourceEvaluator {
		library: Arc::clone(library),
		sources: b.sources,
	};
	AnalysisSnapshot::new(request.document.clone(), request.version, Arc::new(b.ast), b.scopes)
		.with_evaluator(Arc::new(evaluator))
		.with_resolver(Arc::clone(library) as Arc<dyn ModuleResolver>)
		.with_options(options)
}

/// Analyzer over [`analyze_source`] that records which versions completed.
pub struct FixtureAnalyzer {
	pub library: Arc<Library>,
	pub options: QueryOptions,
	/// Simulated parse time, interrupted by cancellation.
	pub delay: Duration,
	pub started: AtomicUsize,
	pub completed: Mutex<Vec<i32>>,
}

impl FixtureAnalyzer {
	pub fn new(options: QueryOptions, delay: Duration) -> Self {
		Self {
			library: Arc::new(Library::default()),
			options,
			delay,
			started: AtomicUsize::new(0),
			completed: Mutex::new(Vec::new()),
		}
	}

	pub fn started(&self) -> usize {
		self.started.load(Ordering::SeqCst)
	}

	pub fn completed(&self) -> Vec<i32> {
		self.completed.lock().clone()
	}
}

#[async_trait]
impl Analyzer for FixtureAnalyzer {
	async fn analyze(&self, request: AnalysisRequest, cancel: CancellationToken) -> anyhow::Result<AnalysisSnapshot> {
		self.started.fetch_add(1, Ordering::SeqCst);
		if !self.delay.is_zero() {
			tokio::select! {
				_ = cancel.cancelled() => anyhow::bail!("analysis of version {} cancelled", request.version),
				_ = tokio::time::sleep(self.delay) => {}
			}
		}
		let snapshot = analyze_source(&request, &self.library, self.options);
		self.completed.lock().push(request.version);
		Ok(snapshot)
	}
}

/// Explicit per-test environment: a document table over a [`FixtureAnalyzer`].
pub struct TestContext {
	pub analyzer: Arc<FixtureAnalyzer>,
	pub table: DocumentTable,
}

impl TestContext {
	/// Sets up logging and an empty table with default settings.
	pub fn init() -> Self {
		Self::init_with(AnalysisConfig::default(), Duration::ZERO)
	}

	/// Sets up logging and an empty table.
	pub fn init_with(config: AnalysisConfig, delay: Duration) -> Self {
		let _ = tracing_subscriber::fmt::try_init();
		let analyzer = Arc::new(FixtureAnalyzer::new(config.query_options(), delay));
		let table = DocumentTable::new(Arc::clone(&analyzer) as Arc<dyn Analyzer>, Handle::current(), config);
		Self { analyzer, table }
	}

	pub fn uri(name: &str) -> Uri {
		format!("file:///{name}").parse().unwrap()
	}

	/// Opens `name` and waits for its first snapshot.
	pub async fn open(&mut self, name: &str, text: &str) -> Arc<AnalysisSnapshot> {
		let uri = Self::uri(name);
		self.table.open(uri.clone(), 0, text).unwrap();
		self.current(&uri).await
	}

	/// Waits for the snapshot matching the buffer version of `uri`.
	pub async fn current(&self, uri: &Uri) -> Arc<AnalysisSnapshot> {
		let document = self.table.get(uri).unwrap();
		tokio::time::timeout(WAIT, document.current_snapshot()).await.unwrap().unwrap()
	}

	/// Closes every open document and checks nothing is left behind.
	pub fn teardown(mut self) {
		let uris: Vec<Uri> = self.table.uris().cloned().collect();
		for uri in &uris {
			self.table.close(uri).unwrap();
		}
		assert!(self.table.is_empty());
	}
}

/// Names of a member list, in order.
pub fn names(members: &[MemberResult]) -> Vec<&str> {
	members.iter().map(MemberResult::name).collect()
}

/// Member called `name`, panicking when absent.
pub fn member<'a>(members: &'a [MemberResult], name: &str) -> &'a MemberResult {
	members
		.iter()
		.find(|m| m.name() == name)
		.unwrap_or_else(|| panic!("no member {name} in {:?}", names(members)))
}

/// Kind of the member called `name`.
pub fn kind_of(members: &[MemberResult], name: &str) -> MemberKind {
	member(members, name).kind()
}
