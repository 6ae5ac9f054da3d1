//! Generic path-recording field resolution.
//!
//! A query executor calls [`Resolver::resolve_field`] once per field
//! occurrence. The resolver never produces real data: leaves get back the
//! caller's zero value, object fields get an empty handle of the declared
//! type, list fields get a one-element sequence. That is enough for the
//! executor to walk the full selection, and every call leaves behind a
//! [`Resolution`] carrying the dotted path of the field.
//!
//! Paths are rebuilt by scanning the record backwards for the nearest entry
//! whose declared type is the current entity. That only holds while calls of
//! one session arrive one at a time in traversal order; executors that
//! evaluate siblings concurrently pass the parent's [`EntryId`] instead.
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{BuildError, ResolveError};
use crate::ir::{TypeGraph, TypeNode};

// ————————————————————————————————————————————————————————————————————————————
// DECLARED TYPES & PLACEHOLDERS
// ————————————————————————————————————————————————————————————————————————————

/// A field's declared return type as the executor sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.named(),
        }
    }

    pub fn is_nullable(&self) -> bool {
        !matches!(self, TypeRef::NonNull(_))
    }

    pub fn strip_non_null(&self) -> &TypeRef {
        match self {
            TypeRef::NonNull(inner) => inner,
            other => other,
        }
    }

    pub fn from_node(node: &TypeNode, graph: &TypeGraph) -> Self {
        fn go(node: &TypeNode, graph: &TypeGraph) -> TypeRef {
            match node {
                TypeNode::Nullable(inner) => go(inner, graph),
                TypeNode::List(inner) => TypeRef::List(Box::new(TypeRef::from_node(inner, graph))),
                other => TypeRef::Named(other.named(graph).to_string()),
            }
        }
        match node {
            TypeNode::Nullable(inner) => go(inner, graph),
            other => TypeRef::NonNull(Box::new(go(other, graph))),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::List(inner) => write!(f, "[{inner}]"),
            TypeRef::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

impl FromStr for TypeRef {
    type Err = BuildError;

    /// Parse GraphQL type notation, e.g. `[Apple!]!`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(inner) = s.strip_suffix('!') {
            return Ok(TypeRef::NonNull(Box::new(inner.parse()?)));
        }
        if let Some(inner) = s.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            return Ok(TypeRef::List(Box::new(inner.parse()?)));
        }
        if !s.is_empty() && s.chars().all(|c| c == '_' || c.is_ascii_alphanumeric())
            && !s.starts_with(|c: char| c.is_ascii_digit())
        {
            Ok(TypeRef::Named(s.to_string()))
        } else {
            Err(BuildError::InvalidName(s.to_string()))
        }
    }
}

/// Placeholder values handed back to the executor.
#[derive(Debug, Clone, PartialEq)]
pub enum Placeholder {
    Leaf(Value),
    Object(ObjectHandle),
    Sequence(Vec<Placeholder>),
    Optional(Option<Box<Placeholder>>),
}

/// An empty instance of a named object type; the executor recurses into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHandle {
    pub type_name: String,
}

impl Placeholder {
    pub fn some(inner: Placeholder) -> Self {
        Placeholder::Optional(Some(Box::new(inner)))
    }

    /// Zero value of a scalar: typed for built-ins, `null` otherwise.
    pub fn zero_leaf(scalar: &str) -> Self {
        Placeholder::Leaf(match scalar {
            "Int" => Value::from(0),
            "Float" => Value::from(0.0),
            "Boolean" => Value::Bool(false),
            "String" | "ID" => Value::String(String::new()),
            _ => Value::Null,
        })
    }

    pub fn as_object(&self) -> Option<&ObjectHandle> {
        match self {
            Placeholder::Object(handle) => Some(handle),
            Placeholder::Optional(Some(inner)) => inner.as_object(),
            _ => None,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// REQUESTS
// ————————————————————————————————————————————————————————————————————————————

/// Position of an entry in a [`ResolutionRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(pub usize);

/// One field occurrence the executor wants resolved.
#[derive(Debug, Clone)]
pub struct FieldRequest {
    /// Type the field is selected on.
    pub entity: String,
    pub field: String,
    pub arguments: IndexMap<String, Value>,
    pub declared: TypeRef,
    /// Returned unchanged for leaf fields.
    pub zero: Placeholder,
    pub object: bool,
    pub list: bool,
    pub nullable: bool,
    /// Entry of the enclosing field, when the executor tracks it.
    pub parent: Option<EntryId>,
}

impl FieldRequest {
    pub fn leaf(entity: &str, field: &str, declared: TypeRef, zero: Placeholder) -> Self {
        Self::new(entity, field, declared, zero, false, false)
    }

    pub fn object(entity: &str, field: &str, declared: TypeRef) -> Self {
        Self::new(entity, field, declared, Placeholder::Optional(None), true, false)
    }

    pub fn list(entity: &str, field: &str, declared: TypeRef) -> Self {
        Self::new(entity, field, declared, Placeholder::Sequence(Vec::new()), false, true)
    }

    fn new(
        entity: &str,
        field: &str,
        declared: TypeRef,
        zero: Placeholder,
        object: bool,
        list: bool,
    ) -> Self {
        let nullable = declared.is_nullable();
        Self {
            entity: entity.to_string(),
            field: field.to_string(),
            arguments: IndexMap::new(),
            declared,
            zero,
            object,
            list,
            nullable,
            parent: None,
        }
    }

    /// Build the request for `entity.field` straight from the graph.
    pub fn from_graph(graph: &TypeGraph, entity: &str, field: &str) -> Option<Self> {
        let descriptor = graph.field(entity, field)?;
        let declared = TypeRef::from_node(&descriptor.return_type, graph);
        let request = match descriptor.return_type.non_null() {
            TypeNode::Object(_) => Self::object(entity, field, declared),
            TypeNode::List(_) => Self::list(entity, field, declared),
            TypeNode::Scalar(name) => {
                let zero = Placeholder::zero_leaf(name);
                Self::leaf(entity, field, declared, zero)
            }
            TypeNode::Enum { .. } => {
                Self::leaf(entity, field, declared, Placeholder::Leaf(Value::Null))
            }
            TypeNode::Nullable(_) => return None,
        };
        Some(request)
    }

    pub fn with_argument(mut self, name: &str, value: Value) -> Self {
        self.arguments.insert(name.to_string(), value);
        self
    }

    pub fn with_parent(mut self, parent: EntryId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// The single capability a query executor needs.
pub trait Resolver {
    fn resolve_field(&self, request: FieldRequest) -> Result<Resolved, ResolveError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub value: Placeholder,
    /// Entry appended for this call; pass it as `parent` for sub-fields.
    pub entry: EntryId,
}

// ————————————————————————————————————————————————————————————————————————————
// RECORD
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub entity: String,
    pub field: String,
    pub arguments: IndexMap<String, Value>,
    pub declared: TypeRef,
    pub path: String,
    pub leaf: bool,
}

/// Append-only log of one query session.
#[derive(Debug, Clone, Default)]
pub struct ResolutionRecord {
    entries: Vec<Resolution>,
}

impl ResolutionRecord {
    pub fn entries(&self) -> &[Resolution] {
        &self.entries
    }
    pub fn get(&self, id: EntryId) -> Option<&Resolution> {
        self.entries.get(id.0)
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }

    fn path_for(&self, request: &FieldRequest) -> Result<String, ResolveError> {
        let ancestor = match request.parent {
            Some(id) => {
                let parent = self.get(id).ok_or(ResolveError::UnknownParent(id.0))?;
                if parent.declared.named() != request.entity {
                    return Err(ResolveError::MismatchedParent {
                        parent: id.0,
                        entity: request.entity.clone(),
                        found: parent.declared.named().to_string(),
                    });
                }
                Some(parent)
            }
            None => self
                .entries
                .iter()
                .rev()
                .find(|e| e.declared.named() == request.entity),
        };
        let path = match ancestor {
            Some(entry) => format!("{}.{}", entry.path, request.field),
            None => request.field.clone(),
        };
        Ok(path.to_lowercase())
    }

    fn push(&mut self, entry: Resolution) -> EntryId {
        self.entries.push(entry);
        EntryId(self.entries.len() - 1)
    }

    /// Leaf paths and argument values touched by the session.
    pub fn query_request(&self) -> QueryRequest {
        let fields = self.entries.iter().filter(|e| e.leaf).map(|e| e.path.clone()).collect();
        let args = self
            .entries
            .iter()
            .flat_map(|e| {
                e.arguments.iter().map(move |(name, value)| NamedValue {
                    name: format!("{}.{}", e.path, name),
                    value: value.clone(),
                })
            })
            .collect();
        QueryRequest { fields, args }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedValue {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryRequest {
    /// Dotted, lower-cased paths of every leaf field.
    pub fields: Vec<String>,
    pub args: Vec<NamedValue>,
}

// ————————————————————————————————————————————————————————————————————————————
// SCAN RESOLVER
// ————————————————————————————————————————————————————————————————————————————

/// One query session over a shared graph.
pub struct ScanResolver {
    graph: Arc<TypeGraph>,
    record: Mutex<ResolutionRecord>,
}

impl ScanResolver {
    pub fn new(graph: Arc<TypeGraph>) -> Self {
        Self { graph, record: Mutex::new(ResolutionRecord::default()) }
    }

    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    /// Snapshot of the record so far.
    pub fn record(&self) -> ResolutionRecord {
        self.record.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn into_record(self) -> ResolutionRecord {
        self.record.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn query_request(&self) -> QueryRequest {
        self.record.lock().unwrap_or_else(PoisonError::into_inner).query_request()
    }

    fn synthesize(&self, request: &FieldRequest) -> Result<Placeholder, ResolveError> {
        match (request.object, request.list) {
            (false, false) => Ok(request.zero.clone()),
            (true, false) => {
                let name = request.declared.named();
                if self.graph.registry().object(name).is_none() {
                    return Err(ResolveError::UnknownObjectField(request.field.clone()));
                }
                let handle = Placeholder::Object(ObjectHandle { type_name: name.to_string() });
                Ok(optional_if(request.nullable, handle))
            }
            (false, true) => match request.declared.strip_non_null() {
                TypeRef::List(element) => {
                    let sequence = Placeholder::Sequence(vec![self.empty_instance(element)]);
                    Ok(optional_if(request.nullable, sequence))
                }
                _ => Err(unimplemented(request)),
            },
            (true, true) => Err(unimplemented(request)),
        }
    }

    /// Fresh empty value for a list element slot, keeping its optionality.
    fn empty_instance(&self, ty: &TypeRef) -> Placeholder {
        let inner = match ty.strip_non_null() {
            TypeRef::List(element) => Placeholder::Sequence(vec![self.empty_instance(element)]),
            TypeRef::Named(name) if self.graph.registry().object(name).is_some() => {
                Placeholder::Object(ObjectHandle { type_name: name.clone() })
            }
            TypeRef::Named(name) => Placeholder::zero_leaf(name),
            TypeRef::NonNull(inner) => return self.empty_instance(inner),
        };
        optional_if(ty.is_nullable(), inner)
    }
}

impl Resolver for ScanResolver {
    fn resolve_field(&self, request: FieldRequest) -> Result<Resolved, ResolveError> {
        let mut record = self.record.lock().unwrap_or_else(PoisonError::into_inner);

        let path = record.path_for(&request)?;
        let value = match self.synthesize(&request) {
            Ok(value) => value,
            Err(error) => {
                debug!(
                    entity = %request.entity,
                    field = %request.field,
                    %error,
                    "field not resolved"
                );
                return Err(error);
            }
        };

        trace!(entity = %request.entity, field = %request.field, %path, "resolved field");
        let entry = record.push(Resolution {
            entity: request.entity,
            field: request.field,
            arguments: request.arguments,
            declared: request.declared,
            path,
            leaf: !(request.object || request.list),
        });
        Ok(Resolved { value, entry })
    }
}

fn optional_if(nullable: bool, value: Placeholder) -> Placeholder {
    if nullable {
        Placeholder::some(value)
    } else {
        value
    }
}

fn unimplemented(request: &FieldRequest) -> ResolveError {
    ResolveError::UnimplementedCombination {
        field: request.field.clone(),
        object: request.object,
        list: request.list,
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspection::fixtures::*;
    use crate::typer::parse_types;
    use serde_json::json;

    fn orchard() -> Arc<TypeGraph> {
        let defs = vec![
            object("Query", vec![
                field_with_args("a", vec![("id", scalar("ID"))], object_ref("Apple")),
                field("b", object_ref("Apple")),
                field("apples", non_null(list(non_null(object_ref("Apple"))))),
                field("maybeApples", list(object_ref("Apple"))),
                field("grid", list(list(scalar("Int")))),
                field("count", non_null(scalar("Int"))),
            ]),
            object("Apple", vec![
                field("s", scalar("String")),
                field("Tree", object_ref("Tree")),
            ]),
            object("Tree", vec![field("height", scalar("Float"))]),
        ];
        Arc::new(parse_types(&types(defs)).unwrap())
    }

    fn ty(s: &str) -> TypeRef {
        s.parse().unwrap()
    }

    fn leaf(entity: &str, field: &str, declared: &str) -> FieldRequest {
        FieldRequest::leaf(entity, field, ty(declared), Placeholder::Leaf(Value::Null))
    }

    #[test]
    fn path_follows_enclosing_object() {
        let scan = ScanResolver::new(orchard());
        scan.resolve_field(FieldRequest::object("Query", "a", ty("Apple"))).unwrap();
        scan.resolve_field(leaf("Apple", "s", "String")).unwrap();
        let record = scan.record();
        assert_eq!(record.paths().collect::<Vec<_>>(), vec!["a", "a.s"]);
    }

    #[test]
    fn paths_are_lower_cased_and_nest() {
        let scan = ScanResolver::new(orchard());
        scan.resolve_field(FieldRequest::object("Query", "a", ty("Apple"))).unwrap();
        scan.resolve_field(FieldRequest::object("Apple", "Tree", ty("Tree"))).unwrap();
        scan.resolve_field(leaf("Tree", "height", "Float")).unwrap();
        assert_eq!(scan.record().paths().last(), Some("a.tree.height"));
    }

    #[test]
    fn nearest_enclosing_entry_wins() {
        let scan = ScanResolver::new(orchard());
        scan.resolve_field(FieldRequest::object("Query", "a", ty("Apple"))).unwrap();
        scan.resolve_field(leaf("Apple", "s", "String")).unwrap();
        scan.resolve_field(FieldRequest::object("Query", "b", ty("Apple"))).unwrap();
        scan.resolve_field(leaf("Apple", "s", "String")).unwrap();
        assert_eq!(scan.record().paths().collect::<Vec<_>>(), vec!["a", "a.s", "b", "b.s"]);
    }

    #[test]
    fn list_entries_count_as_enclosing() {
        let scan = ScanResolver::new(orchard());
        scan.resolve_field(FieldRequest::list("Query", "apples", ty("[Apple!]!"))).unwrap();
        scan.resolve_field(leaf("Apple", "s", "String")).unwrap();
        assert_eq!(scan.record().paths().last(), Some("apples.s"));
    }

    #[test]
    fn parent_pointer_overrides_scan() {
        let scan = ScanResolver::new(orchard());
        let a = scan.resolve_field(FieldRequest::object("Query", "a", ty("Apple"))).unwrap();
        let _b = scan.resolve_field(FieldRequest::object("Query", "b", ty("Apple"))).unwrap();
        let s = scan.resolve_field(leaf("Apple", "s", "String").with_parent(a.entry)).unwrap();
        assert_eq!(scan.record().get(s.entry).unwrap().path, "a.s");
    }

    #[test]
    fn unknown_parent_is_an_error() {
        let scan = ScanResolver::new(orchard());
        let err = scan
            .resolve_field(leaf("Apple", "s", "String").with_parent(EntryId(7)))
            .unwrap_err();
        assert_eq!(err, ResolveError::UnknownParent(7));
        assert!(scan.record().is_empty());
    }

    #[test]
    fn parent_of_another_type_is_rejected() {
        let scan = ScanResolver::new(orchard());
        let a = scan.resolve_field(FieldRequest::object("Query", "a", ty("Apple"))).unwrap();
        let err = scan
            .resolve_field(leaf("Tree", "height", "Float").with_parent(a.entry))
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::MismatchedParent {
                parent: 0,
                entity: "Tree".into(),
                found: "Apple".into(),
            }
        );
        assert_eq!(scan.record().len(), 1);
    }

    #[test]
    fn leaf_returns_zero_unchanged() {
        let scan = ScanResolver::new(orchard());
        let zero = Placeholder::Leaf(json!(41));
        let out = scan
            .resolve_field(FieldRequest::leaf("Query", "count", ty("Int!"), zero.clone()))
            .unwrap();
        assert_eq!(out.value, zero);
        let record = scan.record();
        assert!(record.entries()[0].leaf);
        assert_eq!(record.entries()[0].declared, ty("Int!"));
    }

    #[test]
    fn object_fields_get_empty_handles() {
        let scan = ScanResolver::new(orchard());
        let nullable = scan.resolve_field(FieldRequest::object("Query", "a", ty("Apple"))).unwrap();
        assert_eq!(
            nullable.value,
            Placeholder::some(Placeholder::Object(ObjectHandle { type_name: "Apple".into() }))
        );
        let strict = scan.resolve_field(FieldRequest::object("Query", "a", ty("Apple!"))).unwrap();
        assert_eq!(strict.value, Placeholder::Object(ObjectHandle { type_name: "Apple".into() }));
        assert_eq!(strict.value.as_object().map(|h| h.type_name.as_str()), Some("Apple"));
        assert!(!scan.record().entries()[0].leaf);
    }

    #[test]
    fn unknown_object_fails_without_recording() {
        let scan = ScanResolver::new(orchard());
        scan.resolve_field(FieldRequest::object("Query", "a", ty("Apple"))).unwrap();

        let err = scan
            .resolve_field(FieldRequest::object("Query", "banana", ty("Banana")))
            .unwrap_err();
        assert_eq!(err, ResolveError::UnknownObjectField("banana".into()));
        assert_eq!(err.to_string(), "no such object banana");

        // scalars are not objects either
        let err = scan.resolve_field(FieldRequest::object("Apple", "s", ty("String"))).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownObjectField(_)));

        assert_eq!(scan.record().len(), 1);
        // the session keeps working after a failed field
        scan.resolve_field(leaf("Apple", "s", "String")).unwrap();
        assert_eq!(scan.record().paths().last(), Some("a.s"));
    }

    #[test]
    fn lists_get_one_element_of_the_declared_shape() {
        let scan = ScanResolver::new(orchard());
        let apple = Placeholder::Object(ObjectHandle { type_name: "Apple".into() });

        let strict = scan
            .resolve_field(FieldRequest::list("Query", "apples", ty("[Apple!]!")))
            .unwrap();
        assert_eq!(strict.value, Placeholder::Sequence(vec![apple.clone()]));

        let loose = scan
            .resolve_field(FieldRequest::list("Query", "maybeApples", ty("[Apple]")))
            .unwrap();
        assert_eq!(
            loose.value,
            Placeholder::some(Placeholder::Sequence(vec![Placeholder::some(apple)]))
        );

        let grid = scan
            .resolve_field(FieldRequest::list("Query", "grid", ty("[[Int]]")))
            .unwrap();
        let cell = Placeholder::some(Placeholder::Leaf(json!(0)));
        let row = Placeholder::some(Placeholder::Sequence(vec![cell]));
        assert_eq!(grid.value, Placeholder::some(Placeholder::Sequence(vec![row])));

        let tags = scan
            .resolve_field(FieldRequest::list("Apple", "tags", ty("[String!]!")))
            .unwrap();
        assert_eq!(tags.value, Placeholder::Sequence(vec![Placeholder::Leaf(json!(""))]));
    }

    #[test]
    fn nested_lists_reach_the_element_object() {
        let scan = ScanResolver::new(orchard());
        let rows = scan
            .resolve_field(FieldRequest::list("Query", "rows", ty("[[Apple!]!]!")))
            .unwrap();
        let apple = Placeholder::Object(ObjectHandle { type_name: "Apple".into() });
        assert_eq!(
            rows.value,
            Placeholder::Sequence(vec![Placeholder::Sequence(vec![apple])])
        );

        // the executor can descend into the innermost element
        scan.resolve_field(leaf("Apple", "s", "String")).unwrap();
        assert_eq!(scan.record().paths().collect::<Vec<_>>(), vec!["rows", "rows.s"]);
    }

    #[test]
    fn unclassifiable_flags_are_unimplemented() {
        let scan = ScanResolver::new(orchard());
        let mut both = FieldRequest::object("Query", "apples", ty("[Apple!]!"));
        both.list = true;
        let err = scan.resolve_field(both).unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnimplementedCombination {
                field: "apples".into(),
                object: true,
                list: true,
            }
        );

        let err = scan.resolve_field(FieldRequest::list("Query", "count", ty("Int!"))).unwrap_err();
        assert!(matches!(err, ResolveError::UnimplementedCombination { .. }));
        assert!(scan.record().is_empty());
    }

    #[test]
    fn requests_derived_from_the_graph() {
        let graph = orchard();
        let a = FieldRequest::from_graph(&graph, "Query", "a").unwrap();
        assert!(a.object && !a.list && a.nullable);
        assert_eq!(a.declared, ty("Apple"));

        let apples = FieldRequest::from_graph(&graph, "Query", "apples").unwrap();
        assert!(apples.list && !apples.object && !apples.nullable);
        assert_eq!(apples.declared.to_string(), "[Apple!]!");

        let count = FieldRequest::from_graph(&graph, "Query", "count").unwrap();
        assert_eq!(count.zero, Placeholder::Leaf(json!(0)));
        assert!(FieldRequest::from_graph(&graph, "Query", "nope").is_none());
    }

    #[test]
    fn query_request_lists_leaves_and_arguments() {
        let scan = ScanResolver::new(orchard());
        let a = FieldRequest::object("Query", "a", ty("Apple")).with_argument("id", json!("7"));
        scan.resolve_field(a).unwrap();
        scan.resolve_field(leaf("Apple", "s", "String")).unwrap();
        scan.resolve_field(FieldRequest::object("Apple", "Tree", ty("Tree"))).unwrap();
        scan.resolve_field(leaf("Tree", "height", "Float")).unwrap();

        let request = scan.query_request();
        assert_eq!(request.fields, vec!["a.s", "a.tree.height"]);
        assert_eq!(request.args, vec![NamedValue { name: "a.id".into(), value: json!("7") }]);
    }

    #[test]
    fn concurrent_siblings_with_parent_pointers() {
        let scan = ScanResolver::new(orchard());
        let a = scan.resolve_field(FieldRequest::object("Query", "a", ty("Apple"))).unwrap().entry;
        let b = scan.resolve_field(FieldRequest::object("Query", "b", ty("Apple"))).unwrap().entry;

        std::thread::scope(|s| {
            for parent in [a, b, a, b] {
                let scan = &scan;
                s.spawn(move || {
                    scan.resolve_field(leaf("Apple", "s", "String").with_parent(parent)).unwrap();
                });
            }
        });

        let record = scan.into_record();
        let mut leaves = record
            .entries()
            .iter()
            .filter(|e| e.leaf)
            .map(|e| e.path.clone())
            .collect::<Vec<_>>();
        leaves.sort();
        assert_eq!(leaves, vec!["a.s", "a.s", "b.s", "b.s"]);
    }

    #[test]
    fn type_ref_notation() {
        assert_eq!(
            ty("[String!]!"),
            TypeRef::NonNull(Box::new(TypeRef::List(Box::new(TypeRef::NonNull(Box::new(
                TypeRef::Named("String".into())
            ))))))
        );
        assert_eq!(ty("[[Int]]").to_string(), "[[Int]]");
        assert_eq!(ty("Apple!").named(), "Apple");
        assert!("[Apple".parse::<TypeRef>().is_err());
        assert!("".parse::<TypeRef>().is_err());
    }
}
