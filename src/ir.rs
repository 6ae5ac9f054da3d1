// Resolved type graph. Built once by `typer`, read-only afterwards.

use indexmap::{IndexMap, IndexSet};

/// Index of a canonical object/interface node in [`TypeGraph::objects`].
///
/// Two references to the same named type always carry the same id, which is
/// how a cyclic schema stays a finite structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) usize);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNode {
    Nullable(Box<TypeNode>),
    Scalar(String),
    List(Box<TypeNode>),
    Object(ObjectId),
    Enum { name: String, values: Vec<String> },
}

#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: String,
    pub is_interface: bool,
    /// `INPUT_OBJECT` in the source schema; structurally the same as an object.
    pub is_input: bool,
    pub implements: Vec<String>,
    /// Introspection order.
    pub fields: IndexMap<String, FieldDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub return_type: TypeNode,
    pub arguments: Vec<ArgumentDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDescriptor {
    pub name: String,
    pub ty: TypeNode,
    /// Default value as printed by introspection (GraphQL literal syntax).
    pub default_value: Option<String>,
}

/// Name → canonical node.
#[derive(Debug, Clone, Default)]
pub struct AtomRegistry {
    objects: IndexMap<String, ObjectId>,
    scalars: IndexSet<String>,
}

impl AtomRegistry {
    pub fn object(&self, name: &str) -> Option<ObjectId> {
        self.objects.get(name).copied()
    }
    pub fn is_scalar(&self, name: &str) -> bool {
        self.scalars.contains(name)
    }
    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }
    pub fn scalar_names(&self) -> impl Iterator<Item = &str> {
        self.scalars.iter().map(String::as_str)
    }
    pub(crate) fn register_object(&mut self, name: &str, id: ObjectId) {
        self.objects.insert(name.to_string(), id);
    }
    pub(crate) fn intern_scalar(&mut self, name: &str) {
        if !self.scalars.contains(name) {
            self.scalars.insert(name.to_string());
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TypeGraph {
    /// One node per top-level schema type, in input order. Always `Nullable`.
    pub roots: Vec<TypeNode>,
    pub(crate) objects: Vec<ObjectType>,
    pub(crate) registry: AtomRegistry,
}

impl TypeGraph {
    pub fn object(&self, id: ObjectId) -> &ObjectType {
        &self.objects[id.0]
    }
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &ObjectType)> {
        self.objects.iter().enumerate().map(|(i, o)| (ObjectId(i), o))
    }
    pub fn object_named(&self, name: &str) -> Option<&ObjectType> {
        self.registry.object(name).map(|id| self.object(id))
    }
    pub fn registry(&self) -> &AtomRegistry {
        &self.registry
    }
    pub fn field(&self, type_name: &str, field: &str) -> Option<&FieldDescriptor> {
        self.object_named(type_name)?.fields.get(field)
    }
}

impl TypeNode {
    /// Peel one `Nullable` box, if present.
    pub fn non_null(&self) -> &TypeNode {
        match self {
            TypeNode::Nullable(inner) => inner,
            other => other,
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, TypeNode::Nullable(_))
    }

    /// The object node under any `Nullable`/`List` wrapping.
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            TypeNode::Nullable(inner) | TypeNode::List(inner) => inner.object_id(),
            TypeNode::Object(id) => Some(*id),
            TypeNode::Scalar(_) | TypeNode::Enum { .. } => None,
        }
    }

    /// Name of the innermost named type.
    pub fn named<'g>(&'g self, graph: &'g TypeGraph) -> &'g str {
        match self {
            TypeNode::Nullable(inner) | TypeNode::List(inner) => inner.named(graph),
            TypeNode::Object(id) => &graph.object(*id).name,
            TypeNode::Scalar(name) | TypeNode::Enum { name, .. } => name,
        }
    }

    /// GraphQL type-reference notation, e.g. `[String!]`.
    pub fn display(&self, graph: &TypeGraph) -> String {
        fn go(node: &TypeNode, graph: &TypeGraph, nullable: bool) -> String {
            let bang = if nullable { "" } else { "!" };
            match node {
                TypeNode::Nullable(inner) => go(inner, graph, true),
                TypeNode::List(inner) => format!("[{}]{bang}", go(inner, graph, false)),
                other => format!("{}{bang}", other.named(graph)),
            }
        }
        go(self, graph, false)
    }
}
