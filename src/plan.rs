//! [`TypeGraph`] → ordered resolver descriptors for code emission.
//!
//! The walk is breadth-first from the roots and visits each object node once,
//! keyed by [`ObjectId`]. Output order depends only on root order and field
//! order, both of which are fixed by the graph, so deriving twice from the
//! same graph yields identical descriptors.
use std::collections::{HashSet, VecDeque};
use std::fmt;

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::ir::{ObjectId, TypeGraph, TypeNode};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolverDescriptor {
    pub type_name: String,
    pub is_interface: bool,
    pub implements: Vec<Implement>,
    pub fields: Vec<FieldPlan>,
}

/// `type_name` implements `interface`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Implement {
    pub interface: String,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldPlan {
    pub name: String,
    /// Return type (nullable-unwrapped) is an object or interface.
    pub object: bool,
    /// Return type (nullable-unwrapped) is a list.
    pub list: bool,
    pub nullable: bool,
    pub has_arguments: bool,
    pub response_type: TargetType,
    pub arguments: Vec<ArgumentPlan>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgumentPlan {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TargetType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// Canonical target-type expression an emitter would write for a field or argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetType {
    Primitive(String),
    /// Handle to the generated resolver of the named object type.
    Handle(String),
    SequenceOf(Box<TargetType>),
    Optional(Box<TargetType>),
}

impl TargetType {
    pub fn of(node: &TypeNode, graph: &TypeGraph) -> Self {
        match node {
            TypeNode::Nullable(inner) => {
                TargetType::Optional(Box::new(TargetType::of(inner, graph)))
            }
            TypeNode::List(inner) => {
                TargetType::SequenceOf(Box::new(TargetType::of(inner, graph)))
            }
            TypeNode::Object(id) => TargetType::Handle(graph.object(*id).name.clone()),
            TypeNode::Enum { .. } => TargetType::Primitive("String".into()),
            TypeNode::Scalar(name) => TargetType::Primitive(primitive_for(name).to_string()),
        }
    }
}

fn primitive_for(scalar: &str) -> &str {
    match scalar {
        "String" => "String",
        "Float" => "f64",
        "ID" => "ID",
        "Int" => "i32",
        "Boolean" => "bool",
        custom => custom,
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::Primitive(name) => f.write_str(name),
            TargetType::Handle(name) => write!(f, "{name}Resolver"),
            TargetType::SequenceOf(inner) => write!(f, "Vec<{inner}>"),
            TargetType::Optional(inner) => write!(f, "Option<{inner}>"),
        }
    }
}

impl Serialize for TargetType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DERIVATION
// ————————————————————————————————————————————————————————————————————————————

pub fn derive_descriptors(graph: &TypeGraph) -> Vec<ResolverDescriptor> {
    let mut out = Vec::new();
    let mut visited = HashSet::<ObjectId>::new();
    let mut queue = graph.roots.iter().collect::<VecDeque<_>>();

    while let Some(node) = queue.pop_front() {
        let id = match node {
            TypeNode::Nullable(inner) | TypeNode::List(inner) => {
                queue.push_back(inner);
                continue;
            }
            TypeNode::Object(id) => *id,
            TypeNode::Scalar(_) | TypeNode::Enum { .. } => continue,
        };
        if !visited.insert(id) {
            continue;
        }

        let object = graph.object(id);
        for field in object.fields.values() {
            queue.push_back(&field.return_type);
            queue.extend(field.arguments.iter().map(|arg| &arg.ty));
        }
        out.push(describe(graph, id));
    }

    debug!(resolvers = out.len(), "derived resolver descriptors");
    out
}

fn describe(graph: &TypeGraph, id: ObjectId) -> ResolverDescriptor {
    let object = graph.object(id);
    let implements = object
        .implements
        .iter()
        .map(|interface| Implement {
            interface: interface.clone(),
            type_name: object.name.clone(),
        })
        .collect();

    let fields = object
        .fields
        .iter()
        .map(|(name, field)| {
            let unwrapped = field.return_type.non_null();
            FieldPlan {
                name: name.clone(),
                object: matches!(unwrapped, TypeNode::Object(_)),
                list: matches!(unwrapped, TypeNode::List(_)),
                nullable: field.return_type.is_nullable(),
                has_arguments: !field.arguments.is_empty(),
                response_type: TargetType::of(&field.return_type, graph),
                arguments: field
                    .arguments
                    .iter()
                    .map(|arg| ArgumentPlan {
                        name: arg.name.clone(),
                        ty: TargetType::of(&arg.ty, graph),
                        default_value: arg.default_value.clone(),
                    })
                    .collect(),
            }
        })
        .collect();

    ResolverDescriptor {
        type_name: object.name.clone(),
        is_interface: object.is_interface,
        implements,
        fields,
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
