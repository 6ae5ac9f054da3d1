//! Introspected schema → [`TypeGraph`].
//!
//! Named object types are memoized by name in the atom registry. A type is
//! registered *before* its fields are resolved, so a field that points back
//! at a type still under construction finds the entry and stops there. That
//! short-circuit is what makes mutually recursive schemas terminate.
//!
//! Nullability follows GraphQL: everything is nullable unless wrapped in
//! `NON_NULL`, so a `NON_NULL` wrapper simply resolves its inner type with the
//! nullable context switched off.
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::error::{BuildError, BuildResult};
use crate::introspection::{IntrospectedType, TypeKind};
use crate::ir::{
    ArgumentDescriptor, AtomRegistry, FieldDescriptor, ObjectId, ObjectType, TypeGraph, TypeNode,
};

// ------------------------------- Policy ---------------------------------- //

/// Scalars every schema carries; never emitted as roots.
pub const BUILTIN_SCALARS: &[&str] = &["String", "Boolean", "Float", "Int", "ID"];

/// Prefix of introspection-internal types (`__Schema`, `__Type`, ...).
const INTERNAL_PREFIX: &str = "_";

static GRAPHQL_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[_A-Za-z][_0-9A-Za-z]*$").expect("static regex"));

// ------------------------------ Front API --------------------------------- //

/// Build the type graph for a whole schema.
///
/// Types are resolved in input order; anonymous, internal and built-in scalar
/// types are skipped. Each remaining type becomes one (nullable) root. The
/// first error aborts the build.
pub fn parse_types(input: &[IntrospectedType]) -> BuildResult<TypeGraph> {
    let mut tracker = TypeTracker::new(input);
    let mut roots = Vec::new();

    for t in input {
        let Some(name) = t.name.as_deref() else { continue };
        if name.starts_with(INTERNAL_PREFIX) || BUILTIN_SCALARS.contains(&name) {
            continue;
        }
        // all top-level types are nullable in a graphql schema
        roots.push(tracker.resolve(true, t)?);
    }

    let graph = tracker.finish(roots);
    debug!(
        roots = graph.roots.len(),
        objects = graph.objects.len(),
        "type graph built"
    );
    Ok(graph)
}

// ------------------------------ Tracker ----------------------------------- //

/// Call-scoped memoization state for one build.
struct TypeTracker<'s> {
    /// Full definitions by name; field types are bare references into these.
    definitions: IndexMap<&'s str, &'s IntrospectedType>,
    objects: Vec<ObjectType>,
    registry: AtomRegistry,
}

impl<'s> TypeTracker<'s> {
    fn new(input: &'s [IntrospectedType]) -> Self {
        let definitions = input
            .iter()
            .filter_map(|t| t.name.as_deref().map(|n| (n, t)))
            .collect();
        Self { definitions, objects: Vec::new(), registry: AtomRegistry::default() }
    }

    fn finish(self, roots: Vec<TypeNode>) -> TypeGraph {
        TypeGraph { roots, objects: self.objects, registry: self.registry }
    }

    fn resolve(&mut self, nullable: bool, t: &'s IntrospectedType) -> BuildResult<TypeNode> {
        match t.kind {
            TypeKind::NonNull => {
                let inner = t.of_type.as_deref().ok_or(BuildError::MissingWrappedType(t.kind))?;
                self.resolve(false, inner)
            }

            TypeKind::Scalar => {
                let name = type_name(t)?;
                self.registry.intern_scalar(name);
                Ok(boxed(nullable, TypeNode::Scalar(name.to_string())))
            }

            // INPUT_OBJECT only differs from OBJECT in what the source schema
            // allows inside it; structurally they are the same node.
            TypeKind::Object | TypeKind::Interface | TypeKind::InputObject => {
                let name = type_name(t)?;
                if let Some(id) = self.registry.object(name) {
                    return Ok(boxed(nullable, TypeNode::Object(id)));
                }
                let id = self.resolve_object(name, self.definition(t, name)?)?;
                Ok(boxed(nullable, TypeNode::Object(id)))
            }

            TypeKind::List => {
                let inner = t.of_type.as_deref().ok_or(BuildError::MissingWrappedType(t.kind))?;
                let list = TypeNode::List(Box::new(self.resolve(true, inner)?));
                Ok(boxed(nullable, list))
            }

            TypeKind::Enum => {
                let name = type_name(t)?;
                let values = self
                    .definition(t, name)?
                    .enum_values
                    .iter()
                    .flatten()
                    .map(|v| v.name.clone())
                    .collect();
                let node = TypeNode::Enum { name: name.to_string(), values };
                Ok(boxed(nullable, node))
            }

            TypeKind::Union | TypeKind::Unknown => Err(BuildError::UnsupportedTypeKind {
                kind: t.kind,
                name: t.name.clone(),
            }),
        }
    }

    /// First visit of a named object: register, then fill in fields.
    fn resolve_object(&mut self, name: &str, def: &'s IntrospectedType) -> BuildResult<ObjectId> {
        let implements = def
            .interfaces
            .iter()
            .flatten()
            .filter_map(|i| i.name.clone())
            .collect::<Vec<_>>();

        let id = ObjectId(self.objects.len());
        self.objects.push(ObjectType {
            name: name.to_string(),
            is_interface: def.kind == TypeKind::Interface,
            is_input: def.kind == TypeKind::InputObject,
            implements,
            fields: IndexMap::new(),
        });
        self.registry.register_object(name, id);
        debug!(name, kind = ?def.kind, "registered object type");

        let mut fields = IndexMap::new();
        for field in def.fields.iter().flatten() {
            check_name(&field.name)?;
            let mut arguments = Vec::with_capacity(field.args.len());
            for arg in &field.args {
                check_name(&arg.name)?;
                arguments.push(ArgumentDescriptor {
                    name: arg.name.clone(),
                    ty: self.resolve(true, &arg.ty)?,
                    default_value: arg.default_value.clone(),
                });
            }
            let return_type = self.resolve(true, &field.ty)?;
            trace!(object = name, field = %field.name, "resolved field");
            fields.insert(field.name.clone(), FieldDescriptor { return_type, arguments });
        }
        for input in def.input_fields.iter().flatten() {
            check_name(&input.name)?;
            let return_type = self.resolve(true, &input.ty)?;
            let descriptor = FieldDescriptor { return_type, arguments: Vec::new() };
            fields.insert(input.name.clone(), descriptor);
        }

        self.objects[id.0].fields = fields;
        Ok(id)
    }

    /// The full definition behind `t`: `t` itself, or the top-level type of the same name.
    fn definition(&self, t: &'s IntrospectedType, name: &str) -> BuildResult<&'s IntrospectedType> {
        if t.is_definition() {
            return Ok(t);
        }
        self.definitions
            .get(name)
            .copied()
            .filter(|d| d.is_definition())
            .ok_or_else(|| BuildError::UndefinedType(name.to_string()))
    }
}

// ------------------------------- Helpers ---------------------------------- //

fn boxed(nullable: bool, node: TypeNode) -> TypeNode {
    if nullable {
        TypeNode::Nullable(Box::new(node))
    } else {
        node
    }
}

fn type_name(t: &IntrospectedType) -> BuildResult<&str> {
    let name = t.name.as_deref().ok_or(BuildError::AnonymousType(t.kind))?;
    check_name(name)?;
    Ok(name)
}

fn check_name(name: &str) -> BuildResult<()> {
    if GRAPHQL_NAME.is_match(name) {
        Ok(())
    } else {
        Err(BuildError::InvalidName(name.to_string()))
    }
}

// ------------------------------- Tests ------------------------------------ //
