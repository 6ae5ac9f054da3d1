//! Error taxonomy for graph construction, schema loading and field resolution.

use thiserror::Error;

use crate::introspection::TypeKind;

/// Failures while turning introspected types into a [`crate::ir::TypeGraph`].
///
/// Every variant is fatal to the build; no partial graph is handed out.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("unsupported type kind {kind:?} for `{}`", .name.as_deref().unwrap_or("<anonymous>"))]
    UnsupportedTypeKind { kind: TypeKind, name: Option<String> },

    #[error("type `{0}` is referenced but never defined")]
    UndefinedType(String),

    #[error("{0:?} wrapper without an inner type")]
    MissingWrappedType(TypeKind),

    #[error("{0:?} type without a name")]
    AnonymousType(TypeKind),

    #[error("invalid graphql name: {0}")]
    InvalidName(String),
}

/// Failures of a single `resolve_field` call. Scoped to that one field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no such object {0}")]
    UnknownObjectField(String),

    #[error("unimplemented: field `{field}` (object={object}, list={list})")]
    UnimplementedCombination { field: String, object: bool, list: bool },

    #[error("parent entry {0} is not in the resolution record")]
    UnknownParent(usize),

    #[error("parent entry {parent} resolves `{found}`, not the selected-on type `{entity}`")]
    MismatchedParent { parent: usize, entity: String, found: String },
}

/// Failures while reading introspection JSON.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("at JSON path {path} → {message}")]
    Json { path: String, message: String },

    #[error("no `types` array found (expected `data.__schema.types`, `__schema.types` or `types`)")]
    NoSchema,
}

/// Anything that can go wrong between reading a file and holding a graph.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Build(#[from] BuildError),
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;
