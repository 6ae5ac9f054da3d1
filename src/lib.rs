//! Introspected GraphQL schema → cycle-safe type graph, resolver descriptors,
//! and a generic resolver that records the path of every field a query visits.
pub mod error;
pub mod introspection;
pub mod ir;
pub mod path_de;
pub mod plan;
pub mod resolve;
pub mod typer;

use std::sync::Arc;

use crate::error::{BuildError, Error};
use crate::introspection::IntrospectedType;
use crate::ir::TypeGraph;
use crate::plan::ResolverDescriptor;
use crate::resolve::ScanResolver;

/// A built graph plus its descriptors. Cheap to clone; sessions share the graph.
#[derive(Debug, Clone)]
pub struct ScannableSchema {
    pub graph: Arc<TypeGraph>,
    pub descriptors: Vec<ResolverDescriptor>,
}

impl ScannableSchema {
    pub fn from_types(types: &[IntrospectedType]) -> Result<Self, BuildError> {
        let graph = typer::parse_types(types)?;
        let descriptors = plan::derive_descriptors(&graph);
        Ok(Self { graph: Arc::new(graph), descriptors })
    }

    pub fn from_introspection_str(src: &str) -> Result<Self, Error> {
        let types = introspection::types_from_str(src)?;
        Ok(Self::from_types(&types)?)
    }

    /// Fresh query session with an empty resolution record.
    pub fn session(&self) -> ScanResolver {
        ScanResolver::new(Arc::clone(&self.graph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{FieldRequest, Resolver};

    const SCHEMA: &str = r#"{
        "data": { "__schema": { "types": [
            { "kind": "OBJECT", "name": "Query", "interfaces": [], "fields": [
                { "name": "apple", "args": [], "type": { "kind": "OBJECT", "name": "Apple", "ofType": null } }
            ] },
            { "kind": "OBJECT", "name": "Apple", "interfaces": [], "fields": [
                { "name": "color", "args": [], "type": { "kind": "SCALAR", "name": "String", "ofType": null } },
                { "name": "neighbour", "args": [], "type": { "kind": "OBJECT", "name": "Apple", "ofType": null } }
            ] },
            { "kind": "SCALAR", "name": "String" },
            { "kind": "OBJECT", "name": "__Schema", "interfaces": [], "fields": [] }
        ] } }
    }"#;

    #[test]
    fn introspection_to_recorded_paths() {
        let schema = ScannableSchema::from_introspection_str(SCHEMA).unwrap();
        assert_eq!(schema.graph.roots.len(), 2);
        assert_eq!(schema.descriptors.len(), 2);

        let session = schema.session();
        for (entity, field) in [("Query", "apple"), ("Apple", "neighbour"), ("Apple", "color")] {
            let request = FieldRequest::from_graph(session.graph(), entity, field).unwrap();
            session.resolve_field(request).unwrap();
        }
        let paths = session.record().paths().map(str::to_string).collect::<Vec<_>>();
        assert_eq!(paths, vec!["apple", "apple.neighbour", "apple.neighbour.color"]);

        // sessions do not share records
        assert!(schema.session().record().is_empty());
    }

    #[test]
    fn build_errors_surface_through_the_front_door() {
        let src = r#"{"types":[{"kind":"UNION","name":"U","possibleTypes":[]}]}"#;
        let err = ScannableSchema::from_introspection_str(src).unwrap_err();
        assert!(matches!(err, Error::Build(BuildError::UnsupportedTypeKind { .. })));
    }
}
