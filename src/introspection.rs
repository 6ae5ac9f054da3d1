//! Serde model of GraphQL introspection output.
//!
//! Only the parts the type graph needs are modelled; everything else in the
//! introspection payload (descriptions, deprecation, directives) is ignored.
//! Inside a definition, field and argument types are *references*: they carry
//! `kind`, `name` and `ofType` but no field list of their own.
use serde::Deserialize;
use serde_json::Value;

use crate::error::LoadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectedType {
    pub kind: TypeKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: Option<Vec<IntrospectedField>>,
    #[serde(default)]
    pub input_fields: Option<Vec<InputValue>>,
    #[serde(default)]
    pub interfaces: Option<Vec<IntrospectedType>>,
    #[serde(default)]
    pub enum_values: Option<Vec<EnumValue>>,
    #[serde(default)]
    pub of_type: Option<Box<IntrospectedType>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectedField {
    pub name: String,
    #[serde(default)]
    pub args: Vec<InputValue>,
    #[serde(rename = "type")]
    pub ty: IntrospectedType,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputValue {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: IntrospectedType,
    #[serde(default)]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumValue {
    pub name: String,
}

impl IntrospectedType {
    /// True when this is a full definition rather than a bare reference.
    pub fn is_definition(&self) -> bool {
        self.fields.is_some() || self.input_fields.is_some() || self.enum_values.is_some()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// LOADING
// ————————————————————————————————————————————————————————————————————————————

const TYPES_POINTERS: &[&str] = &["/data/__schema/types", "/__schema/types", "/types"];

/// Locate the `types` array in an introspection document and deserialize it.
///
/// Accepts a full response envelope, a bare `__schema` object, an object with
/// a `types` key, or the array itself.
pub fn types_from_value(mut document: Value) -> Result<Vec<IntrospectedType>, LoadError> {
    let (prefix, types) = if document.is_array() {
        (String::new(), document)
    } else {
        let found = TYPES_POINTERS
            .iter()
            .find_map(|ptr| document.pointer_mut(ptr).map(|v| (ptr.to_string(), v.take())));
        match found {
            Some((ptr, v)) if v.is_array() => (ptr, v),
            _ => return Err(LoadError::NoSchema),
        }
    };
    crate::path_de::from_value_with_path(types).map_err(|error| match error {
        LoadError::Json { path, message } => LoadError::Json {
            path: format!("{prefix}{path}"),
            message,
        },
        other => other,
    })
}

pub fn types_from_str(src: &str) -> Result<Vec<IntrospectedType>, LoadError> {
    let document: Value = crate::path_de::from_str_with_path(src)?;
    types_from_value(document)
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
