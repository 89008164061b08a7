use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Extensions;

/// A JSON Schema type keyword value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

/// The `type` field can be a single type or an array of types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(SchemaType),
    Multiple(Vec<SchemaType>),
}

/// A reference or inline schema.
///
/// Both forms carry the `x-variant-name` annotation so that reference
/// alternatives of a combinator can be named like inline ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,

        #[serde(rename = "x-variant-name", skip_serializing_if = "Option::is_none")]
        variant_name: Option<String>,

        #[serde(flatten)]
        extensions: Extensions,
    },
    Schema(Box<Schema>),
}

impl SchemaOrRef {
    pub fn ref_path(&self) -> Option<&str> {
        match self {
            Self::Ref { ref_path, .. } => Some(ref_path),
            Self::Schema(_) => None,
        }
    }

    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            Self::Schema(schema) => Some(schema),
            Self::Ref { .. } => None,
        }
    }

    pub fn as_schema_mut(&mut self) -> Option<&mut Schema> {
        match self {
            Self::Schema(schema) => Some(schema),
            Self::Ref { .. } => None,
        }
    }

    pub fn variant_name(&self) -> Option<&str> {
        match self {
            Self::Ref { variant_name, .. } => variant_name.as_deref(),
            Self::Schema(schema) => schema.variant_name.as_deref(),
        }
    }

    pub fn set_variant_name(&mut self, name: String) {
        match self {
            Self::Ref { variant_name, .. } => *variant_name = Some(name),
            Self::Schema(schema) => schema.variant_name = Some(name),
        }
    }

    /// The single non-null primitive type of an inline schema, if any.
    pub fn single_type(&self) -> Option<SchemaType> {
        self.as_schema().and_then(Schema::single_type)
    }
}

/// Discriminator for polymorphic schemas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discriminator {
    #[serde(rename = "propertyName")]
    pub property_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<IndexMap<String, String>>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

/// A JSON Schema object.
///
/// Only the keywords the pipeline reads or rewrites are typed; every other
/// keyword (constraints, examples, `not`, vendor extensions) is carried
/// through `extensions` untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,

    // Object properties
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaOrRef>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,

    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<AdditionalProperties>,

    // Array items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaOrRef>>,

    // Composition
    #[serde(rename = "allOf", skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<SchemaOrRef>>,

    #[serde(rename = "oneOf", skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<SchemaOrRef>>,

    #[serde(rename = "anyOf", skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<SchemaOrRef>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,

    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,

    /// Generator-facing name of this schema when it is a combinator alternative.
    #[serde(rename = "x-variant-name", skip_serializing_if = "Option::is_none")]
    pub variant_name: Option<String>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Schema {
    /// The single non-null type: `"string"` and `["string", "null"]` both
    /// yield `String`; `["string", "integer"]` yields `None`.
    pub fn single_type(&self) -> Option<SchemaType> {
        match self.schema_type.as_ref()? {
            TypeSet::Single(t) => Some(*t),
            TypeSet::Multiple(types) => {
                let mut non_null = types.iter().filter(|t| **t != SchemaType::Null);
                match (non_null.next(), non_null.next()) {
                    (Some(t), None) => Some(*t),
                    _ => None,
                }
            }
        }
    }

    /// The `items` schema when it is inline.
    pub fn inline_items(&self) -> Option<&Schema> {
        self.items.as_deref().and_then(SchemaOrRef::as_schema)
    }

    /// The combinator lists present on this schema, keyed by their keyword,
    /// in traversal order.
    pub fn combinators_mut(&mut self) -> impl Iterator<Item = (&'static str, &mut Vec<SchemaOrRef>)> {
        [
            ("oneOf", &mut self.one_of),
            ("anyOf", &mut self.any_of),
            ("allOf", &mut self.all_of),
        ]
        .into_iter()
        .filter_map(|(keyword, list)| list.as_mut().map(|list| (keyword, list)))
    }

    /// The property named `name`, if this schema declares it.
    pub fn property(&self, name: &str) -> Option<&SchemaOrRef> {
        self.properties.as_ref()?.get(name)
    }
}

/// `additionalProperties` can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<SchemaOrRef>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ref_keeps_variant_name_and_siblings() {
        let value = json!({
            "$ref": "#/components/schemas/Pet",
            "x-variant-name": "Pet",
            "description": "a pet"
        });
        let parsed: SchemaOrRef = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(parsed.ref_path(), Some("#/components/schemas/Pet"));
        assert_eq!(parsed.variant_name(), Some("Pet"));
        assert_eq!(serde_json::to_value(&parsed).unwrap(), value);
    }

    #[test]
    fn unknown_keywords_survive_round_trip() {
        let value = json!({
            "type": "integer",
            "minimum": 1,
            "x-internal": true,
            "example": 3
        });
        let parsed: SchemaOrRef = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(parsed.single_type(), Some(SchemaType::Integer));
        assert_eq!(serde_json::to_value(&parsed).unwrap(), value);
    }

    #[test]
    fn nullable_type_array_has_single_type() {
        let schema: Schema = serde_json::from_value(json!({"type": ["string", "null"]})).unwrap();
        assert_eq!(schema.single_type(), Some(SchemaType::String));

        let schema: Schema =
            serde_json::from_value(json!({"type": ["string", "integer"]})).unwrap();
        assert_eq!(schema.single_type(), None);
    }

    #[test]
    fn empty_collections_are_kept_when_present() {
        let value = json!({
            "type": "object",
            "properties": {},
            "required": [],
            "oneOf": [],
            "enum": []
        });
        let parsed: SchemaOrRef = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&parsed).unwrap(), value);

        let bare: Schema = serde_json::from_value(json!({"type": "object"})).unwrap();
        assert!(bare.properties.is_none());
        assert_eq!(serde_json::to_value(&bare).unwrap(), json!({"type": "object"}));
    }
}
