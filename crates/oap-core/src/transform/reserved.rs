use indexmap::IndexMap;
use serde_json::Value;

use crate::config::PrepConfig;
use crate::error::TransformError;
use crate::parse::Extensions;
use crate::parse::refs::{self, ComponentRef, Location};
use crate::parse::schema::{Schema, SchemaOrRef, SchemaType, TypeSet};
use crate::parse::spec::OpenApiDocument;

use super::name_normalizer::reserved_fallback;
use super::walk::{Visitor, walk_document};

/// Identifiers that collide with generator keywords, and what replaces them.
#[derive(Debug, Clone)]
pub struct ReservedNames {
    renames: IndexMap<String, String>,
}

impl Default for ReservedNames {
    fn default() -> Self {
        let mut renames = IndexMap::new();
        renames.insert("model".to_string(), "api_model".to_string());
        renames.insert("Model".to_string(), "ApiModel".to_string());
        Self { renames }
    }
}

impl ReservedNames {
    /// The built-in names plus the extra entries of a run's configuration.
    pub fn from_config(config: &PrepConfig) -> Self {
        let mut names = Self::default();
        for (name, replacement) in &config.reserved_names {
            names = names.with_rename(name, replacement);
        }
        for name in &config.reserved {
            names = names.with_reserved(name);
        }
        names
    }

    /// Reserve `name`, replacing it with `replacement`.
    pub fn with_rename(mut self, name: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.renames.insert(name.into(), replacement.into());
        self
    }

    /// Reserve `name` with a replacement derived from its casing. An explicit
    /// mapping already present wins.
    pub fn with_reserved(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.renames.contains_key(&name) {
            let replacement = reserved_fallback(&name);
            self.renames.insert(name, replacement);
        }
        self
    }

    pub fn replacement(&self, name: &str) -> Option<&str> {
        self.renames.get(name).map(String::as_str)
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.renames.contains_key(name)
    }
}

/// Rename reserved component schemas and property names, then rewire every
/// reference to a renamed component. Returns the component renames applied.
///
/// Renames are planned as a pure old → new mapping before anything is
/// mutated; references are rewritten in a separate traversal afterwards.
pub fn normalize_identifiers(
    doc: &mut OpenApiDocument,
    reserved: &ReservedNames,
) -> Result<IndexMap<String, String>, TransformError> {
    let renames = plan_component_renames(doc, reserved)?;
    apply_component_renames(doc, &renames);

    let mut props = PropertyRenamer {
        reserved,
        conflict: None,
    };
    walk_document(doc, &mut props);
    if let Some(err) = props.conflict {
        return Err(err);
    }

    if !renames.is_empty() {
        walk_document(doc, &mut RefRewriter { renames: &renames });
    }

    refs::check_references(doc)?;
    Ok(renames)
}

fn plan_component_renames(
    doc: &OpenApiDocument,
    reserved: &ReservedNames,
) -> Result<IndexMap<String, String>, TransformError> {
    let Some(schemas) = doc.components.as_ref().and_then(|c| c.schemas.as_ref()) else {
        return Ok(IndexMap::new());
    };

    let mut renames: IndexMap<String, String> = IndexMap::new();
    for name in schemas.keys() {
        let Some(new_name) = reserved.replacement(name) else {
            continue;
        };
        let taken = schemas.contains_key(new_name)
            || renames.values().any(|v| v == new_name);
        if taken {
            return Err(TransformError::NameConflict {
                from: ComponentRef::schema(name).to_string(),
                to: new_name.to_string(),
            });
        }
        renames.insert(name.clone(), new_name.to_string());
    }
    Ok(renames)
}

fn apply_component_renames(doc: &mut OpenApiDocument, renames: &IndexMap<String, String>) {
    if renames.is_empty() {
        return;
    }
    let Some(schemas) = doc.components.as_mut().and_then(|c| c.schemas.as_mut()) else {
        return;
    };

    *schemas = std::mem::take(schemas)
        .into_iter()
        .map(|(name, mut schema)| match renames.get(&name) {
            Some(new_name) => {
                log::debug!("renamed component schema {name} to {new_name}");
                if let Some(s) = schema.as_schema_mut() {
                    impute_renamed_defaults(s);
                }
                (new_name.clone(), schema)
            }
            None => (name, schema),
        })
        .collect();
}

/// A renamed schema is typed as an object; a scalar `default` becomes `{}`.
fn impute_renamed_defaults(schema: &mut Schema) {
    if schema.schema_type.is_none() {
        schema.schema_type = Some(TypeSet::Single(SchemaType::Object));
    }
    let scalar_default = schema
        .default_value
        .as_ref()
        .is_some_and(|d| !matches!(d, Value::Object(_) | Value::Array(_) | Value::Null));
    if scalar_default {
        schema.default_value = Some(Value::Object(serde_json::Map::new()));
    }
}

/// Renames reserved property names at every depth, keeping their position.
/// `required` entries and discriminator property names are renamed wherever
/// they appear, since the property they name may be declared by an `allOf`
/// member elsewhere.
struct PropertyRenamer<'a> {
    reserved: &'a ReservedNames,
    conflict: Option<TransformError>,
}

impl Visitor for PropertyRenamer<'_> {
    fn visit_schema(&mut self, schema: &mut SchemaOrRef, location: &Location) {
        let Some(s) = schema.as_schema_mut() else {
            return;
        };
        let reserved = self.reserved;
        let needs_rename = s.properties.iter().flatten().any(|(k, _)| reserved.is_reserved(k))
            || s.required.iter().flatten().any(|r| reserved.is_reserved(r))
            || s.discriminator
                .as_ref()
                .is_some_and(|d| reserved.is_reserved(&d.property_name));
        if !needs_rename || self.conflict.is_some() {
            return;
        }

        let renamed = |name: &str| reserved.replacement(name).unwrap_or(name).to_string();

        if let Some(props) = &mut s.properties {
            let mut kept = IndexMap::with_capacity(props.len());
            for (name, prop) in std::mem::take(props) {
                let new_name = renamed(name.as_str());
                if kept.contains_key(&new_name) {
                    self.conflict = Some(TransformError::NameConflict {
                        from: location.child("properties").child(&name).to_string(),
                        to: new_name,
                    });
                    return;
                }
                if new_name != name {
                    log::debug!("renamed property {} to {new_name}", location.child(&name));
                }
                kept.insert(new_name, prop);
            }
            *props = kept;
        }

        for required in s.required.iter_mut().flatten() {
            *required = renamed(required.as_str());
        }
        if let Some(discriminator) = &mut s.discriminator {
            discriminator.property_name = renamed(discriminator.property_name.as_str());
        }
    }
}

/// Points references at renamed component schemas.
struct RefRewriter<'a> {
    renames: &'a IndexMap<String, String>,
}

impl RefRewriter<'_> {
    fn rewrite(&self, ref_path: &mut String) {
        let Ok(Some((target, tail))) = ComponentRef::parse_with_tail(ref_path) else {
            return;
        };
        if target.kind != refs::ComponentKind::Schemas {
            return;
        }
        if let Some(new_name) = self.renames.get(&target.name) {
            *ref_path = format!("{}{tail}", ComponentRef::schema(new_name.as_str()));
        }
    }

    fn rewrite_value(&self, value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, member) in map.iter_mut() {
                    match member {
                        Value::String(target) if key == "$ref" => self.rewrite(target),
                        _ => self.rewrite_value(member),
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.rewrite_value(item);
                }
            }
            _ => {}
        }
    }
}

impl Visitor for RefRewriter<'_> {
    fn visit_ref(&mut self, ref_path: &mut String, _location: &Location) {
        self.rewrite(ref_path);
    }

    fn visit_extensions(&mut self, extensions: &mut Extensions, _location: &Location) {
        for value in extensions.values_mut() {
            self.rewrite_value(value);
        }
    }
}
