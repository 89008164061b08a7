use std::fmt;

use serde_json::Value;

use super::components::Components;
use super::spec::OpenApiDocument;
use crate::error::ResolveError;

/// A section of the components object that `$ref`s can point into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Schemas,
    Parameters,
    RequestBodies,
    Responses,
    Headers,
    SecuritySchemes,
    Examples,
    Links,
    Callbacks,
    PathItems,
}

impl ComponentKind {
    pub const ALL: [Self; 10] = [
        Self::Schemas,
        Self::Parameters,
        Self::RequestBodies,
        Self::Responses,
        Self::Headers,
        Self::SecuritySchemes,
        Self::Examples,
        Self::Links,
        Self::Callbacks,
        Self::PathItems,
    ];

    pub fn section(&self) -> &'static str {
        match self {
            Self::Schemas => "schemas",
            Self::Parameters => "parameters",
            Self::RequestBodies => "requestBodies",
            Self::Responses => "responses",
            Self::Headers => "headers",
            Self::SecuritySchemes => "securitySchemes",
            Self::Examples => "examples",
            Self::Links => "links",
            Self::Callbacks => "callbacks",
            Self::PathItems => "pathItems",
        }
    }

    fn from_section(section: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.section() == section)
    }

    /// Whether the section is held as raw values in the components'
    /// extensions rather than as a typed map.
    pub fn is_raw(&self) -> bool {
        matches!(
            self,
            Self::Examples | Self::Links | Self::Callbacks | Self::PathItems
        )
    }
}

/// A parsed `#/components/<section>/<name>` pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentRef {
    pub kind: ComponentKind,
    pub name: String,
}

impl ComponentRef {
    pub fn new(kind: ComponentKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    pub fn schema(name: impl Into<String>) -> Self {
        Self::new(ComponentKind::Schemas, name)
    }

    /// Parse a local component pointer. Returns `Ok(None)` for references
    /// outside `#/components/` (external files, other local pointers), which
    /// the pipeline leaves alone. A pointer into a component
    /// (`#/components/schemas/Pet/properties/name`) yields that component.
    pub fn parse(ref_path: &str) -> Result<Option<Self>, ResolveError> {
        Ok(Self::parse_with_tail(ref_path)?.map(|(component, _)| component))
    }

    /// Like [`ComponentRef::parse`], also returning the rest of the pointer
    /// after the component name (empty, or starting with `/`).
    pub fn parse_with_tail(ref_path: &str) -> Result<Option<(Self, &str)>, ResolveError> {
        let Some(stripped) = ref_path.strip_prefix("#/components/") else {
            return Ok(None);
        };
        let invalid = || ResolveError::InvalidRefFormat(ref_path.to_string());
        let (section, rest) = stripped.split_once('/').ok_or_else(invalid)?;
        let kind = ComponentKind::from_section(section).ok_or_else(invalid)?;
        let (name, tail) = match rest.find('/') {
            Some(at) => rest.split_at(at),
            None => (rest, ""),
        };
        if name.is_empty() {
            return Err(invalid());
        }
        Ok(Some((Self::new(kind, unescape(name)), tail)))
    }

    /// Whether the named component exists in `components`.
    pub fn exists_in(&self, components: Option<&Components>) -> bool {
        let Some(c) = components else {
            return false;
        };
        let name = &self.name;
        match self.kind {
            ComponentKind::Schemas => c.schemas.as_ref().is_some_and(|m| m.contains_key(name)),
            ComponentKind::Parameters => {
                c.parameters.as_ref().is_some_and(|m| m.contains_key(name))
            }
            ComponentKind::RequestBodies => {
                c.request_bodies.as_ref().is_some_and(|m| m.contains_key(name))
            }
            ComponentKind::Responses => c.responses.as_ref().is_some_and(|m| m.contains_key(name)),
            ComponentKind::Headers => c.headers.as_ref().is_some_and(|m| m.contains_key(name)),
            ComponentKind::SecuritySchemes => c
                .security_schemes
                .as_ref()
                .is_some_and(|m| m.contains_key(name)),
            kind => c
                .raw_section(kind.section())
                .is_some_and(|m| m.contains_key(name)),
        }
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#/components/{}/{}", self.kind.section(), escape(&self.name))
    }
}

/// A JSON pointer into the document, used to report where something was found.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location(String);

impl Location {
    pub fn root() -> Self {
        Self::default()
    }

    /// The location of a child member or array index.
    pub fn child(&self, segment: impl fmt::Display) -> Self {
        Self(format!("{}/{}", self.0, escape(&segment.to_string())))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Collect every `$ref` string inside a JSON value together with its location.
pub fn collect_value_refs(value: &Value, location: &Location, out: &mut Vec<(String, Location)>) {
    match value {
        Value::Object(map) => {
            for (key, member) in map {
                match (key.as_str(), member) {
                    ("$ref", Value::String(target)) => {
                        out.push((target.clone(), location.child(key)));
                    }
                    _ => collect_value_refs(member, &location.child(key), out),
                }
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                collect_value_refs(item, &location.child(i), out);
            }
        }
        _ => {}
    }
}

/// Every component `$ref` in the document, including discriminator mappings.
pub fn component_refs(
    doc: &OpenApiDocument,
) -> Result<Vec<(ComponentRef, Location)>, ResolveError> {
    let value = serde_json::to_value(doc)?;
    refs_in_value(&value, &Location::root())
}

/// Every component `$ref` and discriminator mapping target inside a JSON value.
pub fn refs_in_value(
    value: &Value,
    location: &Location,
) -> Result<Vec<(ComponentRef, Location)>, ResolveError> {
    let mut raw = Vec::new();
    collect_value_refs(value, location, &mut raw);
    collect_discriminator_refs(value, location, &mut raw);

    let mut refs = Vec::with_capacity(raw.len());
    for (target, location) in raw {
        if let Some(component) = ComponentRef::parse(&target)? {
            refs.push((component, location));
        }
    }
    Ok(refs)
}

/// Verify referential closure: every component `$ref` names an existing component.
pub fn check_references(doc: &OpenApiDocument) -> Result<(), ResolveError> {
    for (component, location) in component_refs(doc)? {
        if !component.exists_in(doc.components.as_ref()) {
            return Err(ResolveError::UnresolvableReference {
                reference: component.to_string(),
                location: location.to_string(),
            });
        }
    }
    Ok(())
}

fn collect_discriminator_refs(value: &Value, location: &Location, out: &mut Vec<(String, Location)>) {
    match value {
        Value::Object(map) => {
            for (key, member) in map {
                let here = location.child(key);
                if key == "discriminator" {
                    if let Some(Value::Object(mapping)) = member.get("mapping") {
                        for (tag, target) in mapping {
                            if let Value::String(target) = target {
                                let at = here.child("mapping").child(tag);
                                out.push((target.clone(), at));
                            }
                        }
                    }
                }
                collect_discriminator_refs(member, &here, out);
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                collect_discriminator_refs(item, &location.child(i), out);
            }
        }
        _ => {}
    }
}
