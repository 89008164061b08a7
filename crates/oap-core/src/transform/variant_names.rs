use std::collections::{HashMap, HashSet};
use std::fmt;

use indexmap::IndexMap;

use crate::config::VariantScope;
use crate::parse::refs::{ComponentRef, Location};
use crate::parse::schema::{Schema, SchemaOrRef, SchemaType};
use crate::parse::spec::OpenApiDocument;

use super::name_normalizer::{format_qualified, to_type_name};
use super::walk::{Visitor, walk_document};

/// The shape of a combinator alternative, as far as naming is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantShape {
    /// A `$ref` to the named component.
    Reference(String),
    String,
    StringArray,
    IntegerArray,
    /// An array of arrays.
    NestedArray,
    /// An array whose items are none of the above.
    UnknownArray,
    Unknown,
}

impl VariantShape {
    pub fn classify(alternative: &SchemaOrRef) -> Self {
        match alternative {
            SchemaOrRef::Ref { ref_path, .. } => Self::Reference(ref_name(ref_path)),
            SchemaOrRef::Schema(schema) => match schema.single_type() {
                Some(SchemaType::String) => Self::String,
                Some(SchemaType::Array) => {
                    match schema.inline_items().and_then(Schema::single_type) {
                        Some(SchemaType::String) => Self::StringArray,
                        Some(SchemaType::Integer) => Self::IntegerArray,
                        Some(SchemaType::Array) => Self::NestedArray,
                        _ => Self::UnknownArray,
                    }
                }
                _ => Self::Unknown,
            },
        }
    }

    pub fn base_name(&self) -> &str {
        match self {
            Self::Reference(name) => name,
            Self::String => "StringVariant",
            Self::StringArray => "StringArrayVariant",
            Self::IntegerArray => "IntegerArrayVariant",
            Self::NestedArray => "NestedArrayVariant",
            Self::UnknownArray => "UnknownArrayVariant",
            Self::Unknown => "UnknownVariant",
        }
    }

    /// Shapes a human should review before trusting the generated type.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown | Self::UnknownArray)
    }
}

/// Component name of a `$ref`; the last pointer segment for non-component refs.
fn ref_name(ref_path: &str) -> String {
    match ComponentRef::parse(ref_path) {
        Ok(Some(component)) => component.name,
        _ => ref_path.rsplit('/').next().unwrap_or(ref_path).to_string(),
    }
}

/// A combinator alternative whose shape could not be classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownShape {
    pub location: String,
    pub variant_name: String,
}

impl fmt::Display for UnknownShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} named {}", self.location, self.variant_name)
    }
}

/// Occurrence counter per base variant name.
#[derive(Debug, Default)]
pub struct VariantCounter {
    counts: HashMap<String, usize>,
}

impl VariantCounter {
    /// The 1-based occurrence number of `base`, counting this one.
    fn next(&mut self, base: &str) -> usize {
        let count = self.counts.entry(base.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// A name for the next occurrence of `base` that is not in `used`: the
    /// first occurrence is bare, the n-th is suffixed with n.
    fn claim(&mut self, base: &str, used: &mut HashSet<String>) -> String {
        loop {
            let candidate = match self.next(base) {
                1 => base.to_string(),
                n => format!("{base}{n}"),
            };
            if used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

/// Assign a variant name to every combinator alternative in the document,
/// then resolve same-type collisions in `oneOf` lists. Returns the
/// alternatives that fell back to an unknown name.
pub fn name_variants(doc: &mut OpenApiDocument, scope: VariantScope) -> Vec<UnknownShape> {
    let mut namer = VariantNamer {
        scope,
        counter: VariantCounter::default(),
        unknown: Vec::new(),
    };
    walk_document(doc, &mut namer);
    walk_document(doc, &mut OneOfCollisions);

    for shape in &namer.unknown {
        log::warn!("unclassified variant shape at {shape}");
    }
    namer.unknown
}

/// General pass: one name per alternative of every `oneOf`/`anyOf`/`allOf`.
struct VariantNamer {
    scope: VariantScope,
    /// Shared across lists when the scope is the whole document.
    counter: VariantCounter,
    unknown: Vec<UnknownShape>,
}

impl Visitor for VariantNamer {
    fn visit_schema(&mut self, schema: &mut SchemaOrRef, location: &Location) {
        let Some(s) = schema.as_schema_mut() else {
            return;
        };
        for (keyword, alternatives) in s.combinators_mut() {
            if alternatives.is_empty() {
                continue;
            }
            let mut local = VariantCounter::default();
            let counter = match self.scope {
                VariantScope::Combinator => &mut local,
                VariantScope::Document => &mut self.counter,
            };
            let mut used = HashSet::new();
            let list_loc = location.child(keyword);
            for (i, alt) in alternatives.iter_mut().enumerate() {
                let shape = VariantShape::classify(alt);
                let name = counter.claim(shape.base_name(), &mut used);
                if shape.is_unknown() {
                    self.unknown.push(UnknownShape {
                        location: list_loc.child(i).to_string(),
                        variant_name: name.clone(),
                    });
                }
                log::debug!("{} → {name}", list_loc.child(i));
                alt.set_variant_name(name);
            }
        }
    }
}

/// Collision pass: within a `oneOf`, alternatives sharing a primitive type
/// get finer names derived from their shape, overriding the general pass.
struct OneOfCollisions;

impl Visitor for OneOfCollisions {
    fn visit_schema(&mut self, schema: &mut SchemaOrRef, location: &Location) {
        let Some(one_of) = schema.as_schema_mut().and_then(|s| s.one_of.as_mut()) else {
            return;
        };
        if one_of.len() < 2 {
            return;
        }

        let mut by_type: IndexMap<SchemaType, Vec<usize>> = IndexMap::new();
        for (i, alt) in one_of.iter().enumerate() {
            if let Some(t) = alt.single_type() {
                by_type.entry(t).or_default().push(i);
            }
        }

        let mut changed = false;
        for indices in by_type.values().filter(|indices| indices.len() > 1) {
            for &i in indices {
                let Some(name) = one_of[i].as_schema().and_then(collision_name) else {
                    continue;
                };
                if one_of[i].variant_name() != Some(name.as_str()) {
                    one_of[i].set_variant_name(name);
                    changed = true;
                }
            }
        }

        if changed {
            log::debug!("resolved same-type oneOf collisions at {location}");
            disambiguate(one_of);
        }
    }
}

/// The collision-resolving name of an alternative, keyed off finer detail
/// than the general pass: item types of arrays, formats of primitives.
fn collision_name(schema: &Schema) -> Option<String> {
    let format = schema.format.as_deref();
    let name = match schema.single_type()? {
        SchemaType::Array => vector_name(schema),
        SchemaType::String => format_qualified(format, "String"),
        SchemaType::Integer => format_qualified(format, "Integer"),
        SchemaType::Number => format_qualified(format, "Number"),
        SchemaType::Boolean => format_qualified(format, "Boolean"),
        SchemaType::Object => match schema.title.as_deref() {
            Some(title) if !title.is_empty() => format!("{}Object", to_type_name(title)),
            _ => "Object".to_string(),
        },
        SchemaType::Null => return None,
    };
    Some(name)
}

fn vector_name(array: &Schema) -> String {
    let Some(items) = array.items.as_deref() else {
        return "UnknownVector".to_string();
    };
    let items = match items {
        SchemaOrRef::Ref { ref_path, .. } => return format!("{}Vector", ref_name(ref_path)),
        SchemaOrRef::Schema(items) => items,
    };
    match items.single_type() {
        Some(SchemaType::String) => "StringVector".to_string(),
        Some(SchemaType::Integer) => "IntegerVector".to_string(),
        Some(SchemaType::Number) => "NumberVector".to_string(),
        Some(SchemaType::Boolean) => "BooleanVector".to_string(),
        Some(SchemaType::Object) => "ObjectVector".to_string(),
        Some(SchemaType::Array) => match items.inline_items().and_then(Schema::single_type) {
            Some(SchemaType::Integer) => "NestedIntegerVector".to_string(),
            Some(SchemaType::String) => "NestedStringVector".to_string(),
            _ => "NestedVector".to_string(),
        },
        _ => "UnknownVector".to_string(),
    }
}

/// Restore pairwise-distinct names within one list, keeping the first holder
/// of a name and numbering later ones.
fn disambiguate(alternatives: &mut [SchemaOrRef]) {
    let mut used = HashSet::new();
    let mut counter = VariantCounter::default();
    for alt in alternatives.iter_mut() {
        let base = alt.variant_name().unwrap_or("UnknownVariant").to_string();
        let name = counter.claim(&base, &mut used);
        alt.set_variant_name(name);
    }
}
