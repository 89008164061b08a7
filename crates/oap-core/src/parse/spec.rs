use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Extensions;
use super::components::Components;
use super::operation::{Operation, PathItem, SecurityRequirement};

/// Info object describing the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// `contact`, `license`, `termsOfService` and vendor extensions.
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Tag definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Top-level OpenAPI 3.x document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    pub openapi: String,

    pub info: Info,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<serde_json::Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<IndexMap<String, PathItem>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

impl OpenApiDocument {
    /// Every operation with its path and lowercase method, in document order.
    pub fn operations(&self) -> impl Iterator<Item = (&str, &'static str, &Operation)> {
        self.paths.iter().flatten().flat_map(|(path, item)| {
            item.operations()
                .map(move |(method, op)| (path.as_str(), method, op))
        })
    }

    pub fn operations_mut(&mut self) -> impl Iterator<Item = (&str, &'static str, &mut Operation)> {
        self.paths.iter_mut().flatten().flat_map(|(path, item)| {
            item.operations_mut()
                .map(move |(method, op)| (path.as_str(), method, op))
        })
    }

    /// The path item at `path`.
    pub fn path(&self, path: &str) -> Option<&PathItem> {
        self.paths.as_ref()?.get(path)
    }

    /// Look up an operation by its `operationId`.
    pub fn find_operation(&self, operation_id: &str) -> Option<&Operation> {
        self.operations()
            .map(|(_, _, op)| op)
            .find(|op| op.operation_id.as_deref() == Some(operation_id))
    }
}
