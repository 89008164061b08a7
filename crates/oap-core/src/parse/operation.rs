use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Extensions;
use super::parameter::ParameterOrRef;
use super::request_body::RequestBodyOrRef;
use super::response::ResponseOrRef;

/// A security requirement: map of scheme name → required scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// HTTP methods a path item may hold, in the order operations are visited.
pub const HTTP_METHODS: [&str; 8] = [
    "get", "post", "put", "delete", "patch", "options", "head", "trace",
];

/// Response cache settings attached to an operation as `x-cache`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub enabled: bool,
    pub params: CacheParams,
}

/// How the generated client builds its response cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheParams {
    /// Cache type the generator instantiates.
    pub ty: String,
    /// Expression constructing the cache.
    pub create: String,
    /// Expression turning a request key into a cache key.
    pub convert: String,
    /// Time-to-live in seconds.
    pub time: u64,
}

/// An API operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ParameterOrRef>>,

    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodyOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<IndexMap<String, ResponseOrRef>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,

    #[serde(rename = "x-group", skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(rename = "x-sub-operation-id", skip_serializing_if = "Option::is_none")]
    pub sub_operation_id: Option<String>,

    #[serde(rename = "x-cache", skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheMetadata>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Operation {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().flatten().any(|t| t == tag)
    }

    pub fn primary_tag(&self) -> Option<&str> {
        self.tags.as_ref()?.first().map(String::as_str)
    }
}

/// A path item, containing operations keyed by HTTP method.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ParameterOrRef>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

impl PathItem {
    fn slots(&self) -> [(&'static str, &Option<Operation>); 8] {
        [
            ("get", &self.get),
            ("post", &self.post),
            ("put", &self.put),
            ("delete", &self.delete),
            ("patch", &self.patch),
            ("options", &self.options),
            ("head", &self.head),
            ("trace", &self.trace),
        ]
    }

    fn slots_mut(&mut self) -> [(&'static str, &mut Option<Operation>); 8] {
        [
            ("get", &mut self.get),
            ("post", &mut self.post),
            ("put", &mut self.put),
            ("delete", &mut self.delete),
            ("patch", &mut self.patch),
            ("options", &mut self.options),
            ("head", &mut self.head),
            ("trace", &mut self.trace),
        ]
    }

    /// Present operations with their lowercase method name.
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Operation)> {
        self.slots()
            .into_iter()
            .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
    }

    pub fn operations_mut(&mut self) -> impl Iterator<Item = (&'static str, &mut Operation)> {
        self.slots_mut()
            .into_iter()
            .filter_map(|(method, op)| op.as_mut().map(|op| (method, op)))
    }

    /// Drop every operation for which `keep` returns false.
    pub fn retain_operations(&mut self, mut keep: impl FnMut(&Operation) -> bool) {
        for (_, slot) in self.slots_mut() {
            if slot.as_ref().is_some_and(|op| !keep(op)) {
                *slot = None;
            }
        }
    }

    pub fn has_operations(&self) -> bool {
        self.operations().next().is_some()
    }
}
