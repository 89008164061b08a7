use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Extensions;
use super::parameter::ParameterOrRef;
use super::request_body::RequestBodyOrRef;
use super::response::{HeaderOrRef, ResponseOrRef};
use super::schema::SchemaOrRef;

/// Components object holding reusable definitions.
///
/// `examples`, `links`, `callbacks` and `pathItems` are not typed; they stay
/// in `extensions` as raw values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas: Option<IndexMap<String, SchemaOrRef>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<IndexMap<String, ResponseOrRef>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<IndexMap<String, ParameterOrRef>>,

    #[serde(rename = "requestBodies", skip_serializing_if = "Option::is_none")]
    pub request_bodies: Option<IndexMap<String, RequestBodyOrRef>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, HeaderOrRef>>,

    #[serde(rename = "securitySchemes", skip_serializing_if = "Option::is_none")]
    pub security_schemes: Option<IndexMap<String, Value>>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Components {
    /// The component schema named `name`.
    pub fn schema(&self, name: &str) -> Option<&SchemaOrRef> {
        self.schemas.as_ref()?.get(name)
    }

    /// An untyped section such as `examples`, when it is an object.
    pub fn raw_section(&self, section: &str) -> Option<&Map<String, Value>> {
        self.extensions.get(section)?.as_object()
    }

    pub fn raw_section_mut(&mut self, section: &str) -> Option<&mut Map<String, Value>> {
        self.extensions.get_mut(section)?.as_object_mut()
    }
}
