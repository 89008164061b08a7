use serde::{Deserialize, Serialize};

use super::Extensions;
use super::schema::SchemaOrRef;

/// A media type object. `item_schema` is the OpenAPI 3.2 schema of the
/// individual items of a streamed (`text/event-stream`) body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(rename = "itemSchema", skip_serializing_if = "Option::is_none")]
    pub item_schema: Option<SchemaOrRef>,

    /// `example`, `examples` and `encoding` are passed through here.
    #[serde(flatten)]
    pub extensions: Extensions,
}
