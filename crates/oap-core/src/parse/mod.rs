pub mod components;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod refs;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod spec;
pub mod version;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::ParseError;
use operation::HTTP_METHODS;
use spec::OpenApiDocument;

/// Members of an object the typed model does not interpret, kept verbatim.
pub type Extensions = IndexMap<String, Value>;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Byte-order marks of encodings the loader refuses. UTF-32 marks come first
/// since the UTF-16 LE mark is a prefix of the UTF-32 LE one.
const FOREIGN_BOMS: &[(&[u8], &str)] = &[
    (&[0x00, 0x00, 0xFE, 0xFF], "UTF-32BE"),
    (&[0xFF, 0xFE, 0x00, 0x00], "UTF-32LE"),
    (&[0xFE, 0xFF], "UTF-16BE"),
    (&[0xFF, 0xFE], "UTF-16LE"),
];

/// Parse a JSON document from raw bytes, tolerating a leading UTF-8 BOM.
pub fn from_slice(bytes: &[u8]) -> Result<OpenApiDocument, ParseError> {
    for (bom, encoding) in FOREIGN_BOMS {
        if bytes.starts_with(bom) {
            return Err(ParseError::MalformedDocument(format!(
                "unsupported {encoding} byte-order mark"
            )));
        }
    }
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ParseError::MalformedDocument(format!("invalid UTF-8: {e}")))?;
    from_json(text)
}

/// Parse a JSON document.
pub fn from_json(input: &str) -> Result<OpenApiDocument, ParseError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let value: Value = serde_json::from_str(input)?;
    from_value(value)
}

/// Parse a YAML document.
pub fn from_yaml(input: &str) -> Result<OpenApiDocument, ParseError> {
    let value: Value = serde_yaml_ng::from_str(input)?;
    from_value(value)
}

/// Build the typed document from a generic value: lowercase method keys,
/// coerce `info.version`, then deserialize.
pub fn from_value(mut value: Value) -> Result<OpenApiDocument, ParseError> {
    if !value.is_object() {
        return Err(ParseError::MalformedDocument(
            "document root is not an object".to_string(),
        ));
    }
    normalize_method_keys(&mut value)?;
    if let Some(version) = value.pointer_mut("/info/version") {
        coerce_info_version(version)?;
    }
    let doc: OpenApiDocument = serde_json::from_value(value)?;
    validate_version(&doc)?;
    Ok(doc)
}

/// Serialize a document as indented JSON.
pub fn to_json_pretty(doc: &OpenApiDocument) -> Result<String, ParseError> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Coerce `info.version` in place. YAML loads an unquoted `1.2` as a number,
/// which is coerced through its decimal text.
fn coerce_info_version(version: &mut Value) -> Result<(), ParseError> {
    let raw = match version {
        Value::String(raw) => raw.clone(),
        Value::Number(n) => n.to_string(),
        _ => return Ok(()),
    };
    let coerced = version::coerce_version(&raw)?;
    if *version != Value::String(coerced.clone()) {
        log::debug!("coerced info.version {version} to {coerced:?}");
        *version = Value::String(coerced);
    }
    Ok(())
}

fn validate_version(doc: &OpenApiDocument) -> Result<(), ParseError> {
    if !doc.openapi.starts_with("3.") {
        return Err(ParseError::UnsupportedVersion(doc.openapi.clone()));
    }
    Ok(())
}

/// Rewrite `GET`, `Post`, ... path item keys to their lowercase form.
fn normalize_method_keys(value: &mut Value) -> Result<(), ParseError> {
    let Some(Value::Object(paths)) = value.get_mut("paths") else {
        return Ok(());
    };
    for (path, item) in paths.iter_mut() {
        let Value::Object(item) = item else {
            return Err(ParseError::MalformedDocument(format!(
                "path item {path} is not an object"
            )));
        };
        let needs_rewrite = item.keys().any(|key| {
            let lower = key.to_ascii_lowercase();
            lower != *key && HTTP_METHODS.contains(&lower.as_str())
        });
        if !needs_rewrite {
            continue;
        }
        let entries = std::mem::take(item);
        for (key, op) in entries {
            let lower = key.to_ascii_lowercase();
            let key = if HTTP_METHODS.contains(&lower.as_str()) {
                lower
            } else {
                key
            };
            if item.contains_key(&key) {
                return Err(ParseError::MalformedDocument(format!(
                    "path {path} declares method {key} more than once"
                )));
            }
            item.insert(key, op);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal(version: &str) -> Value {
        json!({
            "openapi": "3.0.3",
            "info": {"title": "Test", "version": version},
            "paths": {}
        })
    }

    #[test]
    fn strips_utf8_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(minimal("1.0.0").to_string().as_bytes());
        let doc = from_slice(&bytes).unwrap();
        assert_eq!(doc.info.title, "Test");
    }

    #[test]
    fn rejects_utf16_bom() {
        let bytes = [0xFF, 0xFE, b'{', 0x00, b'}', 0x00];
        let err = from_slice(&bytes).unwrap_err();
        assert!(matches!(err, ParseError::MalformedDocument(_)));
    }

    #[test]
    fn rejects_invalid_json() {
        let err = from_slice(b"{\"openapi\": ").unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn rejects_non_object_root() {
        let err = from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, ParseError::MalformedDocument(_)));
    }

    #[test]
    fn coerces_info_version() {
        let doc = from_value(minimal("1.2")).unwrap();
        assert_eq!(doc.info.version.as_deref(), Some("1.2.0"));
    }

    #[test]
    fn invalid_info_version_fails() {
        let err = from_value(minimal("not-a-version")).unwrap_err();
        assert!(matches!(err, ParseError::InvalidVersion(ref v) if v == "not-a-version"));
    }

    #[test]
    fn missing_info_version_is_allowed() {
        let doc = from_value(json!({
            "openapi": "3.1.0",
            "info": {"title": "Test"},
        }))
        .unwrap();
        assert!(doc.info.version.is_none());
    }

    #[test]
    fn lowercases_method_keys() {
        let doc = from_value(json!({
            "openapi": "3.0.0",
            "info": {"title": "Test", "version": "1"},
            "paths": {
                "/pets": {
                    "GET": {"operationId": "listPets", "responses": {}},
                    "x-owner": "pets-team"
                }
            }
        }))
        .unwrap();
        let item = doc.path("/pets").unwrap();
        assert_eq!(
            item.get.as_ref().and_then(|op| op.operation_id.as_deref()),
            Some("listPets")
        );
        assert_eq!(item.extensions["x-owner"], json!("pets-team"));
    }

    #[test]
    fn duplicate_methods_are_malformed() {
        let err = from_value(json!({
            "openapi": "3.0.0",
            "info": {"title": "Test", "version": "1"},
            "paths": {"/pets": {"get": {}, "GET": {}}}
        }))
        .unwrap_err();
        assert!(matches!(err, ParseError::MalformedDocument(_)));
    }

    #[test]
    fn rejects_swagger_two() {
        let err = from_value(json!({
            "openapi": "2.0",
            "info": {"title": "Test", "version": "1"}
        }))
        .unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedVersion(_)));
    }

    #[test]
    fn yaml_documents_parse() {
        let yaml = r#"
openapi: "3.0.0"
info:
  title: Test
  version: "2.1"
paths: {}
"#;
        let doc = from_yaml(yaml).unwrap();
        assert_eq!(doc.info.version.as_deref(), Some("2.1.0"));
    }

    #[test]
    fn numeric_versions_are_coerced() {
        let yaml = r#"
openapi: "3.0.0"
info:
  title: Test
  version: 1.2
paths: {}
"#;
        let doc = from_yaml(yaml).unwrap();
        assert_eq!(doc.info.version.as_deref(), Some("1.2.0"));

        let doc = from_value(json!({
            "openapi": "3.0.0",
            "info": {"title": "Test", "version": 3}
        }))
        .unwrap();
        assert_eq!(doc.info.version.as_deref(), Some("3.0.0"));
    }

    #[test]
    fn empty_members_survive_a_round_trip() {
        let value = json!({
            "openapi": "3.0.0",
            "info": {"title": "Test", "version": "1.0.0"},
            "paths": {
                "/x": {"get": {"operationId": "X", "tags": [], "parameters": [], "responses": {}}}
            },
            "components": {"schemas": {
                "Empty": {"type": "object", "properties": {}, "required": []}
            }},
            "tags": []
        });
        let doc = from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&doc).unwrap(), value);

        let doc = from_value(json!({
            "openapi": "3.0.0",
            "info": {"title": "Test", "version": "1.0.0"},
            "paths": {}
        }))
        .unwrap();
        assert_eq!(serde_json::to_value(&doc).unwrap()["paths"], json!({}));
    }
}
