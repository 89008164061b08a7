use indexmap::IndexMap;

use crate::parse::Extensions;
use crate::parse::components::Components;
use crate::parse::media_type::MediaType;
use crate::parse::operation::{Operation, PathItem};
use crate::parse::parameter::ParameterOrRef;
use crate::parse::refs::Location;
use crate::parse::request_body::RequestBodyOrRef;
use crate::parse::response::{HeaderOrRef, ResponseOrRef};
use crate::parse::schema::{AdditionalProperties, SchemaOrRef};
use crate::parse::spec::OpenApiDocument;

/// Callbacks invoked by [`walk_document`].
///
/// Every schema node reachable from the paths and the components is passed
/// to `visit_schema` exactly once, parent before children. References are
/// reported but never followed.
pub trait Visitor {
    fn visit_schema(&mut self, _schema: &mut SchemaOrRef, _location: &Location) {}

    /// A `$ref` pointer or a discriminator mapping target.
    fn visit_ref(&mut self, _ref_path: &mut String, _location: &Location) {}

    /// Members the typed model passes through untouched.
    fn visit_extensions(&mut self, _extensions: &mut Extensions, _location: &Location) {}
}

/// Walk the whole document: paths first, then components.
pub fn walk_document(doc: &mut OpenApiDocument, visitor: &mut impl Visitor) {
    let root = Location::root();
    let paths_loc = root.child("paths");
    for (path, item) in doc.paths.iter_mut().flatten() {
        walk_path_item(item, &paths_loc.child(path), visitor);
    }
    if let Some(components) = &mut doc.components {
        walk_components(components, &root.child("components"), visitor);
    }
    visitor.visit_extensions(&mut doc.extensions, &root);
}

fn walk_path_item(item: &mut PathItem, location: &Location, visitor: &mut impl Visitor) {
    if let Some(params) = &mut item.parameters {
        walk_parameters(params, &location.child("parameters"), visitor);
    }
    for (method, op) in item.operations_mut() {
        walk_operation(op, &location.child(method), visitor);
    }
    visitor.visit_extensions(&mut item.extensions, location);
}

fn walk_operation(op: &mut Operation, location: &Location, visitor: &mut impl Visitor) {
    if let Some(params) = &mut op.parameters {
        walk_parameters(params, &location.child("parameters"), visitor);
    }

    if let Some(body) = &mut op.request_body {
        walk_request_body(body, &location.child("requestBody"), visitor);
    }

    let responses_loc = location.child("responses");
    for (status, response) in op.responses.iter_mut().flatten() {
        walk_response(response, &responses_loc.child(status), visitor);
    }

    visitor.visit_extensions(&mut op.extensions, location);
}

fn walk_components(components: &mut Components, location: &Location, visitor: &mut impl Visitor) {
    let schemas_loc = location.child("schemas");
    for (name, schema) in components.schemas.iter_mut().flatten() {
        walk_schema(schema, &schemas_loc.child(name), visitor);
    }

    let params_loc = location.child("parameters");
    for (name, param) in components.parameters.iter_mut().flatten() {
        walk_parameter(param, &params_loc.child(name), visitor);
    }

    let bodies_loc = location.child("requestBodies");
    for (name, body) in components.request_bodies.iter_mut().flatten() {
        walk_request_body(body, &bodies_loc.child(name), visitor);
    }

    let responses_loc = location.child("responses");
    for (name, response) in components.responses.iter_mut().flatten() {
        walk_response(response, &responses_loc.child(name), visitor);
    }

    let headers_loc = location.child("headers");
    for (name, header) in components.headers.iter_mut().flatten() {
        walk_header(header, &headers_loc.child(name), visitor);
    }

    visitor.visit_extensions(&mut components.extensions, location);
}

fn walk_parameters(params: &mut [ParameterOrRef], location: &Location, visitor: &mut impl Visitor) {
    for (i, param) in params.iter_mut().enumerate() {
        walk_parameter(param, &location.child(i), visitor);
    }
}

fn walk_parameter(param: &mut ParameterOrRef, location: &Location, visitor: &mut impl Visitor) {
    match param {
        ParameterOrRef::Ref {
            ref_path,
            extensions,
        } => {
            visitor.visit_ref(ref_path, &location.child("$ref"));
            visitor.visit_extensions(extensions, location);
        }
        ParameterOrRef::Parameter(p) => {
            if let Some(schema) = &mut p.schema {
                walk_schema(schema, &location.child("schema"), visitor);
            }
            walk_content(&mut p.content, &location.child("content"), visitor);
            visitor.visit_extensions(&mut p.extensions, location);
        }
    }
}

fn walk_request_body(body: &mut RequestBodyOrRef, location: &Location, visitor: &mut impl Visitor) {
    match body {
        RequestBodyOrRef::Ref {
            ref_path,
            extensions,
        } => {
            visitor.visit_ref(ref_path, &location.child("$ref"));
            visitor.visit_extensions(extensions, location);
        }
        RequestBodyOrRef::RequestBody(rb) => {
            walk_content(&mut rb.content, &location.child("content"), visitor);
            visitor.visit_extensions(&mut rb.extensions, location);
        }
    }
}

fn walk_response(response: &mut ResponseOrRef, location: &Location, visitor: &mut impl Visitor) {
    match response {
        ResponseOrRef::Ref {
            ref_path,
            extensions,
        } => {
            visitor.visit_ref(ref_path, &location.child("$ref"));
            visitor.visit_extensions(extensions, location);
        }
        ResponseOrRef::Response(r) => {
            walk_content(&mut r.content, &location.child("content"), visitor);
            let headers_loc = location.child("headers");
            for (name, header) in r.headers.iter_mut().flatten() {
                walk_header(header, &headers_loc.child(name), visitor);
            }
            visitor.visit_extensions(&mut r.extensions, location);
        }
    }
}

fn walk_header(header: &mut HeaderOrRef, location: &Location, visitor: &mut impl Visitor) {
    match header {
        HeaderOrRef::Ref {
            ref_path,
            extensions,
        } => {
            visitor.visit_ref(ref_path, &location.child("$ref"));
            visitor.visit_extensions(extensions, location);
        }
        HeaderOrRef::Header(h) => {
            if let Some(schema) = &mut h.schema {
                walk_schema(schema, &location.child("schema"), visitor);
            }
            walk_content(&mut h.content, &location.child("content"), visitor);
            visitor.visit_extensions(&mut h.extensions, location);
        }
    }
}

fn walk_content(
    content: &mut Option<IndexMap<String, MediaType>>,
    location: &Location,
    visitor: &mut impl Visitor,
) {
    for (media_type, mt) in content.iter_mut().flatten() {
        let mt_loc = location.child(media_type);
        if let Some(schema) = &mut mt.schema {
            walk_schema(schema, &mt_loc.child("schema"), visitor);
        }
        if let Some(schema) = &mut mt.item_schema {
            walk_schema(schema, &mt_loc.child("itemSchema"), visitor);
        }
        visitor.visit_extensions(&mut mt.extensions, &mt_loc);
    }
}

/// Visit a schema, then recurse into its combinator alternatives, properties,
/// array items and `additionalProperties`.
pub fn walk_schema(schema: &mut SchemaOrRef, location: &Location, visitor: &mut impl Visitor) {
    visitor.visit_schema(schema, location);

    match schema {
        SchemaOrRef::Ref {
            ref_path,
            extensions,
            ..
        } => {
            visitor.visit_ref(ref_path, &location.child("$ref"));
            visitor.visit_extensions(extensions, location);
        }
        SchemaOrRef::Schema(s) => {
            if let Some(discriminator) = &mut s.discriminator {
                let mapping_loc = location.child("discriminator").child("mapping");
                for (tag, target) in discriminator.mapping.iter_mut().flatten() {
                    visitor.visit_ref(target, &mapping_loc.child(tag));
                }
            }

            for (keyword, alternatives) in s.combinators_mut() {
                let list_loc = location.child(keyword);
                for (i, alt) in alternatives.iter_mut().enumerate() {
                    walk_schema(alt, &list_loc.child(i), visitor);
                }
            }

            let props_loc = location.child("properties");
            for (name, prop) in s.properties.iter_mut().flatten() {
                walk_schema(prop, &props_loc.child(name), visitor);
            }

            if let Some(items) = &mut s.items {
                walk_schema(items, &location.child("items"), visitor);
            }

            if let Some(AdditionalProperties::Schema(extra)) = &mut s.additional_properties {
                walk_schema(extra, &location.child("additionalProperties"), visitor);
            }

            visitor.visit_extensions(&mut s.extensions, location);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder {
        schemas: Vec<String>,
        refs: Vec<String>,
    }

    impl Visitor for Recorder {
        fn visit_schema(&mut self, _schema: &mut SchemaOrRef, location: &Location) {
            self.schemas.push(location.to_string());
        }

        fn visit_ref(&mut self, ref_path: &mut String, _location: &Location) {
            self.refs.push(ref_path.clone());
        }
    }

    #[test]
    fn visits_each_schema_once_in_document_order() {
        let mut doc = parse::from_value(json!({
            "openapi": "3.0.0",
            "info": {"title": "Test", "version": "1.0.0"},
            "paths": {
                "/pets": {
                    "get": {
                        "parameters": [{"name": "limit", "in": "query", "schema": {"type": "integer"}}],
                        "responses": {
                            "200": {
                                "description": "ok",
                                "content": {"application/json": {"schema": {
                                    "type": "array",
                                    "items": {"$ref": "#/components/schemas/Pet"}
                                }}}
                            }
                        }
                    }
                }
            },
            "components": {"schemas": {
                "Pet": {
                    "type": "object",
                    "properties": {
                        "tag": {"oneOf": [{"type": "string"}, {"type": "integer"}]}
                    }
                }
            }}
        }))
        .unwrap();

        let mut recorder = Recorder::default();
        walk_document(&mut doc, &mut recorder);

        assert_eq!(
            recorder.schemas,
            vec![
                "#/paths/~1pets/get/parameters/0/schema",
                "#/paths/~1pets/get/responses/200/content/application~1json/schema",
                "#/paths/~1pets/get/responses/200/content/application~1json/schema/items",
                "#/components/schemas/Pet",
                "#/components/schemas/Pet/properties/tag",
                "#/components/schemas/Pet/properties/tag/oneOf/0",
                "#/components/schemas/Pet/properties/tag/oneOf/1",
            ]
        );
        assert_eq!(recorder.refs, vec!["#/components/schemas/Pet"]);
    }
}
