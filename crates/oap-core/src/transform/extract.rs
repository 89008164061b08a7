use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::Value;

use crate::config::ExtractOptions;
use crate::error::{ResolveError, TransformError};
use crate::parse::components::Components;
use crate::parse::refs::{ComponentKind, ComponentRef, Location, refs_in_value};
use crate::parse::spec::OpenApiDocument;

use super::select::Selection;

/// Cuts a prepared document down to the selected operations.
pub trait Extractor {
    fn extract(
        &self,
        doc: OpenApiDocument,
        selection: &Selection,
    ) -> Result<OpenApiDocument, TransformError>;
}

/// Keeps the selected operations and every component transitively reachable
/// from them.
#[derive(Debug, Clone, Default)]
pub struct ReachabilityExtractor {
    pub options: ExtractOptions,
}

impl ReachabilityExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }
}

impl Extractor for ReachabilityExtractor {
    fn extract(
        &self,
        mut doc: OpenApiDocument,
        selection: &Selection,
    ) -> Result<OpenApiDocument, TransformError> {
        if let Some(paths) = &mut doc.paths {
            for item in paths.values_mut() {
                item.retain_operations(|op| {
                    op.operation_id
                        .as_deref()
                        .is_some_and(|id| selection.contains(id))
                });
            }
            paths.retain(|_, item| item.has_operations());
        }

        if !self.options.servers {
            doc.servers = None;
        }
        if !self.options.security {
            doc.security = None;
            for (_, _, op) in doc.operations_mut() {
                op.security = None;
            }
        }

        let reached = reachable_components(&doc)?;
        if let Some(components) = &mut doc.components {
            prune(components, &reached, self.options.security);
            if *components == Components::default() {
                doc.components = None;
            }
        }

        let kept = doc.operations().count();
        log::info!(
            "extracted {kept} operations across {} paths, {} components",
            doc.paths.as_ref().map_or(0, IndexMap::len),
            reached.len()
        );
        Ok(doc)
    }
}

/// Every component transitively referenced from the paths.
fn reachable_components(doc: &OpenApiDocument) -> Result<HashSet<ComponentRef>, ResolveError> {
    let paths = serde_json::to_value(&doc.paths)?;
    let mut queue: Vec<ComponentRef> = refs_in_value(&paths, &Location::root().child("paths"))?
        .into_iter()
        .map(|(component, _)| component)
        .collect();

    let mut reached = HashSet::new();
    let Some(components) = &doc.components else {
        return Ok(reached);
    };

    while let Some(component) = queue.pop() {
        if reached.contains(&component) {
            continue;
        }
        if let Some(value) = component_value(components, &component)? {
            let location = Location::root()
                .child("components")
                .child(component.kind.section())
                .child(&component.name);
            queue.extend(
                refs_in_value(&value, &location)?
                    .into_iter()
                    .map(|(target, _)| target),
            );
        }
        reached.insert(component);
    }
    Ok(reached)
}

fn component_value(
    components: &Components,
    component: &ComponentRef,
) -> Result<Option<Value>, serde_json::Error> {
    fn lookup<T: serde::Serialize>(
        section: &Option<IndexMap<String, T>>,
        name: &str,
    ) -> Option<Result<Value, serde_json::Error>> {
        section.as_ref()?.get(name).map(serde_json::to_value)
    }

    let name = component.name.as_str();
    let value = match component.kind {
        ComponentKind::Schemas => lookup(&components.schemas, name),
        ComponentKind::Parameters => lookup(&components.parameters, name),
        ComponentKind::RequestBodies => lookup(&components.request_bodies, name),
        ComponentKind::Responses => lookup(&components.responses, name),
        ComponentKind::Headers => lookup(&components.headers, name),
        ComponentKind::SecuritySchemes => lookup(&components.security_schemes, name),
        kind => components
            .raw_section(kind.section())
            .and_then(|section| section.get(name))
            .cloned()
            .map(Ok),
    };
    value.transpose()
}

/// Keep the reached entries of a section; a section emptied by pruning is
/// dropped, one that was already empty stays as it was.
fn retain_section<T>(
    section: &mut Option<IndexMap<String, T>>,
    mut keep: impl FnMut(&str) -> bool,
) {
    let Some(entries) = section else {
        return;
    };
    let before = entries.len();
    entries.retain(|name, _| keep(name.as_str()));
    if before > 0 && entries.is_empty() {
        *section = None;
    }
}

fn prune(components: &mut Components, reached: &HashSet<ComponentRef>, keep_security: bool) {
    let keep = move |kind: ComponentKind| {
        move |name: &str| reached.contains(&ComponentRef::new(kind, name))
    };
    retain_section(&mut components.schemas, keep(ComponentKind::Schemas));
    retain_section(&mut components.parameters, keep(ComponentKind::Parameters));
    retain_section(&mut components.request_bodies, keep(ComponentKind::RequestBodies));
    retain_section(&mut components.responses, keep(ComponentKind::Responses));
    retain_section(&mut components.headers, keep(ComponentKind::Headers));
    if !keep_security {
        components.security_schemes = None;
    }

    for kind in ComponentKind::ALL.into_iter().filter(ComponentKind::is_raw) {
        let section = kind.section();
        let Some(entries) = components.raw_section_mut(section) else {
            continue;
        };
        let before = entries.len();
        entries.retain(|name, _| keep(kind)(name.as_str()));
        if before > 0 && entries.is_empty() {
            components.extensions.shift_remove(section);
        }
    }
}
