use indexmap::IndexSet;

use crate::config::{PrepConfig, SelectionMode};
use crate::error::ConfigError;
use crate::parse::spec::OpenApiDocument;

/// The operations to keep, plus what the selection noticed along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Selected operationIds: document order first, then allow-list order.
    pub operation_ids: IndexSet<String>,
    /// Ids both allow-listed and excluded. Exclusion won.
    pub conflicts: Vec<String>,
    /// Allow-listed ids with no matching operation in the document.
    pub missing: Vec<String>,
}

impl Selection {
    pub fn contains(&self, operation_id: &str) -> bool {
        self.operation_ids.contains(operation_id)
    }
}

/// Compute the operation set to keep from the selection mode and the explicit
/// allow-list, minus the exclude-list.
pub fn select_operations(
    doc: &OpenApiDocument,
    config: &PrepConfig,
) -> Result<Selection, ConfigError> {
    let mode = config.selection_mode()?;

    let mut ids: IndexSet<String> = doc
        .operations()
        .filter_map(|(_, _, op)| {
            let id = op.operation_id.as_deref()?;
            let selected = match &mode {
                SelectionMode::All => true,
                SelectionMode::Tag(tag) => op.has_tag(tag),
                SelectionMode::AllowList => false,
            };
            selected.then(|| id.to_string())
        })
        .collect();

    let mut selection = Selection::default();
    for id in &config.operation_ids {
        if doc.find_operation(id).is_none() {
            log::warn!("allow-listed operation {id} not found in document");
            selection.missing.push(id.clone());
        }
        ids.insert(id.clone());
    }

    for id in &config.exclude_operation_ids {
        if config.operation_ids.contains(id) {
            log::warn!("operation {id} is both allow-listed and excluded; excluding");
            selection.conflicts.push(id.clone());
        }
        ids.shift_remove(id);
    }

    selection.operation_ids = ids;
    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use serde_json::json;

    fn doc() -> OpenApiDocument {
        parse::from_value(json!({
            "openapi": "3.0.0",
            "info": {"title": "T", "version": "1.0.0"},
            "paths": {
                "/x": {"get": {"operationId": "X", "tags": ["pulls"], "responses": {}}},
                "/y": {
                    "get": {"operationId": "Y", "tags": ["repos"], "responses": {}},
                    "post": {"tags": ["pulls"], "responses": {}}
                },
                "/z": {"put": {"operationId": "Z", "tags": ["pulls"], "responses": {}}}
            }
        }))
        .unwrap()
    }

    fn ids(selection: &Selection) -> Vec<&str> {
        selection.operation_ids.iter().map(String::as_str).collect()
    }

    #[test]
    fn include_all_minus_exclusions() {
        let config = PrepConfig {
            include_all: true,
            exclude_operation_ids: vec!["X".to_string()],
            ..PrepConfig::default()
        };
        let selection = select_operations(&doc(), &config).unwrap();
        assert_eq!(ids(&selection), vec!["Y", "Z"]);
        assert!(selection.conflicts.is_empty());
    }

    #[test]
    fn allow_list_keeps_its_order() {
        let config = PrepConfig {
            operation_ids: vec!["Z".to_string(), "X".to_string()],
            ..PrepConfig::default()
        };
        let selection = select_operations(&doc(), &config).unwrap();
        assert_eq!(ids(&selection), vec!["Z", "X"]);
    }

    #[test]
    fn tag_mode_unions_with_allow_list() {
        let config = PrepConfig {
            extract_by_tag: true,
            target_tag: "pulls".to_string(),
            operation_ids: vec!["Y".to_string(), "X".to_string()],
            ..PrepConfig::default()
        };
        let selection = select_operations(&doc(), &config).unwrap();
        assert_eq!(ids(&selection), vec!["X", "Z", "Y"]);
    }

    #[test]
    fn exclusion_wins_over_allow_list() {
        let config = PrepConfig {
            operation_ids: vec!["X".to_string(), "Y".to_string()],
            exclude_operation_ids: vec!["X".to_string()],
            ..PrepConfig::default()
        };
        let selection = select_operations(&doc(), &config).unwrap();
        assert_eq!(ids(&selection), vec!["Y"]);
        assert_eq!(selection.conflicts, vec!["X"]);
    }

    #[test]
    fn unknown_allow_listed_ids_are_reported() {
        let config = PrepConfig {
            operation_ids: vec!["W".to_string()],
            ..PrepConfig::default()
        };
        let selection = select_operations(&doc(), &config).unwrap();
        assert_eq!(selection.missing, vec!["W"]);
        assert!(selection.contains("W"));
    }

    #[test]
    fn tag_mode_without_tag_is_an_error() {
        let config = PrepConfig {
            extract_by_tag: true,
            ..PrepConfig::default()
        };
        assert!(matches!(
            select_operations(&doc(), &config),
            Err(ConfigError::MissingTargetTag)
        ));
    }
}
