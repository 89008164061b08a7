use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ConfigError;

/// Per-run pipeline configuration, loaded from `.oap.yaml` (or any YAML/JSON file).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrepConfig {
    /// Explicit allow-list of operationIds.
    pub operation_ids: Vec<String>,
    /// Select every operation in the document.
    pub include_all: bool,
    /// Select every operation carrying `target_tag`.
    pub extract_by_tag: bool,
    pub target_tag: String,
    /// Removed from the final selection regardless of mode.
    pub exclude_operation_ids: Vec<String>,
    /// Splits operationIds into group and sub-operation-id. Absent = no split.
    pub separator: Option<String>,
    /// operationId → TTL in seconds; `0` marks the operation as never cached.
    pub cache_policy: IndexMap<String, u64>,
    pub variant_scope: VariantScope,
    /// Extra `reserved name → replacement` entries.
    pub reserved_names: IndexMap<String, String>,
    /// Extra reserved names whose replacement is derived from the name.
    pub reserved: Vec<String>,
    pub extract: ExtractOptions,
}

/// How operations are chosen before extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionMode {
    /// Only the explicit allow-list.
    AllowList,
    /// Every operation carrying the tag, plus the allow-list.
    Tag(String),
    /// Every operation with an operationId.
    All,
}

impl PrepConfig {
    /// Resolve the selection flags into a single mode. `includeAll` wins
    /// over `extractByTag`.
    pub fn selection_mode(&self) -> Result<SelectionMode, ConfigError> {
        if self.include_all {
            return Ok(SelectionMode::All);
        }
        if self.extract_by_tag {
            if self.target_tag.is_empty() {
                return Err(ConfigError::MissingTargetTag);
            }
            return Ok(SelectionMode::Tag(self.target_tag.clone()));
        }
        Ok(SelectionMode::AllowList)
    }

    /// The separator, treating an empty string as "do not split".
    pub fn separator(&self) -> Option<&str> {
        self.separator.as_deref().filter(|s| !s.is_empty())
    }
}

/// Scope of the occurrence counter used to disambiguate variant names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantScope {
    /// A fresh counter per combinator list: names depend only on the list itself.
    #[default]
    Combinator,
    /// One counter for the whole traversal: a base name is numbered across the
    /// document, in traversal order.
    Document,
}

/// What the structural extraction keeps besides the selected operations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Keep top-level `servers`.
    pub servers: bool,
    /// Keep `security` requirements and `components.securitySchemes`.
    pub security: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            servers: true,
            security: true,
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".oap.yaml";

/// Load config from a YAML or JSON file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<PrepConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let config: PrepConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# oap configuration
# Selection: explicit ids, every operation with a tag, or everything.
operationIds: []
  # - repos/get-commit
includeAll: false
extractByTag: false
targetTag: ""
excludeOperationIds: []

# Split operationIds into x-group / x-sub-operation-id ("/" for repos/get-commit).
# separator: "/"

# operationId → cache TTL in seconds (0 = never cache).
cachePolicy: {}
  # repos/get-commit: 3600

variantScope: combinator   # combinator | document

# Extra reserved identifiers (model/Model are always reserved).
reservedNames: {}
  # Type: ApiType
reserved: []

extract:
  servers: true
  security: true
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PrepConfig::default();
        assert!(config.operation_ids.is_empty());
        assert!(!config.include_all);
        assert_eq!(config.separator(), None);
        assert_eq!(config.variant_scope, VariantScope::Combinator);
        assert!(config.extract.servers);
        assert!(config.extract.security);
        assert_eq!(config.selection_mode().unwrap(), SelectionMode::AllowList);
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
operationIds:
  - repos/get-commit
  - repos/list-commits
excludeOperationIds: [repos/list-commits]
separator: "/"
cachePolicy:
  repos/get-commit: 3600
  repos/create-commit-comment: 0
variantScope: document
reservedNames:
  Type: ApiType
extract:
  servers: false
"#;
        let config: PrepConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.operation_ids.len(), 2);
        assert_eq!(config.exclude_operation_ids, vec!["repos/list-commits"]);
        assert_eq!(config.separator(), Some("/"));
        assert_eq!(config.cache_policy["repos/get-commit"], 3600);
        assert_eq!(config.cache_policy["repos/create-commit-comment"], 0);
        assert_eq!(config.variant_scope, VariantScope::Document);
        assert_eq!(config.reserved_names["Type"], "ApiType");
        assert!(!config.extract.servers);
        // Defaults applied
        assert!(config.extract.security);
    }

    #[test]
    fn test_parse_json_config() {
        let json = r#"{"includeAll": true, "excludeOperationIds": ["createImage"], "separator": null}"#;
        let config: PrepConfig = serde_yaml_ng::from_str(json).unwrap();
        assert_eq!(config.selection_mode().unwrap(), SelectionMode::All);
        assert_eq!(config.separator(), None);
    }

    #[test]
    fn test_tag_mode_requires_tag() {
        let config = PrepConfig {
            extract_by_tag: true,
            ..PrepConfig::default()
        };
        assert!(matches!(
            config.selection_mode(),
            Err(ConfigError::MissingTargetTag)
        ));

        let config = PrepConfig {
            extract_by_tag: true,
            target_tag: "pulls".to_string(),
            ..PrepConfig::default()
        };
        assert_eq!(
            config.selection_mode().unwrap(),
            SelectionMode::Tag("pulls".to_string())
        );
    }

    #[test]
    fn test_empty_separator_disables_split() {
        let config = PrepConfig {
            separator: Some(String::new()),
            ..PrepConfig::default()
        };
        assert_eq!(config.separator(), None);
    }

    #[test]
    fn test_default_content_parses() {
        let config: PrepConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        assert!(config.operation_ids.is_empty());
        assert!(config.cache_policy.is_empty());
    }

    #[test]
    fn test_missing_file_is_none() {
        let loaded = load_config(Path::new("/nonexistent/.oap.yaml")).unwrap();
        assert!(loaded.is_none());
    }
}
