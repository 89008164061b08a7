use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("invalid version format: {0}")]
    InvalidVersion(String),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unresolvable reference {reference} at {location}")]
    UnresolvableReference { reference: String, location: String },

    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("failed to scan document for references: {0}")]
    Scan(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml_ng::Error,
    },

    #[error("extractByTag is set but targetTag is empty")]
    MissingTargetTag,
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot rename component {from} to {to}: {to} already exists")]
    NameConflict { from: String, to: String },
}

/// A pipeline stage, used to locate failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    NormalizeIdentifiers,
    SplitOperationIds,
    NameVariants,
    SelectOperations,
    AnnotateCache,
    Extract,
    Serialize,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::NormalizeIdentifiers => "normalize-identifiers",
            Self::SplitOperationIds => "split-operation-ids",
            Self::NameVariants => "name-variants",
            Self::SelectOperations => "select-operations",
            Self::AnnotateCache => "annotate-cache",
            Self::Extract => "extract",
            Self::Serialize => "serialize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed pipeline run.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: TransformError,
}

impl PipelineError {
    pub fn new(stage: Stage, source: impl Into<TransformError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}
