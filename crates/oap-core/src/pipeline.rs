use indexmap::IndexMap;

use crate::config::PrepConfig;
use crate::error::{PipelineError, Stage};
use crate::parse::{self, spec::OpenApiDocument};
use crate::transform::extract::Extractor;
use crate::transform::{
    ReservedNames, Selection, UnknownShape, annotate_cache, annotate_operation_ids,
    name_variants, normalize_identifiers, select_operations,
};

/// What a run did, for the caller to report.
#[derive(Debug, Clone, Default)]
pub struct PrepReport {
    /// Component schemas renamed away from reserved identifiers, old → new.
    pub renamed: IndexMap<String, String>,
    /// Operations given `x-group` / `x-sub-operation-id`.
    pub split_operations: usize,
    /// Combinator alternatives that fell back to an unknown variant name.
    pub unknown_shapes: Vec<UnknownShape>,
    /// Operations given `x-cache`.
    pub cached_operations: usize,
    pub selection: Selection,
}

/// A prepared document and its report.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub document: OpenApiDocument,
    pub report: PrepReport,
}

/// Run every stage over a parsed document, then hand it to `extractor`.
pub fn prepare(
    mut doc: OpenApiDocument,
    config: &PrepConfig,
    extractor: &dyn Extractor,
) -> Result<Prepared, PipelineError> {
    let mut report = PrepReport::default();

    if doc
        .components
        .as_ref()
        .and_then(|components| components.schemas.as_ref())
        .is_none_or(IndexMap::is_empty)
    {
        log::warn!("document has no component schemas");
    }

    // Phase 1: Rename reserved identifiers and rewire references
    let reserved = ReservedNames::from_config(config);
    report.renamed = normalize_identifiers(&mut doc, &reserved)
        .map_err(|e| PipelineError::new(Stage::NormalizeIdentifiers, e))?;

    // Phase 2: Derive x-group / x-sub-operation-id
    report.split_operations = annotate_operation_ids(&mut doc, config.separator());

    // Phase 3: Name union variants and resolve oneOf collisions
    report.unknown_shapes = name_variants(&mut doc, config.variant_scope);

    // Phase 4: Choose the operations to keep
    report.selection = select_operations(&doc, config)
        .map_err(|e| PipelineError::new(Stage::SelectOperations, e))?;

    // Phase 5: Attach cache metadata
    report.cached_operations = annotate_cache(&mut doc, &config.cache_policy);

    log::info!(
        "renamed {} components, split {} operationIds, {} unknown variants, selected {} operations, cached {}",
        report.renamed.len(),
        report.split_operations,
        report.unknown_shapes.len(),
        report.selection.operation_ids.len(),
        report.cached_operations,
    );

    // Phase 6: Structural extraction
    let document = extractor
        .extract(doc, &report.selection)
        .map_err(|e| PipelineError::new(Stage::Extract, e))?;

    Ok(Prepared { document, report })
}

/// Load raw JSON bytes, prepare them and serialize the result as pretty JSON.
pub fn prepare_bytes(
    bytes: &[u8],
    config: &PrepConfig,
    extractor: &dyn Extractor,
) -> Result<(String, PrepReport), PipelineError> {
    let doc = parse::from_slice(bytes).map_err(|e| PipelineError::new(Stage::Load, e))?;
    let prepared = prepare(doc, config, extractor)?;
    let output = parse::to_json_pretty(&prepared.document)
        .map_err(|e| PipelineError::new(Stage::Serialize, e))?;
    Ok((output, prepared.report))
}
