pub mod cache;
pub mod extract;
pub mod name_normalizer;
pub mod operation_ids;
pub mod reserved;
pub mod select;
pub mod variant_names;
pub mod walk;

pub use cache::annotate_cache;
pub use extract::{Extractor, ReachabilityExtractor};
pub use operation_ids::{OperationIdParts, annotate_operation_ids, split_operation_id};
pub use reserved::{ReservedNames, normalize_identifiers};
pub use select::{Selection, select_operations};
pub use variant_names::{UnknownShape, VariantShape, name_variants};
