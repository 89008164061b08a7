use indexmap::IndexMap;

use crate::parse::operation::{CacheMetadata, CacheParams};
use crate::parse::spec::OpenApiDocument;

/// Capacity of the bounded cache each annotated operation gets.
pub const CACHE_CAPACITY: usize = 100;

/// Cache type the downstream client instantiates.
pub const CACHE_TYPE: &str = "SizedCache<String, String>";

impl CacheMetadata {
    /// Metadata for a TTL in seconds. A zero TTL is kept but marked disabled.
    pub fn with_ttl(ttl: u64) -> Self {
        Self {
            enabled: ttl > 0,
            params: CacheParams {
                ty: CACHE_TYPE.to_string(),
                create: format!("{{ SizedCache::with_size({CACHE_CAPACITY}) }}"),
                convert: r#"{ format!("{}", key) }"#.to_string(),
                time: ttl,
            },
        }
    }
}

/// Attach `x-cache` to every operation whose id is in `policy`. Operations
/// absent from the table are left alone. Returns the number annotated.
pub fn annotate_cache(doc: &mut OpenApiDocument, policy: &IndexMap<String, u64>) -> usize {
    if policy.is_empty() {
        return 0;
    }
    let mut annotated = 0;
    for (_, _, op) in doc.operations_mut() {
        let Some(id) = op.operation_id.as_deref() else {
            continue;
        };
        if let Some(&ttl) = policy.get(id) {
            log::debug!("caching {id} for {ttl}s");
            op.cache = Some(CacheMetadata::with_ttl(ttl));
            annotated += 1;
        }
    }
    annotated
}
