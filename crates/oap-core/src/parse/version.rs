use std::sync::LazyLock;

use regex::Regex;

use crate::error::ParseError;

/// First run of up to three dot-separated numeric components that is not
/// glued to other digits.
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\d])(\d{1,16})(?:\.(\d{1,16}))?(?:\.(\d{1,16}))?(?:$|[^\d])").unwrap()
});

/// Coerce a free-form version string into `major.minor.patch`.
///
/// Missing components default to zero and anything after the numeric core
/// (pre-release tags, build metadata, dates) is dropped:
/// - `1.2` → `1.2.0`
/// - `v2.1.3-beta.1` → `2.1.3`
/// - `2022-08-01` → `2022.0.0`
pub fn coerce_version(raw: &str) -> Result<String, ParseError> {
    let caps = VERSION_RE
        .captures(raw)
        .ok_or_else(|| ParseError::InvalidVersion(raw.to_string()))?;

    let component = |idx: usize| -> Result<u64, ParseError> {
        match caps.get(idx) {
            Some(m) => m
                .as_str()
                .parse()
                .map_err(|_| ParseError::InvalidVersion(raw.to_string())),
            None => Ok(0),
        }
    };

    Ok(format!("{}.{}.{}", component(1)?, component(2)?, component(3)?))
}
