use crate::parse::operation::Operation;
use crate::parse::spec::OpenApiDocument;

use super::name_normalizer::to_bare_identifier;

/// The two-part decomposition of an operationId.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationIdParts {
    pub group: Option<String>,
    pub sub_operation_id: String,
}

/// Split an operationId on `separator`.
///
/// - `git/commits/getCommit` with `/` → `git` / `commits_getcommit`
/// - `Commits_Get Changes` with `_` → `commits` / `get_changes`
///
/// Any occurrence of the separator splits, even a trailing one (`repos/`
/// gives `repos` and an empty sub-operation-id). Without an occurrence (or
/// without a separator at all) the whole id is the sub-operation-id and the
/// group falls back to `primary_tag`.
pub fn split_operation_id(
    operation_id: &str,
    separator: Option<&str>,
    primary_tag: Option<&str>,
) -> OperationIdParts {
    let split = separator
        .filter(|sep| !sep.is_empty())
        .and_then(|sep| {
            let (group, rest) = operation_id.split_once(sep)?;
            Some((group, rest.split(sep).collect::<Vec<_>>().join("_")))
        });

    match split {
        Some((group, rest)) => OperationIdParts {
            group: Some(to_bare_identifier(group)),
            sub_operation_id: to_bare_identifier(&rest),
        },
        None => OperationIdParts {
            group: primary_tag.map(to_bare_identifier),
            sub_operation_id: to_bare_identifier(operation_id),
        },
    }
}

/// Set `x-group` / `x-sub-operation-id` on every operation that has an
/// operationId. Returns the number of annotated operations.
pub fn annotate_operation_ids(doc: &mut OpenApiDocument, separator: Option<&str>) -> usize {
    let mut annotated = 0;
    for (path, method, op) in doc.operations_mut() {
        if annotate_operation(op, separator) {
            annotated += 1;
        } else {
            log::debug!("{} {path} has no operationId, not annotated", method.to_uppercase());
        }
    }
    annotated
}

fn annotate_operation(op: &mut Operation, separator: Option<&str>) -> bool {
    let Some(id) = op.operation_id.as_deref() else {
        return false;
    };
    let parts = split_operation_id(id, separator, op.primary_tag());
    op.group = parts.group;
    op.sub_operation_id = Some(parts.sub_operation_id);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use serde_json::json;

    #[test]
    fn splits_on_first_separator_and_joins_the_rest() {
        let parts = split_operation_id("git/commits/getCommit", Some("/"), None);
        assert_eq!(parts.group.as_deref(), Some("git"));
        assert_eq!(parts.sub_operation_id, "commits_getcommit");
    }

    #[test]
    fn normalizes_spaces_and_case() {
        let parts = split_operation_id("Commits_Get Changes", Some("_"), None);
        assert_eq!(parts.group.as_deref(), Some("commits"));
        assert_eq!(parts.sub_operation_id, "get_changes");
    }

    #[test]
    fn hyphens_become_underscores() {
        let parts = split_operation_id("repos/get-commit", Some("/"), Some("repos"));
        assert_eq!(parts.group.as_deref(), Some("repos"));
        assert_eq!(parts.sub_operation_id, "get_commit");
    }

    #[test]
    fn falls_back_to_primary_tag() {
        let parts = split_operation_id("createImage", Some("/"), Some("Images"));
        assert_eq!(parts.group.as_deref(), Some("images"));
        assert_eq!(parts.sub_operation_id, "createimage");
    }

    #[test]
    fn no_separator_means_no_split() {
        let parts = split_operation_id("repos/get-commit", None, None);
        assert_eq!(parts.group, None);
        assert_eq!(parts.sub_operation_id, "repos/get_commit");
    }

    #[test]
    fn trailing_separator_still_splits() {
        let parts = split_operation_id("repos/", Some("/"), None);
        assert_eq!(parts.group.as_deref(), Some("repos"));
        assert_eq!(parts.sub_operation_id, "");

        let parts = split_operation_id("Repos/", Some("/"), Some("git"));
        assert_eq!(parts.group.as_deref(), Some("repos"));
        assert_eq!(parts.sub_operation_id, "");
    }

    #[test]
    fn sub_operation_ids_never_keep_the_separator() {
        for id in ["repos/", "repos//list", "a/b/c/", "/leading"] {
            let parts = split_operation_id(id, Some("/"), None);
            assert!(!parts.sub_operation_id.contains('/'), "{id} → {parts:?}");
            assert!(parts.group.is_some(), "{id} → {parts:?}");
        }
    }

    #[test]
    fn annotates_only_operations_with_ids() {
        let mut doc = parse::from_value(json!({
            "openapi": "3.0.0",
            "info": {"title": "T", "version": "1.0.0"},
            "paths": {
                "/repos/{owner}/{repo}/commits/{ref}": {
                    "get": {"operationId": "repos/get-commit", "tags": ["repos"], "responses": {}},
                    "delete": {"responses": {}}
                }
            }
        }))
        .unwrap();

        assert_eq!(annotate_operation_ids(&mut doc, Some("/")), 1);

        let item = doc.path("/repos/{owner}/{repo}/commits/{ref}").unwrap();
        let get = item.get.as_ref().unwrap();
        assert_eq!(get.group.as_deref(), Some("repos"));
        assert_eq!(get.sub_operation_id.as_deref(), Some("get_commit"));
        let delete = item.delete.as_ref().unwrap();
        assert_eq!(delete.group, None);
        assert_eq!(delete.sub_operation_id, None);
    }
}
