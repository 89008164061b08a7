use heck::{ToPascalCase, ToSnakeCase};

/// Turn a fragment of an operationId into a bare lowercase identifier:
/// whitespace and hyphens become underscores.
///
/// - `Get Changes` → `get_changes`
/// - `list-commits` → `list_commits`
/// - `getCommit` → `getcommit`
pub fn to_bare_identifier(fragment: &str) -> String {
    fragment
        .chars()
        .map(|ch| {
            if ch.is_whitespace() || ch == '-' {
                '_'
            } else {
                ch
            }
        })
        .collect::<String>()
        .to_lowercase()
}

/// Replacement for a reserved name that has no explicit mapping, following the
/// casing of the original: `type` → `api_type`, `Type` → `ApiType`.
pub fn reserved_fallback(name: &str) -> String {
    let starts_upper = name.chars().next().is_some_and(char::is_uppercase);
    if starts_upper {
        format!("Api{}", name.to_pascal_case())
    } else {
        format!("api_{}", name.to_snake_case())
    }
}

/// Prefix a variant name with its schema `format`, if any:
/// (`date-time`, `String`) → `DateTimeString`.
pub fn format_qualified(format: Option<&str>, base: &str) -> String {
    match format.map(ToPascalCase::to_pascal_case) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}{base}"),
        _ => base.to_string(),
    }
}

/// PascalCase form of a free-form title, for generator-facing type names.
pub fn to_type_name(title: &str) -> String {
    title.to_pascal_case()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_identifier_replaces_spaces_and_hyphens() {
        assert_eq!(to_bare_identifier("Get Changes"), "get_changes");
        assert_eq!(to_bare_identifier("list-comments-for-commit"), "list_comments_for_commit");
        assert_eq!(to_bare_identifier("Commits"), "commits");
    }

    #[test]
    fn bare_identifier_does_not_split_camel_case() {
        assert_eq!(to_bare_identifier("getCommit"), "getcommit");
    }

    #[test]
    fn bare_identifier_handles_tabs() {
        assert_eq!(to_bare_identifier("a\tb"), "a_b");
    }

    #[test]
    fn fallback_follows_casing() {
        assert_eq!(reserved_fallback("type"), "api_type");
        assert_eq!(reserved_fallback("Type"), "ApiType");
        assert_eq!(reserved_fallback("selfLink"), "api_self_link");
    }

    #[test]
    fn format_prefix() {
        assert_eq!(format_qualified(Some("date-time"), "String"), "DateTimeString");
        assert_eq!(format_qualified(Some("int64"), "Integer"), "Int64Integer");
        assert_eq!(format_qualified(None, "String"), "String");
        assert_eq!(format_qualified(Some(""), "String"), "String");
    }

    #[test]
    fn type_name_from_title() {
        assert_eq!(to_type_name("pet owner"), "PetOwner");
    }
}
