//! Placeholder parsing and rule rewriting.
//!
//! Rules use angle-bracket placeholders, optionally with a single converter
//! qualifier: `<id>` or `<int:id>`. Documentation paths use `{id}`.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::RuleError;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<([^<>]*)>").expect("valid regex"))
}

/// A placeholder parsed from a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Converter qualifier, e.g. `int` in `<int:id>`.
    pub qualifier: Option<&'a str>,
    /// Parameter name.
    pub name: &'a str,
}

fn parse<'a>(rule: &str, inner: &'a str) -> Result<Placeholder<'a>, RuleError> {
    let mut parts = inner.split(':');
    let placeholder = match (parts.next(), parts.next(), parts.next()) {
        (Some(name), None, _) => Placeholder {
            qualifier: None,
            name,
        },
        (Some(qualifier), Some(name), None) => Placeholder {
            qualifier: Some(qualifier),
            name,
        },
        _ => {
            return Err(RuleError::MultipleTypeQualifiers {
                rule: rule.to_string(),
                placeholder: inner.to_string(),
            })
        }
    };

    if placeholder.name.is_empty() {
        return Err(RuleError::invalid(rule, "placeholder without a name"));
    }
    Ok(placeholder)
}

/// Lists the placeholders of `rule` in order.
///
/// # Errors
///
/// Fails on a placeholder with more than one qualifier or without a name.
pub fn placeholders(rule: &str) -> Result<Vec<Placeholder<'_>>, RuleError> {
    placeholder_pattern()
        .find_iter(rule)
        .map(|m| {
            let text = m.as_str();
            parse(rule, &text[1..text.len() - 1])
        })
        .collect()
}

/// Rewrites every placeholder as `open name close`, dropping qualifiers.
fn rewrite(rule: &str, open: char, close: char) -> Result<String, RuleError> {
    let mut out = String::with_capacity(rule.len());
    let mut last = 0;

    for m in placeholder_pattern().find_iter(rule) {
        let text = m.as_str();
        let placeholder = parse(rule, &text[1..text.len() - 1])?;
        out.push_str(&rule[last..m.start()]);
        out.push(open);
        out.push_str(placeholder.name);
        out.push(close);
        last = m.end();
    }
    out.push_str(&rule[last..]);
    Ok(out)
}

/// Validates a native rule and strips converter qualifiers.
///
/// `/users/<int:id>` becomes `/users/<id>`.
///
/// # Errors
///
/// - [`RuleError::InvalidRule`] if the rule does not start with `/` or has an
///   empty placeholder
/// - [`RuleError::MultipleTypeQualifiers`] for placeholders like `<a:b:c>`
pub fn validate_rule(rule: &str) -> Result<String, RuleError> {
    if !rule.starts_with('/') {
        return Err(RuleError::invalid(rule, "rule must start with '/'"));
    }
    rewrite(rule, '<', '>')
}

/// Rewrites a native rule into documentation syntax.
///
/// ```rust
/// use heron_router::to_docs_path;
///
/// assert_eq!(to_docs_path("/items/<int:id>/<name>").unwrap(), "/items/{id}/{name}");
/// ```
///
/// # Errors
///
/// Same placeholder errors as [`validate_rule`].
pub fn to_docs_path(rule: &str) -> Result<String, RuleError> {
    rewrite(rule, '{', '}')
}

/// Reports whether `key` is a path parameter of `path`.
///
/// Qualifiers are ignored, so `<int:id>` and `<id>` both match `id`.
///
/// # Errors
///
/// [`RuleError::AmbiguousPathParameter`] if `key` appears in more than one
/// placeholder, plus the placeholder errors of [`placeholders`].
pub fn check_params_in_path(key: &str, path: &str) -> Result<bool, RuleError> {
    let matches = placeholders(path)?
        .iter()
        .filter(|p| p.name == key)
        .count();

    match matches {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(RuleError::AmbiguousPathParameter {
            key: key.to_string(),
            path: path.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_placeholders() {
        let found = placeholders("/a/<x>/b/<int:y>").unwrap();
        assert_eq!(
            found,
            vec![
                Placeholder {
                    qualifier: None,
                    name: "x"
                },
                Placeholder {
                    qualifier: Some("int"),
                    name: "y"
                },
            ]
        );
        assert!(placeholders("/static/path").unwrap().is_empty());
    }

    #[test]
    fn test_validate_rule_strips_qualifiers() {
        assert_eq!(validate_rule("/users/<int:id>").unwrap(), "/users/<id>");
        assert_eq!(
            validate_rule("/files/<path:rest>/raw").unwrap(),
            "/files/<rest>/raw"
        );
        assert_eq!(validate_rule("/plain").unwrap(), "/plain");
    }

    #[test]
    fn test_validate_rule_rejects_multiple_qualifiers() {
        let err = validate_rule("/users/<int:uuid:id>").unwrap_err();
        assert!(matches!(
            err,
            RuleError::MultipleTypeQualifiers { ref placeholder, .. } if placeholder == "int:uuid:id"
        ));
    }

    #[test]
    fn test_validate_rule_rejects_relative_and_empty() {
        assert!(matches!(
            validate_rule("users/<id>"),
            Err(RuleError::InvalidRule { .. })
        ));
        assert!(matches!(
            validate_rule("/users/<>"),
            Err(RuleError::InvalidRule { .. })
        ));
        assert!(matches!(
            validate_rule("/users/<int:>"),
            Err(RuleError::InvalidRule { .. })
        ));
    }

    #[test]
    fn test_to_docs_path() {
        assert_eq!(to_docs_path("/items/<id>").unwrap(), "/items/{id}");
        assert_eq!(
            to_docs_path("/o/<string:org>/i/<int:id>").unwrap(),
            "/o/{org}/i/{id}"
        );
        assert_eq!(to_docs_path("/").unwrap(), "/");
    }

    #[test]
    fn test_check_params_in_path() {
        assert!(check_params_in_path("id", "/items/<id>").unwrap());
        assert!(check_params_in_path("id", "/items/<int:id>").unwrap());
        assert!(!check_params_in_path("page", "/items/<id>").unwrap());
        // substring names are not placeholders
        assert!(!check_params_in_path("i", "/items/<id>").unwrap());
    }

    #[test]
    fn test_check_params_in_path_ambiguous() {
        let err = check_params_in_path("id", "/items/<id>/sub/<id>").unwrap_err();
        assert_eq!(
            err,
            RuleError::AmbiguousPathParameter {
                key: "id".to_string(),
                path: "/items/<id>/sub/<id>".to_string(),
            }
        );
        // other names in the same rule are unaffected
        assert!(!check_params_in_path("x", "/items/<id>/sub/<id>").unwrap());
    }

    fn segment() -> impl Strategy<Value = (Option<&'static str>, String)> {
        (
            prop::option::of(prop::sample::select(vec!["int", "string", "path", "uuid"])),
            "[a-z][a-z0-9_]{0,8}",
        )
    }

    proptest! {
        #[test]
        fn prop_placeholders_round_trip(
            segments in prop::collection::vec(segment(), 1..5),
            literal in "[a-z]{1,6}",
        ) {
            let mut names: Vec<String> = Vec::new();
            let mut rule = String::new();
            for (i, (qualifier, name)) in segments.iter().enumerate() {
                let name = format!("{name}{i}");
                rule.push('/');
                rule.push_str(&literal);
                match qualifier {
                    Some(q) => rule.push_str(&format!("/<{q}:{name}>")),
                    None => rule.push_str(&format!("/<{name}>")),
                }
                names.push(name);
            }

            let stripped = validate_rule(&rule).unwrap();
            let docs = to_docs_path(&rule).unwrap();
            for name in &names {
                prop_assert!(check_params_in_path(name, &stripped).unwrap());
                let brace = format!("{{{name}}}");
                prop_assert!(docs.contains(&brace));
            }
            prop_assert_eq!(to_docs_path(&stripped).unwrap(), docs);
        }
    }
}
