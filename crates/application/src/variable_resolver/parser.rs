//! Variable parser for `${variable}` syntax
//!
//! Parses strings to extract placeholder references with their positions.
//! A placeholder is `${` followed by one or more characters other than `}`
//! and a closing `}`; the captured name is trimmed of surrounding whitespace.

use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

/// Represents a parsed placeholder in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference {
    /// The variable name, trimmed.
    pub name: String,

    /// Byte range in the original string covering `${...}`.
    pub span: Range<usize>,
}

impl VariableReference {
    /// Creates a new variable reference.
    #[must_use]
    pub fn new(name: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Parses a string and extracts every placeholder, in order of appearance.
///
/// # Examples
///
/// ```
/// use courier_application::variable_resolver::parser::parse_variables;
///
/// let refs = parse_variables("${base}/users/${ id }");
/// assert_eq!(refs.len(), 2);
/// assert_eq!(refs[0].name, "base");
/// assert_eq!(refs[1].name, "id");
/// assert_eq!(refs[1].span, 14..21);
/// ```
#[must_use]
pub fn parse_variables(input: &str) -> Vec<VariableReference> {
    PLACEHOLDER
        .captures_iter(input)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str().trim();
            Some(VariableReference::new(name, whole.range()))
        })
        .collect()
}

/// Extracts the unique variable names from a string, in first-seen order.
#[must_use]
pub fn extract_variable_names(input: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    parse_variables(input)
        .into_iter()
        .filter(|r| seen.insert(r.name.clone()))
        .map(|r| r.name)
        .collect()
}

/// Checks if a string contains any placeholders.
#[must_use]
pub fn has_variables(input: &str) -> bool {
    PLACEHOLDER.is_match(input)
}
