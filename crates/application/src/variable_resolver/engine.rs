//! Variable resolution engine
//!
//! Substitutes `${variable}` placeholders with values from a collection's
//! variable scope. The strict path fails with every missing name; the
//! permissive path substitutes a default instead.

use std::collections::HashSet;

use courier_domain::{Request, RequestHeader, RequestSpec, Variables};
use thiserror::Error;

use super::parser::{extract_variable_names, parse_variables};

/// One or more placeholders named variables absent from the scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", missing_message(.missing))]
pub struct MissingVariableError {
    /// Missing names, deduplicated, in first-occurrence order.
    pub missing: Vec<String>,
}

fn missing_message(missing: &[String]) -> String {
    let plural = if missing.len() > 1 { "s" } else { "" };
    format!(
        "Variable{plural} '{}' not found in variables object",
        missing.join("', '")
    )
}

/// Result of checking a template against a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    /// Whether every placeholder can be resolved.
    pub valid: bool,
    /// Names that cannot be resolved, in first-seen order.
    pub missing: Vec<String>,
}

fn substitute(template: &str, mut lookup: impl FnMut(&str) -> String) -> String {
    let references = parse_variables(template);
    if references.is_empty() {
        return template.to_string();
    }

    let mut result = String::with_capacity(template.len());
    let mut last_end = 0;
    for var_ref in &references {
        result.push_str(&template[last_end..var_ref.span.start]);
        result.push_str(&lookup(&var_ref.name));
        last_end = var_ref.span.end;
    }
    result.push_str(&template[last_end..]);
    result
}

/// Replaces every placeholder with its value.
///
/// # Errors
///
/// Returns `MissingVariableError` listing every unresolved name when any
/// placeholder names a variable absent from `variables`. Nothing is
/// substituted in that case.
pub fn interpolate(template: &str, variables: &Variables) -> Result<String, MissingVariableError> {
    let validation = validate_variables(template, variables);
    if !validation.valid {
        return Err(MissingVariableError {
            missing: validation.missing,
        });
    }
    Ok(substitute(template, |name| {
        variables.get(name).cloned().unwrap_or_default()
    }))
}

/// Replaces every placeholder, using `default` for names absent from the scope.
#[must_use]
pub fn safe_interpolate(template: &str, variables: &Variables, default: &str) -> String {
    substitute(template, |name| {
        variables
            .get(name)
            .map_or_else(|| default.to_string(), Clone::clone)
    })
}

/// Reports which placeholder names cannot be resolved.
#[must_use]
pub fn validate_variables(template: &str, variables: &Variables) -> Validation {
    let missing: Vec<String> = extract_variable_names(template)
        .into_iter()
        .filter(|name| !variables.contains_key(name))
        .collect();
    Validation {
        valid: missing.is_empty(),
        missing,
    }
}

/// Resolves the placeholders of a saved request against a variable scope.
#[derive(Debug, Clone, Copy)]
pub struct VariableResolver<'a> {
    variables: &'a Variables,
}

impl<'a> VariableResolver<'a> {
    /// Creates a resolver over a collection's variables.
    #[must_use]
    pub const fn new(variables: &'a Variables) -> Self {
        Self { variables }
    }

    /// Resolves a single string strictly.
    ///
    /// # Errors
    ///
    /// Returns `MissingVariableError` when a placeholder cannot be resolved.
    pub fn resolve(&self, input: &str) -> Result<String, MissingVariableError> {
        interpolate(input, self.variables)
    }

    /// Resolves the URL, header names and values, and body of a request.
    ///
    /// Fields are checked together so the error lists every missing name of
    /// the whole request, in order of first appearance (URL, then headers,
    /// then body).
    ///
    /// # Errors
    ///
    /// Returns `MissingVariableError` when any placeholder cannot be resolved.
    pub fn resolve_request(&self, request: &Request) -> Result<RequestSpec, MissingVariableError> {
        let mut seen = HashSet::new();
        let mut missing = Vec::new();
        let fields = std::iter::once(request.url.as_str())
            .chain(
                request
                    .headers
                    .iter()
                    .flat_map(|h| [h.name.as_str(), h.value.as_str()]),
            )
            .chain(std::iter::once(request.body.as_str()));
        for field in fields {
            for name in validate_variables(field, self.variables).missing {
                if seen.insert(name.clone()) {
                    missing.push(name);
                }
            }
        }
        if !missing.is_empty() {
            return Err(MissingVariableError { missing });
        }

        let headers = request
            .headers
            .iter()
            .map(|h| {
                Ok(RequestHeader::new(
                    self.resolve(&h.name)?,
                    self.resolve(&h.value)?,
                ))
            })
            .collect::<Result<Vec<_>, MissingVariableError>>()?;

        Ok(RequestSpec {
            method: request.method,
            url: self.resolve(&request.url)?,
            headers,
            body: self.resolve(&request.body)?,
        })
    }
}
