//! Variable resolution module
//!
//! Provides parsing and resolution of `${variable}` placeholders in strings.
//!
//! # Usage
//!
//! ```
//! use courier_application::variable_resolver::{interpolate, safe_interpolate};
//! use courier_domain::Variables;
//!
//! let mut variables = Variables::new();
//! variables.insert("host".to_string(), "localhost".to_string());
//!
//! assert_eq!(interpolate("http://${host}/api", &variables).unwrap(), "http://localhost/api");
//! assert_eq!(safe_interpolate("${missing}!", &variables, "?"), "?!");
//! ```

pub mod engine;
pub mod parser;

pub use engine::{
    MissingVariableError, Validation, VariableResolver, interpolate, safe_interpolate,
    validate_variables,
};
pub use parser::{VariableReference, extract_variable_names, has_variables, parse_variables};
