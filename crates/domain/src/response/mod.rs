//! HTTP Response domain types

mod spec;

pub use spec::{ResponseSpec, status_text};
