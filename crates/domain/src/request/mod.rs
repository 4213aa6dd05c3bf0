//! HTTP Request domain types

mod header;
mod method;
mod spec;

pub use header::RequestHeader;
pub use method::HttpMethod;
pub use spec::RequestSpec;
