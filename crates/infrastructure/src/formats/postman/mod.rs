//! Postman Collection v2.1 import and export.

mod mapper;
pub mod types;

pub use mapper::{from_postman, to_postman};
pub use types::PostmanCollection;
