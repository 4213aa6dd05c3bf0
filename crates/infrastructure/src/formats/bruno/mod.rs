//! Bruno JSON collection import and export.

mod mapper;
pub mod types;

pub use mapper::{from_bruno, to_bruno};
pub use types::BrunoCollection;
