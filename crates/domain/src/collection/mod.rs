//! Collections of saved requests
//!
//! [`model`] holds the persisted data types; [`store`] holds the pure state
//! transitions the host applies to its list of collections.

pub mod model;
pub mod store;

pub use model::{Collection, Request, RequestDraft, RequestUpdate, Variables};
