//! `tollgate-core`: shared primitives for the Tollgate admin backend.
//!
//! Nothing in here knows about HTTP, storage or the permission model itself.

pub mod error;
pub mod id;
pub mod value_object;
pub mod version;

pub use error::{DomainError, DomainResult};
pub use id::UserId;
pub use value_object::ValueObject;
pub use version::ExpectedVersion;
