//! Infrastructure layer: assignment storage, configuration, and the permission
//! service that ties them to the authorization core.

pub mod config;
pub mod service;
pub mod store;

pub use config::{AuthzConfig, ConfigError};
pub use service::{PermissionService, RoleMatrixView, ServiceError};
pub use store::{AssignmentScope, AssignmentSet, InMemoryPermissionStore, PermissionStore, StoreError};
