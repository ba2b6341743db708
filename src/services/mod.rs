//! Business logic services layer

pub mod auth_service;
pub mod permission_service;

pub use auth_service::AuthService;
pub use permission_service::{PermissionService, ProjectRole};
