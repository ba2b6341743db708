//! Authentication and authorization module

pub mod cookie;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, JwtService, TokenError, TokenKind, TokenPair};
pub use middleware::{auth_gate_middleware, AuthContext, AuthGate};
pub use password::{HashError, HashOptions, PasswordHasher};
