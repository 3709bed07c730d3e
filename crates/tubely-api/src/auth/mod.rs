//! Bearer-token authentication.

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::{issue_access_token, JwtValidator};
pub use middleware::{auth_middleware, AuthState};
pub use models::AuthUser;
