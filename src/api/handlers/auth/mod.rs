//! Cookie-carried HS256 tokens: issuance, logout and the verifying middleware.

pub mod cookie;
pub mod middleware;
pub mod state;
pub mod token;

pub use middleware::require_token;
pub use state::{AuthConfig, AuthState, Claims, Environment};
pub use token::{issue_token, logout};
