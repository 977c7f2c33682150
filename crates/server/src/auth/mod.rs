pub mod identity;
pub mod jwt;
pub mod middleware;

pub use identity::CallerIdentity;
pub use jwt::{Claims, JwtVerifier};
pub use middleware::AuthLayer;
