pub mod auth;
pub mod cors;
pub mod guards;
pub mod tenant;

pub use auth::{AuthContext, JwtAuth, OptionalAuth};
pub use cors::create_cors;
pub use guards::{RequireRole, RequireSurface};
pub use tenant::TenantScope;
