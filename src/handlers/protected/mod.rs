// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind `jwt_auth_middleware`, so handlers can rely
// on an `AuthUser` extension being present.

pub mod auth;
pub mod dashboard;
pub mod tenants;
pub mod towers;
