// Public handlers need no authentication; protected handlers run behind
// `jwt_auth_middleware` and receive the caller as an `AuthUser` extension.
pub mod protected;
pub mod public;
