//! Account endpoints: local sign-up and sign-in, third-party provisioning.

mod dto;
mod handlers;
mod routes;

pub use dto::{AccountResponse, AuthResponse, LoginRequest, RegisterRequest, SyncResponse};
pub use routes::auth_routes;
