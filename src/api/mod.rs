mod auth;
mod error;
mod handlers;
mod server;

pub use auth::{AdminUser, AuthUser};
pub use error::ApiError;
pub use handlers::{DeleteAccountResponse, ListQuery, RegisterRequest};
pub use server::{build_router, serve, AppState};
