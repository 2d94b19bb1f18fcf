// Authentication module
// Token persistence and session lifecycle

mod session;
mod store;
mod types;

pub use session::{SessionManager, SessionState};
pub use store::{PersistedSession, TokenStore};
pub use types::{
    CurrentUser, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterRequest,
    Role, Session,
};
