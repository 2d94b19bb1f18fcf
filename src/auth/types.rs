// Session and auth wire types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role carried by the backend JWT, gating routes and endpoint access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Etudiant,
    Enseignant,
    Admin,
    Direction,
}

impl Role {
    /// Wire name used by the backend and the token store
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Etudiant => "ETUDIANT",
            Role::Enseignant => "ENSEIGNANT",
            Role::Admin => "ADMIN",
            Role::Direction => "DIRECTION",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "ETUDIANT" => Some(Role::Etudiant),
            "ENSEIGNANT" => Some(Role::Enseignant),
            "ADMIN" => Some(Role::Admin),
            "DIRECTION" => Some(Role::Direction),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete session as returned by the login endpoint.
///
/// Owned by the session manager; the persisted copy lives in the token
/// store. The access token is present iff the session is active.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub role: Role,
    pub username: String,
}

/// In-memory projection of the session, read by the route guard and UI.
/// Always re-derived from the session, never independently mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub role: Role,
    pub username: String,
}

/// POST /auth/login/ request body
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// POST /auth/login/ response
#[derive(Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub role: Role,
    pub username: String,
}

/// POST /auth/refresh/ request body
#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// POST /auth/refresh/ response
#[derive(Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// POST /auth/register/ request body (student self-registration)
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}
