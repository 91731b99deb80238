//! Admin login, session and dashboard payloads.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Returned on successful login. The token is the only credential the client keeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub expires_at: String,
}

/// A live admin session as seen by the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub username: String,
    pub created_at: String,
    pub expires_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Dashboard overview counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overview {
    pub total_courses: i64,
    pub active_courses: i64,
    pub total_submissions: i64,
    pub new_submissions: i64,
    pub session_expires_at: String,
}

/// Revision information for change detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub generated_at: String,
}
