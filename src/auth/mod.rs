//! Admin authentication: credentials, sessions and the request guard.
//!
//! Passwords are stored as argon2id hashes. A successful login issues a
//! random session token; every admin request presents it and the session is
//! re-checked against its window on each request.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use sqlx::{Row, SqlitePool};
use subtle::ConstantTimeEq;

use crate::db::timestamp;
use crate::errors::AppError;
use crate::models::ChangePasswordRequest;
use crate::AppState;

/// Header carrying the session token when no bearer token is sent.
pub const SESSION_HEADER: &str = "x-admin-session";

/// Minimum length accepted for a new admin password.
pub const MIN_PASSWORD_LEN: usize = 6;

const LOGIN_FAILED: &str = "Invalid username or password";

/// A validated admin session, placed in request extensions by the guard.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub session_id: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Result of checking a stored session against the clock.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionCheck {
    Valid,
    Expired,
    Missing,
}

/// A session is valid while `now - login_time <= ttl`.
pub fn session_is_valid(login_time: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    now.signed_duration_since(login_time) <= ttl
}

/// Check the password-change rules that do not need the stored credential.
pub fn validate_new_password(new_password: &str, confirm_password: &str) -> Result<(), AppError> {
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "New password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    if new_password != confirm_password {
        return Err(AppError::Validation(
            "New password and confirmation do not match".to_string(),
        ));
    }
    Ok(())
}

/// Database-backed storage for the admin credential and sessions.
pub struct AdminAuthStore {
    pool: SqlitePool,
    username: String,
    session_ttl: Duration,
}

impl AdminAuthStore {
    /// Fails when `session_ttl_secs` does not fit a chrono duration.
    pub fn new(
        pool: SqlitePool,
        username: impl Into<String>,
        session_ttl_secs: u64,
    ) -> Result<Self, AppError> {
        let session_ttl = i64::try_from(session_ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Session window of {}s is out of range",
                    session_ttl_secs
                ))
            })?;

        Ok(Self {
            pool,
            username: username.into(),
            session_ttl,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Hash a password using Argon2id.
    pub fn hash_password(password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash.
    pub fn verify_password(password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Generate a cryptographically secure session token.
    fn generate_session_id() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(64)
            .map(char::from)
            .collect()
    }

    /// Create the admin account with `initial_password` unless it already exists.
    ///
    /// Returns true when the account was created.
    pub async fn ensure_admin(&self, initial_password: &str) -> Result<bool, AppError> {
        let exists = sqlx::query("SELECT 1 FROM admin_users WHERE username = ?")
            .bind(&self.username)
            .fetch_optional(&self.pool)
            .await?
            .is_some();
        if exists {
            return Ok(false);
        }

        let now = timestamp();
        sqlx::query(
            "INSERT INTO admin_users (username, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&self.username)
        .bind(Self::hash_password(initial_password)?)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(true)
    }

    async fn password_hash(&self) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT password_hash FROM admin_users WHERE username = ?")
            .bind(&self.username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("password_hash")))
    }

    /// Authenticate and create a session.
    ///
    /// Both fields must match exactly; a mismatch in either yields the same
    /// `Unauthorized` error.
    pub async fn login(&self, username: &str, password: &str) -> Result<AdminSession, AppError> {
        let username_ok: bool = username.as_bytes().ct_eq(self.username.as_bytes()).into();
        let password_ok = match self.password_hash().await? {
            Some(hash) => Self::verify_password(password, &hash),
            None => false,
        };

        if !(username_ok && password_ok) {
            tracing::warn!("Rejected admin login attempt");
            return Err(AppError::Unauthorized(LOGIN_FAILED.to_string()));
        }

        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.session_ttl)
            .ok_or_else(|| AppError::Internal("Session expiry out of range".to_string()))?;
        let session = AdminSession {
            session_id: Self::generate_session_id(),
            username: self.username.clone(),
            created_at: now,
            expires_at,
        };

        sqlx::query(
            "INSERT INTO admin_sessions (session_id, username, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&session.session_id)
        .bind(&session.username)
        .bind(format_time(session.created_at))
        .bind(format_time(session.expires_at))
        .execute(&self.pool)
        .await?;

        if let Err(e) = sqlx::query("UPDATE admin_users SET last_login = ? WHERE username = ?")
            .bind(format_time(session.created_at))
            .bind(&self.username)
            .execute(&self.pool)
            .await
        {
            tracing::warn!("Failed to record last login: {}", e);
        }

        tracing::info!(username = %session.username, "Admin logged in");
        Ok(session)
    }

    /// Look up a session and check it against the window at `now`.
    ///
    /// Expired sessions are deleted.
    pub async fn check_session(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(SessionCheck, Option<AdminSession>), AppError> {
        let row = sqlx::query(
            "SELECT session_id, username, created_at, expires_at FROM admin_sessions WHERE session_id = ?",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok((SessionCheck::Missing, None));
        };

        let created_at = parse_time(row.get("created_at"))?;
        let expires_at = parse_time(row.get("expires_at"))?;

        if !session_is_valid(created_at, now, self.session_ttl) {
            self.delete_session(session_id).await?;
            return Ok((SessionCheck::Expired, None));
        }

        Ok((
            SessionCheck::Valid,
            Some(AdminSession {
                session_id: row.get("session_id"),
                username: row.get("username"),
                created_at,
                expires_at,
            }),
        ))
    }

    /// Validate a session token, mapping missing and expired sessions to errors.
    pub async fn validate_session(&self, session_id: &str) -> Result<AdminSession, AppError> {
        match self.check_session(session_id, Utc::now()).await? {
            (SessionCheck::Valid, Some(session)) => Ok(session),
            (SessionCheck::Expired, _) => Err(AppError::SessionExpired),
            _ => Err(AppError::Unauthorized("Invalid session".to_string())),
        }
    }

    /// Delete a session (logout).
    pub async fn delete_session(&self, session_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM admin_sessions WHERE session_id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Change the admin password.
    ///
    /// Sessions other than `keep_session` are revoked.
    pub async fn change_password(
        &self,
        request: &ChangePasswordRequest,
        keep_session: &str,
    ) -> Result<(), AppError> {
        let current_ok = match self.password_hash().await? {
            Some(hash) => Self::verify_password(&request.current_password, &hash),
            None => false,
        };
        if !current_ok {
            return Err(AppError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        validate_new_password(&request.new_password, &request.confirm_password)?;

        sqlx::query("UPDATE admin_users SET password_hash = ?, updated_at = ? WHERE username = ?")
            .bind(Self::hash_password(&request.new_password)?)
            .bind(timestamp())
            .bind(&self.username)
            .execute(&self.pool)
            .await?;

        sqlx::query("DELETE FROM admin_sessions WHERE username = ? AND session_id != ?")
            .bind(&self.username)
            .bind(keep_session)
            .execute(&self.pool)
            .await?;

        tracing::info!(username = %self.username, "Admin password changed");
        Ok(())
    }

    /// Delete all expired sessions (background cleanup task).
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, AppError> {
        let Some(cutoff) = Utc::now().checked_sub_signed(self.session_ttl) else {
            return Ok(0);
        };
        let result = sqlx::query("DELETE FROM admin_sessions WHERE created_at < ?")
            .bind(format_time(cutoff))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_time(raw: String) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Internal(format!("Invalid session timestamp: {}", e)))
}

/// Extract the session token from `Authorization: Bearer` or the session header.
pub fn session_token(request: &Request) -> Option<String> {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "));

    bearer
        .or_else(|| {
            request
                .headers()
                .get(SESSION_HEADER)
                .and_then(|v| v.to_str().ok())
        })
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Guard for admin routes: rejects requests without a live session.
pub async fn session_guard(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = session_token(&request) else {
        return AppError::Unauthorized("Missing session token".to_string()).into_response();
    };

    match state.auth.validate_session(&token).await {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
