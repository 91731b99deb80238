//! Admin session endpoints and the dashboard overview.

use axum::{extract::State, Extension, Json};

use super::{error, success, ApiResult};
use crate::auth::AdminSession;
use crate::models::{
    status, ChangePasswordRequest, LoginRequest, LoginResponse, Overview, SessionInfo,
};
use crate::AppState;

fn session_info(session: &AdminSession) -> SessionInfo {
    SessionInfo {
        username: session.username.clone(),
        created_at: session.created_at.to_rfc3339(),
        expires_at: session.expires_at.to_rfc3339(),
    }
}

/// POST /api/admin/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.auth.login(&request.username, &request.password).await {
        Ok(session) => success(
            LoginResponse {
                token: session.session_id,
                username: session.username,
                expires_at: session.expires_at.to_rfc3339(),
            },
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/admin/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.auth.delete_session(&session.session_id).await {
        Ok(()) => {
            tracing::info!(username = %session.username, "Admin logged out");
            success((), revision_id)
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/admin/session - The caller's live session.
pub async fn current_session(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
) -> ApiResult<SessionInfo> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    success(session_info(&session), revision_id)
}

/// PUT /api/admin/password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Json(request): Json<ChangePasswordRequest>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state
        .auth
        .change_password(&request, &session.session_id)
        .await
    {
        Ok(()) => success((), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/admin/overview - Dashboard counters.
pub async fn overview(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
) -> ApiResult<Overview> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let counts = async {
        Ok::<_, crate::errors::AppError>(Overview {
            total_courses: state.repo.count_courses().await?,
            active_courses: state.repo.count_active_courses().await?,
            total_submissions: state.repo.count_submissions(None).await?,
            new_submissions: state.repo.count_submissions(Some(status::NEW)).await?,
            session_expires_at: session.expires_at.to_rfc3339(),
        })
    };

    match counts.await {
        Ok(overview) => success(overview, revision_id),
        Err(e) => error(e, revision_id),
    }
}
