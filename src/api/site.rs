//! Page copy and revision endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{RevisionInfo, SitePage, UpdatePageRequest};
use crate::AppState;

/// GET /api/revision - Current revision for change detection.
pub async fn get_revision(State(state): State<AppState>) -> ApiResult<RevisionInfo> {
    match state.repo.get_revision_info().await {
        Ok(info) => {
            let revision_id = info.revision_id;
            success(info, revision_id)
        }
        Err(e) => error(e, 0),
    }
}

/// GET /api/pages
pub async fn list_pages(State(state): State<AppState>) -> ApiResult<Vec<SitePage>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_pages().await {
        Ok(pages) => success(pages, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/pages/:slug
pub async fn get_page(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<SitePage> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_page(&slug).await {
        Ok(Some(page)) => success(page, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Page {} not found", slug)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/admin/pages/:slug - Edit page copy.
pub async fn update_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<UpdatePageRequest>,
) -> ApiResult<SitePage> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return error(
            AppError::Validation("Title cannot be empty".to_string()),
            revision_id,
        );
    }

    match state.repo.update_page(&slug, &request).await {
        Ok(page) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(page, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
