//! Contact-form endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{ContactSubmission, CreateContactRequest, UpdateContactRequest};
use crate::AppState;

/// POST /api/contact - Public contact form.
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(request): Json<CreateContactRequest>,
) -> ApiResult<ContactSubmission> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if let Err(message) = request.validate() {
        return error(AppError::Validation(message), revision_id);
    }

    match state.repo.create_submission(&request).await {
        Ok(submission) => {
            tracing::info!(submission_id = %submission.id, "Contact form submitted");
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(submission, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/admin/contact-submissions - All submissions, newest first.
pub async fn list_submissions(State(state): State<AppState>) -> ApiResult<Vec<ContactSubmission>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_submissions().await {
        Ok(submissions) => success(submissions, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/admin/contact-submissions/:id - Set the status.
pub async fn update_submission(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateContactRequest>,
) -> ApiResult<ContactSubmission> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.update_submission(&id, &request).await {
        Ok(submission) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(submission, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/admin/contact-submissions/:id
pub async fn delete_submission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_submission(&id).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
