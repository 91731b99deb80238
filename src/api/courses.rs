//! Course API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{Course, CreateCourseRequest, UpdateCourseRequest};
use crate::AppState;

/// GET /api/courses - Courses shown on the public site.
pub async fn list_public_courses(State(state): State<AppState>) -> ApiResult<Vec<Course>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_active_courses().await {
        Ok(courses) => success(courses, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/admin/courses - Every course, newest first.
pub async fn list_courses(State(state): State<AppState>) -> ApiResult<Vec<Course>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_courses().await {
        Ok(courses) => success(courses, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/admin/courses/:id
pub async fn get_course(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Course> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_course(&id).await {
        Ok(Some(course)) => success(course, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Course {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/admin/courses - Create a course.
pub async fn create_course(
    State(state): State<AppState>,
    Json(request): Json<CreateCourseRequest>,
) -> ApiResult<Course> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.title.trim().is_empty() {
        return error(
            AppError::Validation("Title is required".to_string()),
            revision_id,
        );
    }

    match state.repo.create_course(&request).await {
        Ok(course) => {
            tracing::info!(course_id = %course.id, "Course created");
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(course, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/admin/courses/:id - Partially update a course.
pub async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateCourseRequest>,
) -> ApiResult<Course> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.update_course(&id, &request).await {
        Ok(course) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(course, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/admin/courses/:id
pub async fn delete_course(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_course(&id).await {
        Ok(()) => {
            tracing::info!(course_id = %id, "Course deleted");
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
