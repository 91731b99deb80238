//! Database repository for CRUD operations.
//!
//! Every write bumps `meta.revision_id`; updates are conditional on the
//! record version so concurrent edits surface as conflicts.

use sqlx::{Row, SqlitePool};

use super::timestamp;
use crate::errors::AppError;
use crate::models::{
    status, ContactSubmission, Course, CreateContactRequest, CreateCourseRequest, RevisionInfo,
    SitePage, UpdateContactRequest, UpdateCourseRequest, UpdatePageRequest,
};

const COURSE_COLUMNS: &str = "id, title, description, duration, level, price, features, icon_name, is_active, created_at, updated_at, version";
const CONTACT_COLUMNS: &str = "id, name, email, phone, message, created_at, status, version";

/// Database repository for all content operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// Increment the revision ID and return the new value.
    pub async fn increment_revision(&self) -> Result<i64, AppError> {
        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(timestamp())
            .execute(&self.pool)
            .await?;
        self.get_revision_id().await
    }

    // ==================== COURSE OPERATIONS ====================

    /// List all courses, newest first.
    pub async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(course_from_row).collect())
    }

    /// List the courses shown on the public site, newest first.
    pub async fn list_active_courses(&self) -> Result<Vec<Course>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE is_active = 1 ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(course_from_row).collect())
    }

    /// Get a course by ID.
    pub async fn get_course(&self, id: &str) -> Result<Option<Course>, AppError> {
        let row = sqlx::query(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(course_from_row))
    }

    pub async fn count_courses(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM courses")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("total"))
    }

    /// Create a new course.
    pub async fn create_course(&self, request: &CreateCourseRequest) -> Result<Course, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp();
        let features_json = request.features.as_ref().map(to_json_array);

        sqlx::query(
            "INSERT INTO courses (id, title, description, duration, level, price, features, icon_name, is_active, created_at, updated_at, version) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1)"
        )
        .bind(&id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.duration)
        .bind(&request.level)
        .bind(&request.price)
        .bind(&features_json)
        .bind(&request.icon_name)
        .bind(request.is_active.map(|b| b as i32))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;

        Ok(Course {
            id,
            title: request.title.clone(),
            description: request.description.clone(),
            duration: request.duration.clone(),
            level: request.level.clone(),
            price: request.price.clone(),
            features: request.features.clone(),
            icon_name: request.icon_name.clone(),
            is_active: request.is_active,
            created_at: now.clone(),
            updated_at: now,
            version: 1,
        })
    }

    /// Update a course with optimistic concurrency control.
    pub async fn update_course(
        &self,
        id: &str,
        request: &UpdateCourseRequest,
    ) -> Result<Course, AppError> {
        let existing = self
            .get_course(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course {} not found", id)))?;

        check_version(request.expected_version, existing.version)?;

        let mut course = existing.clone();
        request.apply_to(&mut course);
        course.updated_at = timestamp();
        course.version = existing.version + 1;
        let features_json = course.features.as_ref().map(to_json_array);

        // Conditional UPDATE with version check to prevent lost updates
        let result = sqlx::query(
            "UPDATE courses SET title = ?, description = ?, duration = ?, level = ?, price = ?, features = ?, icon_name = ?, is_active = ?, updated_at = ?, version = ? WHERE id = ? AND version = ?"
        )
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.duration)
        .bind(&course.level)
        .bind(&course.price)
        .bind(&features_json)
        .bind(&course.icon_name)
        .bind(course.is_active.map(|b| b as i32))
        .bind(&course.updated_at)
        .bind(course.version)
        .bind(id)
        .bind(existing.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = self.get_course(id).await?;
            return Err(concurrent_modification(current.map(|c| c.version)));
        }

        self.increment_revision().await?;
        Ok(course)
    }

    /// Delete a course.
    pub async fn delete_course(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Course {} not found", id)));
        }

        self.increment_revision().await?;
        Ok(())
    }

    // ==================== CONTACT SUBMISSION OPERATIONS ====================

    /// List all submissions, newest first.
    pub async fn list_submissions(&self) -> Result<Vec<ContactSubmission>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contact_submissions ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(submission_from_row).collect())
    }

    pub async fn get_submission(&self, id: &str) -> Result<Option<ContactSubmission>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contact_submissions WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(submission_from_row))
    }

    /// Store a contact-form submission with status `new`.
    pub async fn create_submission(
        &self,
        request: &CreateContactRequest,
    ) -> Result<ContactSubmission, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp();

        sqlx::query(
            "INSERT INTO contact_submissions (id, name, email, phone, message, created_at, status, version) VALUES (?, ?, ?, ?, ?, ?, ?, 1)"
        )
        .bind(&id)
        .bind(request.name.trim())
        .bind(request.email.trim())
        .bind(&request.phone)
        .bind(&request.message)
        .bind(&now)
        .bind(status::NEW)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;

        Ok(ContactSubmission {
            id,
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            phone: request.phone.clone(),
            message: request.message.clone(),
            created_at: now,
            status: Some(status::NEW.to_string()),
            version: 1,
        })
    }

    /// Update a submission (its status) with optimistic concurrency control.
    pub async fn update_submission(
        &self,
        id: &str,
        request: &UpdateContactRequest,
    ) -> Result<ContactSubmission, AppError> {
        let existing = self
            .get_submission(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Submission {} not found", id)))?;

        check_version(request.expected_version, existing.version)?;

        let mut submission = existing.clone();
        request.apply_to(&mut submission);
        submission.version = existing.version + 1;

        let result = sqlx::query(
            "UPDATE contact_submissions SET status = ?, version = ? WHERE id = ? AND version = ?",
        )
        .bind(&submission.status)
        .bind(submission.version)
        .bind(id)
        .bind(existing.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = self.get_submission(id).await?;
            return Err(concurrent_modification(current.map(|s| s.version)));
        }

        self.increment_revision().await?;
        Ok(submission)
    }

    pub async fn delete_submission(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM contact_submissions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Submission {} not found", id)));
        }

        self.increment_revision().await?;
        Ok(())
    }

    /// Count submissions, optionally only those with the given status.
    pub async fn count_submissions(&self, with_status: Option<&str>) -> Result<i64, AppError> {
        let row = match with_status {
            Some(s) => {
                sqlx::query("SELECT COUNT(*) AS total FROM contact_submissions WHERE status = ?")
                    .bind(s)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT COUNT(*) AS total FROM contact_submissions")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(row.get("total"))
    }

    pub async fn count_active_courses(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM courses WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("total"))
    }

    // ==================== PAGE OPERATIONS ====================

    pub async fn list_pages(&self) -> Result<Vec<SitePage>, AppError> {
        let rows =
            sqlx::query("SELECT slug, title, body, updated_at, version FROM site_pages ORDER BY slug")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.iter().map(page_from_row).collect())
    }

    pub async fn get_page(&self, slug: &str) -> Result<Option<SitePage>, AppError> {
        let row =
            sqlx::query("SELECT slug, title, body, updated_at, version FROM site_pages WHERE slug = ?")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.as_ref().map(page_from_row))
    }

    /// Update page copy with optimistic concurrency control.
    pub async fn update_page(
        &self,
        slug: &str,
        request: &UpdatePageRequest,
    ) -> Result<SitePage, AppError> {
        let existing = self
            .get_page(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Page {} not found", slug)))?;

        check_version(request.expected_version, existing.version)?;

        let page = SitePage {
            slug: existing.slug.clone(),
            title: request.title.clone().unwrap_or(existing.title),
            body: request.body.clone().unwrap_or(existing.body),
            updated_at: timestamp(),
            version: existing.version + 1,
        };

        let result = sqlx::query(
            "UPDATE site_pages SET title = ?, body = ?, updated_at = ?, version = ? WHERE slug = ? AND version = ?",
        )
        .bind(&page.title)
        .bind(&page.body)
        .bind(&page.updated_at)
        .bind(page.version)
        .bind(slug)
        .bind(existing.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = self.get_page(slug).await?;
            return Err(concurrent_modification(current.map(|p| p.version)));
        }

        self.increment_revision().await?;
        Ok(page)
    }
}

fn check_version(expected: Option<i64>, current: i64) -> Result<(), AppError> {
    match expected {
        Some(expected) if expected != current => Err(AppError::Conflict {
            message: format!(
                "Version mismatch: expected {}, current {}",
                expected, current
            ),
            current_version: current,
        }),
        _ => Ok(()),
    }
}

fn concurrent_modification(current_version: Option<i64>) -> AppError {
    AppError::Conflict {
        message: "Concurrent modification detected".to_string(),
        current_version: current_version.unwrap_or(0),
    }
}

// Helper functions for row conversion

fn course_from_row(row: &sqlx::sqlite::SqliteRow) -> Course {
    let is_active: Option<i32> = row.get("is_active");
    let features_str: Option<String> = row.get("features");
    Course {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        duration: row.get("duration"),
        level: row.get("level"),
        price: row.get("price"),
        features: features_str.map(|s| parse_json_array(&s)),
        icon_name: row.get("icon_name"),
        is_active: is_active.map(|v| v != 0),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    }
}

fn submission_from_row(row: &sqlx::sqlite::SqliteRow) -> ContactSubmission {
    ContactSubmission {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        message: row.get("message"),
        created_at: row.get("created_at"),
        status: row.get("status"),
        version: row.get("version"),
    }
}

fn page_from_row(row: &sqlx::sqlite::SqliteRow) -> SitePage {
    SitePage {
        slug: row.get("slug"),
        title: row.get("title"),
        body: row.get("body"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    }
}

fn to_json_array(values: &Vec<String>) -> String {
    serde_json::to_string(values).unwrap_or_default()
}

fn parse_json_array(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}
