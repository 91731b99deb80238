//! The data-source seam behind every resource hook.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, SecondsFormat, TimeZone, Utc};

use super::{ClientError, Resource};
use crate::models::{catalogue, Course};

/// List, update and delete for one record type.
#[async_trait]
pub trait DataSource<T: Resource>: Send + Sync {
    /// Full collection, newest first.
    async fn list(&self) -> Result<Vec<T>, ClientError>;
    async fn update(&self, id: &str, patch: &T::Patch) -> Result<T, ClientError>;
    async fn delete(&self, id: &str) -> Result<(), ClientError>;
}

/// In-memory fixture satisfying [`DataSource`].
pub struct StaticSource<T> {
    rows: Mutex<Vec<T>>,
}

impl<T: Resource> StaticSource<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    fn with_rows<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        match self.rows.lock() {
            Ok(mut rows) => f(&mut rows),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl StaticSource<Course> {
    /// The built-in catalogue with fixed ids `course-1`..`course-5`.
    pub fn catalogue() -> Self {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default();
        let courses = catalogue()
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                // Earlier entries are newer so the list keeps catalogue order.
                let created = (base - Duration::days(i as i64))
                    .to_rfc3339_opts(SecondsFormat::Micros, true);
                Course {
                    id: format!("course-{}", i + 1),
                    title: c.title,
                    description: c.description,
                    duration: c.duration,
                    level: c.level,
                    price: c.price,
                    features: c.features,
                    icon_name: c.icon_name,
                    is_active: c.is_active,
                    created_at: created.clone(),
                    updated_at: created,
                    version: 1,
                }
            })
            .collect();
        Self::new(courses)
    }
}

#[async_trait]
impl<T: Resource> DataSource<T> for StaticSource<T> {
    async fn list(&self) -> Result<Vec<T>, ClientError> {
        let mut rows = self.with_rows(|rows| rows.clone());
        rows.sort_by(|a, b| b.created_at().cmp(a.created_at()));
        Ok(rows)
    }

    async fn update(&self, id: &str, patch: &T::Patch) -> Result<T, ClientError> {
        self.with_rows(|rows| -> Result<T, ClientError> {
            let row = rows
                .iter_mut()
                .find(|r| r.id() == id)
                .ok_or_else(|| ClientError::NotFound(id.to_string()))?;
            row.apply(patch);
            Ok(row.clone())
        })
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.with_rows(|rows| {
            let before = rows.len();
            rows.retain(|r| r.id() != id);
            if rows.len() == before {
                Err(ClientError::NotFound(id.to_string()))
            } else {
                Ok(())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UpdateCourseRequest;

    #[tokio::test]
    async fn test_catalogue_lists_in_catalogue_order() {
        let source = StaticSource::catalogue();
        let courses = DataSource::<Course>::list(&source).await.unwrap();
        let titles: Vec<_> = courses.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles[0], "Buy High Sell High - ABCD");
        assert_eq!(titles[4], "50MA & SMC Basics");
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let source = StaticSource::catalogue();
        let err = source
            .update("missing", &UpdateCourseRequest::active(false))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
        let err = DataSource::<Course>::delete(&source, "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
    }
}
