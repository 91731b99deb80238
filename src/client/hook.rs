//! Resource hooks: cached listing plus notifying mutations.

use std::sync::Arc;

use super::{ClientError, DataSource, Notification, Notifier, QueryCache, Resource};
use crate::models::{ContactSubmission, Course, UpdateContactRequest, UpdateCourseRequest};

/// What a list read hands to the rendering layer.
#[derive(Debug)]
pub struct ListState<T> {
    pub items: Vec<T>,
    /// Set when the fetch failed; `items` is then empty.
    pub error: Option<ClientError>,
}

impl<T> ListState<T> {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Fetch, update and delete for one record type.
///
/// Mutations are not coordinated: two in-flight updates to one id race and
/// the backend decides, unless the patch carries an expected version.
pub struct ResourceHook<T: Resource> {
    source: Arc<dyn DataSource<T>>,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
}

pub type CoursesHook = ResourceHook<Course>;
pub type ContactSubmissionsHook = ResourceHook<ContactSubmission>;

impl<T: Resource> Clone for ResourceHook<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            cache: self.cache.clone(),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<T: Resource> ResourceHook<T> {
    pub fn new(
        source: Arc<dyn DataSource<T>>,
        cache: QueryCache,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            source,
            cache,
            notifier,
        }
    }

    /// The collection, newest first.
    ///
    /// Served from the cache while fresh. A fetch that a successful mutation
    /// overtakes is returned but not cached. A failed fetch yields an empty
    /// list with the error attached and leaves the cache as it was.
    pub async fn list(&self) -> ListState<T> {
        if let Some(items) = self.cache.get::<T>(T::KEY) {
            return ListState { items, error: None };
        }

        let generation = self.cache.generation(T::KEY);
        match self.source.list().await {
            Ok(items) => {
                if !self.cache.put(T::KEY, items.clone(), generation) {
                    tracing::debug!(resource = T::KEY, "Discarded fetch overtaken by a mutation");
                }
                ListState { items, error: None }
            }
            Err(e) => {
                tracing::warn!(resource = T::KEY, "Failed to fetch collection: {}", e);
                ListState {
                    items: Vec::new(),
                    error: Some(e),
                }
            }
        }
    }

    /// Send a partial update for `id`.
    pub async fn update(&self, id: &str, patch: &T::Patch) -> Result<T, ClientError> {
        match self.source.update(id, patch).await {
            Ok(row) => {
                self.cache.invalidate(T::KEY);
                self.notifier.notify(Notification::success(T::UPDATED));
                Ok(row)
            }
            Err(e) => {
                self.notifier.notify(Notification::failure(T::UPDATE_FAILED));
                Err(e)
            }
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        match self.source.delete(id).await {
            Ok(()) => {
                self.cache.invalidate(T::KEY);
                self.notifier.notify(Notification::success(T::DELETED));
                Ok(())
            }
            Err(e) => {
                self.notifier.notify(Notification::failure(T::DELETE_FAILED));
                Err(e)
            }
        }
    }
}

impl ResourceHook<Course> {
    pub async fn set_active(&self, id: &str, is_active: bool) -> Result<Course, ClientError> {
        self.update(id, &UpdateCourseRequest::active(is_active)).await
    }
}

impl ResourceHook<ContactSubmission> {
    pub async fn update_status(
        &self,
        id: &str,
        status: &str,
    ) -> Result<ContactSubmission, ClientError> {
        self.update(id, &UpdateContactRequest::status(status)).await
    }
}
