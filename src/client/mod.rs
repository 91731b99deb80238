//! Admin data layer.
//!
//! A [`ResourceHook`] fronts one record type: it lists the collection through
//! a shared [`QueryCache`], sends updates and deletes to a [`DataSource`],
//! invalidates the cached collection on success and raises exactly one
//! [`Notification`] per mutation. The data source is picked at composition
//! time: [`RemoteClient`] talks to the HTTP backend, [`StaticSource`] serves
//! an in-memory fixture.

mod cache;
mod error;
mod hook;
mod notify;
mod remote;
mod source;

pub use cache::QueryCache;
pub use error::ClientError;
pub use hook::{ContactSubmissionsHook, CoursesHook, ListState, ResourceHook};
pub use notify::{Notification, NotificationLog, Notifier, Severity, TracingNotifier};
pub use remote::RemoteClient;
pub use source::{DataSource, StaticSource};

use serde::{de::DeserializeOwned, Serialize};

use crate::models::{ContactSubmission, Course, UpdateContactRequest, UpdateCourseRequest};

/// A record type managed from the admin dashboard.
pub trait Resource: Clone + Send + Sync + DeserializeOwned + 'static {
    /// Partial set of mutable fields.
    type Patch: Serialize + Send + Sync;

    /// Cache key.
    const KEY: &'static str;
    /// Collection path under the admin API.
    const ADMIN_PATH: &'static str;

    const UPDATED: &'static str;
    const UPDATE_FAILED: &'static str;
    const DELETED: &'static str;
    const DELETE_FAILED: &'static str;

    fn id(&self) -> &str;
    fn created_at(&self) -> &str;
    fn apply(&mut self, patch: &Self::Patch);
}

impl Resource for Course {
    type Patch = UpdateCourseRequest;

    const KEY: &'static str = "courses";
    const ADMIN_PATH: &'static str = "/api/admin/courses";

    const UPDATED: &'static str = "Course updated successfully";
    const UPDATE_FAILED: &'static str = "Failed to update course";
    const DELETED: &'static str = "Course deleted successfully";
    const DELETE_FAILED: &'static str = "Failed to delete course";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> &str {
        &self.created_at
    }

    fn apply(&mut self, patch: &UpdateCourseRequest) {
        patch.apply_to(self);
    }
}

impl Resource for ContactSubmission {
    type Patch = UpdateContactRequest;

    const KEY: &'static str = "contact-submissions";
    const ADMIN_PATH: &'static str = "/api/admin/contact-submissions";

    const UPDATED: &'static str = "Status updated successfully";
    const UPDATE_FAILED: &'static str = "Failed to update status";
    const DELETED: &'static str = "Submission deleted successfully";
    const DELETE_FAILED: &'static str = "Failed to delete submission";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> &str {
        &self.created_at
    }

    fn apply(&mut self, patch: &UpdateContactRequest) {
        patch.apply_to(self);
    }
}
