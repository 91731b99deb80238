//! Editable copy for the public marketing pages.

use serde::{Deserialize, Serialize};

/// Title and body text of one public page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitePage {
    pub slug: String,
    pub title: String,
    pub body: String,
    pub updated_at: String,
    #[serde(default)]
    pub version: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePageRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<i64>,
}

/// Copy the site ships with, keyed by slug.
pub fn default_pages() -> Vec<(&'static str, &'static str, &'static str)> {
    vec![
        (
            "home",
            "Master the Share Market with Professional Coaching",
            "Transform your financial future with our comprehensive share market coaching programs.",
        ),
        (
            "about",
            "About Us",
            "Over 10 years of active trading experience. Trained over 5000 successful students \
             with a comprehensive curriculum for all skill levels and a continuous support and \
             mentorship approach.",
        ),
        (
            "mission",
            "Our Mission",
            "Our mission is to guide people on their journey to becoming financially free through \
             our easy-to-understand share market coaching programs.",
        ),
        (
            "vision",
            "Our Vision",
            "Our vision is to create a world where every individual has the knowledge and \
             confidence to grow their wealth through the share market.",
        ),
        (
            "courses",
            "Our Courses",
            "Structured programs from beginner basics to advanced pattern trading.",
        ),
        (
            "contact",
            "Contact Us",
            "Have a question about a course? Send us a message and we will get back to you.",
        ),
    ]
}
