//! Course model matching the `courses` table row shape.

use serde::{Deserialize, Serialize};

/// A course listed on the public site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub level: Option<String>,
    pub price: Option<String>,
    pub features: Option<Vec<String>>,
    pub icon_name: Option<String>,
    /// `None` is displayed as inactive
    pub is_active: Option<bool>,
    pub created_at: String,
    pub updated_at: String,
    /// Internal version for optimistic concurrency control
    #[serde(default)]
    pub version: i64,
}

impl Course {
    pub fn is_listed(&self) -> bool {
        self.is_active == Some(true)
    }
}

/// Request body for creating a new course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub icon_name: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: Option<bool>,
}

fn default_active() -> Option<bool> {
    Some(true)
}

/// Partial update of a course. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCourseRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// Expected version for optimistic concurrency control
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<i64>,
}

impl UpdateCourseRequest {
    /// Patch that only flips the active flag.
    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Self::default()
        }
    }

    /// Apply the present fields onto `course`.
    pub fn apply_to(&self, course: &mut Course) {
        if let Some(title) = &self.title {
            course.title = title.clone();
        }
        if self.description.is_some() {
            course.description = self.description.clone();
        }
        if self.duration.is_some() {
            course.duration = self.duration.clone();
        }
        if self.level.is_some() {
            course.level = self.level.clone();
        }
        if self.price.is_some() {
            course.price = self.price.clone();
        }
        if self.features.is_some() {
            course.features = self.features.clone();
        }
        if self.icon_name.is_some() {
            course.icon_name = self.icon_name.clone();
        }
        if self.is_active.is_some() {
            course.is_active = self.is_active;
        }
    }
}

/// The built-in course catalogue, newest listed first.
pub fn catalogue() -> Vec<CreateCourseRequest> {
    let course = |title: &str,
                  description: &str,
                  icon: &str,
                  duration: &str,
                  level: &str,
                  price: &str,
                  features: [&str; 4]| CreateCourseRequest {
        title: title.to_string(),
        description: Some(description.to_string()),
        duration: Some(duration.to_string()),
        level: Some(level.to_string()),
        price: Some(price.to_string()),
        features: Some(features.iter().map(|f| f.to_string()).collect()),
        icon_name: Some(icon.to_string()),
        is_active: Some(true),
    };

    vec![
        course(
            "Buy High Sell High - ABCD",
            "Master the advanced ABCD pattern trading strategy for consistent profits in trending markets.",
            "TrendingUp",
            "6 Weeks",
            "Advanced",
            "₹15,000",
            [
                "ABCD Pattern Recognition",
                "High Probability Setups",
                "Risk Management Techniques",
                "Live Trading Sessions",
            ],
        ),
        course(
            "Buy Low Sell High - TFB",
            "Learn the Time Frame Based strategy for identifying optimal entry and exit points.",
            "Target",
            "4 Weeks",
            "Intermediate",
            "₹12,000",
            [
                "Multi-Timeframe Analysis",
                "Support & Resistance",
                "Entry & Exit Strategies",
                "Practical Assignments",
            ],
        ),
        course(
            "MYB Strategy & ATH",
            "Discover the Make Your Best strategy combined with All-Time High analysis for maximum returns.",
            "BarChart",
            "5 Weeks",
            "Intermediate",
            "₹13,500",
            [
                "ATH Breakout Strategies",
                "MYB Implementation",
                "Market Psychology",
                "Portfolio Management",
            ],
        ),
        course(
            "Trend is Our Friend (B to D)",
            "Master breakout strategies and trend following techniques for consistent profits.",
            "Zap",
            "4 Weeks",
            "Beginner",
            "₹10,000",
            [
                "Trend Identification",
                "Breakout Patterns",
                "Volume Analysis",
                "Stop Loss Strategies",
            ],
        ),
        course(
            "50MA & SMC Basics",
            "Learn fundamental moving average strategies and Smart Money Concepts for reliable trading.",
            "Shield",
            "3 Weeks",
            "Beginner",
            "₹8,000",
            [
                "Moving Average Strategies",
                "Smart Money Concepts",
                "Market Structure",
                "Basic Technical Analysis",
            ],
        ),
    ]
}
