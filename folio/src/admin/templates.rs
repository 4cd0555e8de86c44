//! Askama templates for the admin pages.

use askama::Template;

/// Base data available to all templates
pub struct BaseContext {
    pub username: String,
}

/// Login page template
#[derive(Template)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

/// Current CV line on the dashboard
pub struct CvSummary {
    pub original_name: String,
    pub uploaded_at: String,
    pub file_size_kb: u64,
}

/// Recent contact message line on the dashboard
pub struct MessageSummary {
    pub name: String,
    pub email: String,
    pub submitted_at: String,
}

/// Dashboard page template
#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub base: BaseContext,
    pub session_expires_at: String,
    pub skill_count: u64,
    pub experience_count: u64,
    pub message_count: u64,
    pub has_about: bool,
    pub cv: Option<CvSummary>,
    pub recent_messages: Vec<MessageSummary>,
}
