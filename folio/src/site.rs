//! Public site: page models, contact form and CV download.
//!
//! Pages are JSON render models served from the page cache. They are rebuilt
//! on the first request after a content change invalidates them.

use crate::content::{ContactMessageInput, ContentError, ContentService, SkillFilter};
use crate::error::{ApiError, ApiJson, ApiResponse};
use crate::state::AppState;
use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use std::sync::Arc;

/// Skills shown on the home page.
pub const HOME_SKILL_COUNT: usize = 6;

/// Public download location of the current CV.
pub const CV_PATH: &str = "/cv";

pub fn site_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/skills", get(skills))
        .route("/experience", get(experience))
        .route("/contact", get(contact).post(submit_contact))
        .route(CV_PATH, get(download_cv))
}

async fn cv_link(content: &ContentService) -> Result<Value, ContentError> {
    Ok(match content.current_cv().await? {
        Some(cv) => json!({
            "url": CV_PATH,
            "original_name": cv.data.original_name,
            "uploaded_at": cv.data.uploaded_at,
        }),
        None => Value::Null,
    })
}

pub async fn render_home(content: &ContentService) -> Result<Value, ContentError> {
    let about = content.get_about().await?;
    let mut skills = content.list_skills(&SkillFilter::default()).await?;
    skills.truncate(HOME_SKILL_COUNT);
    let recent_experience = content.recent_experience(1).await?.into_iter().next();

    Ok(json!({
        "about": about,
        "key_skills": skills,
        "recent_experience": recent_experience,
        "cv": cv_link(content).await?,
    }))
}

pub async fn render_about(content: &ContentService) -> Result<Value, ContentError> {
    Ok(json!({ "about": content.get_about().await? }))
}

/// Skills grouped by category, in category order. Empty groups are omitted.
pub async fn render_skills(content: &ContentService) -> Result<Value, ContentError> {
    let skills = content.list_skills(&SkillFilter::default()).await?;
    let categories: Vec<Value> = crate::content::SkillCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let members: Vec<_> = skills
                .iter()
                .filter(|s| s.data.category == category)
                .collect();
            (!members.is_empty()).then(|| json!({ "category": category, "skills": members }))
        })
        .collect();

    Ok(json!({ "categories": categories, "total": skills.len() }))
}

pub async fn render_experience(content: &ContentService) -> Result<Value, ContentError> {
    Ok(json!({ "experience": content.list_experience().await? }))
}

pub async fn render_contact(content: &ContentService) -> Result<Value, ContentError> {
    let about = content.get_about().await?;
    Ok(json!({
        "contact_email": about.as_ref().map(|a| a.data.contact_email.clone()),
        "social_links": about.map(|a| a.data.social_links).unwrap_or_default(),
    }))
}

async fn cached_page<F, Fut>(state: &AppState, path: &str, render: F) -> Result<Response, ApiError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value, ContentError>>,
{
    let page = state.content.pages().get_or_render(path, render).await?;
    Ok(Json(page.as_ref()).into_response())
}

async fn home(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    cached_page(&state, "/", || render_home(&state.content)).await
}

async fn about(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    cached_page(&state, "/about", || render_about(&state.content)).await
}

async fn skills(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    cached_page(&state, "/skills", || render_skills(&state.content)).await
}

async fn experience(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    cached_page(&state, "/experience", || render_experience(&state.content)).await
}

async fn contact(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    cached_page(&state, "/contact", || render_contact(&state.content)).await
}

async fn submit_contact(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<ContactMessageInput>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.content.submit_message(input).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(record)
            .with_message("Message sent successfully! Thank you for reaching out."),
    ))
}

async fn download_cv(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let (cv, bytes) = state
        .content
        .read_current_cv()
        .await?
        .ok_or_else(|| ApiError::NotFound("No CV uploaded".to_string()))?;

    let filename: String = cv
        .data
        .original_name
        .chars()
        .filter(|c| (c.is_ascii_graphic() || *c == ' ') && *c != '"' && *c != '\\')
        .collect();
    let disposition = format!("inline; filename=\"{filename}\"");

    Ok((
        [
            (header::CONTENT_TYPE, cv.data.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
