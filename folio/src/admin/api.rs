//! Admin content API, mounted under `/admin/api` behind the session gate.

use crate::admin::routes::SessionInfo;
use crate::admin::token::SessionClaims;
use crate::content::{
    AboutPatch, ExperienceInput, MessageFilter, SkillFilter, SkillInput, cv::CvUpload,
};
use crate::error::{ApiError, ApiJson, ApiResponse};
use crate::state::AppState;
use axum::{
    Extension, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use serde_json::json;
use std::sync::Arc;

/// Multipart field carrying the CV file
pub const CV_FIELD: &str = "cvFile";

pub fn content_api_router(max_cv_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/session", get(session))
        .route("/skills", get(list_skills).post(create_skill))
        .route(
            "/skills/{id}",
            get(get_skill).put(update_skill).delete(delete_skill),
        )
        .route("/experience", get(list_experience).post(create_experience))
        .route(
            "/experience/{id}",
            get(get_experience)
                .put(update_experience)
                .delete(delete_experience),
        )
        .route("/about", get(get_about).put(update_about))
        .route("/messages", get(list_messages))
        .route("/messages/{id}", get(get_message).delete(delete_message))
        .route(
            "/cv",
            get(current_cv)
                .post(upload_cv)
                .layer(DefaultBodyLimit::max(max_cv_bytes)),
        )
        .route("/cv/{id}", delete(delete_cv))
}

type ApiResult<T> = Result<T, ApiError>;

fn deleted(what: &str) -> ApiResponse<serde_json::Value> {
    ApiResponse::ok(json!({ "deleted": true })).with_message(format!("{what} deleted successfully"))
}

async fn session(Extension(claims): Extension<SessionClaims>) -> impl IntoResponse {
    ApiResponse::ok(SessionInfo::from(&claims))
}

// Skills

async fn list_skills(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<SkillFilter>,
) -> ApiResult<impl IntoResponse> {
    Ok(ApiResponse::ok(state.content.list_skills(&filter).await?))
}

async fn get_skill(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(ApiResponse::ok(state.content.get_skill(&id).await?))
}

async fn create_skill(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<SkillInput>,
) -> ApiResult<impl IntoResponse> {
    let record = state.content.create_skill(input).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(record).with_message("Skill created successfully"),
    ))
}

async fn update_skill(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<SkillInput>,
) -> ApiResult<impl IntoResponse> {
    let record = state.content.update_skill(&id, input).await?;
    Ok(ApiResponse::ok(record).with_message("Skill updated successfully"))
}

async fn delete_skill(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.content.delete_skill(&id).await?;
    Ok(deleted("Skill"))
}

// Experience

async fn list_experience(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    Ok(ApiResponse::ok(state.content.list_experience().await?))
}

async fn get_experience(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(ApiResponse::ok(state.content.get_experience(&id).await?))
}

async fn create_experience(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<ExperienceInput>,
) -> ApiResult<impl IntoResponse> {
    let record = state.content.create_experience(input).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(record).with_message("Experience created successfully"),
    ))
}

async fn update_experience(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ExperienceInput>,
) -> ApiResult<impl IntoResponse> {
    let record = state.content.update_experience(&id, input).await?;
    Ok(ApiResponse::ok(record).with_message("Experience updated successfully"))
}

async fn delete_experience(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.content.delete_experience(&id).await?;
    Ok(deleted("Experience"))
}

// About

async fn get_about(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let about = state
        .content
        .get_about()
        .await?
        .ok_or_else(|| ApiError::NotFound("About information not found".to_string()))?;
    Ok(ApiResponse::ok(about))
}

async fn update_about(
    State(state): State<Arc<AppState>>,
    ApiJson(patch): ApiJson<AboutPatch>,
) -> ApiResult<impl IntoResponse> {
    let record = state.content.upsert_about(patch).await?;
    Ok(ApiResponse::ok(record).with_message("About information saved successfully"))
}

// Contact messages

async fn list_messages(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<MessageFilter>,
) -> ApiResult<impl IntoResponse> {
    Ok(ApiResponse::ok(state.content.list_messages(&filter).await?))
}

async fn get_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(ApiResponse::ok(state.content.get_message(&id).await?))
}

async fn delete_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.content.delete_message(&id).await?;
    Ok(deleted("Message"))
}

// CV

async fn current_cv(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    Ok(ApiResponse::ok(state.content.current_cv().await?))
}

async fn upload_cv(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(CV_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        upload = Some(CvUpload {
            original_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    let upload = upload.ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;
    let record = state.content.upload_cv(upload).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(record).with_message("CV uploaded successfully"),
    ))
}

async fn delete_cv(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.content.delete_cv(&id).await?;
    Ok(deleted("CV"))
}
