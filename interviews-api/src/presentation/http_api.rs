//! HTTP handlers for interviews, favorites and comments.

use std::fmt;
use std::str::FromStr;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::json;

use crate::application_service::{
    AddCommentCommand, CreateInterviewCommand, ListInterviewsQuery, UpdateInterviewCommand,
};

use super::auth::{AuthUser, MaybeAuthUser};
use super::error::ApiError;
use super::AppState;

/// Routes mounted under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/interviews", get(list_interviews).post(create_interview))
        .route(
            "/interviews/{slug}",
            get(get_interview).put(update_interview).delete(delete_interview),
        )
        .route(
            "/interviews/{slug}/favorite",
            post(favorite_interview).delete(unfavorite_interview),
        )
        .route("/interviews/{slug}/comments", get(list_comments).post(add_comment))
        .route("/interviews/{slug}/comments/{comment_id}", delete(remove_comment))
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct InterviewEnvelope<T> {
    pub interview: T,
}

#[derive(Debug, Deserialize)]
pub struct CommentEnvelope<T> {
    pub comment: T,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewInterview {
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InterviewUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewComment {
    pub body: String,
}

/// Query string of the list endpoint. Empty values such as `limit=` are
/// treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub tag: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub favorited: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub limit: Option<usize>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub offset: Option<usize>,
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(de::Error::custom),
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

async fn create_interview(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<InterviewEnvelope<NewInterview>>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(InterviewEnvelope { interview }) = payload?;
    let cmd = CreateInterviewCommand {
        title: interview.title,
        description: interview.description,
        body: interview.body,
        tag_list: interview.tag_list,
    };

    let view = state.service.create(user, cmd).await?;
    Ok((StatusCode::CREATED, Json(json!({ "interview": view }))))
}

async fn get_interview(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.service.get(viewer, &slug).await?;
    Ok(Json(json!({ "interview": view })))
}

async fn update_interview(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
    payload: Result<Json<InterviewEnvelope<InterviewUpdate>>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(InterviewEnvelope { interview }) = payload?;
    let cmd = UpdateInterviewCommand {
        title: interview.title,
        description: interview.description,
        body: interview.body,
    };

    let view = state.service.update(user, &slug, cmd).await?;
    Ok(Json(json!({ "interview": view })))
}

async fn delete_interview(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.delete(user, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_interviews(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params?;
    let query = ListInterviewsQuery {
        tag: params.tag,
        author: params.author,
        favorited: params.favorited,
        limit: params.limit,
        offset: params.offset,
    };

    let page = state.service.list(viewer, query).await?;
    Ok(Json(page))
}

async fn favorite_interview(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.service.favorite(user, &slug).await?;
    Ok(Json(json!({ "interview": view })))
}

async fn unfavorite_interview(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.service.unfavorite(user, &slug).await?;
    Ok(Json(json!({ "interview": view })))
}

async fn add_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
    payload: Result<Json<CommentEnvelope<NewComment>>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(CommentEnvelope { comment }) = payload?;

    let view = state
        .service
        .add_comment(user, &slug, AddCommentCommand { body: comment.body })
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "comment": view }))))
}

async fn list_comments(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let comments = state.service.list_comments(viewer, &slug).await?;
    Ok(Json(json!({ "comments": comments })))
}

async fn remove_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((slug, comment_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.service.remove_comment(user, &slug, &comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
