//! HTTP presentation layer.

pub mod auth;
pub mod error;
pub mod http_api;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::application_service::InterviewService;
use crate::port::{Authenticator, CommentRepository, InterviewRepository, UserRepository};

pub use auth::{AuthUser, MaybeAuthUser};
pub use error::ApiError;

/// Service wired with repositories chosen at startup.
pub type SharedInterviewService = InterviewService<
    Arc<dyn UserRepository>,
    Arc<dyn InterviewRepository>,
    Arc<dyn CommentRepository>,
>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SharedInterviewService>,
    pub authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        interviews: Arc<dyn InterviewRepository>,
        comments: Arc<dyn CommentRepository>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            service: Arc::new(InterviewService::new(users, interviews, comments)),
            authenticator,
        }
    }
}

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(http_api::health_check))
        .nest("/api", http_api::api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
