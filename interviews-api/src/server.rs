//! Server - wires configuration, stores and the HTTP router together.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::{ServerConfig, StoreKind};
use crate::domain::User;
use crate::infrastructure::persistence::{
    SledCommentRepository, SledInterviewRepository, SledUserRepository,
};
use crate::infrastructure::{
    InMemoryCommentRepository, InMemoryInterviewRepository, InMemoryUserRepository,
    JwtAuthenticator,
};
use crate::port::{CommentRepository, InterviewRepository, RepositoryError, UserRepository};
use crate::presentation::{create_router, AppState};

/// Interviews server instance.
pub struct Server {
    config: ServerConfig,
    users: Arc<dyn UserRepository>,
    state: AppState,
    jwt: Arc<JwtAuthenticator>,
}

impl Server {
    /// Create a server, opening the configured store.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let (users, interviews, comments): (
            Arc<dyn UserRepository>,
            Arc<dyn InterviewRepository>,
            Arc<dyn CommentRepository>,
        ) = match config.store {
            StoreKind::Sled => {
                std::fs::create_dir_all(&config.data_dir)
                    .context("Failed to create data directory")?;
                let db = sled::open(config.data_dir.join("interviews.sled"))
                    .context("Failed to open sled database")?;
                (
                    Arc::new(SledUserRepository::with_db(db.clone())),
                    Arc::new(SledInterviewRepository::with_db(db.clone())),
                    Arc::new(SledCommentRepository::with_db(db)),
                )
            }
            StoreKind::Memory => {
                tracing::warn!("using in-memory store; data is lost on exit");
                (
                    Arc::new(InMemoryUserRepository::new()),
                    Arc::new(InMemoryInterviewRepository::new()),
                    Arc::new(InMemoryCommentRepository::new()),
                )
            }
        };

        let jwt = Arc::new(JwtAuthenticator::new(
            config.resolve_jwt_secret().as_bytes(),
        ));
        let state = AppState::new(users.clone(), interviews, comments, jwt.clone());

        Ok(Self {
            config,
            users,
            state,
            jwt,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Looks up `username`, registering it if absent, and signs a token for it.
    pub async fn issue_token(&self, username: &str) -> Result<String> {
        let user = match self.users.find_by_username(username).await? {
            Some(user) => user,
            None => {
                let user = User::new(username);
                match self.users.insert(&user).await {
                    Ok(()) => {
                        tracing::info!(username, id = %user.id(), "registered user");
                        user
                    }
                    // lost a race with a concurrent registration
                    Err(RepositoryError::Duplicate(_)) => self
                        .users
                        .find_by_username(username)
                        .await?
                        .context("user vanished after duplicate insert")?,
                    Err(e) => return Err(e).context("Failed to register user"),
                }
            }
        };

        self.jwt.issue(&user).context("Failed to sign token")
    }

    /// Run the HTTP server.
    pub async fn run(&self) -> Result<()> {
        let router = create_router(self.state.clone());

        tracing::info!(
            "Starting interviews server on {} ({:?} store)",
            self.config.http_addr,
            self.config.store
        );

        let listener = tokio::net::TcpListener::bind(&self.config.http_addr)
            .await
            .context("Failed to bind HTTP listener")?;

        axum::serve(listener, router)
            .await
            .context("HTTP server error")?;

        Ok(())
    }
}
