//! Question-generation service
//!
//! Endpoints:
//! - `POST /api/generate-game`: generate a question set and store it as a session
//! - `GET /api/session/{id}`: fetch a session's questions
//! - `GET /api/sessions/stats`: session counts
//!
//! The game itself never talks to this service; the page fetches a session's
//! questions and hands them to the simulation.

pub mod config;
pub mod error;
pub mod generator;
pub mod rate_limit;
pub mod session_store;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Json;
use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;

pub use config::ServerConfig;
pub use error::ApiError;
pub use generator::{GeminiGenerator, GenerateError, QuestionGenerator, QuestionRequest};
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use session_store::SessionStore;

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);
const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Shared service state
pub struct AppState<G> {
    pub generator: G,
    pub sessions: Mutex<SessionStore>,
    pub limiter: Mutex<RateLimiter>,
    pub public_url: String,
}

impl<G: QuestionGenerator> AppState<G> {
    pub fn new(generator: G, config: &ServerConfig) -> Arc<Self> {
        Arc::new(Self {
            generator,
            sessions: Mutex::new(SessionStore::new(config.session_ttl, config.max_sessions)),
            limiter: Mutex::new(RateLimiter::new(config.rate_limit)),
            public_url: config.public_url.clone(),
        })
    }
}

/// Request body as sent by clients; every field is required but checked by hand
#[derive(Debug, Default, Deserialize)]
pub struct GenerateGameBody {
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub class: Option<String>,
    pub chapter: Option<String>,
}

impl GenerateGameBody {
    fn into_request(self) -> Result<QuestionRequest, ApiError> {
        fn present(field: &Option<String>) -> Option<&str> {
            field.as_deref().filter(|v| !v.trim().is_empty())
        }
        match (
            present(&self.subject),
            present(&self.topic),
            present(&self.class),
            present(&self.chapter),
        ) {
            (Some(subject), Some(topic), Some(class), Some(chapter)) => {
                Ok(QuestionRequest::sanitized(subject, topic, class, chapter))
            }
            _ => Err(ApiError::BadRequest(
                "Missing required fields: subject, topic, class, chapter".to_string(),
            )),
        }
    }
}

pub fn router<G: QuestionGenerator>(state: Arc<AppState<G>>) -> Router {
    Router::new()
        .route(
            "/api/generate-game",
            post(generate_game::<G>).options(preflight),
        )
        .route("/api/session/{id}", get(get_session::<G>).options(preflight))
        .route("/api/sessions/stats", get(session_stats::<G>))
        .layer(axum::middleware::map_response(with_cors))
        .with_state(state)
}

async fn generate_game<G: QuestionGenerator>(
    State(state): State<Arc<AppState<G>>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Result<Json<GenerateGameBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let started = Instant::now();
    let client = rate_limit::client_identifier(&headers, Some(peer));

    let decision = state.limiter.lock().await.check(&client, started);
    if !decision.allowed {
        log::warn!("Rate limit exceeded for {}", client);
        return Err(ApiError::RateLimited {
            retry_after_secs: decision.retry_after_secs(started),
            remaining: decision.remaining,
        });
    }

    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let request = body.into_request()?;
    log::info!(
        "New game request from {}: {} / {} / {} / {}",
        client,
        request.subject,
        request.topic,
        request.class,
        request.chapter
    );

    let questions = state.generator.generate(&request).await.map_err(|e| {
        log::error!("Question generation failed for {}: {}", client, e);
        ApiError::from(e)
    })?;
    let question_count = questions.len();

    let session_id = state
        .sessions
        .lock()
        .await
        .create(questions, Instant::now());
    let game_url = format!("{}/?id={}", state.public_url, session_id);
    log::info!(
        "Game generated in {}ms for {}",
        started.elapsed().as_millis(),
        client
    );

    Ok(Json(json!({
        "success": true,
        "sessionId": session_id,
        "gameUrl": game_url,
        "questionCount": question_count,
    })))
}

async fn get_session<G: QuestionGenerator>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut sessions = state.sessions.lock().await;
    let questions = sessions.get(&id, Instant::now()).ok_or_else(|| {
        log::info!("Session not found: {}", id);
        ApiError::NotFound
    })?;
    log::info!("Returned {} questions for session {}", questions.len(), id);
    Ok(Json(json!({ "success": true, "questions": questions })))
}

async fn session_stats<G: QuestionGenerator>(
    State(state): State<Arc<AppState<G>>>,
) -> session_store::SessionStats {
    state.sessions.lock().await.stats(Instant::now())
}

async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static("86400"),
    );
    response
}

/// Periodically drop expired sessions and rate-limit windows
fn spawn_cleanup<G: QuestionGenerator>(state: Arc<AppState<G>>) {
    let sessions_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            sessions_state
                .sessions
                .lock()
                .await
                .purge_expired(Instant::now());
        }
    });
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            state.limiter.lock().await.purge_expired(Instant::now());
        }
    });
}

/// Serve until Ctrl-C
pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    if config.api_key.is_none() {
        log::warn!("GEMINI_API_KEY is not set; game generation will fail");
    }
    let generator = GeminiGenerator::new(config.api_key.clone(), config.model.clone());
    let state = AppState::new(generator, &config);
    spawn_cleanup(state.clone());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    log::info!("Listening on {} (public URL {})", config.addr, config.public_url);
    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        log::info!("Shutting down");
    })
    .await
}

impl IntoResponse for session_store::SessionStats {
    fn into_response(self) -> Response {
        Json(json!({
            "total": self.total,
            "active": self.active,
            "expired": self.expired,
        }))
        .into_response()
    }
}
