use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use thiserror::Error;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::auth::{AuthError, TokenService};
use crate::config::{AppConfig, SecurityConfig};
use crate::database::Store;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::{AuthService, LearningService, UploadError, UploadService};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Failed to bind {addr}: {source}")]
    Bind { addr: String, source: std::io::Error },

    #[error("Server error: {0}")]
    Serve(std::io::Error),
}

/// Everything a handler may touch. Cloned per request; all fields are shared.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub auth: Arc<AuthService>,
    pub learnings: Arc<LearningService>,
    pub uploads: Arc<UploadService>,
}

impl AppState {
    pub fn new<S: Store + 'static>(config: AppConfig, store: Arc<S>) -> Result<Self, StartupError> {
        let tokens = TokenService::new(&config.security)?;
        let uploads = UploadService::new(&config)?;
        let auth = AuthService::new(store.clone(), tokens, config.security.min_password_length);
        let learnings = LearningService::new(store.clone(), config.pagination.clone());

        Ok(Self {
            config: Arc::new(config),
            store,
            auth: Arc::new(auth),
            learnings: Arc::new(learnings),
            uploads: Arc::new(uploads),
        })
    }
}

pub fn app(state: AppState) -> Router {
    let uploads_dir = state.uploads.dir().to_path_buf();
    let cors = cors_layer(&state.config.security);

    Router::new()
        .merge(public_routes())
        .merge(protected_routes(&state))
        // Uploaded files are public
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::{auth, learnings, system};

    Router::new()
        .route("/", get(system::root_get))
        .route("/health", get(system::health_get))
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
        .route("/auth/logout", post(auth::logout_post))
        .route("/learnings", get(learnings::list_get))
        .route("/learnings/all", get(learnings::all_get))
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    use protected::{auth, learnings, upload};

    let uploads = Router::new()
        .route("/upload", post(upload::single_post))
        .route("/upload/multiple", post(upload::multiple_post))
        .layer(DefaultBodyLimit::max(state.config.uploads.max_upload_bytes));

    Router::new()
        .route("/auth/me", get(auth::me_get))
        .route("/learnings", post(learnings::create_post))
        .route("/learnings/:id", put(learnings::update_put).delete(learnings::delete_by_id))
        .merge(uploads)
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
}

/// Bind and serve until Ctrl-C.
pub async fn serve(state: AppState) -> Result<(), StartupError> {
    let bind_addr = state.config.bind_addr();
    state.uploads.ensure_dir().await?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|source| StartupError::Bind { addr: bind_addr.clone(), source })?;

    info!(
        "Learnings API listening on http://{} ({:?}, {} store)",
        bind_addr,
        state.config.environment,
        state.store.backend()
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
