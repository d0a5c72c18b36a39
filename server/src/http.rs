//! Development employee API backed by the in-memory store.
//!
//! Serves the same routes the console client calls, under `/api`.

use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use entity::{Employee, EmployeeFilter, NewEmployee};
use platform_api::{ApiError, InMemoryEmployeeApi};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<InMemoryEmployeeApi>,
    pub cors_allowed_origins: Arc<Vec<String>>,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "development employee api listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    let employees = Router::new()
        .route("/employees", get(list_handler).post(create_handler))
        .route(
            "/employees/{id}",
            axum::routing::put(update_handler).delete(delete_handler),
        );
    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", employees)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.cors_allowed_origins)),
        )
        .with_state(state)
}

async fn list_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> HttpResult<Json<Vec<Employee>>> {
    let filter =
        EmployeeFilter::from_query_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    Ok(Json(state.store.list_matching(&filter)?))
}

async fn create_handler(
    State(state): State<AppState>,
    Json(body): Json<NewEmployee>,
) -> HttpResult<(StatusCode, Json<Employee>)> {
    let employee = state.store.insert(body)?;
    info!(id = employee.id, "employee created");
    Ok((StatusCode::CREATED, Json(employee)))
}

async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut body): Json<Employee>,
) -> HttpResult<Json<Employee>> {
    // The path names the record; a mismatched body id is overridden.
    body.id = id;
    Ok(Json(state.store.replace(body)?))
}

async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HttpResult<StatusCode> {
    state.store.remove(id)?;
    info!(id, "employee deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let employees = state
        .store
        .list_matching(&EmployeeFilter::default())
        .map(|all| all.len())
        .ok();
    Json(HealthResponse {
        ok: employees.is_some(),
        employees,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    employees: Option<usize>,
    version: &'static str,
}

type HttpResult<T> = Result<T, HttpError>;

#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    message: String,
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status = match &err {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}
