/***************************************/
/*        3rd party libraries          */
/***************************************/
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info, warn};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::ServerConfig;
use crate::server::{ParamError, Params};
use crate::service::{ServiceError, ServiceHandle};
use crate::shared::{ElevatorSpec, ElevatorStatus, Floor};

/**
 * Shared state of the request handlers.
 *
 * # Fields
 * - `service`:     Handle to the thread owning the elevator registry.
 */
#[derive(Clone)]
pub struct AppState {
    pub service: ServiceHandle,
}

/// Request failures and the response each one maps to.
#[derive(Debug)]
enum ApiError {
    Param(ParamError),
    Service(ServiceError),
}

impl From<ParamError> for ApiError {
    fn from(error: ParamError) -> Self {
        ApiError::Param(error)
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        ApiError::Service(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Param(error) => {
                warn!("Rejected request: {}", error);
                (StatusCode::BAD_REQUEST, error.to_string()).into_response()
            }
            ApiError::Service(ServiceError::Elevator(error)) => {
                warn!("Rejected request: {}", error);
                (StatusCode::BAD_REQUEST, error.to_string()).into_response()
            }
            ApiError::Service(error) => internal_error(error),
        }
    }
}

fn internal_error(error: ServiceError) -> Response {
    error!("Internal error: {}", error);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

/***************************************/
/*             Public API              */
/***************************************/
pub fn router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/scheduledFloors", get(scheduled_floors))
        .route("/config", get(config))
        .route("/schedule", post(schedule))
        .route("/scheduleWithOffset", post(schedule_with_offset))
        .route("/unschedule", post(unschedule))
        .route("/update", post(update))
        .route("/add", post(add))
        .route("/remove", post(remove))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API until SIGINT or SIGTERM, then drain open connections.
pub async fn run(config: &ServerConfig, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("web server started at port: {}", config.port);

    axum::serve(listener, router(state, &config.static_dir))
        .with_graceful_shutdown(shutdown_signal(config.shutdown_timeout()))
        .await
}

async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down active connections");
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        error!("Connections didn't shut down in time, shutting down forcefully");
        std::process::exit(1);
    });
}

/***************************************/
/*              Handlers               */
/***************************************/
async fn status(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let empty = || {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "id": null, "lowestFloor": null, "highestFloor": null })),
        )
            .into_response()
    };

    let [id] = match Params::from(query).integers(["id"]) {
        Ok(values) => values,
        Err(e) => {
            warn!("Rejected status request: {}", e);
            return empty();
        }
    };

    match state.service.status(id).await {
        Ok(status) => Json::<ElevatorStatus>(status).into_response(),
        Err(ServiceError::Elevator(e)) => {
            warn!("Rejected status request: {}", e);
            empty()
        }
        Err(e) => internal_error(e),
    }
}

async fn scheduled_floors(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Floor>>, ApiError> {
    let [id] = Params::from(query).integers(["id"])?;
    Ok(Json(state.service.scheduled_floors(id).await?))
}

/// Elevators currently managed, including those added or removed at runtime.
async fn config(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let elevators = state.service.specs().await?;
    Ok(Json(json!({ "elevators": elevators })))
}

async fn schedule(State(state): State<AppState>, params: Params) -> Result<&'static str, ApiError> {
    let [id, target_floor] = params.integers(["id", "targetFloor"])?;
    state.service.schedule(id, target_floor).await?;
    Ok("Ok")
}

async fn schedule_with_offset(
    State(state): State<AppState>,
    params: Params,
) -> Result<&'static str, ApiError> {
    let [id, target_floor, offset] = params.integers(["id", "targetFloor", "offset"])?;
    state
        .service
        .schedule_with_offset(id, target_floor, offset)
        .await?;
    Ok("Ok")
}

async fn unschedule(State(state): State<AppState>, params: Params) -> Result<&'static str, ApiError> {
    let [id, target_floor] = params.integers(["id", "targetFloor"])?;
    state.service.unschedule(id, target_floor).await?;
    Ok("Ok")
}

async fn update(State(state): State<AppState>, params: Params) -> Response {
    let invalid = || (StatusCode::BAD_REQUEST, "Invalid request").into_response();

    let [id, current_floor] = match params.integers(["id", "currentFloor"]) {
        Ok(values) => values,
        Err(e) => {
            warn!("Rejected update request: {}", e);
            return invalid();
        }
    };

    match state.service.update(id, current_floor).await {
        Ok(()) => "ok".into_response(),
        Err(ServiceError::Elevator(e)) => {
            warn!("Rejected update request: {}", e);
            invalid()
        }
        Err(e) => internal_error(e),
    }
}

async fn add(State(state): State<AppState>, params: Params) -> Result<&'static str, ApiError> {
    let [id, lowest_floor, highest_floor] = params.integers(["id", "lowestFloor", "highestFloor"])?;
    state
        .service
        .add(ElevatorSpec {
            id,
            lowest_floor,
            highest_floor,
        })
        .await?;
    Ok("Ok")
}

async fn remove(State(state): State<AppState>, params: Params) -> Result<&'static str, ApiError> {
    let [id] = params.integers(["id"])?;
    state.service.remove(id).await?;
    Ok("Ok")
}
