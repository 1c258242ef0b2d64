use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chart;
use crate::config::DataConfig;
use crate::dataset::{DataSet, Record};
use crate::error::PassengerError;
use crate::histogram::fare_histogram;

/// Shared application state. Only the config location is shared; the config
/// itself and the data it points at are read again for every request.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        AppState {
            config_path: Arc::new(config_path.into()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/hist", get(get_fare_histogram))
        .route("/passenger/:passenger_id", get(get_passenger))
        .route("/passengers", get(get_passengers))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: AppState, listen: std::net::SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!(%listen, config = %state.config_path.display(), "passenger api listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub struct ApiError(PassengerError);

impl From<PassengerError> for ApiError {
    fn from(err: PassengerError) -> Self {
        ApiError(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PassengerError::ColumnNotFound(_) | PassengerError::InvalidId(_) => StatusCode::BAD_REQUEST,
            PassengerError::EmptyTable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PassengerError::SourceNotFound(_)
            | PassengerError::Parse { .. }
            | PassengerError::Query(_)
            | PassengerError::Config { .. }
            | PassengerError::Chart(_)
            | PassengerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!(%status, error = %self.0, "request failed");
        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}

/// Reads the config, loads the table and runs `query` on the blocking pool.
async fn with_dataset<T, F>(state: &AppState, query: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(DataSet) -> Result<T, PassengerError> + Send + 'static,
{
    let config_path = state.config_path.clone();
    let task = tokio::task::spawn_blocking(move || {
        let source = DataConfig::from_file(&config_path)?.source();
        query(source.load()?)
    });
    match task.await {
        Ok(result) => result.map_err(ApiError::from),
        Err(join_err) => {
            warn!(error = %join_err, "query task failed");
            Err(ApiError(PassengerError::Internal(join_err.to_string())))
        }
    }
}

#[derive(Serialize)]
pub struct HistogramResponse {
    pub image: String,
}

async fn get_fare_histogram(State(state): State<AppState>) -> Result<Json<HistogramResponse>, ApiError> {
    let image = with_dataset(&state, |data| chart::render_base64(&fare_histogram(&data)?)).await?;
    Ok(Json(HistogramResponse { image }))
}

#[derive(Deserialize, Debug, Default)]
pub struct PassengerParams {
    /// Comma-separated list of columns to return.
    pub attributes: Option<String>,
}

impl PassengerParams {
    fn attribute_list(&self) -> Vec<String> {
        self.attributes
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .map(|raw| raw.split(',').map(|a| a.trim().to_string()).collect())
            .unwrap_or_default()
    }
}

#[derive(Serialize)]
pub struct PassengerResponse {
    /// The matching record encoded as a JSON string, or null when no
    /// passenger has the requested id.
    pub passenger_data: Option<String>,
}

async fn get_passenger(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(params): Query<PassengerParams>,
) -> Result<Json<PassengerResponse>, ApiError> {
    let passenger_id = raw_id
        .parse::<i64>()
        .map_err(|_| PassengerError::InvalidId(raw_id.clone()))?;
    let attributes = params.attribute_list();
    let record = with_dataset(&state, move |data| data.get_one(passenger_id, &attributes)).await?;
    let passenger_data = record
        .map(|r| serde_json::to_string(&r))
        .transpose()
        .map_err(|e| ApiError(PassengerError::Internal(e.to_string())))?;
    Ok(Json(PassengerResponse { passenger_data }))
}

#[derive(Serialize)]
pub struct PassengersResponse {
    pub passengers_data: Vec<Record>,
}

async fn get_passengers(State(state): State<AppState>) -> Result<Json<PassengersResponse>, ApiError> {
    let passengers_data = with_dataset(&state, |data| Ok(data.list_all())).await?;
    Ok(Json(PassengersResponse { passengers_data }))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
