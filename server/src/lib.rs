pub mod dataset;

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;

pub use dataset::{is_valid_cnpj, normalize_cnpj, Dataset, DatasetError, Despesa, Estatisticas, Operadora};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Shared handler state. A dataset that failed to load at startup is kept as
/// its failure reason so every data endpoint can report it.
#[derive(Clone)]
pub struct AppState {
    dataset: Arc<Result<Dataset, String>>,
}

impl AppState {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset: Arc::new(Ok(dataset)),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            dataset: Arc::new(Err(reason.into())),
        }
    }

    fn dataset(&self) -> Result<&Dataset, ServiceError> {
        match &*self.dataset {
            Ok(dataset) => Ok(dataset),
            Err(reason) => Err(ServiceError::Unavailable(reason.clone())),
        }
    }
}

/// Failures reported to clients as `{"detail": "..."}` bodies.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Dados nao carregados: {0}")]
    Unavailable(String),
    #[error("CNPJ invalido (precisa ter 14 digitos).")]
    InvalidCnpj,
    #[error("Operadora nao encontrada.")]
    NotFound,
    #[error("{0}")]
    InvalidParam(&'static str),
    #[error("{0}")]
    InvalidQuery(String),
}

impl ServiceError {
    fn status(&self) -> StatusCode {
        match self {
            ServiceError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::InvalidCnpj | ServiceError::InvalidParam(_) | ServiceError::InvalidQuery(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServiceError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl From<QueryRejection> for ServiceError {
    fn from(rejection: QueryRejection) -> Self {
        ServiceError::InvalidQuery(rejection.body_text())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub q: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperadorasPage {
    pub data: Vec<Operadora>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/operadoras", get(list_operadoras))
        .route("/api/operadoras/{cnpj}", get(get_operadora))
        .route("/api/operadoras/{cnpj}/despesas", get(get_despesas))
        .route("/api/estatisticas", get(get_estatisticas))
        .route("/health", get(health))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let response = next.run(request).await;
    tracing::info!(%method, %uri, status = response.status().as_u16(), "request");
    response
}

async fn list_operadoras(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<OperadorasPage>, ServiceError> {
    let dataset = state.dataset()?;
    let Query(params) = query?;

    let page = params.page.unwrap_or(DEFAULT_PAGE);
    if page < 1 {
        return Err(ServiceError::InvalidParam("page deve ser maior ou igual a 1."));
    }
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(ServiceError::InvalidParam("limit deve estar entre 1 e 100."));
    }
    let (page, limit) = (page as u64, limit as u64);

    let found = dataset.search(params.q.as_deref());
    let total = found.len() as u64;
    let total_pages = if total == 0 { 1 } else { total.div_ceil(limit) };
    let start = usize::try_from((page - 1).saturating_mul(limit)).unwrap_or(usize::MAX);

    let data = found
        .into_iter()
        .skip(start)
        .take(limit as usize)
        .cloned()
        .collect();

    Ok(Json(OperadorasPage {
        data,
        total,
        page,
        limit,
        total_pages,
    }))
}

async fn get_operadora(
    State(state): State<AppState>,
    Path(cnpj): Path<String>,
) -> Result<Json<Operadora>, ServiceError> {
    let dataset = state.dataset()?;
    if !is_valid_cnpj(&cnpj) {
        return Err(ServiceError::InvalidCnpj);
    }
    dataset
        .operadora(&cnpj)
        .cloned()
        .map(Json)
        .ok_or(ServiceError::NotFound)
}

async fn get_despesas(
    State(state): State<AppState>,
    Path(cnpj): Path<String>,
) -> Result<Json<Vec<Despesa>>, ServiceError> {
    let dataset = state.dataset()?;
    if !is_valid_cnpj(&cnpj) {
        return Err(ServiceError::InvalidCnpj);
    }
    Ok(Json(dataset.despesas(&cnpj)))
}

async fn get_estatisticas(State(state): State<AppState>) -> Result<Json<Estatisticas>, ServiceError> {
    Ok(Json(state.dataset()?.estatisticas()))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
