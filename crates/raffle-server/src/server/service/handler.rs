//! Request handlers.
//!
//! Each handler validates its input, calls the [`raffle::DrawManager`] and
//! wraps the outcome in an [`Envelope`]. Failures surface as [`ApiError`],
//! which renders the same envelope with a non-200 status.

use crate::server::service::{envelope::Empty, envelope::Envelope, error::ApiError, state::AppState};
use crate::server::telemetry::{
    increment_draws_created, increment_draws_replaced, increment_entries_drawn,
    increment_requests, record_request_duration,
};
use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use core::future::Future;
use raffle::{CatalogEntry, CatalogSource, DrawId};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::instrument;

type ApiResult<T> = Result<Envelope<T>, ApiError>;

#[derive(Deserialize, Debug)]
pub struct NamesRequest {
    pub names: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDrawRequest {
    pub max_count: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SampleQuery {
    pub max_count: Option<usize>,
}

#[derive(Serialize, Debug)]
pub struct IdData {
    pub id: DrawId,
}

#[derive(Serialize, Debug)]
pub struct NameData {
    pub name: String,
}

#[derive(Serialize, Debug)]
pub struct DeletedData {
    pub deleted: bool,
}

#[derive(Serialize, Debug)]
pub struct EntriesData {
    pub entries: Vec<CatalogEntry>,
}

/// Counts the request and records its latency.
async fn observed<T>(handler: impl Future<Output = Result<T, ApiError>>) -> Result<T, ApiError> {
    increment_requests();
    let start = Instant::now();
    let result = handler.await;
    record_request_duration(start.elapsed().as_secs_f64() * 1_000.0);
    result
}

fn parse_id(raw: String) -> Result<DrawId, ApiError> {
    if raw.trim().is_empty() {
        return Err(ApiError::invalid("draw id must not be empty"));
    }
    Ok(DrawId::new(raw))
}

fn parse_names(
    state: &AppState,
    payload: Result<Json<NamesRequest>, JsonRejection>,
) -> Result<Vec<String>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::invalid(rejection.body_text()))?;
    if request.names.len() > state.max_entries() {
        return Err(ApiError::invalid(format!(
            "at most {} names are accepted, got {}",
            state.max_entries(),
            request.names.len()
        )));
    }
    Ok(request.names)
}

fn check_max_count(state: &AppState, max_count: Option<usize>) -> Result<Option<usize>, ApiError> {
    match max_count {
        Some(0) => Err(ApiError::invalid("maxCount must be greater than 0")),
        Some(n) if n > state.max_entries() => Err(ApiError::invalid(format!(
            "maxCount must not exceed {}",
            state.max_entries()
        ))),
        other => Ok(other),
    }
}

#[instrument(skip_all)]
pub async fn create_draw(
    State(state): State<AppState>,
    payload: Result<Json<NamesRequest>, JsonRejection>,
) -> ApiResult<IdData> {
    observed(async {
        let names = parse_names(&state, payload)?;
        let id = state.draws().create(names).await?;
        increment_draws_created();
        tracing::info!(draw_id = %id, "draw created");
        Ok::<_, ApiError>(Envelope::ok(IdData { id }))
    })
    .await
}

#[instrument(skip_all, fields(draw_id = %id))]
pub async fn draw_one(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<NameData> {
    observed(async {
        let id = parse_id(id)?;
        let name = state.draws().draw_one(&id).await?;
        increment_entries_drawn();
        Ok::<_, ApiError>(Envelope::ok(NameData { name }))
    })
    .await
}

#[instrument(skip_all, fields(draw_id = %id))]
pub async fn replace_draw(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NamesRequest>, JsonRejection>,
) -> ApiResult<Empty> {
    observed(async {
        let id = parse_id(id)?;
        let names = parse_names(&state, payload)?;
        state.draws().replace(&id, names).await?;
        increment_draws_replaced();
        tracing::info!(draw_id = %id, "draw replaced");
        Ok::<_, ApiError>(Envelope::ok(Empty {}))
    })
    .await
}

#[instrument(skip_all, fields(draw_id = %id))]
pub async fn delete_draw(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DeletedData> {
    observed(async {
        let id = parse_id(id)?;
        let deleted = state.draws().discard(&id).await?;
        Ok::<_, ApiError>(Envelope::ok(DeletedData { deleted }))
    })
    .await
}

/// Starts a draw over a random selection of catalog names.
///
/// The body is optional; an empty body uses the configured selection size.
#[instrument(skip_all)]
pub async fn create_catalog_draw(State(state): State<AppState>, body: Bytes) -> ApiResult<IdData> {
    observed(async {
        let request: CatalogDrawRequest = if body.iter().all(u8::is_ascii_whitespace) {
            CatalogDrawRequest::default()
        } else {
            serde_json::from_slice(&body)
                .map_err(|err| ApiError::invalid(format!("invalid JSON body: {err}")))?
        };
        let max_count = check_max_count(&state, request.max_count)?;

        let id = state
            .draws()
            .create_from_catalog(state.catalog(), max_count)
            .await?;
        increment_draws_created();
        tracing::info!(draw_id = %id, "catalog draw created");
        Ok::<_, ApiError>(Envelope::ok(IdData { id }))
    })
    .await
}

/// Returns a random selection of full catalog records without creating a
/// draw.
#[instrument(skip_all)]
pub async fn sample_catalog(
    State(state): State<AppState>,
    query: Result<Query<SampleQuery>, QueryRejection>,
) -> ApiResult<EntriesData> {
    observed(async {
        let Query(query) = query.map_err(|rejection| ApiError::invalid(rejection.body_text()))?;
        let max_count = check_max_count(&state, query.max_count)?
            .unwrap_or(state.draws().config().catalog_selection);
        let entries = state.catalog().sample(max_count).await?;
        Ok::<_, ApiError>(Envelope::ok(EntriesData { entries }))
    })
    .await
}

pub async fn health() -> Envelope<Empty> {
    Envelope::ok(Empty {})
}

pub async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
