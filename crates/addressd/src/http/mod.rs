//! HTTP surface
//!
//! All record routes live under `/address_records` and take their input
//! from query parameters. Every response body is an envelope; only `error`
//! envelopes change the status code (500). A query string that does not
//! parse is a `fail` envelope. Any other path or method gets the fixed
//! invalid-route payload with status 200.

use address_core::{AddressFields, AddressService, Envelope, Status};
use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Base path of the record routes
pub const RECORDS_PATH: &str = "/address_records";

pub const INVALID_ROUTE_MESSAGE: &str = "Accessing an invalid/non-existing route.";

pub const INVALID_QUERY_MESSAGE: &str = "Invalid query parameters.";

/// Handler dependencies, injected at startup
#[derive(Clone)]
pub struct AppState {
    pub service: AddressService,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeleteParams {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FindParams {
    state: String,
    country: String,
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let records = Router::new()
        .route("/create", get(create_record).fallback(invalid_route))
        .route("/delete", get(delete_record).fallback(invalid_route))
        .route("/update", get(update_record).fallback(invalid_route))
        .route("/find", get(find_records).fallback(invalid_route));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST]);

    Router::new()
        .nest(RECORDS_PATH, records)
        .fallback(invalid_route)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn create_record(
    State(state): State<AppState>,
    query: Result<Query<AddressFields>, QueryRejection>,
) -> Response {
    match parsed(query) {
        Ok(fields) => reply(state.service.create(fields).await),
        Err(response) => response,
    }
}

async fn delete_record(
    State(state): State<AppState>,
    query: Result<Query<DeleteParams>, QueryRejection>,
) -> Response {
    match parsed(query) {
        Ok(params) => reply(state.service.delete(&params.name).await),
        Err(response) => response,
    }
}

async fn update_record(
    State(state): State<AppState>,
    query: Result<Query<AddressFields>, QueryRejection>,
) -> Response {
    match parsed(query) {
        Ok(fields) => reply(state.service.update(fields).await),
        Err(response) => response,
    }
}

async fn find_records(
    State(state): State<AppState>,
    query: Result<Query<FindParams>, QueryRejection>,
) -> Response {
    match parsed(query) {
        Ok(params) => reply(state.service.find(&params.state, &params.country).await),
        Err(response) => response,
    }
}

/// Unwrap the query, or answer with a `fail` envelope
fn parsed<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, Response> {
    query.map(|Query(value)| value).map_err(|rejection| {
        warn!(error = %rejection, "rejected query string");
        reply(Envelope::fail(INVALID_QUERY_MESSAGE))
    })
}

async fn invalid_route() -> Json<Value> {
    Json(json!({ "status": "Fail", "data": INVALID_ROUTE_MESSAGE }))
}

fn reply(envelope: Envelope) -> Response {
    let status = match envelope.status {
        Status::Error => StatusCode::INTERNAL_SERVER_ERROR,
        Status::Success | Status::Fail => StatusCode::OK,
    };
    (status, Json(envelope)).into_response()
}
