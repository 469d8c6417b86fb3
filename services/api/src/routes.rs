use crate::infra::{AppState, InMemorySnapshotSource};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use rental_ops::workflows::cleanings::CleaningRecord;
use rental_ops::workflows::import::{ImportReport, SnapshotImporter};
use rental_ops::workflows::turnover::records::{ApartmentRecord, ReservationRecord};
use rental_ops::workflows::turnover::{turnover_router, SnapshotSource, TurnoverService};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Raw snapshot upload; rows failing validation are reported, not fatal.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SnapshotPayload {
    #[serde(default)]
    pub(crate) apartments: Vec<ApartmentRecord>,
    #[serde(default)]
    pub(crate) reservations: Vec<ReservationRecord>,
    #[serde(default)]
    pub(crate) cleanings: Vec<CleaningRecord>,
}

pub(crate) fn with_turnover_routes<S>(
    service: Arc<TurnoverService<S>>,
    source: InMemorySnapshotSource,
) -> axum::Router
where
    S: SnapshotSource + 'static,
{
    turnover_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/turnover/snapshot",
            axum::routing::put(replace_snapshot_endpoint),
        )
        .layer(Extension(source))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn replace_snapshot_endpoint(
    Extension(source): Extension<InMemorySnapshotSource>,
    Json(payload): Json<SnapshotPayload>,
) -> Result<Json<ImportReport>, (StatusCode, Json<serde_json::Value>)> {
    let SnapshotPayload {
        apartments,
        reservations,
        cleanings,
    } = payload;

    let (snapshot, report) = SnapshotImporter::from_records(apartments, reservations, cleanings);
    source.replace(snapshot).map_err(|err| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": err.to_string() })),
        )
    })?;

    Ok(Json(report))
}
