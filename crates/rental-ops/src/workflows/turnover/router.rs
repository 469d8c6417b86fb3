use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::assembler::default_target_date;
use super::dashboard::TimelineDashboard;
use super::domain::ClockTime;
use super::position::{position_fraction, position_percent};
use super::report::DashboardSummary;
use super::service::{SnapshotSource, TurnoverService, TurnoverServiceError};
use crate::workflows::cleanings::CleaningStatus;

/// Router builder exposing the turnover dashboard and its helpers.
pub fn turnover_router<S>(service: Arc<TurnoverService<S>>) -> Router
where
    S: SnapshotSource + 'static,
{
    Router::new()
        .route("/api/v1/turnover/dashboard", get(dashboard_handler::<S>))
        .route("/api/v1/turnover/cleanings", get(cleanings_handler::<S>))
        .route("/api/v1/turnover/timeline/position", post(position_handler))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub dashboard: TimelineDashboard,
    pub summary: DashboardSummary,
}

#[derive(Debug, Deserialize)]
pub struct CleaningsQuery {
    pub assignee: String,
    /// Comma-separated statuses; open work when omitted.
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PositionRequest {
    pub time: String,
}

#[derive(Debug, Serialize)]
pub struct PositionResponse {
    pub time: ClockTime,
    pub fraction: f64,
    pub percent: f64,
}

pub(crate) async fn dashboard_handler<S>(
    State(service): State<Arc<TurnoverService<S>>>,
    Query(query): Query<DashboardQuery>,
) -> Response
where
    S: SnapshotSource + 'static,
{
    let date = match query.date.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => date,
            Err(err) => {
                let payload = json!({
                    "error": format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"),
                });
                return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
            }
        },
        _ => default_target_date(Local::now().date_naive()),
    };

    match service.dashboard(date) {
        Ok(dashboard) => {
            let summary = dashboard.summary();
            (
                StatusCode::OK,
                axum::Json(DashboardResponse { dashboard, summary }),
            )
                .into_response()
        }
        Err(error) => source_failure(error),
    }
}

pub(crate) async fn cleanings_handler<S>(
    State(service): State<Arc<TurnoverService<S>>>,
    Query(query): Query<CleaningsQuery>,
) -> Response
where
    S: SnapshotSource + 'static,
{
    let statuses = match parse_statuses(query.status.as_deref()) {
        Ok(statuses) => statuses,
        Err(unknown) => {
            let payload = json!({ "error": format!("unknown cleaning status '{unknown}'") });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    match service.cleanings_for(query.assignee.trim(), &statuses) {
        Ok(assignments) => (StatusCode::OK, axum::Json(assignments)).into_response(),
        Err(error) => source_failure(error),
    }
}

pub(crate) async fn position_handler(axum::Json(request): axum::Json<PositionRequest>) -> Response {
    match ClockTime::parse(&request.time) {
        Ok(time) => {
            let payload = PositionResponse {
                time,
                fraction: position_fraction(time),
                percent: position_percent(time),
            };
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}

fn parse_statuses(raw: Option<&str>) -> Result<Vec<CleaningStatus>, String> {
    let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
        return Ok(CleaningStatus::OPEN.to_vec());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| CleaningStatus::parse(value).ok_or_else(|| value.to_string()))
        .collect()
}

fn source_failure(error: TurnoverServiceError) -> Response {
    tracing::error!(%error, "turnover snapshot unavailable");
    let payload = json!({ "error": error.to_string() });
    (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::cleanings::CleaningAssignment;
    use crate::workflows::turnover::classifier::CleaningPolicy;
    use crate::workflows::turnover::domain::{Apartment, Reservation};
    use crate::workflows::turnover::service::{Snapshot, SourceError};

    struct Offline;

    impl SnapshotSource for Offline {
        fn apartments(&self) -> Result<Vec<Apartment>, SourceError> {
            Err(SourceError::Unavailable("database offline".into()))
        }

        fn reservations(&self) -> Result<Vec<Reservation>, SourceError> {
            Err(SourceError::Unavailable("database offline".into()))
        }

        fn cleanings(&self) -> Result<Vec<CleaningAssignment>, SourceError> {
            Err(SourceError::Unavailable("database offline".into()))
        }
    }

    #[tokio::test]
    async fn dashboard_handler_rejects_bad_dates() {
        let service = Arc::new(TurnoverService::new(
            Arc::new(Snapshot::default()),
            CleaningPolicy::default(),
        ));
        let response = dashboard_handler(
            State(service),
            Query(DashboardQuery {
                date: Some("06/10/2025".into()),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn dashboard_handler_reports_unavailable_source() {
        let service = Arc::new(TurnoverService::new(
            Arc::new(Offline),
            CleaningPolicy::default(),
        ));
        let response = dashboard_handler(State(service), Query(DashboardQuery::default())).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn cleanings_handler_rejects_unknown_status() {
        let service = Arc::new(TurnoverService::new(
            Arc::new(Snapshot::default()),
            CleaningPolicy::default(),
        ));
        let response = cleanings_handler(
            State(service),
            Query(CleaningsQuery {
                assignee: "maria".into(),
                status: Some("scheduled,paused".into()),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn position_handler_rejects_malformed_time() {
        let response = position_handler(axum::Json(PositionRequest {
            time: "quarter past".into(),
        }))
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn status_filter_defaults_to_open_work() {
        assert_eq!(parse_statuses(None), Ok(CleaningStatus::OPEN.to_vec()));
        assert_eq!(
            parse_statuses(Some("completed, canceled")),
            Ok(vec![CleaningStatus::Completed, CleaningStatus::Canceled])
        );
    }
}
