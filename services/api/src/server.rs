use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemorySnapshotSource};
use crate::routes::with_turnover_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use rental_ops::config::{AppConfig, SnapshotConfig};
use rental_ops::error::AppError;
use rental_ops::telemetry;
use rental_ops::workflows::import::SnapshotImporter;
use rental_ops::workflows::turnover::{Snapshot, TurnoverService};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let (Some(apartments), Some(reservations)) =
        (args.apartments.take(), args.reservations.take())
    {
        config.snapshot.apartments_csv = Some(apartments);
        config.snapshot.reservations_csv = Some(reservations);
        config.snapshot.cleanings_csv = args.cleanings.take();
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let source = InMemorySnapshotSource::new(initial_snapshot(&config.snapshot)?);
    let service = Arc::new(TurnoverService::new(
        Arc::new(source.clone()),
        config.scheduling.policy,
    ));

    let app = with_turnover_routes(service, source)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "turnover scheduling service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn initial_snapshot(paths: &SnapshotConfig) -> Result<Snapshot, AppError> {
    match (&paths.apartments_csv, &paths.reservations_csv) {
        (Some(apartments), Some(reservations)) => {
            let (snapshot, report) = SnapshotImporter::from_paths(
                apartments.as_path(),
                reservations.as_path(),
                paths.cleanings_csv.as_deref(),
            )?;
            info!(
                apartments = report.apartments,
                reservations = report.reservations,
                rejected = report.rejected.len(),
                "seeded snapshot from CSV exports"
            );
            Ok(snapshot)
        }
        _ => {
            warn!("no snapshot exports configured; starting with an empty snapshot");
            Ok(Snapshot::default())
        }
    }
}
