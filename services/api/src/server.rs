use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAnalysisRepository};
use crate::routes::with_verifier_routes;
use affimark::config::AppConfig;
use affimark::error::AppError;
use affimark::telemetry;
use affimark::verifier::{DisabledPlaybookGenerator, VerifierService};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let verifier_service = Arc::new(VerifierService::new(
        Arc::new(InMemoryAnalysisRepository::default()),
        Arc::new(DisabledPlaybookGenerator),
        config.verifier.settings(),
    ));

    let app = with_verifier_routes(verifier_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        items_per_bucket = config.verifier.items_per_bucket,
        "product verifier ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
