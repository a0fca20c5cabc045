use crate::cli::ServeArgs;
use crate::infra::{build_service, AppState};
use crate::routes::with_appraisal_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use ventas300::config::AppConfig;
use ventas300::error::AppError;
use ventas300::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(data_dir) = args.data_dir.take() {
        config.storage.data_dir = Some(data_dir);
    }
    if args.no_seed {
        config.storage.seed_demo = false;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(build_service(&config.storage)?);
    info!(
        default_commission_pct = service.policy().default_percentage(),
        seed_demo = config.storage.seed_demo,
        "appraisal service initialised"
    );

    let app = with_appraisal_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "ventas300 api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
