use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryRoleStore};
use crate::routes::router;
use axum_prometheus::PrometheusMetricLayer;
use competency::config::AppConfig;
use competency::error::AppError;
use competency::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        policy: config.policy,
        roles: Arc::new(InMemoryRoleStore::default()),
    };

    let app = router(app_state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        growth_min_gap = config.policy.growth_min_gap,
        growth_limit = config.policy.growth_limit,
        "competency service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
