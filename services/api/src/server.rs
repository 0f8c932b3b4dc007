use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryContributionRepository};
use crate::routes::with_legality_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use drivetuning::config::{AppConfig, AppEnvironment};
use drivetuning::error::AppError;
use drivetuning::legality::contributions::{AllowListAdminPolicy, ContributionReviewService};
use drivetuning::legality::ReferenceCatalog;
use drivetuning::telemetry;
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

    telemetry::init(&config.telemetry, config.environment)?;

    let catalog = Arc::new(ReferenceCatalog::from_paths(
        config.datasets.references_path.as_deref(),
        config.datasets.regional_rules_path.as_deref(),
    )?);
    info!(
        laws = catalog.law_count(),
        regional_rules = catalog.regional_rules().len(),
        "legality reference catalog loaded"
    );

    let policy = AllowListAdminPolicy::from_config(&config.admin);
    if policy.is_empty() {
        warn!("no admin identities configured; contribution review is disabled");
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = if config.environment == AppEnvironment::Development {
        InMemoryContributionRepository::with_demo_vehicles()
    } else {
        InMemoryContributionRepository::default()
    };
    let contribution_service = Arc::new(ContributionReviewService::new(
        Arc::new(repository),
        Arc::new(policy),
    ));

    let app = with_legality_routes(catalog, contribution_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "drivetuning legality service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
