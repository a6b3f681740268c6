//! tray-dispatch Service - Core Tray Dispatch Tracking

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use config::{AppConfig, StoreBackend};
use tracing::{debug, info};

use tray_dispatch::application::{InventorySettings, ServiceHandler};
use tray_dispatch::application::queries::{
    GetReconciliationQuery, GetStatsQuery, ListOverdueQuery,
};
use tray_dispatch::domain::repositories::{DispatchFilter, DispatchRepository};
use tray_dispatch::domain::value_objects::DispatchScope;
use tray_dispatch::infrastructure::api::HttpDispatchRepository;
use tray_dispatch::infrastructure::persistence::InMemoryDispatchRepository;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load("config").context("failed to load configuration")?;
    telemetry::init_for_env(&config.telemetry.log_level, config.is_production());
    info!(
        app_name = %config.app_name,
        app_env = %config.app_env,
        "Runtime initialized"
    );

    let metrics = telemetry::init_metrics().context("failed to install metrics recorder")?;

    let repo = build_repository(&config).await?;
    let handler = ServiceHandler::new(repo.clone(), InventorySettings::from(&config.inventory));

    log_dashboard(&handler, repo.as_ref()).await?;
    debug!(metrics = %metrics.render(), "Metrics snapshot");
    Ok(())
}

async fn build_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn DispatchRepository>> {
    match config.store.backend {
        StoreBackend::Memory => {
            let repo = match &config.store.seed_path {
                Some(path) => {
                    let json = tokio::fs::read_to_string(path)
                        .await
                        .with_context(|| format!("failed to read seed file {}", path))?;
                    InMemoryDispatchRepository::from_seed_json(&json)
                        .with_context(|| format!("failed to load seed file {}", path))?
                }
                None => InMemoryDispatchRepository::new(),
            };
            info!(
                seed_path = config.store.seed_path.as_deref().unwrap_or("-"),
                "Using in-memory dispatch store"
            );
            Ok(Arc::new(repo))
        }
        StoreBackend::Api => {
            let api = config
                .store
                .api
                .as_ref()
                .context("store.api is required for the api backend")?;
            let repo = HttpDispatchRepository::new(api)?;
            info!(base_url = %repo.base_url(), "Using remote dispatch store");
            Ok(Arc::new(repo))
        }
    }
}

/// 输出仪表盘快照：全局统计、逾期摘要、各钻孔对账情况
async fn log_dashboard(
    handler: &ServiceHandler,
    repo: &dyn DispatchRepository,
) -> anyhow::Result<()> {
    let now = Utc::now();

    let stats = handler
        .get_stats(GetStatsQuery {
            scope: DispatchScope::none(),
        })
        .await?;
    info!(
        available_hq = stats.available.hq,
        available_nq = stats.available.nq,
        "Inventory snapshot"
    );

    let digest = handler.overdue_digest(ListOverdueQuery { now }).await?;
    if !digest.is_empty() {
        info!(
            "{}",
            digest.headline(handler.settings().overdue_threshold_days)
        );
    }

    let all = repo.list(&DispatchFilter::all()).await?;
    let holes: BTreeSet<(String, String)> = all
        .iter()
        .map(|d| (d.project_id().to_string(), d.drillhole_id().to_string()))
        .collect();

    for (project_id, drillhole_id) in holes {
        let scope = DispatchScope::hole(&project_id, &drillhole_id);
        let report = handler
            .get_reconciliation(GetReconciliationQuery { scope })
            .await?;
        if !report.is_clean() {
            info!(
                project_id = %project_id,
                drillhole_id = %drillhole_id,
                outstanding = report.outstanding.len(),
                discrepancies = report.discrepancies.len(),
                "Reconciliation pending"
            );
        }
    }

    Ok(())
}
