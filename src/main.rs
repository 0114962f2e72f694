//! Payroll engine HTTP server.
//!
//! Reads settings from the environment (`HOST`, `PORT`, `DATA_DIR`,
//! `PAYROLL_CONFIG_DIR`), credits any leave accrual that fell due while the
//! server was down, then serves the API.

use payroll_engine::api::{AppState, create_router};
use payroll_engine::clock::{Clock, SystemClock};
use payroll_engine::config::{ConfigLoader, ServerSettings};
use payroll_engine::store::{JsonStore, Repository};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = ServerSettings::from_env()?;
    let rules = ConfigLoader::load(&settings.config_dir)?.into_rules();
    let repository = Repository::new(JsonStore::new(&settings.data_dir)?);

    let clock = SystemClock;
    let today = clock.today();
    let days_per_month = rules.constants.leave_days_per_month;
    let reports = repository
        .transaction(|dataset| Ok(dataset.run_monthly_accrual(today, days_per_month)))
        .await?;
    info!(
        employees = reports.len(),
        credited = reports.iter().filter(|report| report.credited.is_some()).count(),
        "Startup leave accrual complete"
    );

    let app = create_router(AppState::new(rules, repository, clock));
    let listener = TcpListener::bind(settings.bind_address()).await?;
    info!(
        address = %settings.bind_address(),
        data_dir = %settings.data_dir,
        "Payroll engine listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
