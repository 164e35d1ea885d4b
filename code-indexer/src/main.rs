use std::process::ExitCode;

use tracing::{error, info};

use code_indexer::{init_tracing, load_requests, Dependencies, IndexerConfig, IndexerError};
use code_indexer_ingest::UpgradeOutcome;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Code indexer failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), IndexerError> {
    let config = IndexerConfig::from_env()?;
    let requests = load_requests(&config.requests_path)?;

    info!(
        path = %config.requests_path.display(),
        count = requests.len(),
        "Loaded index creation requests"
    );

    let deps = Dependencies::new(&config).await?;

    for outcome in deps.upgrade_all(requests).await? {
        match outcome {
            UpgradeOutcome::UpToDate { index, version } => {
                info!(index = %index, version = version, "Up to date")
            }
            UpgradeOutcome::Created {
                alias,
                index,
                version,
            } => info!(alias = %alias, index = %index, version = version, "Created"),
            UpgradeOutcome::Migrated {
                alias,
                from_index,
                to_index,
                ..
            } => info!(alias = %alias, from = %from_index, to = %to_index, "Migrated"),
            UpgradeOutcome::CleanupPending {
                alias,
                residual_index,
                reason,
                ..
            } => info!(
                alias = %alias,
                residual_index = %residual_index,
                reason = %reason,
                "Migrated, old index still present"
            ),
        }
    }

    Ok(())
}
