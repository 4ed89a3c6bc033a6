use std::sync::Arc;

use anyhow::{Context, Result};
use eligibility_checker::{
    cli::{Command, args_from_env},
    config::Config,
    directory::FileDirectory,
    engine::{DryRunDeprovisioner, EligibilityEngine},
    logging::init_tracing,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = args_from_env()?;
    let config = Config::load(&args.config_path)
        .with_context(|| format!("failed to load config from {}", args.config_path.display()))?;
    let _tracing_guard = init_tracing(&config)?;

    let directory = FileDirectory::load(&config.directory.snapshot_path)?;
    let engine = EligibilityEngine::new(config.service, Arc::new(directory))
        .await
        .context("failed to construct eligibility engine")?;

    match args.command {
        Command::Check {
            principal_ids,
            validate_affiliation,
        } => {
            for principal_id in principal_ids {
                let decision = engine
                    .check_eligibility_with(&principal_id, validate_affiliation)
                    .await;
                println!("{}", serde_json::to_string(&decision)?);
            }
        }
        Command::Deprovision { principal_ids } => {
            let deprovisioner = DryRunDeprovisioner;
            for principal_id in principal_ids {
                let deprovisioned = engine
                    .deprovision_if_ineligible(&principal_id, &deprovisioner)
                    .await;
                println!(
                    "{}",
                    serde_json::json!({ "id": principal_id, "deprovisioned": deprovisioned })
                );
            }
        }
    }

    Ok(())
}
