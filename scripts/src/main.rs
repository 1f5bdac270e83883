use std::{io, process::ExitCode};

use clap::Parser;
use townstory_deploy::{
    artifacts::ArtifactStore,
    cli::Cli,
    client::RpcChainClient,
    config::{load_env_file, DeployConfig},
    constants::DEFAULT_LOG_FILTER,
    deployments::DeploymentsFile,
    errors::ScriptError,
    pipeline::Orchestrator,
    types::RunSummary,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Every value in `.env` can also be given on the command line
    if let Err(e) = load_env_file(None) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Validate the configuration, then run the deployment
async fn run(cli: Cli) -> Result<RunSummary, ScriptError> {
    let config = DeployConfig::from_cli(cli)?;
    let artifacts =
        ArtifactStore::new(config.artifacts_dir.clone(), config.proxy_artifact.clone());
    let deployments = DeploymentsFile::new(config.deployments_path.clone());

    let client = RpcChainClient::connect(&config).await?;
    let summary = Orchestrator::new(
        &client,
        &artifacts,
        &deployments,
        config.server_signer,
        io::stdout(),
    )?
    .run()
    .await?;

    info!(
        transactions = summary.num_transactions,
        deployments = %deployments.path().display(),
        "deployment complete"
    );
    Ok(summary)
}
