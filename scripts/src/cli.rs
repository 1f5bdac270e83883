//! Definitions of CLI arguments for the deploy script

use std::path::PathBuf;

use clap::Parser;

use crate::constants::{
    DEFAULT_ARTIFACTS_DIR, DEFAULT_DEPLOYMENTS_PATH, DEFAULT_NUM_CONFIRMATIONS, DEFAULT_RPC_URL,
};

/// Deploy the TownStory game contracts and grant the sync and account
/// creation contracts game owner rights on them.
///
/// Every deployment and call is confirmed before the next one is sent.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Private key of the deployer
    #[arg(long = "pkey", env = "PKEY", hide_env_values = true)]
    pub priv_key: String,

    /// Address trusted by the sync and account creation contracts to sign
    /// server-side state
    #[arg(short, long, env = "SERVER_SIGNER")]
    pub server_signer: String,

    /// Directory containing the Hardhat compilation artifacts
    #[arg(short, long, env = "ARTIFACTS_DIR", default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// Explicit path to the `TransparentUpgradeableProxy` artifact, if it is
    /// not part of the artifacts directory
    #[arg(long)]
    pub proxy_artifact: Option<PathBuf>,

    /// Path of the file to which deployed addresses are written
    #[arg(short, long, default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: PathBuf,

    /// Number of confirmations to wait for on each transaction
    #[arg(short, long, default_value_t = DEFAULT_NUM_CONFIRMATIONS)]
    pub confirmations: u64,
}
