//! Validated configuration for a deployment run

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::{signers::local::PrivateKeySigner, transports::http::reqwest::Url};
use alloy_primitives::Address;

use crate::{cli::Cli, errors::ScriptError};

/// Configuration for a deployment run, validated before any network traffic
pub struct DeployConfig {
    /// The RPC endpoint of the target network
    pub rpc_url: Url,
    /// The deployer, which pays for and owns every deployment
    pub signer: PrivateKeySigner,
    /// The server signer passed to the sync and account creation contracts
    pub server_signer: Address,
    /// Directory containing the Hardhat compilation artifacts
    pub artifacts_dir: PathBuf,
    /// Explicit location of the proxy artifact
    pub proxy_artifact: Option<PathBuf>,
    /// Path of the deployments file
    pub deployments_path: PathBuf,
    /// Number of confirmations to wait for on each transaction
    pub confirmations: u64,
}

impl DeployConfig {
    /// Validate the parsed CLI arguments
    pub fn from_cli(cli: Cli) -> Result<Self, ScriptError> {
        let rpc_url = Url::parse(&cli.rpc_url)
            .map_err(|e| ScriptError::Config(format!("invalid RPC URL {}: {}", cli.rpc_url, e)))?;

        let signer = PrivateKeySigner::from_str(&cli.priv_key)
            .map_err(|e| ScriptError::Config(format!("invalid deployer private key: {}", e)))?;

        let server_signer = parse_server_signer(&cli.server_signer)?;

        if !cli.artifacts_dir.is_dir() {
            return Err(ScriptError::Config(format!(
                "artifacts directory {} does not exist",
                cli.artifacts_dir.display()
            )));
        }

        if let Some(path) = &cli.proxy_artifact {
            if !path.is_file() {
                return Err(ScriptError::Config(format!(
                    "proxy artifact {} does not exist",
                    path.display()
                )));
            }
        }

        Ok(Self {
            rpc_url,
            signer,
            server_signer,
            artifacts_dir: cli.artifacts_dir,
            proxy_artifact: cli.proxy_artifact,
            deployments_path: cli.deployments_path,
            confirmations: cli.confirmations,
        })
    }
}

/// Load environment variables from a `.env` file, `path` or the first one
/// found from the working directory upwards.
///
/// A missing file is not an error, a malformed one is
pub fn load_env_file(path: Option<&Path>) -> Result<(), ScriptError> {
    let res = match path {
        Some(path) => dotenvy::from_path(path),
        None => dotenvy::dotenv().map(|_| ()),
    };

    match res {
        Err(e) if !e.not_found() => Err(ScriptError::Config(format!("error loading .env: {}", e))),
        _ => Ok(()),
    }
}

/// Parse the server signer address, rejecting the zero address
pub fn parse_server_signer(value: &str) -> Result<Address, ScriptError> {
    let address = Address::from_str(value.trim())
        .map_err(|e| ScriptError::Config(format!("invalid server signer {}: {}", value, e)))?;

    if address.is_zero() {
        return Err(ScriptError::Config(
            "server signer must not be the zero address".to_string(),
        ));
    }

    Ok(address)
}
