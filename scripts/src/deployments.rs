//! Recording of deployed addresses in the `deployments.json` file

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use alloy_primitives::Address;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::{
    constants::{DEPLOYMENTS_KEY, IMPLEMENTATION_KEY_SUFFIX, PROXY_ADMIN_KEY_SUFFIX},
    errors::ScriptError,
    types::{DeployedContract, DeploymentKind},
};

/// A handle on the deployments file
#[derive(Debug, Clone)]
pub struct DeploymentsFile {
    /// Where the file lives
    path: PathBuf,
}

impl DeploymentsFile {
    /// Create a handle on the deployments file at `path`
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The path of the deployments file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a deployed contract, including the proxy's implementation and
    /// admin for upgradeable contracts
    pub fn record(&self, deployed: &DeployedContract) -> Result<(), ScriptError> {
        let key = deployed.contract.deployments_key();
        let mut entries = vec![(key.to_string(), deployed.address)];

        if let DeploymentKind::Proxy {
            implementation,
            proxy_admin,
        } = deployed.kind
        {
            entries.push((format!("{key}{IMPLEMENTATION_KEY_SUFFIX}"), implementation));
            entries.push((format!("{key}{PROXY_ADMIN_KEY_SUFFIX}"), proxy_admin));
        }

        self.write_addresses(&entries)
    }

    /// Write addresses under the `deployments` key in a single update of the
    /// file, preserving all other keys
    fn write_addresses(&self, entries: &[(String, Address)]) -> Result<(), ScriptError> {
        let mut parsed_json = self.read()?;

        let root = parsed_json.as_object_mut().ok_or_else(|| {
            ScriptError::ReadDeployments(format!("{} is not a JSON object", self.path.display()))
        })?;
        let deployments = root
            .entry(DEPLOYMENTS_KEY)
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| {
                ScriptError::ReadDeployments(format!("`{DEPLOYMENTS_KEY}` is not a JSON object"))
            })?;
        for (contract_key, address) in entries {
            deployments.insert(contract_key.clone(), Value::String(format!("{address:#x}")));
        }

        let contents = serde_json::to_string_pretty(&parsed_json)
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        self.replace(contents.as_bytes())
    }

    /// Read an address back from the deployments file
    pub fn read_address(&self, contract_key: &str) -> Result<Address, ScriptError> {
        let parsed_json = self.read()?;
        let addr_str = parsed_json[DEPLOYMENTS_KEY][contract_key]
            .as_str()
            .ok_or_else(|| {
                ScriptError::ReadDeployments(format!(
                    "key {} not found in deployments file",
                    contract_key
                ))
            })?;

        addr_str
            .parse()
            .map_err(|e| ScriptError::ReadDeployments(format!("{}: {}", addr_str, e)))
    }

    /// Replace the file's contents through a renamed temporary file, so that
    /// an interrupted write leaves the previous contents intact
    fn replace(&self, contents: &[u8]) -> Result<(), ScriptError> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|e| ScriptError::WriteDeployments(format!("{}: {}", dir.display(), e)))?;
        tmp.write_all(contents)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        tmp.persist(&self.path)
            .map_err(|e| ScriptError::WriteDeployments(format!("{}: {}", self.path.display(), e)))?;

        Ok(())
    }

    /// Read the file, treating a missing file as empty
    fn read(&self) -> Result<Value, ScriptError> {
        if !self.path.exists() {
            return Ok(Value::Object(Map::new()));
        }

        let contents = fs::read_to_string(&self.path)
            .map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
    }
}
