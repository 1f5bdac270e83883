//! Loading of Hardhat compilation artifacts

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use alloy_primitives::{hex::FromHex, Bytes};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    constants::{ARTIFACT_EXTENSION, PROXY_ARTIFACT, PROXY_CONSTRUCTOR_PARAMS},
    errors::ScriptError,
};

/// The subset of a Hardhat artifact (`hh-sol-artifact-1`) used for deployment
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    /// The name of the contract
    contract_name: String,
    /// The contract ABI
    #[serde(default)]
    abi: Vec<AbiItem>,
    /// The hex-encoded creation bytecode
    bytecode: String,
    /// Unresolved library placeholders in the bytecode
    #[serde(default)]
    link_references: HashMap<String, Value>,
}

/// An entry of a contract ABI, only as far as constructors are concerned
#[derive(Debug, Deserialize)]
struct AbiItem {
    /// The kind of entry, e.g. `function` or `constructor`
    #[serde(rename = "type")]
    kind: String,
    /// The entry's parameters
    #[serde(default)]
    inputs: Vec<AbiParam>,
}

/// A named ABI parameter
#[derive(Debug, Deserialize)]
struct AbiParam {
    /// The parameter name
    #[serde(default)]
    name: String,
}

/// A contract's creation code, ready to be deployed
#[derive(Debug, Clone)]
pub struct Artifact {
    /// The name of the contract
    pub contract_name: String,
    /// The names of the constructor parameters, empty without a constructor
    pub constructor_params: Vec<String>,
    /// The creation bytecode, without constructor arguments
    pub bytecode: Bytes,
}

impl Artifact {
    /// Parse a Hardhat artifact from its JSON contents
    pub fn from_json(contents: &str) -> Result<Self, ScriptError> {
        let artifact: HardhatArtifact = serde_json::from_str(contents)
            .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

        if !artifact.link_references.is_empty() {
            return Err(ScriptError::ArtifactParsing(format!(
                "{} requires library linking",
                artifact.contract_name
            )));
        }

        let bytecode = Bytes::from_hex(&artifact.bytecode)
            .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
        if bytecode.is_empty() {
            return Err(ScriptError::ArtifactParsing(format!(
                "{} has no bytecode, is it abstract?",
                artifact.contract_name
            )));
        }

        let constructor_params = artifact
            .abi
            .into_iter()
            .find(|item| item.kind == "constructor")
            .map(|item| item.inputs.into_iter().map(|p| p.name).collect())
            .unwrap_or_default();

        Ok(Self {
            contract_name: artifact.contract_name,
            constructor_params,
            bytecode,
        })
    }

    /// The creation code followed by the ABI-encoded constructor arguments
    pub fn init_code(&self, constructor_args: &[u8]) -> Bytes {
        let mut code = Vec::with_capacity(self.bytecode.len() + constructor_args.len());
        code.extend_from_slice(&self.bytecode);
        code.extend_from_slice(constructor_args);
        code.into()
    }
}

/// Resolves artifacts by contract name from a Hardhat artifacts directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    /// The root of the artifacts directory
    root: PathBuf,
    /// Overrides the location of the proxy artifact
    proxy_artifact: Option<PathBuf>,
}

impl ArtifactStore {
    /// Create a store rooted at the given directory
    pub fn new(root: PathBuf, proxy_artifact: Option<PathBuf>) -> Self {
        Self {
            root,
            proxy_artifact,
        }
    }

    /// Load the artifact of the given contract
    pub fn load(&self, contract_name: &str) -> Result<Artifact, ScriptError> {
        let path = match (&self.proxy_artifact, contract_name == PROXY_ARTIFACT) {
            (Some(path), true) => path.clone(),
            _ => find_artifact(&self.root, contract_name)?.ok_or_else(|| {
                ScriptError::ReadArtifact(format!(
                    "no artifact for {} under {}",
                    contract_name,
                    self.root.display()
                ))
            })?,
        };

        let contents = fs::read_to_string(&path)
            .map_err(|e| ScriptError::ReadArtifact(format!("{}: {}", path.display(), e)))?;
        let artifact = Artifact::from_json(&contents)?;

        if artifact.contract_name != contract_name {
            return Err(ScriptError::ArtifactParsing(format!(
                "{} contains {}, expected {}",
                path.display(),
                artifact.contract_name,
                contract_name
            )));
        }

        Ok(artifact)
    }

    /// Load the `TransparentUpgradeableProxy` artifact, checking that it is
    /// the v5 proxy whose constructor deploys its own `ProxyAdmin`
    pub fn load_proxy(&self) -> Result<Artifact, ScriptError> {
        let artifact = self.load(PROXY_ARTIFACT)?;
        if artifact.constructor_params != PROXY_CONSTRUCTOR_PARAMS {
            return Err(ScriptError::ArtifactParsing(format!(
                "{} has constructor ({}), expected the OpenZeppelin v5 proxy with ({})",
                PROXY_ARTIFACT,
                artifact.constructor_params.join(", "),
                PROXY_CONSTRUCTOR_PARAMS.join(", ")
            )));
        }

        Ok(artifact)
    }
}

/// Recursively search `dir` for `<contract_name>.json`
fn find_artifact(dir: &Path, contract_name: &str) -> Result<Option<PathBuf>, ScriptError> {
    let file_name = format!("{contract_name}.{ARTIFACT_EXTENSION}");
    let entries = fs::read_dir(dir)
        .map_err(|e| ScriptError::ReadArtifact(format!("{}: {}", dir.display(), e)))?;

    let mut subdirs = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| ScriptError::ReadArtifact(e.to_string()))?
            .path();

        if path.is_dir() {
            subdirs.push(path);
            continue;
        }

        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if name == file_name {
            return Ok(Some(path));
        }
    }

    // `build-info` holds compiler inputs, not artifacts
    subdirs.sort();
    for subdir in subdirs {
        if subdir.file_name().is_some_and(|n| n == "build-info") {
            continue;
        }
        if let Some(found) = find_artifact(&subdir, contract_name)? {
            return Ok(Some(found));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{Artifact, ArtifactStore};
    use crate::errors::ScriptError;

    /// A minimal Hardhat artifact with the given name and bytecode
    fn artifact_json(name: &str, bytecode: &str) -> String {
        artifact_json_with_abi(name, bytecode, "[]")
    }

    /// A proxy artifact whose constructor takes the given parameters
    fn proxy_json(params: [&str; 3]) -> String {
        let abi = format!(
            r#"[
                {{"type": "constructor", "stateMutability": "payable", "inputs": [
                    {{"name": "{}", "type": "address", "internalType": "address"}},
                    {{"name": "{}", "type": "address", "internalType": "address"}},
                    {{"name": "{}", "type": "bytes", "internalType": "bytes"}}
                ]}},
                {{"type": "fallback", "stateMutability": "payable"}}
            ]"#,
            params[0], params[1], params[2]
        );
        artifact_json_with_abi("TransparentUpgradeableProxy", "0x6080", &abi)
    }

    /// A minimal Hardhat artifact with the given name, bytecode and ABI
    fn artifact_json_with_abi(name: &str, bytecode: &str, abi: &str) -> String {
        format!(
            r#"{{
                "_format": "hh-sol-artifact-1",
                "contractName": "{name}",
                "sourceName": "contracts/{name}.sol",
                "abi": {abi},
                "bytecode": "{bytecode}",
                "deployedBytecode": "0x",
                "linkReferences": {{}},
                "deployedLinkReferences": {{}}
            }}"#
        )
    }

    #[test]
    fn test_parse_artifact() {
        let artifact = Artifact::from_json(&artifact_json("Foo", "0x6080")).unwrap();
        assert_eq!(artifact.contract_name, "Foo");
        assert_eq!(artifact.bytecode.to_vec(), vec![0x60, 0x80]);
        assert_eq!(artifact.init_code(&[0xaa]).to_vec(), vec![0x60, 0x80, 0xaa]);
    }

    #[test]
    fn test_rejects_abstract_contract() {
        let res = Artifact::from_json(&artifact_json("IFoo", "0x"));
        assert!(matches!(res, Err(ScriptError::ArtifactParsing(_))));
    }

    #[test]
    fn test_rejects_unlinked_libraries() {
        let json = artifact_json("Foo", "0x6080").replace(
            r#""linkReferences": {}"#,
            r#""linkReferences": {"contracts/Lib.sol": {"Lib": []}}"#,
        );
        let res = Artifact::from_json(&json);
        assert!(matches!(res, Err(ScriptError::ArtifactParsing(_))));
    }

    #[test]
    fn test_store_finds_nested_artifact_and_skips_debug_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("contracts").join("Foo.sol");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("Foo.dbg.json"), r#"{"_format": "hh-sol-dbg-1"}"#).unwrap();
        fs::write(nested.join("Foo.json"), artifact_json("Foo", "0x6080")).unwrap();

        let store = ArtifactStore::new(dir.path().to_path_buf(), None);
        let artifact = store.load("Foo").unwrap();
        assert_eq!(artifact.contract_name, "Foo");
    }

    #[test]
    fn test_store_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().to_path_buf(), None);
        assert!(matches!(store.load("Foo"), Err(ScriptError::ReadArtifact(_))));
    }

    #[test]
    fn test_proxy_override() {
        let dir = tempfile::tempdir().unwrap();
        let proxy_path = dir.path().join("proxy.json");
        fs::write(&proxy_path, proxy_json(["_logic", "initialOwner", "_data"])).unwrap();

        let artifacts = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(artifacts.path().to_path_buf(), Some(proxy_path));
        assert_eq!(
            store.load_proxy().unwrap().contract_name,
            "TransparentUpgradeableProxy"
        );
    }

    #[test]
    fn test_reads_constructor_params() {
        let artifact = Artifact::from_json(&proxy_json(["a", "b", "c"])).unwrap();
        assert_eq!(artifact.constructor_params, vec!["a", "b", "c"]);

        let artifact = Artifact::from_json(&artifact_json("Foo", "0x6080")).unwrap();
        assert!(artifact.constructor_params.is_empty());
    }

    #[test]
    fn test_rejects_pre_v5_proxy() {
        let dir = tempfile::tempdir().unwrap();
        let proxy_path = dir.path().join("proxy.json");
        fs::write(&proxy_path, proxy_json(["_logic", "admin_", "_data"])).unwrap();

        let store = ArtifactStore::new(dir.path().to_path_buf(), Some(proxy_path));
        assert!(matches!(store.load_proxy(), Err(ScriptError::ArtifactParsing(_))));
    }
}
