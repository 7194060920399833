//! Compiled contract artifacts.
//!
//! The pipeline does not compile contracts; it consumes the JSON artifacts
//! produced by the contract build (hardhat output format: `contractName`,
//! `abi`, `bytecode`), looked up by contract name in a single directory.

use std::path::{Path, PathBuf};

use alloy::primitives::Bytes;
use serde::Deserialize;

use crate::error::DeployError;

/// A compiled contract: its ABI and creation bytecode.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    /// Contract name as emitted by the compiler.
    pub contract_name: String,
    /// The contract ABI, kept opaque; the pipeline only needs the
    /// creation bytecode, constructor shapes are fixed per contract.
    #[serde(default)]
    pub abi: serde_json::Value,
    /// Creation bytecode, hex encoded in the file.
    pub bytecode: Bytes,
}

/// Loads artifacts by contract name from a directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load the artifact for `name` from `<dir>/<name>.json`.
    ///
    /// Fails if the file is missing, is not a valid artifact, or carries
    /// no creation bytecode (e.g. an abstract contract or interface).
    pub fn load(&self, name: &str) -> Result<ContractArtifact, DeployError> {
        let path = self.dir.join(format!("{name}.json"));
        if !path.exists() {
            return Err(DeployError::Artifact(format!(
                "no artifact for `{name}` at {} (has the contract suite been compiled?)",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            DeployError::Artifact(format!("failed to read {}: {e}", path.display()))
        })?;
        let artifact: ContractArtifact = serde_json::from_str(&content).map_err(|e| {
            DeployError::Artifact(format!("failed to parse {}: {e}", path.display()))
        })?;

        if artifact.bytecode.is_empty() {
            return Err(DeployError::Artifact(format!(
                "artifact for `{name}` has no creation bytecode"
            )));
        }

        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn write_artifact(dir: &Path, name: &str, bytecode: &str) {
        let content = serde_json::json!({
            "contractName": name,
            "abi": [],
            "bytecode": bytecode,
        });
        std::fs::write(dir.join(format!("{name}.json")), content.to_string()).expect("write");
    }

    #[test]
    fn load_valid_artifact() {
        let tmp = TempDir::new("mocha-artifacts").expect("temp dir");
        write_artifact(tmp.path(), "WETH", "0x6080604052");

        let store = ArtifactStore::new(tmp.path());
        let artifact = store.load("WETH").expect("load");
        assert_eq!(artifact.contract_name, "WETH");
        assert_eq!(artifact.bytecode.to_vec(), vec![0x60, 0x80, 0x60, 0x40, 0x52]);
    }

    #[test]
    fn load_missing_artifact_fails() {
        let tmp = TempDir::new("mocha-artifacts").expect("temp dir");
        let store = ArtifactStore::new(tmp.path());
        let err = store.load("MochaFactory").unwrap_err();
        assert!(matches!(err, DeployError::Artifact(_)));
        assert!(err.to_string().contains("MochaFactory"));
    }

    #[test]
    fn load_artifact_without_bytecode_fails() {
        let tmp = TempDir::new("mocha-artifacts").expect("temp dir");
        write_artifact(tmp.path(), "IMochaPair", "0x");

        let store = ArtifactStore::new(tmp.path());
        let err = store.load("IMochaPair").unwrap_err();
        assert!(err.to_string().contains("no creation bytecode"));
    }

    #[test]
    fn load_malformed_artifact_fails() {
        let tmp = TempDir::new("mocha-artifacts").expect("temp dir");
        std::fs::write(tmp.path().join("WETH.json"), "{ not json").expect("write");

        let store = ArtifactStore::new(tmp.path());
        let err = store.load("WETH").unwrap_err();
        assert!(matches!(err, DeployError::Artifact(_)));
    }
}
