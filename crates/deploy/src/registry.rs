//! The persisted address book: contract name to deployed address, per
//! network.
//!
//! The on-disk format is a flat TOML file with one table per network:
//!
//! ```toml
//! [sepolia]
//! WETH = "0x..."
//! MochaFactory = "0x..."
//! ```
//!
//! `set` overwrites silently; the registry is intended for a single
//! writer per run and carries no locking.

use std::{collections::BTreeMap, path::Path};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::DeployError;

/// Mapping from (network, contract name) to deployed address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressRegistry {
    networks: BTreeMap<String, BTreeMap<String, Address>>,
}

impl AddressRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the registry from a TOML file. A missing file is an empty
    /// registry; a malformed file is an error.
    pub fn load_from_file(path: &Path) -> Result<Self, DeployError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No registry file, starting empty");
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            DeployError::Registry(format!("failed to read {}: {e}", path.display()))
        })?;
        let registry = toml::from_str(&content).map_err(|e| {
            DeployError::Registry(format!("failed to parse {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "Registry loaded");
        Ok(registry)
    }

    /// Write the registry to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), DeployError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DeployError::Registry(format!("failed to serialize registry: {e}")))?;
        std::fs::write(path, content).map_err(|e| {
            DeployError::Registry(format!("failed to write {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "Registry saved");
        Ok(())
    }

    /// Look up the recorded address for a contract on a network.
    pub fn get(&self, network: &str, contract: &str) -> Option<Address> {
        self.networks.get(network)?.get(contract).copied()
    }

    /// Record an address. An existing entry for the same (network,
    /// contract) pair is overwritten silently.
    pub fn set(&mut self, network: &str, contract: &str, address: Address) {
        self.networks
            .entry(network.to_string())
            .or_default()
            .insert(contract.to_string(), address);
    }

    /// All recorded entries for a network, in name order.
    pub fn entries(&self, network: &str) -> Vec<(&str, Address)> {
        self.networks
            .get(network)
            .map(|contracts| {
                contracts
                    .iter()
                    .map(|(name, addr)| (name.as_str(), *addr))
                    .collect()
            })
            .unwrap_or_default()
    }
}
