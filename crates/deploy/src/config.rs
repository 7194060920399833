//! Network configuration and credential resolution.
//!
//! Configuration is layered: built-in network defaults, then a `Mocha.toml`
//! file, then `MOCHA_`-prefixed environment variables. Secrets (the signing
//! key and the RPC provider access key) are read only from the environment
//! and are kept out of every `Debug` representation and log line.

use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::DeployError;

/// Environment variable holding the deployer's private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "MOCHA_PRIVATE_KEY";

/// Environment variable holding the Infura project key.
pub const INFURA_KEY_ENV_VAR: &str = "MOCHA_INFURA_KEY";

/// Placeholder in a network URL that is replaced with the Infura key.
const INFURA_KEY_PLACEHOLDER: &str = "{INFURA_KEY}";

/// A single network entry: RPC endpoint plus the chain id the endpoint is
/// expected to report. Local development networks omit the chain id and
/// skip the preflight check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// RPC endpoint URL. May contain the `{INFURA_KEY}` placeholder.
    pub url: String,
    /// Expected chain id, if pinned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
}

/// Top-level configuration for the deployment pipeline.
///
/// Constructed once at process start and threaded through every step; no
/// component reads configuration ad hoc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MochaConfig {
    /// Network used when none is selected on the command line.
    pub default_network: String,
    /// Static fee recipient passed to the factory and router constructors.
    pub fee_to: Address,
    /// Directory holding compiled contract artifacts.
    pub artifacts_dir: PathBuf,
    /// Known networks by name.
    pub networks: BTreeMap<String, NetworkConfig>,
}

impl Default for MochaConfig {
    fn default() -> Self {
        let mut networks = BTreeMap::new();
        networks.insert(
            "sepolia".to_string(),
            NetworkConfig {
                url: "https://rpc.sepolia.org".to_string(),
                chain_id: Some(11155111),
            },
        );
        networks.insert(
            "mainnet".to_string(),
            NetworkConfig {
                url: format!("https://mainnet.infura.io/v3/{INFURA_KEY_PLACEHOLDER}"),
                chain_id: Some(1),
            },
        );
        networks.insert(
            "localhost".to_string(),
            NetworkConfig {
                url: "http://127.0.0.1:8545".to_string(),
                chain_id: None,
            },
        );
        networks.insert(
            "coverage".to_string(),
            NetworkConfig {
                url: "http://localhost:8555".to_string(),
                chain_id: None,
            },
        );

        Self {
            default_network: "sepolia".to_string(),
            fee_to: Address::ZERO,
            artifacts_dir: "artifacts".into(),
            networks,
        }
    }
}

impl MochaConfig {
    /// Load the configuration: defaults, overridden by the TOML file at
    /// `path` (if present), overridden by `MOCHA_*` environment variables.
    pub fn load(path: &Path) -> Result<Self, DeployError> {
        Figment::from(Serialized::defaults(MochaConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("MOCHA_").split("__"))
            .extract()
            .map_err(|e| DeployError::Config(e.to_string()))
    }

    /// Resolve the target network: endpoint, chain id, and signer.
    ///
    /// `network` falls back to [`MochaConfig::default_network`] when
    /// `None`. Fails before any network call if the network is unknown,
    /// the endpoint is malformed, the endpoint requires a provider key
    /// that is not configured, or the signing key is absent or invalid.
    pub fn resolve(
        &self,
        network: Option<&str>,
        secrets: &Secrets,
    ) -> Result<ResolvedNetwork, DeployError> {
        let name = network.unwrap_or(&self.default_network);
        let entry = self.networks.get(name).ok_or_else(|| {
            DeployError::Config(format!(
                "unknown network `{}` (known networks: {})",
                name,
                self.networks
                    .keys()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })?;

        let url = if entry.url.contains(INFURA_KEY_PLACEHOLDER) {
            let key = secrets.infura_key.as_deref().ok_or_else(|| {
                DeployError::Config(format!(
                    "network `{name}` requires {INFURA_KEY_ENV_VAR} to be set"
                ))
            })?;
            entry.url.replace(INFURA_KEY_PLACEHOLDER, key)
        } else {
            entry.url.clone()
        };

        let rpc_url = Url::parse(&url).map_err(|e| {
            DeployError::Config(format!("invalid RPC URL for network `{name}`: {e}"))
        })?;

        let signer: PrivateKeySigner = secrets.private_key.parse().map_err(|_| {
            DeployError::Config(format!("{PRIVATE_KEY_ENV_VAR} is not a valid private key"))
        })?;

        Ok(ResolvedNetwork {
            name: name.to_string(),
            rpc_url,
            chain_id: entry.chain_id,
            signer,
        })
    }
}

/// Credentials read from the process environment.
pub struct Secrets {
    /// The deployer's private key, hex encoded.
    pub private_key: String,
    /// Infura project key, if set.
    pub infura_key: Option<String>,
}

impl Secrets {
    /// Read credentials from the environment. The signing key is required;
    /// the provider key is optional and only checked when a network's URL
    /// asks for it.
    pub fn from_env() -> Result<Self, DeployError> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR)
            .map_err(|_| DeployError::Config(format!("{PRIVATE_KEY_ENV_VAR} is not set")))?;
        let infura_key = std::env::var(INFURA_KEY_ENV_VAR).ok();
        Ok(Self {
            private_key,
            infura_key,
        })
    }
}

// The signing key must never leak through logs or error output.
impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("private_key", &"<redacted>")
            .field("infura_key", &self.infura_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A fully resolved deployment target.
#[derive(Clone)]
pub struct ResolvedNetwork {
    /// Network name as selected.
    pub name: String,
    /// RPC endpoint with any provider key substituted in.
    pub rpc_url: Url,
    /// Expected chain id, if pinned by the configuration.
    pub chain_id: Option<u64>,
    /// The deployer's signer.
    pub signer: PrivateKeySigner,
}

impl fmt::Debug for ResolvedNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedNetwork")
            .field("name", &self.name)
            .field("rpc_url", &self.rpc_url.as_str())
            .field("chain_id", &self.chain_id)
            .field("signer", &self.signer.address())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Well-known Anvil development key (account index 0).
    const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn test_secrets() -> Secrets {
        Secrets {
            private_key: TEST_KEY.to_string(),
            infura_key: None,
        }
    }

    #[test]
    fn default_config_has_builtin_networks() {
        let config = MochaConfig::default();
        assert_eq!(config.default_network, "sepolia");
        for name in ["sepolia", "mainnet", "localhost", "coverage"] {
            assert!(config.networks.contains_key(name), "missing {name}");
        }
        assert_eq!(config.networks["sepolia"].chain_id, Some(11155111));
        assert_eq!(config.networks["mainnet"].chain_id, Some(1));
        assert_eq!(config.networks["localhost"].chain_id, None);
    }

    #[test]
    fn resolve_uses_default_network() {
        let config = MochaConfig::default();
        let resolved = config.resolve(None, &test_secrets()).unwrap();
        assert_eq!(resolved.name, "sepolia");
        assert_eq!(resolved.chain_id, Some(11155111));
        assert_eq!(resolved.rpc_url.as_str(), "https://rpc.sepolia.org/");
    }

    #[test]
    fn resolve_unknown_network_fails() {
        let config = MochaConfig::default();
        let err = config
            .resolve(Some("ropsten"), &test_secrets())
            .unwrap_err();
        assert!(matches!(err, DeployError::Config(_)));
        assert!(err.to_string().contains("ropsten"));
    }

    #[test]
    fn resolve_substitutes_infura_key() {
        let config = MochaConfig::default();
        let secrets = Secrets {
            private_key: TEST_KEY.to_string(),
            infura_key: Some("abc123".to_string()),
        };
        let resolved = config.resolve(Some("mainnet"), &secrets).unwrap();
        assert_eq!(
            resolved.rpc_url.as_str(),
            "https://mainnet.infura.io/v3/abc123"
        );
    }

    #[test]
    fn resolve_requires_infura_key_for_mainnet() {
        let config = MochaConfig::default();
        let err = config.resolve(Some("mainnet"), &test_secrets()).unwrap_err();
        assert!(err.to_string().contains(INFURA_KEY_ENV_VAR));
    }

    #[test]
    fn resolve_rejects_invalid_private_key() {
        let config = MochaConfig::default();
        let secrets = Secrets {
            private_key: "not-a-key".to_string(),
            infura_key: None,
        };
        let err = config.resolve(None, &secrets).unwrap_err();
        assert!(matches!(err, DeployError::Config(_)));
        // The offending value must not be echoed back.
        assert!(!err.to_string().contains("not-a-key"));
    }

    #[test]
    fn resolve_rejects_malformed_url() {
        let mut config = MochaConfig::default();
        config.networks.insert(
            "broken".to_string(),
            NetworkConfig {
                url: "not a url".to_string(),
                chain_id: None,
            },
        );
        let err = config.resolve(Some("broken"), &test_secrets()).unwrap_err();
        assert!(matches!(err, DeployError::Config(_)));
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let tmp = tempdir::TempDir::new("mocha-config").expect("temp dir");
        let config = MochaConfig::load(&tmp.path().join("Mocha.toml")).expect("load");
        assert_eq!(config, MochaConfig::default());
    }

    #[test]
    fn load_layers_file_over_defaults() {
        let tmp = tempdir::TempDir::new("mocha-config").expect("temp dir");
        let path = tmp.path().join("Mocha.toml");
        std::fs::write(
            &path,
            r#"
default_network = "localhost"
fee_to = "0xfefefefefefefefefefefefefefefefefefefefe"

[networks.devnet]
url = "http://127.0.0.1:9999"
"#,
        )
        .expect("write config");

        let config = MochaConfig::load(&path).expect("load");
        assert_eq!(config.default_network, "localhost");
        assert_eq!(config.fee_to, Address::repeat_byte(0xfe));
        assert_eq!(
            config.networks["devnet"],
            NetworkConfig {
                url: "http://127.0.0.1:9999".to_string(),
                chain_id: None,
            }
        );
        // Built-in networks survive the merge.
        assert!(config.networks.contains_key("sepolia"));
        assert!(config.networks.contains_key("mainnet"));
    }

    #[test]
    fn debug_output_never_contains_key_material() {
        let secrets = Secrets {
            private_key: TEST_KEY.to_string(),
            infura_key: Some("secret-project-id".to_string()),
        };
        let printed = format!("{secrets:?}");
        assert!(!printed.contains(TEST_KEY));
        assert!(!printed.contains("secret-project-id"));

        let config = MochaConfig::default();
        let resolved = config.resolve(None, &secrets).unwrap();
        let printed = format!("{resolved:?}");
        assert!(!printed.contains(TEST_KEY));
    }
}
