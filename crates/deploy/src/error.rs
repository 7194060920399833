//! Errors surfaced by the deployment pipeline.
//!
//! Nothing here is caught or retried inside the library: every variant
//! propagates to the process boundary, where the binary prints it and
//! exits non-zero.

use thiserror::Error;

/// Errors that can occur while configuring, planning, or executing a
/// deployment.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Missing or malformed configuration (network, endpoint, credentials).
    #[error("configuration error: {0}")]
    Config(String),

    /// A compiled contract artifact is missing or unusable.
    #[error("artifact error: {0}")]
    Artifact(String),

    /// The address registry file could not be read or written.
    #[error("registry error: {0}")]
    Registry(String),

    /// A constructor argument refers to a contract with no recorded
    /// address on the active network.
    #[error(
        "dependency `{dependency}` of `{contract}` has no recorded address on network `{network}`"
    )]
    DependencyUnresolved {
        contract: String,
        dependency: String,
        network: String,
    },

    /// The declared dependencies of the given specs cannot be ordered.
    #[error("dependency cycle involving `{0}`")]
    DependencyCycle(String),

    /// The creation transaction was rejected by the chain client, e.g.
    /// insufficient funds or a nonce conflict.
    #[error("failed to submit creation transaction for `{contract}`: {reason}")]
    Submission { contract: String, reason: String },

    /// The client failed while awaiting inclusion, or the transaction was
    /// included but did not create a contract.
    #[error("failed awaiting confirmation for `{contract}`: {reason}")]
    Confirmation { contract: String, reason: String },

    /// A read-only call against a deployed contract failed.
    #[error("call to `{contract}` failed: {reason}")]
    ContractCall { contract: String, reason: String },
}
