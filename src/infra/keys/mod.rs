//! API-key resolution.
//!
//! The Train Tracker key is either given directly or stored as an SSM
//! parameter. [`KeyStore`] resolves a parameter reference into its plaintext
//! value; [`SsmKeyStore`] implements it with AWS SSM Parameter Store.

mod ssm;

pub use ssm::SsmKeyStore;

use anyhow::Result;

/// Where the API key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeySource {
    /// The key itself.
    Plain(String),
    /// A vault reference, e.g. an SSM parameter path.
    Parameter(String),
}

/// Resolves a vault reference (e.g. an SSM parameter path) into a plaintext secret.
#[async_trait::async_trait]
pub trait KeyStore: Send + Sync {
    async fn get(&self, reference: &str) -> Result<String>;
}

impl ApiKeySource {
    pub async fn resolve(&self, store: &dyn KeyStore) -> Result<String> {
        match self {
            ApiKeySource::Plain(key) => Ok(key.clone()),
            ApiKeySource::Parameter(reference) => store.get(reference).await,
        }
    }
}
