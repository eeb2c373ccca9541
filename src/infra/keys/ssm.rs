use anyhow::{Context, Result, bail};

use super::KeyStore;

/// Reads secrets from AWS SSM Parameter Store, with decryption, so the
/// Train Tracker key can live in a `SecureString` parameter.
pub struct SsmKeyStore {
    client: aws_sdk_ssm::Client,
}

impl SsmKeyStore {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_ssm::Client::new(config),
        }
    }
}

#[async_trait::async_trait]
impl KeyStore for SsmKeyStore {
    async fn get(&self, reference: &str) -> Result<String> {
        let resp = self
            .client
            .get_parameter()
            .name(reference)
            .with_decryption(true)
            .send()
            .await
            .with_context(|| format!("SSM GetParameter failed for '{reference}'"))?;

        parameter_value(reference, resp.parameter.and_then(|p| p.value))
    }
}

/// The trimmed key. A missing or blank parameter is an error, not an empty key.
fn parameter_value(reference: &str, value: Option<String>) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key.to_string()),
        _ => bail!("SSM parameter '{reference}' has no Train Tracker key"),
    }
}
