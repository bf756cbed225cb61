use secrecy::{ExposeSecret, Secret};
use std::env;

use crate::error::ReplyError;

pub const API_KEY_VAR: &str = "AZURE_OPENAI_API_KEY";
pub const ENDPOINT_VAR: &str = "AZURE_OPENAI_ENDPOINT";
pub const DEPLOYMENT_VAR: &str = "AZURE_OPENAI_DEPLOYMENT_NAME";

pub const API_VERSION: &str = "2024-02-01";

/// Connection settings for the Azure OpenAI deployment.
///
/// Read fresh for every reply request; nothing is cached between requests.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_key: Secret<String>,
    pub endpoint: String,
    pub deployment: String,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ReplyError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ReplyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ReplyError::Configuration { var })
        };

        Ok(Self {
            api_key: Secret::new(required(API_KEY_VAR)?),
            endpoint: required(ENDPOINT_VAR)?,
            deployment: required(DEPLOYMENT_VAR)?,
        })
    }

    pub fn masked_api_key(&self) -> String {
        mask_secret(self.api_key.expose_secret())
    }
}

pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= 8 {
        return "****".to_string();
    }
    let prefix: String = secret.chars().take(4).collect();
    format!("{}****", prefix)
}
