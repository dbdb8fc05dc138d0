use std::time::Duration;

use anyhow::{Context, Result};
use gp_api_types::{Commitment, Network};

pub const ENV_NETWORK: &str = "GIF_PORTAL_NETWORK";
pub const ENV_PROGRAM_ID: &str = "GIF_PORTAL_PROGRAM_ID";
pub const ENV_COMMITMENT: &str = "GIF_PORTAL_COMMITMENT";
pub const ENV_CONFIRM_ATTEMPTS: &str = "GIF_PORTAL_CONFIRM_ATTEMPTS";
pub const ENV_CONFIRM_INTERVAL_MS: &str = "GIF_PORTAL_CONFIRM_INTERVAL_MS";

pub const DEFAULT_CONFIRM_ATTEMPTS: u32 = 30;
pub const DEFAULT_CONFIRM_INTERVAL_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub network: Network,
    /// Overrides the program address recorded in the IDL.
    pub program_id: Option<String>,
    pub commitment: Commitment,
    pub confirm_attempts: u32,
    pub confirm_interval: Duration,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            program_id: None,
            commitment: Commitment::default(),
            confirm_attempts: DEFAULT_CONFIRM_ATTEMPTS,
            confirm_interval: Duration::from_millis(DEFAULT_CONFIRM_INTERVAL_MS),
        }
    }
}

impl PortalConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = read(ENV_NETWORK) {
            config.network = raw.parse::<Network>().with_context(|| format!("invalid {ENV_NETWORK}"))?;
        }
        if let Some(raw) = read(ENV_PROGRAM_ID) {
            config.program_id = Some(raw.trim().to_owned());
        }
        if let Some(raw) = read(ENV_COMMITMENT) {
            config.commitment = raw.parse::<Commitment>().with_context(|| format!("invalid {ENV_COMMITMENT}"))?;
        }
        if let Some(raw) = read(ENV_CONFIRM_ATTEMPTS) {
            config.confirm_attempts = raw
                .trim()
                .parse()
                .with_context(|| format!("invalid {ENV_CONFIRM_ATTEMPTS} '{raw}'"))?;
        }
        if let Some(raw) = read(ENV_CONFIRM_INTERVAL_MS) {
            let millis: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("invalid {ENV_CONFIRM_INTERVAL_MS} '{raw}'"))?;
            config.confirm_interval = Duration::from_millis(millis);
        }

        Ok(config)
    }
}
