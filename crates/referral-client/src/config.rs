//! Host-supplied network configuration
//!
//! The page publishes contract addresses as `window.APP_CONFIG`. Keys follow
//! that object's names; unknown keys (ABIs, hex chain id, ...) are ignored.

use alloy_primitives::Address;
use serde::Deserialize;
use shared::CONFIG;

use crate::address::{canonicalize, checksummed};
use crate::error::{ClientError, Result};

/// Raw configuration as published by the host page
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(rename = "CORE")]
    pub core: String,
    #[serde(rename = "VAULT")]
    pub vault: String,
    #[serde(rename = "STAKING")]
    pub staking: String,
    #[serde(rename = "USDT")]
    pub token: String,
    #[serde(rename = "BINARY")]
    pub binary: String,
    /// Reward token, display only
    #[serde(rename = "DF", default)]
    pub reward_token: Option<String>,
    /// Overrides the built-in target chain
    #[serde(rename = "CHAIN_ID_DEC", default)]
    pub chain_id: Option<u64>,
}

/// Validated contract addresses and target chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contracts {
    pub core: Address,
    pub vault: Address,
    pub staking: Address,
    pub token: Address,
    pub binary: Address,
    pub reward_token: Option<Address>,
    pub chain_id: u64,
}

impl NetworkConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Check every address and fill in the default chain
    pub fn resolve(&self) -> Result<Contracts> {
        let address = |key: &str, value: &str| {
            canonicalize(value.trim()).map_err(|_| ClientError::Config(format!("{} is not an address: {}", key, value)))
        };

        Ok(Contracts {
            core: address("CORE", &self.core)?,
            vault: address("VAULT", &self.vault)?,
            staking: address("STAKING", &self.staking)?,
            token: address("USDT", &self.token)?,
            binary: address("BINARY", &self.binary)?,
            reward_token: self.reward_token.as_deref().map(|v| address("DF", v)).transpose()?,
            chain_id: self.chain_id.unwrap_or(CONFIG.network.chain_id),
        })
    }
}

impl Contracts {
    /// One-line summary for the page footer
    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "CORE: {} • VAULT: {} • STAKING: {} • {}: {}",
            checksummed(&self.core),
            checksummed(&self.vault),
            checksummed(&self.staking),
            CONFIG.token.symbol,
            checksummed(&self.token),
        );
        if let Some(reward) = &self.reward_token {
            line.push_str(&format!(" • {}: {}", CONFIG.token.reward_symbol, checksummed(reward)));
        }
        line
    }
}
