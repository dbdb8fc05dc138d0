use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const BASE_ACCOUNT_TYPE: &str = "BaseAccount";
pub const INITIALIZE_INSTRUCTION: &str = "startStuffOff";
pub const APPEND_INSTRUCTION: &str = "addGif";

pub const ACCOUNT_BASE: &str = "baseAccount";
pub const ACCOUNT_USER: &str = "user";
pub const ACCOUNT_SYSTEM_PROGRAM: &str = "systemProgram";

pub const FIELD_GIF_LIST: &str = "gifList";
pub const FIELD_GIF_LINK: &str = "gifLink";
pub const FIELD_USER_ADDRESS: &str = "userAddress";

pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct WalletAddress(pub String);

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct TxSignature(pub String);

impl fmt::Display for TxSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GifItem {
    pub gif_link: String,
    #[serde(default)]
    pub user_address: Option<WalletAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Network {
    Localnet,
    #[default]
    Devnet,
    Testnet,
    MainnetBeta,
    Custom(String),
    InMemory,
}

impl Network {
    /// JSON-RPC endpoint, `None` for the in-memory ledger.
    pub fn rpc_url(&self) -> Option<&str> {
        match self {
            Network::Localnet => Some("http://127.0.0.1:8899"),
            Network::Devnet => Some("https://api.devnet.solana.com"),
            Network::Testnet => Some("https://api.testnet.solana.com"),
            Network::MainnetBeta => Some("https://api.mainnet-beta.solana.com"),
            Network::Custom(url) => Some(url.as_str()),
            Network::InMemory => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseSettingError {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for Network {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        match value.to_ascii_lowercase().as_str() {
            "localnet" | "localhost" => Ok(Network::Localnet),
            "devnet" => Ok(Network::Devnet),
            "testnet" => Ok(Network::Testnet),
            "mainnet-beta" | "mainnet" => Ok(Network::MainnetBeta),
            "memory" | "in-memory" => Ok(Network::InMemory),
            _ if value.starts_with("http://") || value.starts_with("https://") => {
                Ok(Network::Custom(value.trim_end_matches('/').to_owned()))
            }
            _ => Err(ParseSettingError {
                kind: "network",
                value: value.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    #[default]
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl FromStr for Commitment {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(ParseSettingError {
                kind: "commitment",
                value: other.to_owned(),
            }),
        }
    }
}
