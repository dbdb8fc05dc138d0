mod memory;

pub use memory::InMemoryLedger;

use async_trait::async_trait;
use gp_api_types::{TxSignature, WalletAddress};
use gp_wallet::WalletError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRef {
    pub address: WalletAddress,
    pub account_type: String,
}

impl AccountRef {
    pub fn new(address: WalletAddress, account_type: &str) -> Self {
        Self {
            address,
            account_type: account_type.to_owned(),
        }
    }
}

/// A decoded on-chain account, keyed by the field names of the program interface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountRecord(Map<String, Value>);

impl AccountRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.0.get_mut(name)
    }

    /// Entries of an array field; empty when the field is absent or not an array.
    pub fn list(&self, name: &str) -> &[Value] {
        self.0
            .get(name)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AccountFetch {
    Found(AccountRecord),
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstructionRequest {
    pub name: String,
    pub payer: WalletAddress,
    pub accounts: BTreeMap<String, WalletAddress>,
    pub signers: Vec<WalletAddress>,
    pub args: Vec<Value>,
}

impl InstructionRequest {
    pub fn new(name: &str, payer: WalletAddress) -> Self {
        Self {
            name: name.to_owned(),
            payer,
            accounts: BTreeMap::new(),
            signers: Vec::new(),
            args: Vec::new(),
        }
    }

    pub fn account(mut self, role: &str, address: WalletAddress) -> Self {
        self.accounts.insert(role.to_owned(), address);
        self
    }

    pub fn signer(mut self, address: WalletAddress) -> Self {
        self.signers.push(address);
        self
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn account_address(&self, role: &str) -> Result<&WalletAddress, LedgerError> {
        self.accounts
            .get(role)
            .ok_or_else(|| LedgerError::MissingAccount(role.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("cannot decode account data: {0}")]
    Decode(String),
    #[error("unknown instruction '{0}'")]
    UnknownInstruction(String),
    #[error("unknown account type '{0}'")]
    UnknownAccountType(String),
    #[error("instruction is missing account '{0}'")]
    MissingAccount(String),
    #[error("no key-pair available for signer {0}")]
    MissingSigner(WalletAddress),
    #[error("invalid instruction argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error("transaction {0} was not confirmed in time")]
    Unconfirmed(TxSignature),
    #[error("transaction rejected: {0}")]
    Rejected(String),
}

/// Reads and mutates program accounts on a remote ledger.
///
/// Transport and RPC failures are errors; only a missing account is
/// reported as [`AccountFetch::NotFound`].
#[async_trait(?Send)]
pub trait RemoteLedgerClient {
    async fn fetch_account(&self, account: &AccountRef) -> Result<AccountFetch, LedgerError>;
    async fn submit_instruction(&self, request: InstructionRequest) -> Result<TxSignature, LedgerError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_list_tolerates_missing_and_mistyped_fields() {
        let record: AccountRecord =
            serde_json::from_value(json!({ "totalGifs": 2, "gifList": [{ "gifLink": "a" }] })).unwrap();
        assert_eq!(record.list("gifList").len(), 1);
        assert!(record.list("totalGifs").is_empty());
        assert!(record.list("absent").is_empty());
    }

    #[test]
    fn request_builder_reports_missing_roles() {
        let request = InstructionRequest::new("addGif", "payer".into())
            .account("baseAccount", "base".into())
            .arg("https://x/a.gif");

        assert_eq!(request.account_address("baseAccount").unwrap().0, "base");
        assert_eq!(
            request.account_address("user"),
            Err(LedgerError::MissingAccount("user".to_owned()))
        );
        assert_eq!(request.args, vec![json!("https://x/a.gif")]);
    }
}
