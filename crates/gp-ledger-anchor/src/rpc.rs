//! Solana JSON-RPC wire types.

use gp_api_types::Commitment;
use gp_ledger_client::LedgerError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl<T> RpcResponse<T> {
    pub(crate) fn into_result(self) -> Result<T, LedgerError> {
        if let Some(err) = self.error {
            return Err(LedgerError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        self.result
            .ok_or_else(|| LedgerError::Decode("rpc response carries neither result nor error".to_owned()))
    }
}

/// Results wrapped with the slot they were observed at.
#[derive(Debug, Deserialize)]
pub(crate) struct Contextual<T> {
    pub value: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UiAccount {
    /// `[payload, encoding]`
    pub data: (String, String),
    pub owner: String,
    #[allow(dead_code)]
    pub lamports: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LatestBlockhash {
    pub blockhash: String,
    #[allow(dead_code)]
    pub last_valid_block_height: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignatureStatus {
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub confirmation_status: Option<Commitment>,
}

impl SignatureStatus {
    pub(crate) fn reached(&self, commitment: Commitment) -> bool {
        self.confirmation_status
            .is_some_and(|status| status >= commitment)
    }
}
