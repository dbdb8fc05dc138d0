pub mod codec;
pub mod idl;
mod rpc;

pub use codec::CodecError;
pub use idl::{GIF_PORTAL_IDL, Idl};

use std::cell::Cell;
use std::rc::Rc;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use gp_api_types::{Commitment, TxSignature, WalletAddress};
use gp_ledger_client::{AccountFetch, AccountRef, InstructionRequest, LedgerError, RemoteLedgerClient};
use gp_wallet::{FixedAccount, WalletError, WalletProvider};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use solana_sdk::hash::Hash;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;
use tracing::{debug, info, warn};

use crate::rpc::{Contextual, LatestBlockhash, RpcRequest, RpcResponse, SignatureStatus, UiAccount};

/// How long to wait for a sent transaction to reach the client's commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for ConfirmPolicy {
    fn default() -> Self {
        Self {
            attempts: 30,
            interval: Duration::from_millis(500),
        }
    }
}

/// Anchor program client over Solana JSON-RPC.
///
/// Transactions are paid for and finally signed by the connected wallet;
/// key-pairs registered with [`AnchorRpcClient::with_signer`] co-sign when
/// an instruction names them as signers.
pub struct AnchorRpcClient<W> {
    endpoint: String,
    program_id: Pubkey,
    idl: Idl,
    commitment: Commitment,
    confirm: ConfirmPolicy,
    signers: Vec<Keypair>,
    wallet: Rc<W>,
    http: reqwest::Client,
    next_id: Cell<u64>,
}

impl<W: WalletProvider> AnchorRpcClient<W> {
    /// Targets the program address recorded in the IDL metadata.
    pub fn new(endpoint: &str, idl: Idl, wallet: Rc<W>) -> anyhow::Result<Self> {
        let address = idl
            .program_address()
            .ok_or_else(|| anyhow!("IDL '{}' carries no program address", idl.name))?;
        let program_id = Pubkey::from_str(address).with_context(|| format!("invalid program id '{address}'"))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            program_id,
            idl,
            commitment: Commitment::default(),
            confirm: ConfirmPolicy::default(),
            signers: Vec::new(),
            wallet,
            http: reqwest::Client::new(),
            next_id: Cell::new(1),
        })
    }

    pub fn with_program_id(mut self, program_id: &str) -> anyhow::Result<Self> {
        self.program_id =
            Pubkey::from_str(program_id).with_context(|| format!("invalid program id '{program_id}'"))?;
        Ok(self)
    }

    pub fn with_commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = commitment;
        self
    }

    pub fn with_confirmation(mut self, confirm: ConfirmPolicy) -> Self {
        self.confirm = confirm;
        self
    }

    pub fn with_signer(mut self, account: &FixedAccount) -> anyhow::Result<Self> {
        #[allow(deprecated)]
        let keypair = Keypair::from_bytes(&account.keypair_bytes()[..])
            .map_err(|err| anyhow!("cannot load signer {}: {err}", account.address()))?;
        self.signers.push(keypair);
        Ok(self)
    }

    pub fn program_id(&self) -> String {
        self.program_id.to_string()
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, LedgerError> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        debug!(%method, id, endpoint = %self.endpoint, "rpc call");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|err| LedgerError::Transport(format!("{method}: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LedgerError::Transport(format!("{method} HTTP {status}: {text}")));
        }

        let body: RpcResponse<T> = response
            .json()
            .await
            .map_err(|err| LedgerError::Decode(format!("{method} response: {err}")))?;
        body.into_result()
    }

    async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
        let latest: Contextual<LatestBlockhash> = self
            .call("getLatestBlockhash", json!([{ "commitment": self.commitment.as_str() }]))
            .await?;
        Hash::from_str(&latest.value.blockhash)
            .map_err(|err| LedgerError::Decode(format!("blockhash '{}': {err}", latest.value.blockhash)))
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<TxSignature, LedgerError> {
        let wire = bincode::serialize(transaction)
            .map_err(|err| LedgerError::InvalidArgument(format!("transaction encoding: {err}")))?;
        let signature: String = self
            .call(
                "sendTransaction",
                json!([
                    STANDARD.encode(&wire),
                    { "encoding": "base64", "preflightCommitment": self.commitment.as_str() }
                ]),
            )
            .await?;
        debug!(%signature, bytes = wire.len(), "transaction sent");
        Ok(TxSignature(signature))
    }

    async fn await_confirmation(&self, signature: &TxSignature) -> Result<(), LedgerError> {
        if self.confirm.attempts == 0 {
            return Ok(());
        }

        for attempt in 1..=self.confirm.attempts {
            let statuses: Contextual<Vec<Option<SignatureStatus>>> = self
                .call("getSignatureStatuses", json!([[signature.0]]))
                .await?;

            if let Some(Some(status)) = statuses.value.first() {
                if let Some(err) = &status.err {
                    return Err(LedgerError::Rejected(err.to_string()));
                }
                if status.reached(self.commitment) {
                    debug!(%signature, attempt, "transaction confirmed");
                    return Ok(());
                }
            }
            pause(self.confirm.interval).await;
        }

        warn!(%signature, attempts = self.confirm.attempts, "transaction not confirmed");
        Err(LedgerError::Unconfirmed(signature.clone()))
    }

    fn build_instruction(&self, request: &InstructionRequest) -> Result<Instruction, LedgerError> {
        let definition = self
            .idl
            .instruction(&request.name)
            .ok_or_else(|| LedgerError::UnknownInstruction(request.name.clone()))?;

        let accounts = definition
            .accounts
            .iter()
            .map(|item| {
                let key = parse_pubkey(request.account_address(&item.name)?)?;
                Ok(if item.is_mut {
                    AccountMeta::new(key, item.is_signer)
                } else {
                    AccountMeta::new_readonly(key, item.is_signer)
                })
            })
            .collect::<Result<Vec<_>, LedgerError>>()?;

        let data = codec::encode_instruction(&self.idl, definition, &request.args)
            .map_err(|err| LedgerError::InvalidArgument(err.to_string()))?;

        Ok(Instruction {
            program_id: self.program_id,
            accounts,
            data,
        })
    }

    fn local_signers(&self, request: &InstructionRequest) -> Result<Vec<&Keypair>, LedgerError> {
        request
            .signers
            .iter()
            .map(|address| {
                let key = parse_pubkey(address)?;
                self.signers
                    .iter()
                    .find(|keypair| keypair.pubkey() == key)
                    .ok_or_else(|| LedgerError::MissingSigner(address.clone()))
            })
            .collect()
    }
}

#[async_trait(?Send)]
impl<W: WalletProvider> RemoteLedgerClient for AnchorRpcClient<W> {
    async fn fetch_account(&self, account: &AccountRef) -> Result<AccountFetch, LedgerError> {
        if self.idl.account(&account.account_type).is_none() {
            return Err(LedgerError::UnknownAccountType(account.account_type.clone()));
        }

        let info: Contextual<Option<UiAccount>> = self
            .call(
                "getAccountInfo",
                json!([account.address.0, { "encoding": "base64", "commitment": self.commitment.as_str() }]),
            )
            .await?;

        let Some(ui_account) = info.value else {
            return Ok(AccountFetch::NotFound);
        };

        if ui_account.owner != self.program_id.to_string() {
            return Err(LedgerError::Decode(format!(
                "account {} is owned by {}, not the program",
                account.address, ui_account.owner
            )));
        }

        let data = STANDARD
            .decode(ui_account.data.0.as_bytes())
            .map_err(|err| LedgerError::Decode(format!("account data: {err}")))?;
        let record = codec::decode_account(&self.idl, &account.account_type, &data)
            .map_err(|err| LedgerError::Decode(err.to_string()))?;

        Ok(AccountFetch::Found(record))
    }

    async fn submit_instruction(&self, request: InstructionRequest) -> Result<TxSignature, LedgerError> {
        let instruction = self.build_instruction(&request)?;
        let co_signers = self.local_signers(&request)?;
        let payer = parse_pubkey(&request.payer)?;

        let blockhash = self.latest_blockhash().await?;
        let message = Message::new_with_blockhash(&[instruction], Some(&payer), &blockhash);
        let mut transaction = Transaction::new_unsigned(message);
        if !co_signers.is_empty() {
            transaction
                .try_partial_sign(&co_signers[..], blockhash)
                .map_err(|err| LedgerError::InvalidArgument(format!("co-signing failed: {err}")))?;
        }

        info!(instruction = %request.name, payer = %request.payer, "requesting wallet signature");
        let wallet_signature = self.wallet.sign_transaction(&transaction.message_data()).await?;
        attach_signature(&mut transaction, &payer, &wallet_signature)?;

        let signature = self.send_transaction(&transaction).await?;
        self.await_confirmation(&signature).await?;
        info!(instruction = %request.name, %signature, "instruction confirmed");

        Ok(signature)
    }
}

/// Places the payer's signature in its slot and checks every slot verifies.
fn attach_signature(transaction: &mut Transaction, payer: &Pubkey, signature: &[u8; 64]) -> Result<(), LedgerError> {
    let required = usize::from(transaction.message.header.num_required_signatures);
    let slot = transaction.message.account_keys[..required]
        .iter()
        .position(|key| key == payer)
        .ok_or_else(|| LedgerError::MissingSigner(WalletAddress(payer.to_string())))?;
    transaction.signatures[slot] = Signature::try_from(&signature[..])
        .map_err(|err| LedgerError::Wallet(WalletError::Provider(format!("wallet signature: {err}"))))?;

    transaction
        .verify()
        .map_err(|err| LedgerError::Wallet(WalletError::Provider(format!("signatures do not verify: {err}"))))
}

fn parse_pubkey(address: &WalletAddress) -> Result<Pubkey, LedgerError> {
    Pubkey::from_str(&address.0).map_err(|_| LedgerError::InvalidArgument(format!("invalid address '{address}'")))
}

#[cfg(not(target_arch = "wasm32"))]
async fn pause(interval: Duration) {
    tokio::time::sleep(interval).await;
}

#[cfg(target_arch = "wasm32")]
async fn pause(interval: Duration) {
    gloo_timers::future::sleep(interval).await;
}
