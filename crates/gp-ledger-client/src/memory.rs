use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use async_trait::async_trait;
use gp_api_types::{
    ACCOUNT_BASE, ACCOUNT_USER, APPEND_INSTRUCTION, BASE_ACCOUNT_TYPE, FIELD_GIF_LINK, FIELD_GIF_LIST,
    FIELD_USER_ADDRESS, INITIALIZE_INSTRUCTION, TxSignature, WalletAddress,
};
use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{AccountFetch, AccountRecord, AccountRef, InstructionRequest, LedgerError, RemoteLedgerClient};

/// Ledger kept in page memory. Mirrors the gif portal program closely enough
/// to run the page without a network, and is lost on reload.
#[derive(Default)]
pub struct InMemoryLedger {
    accounts: RefCell<BTreeMap<WalletAddress, AccountRecord>>,
    sequence: Cell<u64>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with an already initialized base account holding `links`.
    pub fn with_links(base_account: &WalletAddress, owner: &WalletAddress, links: &[&str]) -> Self {
        let ledger = Self::default();
        let items: Vec<Value> = links.iter().map(|link| gif_entry(link, owner)).collect();
        ledger
            .accounts
            .borrow_mut()
            .insert(base_account.clone(), base_record(items));
        ledger
    }

    pub fn account_count(&self) -> usize {
        self.accounts.borrow().len()
    }

    fn next_signature(&self, request: &InstructionRequest) -> TxSignature {
        let sequence = self.sequence.get() + 1;
        self.sequence.set(sequence);

        let mut hasher = Sha256::new();
        hasher.update(sequence.to_le_bytes());
        hasher.update(request.name.as_bytes());
        hasher.update(request.payer.0.as_bytes());
        TxSignature(format!("mem-{}", hex_lower(&hasher.finalize())))
    }

    fn initialize(&self, request: &InstructionRequest) -> Result<(), LedgerError> {
        let base = request.account_address(ACCOUNT_BASE)?;
        request.account_address(ACCOUNT_USER)?;
        if !request.signers.contains(base) {
            return Err(LedgerError::MissingSigner(base.clone()));
        }

        let mut accounts = self.accounts.borrow_mut();
        if accounts.contains_key(base) {
            return Err(LedgerError::Rejected(format!("account {base} already in use")));
        }
        accounts.insert(base.clone(), base_record(Vec::new()));
        Ok(())
    }

    fn append(&self, request: &InstructionRequest) -> Result<(), LedgerError> {
        let base = request.account_address(ACCOUNT_BASE)?;
        let user = request.account_address(ACCOUNT_USER)?;
        let link = match request.args.as_slice() {
            [Value::String(link)] => link,
            _ => {
                return Err(LedgerError::InvalidArgument(
                    "expected a single string argument".to_owned(),
                ));
            }
        };

        let mut accounts = self.accounts.borrow_mut();
        let record = accounts
            .get_mut(base)
            .ok_or_else(|| LedgerError::Rejected(format!("account {base} not initialized")))?;

        if let Some(Value::Array(list)) = record.field_mut(FIELD_GIF_LIST) {
            list.push(gif_entry(link, user));
        }
        if let Some(total) = record.field_mut("totalGifs") {
            *total = json!(total.as_u64().unwrap_or_default() + 1);
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl RemoteLedgerClient for InMemoryLedger {
    async fn fetch_account(&self, account: &AccountRef) -> Result<AccountFetch, LedgerError> {
        if account.account_type != BASE_ACCOUNT_TYPE {
            return Err(LedgerError::UnknownAccountType(account.account_type.clone()));
        }

        Ok(match self.accounts.borrow().get(&account.address) {
            Some(record) => AccountFetch::Found(record.clone()),
            None => AccountFetch::NotFound,
        })
    }

    async fn submit_instruction(&self, request: InstructionRequest) -> Result<TxSignature, LedgerError> {
        match request.name.as_str() {
            INITIALIZE_INSTRUCTION => self.initialize(&request)?,
            APPEND_INSTRUCTION => self.append(&request)?,
            other => return Err(LedgerError::UnknownInstruction(other.to_owned())),
        }

        let signature = self.next_signature(&request);
        debug!(instruction = %request.name, %signature, "in-memory instruction applied");
        Ok(signature)
    }
}

fn base_record(items: Vec<Value>) -> AccountRecord {
    let mut fields = Map::new();
    fields.insert("totalGifs".to_owned(), json!(items.len()));
    fields.insert(FIELD_GIF_LIST.to_owned(), Value::Array(items));
    AccountRecord::new(fields)
}

fn gif_entry(link: &str, user: &WalletAddress) -> Value {
    let mut entry = Map::new();
    entry.insert(FIELD_GIF_LINK.to_owned(), json!(link));
    entry.insert(FIELD_USER_ADDRESS.to_owned(), json!(user.0));
    Value::Object(entry)
}

fn hex_lower(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        output.push_str(&format!("{byte:02x}"));
    }
    output
}
