#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use async_trait::async_trait;
use gp_api_types::{TxSignature, WalletAddress};
use gp_ledger_client::{AccountFetch, AccountRecord, AccountRef, InstructionRequest, LedgerError, RemoteLedgerClient};
use gp_wallet::{WalletError, WalletPresence, WalletProvider};
use serde_json::json;

pub const BASE: &str = "7adnu6N4MHUUsTmH6Vy4BFSLnXyQjz4bNHVp6BHdBiuU";

pub struct MockWallet {
    pub presence: WalletPresence,
    pub address: Result<WalletAddress, WalletError>,
    pub trusted: Result<WalletAddress, WalletError>,
    pub connects: Cell<usize>,
}

impl MockWallet {
    pub fn approving(address: &str) -> Self {
        Self {
            presence: WalletPresence::Recognized,
            address: Ok(address.into()),
            trusted: Err(WalletError::NotTrusted),
            connects: Cell::new(0),
        }
    }

    pub fn trusting(address: &str) -> Self {
        Self {
            trusted: Ok(address.into()),
            ..Self::approving(address)
        }
    }

    pub fn rejecting() -> Self {
        Self {
            address: Err(WalletError::Rejected("User rejected the request.".to_owned())),
            ..Self::approving("unused")
        }
    }

    pub fn absent() -> Self {
        Self {
            presence: WalletPresence::Absent,
            address: Err(WalletError::Absent),
            trusted: Err(WalletError::Absent),
            connects: Cell::new(0),
        }
    }
}

#[async_trait(?Send)]
impl WalletProvider for MockWallet {
    fn detect(&self) -> WalletPresence {
        self.presence
    }

    async fn connect(&self) -> Result<WalletAddress, WalletError> {
        self.connects.set(self.connects.get() + 1);
        self.address.clone()
    }

    async fn connect_trusted(&self) -> Result<WalletAddress, WalletError> {
        self.trusted.clone()
    }

    async fn sign_transaction(&self, _message: &[u8]) -> Result<[u8; 64], WalletError> {
        Err(WalletError::Provider("mock wallet does not sign".to_owned()))
    }
}

/// Replays scripted answers and records every call it receives.
#[derive(Default)]
pub struct ScriptedLedger {
    fetches: RefCell<VecDeque<Result<AccountFetch, LedgerError>>>,
    submits: RefCell<VecDeque<Result<TxSignature, LedgerError>>>,
    pub fetched: RefCell<Vec<AccountRef>>,
    pub submitted: RefCell<Vec<InstructionRequest>>,
}

impl ScriptedLedger {
    pub fn on_fetch(self, answer: Result<AccountFetch, LedgerError>) -> Self {
        self.fetches.borrow_mut().push_back(answer);
        self
    }

    pub fn on_submit(self, answer: Result<TxSignature, LedgerError>) -> Self {
        self.submits.borrow_mut().push_back(answer);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetched.borrow().len()
    }

    pub fn submit_count(&self) -> usize {
        self.submitted.borrow().len()
    }
}

#[async_trait(?Send)]
impl RemoteLedgerClient for ScriptedLedger {
    async fn fetch_account(&self, account: &AccountRef) -> Result<AccountFetch, LedgerError> {
        self.fetched.borrow_mut().push(account.clone());
        self.fetches
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(LedgerError::Transport("no scripted fetch left".to_owned())))
    }

    async fn submit_instruction(&self, request: InstructionRequest) -> Result<TxSignature, LedgerError> {
        self.submitted.borrow_mut().push(request);
        self.submits
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(LedgerError::Transport("no scripted submit left".to_owned())))
    }
}

pub fn found(links: &[&str]) -> Result<AccountFetch, LedgerError> {
    let list: Vec<_> = links
        .iter()
        .map(|link| json!({ "gifLink": link, "userAddress": "ABC123" }))
        .collect();
    let record: AccountRecord =
        serde_json::from_value(json!({ "totalGifs": links.len(), "gifList": list })).expect("record");
    Ok(AccountFetch::Found(record))
}

pub fn signature(value: &str) -> Result<TxSignature, LedgerError> {
    Ok(TxSignature(value.to_owned()))
}
