//! Ledger selection by network.

use std::rc::Rc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use gp_api_types::TxSignature;
use gp_ledger_anchor::{AnchorRpcClient, ConfirmPolicy, Idl};
use gp_ledger_client::{AccountFetch, AccountRef, InMemoryLedger, InstructionRequest, LedgerError, RemoteLedgerClient};
use gp_portal_core::PortalConfig;
use gp_wallet::FixedAccount;
use tracing::info;

use crate::phantom::PhantomWallet;

pub enum PageLedger {
    Memory(InMemoryLedger),
    Anchor(AnchorRpcClient<PhantomWallet>),
}

impl PageLedger {
    pub fn from_config(config: &PortalConfig, base_account: &FixedAccount, wallet: Rc<PhantomWallet>) -> Result<Self> {
        let Some(endpoint) = config.network.rpc_url() else {
            info!("using in-memory ledger; the list is lost on reload");
            return Ok(PageLedger::Memory(InMemoryLedger::new()));
        };

        let idl = Idl::gif_portal().context("bundled program IDL is invalid")?;
        let mut client = AnchorRpcClient::new(endpoint, idl, wallet)?
            .with_commitment(config.commitment)
            .with_confirmation(ConfirmPolicy {
                attempts: config.confirm_attempts,
                interval: config.confirm_interval,
            })
            .with_signer(base_account)?;
        if let Some(program_id) = &config.program_id {
            client = client.with_program_id(program_id)?;
        }

        info!(%endpoint, program = %client.program_id(), "using program client");
        Ok(PageLedger::Anchor(client))
    }
}

#[async_trait(?Send)]
impl RemoteLedgerClient for PageLedger {
    async fn fetch_account(&self, account: &AccountRef) -> Result<AccountFetch, LedgerError> {
        match self {
            PageLedger::Memory(ledger) => ledger.fetch_account(account).await,
            PageLedger::Anchor(client) => client.fetch_account(account).await,
        }
    }

    async fn submit_instruction(&self, request: InstructionRequest) -> Result<TxSignature, LedgerError> {
        match self {
            PageLedger::Memory(ledger) => ledger.submit_instruction(request).await,
            PageLedger::Anchor(client) => client.submit_instruction(request).await,
        }
    }
}
