use std::cell::RefCell;
use std::rc::Rc;

use gp_api_types::{
    ACCOUNT_BASE, ACCOUNT_SYSTEM_PROGRAM, ACCOUNT_USER, APPEND_INSTRUCTION, BASE_ACCOUNT_TYPE, FIELD_GIF_LINK,
    FIELD_GIF_LIST, FIELD_USER_ADDRESS, GifItem, INITIALIZE_INSTRUCTION, SYSTEM_PROGRAM_ID, TxSignature,
    WalletAddress,
};
use gp_ledger_client::{AccountFetch, AccountRecord, AccountRef, InstructionRequest, RemoteLedgerClient};
use gp_wallet::{WalletPresence, WalletProvider};
use serde_json::Value;
use tracing::{info, warn};

use crate::PortalError;
use crate::state::{PageState, PortalState, RemoteList};
use crate::view::{self, View};

/// Result of the wallet check run when the page loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectOutcome {
    /// No recognized wallet; the page should tell the user to get one.
    Missing,
    /// A wallet is installed but has not trusted this page yet.
    Present,
    Reconnected(WalletAddress),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was sent: empty input or no connected wallet.
    Skipped,
    Sent(TxSignature),
    Failed(String),
}

/// Page controller. Every instance reads and appends to the same storage
/// account, `base_account`.
///
/// State is only borrowed between await points, so handlers may
/// interleave on the event loop without panicking.
pub struct Portal<W, L> {
    wallet: Rc<W>,
    ledger: Rc<L>,
    base_account: WalletAddress,
    state: RefCell<PageState>,
}

impl<W, L> Portal<W, L>
where
    W: WalletProvider,
    L: RemoteLedgerClient,
{
    pub fn new(wallet: Rc<W>, ledger: Rc<L>, base_account: WalletAddress) -> Self {
        Self {
            wallet,
            ledger,
            base_account,
            state: RefCell::new(PageState::default()),
        }
    }

    pub fn base_account(&self) -> &WalletAddress {
        &self.base_account
    }

    pub fn snapshot(&self) -> PageState {
        self.with(PageState::clone)
    }

    pub fn view(&self) -> View {
        self.with(view::render)
    }

    pub async fn on_load(&self) -> DetectOutcome {
        match self.wallet.detect() {
            WalletPresence::Absent | WalletPresence::Unrecognized => {
                warn!("no recognized wallet found");
                return DetectOutcome::Missing;
            }
            WalletPresence::Recognized => info!("wallet found"),
        }

        match self.wallet.connect_trusted().await {
            Ok(address) => {
                info!(%address, "reconnected with trusted wallet");
                self.store_address(address.clone());
                self.fetch().await;
                DetectOutcome::Reconnected(address)
            }
            Err(err) => {
                info!(error = %err, "wallet did not reconnect silently");
                DetectOutcome::Present
            }
        }
    }

    pub async fn connect(&self) -> Result<WalletAddress, PortalError> {
        let address = self.wallet.connect().await?;
        info!(%address, "connected with wallet");
        self.store_address(address.clone());
        self.fetch().await;
        Ok(address)
    }

    pub fn set_input(&self, value: &str) {
        self.with_mut(|state| state.input_value = value.to_owned());
    }

    /// Reloads the shared list. Does nothing until a wallet is connected.
    pub async fn fetch(&self) {
        if self.with(|state| state.address().is_none()) {
            return;
        }
        self.with_mut(|state| state.set_list(RemoteList::Loading));

        let account = AccountRef::new(self.base_account.clone(), BASE_ACCOUNT_TYPE);
        let next = match self.ledger.fetch_account(&account).await {
            Ok(AccountFetch::Found(record)) => RemoteList::Ready(gif_items(&record)),
            Ok(AccountFetch::NotFound) => {
                info!(account = %self.base_account, "storage account not initialized");
                RemoteList::Uninitialized
            }
            Err(err) => {
                warn!(account = %self.base_account, error = %err, "failed to fetch gif list");
                RemoteList::Unavailable {
                    reason: err.to_string(),
                }
            }
        };
        self.with_mut(|state| state.set_list(next));
    }

    /// Creates the storage account, signed by its own key-pair and paid by the wallet.
    pub async fn initialize(&self) -> Result<TxSignature, PortalError> {
        let user = self.connected_address()?;
        let request = InstructionRequest::new(INITIALIZE_INSTRUCTION, user.clone())
            .account(ACCOUNT_BASE, self.base_account.clone())
            .account(ACCOUNT_USER, user)
            .account(ACCOUNT_SYSTEM_PROGRAM, SYSTEM_PROGRAM_ID.into())
            .signer(self.base_account.clone());

        let signature = self.ledger.submit_instruction(request).await?;
        info!(account = %self.base_account, %signature, "created storage account");
        self.fetch().await;
        Ok(signature)
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let Some(user) = self.with(|state| state.address().cloned()) else {
            return SubmitOutcome::Skipped;
        };
        let link = self.with(|state| state.input_value.clone());
        if link.is_empty() {
            info!("no gif link given");
            return SubmitOutcome::Skipped;
        }
        self.with_mut(|state| state.input_value.clear());

        let request = InstructionRequest::new(APPEND_INSTRUCTION, user.clone())
            .account(ACCOUNT_BASE, self.base_account.clone())
            .account(ACCOUNT_USER, user)
            .arg(link.as_str());

        match self.ledger.submit_instruction(request).await {
            Ok(signature) => {
                info!(%link, %signature, "gif sent to program");
                self.fetch().await;
                SubmitOutcome::Sent(signature)
            }
            Err(err) => {
                warn!(%link, error = %err, "error sending gif");
                SubmitOutcome::Failed(err.to_string())
            }
        }
    }

    fn connected_address(&self) -> Result<WalletAddress, PortalError> {
        self.with(|state| state.address().cloned())
            .ok_or(PortalError::NotConnected)
    }

    fn store_address(&self, address: WalletAddress) {
        self.with_mut(|state| {
            state.phase = PortalState::Connected {
                address,
                list: RemoteList::Loading,
            }
        });
    }

    fn with<R>(&self, f: impl FnOnce(&PageState) -> R) -> R {
        f(&self.state.borrow())
    }

    fn with_mut<R>(&self, f: impl FnOnce(&mut PageState) -> R) -> R {
        f(&mut self.state.borrow_mut())
    }
}

fn gif_items(record: &AccountRecord) -> Vec<GifItem> {
    record
        .list(FIELD_GIF_LIST)
        .iter()
        .filter_map(|entry| {
            let Some(link) = entry.get(FIELD_GIF_LINK).and_then(Value::as_str) else {
                warn!(?entry, "skipping list entry without a gif link");
                return None;
            };
            Some(GifItem {
                gif_link: link.to_owned(),
                user_address: entry
                    .get(FIELD_USER_ADDRESS)
                    .and_then(Value::as_str)
                    .map(WalletAddress::from),
            })
        })
        .collect()
}
