//! Page logic of the gif portal, independent of the browser.
//!
//! [`Portal`] drives the page through an explicit [`PortalState`]; the
//! wallet and the ledger are injected behind [`WalletProvider`] and
//! [`RemoteLedgerClient`] so the same flow runs against Phantom and a
//! deployed program, the in-memory ledger, or test doubles.
//!
//! [`WalletProvider`]: gp_wallet::WalletProvider
//! [`RemoteLedgerClient`]: gp_ledger_client::RemoteLedgerClient

pub mod config;
mod portal;
mod state;
pub mod view;

pub use config::PortalConfig;
pub use portal::{DetectOutcome, Portal, SubmitOutcome};
pub use state::{PageState, PortalState, RemoteList};
pub use view::{GifTile, View, render};

use gp_ledger_client::LedgerError;
use gp_wallet::WalletError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortalError {
    #[error("no wallet connected")]
    NotConnected,
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
