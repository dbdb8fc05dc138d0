use gp_api_types::{GifItem, WalletAddress};

/// Where the page is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PortalState {
    #[default]
    NoWallet,
    Connected {
        address: WalletAddress,
        list: RemoteList,
    },
}

/// What the page knows about the shared remote list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteList {
    Loading,
    /// The storage account does not exist yet.
    Uninitialized,
    /// The ledger could not be read; says nothing about whether the account exists.
    Unavailable { reason: String },
    Ready(Vec<GifItem>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageState {
    pub phase: PortalState,
    pub input_value: String,
}

impl PageState {
    pub fn address(&self) -> Option<&WalletAddress> {
        match &self.phase {
            PortalState::NoWallet => None,
            PortalState::Connected { address, .. } => Some(address),
        }
    }

    pub fn list(&self) -> Option<&RemoteList> {
        match &self.phase {
            PortalState::NoWallet => None,
            PortalState::Connected { list, .. } => Some(list),
        }
    }

    pub(crate) fn set_list(&mut self, next: RemoteList) {
        if let PortalState::Connected { list, .. } = &mut self.phase {
            *list = next;
        }
    }
}
