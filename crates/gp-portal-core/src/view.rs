//! Pure mapping from page state to what the page shows.

use gp_api_types::WalletAddress;

use crate::state::{PageState, PortalState, RemoteList};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Only the "Connect to Wallet" affordance.
    Connect,
    Loading {
        address: WalletAddress,
    },
    /// Only the one-time initialization affordance.
    Initialize {
        address: WalletAddress,
    },
    Unavailable {
        address: WalletAddress,
        reason: String,
    },
    /// Submission form plus one tile per list entry.
    Gallery {
        address: WalletAddress,
        input: String,
        tiles: Vec<GifTile>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifTile {
    pub src: String,
    pub submitted_by: Option<WalletAddress>,
}

pub fn render(state: &PageState) -> View {
    let PortalState::Connected { address, list } = &state.phase else {
        return View::Connect;
    };
    let address = address.clone();

    match list {
        RemoteList::Loading => View::Loading { address },
        RemoteList::Uninitialized => View::Initialize { address },
        RemoteList::Unavailable { reason } => View::Unavailable {
            address,
            reason: reason.clone(),
        },
        RemoteList::Ready(items) => View::Gallery {
            address,
            input: state.input_value.clone(),
            tiles: items
                .iter()
                .map(|item| GifTile {
                    src: item.gif_link.clone(),
                    submitted_by: item.user_address.clone(),
                })
                .collect(),
        },
    }
}
