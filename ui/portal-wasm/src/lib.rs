//! GIF Portal WASM Frontend
//!
//! Connects to the Phantom wallet and shows the shared gif list kept by the
//! gif portal program. Page logic lives in `gp-portal-core`; this crate
//! binds it to the DOM.

pub mod dom;
pub mod events;
pub mod ledger;
pub mod logging;
pub mod phantom;
pub mod render;

use std::rc::Rc;

use gp_portal_core::{Portal, PortalConfig, config};
use gp_wallet::FixedAccount;
use tracing::{info, warn};
use wasm_bindgen::prelude::*;

use crate::ledger::PageLedger;
use crate::phantom::PhantomWallet;

/// Key-pair of the storage account every visitor shares.
const BASE_ACCOUNT_KEYPAIR: &str = include_str!("../assets/base_account.json");

pub type PagePortal = Portal<PhantomWallet, PageLedger>;

/// Everything an event handler needs.
#[derive(Clone)]
pub struct Page {
    pub els: dom::Elements,
    pub portal: Rc<PagePortal>,
}

impl Page {
    pub fn render(&self) {
        if let Err(err) = render::apply(&self.els, &self.portal.view()) {
            warn!(error = ?err, "render failed");
        }
    }
}

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    // Improve panic messages in the browser console
    console_error_panic_hook::set_once();
    logging::init();

    init().await
}

async fn init() -> Result<(), JsValue> {
    let config = PortalConfig::from_lookup(build_setting).map_err(js_error)?;
    let base_account = FixedAccount::from_keypair_json(BASE_ACCOUNT_KEYPAIR).map_err(js_error)?;
    info!(network = ?config.network, base_account = %base_account.address(), "starting gif portal");

    let wallet = Rc::new(PhantomWallet);
    let ledger = PageLedger::from_config(&config, &base_account, wallet.clone()).map_err(js_error)?;
    let portal = Portal::new(wallet, Rc::new(ledger), base_account.address());

    let page = Page {
        els: dom::Elements::bind()?,
        portal: Rc::new(portal),
    };
    page.render();

    events::bind_events(&page)?;
    events::bind_load(&page)?;

    Ok(())
}

/// Settings baked in when the module was built.
fn build_setting(key: &str) -> Option<String> {
    let value = match key {
        config::ENV_NETWORK => option_env!("GIF_PORTAL_NETWORK"),
        config::ENV_PROGRAM_ID => option_env!("GIF_PORTAL_PROGRAM_ID"),
        config::ENV_COMMITMENT => option_env!("GIF_PORTAL_COMMITMENT"),
        config::ENV_CONFIRM_ATTEMPTS => option_env!("GIF_PORTAL_CONFIRM_ATTEMPTS"),
        config::ENV_CONFIRM_INTERVAL_MS => option_env!("GIF_PORTAL_CONFIRM_INTERVAL_MS"),
        _ => None,
    };
    value.map(str::to_owned)
}

fn js_error(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{err:#}"))
}
