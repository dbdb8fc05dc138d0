//! Event binding.
//!
//! Wires the page's listeners to the portal. Async handlers are spawned
//! with `wasm_bindgen_futures::spawn_local` and re-render when done.

use gp_portal_core::{DetectOutcome, SubmitOutcome};
use tracing::{info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::Page;
use crate::dom;

const WALLET_MISSING_NOTICE: &str = "Solana object not found! Get a Phantom Wallet 👻";

/// Helper: attach an async listener for `$event` to an element.
macro_rules! on_event_async {
    ($el:expr, $event:expr, $page:expr, $handler:expr) => {{
        let page = $page.clone();
        let cb = Closure::wrap(Box::new(move |event: web_sys::Event| {
            event.prevent_default();
            let page2 = page.clone();
            wasm_bindgen_futures::spawn_local(async move {
                $handler(&page2).await;
                page2.render();
            });
        }) as Box<dyn FnMut(_)>);
        $el.add_event_listener_with_callback($event, cb.as_ref().unchecked_ref())?;
        cb.forget();
    }};
}

/// Bind all UI event listeners. Call once after init.
pub fn bind_events(page: &Page) -> Result<(), JsValue> {
    on_event_async!(page.els.connect_btn, "click", page, on_connect);
    on_event_async!(page.els.initialize_btn, "click", page, on_initialize);
    on_event_async!(page.els.retry_btn, "click", page, on_retry);
    on_event_async!(page.els.gif_form, "submit", page, on_submit);

    // ── Input mirror ──
    {
        let page2 = page.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::Event| {
            page2.portal.set_input(&dom::get_input_value(&page2.els.gif_input));
        }) as Box<dyn FnMut(_)>);
        page.els
            .gif_input
            .add_event_listener_with_callback("input", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    Ok(())
}

/// Runs the wallet check once the page has loaded.
pub fn bind_load(page: &Page) -> Result<(), JsValue> {
    if dom::document().ready_state() == "complete" {
        let page2 = page.clone();
        wasm_bindgen_futures::spawn_local(async move {
            on_load(&page2).await;
            page2.render();
        });
        return Ok(());
    }

    let page2 = page.clone();
    let cb = Closure::wrap(Box::new(move |_: web_sys::Event| {
        let page3 = page2.clone();
        wasm_bindgen_futures::spawn_local(async move {
            on_load(&page3).await;
            page3.render();
        });
    }) as Box<dyn FnMut(_)>);
    gloo_utils::window().add_event_listener_with_callback("load", cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}

async fn on_load(page: &Page) {
    match page.portal.on_load().await {
        DetectOutcome::Missing => dom::alert(WALLET_MISSING_NOTICE),
        DetectOutcome::Present => info!("phantom wallet found"),
        DetectOutcome::Reconnected(address) => info!(%address, "phantom wallet found and connected"),
    }
}

async fn on_connect(page: &Page) {
    if let Err(err) = page.portal.connect().await {
        warn!(error = %err, "connecting to wallet failed");
    }
}

async fn on_initialize(page: &Page) {
    if let Err(err) = page.portal.initialize().await {
        warn!(error = %err, "error creating storage account");
    }
}

async fn on_retry(page: &Page) {
    page.portal.fetch().await;
}

async fn on_submit(page: &Page) {
    page.portal.set_input(&dom::get_input_value(&page.els.gif_input));
    match page.portal.submit().await {
        SubmitOutcome::Skipped => info!("empty input, nothing sent"),
        SubmitOutcome::Sent(signature) => info!(%signature, "gif submitted"),
        SubmitOutcome::Failed(reason) => warn!(%reason, "gif was not submitted"),
    }
}
