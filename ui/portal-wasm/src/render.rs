//! Applies a [`View`] to the page.

use gp_api_types::WalletAddress;
use gp_portal_core::{GifTile, View};
use wasm_bindgen::prelude::*;

use crate::dom::{self, Elements};

pub fn apply(els: &Elements, view: &View) -> Result<(), JsValue> {
    let connected = match view {
        View::Connect => None,
        View::Loading { address }
        | View::Initialize { address }
        | View::Unavailable { address, .. }
        | View::Gallery { address, .. } => Some(address),
    };

    dom::show(&els.connect_btn, connected.is_none());
    dom::show(&els.connected_container, connected.is_some());
    dom::set_text(&els.wallet_address, &connected.map(short_address).unwrap_or_default());

    dom::show(&els.loading, matches!(view, View::Loading { .. }));
    dom::show(&els.initialize_panel, matches!(view, View::Initialize { .. }));
    dom::show(&els.unavailable_panel, matches!(view, View::Unavailable { .. }));
    dom::show(&els.gallery_panel, matches!(view, View::Gallery { .. }));

    match view {
        View::Unavailable { reason, .. } => dom::set_text(&els.unavailable_reason, reason),
        View::Gallery { input, tiles, .. } => {
            dom::set_input_value(&els.gif_input, input);
            render_tiles(els, tiles)?;
        }
        _ => {}
    }
    Ok(())
}

fn render_tiles(els: &Elements, tiles: &[GifTile]) -> Result<(), JsValue> {
    dom::clear_children(&els.gif_grid);
    for tile in tiles {
        let item = dom::create_element("div")?;
        item.set_class_name("gif-item");

        let img = dom::create_element("img")?;
        img.set_attribute("src", &tile.src)?;
        img.set_attribute("alt", &tile.src)?;
        item.append_child(&img)?;

        if let Some(by) = &tile.submitted_by {
            let caption = dom::create_element("p")?;
            caption.set_class_name("gif-owner");
            dom::set_text(&caption, &short_address(by));
            item.append_child(&caption)?;
        }
        els.gif_grid.append_child(&item)?;
    }
    Ok(())
}

fn short_address(address: &WalletAddress) -> String {
    let text = address.0.as_str();
    match (text.get(..4), text.get(text.len().saturating_sub(4)..)) {
        (Some(head), Some(tail)) if text.len() > 8 => format!("{head}…{tail}"),
        _ => text.to_owned(),
    }
}
