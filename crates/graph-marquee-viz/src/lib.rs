//! egui host for the right-drag marquee overlay.
//!
//! Renders a keyed network with `egui_graphs` and bolts a
//! [`graph_marquee_core::DragSelectOverlay`] onto it. Runs:
//! - Natively (via eframe)
//! - In the browser (via WASM)

mod app;
mod engine;
mod input;
mod sample;
mod settings;
mod ui;

pub use app::MarqueeGraphApp;
pub use engine::EguiGraphEngine;
pub use input::{CanvasContainer, PointerTranslator};
pub use sample::{create_sample_model, create_sample_network};
pub use ui::{CanvasTransform, PainterSurface};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{prelude::*, JsCast};

/// Start the visualization app in WASM context.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    // Better panic messages in the browser console
    console_error_panic_hook::set_once();

    let web_options = eframe::WebOptions::default();

    let canvas = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id("graph-marquee-canvas"))
        .and_then(|element| element.dyn_into::<web_sys::HtmlCanvasElement>().ok());
    let Some(canvas) = canvas else {
        web_sys::console::error_1(&"missing #graph-marquee-canvas element".into());
        return;
    };

    wasm_bindgen_futures::spawn_local(async move {
        let started = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(MarqueeGraphApp::new(cc)))),
            )
            .await;
        if let Err(err) = started {
            web_sys::console::error_1(&format!("Failed to start eframe: {:?}", err).into());
        }
    });
}

/// Check that a network JSON document is loadable (called from JavaScript before
/// setting `window.GRAPH_MARQUEE_DATA`).
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn validate_graph_json(json: &str) -> Result<(), JsValue> {
    graph_marquee_core::NetworkGraph::from_json(json)
        .map(|_| ())
        .map_err(|err| JsValue::from_str(&err.to_string()))
}
