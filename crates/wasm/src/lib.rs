//! WASM bridge: JSON in, JSON out. The web embedding parses events on
//! its side of the boundary only once, then re-runs layout on viewport
//! or zoom changes.

use wasm_bindgen::prelude::*;

use chronocard_core::{LayoutEngine, input::parse_events};
use chronocard_protocol::{LayoutConfig, ViewWindow};

/// Lay out events (a JSON array of `{id, date, title, description?}`)
/// for the given viewport, returning the `LayoutResult` as JSON.
///
/// `view_start`/`view_end` are fractions of the full temporal range;
/// pass `0.0` and `1.0` for an unzoomed view.
#[wasm_bindgen]
pub fn layout_events(
    events_json: &str,
    width: f64,
    height: f64,
    view_start: f64,
    view_end: f64,
) -> Result<String, JsError> {
    let events =
        parse_events(events_json.as_bytes()).map_err(|e| JsError::new(&e.to_string()))?;

    let config = LayoutConfig::for_viewport(width, height);
    let mut engine = LayoutEngine::new(config).map_err(|e| JsError::new(&e.to_string()))?;

    let window = ViewWindow::new(view_start, view_end);
    let result = engine.layout(&events, (!window.is_full()).then_some(window));

    serde_json::to_string(&result).map_err(|e| JsError::new(&e.to_string()))
}

/// Default configuration for a viewport, as JSON, so the embedding can
/// display or tweak the constants it will pass back in.
#[wasm_bindgen]
pub fn default_config(width: f64, height: f64) -> Result<String, JsError> {
    serde_json::to_string(&LayoutConfig::for_viewport(width, height))
        .map_err(|e| JsError::new(&e.to_string()))
}
