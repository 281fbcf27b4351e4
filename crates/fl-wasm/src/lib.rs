//! WebAssembly bindings for Filterlink
//!
//! The background worker owns one [`FilterTracker`] and forwards the browser
//! events to it; the popup uses the free functions to build and read links.

use std::collections::HashSet;

use log::LevelFilter;
use wasm_bindgen::prelude::*;

use fl_core::{ActiveTab, FilterSet, Timestamp, TrackerConfig};
use fl_url::{codec, scraped, Tracker};

mod console;
mod storage;

pub use storage::JsStorageSink;

fn timestamp(now_ms: f64) -> Timestamp {
    Timestamp::from_millis(now_ms.max(0.0) as u64)
}

fn js_error(context: &str, e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, e))
}

fn filters_from_js(filters: JsValue) -> Result<FilterSet, JsValue> {
    serde_wasm_bindgen::from_value(filters).map_err(|e| js_error("Invalid filter set", e))
}

fn optional_filters_from_js(filters: JsValue) -> Result<Option<FilterSet>, JsValue> {
    if filters.is_undefined() || filters.is_null() {
        return Ok(None);
    }
    filters_from_js(filters).map(Some)
}

fn config_from_js(config: JsValue) -> Result<TrackerConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(TrackerConfig::default());
    }
    serde_wasm_bindgen::from_value(config).map_err(|e| js_error("Invalid tracker config", e))
}

// =============================================================================
// Tracker
// =============================================================================

/// Per-tab filter tracker living in the background worker.
#[wasm_bindgen]
pub struct FilterTracker {
    inner: Tracker<JsStorageSink>,
}

#[wasm_bindgen]
impl FilterTracker {
    /// `persist(key, snapshot)` is called after every state change.
    /// `saved_snapshot` is the JSON previously stored under the storage key.
    #[wasm_bindgen(constructor)]
    pub fn new(
        persist: js_sys::Function,
        saved_snapshot: Option<String>,
        config: JsValue,
    ) -> Result<FilterTracker, JsValue> {
        let config = config_from_js(config)?;
        Ok(Self {
            inner: Tracker::new(config, JsStorageSink::new(persist, saved_snapshot)),
        })
    }

    /// `webRequest.onBeforeRequest`. Returns whether tab state changed.
    pub fn on_before_request(&mut self, url: &str, tab_id: i32, now_ms: f64) -> bool {
        self.inner.on_request(url, tab_id, timestamp(now_ms))
    }

    /// `tabs.onUpdated` with a new URL. Returns the navigation outcome name.
    pub fn on_tab_updated(&mut self, tab_id: i32, url: &str, now_ms: f64) -> String {
        self.inner
            .on_navigated(tab_id, url, timestamp(now_ms))
            .as_str()
            .to_string()
    }

    /// `tabs.onRemoved`.
    pub fn on_tab_removed(&mut self, tab_id: i32) -> bool {
        self.inner.on_tab_closed(tab_id)
    }

    /// Drop state for tabs that no longer exist. Called once on startup.
    pub fn prune_stale(&mut self, live_tab_ids: Vec<i32>) -> u32 {
        let live: HashSet<i32> = live_tab_ids.into_iter().collect();
        self.inner.prune_stale(&live) as u32
    }

    /// Answer the popup's `getFilters` message.
    pub fn get_filters(
        &self,
        active_tab_id: Option<i32>,
        active_url: Option<String>,
        scraped: JsValue,
    ) -> Result<JsValue, JsValue> {
        let scraped = optional_filters_from_js(scraped)?;
        let active = ActiveTab {
            id: active_tab_id,
            url: active_url.as_deref(),
        };
        let response = self.inner.store().get_filters(active, scraped);
        Ok(serde_wasm_bindgen::to_value(&response)?)
    }

    /// Search URL for a tracked tab, `undefined` when untracked.
    pub fn tab_url(&self, tab_id: i32) -> Option<String> {
        let state = self.inner.store().tab(tab_id)?;
        Some(codec::encode(&state.portal_host, &state.filter_set()))
    }

    /// Current snapshot JSON.
    pub fn snapshot(&self) -> Result<String, JsValue> {
        self.inner
            .store()
            .snapshot_json()
            .map_err(|e| js_error("Failed to encode snapshot", e))
    }

    pub fn tab_count(&self) -> u32 {
        self.inner.store().len() as u32
    }
}

// =============================================================================
// Popup and content script helpers
// =============================================================================

/// Route `log` output to the console. `level` is a `log` level name.
#[wasm_bindgen]
pub fn init_logging(level: Option<String>) {
    let level = level
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);
    console::init(level);
}

#[wasm_bindgen]
pub fn generate_url(portal_host: &str, filters: JsValue) -> Result<String, JsValue> {
    let filters = filters_from_js(filters)?;
    Ok(codec::encode(portal_host, &filters))
}

#[wasm_bindgen]
pub fn generate_predictable_url(portal_host: &str, filters: JsValue) -> Result<String, JsValue> {
    let filters = filters_from_js(filters)?;
    Ok(codec::encode_predictable(portal_host, &filters))
}

#[wasm_bindgen]
pub fn decode_url(url: &str) -> Result<JsValue, JsValue> {
    let filters = codec::decode(url).map_err(|e| js_error("Failed to decode URL", e))?;
    Ok(serde_wasm_bindgen::to_value(&filters)?)
}

#[wasm_bindgen]
pub fn decode_predictable_url(url: &str) -> Result<JsValue, JsValue> {
    let filters = codec::decode_predictable(url).map_err(|e| js_error("Failed to decode URL", e))?;
    Ok(serde_wasm_bindgen::to_value(&filters)?)
}

/// Popup summary line, e.g. `2 options + 1 keyword`.
#[wasm_bindgen]
pub fn summarize(filters: JsValue) -> Result<String, JsValue> {
    Ok(filters_from_js(filters)?.summary())
}

#[wasm_bindgen]
pub fn classify_page_url(url: &str) -> Result<JsValue, JsValue> {
    Ok(serde_wasm_bindgen::to_value(&scraped::filters_from_page_url(url))?)
}

#[wasm_bindgen]
pub fn classify_pill(text: &str, type_hint: Option<String>) -> Result<JsValue, JsValue> {
    let entry = scraped::classify_pill(text, type_hint.as_deref());
    Ok(serde_wasm_bindgen::to_value(&entry)?)
}

#[wasm_bindgen]
pub fn classify_checked(
    text: &str,
    section_hint: Option<String>,
    data_field: Option<String>,
    data_value: Option<String>,
) -> Result<JsValue, JsValue> {
    let entry = scraped::classify_checked(
        text,
        section_hint.as_deref(),
        data_field.as_deref(),
        data_value.as_deref(),
    );
    Ok(serde_wasm_bindgen::to_value(&entry)?)
}
