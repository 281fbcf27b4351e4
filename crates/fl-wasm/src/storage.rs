//! Snapshot sink backed by a JavaScript callback
//!
//! The extension reads `chrome.storage.local` itself before constructing the
//! tracker, so loading only hands back what it was given. Writes call the
//! `persist(key, snapshot)` callback, which is expected to forward to storage
//! without awaiting.

use fl_core::{PersistError, SnapshotSink};
use wasm_bindgen::JsValue;

pub struct JsStorageSink {
    persist: js_sys::Function,
    saved: Option<String>,
}

impl JsStorageSink {
    pub fn new(persist: js_sys::Function, saved: Option<String>) -> Self {
        Self { persist, saved }
    }
}

impl SnapshotSink for JsStorageSink {
    fn load(&mut self, _key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.saved.take())
    }

    fn store(&mut self, key: &str, snapshot: &str) -> Result<(), PersistError> {
        self.persist
            .call2(&JsValue::NULL, &JsValue::from_str(key), &JsValue::from_str(snapshot))
            .map(|_| ())
            .map_err(|e| PersistError::Backend(format!("{:?}", e)))
    }
}
