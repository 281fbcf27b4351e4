//! Tests for the wasm surface. Run with `wasm-pack test --node crates/fl-wasm`.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

use fl_core::{FilterEntry, FilterSet, GetFiltersResponse};
use fl_wasm::{decode_url, generate_predictable_url, generate_url, summarize, FilterTracker};

const SEARCH: &str = "https://acme.bynder.com/api/v4/search/assets/";

fn noop_persist() -> js_sys::Function {
    js_sys::Function::new_with_args("key, snapshot", "")
}

fn sample_filters() -> FilterSet {
    FilterSet::from_entries(&[
        FilterEntry::Metaproperty {
            property: "Color".into(),
            raw_key: "Color".into(),
            value: "Red".into(),
        },
        FilterEntry::SearchTerm { value: "logo".into() },
    ])
}

#[wasm_bindgen_test]
fn tracks_requests_and_answers_popup() {
    let mut tracker = FilterTracker::new(noop_persist(), None, JsValue::UNDEFINED).unwrap();
    assert!(tracker.on_before_request(
        &format!("{}?field=tags&value=hero&filterType=add", SEARCH),
        3,
        1_000.0
    ));

    let response = tracker
        .get_filters(Some(3), Some("https://acme.bynder.com/media/".into()), JsValue::NULL)
        .unwrap();
    let response: GetFiltersResponse = serde_wasm_bindgen::from_value(response).unwrap();
    assert!(response.has_filters);
    assert_eq!(response.filters.tags[0].value, "hero");

    assert_eq!(
        tracker.tab_url(3).as_deref(),
        Some("https://acme.bynder.com/search/media/?resetsearch&field=tags&value=hero&filterType=add")
    );
    assert_eq!(tracker.on_tab_updated(3, "https://acme.bynder.com/media/", 2_000.0), "suppressed-after-mutation");
}

#[wasm_bindgen_test]
fn restores_saved_snapshot_and_prunes() {
    let saved = r#"{"5":{"portalHost":"acme.bynder.com","lastMutationTime":1,
        "entries":[["text:logo",{"type":"search","value":"logo"}]]},
        "6":{"portalHost":"acme.bynder.com","lastMutationTime":1,"entries":[]}}"#;
    let mut tracker = FilterTracker::new(noop_persist(), Some(saved.into()), JsValue::NULL).unwrap();
    assert_eq!(tracker.tab_count(), 2);

    assert_eq!(tracker.prune_stale(vec![5]), 1);
    assert!(tracker.on_tab_removed(5));
    assert_eq!(tracker.snapshot().unwrap(), "{}");
}

#[wasm_bindgen_test]
fn rejects_bad_config() {
    let config = serde_wasm_bindgen::to_value("not a config").unwrap();
    assert!(FilterTracker::new(noop_persist(), None, config).is_err());
}

#[wasm_bindgen_test]
fn popup_helpers() {
    let filters = serde_wasm_bindgen::to_value(&sample_filters()).unwrap();

    let url = generate_url("acme.bynder.com", filters.clone()).unwrap();
    assert_eq!(
        url,
        "https://acme.bynder.com/search/set/?resetsearch&field=metaproperty_Color&value=Red\
         &filterType=add&field=text&value=logo&filterType=add"
    );
    assert_eq!(
        generate_predictable_url("acme.bynder.com", filters.clone()).unwrap(),
        "https://acme.bynder.com/match/Color/Red/"
    );
    assert_eq!(summarize(filters).unwrap(), "1 option + 1 keyword");

    let decoded: FilterSet = serde_wasm_bindgen::from_value(decode_url(&url).unwrap()).unwrap();
    assert_eq!(decoded, sample_filters());
    assert!(decode_url("not a url").is_err());
}
