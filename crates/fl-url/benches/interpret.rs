use criterion::{black_box, criterion_group, criterion_main, Criterion};

use fl_core::{FilterStore, MemorySink, Timestamp, TrackerConfig};
use fl_url::{decode, encode, interpret_search_url, Interpreter};

const REQUEST: &str = "https://acme.bynder.com/api/v4/search/assets/?page=1&limit=50\
                       &field=metaproperty_Color&value=Red&filterType=add";
const UNRELATED: &str = "https://acme.bynder.com/api/v4/users/me/?include=profile";
const SEARCH_URL: &str = "https://acme.bynder.com/search/set/?resetsearch\
                          &field=metaproperty_Color&value=Red&filterType=add\
                          &field=tags&value=hero&filterType=add\
                          &field=text&value=summer+campaign&filterType=add\
                          &field=fileSize&value[]=10&value[]=20&filterType=add";

fn bench_interpret(c: &mut Criterion) {
    let interpreter = Interpreter::new(&TrackerConfig::default());

    c.bench_function("interpret_request", |b| {
        b.iter(|| interpreter.interpret_request(black_box(REQUEST), 1))
    });
    c.bench_function("interpret_request_unrelated", |b| {
        b.iter(|| interpreter.interpret_request(black_box(UNRELATED), 1))
    });
    c.bench_function("interpret_search_url", |b| {
        b.iter(|| interpret_search_url(black_box(SEARCH_URL), 1))
    });
}

fn bench_codec(c: &mut Criterion) {
    let mut store = FilterStore::new(TrackerConfig::default(), MemorySink::new());
    if let Ok(events) = interpret_search_url(SEARCH_URL, 1) {
        for event in events {
            store.apply(event, Timestamp::from_millis(0));
        }
    }
    let filters = store.current_filters(1).unwrap_or_default();

    c.bench_function("encode", |b| {
        b.iter(|| encode(black_box("acme.bynder.com"), black_box(&filters)))
    });
    c.bench_function("decode", |b| b.iter(|| decode(black_box(SEARCH_URL))));
}

criterion_group!(benches, bench_interpret, bench_codec);
criterion_main!(benches);
