use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use serde_json::{json, Map, Value};
use statehooks_core::scope::{Runtime, SubscriberId};
use statehooks_core::{History, StateCell, Update};

fn cell_set_benchmark(c: &mut Criterion) {
    let cell = StateCell::detached(0u64);

    c.bench_function("cell_set", |b| {
        let mut i = 0;
        b.iter(|| {
            cell.set(black_box(i));
            i += 1;
        });
    });
}

fn cell_update_with_watchers_benchmark(c: &mut Criterion) {
    let cell = StateCell::detached(0u64);
    for _ in 0..8 {
        cell.subscribe(SubscriberId::new(), |value| {
            black_box(*value);
        });
    }

    c.bench_function("cell_update_8_watchers", |b| {
        b.iter(|| {
            cell.update(|n| n + 1);
        });
    });
}

fn cell_merge_benchmark(c: &mut Criterion) {
    let cell = StateCell::detached(json!({
        "supported": true,
        "loading": false,
        "level": 0.5,
        "charging": false,
    }));

    c.bench_function("cell_merge_object", |b| {
        let mut level = 0.0;
        b.iter(|| {
            let mut patch = Map::new();
            patch.insert("level".to_string(), Value::from(black_box(level)));
            cell.apply(Update::Merge(patch));
            level += 0.01;
        });
    });
}

fn history_set_benchmark(c: &mut Criterion) {
    c.bench_function("history_set_1000", |b| {
        b.iter(|| {
            let mut history = History::new(0u32);
            for i in 1..=1000 {
                history.set(black_box(i));
            }
            history
        });
    });
}

fn history_undo_redo_benchmark(c: &mut Criterion) {
    let mut history = History::with_limit(0u32, 256);
    for i in 1..=256 {
        history.set(i);
    }

    c.bench_function("history_undo_redo", |b| {
        b.iter(|| {
            black_box(history.undo());
            black_box(history.redo());
        });
    });
}

fn runtime_flush_benchmark(c: &mut Criterion) {
    let mut runtime = Runtime::new();
    let cells = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));

    for _ in 0..64 {
        let cells = cells.clone();
        runtime
            .mount(move |scope| {
                let count = scope.use_state(0u32)?;
                if cells.borrow().len() < 64 {
                    cells.borrow_mut().push(count);
                }
                Ok(())
            })
            .unwrap();
    }

    c.bench_function("runtime_flush_64_scopes", |b| {
        b.iter(|| {
            for cell in cells.borrow().iter() {
                cell.update(|n| n.wrapping_add(1));
            }
            black_box(runtime.flush().unwrap())
        });
    });
}

criterion_group!(
    benches,
    cell_set_benchmark,
    cell_update_with_watchers_benchmark,
    cell_merge_benchmark,
    history_set_benchmark,
    history_undo_redo_benchmark,
    runtime_flush_benchmark,
);
criterion_main!(benches);
