//! # Concurrent Generator Tests
//!
//! A generator is shared across threads without an outer lock. Requests for
//! the same chunk must collapse into one computation per cache.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use strata_core::{FeatureSpec, GenerationOptions, Generator, Grid, LayerSpec};

fn counting_generator(calls: Arc<AtomicUsize>) -> Generator {
    let base = FeatureSpec::new("base")
        .with_layer(LayerSpec::from_fn("slow", move |ctx| {
            calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(5));
            Ok(Grid::filled(ctx.width, ctx.height, (ctx.x() - ctx.y()) as f32))
        }))
        .with_modifier(|grid: Grid| grid);

    let derived = FeatureSpec::new("derived")
        .with_layer(
            LayerSpec::from_fn("offset", |ctx| {
                let base = ctx.features[0].evaluate(ctx.x(), ctx.y())?;
                Ok(base.map(|v| v + 0.5))
            })
            .with_features(["base"]),
        )
        .with_modifier(|grid: Grid| grid);

    let options = GenerationOptions::new(9, 3).with_initial_cache(1, 1).with_expand_margin(1);
    Generator::new(options, vec![derived, base]).unwrap()
}

#[test]
fn test_same_chunk_computed_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let generator = Arc::new(counting_generator(Arc::clone(&calls)));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let generator = Arc::clone(&generator);
            let name = if i % 2 == 0 { "base" } else { "derived" };
            thread::spawn(move || generator.evaluate(name, 4, -4).unwrap())
        })
        .collect();

    for handle in handles {
        let grid = handle.join().unwrap();
        assert!(grid.get(0, 0) == 8.0 || grid.get(0, 0) == 8.5);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_distinct_chunks_all_cached() {
    let calls = Arc::new(AtomicUsize::new(0));
    let generator = Arc::new(counting_generator(Arc::clone(&calls)));

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let generator = Arc::clone(&generator);
            thread::spawn(move || {
                for j in -3..3 {
                    generator.evaluate("derived", i - 3, j).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 36);
    let base = generator.feature("base").unwrap();
    assert_eq!(base.layer("slow").unwrap().cached_chunks(), 36);
    assert_eq!(generator.feature("derived").unwrap().cached_chunks(), 36);
    assert_eq!(base.evaluate(-3, 2).unwrap(), Grid::filled(9, 9, -5.0));
}
