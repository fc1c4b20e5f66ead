//! Tuple flattening example for rust-minifut
//!
//! This example mixes plain values, pool-backed futures and a nested
//! future in a single tuple and collapses all of them in one call.

use rust_minifut::{flatten_tuple, Future, Promise, ThreadPool};
use std::collections::HashMap;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for better debugging
    tracing_subscriber::fmt::init();

    println!("🦀 rust-minifut Tuple Flattening Example");

    let pool = ThreadPool::new(4)?;

    println!("\n--- Building the tuple slots ---");

    // Slot 1: a plain value, no future involved.
    let plain = 7;

    // Slot 2: a value computed on the pool.
    let direct = pool.spawn(|| 8);

    // Slot 3: a future of a future; both layers unwrap automatically.
    let (nested_promise, nested) = Promise::<Future<Vec<i32>>>::pair();
    nested_promise.set(pool.spawn(|| vec![1, 2, 3]))?;

    // Slot 4: a whole map computed on the pool.
    let scores = pool.spawn(|| {
        let mut scores = HashMap::new();
        scores.insert("alpha".to_string(), 3);
        scores.insert("beta".to_string(), 5);
        scores
    });

    println!("--- Flattening all four slots at once ---");
    let combined = flatten_tuple((plain, direct, nested, scores));
    let (a, b, c, d) = combined.get()?;

    println!("plain:  {}", a);
    println!("direct: {}", b);
    println!("nested: {:?}", c);
    println!("scores: {:?}", d);

    println!("\n✅ Tuple flattened successfully!");
    Ok(())
}
