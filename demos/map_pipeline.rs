//! Map pipeline example for rust-minifut
//!
//! This example fans eight computations out over a pool, transforms each
//! result with `map`, gathers them in order with `flatten_all` and
//! reduces the collection with one final `map`.

use rust_minifut::{flatten_all, map, ThreadPool};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for better debugging
    tracing_subscriber::fmt::init();

    println!("🦀 rust-minifut Map Pipeline Example");

    let pool = ThreadPool::new(4)?;

    println!("\n--- Stage 1: fan out, square, then shift each value ---");
    let shifted: Vec<_> = (1..=8)
        .map(|n: i32| {
            let squared = pool.spawn(move || n * n);
            map(squared, |square| square + 100)
        })
        .collect();

    println!("--- Stage 2: gather the results in submission order ---");
    let gathered = flatten_all(shifted);

    println!("--- Stage 3: reduce the collection to one number ---");
    let total = map(gathered, |values: Vec<i32>| {
        println!("gathered: {:?}", values);
        values.iter().sum::<i32>()
    });

    println!("total: {}", total.get()?);

    // Blocks until every queued task has run.
    pool.join();

    println!("\n✅ Pipeline completed successfully!");
    Ok(())
}
