// Copyright The throttle Authors
// SPDX-License-Identifier: Apache-2.0

//! Wraps a toy call site with a handful of throttler policies to show the
//! shared acquire/release contract in practice. Run with:
//!
//! ```sh
//! cargo run --example wrap_a_call_site
//! ```

use std::time::Duration;

use context::RequestContext;
use probe::{Stats, StaticStatsProvider};
use throttler::{policies::running::Running, policies::monitor::Monitor, Throttler};

/// Calls `work` through `limiter`, returning `None` if the throttler
/// rejected the request instead of admitting it.
async fn call_with<T>(limiter: &dyn Throttler, ctx: &RequestContext, work: impl std::future::Future<Output = T>) -> Option<T> {
    if limiter.acquire(ctx).await.is_err() {
        return None;
    }
    let result = work.await;
    let _ = limiter.release(ctx).await;
    Some(result)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let concurrency_cap = Running::new(2).expect("2 is a valid concurrency cap");
    let ctx = RequestContext::new();

    let first = call_with(&concurrency_cap, &ctx, async { 1 + 1 }).await;
    println!("first call admitted: {first:?}");

    let memory_gate = Monitor::new(
        StaticStatsProvider(Stats { mem_alloc: 10_000, ..Default::default() }),
        Stats { mem_alloc: 1_000, ..Default::default() },
    );

    match call_with(&memory_gate, &ctx, async { "did the work" }).await {
        Some(result) => println!("memory gate admitted: {result}"),
        None => println!("memory gate rejected: process is over its memory budget"),
    }

    tokio::time::sleep(Duration::from_millis(1)).await;
}
