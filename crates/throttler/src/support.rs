// Copyright The throttle Authors
// SPDX-License-Identifier: Apache-2.0

//! Shared suspension helpers. Every policy that may block the caller
//! (`Wait`, `Backoff`, `Buffered`, `Priority`) routes its suspension
//! through these so cancellation is honored uniformly, per the
//! concurrency model's "cancellation takes precedence over throttling
//! decisions in any suspended state" rule.

use std::time::Duration;

use context::RequestContext;
use tokio::sync::{Semaphore, SemaphorePermit};

use crate::Error;

/// Sleeps for `duration`, returning early with [`Error::Cancelled`] if
/// `ctx`'s cancellation token fires first. A context with no token attached
/// never cancels.
pub(crate) async fn sleep_cancelable(duration: Duration, ctx: &RequestContext) -> Result<(), Error> {
    match ctx.cancellation() {
        Some(token) => tokio::select! {
            () = tokio::time::sleep(duration) => Ok(()),
            () = token.cancelled() => Err(Error::Cancelled),
        },
        None => {
            tokio::time::sleep(duration).await;
            Ok(())
        }
    }
}

/// Waits for a permit on `semaphore`, returning early with
/// [`Error::Cancelled`] if `ctx`'s cancellation token fires first.
pub(crate) async fn acquire_permit_cancelable<'a>(
    semaphore: &'a Semaphore,
    ctx: &RequestContext,
) -> Result<SemaphorePermit<'a>, Error> {
    let permit = match ctx.cancellation() {
        Some(token) => tokio::select! {
            permit = semaphore.acquire() => permit,
            () = token.cancelled() => return Err(Error::Cancelled),
        },
        None => semaphore.acquire().await,
    };

    // Semaphores owned by this crate are never closed, so this only fires
    // if a future policy starts closing its pool; treat it like cancellation.
    permit.map_err(|_| Error::Cancelled)
}
