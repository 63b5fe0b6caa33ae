// Copyright The throttle Authors
// SPDX-License-Identifier: Apache-2.0

//! `Running(N)`: caps the number of in-flight (acquired-but-not-released)
//! calls.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use context::RequestContext;

use crate::{ConfigError, Error, Throttler};

/// Rejects with [`Error::RunningThreshold`] when `n` calls are already
/// in-flight; otherwise admits the caller and counts it as in-flight until
/// a matching `release`. Over-release saturates at zero rather than
/// underflowing.
#[derive(Debug)]
pub struct Running {
    n: u64,
    in_flight: AtomicU64,
}

impl Running {
    /// Creates a new `Running(n)`. `n` must be `>= 1`.
    pub fn new(n: u64) -> Result<Self, ConfigError> {
        if n == 0 {
            return Err(ConfigError::ZeroCount(n));
        }
        Ok(Self { n, in_flight: AtomicU64::new(0) })
    }

    /// Returns the current number of in-flight calls.
    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Throttler for Running {
    async fn acquire(&self, _ctx: &RequestContext) -> Result<(), Error> {
        let reserved = self
            .in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if current < self.n {
                    Some(current + 1)
                } else {
                    None
                }
            });

        match reserved {
            Ok(_) => Ok(()),
            Err(current) => {
                tracing::trace!(current, limit = self.n, "running threshold reached");
                Err(Error::RunningThreshold)
            }
        }
    }

    async fn release(&self, _ctx: &RequestContext) -> Result<(), Error> {
        let _ = self
            .in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| Some(current.saturating_sub(1)));
        Ok(())
    }
}
