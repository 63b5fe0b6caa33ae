// Copyright The throttle Authors
// SPDX-License-Identifier: Apache-2.0

//! `Before(N)`: rejects the first N calls, then passes the rest.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use context::RequestContext;

use crate::{ConfigError, Error, Throttler};

/// Rejects the first `n` calls with [`Error::BelowThreshold`]; the
/// `(n+1)`th call onward succeeds.
#[derive(Debug)]
pub struct Before {
    n: u64,
    count: AtomicU64,
}

impl Before {
    /// Creates a new `Before(n)`. `n` must be `>= 1`.
    pub fn new(n: u64) -> Result<Self, ConfigError> {
        if n == 0 {
            return Err(ConfigError::ZeroCount(n));
        }
        Ok(Self { n, count: AtomicU64::new(0) })
    }
}

#[async_trait]
impl Throttler for Before {
    async fn acquire(&self, _ctx: &RequestContext) -> Result<(), Error> {
        let count = self.count.fetch_add(1, Ordering::AcqRel) + 1;
        if count <= self.n {
            Err(Error::BelowThreshold)
        } else {
            Ok(())
        }
    }

    async fn release(&self, _ctx: &RequestContext) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn rejects_first_n_then_passes() {
        let before = Before::new(3).expect("3 is a valid count");
        let ctx = RequestContext::new();

        let mut results = Vec::new();
        for _ in 0..6 {
            results.push(before.acquire(&ctx).await.is_ok());
        }

        assert_eq!(results, vec![false, false, false, true, true, true]);
    }
}
