// Copyright The throttle Authors
// SPDX-License-Identifier: Apache-2.0

//! `After(N)`: passes the first N calls, then rejects the rest. The
//! complement of [`crate::policies::before::Before`].

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use context::RequestContext;

use crate::{ConfigError, Error, Throttler};

/// Passes the first `n` calls; the `(n+1)`th call onward is rejected with
/// [`Error::AboveThreshold`].
#[derive(Debug)]
pub struct After {
    n: u64,
    count: AtomicU64,
}

impl After {
    /// Creates a new `After(n)`. `n` must be `>= 1`.
    pub fn new(n: u64) -> Result<Self, ConfigError> {
        if n == 0 {
            return Err(ConfigError::ZeroCount(n));
        }
        Ok(Self { n, count: AtomicU64::new(0) })
    }
}

#[async_trait]
impl Throttler for After {
    async fn acquire(&self, _ctx: &RequestContext) -> Result<(), Error> {
        let count = self.count.fetch_add(1, Ordering::AcqRel) + 1;
        if count > self.n {
            Err(Error::AboveThreshold)
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
    async fn passes_first_n_then_rejects() {
        let after = After::new(3).expect("3 is a valid count");
        let ctx = RequestContext::new();

        let mut results = Vec::new();
        for _ in 0..6 {
            results.push(after.acquire(&ctx).await.is_ok());
        }

        assert_eq!(results, vec![true, true, true, false, false, false]);
    }
}
