// Copyright The throttle Authors
// SPDX-License-Identifier: Apache-2.0

//! `Chance(p)`: rejects each call independently with probability `p`.

use async_trait::async_trait;
use context::RequestContext;
use parking_lot::Mutex;
use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{Error, Throttler};

/// Draws a fresh uniform sample in `[0, 1)` on each acquire and rejects
/// with [`Error::Chance`] when the draw is below `p`. `p <= 0` never
/// rejects; `p >= 1` always rejects. No state carries across calls beyond
/// the random generator itself.
///
/// Uses a per-policy generator (rather than a shared global one) to avoid
/// lock contention under concurrent callers.
pub struct Chance {
    p: f64,
    rng: Mutex<SmallRng>,
}

impl Chance {
    /// Creates a new `Chance(p)`.
    pub fn new(p: f64) -> Self {
        Self {
            p,
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }
}

#[async_trait]
impl Throttler for Chance {
    async fn acquire(&self, _ctx: &RequestContext) -> Result<(), Error> {
        let draw: f64 = self.rng.lock().gen();
        if draw < self.p {
            Err(Error::Chance)
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
    async fn non_positive_probability_never_rejects() {
        let chance = Chance::new(0.0);
        let ctx = RequestContext::new();
        for _ in 0..50 {
            assert!(chance.acquire(&ctx).await.is_ok());
        }
    }

    #[tokio::test]
    async fn probability_at_least_one_always_rejects() {
        let chance = Chance::new(1.0);
        let ctx = RequestContext::new();
        for _ in 0..50 {
            assert!(chance.acquire(&ctx).await.is_err());
        }
    }

    #[tokio::test]
    async fn mid_probability_produces_both_outcomes_eventually() {
        let chance = Chance::new(0.5);
        let ctx = RequestContext::new();
        let mut saw_ok = false;
        let mut saw_err = false;
        for _ in 0..200 {
            match chance.acquire(&ctx).await {
                Ok(()) => saw_ok = true,
                Err(_) => saw_err = true,
            }
            if saw_ok && saw_err {
                break;
            }
        }
        assert!(saw_ok && saw_err);
    }
}
