// Copyright The throttle Authors
// SPDX-License-Identifier: Apache-2.0

//! `Priority(N, levels)`: a permit pool partitioned across priority
//! classes by a cumulative quota, so higher-priority callers see more
//! capacity (and therefore less waiting) than lower-priority ones.

use async_trait::async_trait;
use context::RequestContext;
use tokio::sync::Semaphore;

use crate::{support::acquire_permit_cancelable, ConfigError, Error, Throttler};

/// `levels` priority classes, `1..=levels`, drawing from one shared permit
/// pool of total size `N`. Each class additionally has its own semaphore
/// sized by the ceiling quota `⌈N · k / levels⌉`, capping how much of the
/// shared pool that class may hold concurrently; acquiring always consumes
/// one permit from both, so the sum in flight across every class can never
/// exceed `N`. The top class's quota always equals `N`, so it is only ever
/// as restricted as the shared pool itself — never more restricted than a
/// plain `Buffered(N)`.
///
/// `levels == 0` is accepted and means "no partitioning": every request is
/// treated as a single class with the full pool of `N` permits, i.e. this
/// degenerates to `Buffered(N)` per the construction-time constraint.
pub struct Priority {
    levels: usize,
    classes: Vec<Semaphore>,
    pool: Semaphore,
}

fn ceil_quota(n: usize, k: usize, levels: usize) -> usize {
    (n * k + levels - 1) / levels
}

impl Priority {
    /// Creates a new `Priority(n, levels)`. `n` must be `>= 1`.
    pub fn new(n: usize, levels: usize) -> Result<Self, ConfigError> {
        if n == 0 {
            return Err(ConfigError::ZeroCount(0));
        }
        let effective_levels = levels.max(1);
        let classes = (1..=effective_levels)
            .map(|k| Semaphore::new(ceil_quota(n, k, effective_levels)))
            .collect();
        tracing::debug!(permits = n, levels = effective_levels, "priority throttler constructed");
        Ok(Self {
            levels: effective_levels,
            classes,
            pool: Semaphore::new(n),
        })
    }

    /// The quota (permit pool size) of priority class `k` (1-indexed).
    /// Panics if `k` is 0 or greater than the configured level count.
    pub fn quota(&self, k: usize) -> usize {
        self.classes[k - 1].available_permits()
    }

    fn class_index(&self, ctx: &RequestContext) -> usize {
        let priority = (ctx.priority() as usize).clamp(1, self.levels);
        priority - 1
    }
}

#[async_trait]
impl Throttler for Priority {
    async fn acquire(&self, ctx: &RequestContext) -> Result<(), Error> {
        let index = self.class_index(ctx);
        let class = &self.classes[index];
        if class.available_permits() == 0 {
            tracing::trace!(class = index + 1, "priority class quota exhausted, waiting");
        }
        // Reserve the class's own share first, then draw from the shared
        // pool so the total in flight across every class never exceeds N.
        let class_permit = acquire_permit_cancelable(class, ctx).await?;
        if self.pool.available_permits() == 0 {
            tracing::trace!(class = index + 1, "priority shared pool exhausted, waiting");
        }
        let pool_permit = acquire_permit_cancelable(&self.pool, ctx).await?;
        class_permit.forget();
        pool_permit.forget();
        Ok(())
    }

    async fn release(&self, ctx: &RequestContext) -> Result<(), Error> {
        self.classes[self.class_index(ctx)].add_permits(1);
        self.pool.add_permits(1);
        Ok(())
    }
}
