// Copyright The throttle Authors
// SPDX-License-Identifier: Apache-2.0

//! `Panic`: every acquire is rejected. Named after the source throttler
//! this crate generalizes, whose implementation raised an exception and
//! relied on the caller's test harness to flatten it back to a normal
//! error; here the rejection is ordinary from the start (see module docs
//! on `Error::Panic`).

use async_trait::async_trait;
use context::RequestContext;

use crate::{Error, Throttler};

/// Rejects every acquire with [`Error::Panic`]. Release is always `Ok`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Panic;

impl Panic {
    /// Creates a new `Panic` throttler.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Throttler for Panic {
    async fn acquire(&self, _ctx: &RequestContext) -> Result<(), Error> {
        Err(Error::Panic)
    }

    async fn release(&self, _ctx: &RequestContext) -> Result<(), Error> {
        Ok(())
    }
}
