// Copyright The throttle Authors
// SPDX-License-Identifier: Apache-2.0

//! `RequestContext` carries the two recognized per-call keys — `priority`
//! and `timestamp` — plus an optional cancellation token, into a
//! throttler's `acquire`/`release` pair.

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{Context, Value};

const PRIORITY_KEY: &str = "priority";

/// Opaque per-call metadata passed to `Throttler::acquire`/`release`.
///
/// Only `priority` and `timestamp` are recognized by the core policies;
/// any other key set on the inner [`Context`] is ignored by them but
/// available to callers who want to thread extra metadata alongside.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    values: Context,
    timestamp: Option<Instant>,
    cancellation: Option<CancellationToken>,
}

impl RequestContext {
    /// Creates an empty request context: priority defaults to 1, timestamp
    /// defaults to "now" at acquire time, and there is nothing to cancel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the priority of this request. Values are clamped to `>= 1` by
    /// readers; a priority of 0 is stored as given but treated as 1.
    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.values.set(PRIORITY_KEY, Value::U64(u64::from(priority)));
        self
    }

    /// Sets the caller's notion of "when this request entered the system".
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: Instant) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Attaches a cancellation token; suspending policies honor it and
    /// return promptly instead of waiting out their normal suspension when
    /// it fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    /// Sets an arbitrary extra key on the underlying context. Not read by
    /// any core policy; provided for callers that want to carry additional
    /// metadata through the same carrier.
    #[must_use]
    pub fn with_value(mut self, key: &str, value: Value) -> Self {
        self.values.set(key, value);
        self
    }

    /// Returns the priority of this request, clamped to `>= 1`. Absent ⇒ 1.
    pub fn priority(&self) -> u32 {
        self.values.get_value::<u32>(PRIORITY_KEY, 1).max(1)
    }

    /// Returns the timestamp of this request. Absent ⇒ now.
    pub fn timestamp(&self) -> Instant {
        self.timestamp.unwrap_or_else(Instant::now)
    }

    /// Returns the cancellation token attached to this request, if any.
    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    /// Reads an arbitrary extra value previously set with [`Self::with_value`].
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}
