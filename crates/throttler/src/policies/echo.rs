// Copyright The throttle Authors
// SPDX-License-Identifier: Apache-2.0

//! `Echo`: a stateless policy that either always succeeds or always fails
//! with a caller-supplied error.

use async_trait::async_trait;
use context::RequestContext;

use crate::{Error, Throttler};

/// The error `Echo` reproduces on every acquire when constructed with
/// [`Echo::with_message`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct EchoError {
    /// The message this error carries.
    pub message: String,
}

/// Always fails acquire with the configured error, or always succeeds if
/// none was configured. Release is always `Ok`.
///
/// Stateless: concurrent acquires produce observationally independent
/// outcomes, since there is no state to race on.
#[derive(Debug, Clone, Default)]
pub struct Echo<E = EchoError> {
    error: Option<E>,
}

impl Echo<EchoError> {
    /// Creates an `Echo` that never fails.
    pub fn new() -> Self {
        Self { error: None }
    }

    /// Creates an `Echo` that fails every acquire with a message-only error.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            error: Some(EchoError { message: message.into() }),
        }
    }
}

impl<E> Echo<E>
where
    E: std::error::Error + Clone + Send + Sync + 'static,
{
    /// Creates an `Echo` that fails every acquire with `error` (cloned).
    pub fn with_error(error: E) -> Self {
        Self { error: Some(error) }
    }
}

#[async_trait]
impl<E> Throttler for Echo<E>
where
    E: std::error::Error + Clone + Send + Sync + 'static,
{
    async fn acquire(&self, _ctx: &RequestContext) -> Result<(), Error> {
        match &self.error {
            Some(error) => Err(Error::Echoed(Box::new(error.clone()))),
            None => Ok(()),
        }
    }

    async fn release(&self, _ctx: &RequestContext) -> Result<(), Error> {
        Ok(())
    }
}
