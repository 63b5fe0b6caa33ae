// Copyright The throttle Authors
// SPDX-License-Identifier: Apache-2.0

#![doc = include_str!("../README.md")]
#![deny(
    trivial_numeric_casts,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    unused_results,
    variant_size_differences
)]
#![warn(rust_2021_compatibility, unreachable_pub)]

//! `throttle` is a library of composable admission-control primitives.
//! Every throttler policy implements [`throttler::Throttler`]: a matched
//! pair of `acquire`/`release` operations around the caller's unit of
//! work. Policies are leaf components — combining several into an
//! all-of/any-of/sequence gate is a concern for code built on top of this
//! crate, not for the crate itself.
//!
//! [`context`] carries the per-call metadata (`priority`, `timestamp`,
//! cancellation) that a policy reads; [`probe`] is the read-only interface
//! resource-aware policies consult.

pub use context;
pub use probe;
pub use throttler;
