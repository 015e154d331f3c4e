//! # Rates Fixer
//!
//! Outbound adapter for the Fixer.io exchange-rate provider.
//!
//! Implements the [`rates_types::RateProvider`] port with:
//! - exponential backoff retry for transient failures (network errors,
//!   5xx responses, rate-limit signals)
//! - a sticky per-key fallback for plan-restricted credentials: once a
//!   key is rejected for sending a base currency, all later calls for
//!   that key use the restricted request shape directly
//!
//! The retry/fallback protocol itself lives in [`policy`] as pure
//! functions so it can be tested without any I/O.

mod client;
pub mod policy;

pub use client::{DEFAULT_BASE_URL, FixerClient, RetryPolicy};
