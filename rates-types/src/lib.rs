//! # Rates Types
//!
//! Domain types and port traits for the exchange-rate cache service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (CurrencyCode, RateSnapshot, date parsing)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Wire payloads shared with the upstream provider
//! - `error/` - Domain, store, provider and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{CurrencyCode, DATE_FORMAT, RateSnapshot, parse_rate_day, parse_symbol_list};
pub use dto::{ErrorBody, ProviderErrorDetail, ProviderErrorResponse, RatesResponse};
pub use error::{AppError, DomainError, ProviderError, RepoError};
pub use ports::{FetchRequest, RateProvider, RateStore};
