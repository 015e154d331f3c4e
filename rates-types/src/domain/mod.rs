//! Domain models for the exchange-rate cache.

pub mod currency;
pub mod date;
pub mod snapshot;

pub use currency::{CurrencyCode, parse_symbol_list};
pub use date::{DATE_FORMAT, parse_rate_day};
pub use snapshot::RateSnapshot;
