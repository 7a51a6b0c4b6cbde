//! Domain types shared by the rate client and the normalizer.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CurrencyCode`] | Trimmed, uppercase currency code |
//! | [`RateDate`] | `YYYY-MM-DD` calendar date |
//! | [`DateRange`] | Inclusive start/end pair for series queries |
//! | [`UtcDateTime`] | RFC3339 UTC timestamp |

mod currency;
mod date;
mod timestamp;

pub use currency::{parse_symbol_list, parse_symbols, CurrencyCode};
pub use date::{DateRange, RateDate};
pub use timestamp::UtcDateTime;
