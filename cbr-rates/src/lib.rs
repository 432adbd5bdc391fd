//! Central Bank of Russia daily rates adapter.
//!
//! Fetches the `XML_daily` document, decodes it from its declared charset
//! (the bank publishes `windows-1251`) and turns every `<Valute>` entry into a
//! canonical [`Currency`](currencier_types::Currency).
//!
//! # Example
//! ```no_run
//! use std::time::Duration;
//! use cbr_rates::CbrSource;
//! use currencier_types::CurrencySource;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let source = CbrSource::new("https://www.cbr.ru/scripts/XML_daily.asp", Duration::from_secs(30))?;
//! let currencies = source.load().await?;
//! println!("{} rates", currencies.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod feed;

pub use client::CbrSource;
pub use feed::{decode_feed, detect_charset, parse_rate};
