//! Domain models for the currency rates service.

pub mod currency;

pub use currency::Currency;
