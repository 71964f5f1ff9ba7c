//! Configuration module
//!
//! Settings that control how raw Tableau values are coerced during conversion.

pub mod config;

pub use config::ConverterConfig;
