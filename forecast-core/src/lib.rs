//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeatherMap client for the fixed Poltava deployment
//! - Shared view models and the service trait
//!
//! It is used by `forecast-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod service;

pub use client::{ClientConfig, OpenWeatherClient};
pub use config::Config;
pub use error::FetchError;
pub use model::ForecastEntry;
pub use service::{DiagnosticSink, ForecastService, TracingSink};
