//! Core library for the `urweather` lookup tool.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The condition classifier that picks icon/background assets
//! - Abstraction over the upstream weather service
//! - The query controller that owns input, lookup and error-banner state
//!
//! It is used by `urweather-cli`, but any front-end can drive the controller
//! and observe its state.

pub mod classifier;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod provider;

pub use classifier::{Background, Icon, Visual, classify};
pub use config::Config;
pub use controller::{InputFocus, NoFocus, QueryController};
pub use error::QueryError;
pub use model::{QueryState, WeatherSnapshot};
pub use provider::{WeatherProvider, provider_from_config, weatherapi::WeatherApiProvider};
