//! Core library for the `obra` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - SQLite-backed stores for projects and daily reports
//! - The weather-history provider abstraction and its Open-Meteo client
//! - Shared domain models
//!
//! It is used by `obra-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod store;
pub mod weather;

pub use config::Config;
pub use error::{StoreError, WeatherError};
pub use model::{
    CrewEntry, CrewRole, DailyReport, NewProject, PhotoRef, Project, ReportDraft,
};
pub use store::{Database, ProjectStore, ReportStore};
pub use weather::{
    DailyWeather, Geocoded, HistoryProvider, HistoryReport, HistoryRequest, OpenMeteoProvider,
};
