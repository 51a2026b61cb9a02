//! Supply-chain late-delivery dashboard.
//!
//! Loads precomputed late-delivery summaries, aggregates KPIs, renders the
//! dashboard page and classifies orders as late or on time.

pub mod api;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod features;
pub mod kpi;
pub mod metrics;
pub mod models;
pub mod predict;

pub use config::DashboardConfig;
pub use dashboard::DashboardData;
pub use error::{DataUnavailable, FormError, MalformedUpload};
pub use kpi::Kpis;
pub use predict::predict_late;
