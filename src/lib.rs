//! # Home Dashboard
//!
//! Rust client for a household dashboard service that tracks appliance
//! cleaning schedules and room temperatures.
//!
//! ## Features
//!
//! - **Typed API client**: every REST endpoint behind the [`HomeApi`] trait
//! - **Dashboard view-model**: per-room min/max/range and sparkline geometry
//! - **Appliance view-model**: multi-select, overdue flags, schedule toggle
//! - **Auto-refresh**: dashboard polling with out-of-order responses dropped
//!
//! ## Modules
//!
//! - [`client`]: HTTP client and the [`HomeApi`] seam
//! - [`models`]: wire types shared with the server
//! - [`view`]: derived view-models and text rendering
//! - [`state`]: shared view state with stale-response protection
//! - [`controller`]: user-action flows for both screens
//! - [`refresh`]: periodic dashboard reloads
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use home_dashboard::{ApiClient, DashboardController, RefreshController, ViewStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = Arc::new(ApiClient::with_base_url("http://127.0.0.1:8000")?);
//!     let store = Arc::new(ViewStore::new());
//!     let dashboard = Arc::new(DashboardController::new(api, store));
//!
//!     // Record a reading, then poll every 15 seconds
//!     dashboard.add_reading(21.5, "kitchen").await?;
//!     let refresh = RefreshController::new(dashboard.clone()).start();
//!
//!     if let Some(view) = dashboard.view().await {
//!         for chart in &view.charts {
//!             println!("{}: {}", chart.room, chart.polyline());
//!         }
//!     }
//!
//!     refresh.stop().await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod controller;
pub mod logging;
pub mod models;
pub mod refresh;
pub mod state;
pub mod view;

// Re-export top-level types for convenience
pub use client::{ApiClient, ApiError, ApiResult, ClientConfig, HomeApi};

pub use config::{generate_default_config, Config, ConfigError};

pub use controller::{AppliancesController, DashboardController};

pub use models::{Appliance, DashboardSnapshot, DueTask, Task, TemperatureReading};

pub use refresh::{RefreshController, RefreshHandle, DEFAULT_REFRESH_INTERVAL};

pub use state::{Resource, ViewState, ViewStore};

pub use view::{ApplianceCard, DashboardView, PlotArea, RoomChart, Selection};
