//! View-Models
//!
//! Pure derivations from API responses to renderable state. Nothing in
//! here performs I/O, so every rule can be tested without a backend.

pub mod appliances;
pub mod dashboard;
pub mod render;

pub use appliances::{
    appliance_cards, toggled_interval, ApplianceCard, Selection, TaskCache, TaskRow,
    DEFAULT_INTERVAL_DAYS,
};
pub use dashboard::{ChartPoint, DashboardView, PlotArea, RoomChart};
