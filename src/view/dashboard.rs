//! Dashboard View-Model
//!
//! Turns a [`DashboardSnapshot`] into per-room sparkline geometry and the
//! due-task listing.

use crate::models::{DashboardSnapshot, DueTask, TemperatureReading};
use serde::{Deserialize, Serialize};

/// Plot area the sparkline points are scaled into.
///
/// The origin sits at the top-left corner, so larger values map to
/// smaller `y` coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotArea {
    pub width: f64,
    pub height: f64,
}

impl Default for PlotArea {
    /// Percent scale: both axes span 0..=100
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
        }
    }
}

/// A single sparkline vertex
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

/// Derived chart data for one room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomChart {
    pub room: String,
    pub min: f64,
    pub max: f64,
    /// `max - min`, or 1 when every reading is equal
    pub range: f64,
    /// Value of the most recent reading
    pub latest: f64,
    pub points: Vec<ChartPoint>,
}

impl RoomChart {
    /// Build the chart for one room's readings, oldest first.
    ///
    /// Returns `None` for an empty series; the server never groups a room
    /// without readings.
    pub fn from_readings(room: &str, readings: &[TemperatureReading], area: PlotArea) -> Option<Self> {
        let latest = readings.last()?.value_c;

        let min = readings.iter().map(|r| r.value_c).fold(f64::INFINITY, f64::min);
        let max = readings.iter().map(|r| r.value_c).fold(f64::NEG_INFINITY, f64::max);
        let range = value_range(min, max);

        // A lone reading would divide by zero; it sits at the left edge
        let last_index = readings.len().saturating_sub(1).max(1) as f64;

        let points = readings
            .iter()
            .enumerate()
            .map(|(i, r)| ChartPoint {
                x: (i as f64 / last_index) * area.width,
                y: area.height - ((r.value_c - min) / range) * area.height,
            })
            .collect();

        Some(Self {
            room: room.to_string(),
            min,
            max,
            range,
            latest,
            points,
        })
    }

    /// Points formatted for an SVG `<polyline points="...">` attribute
    pub fn polyline(&self) -> String {
        self.points
            .iter()
            .map(|p| format!("{},{}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Standalone SVG rendering of the sparkline
    pub fn svg(&self, area: PlotArea) -> String {
        format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" preserveAspectRatio="none"><polyline points="{}" fill="none" stroke="#4dabf7" stroke-width="2" /></svg>"##,
            area.width,
            area.height,
            self.polyline()
        )
    }
}

/// `max - min` with a floor of 1 for flat series
pub fn value_range(min: f64, max: f64) -> f64 {
    let range = max - min;
    if range == 0.0 {
        1.0
    } else {
        range
    }
}

/// Renderable dashboard state derived from a snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    /// Passed through in server order
    pub due_tasks: Vec<DueTask>,
    /// One chart per room, sorted by room name
    pub charts: Vec<RoomChart>,
}

impl DashboardView {
    pub fn from_snapshot(snapshot: &DashboardSnapshot, area: PlotArea) -> Self {
        let charts = snapshot
            .recent_temps_by_room
            .iter()
            .filter_map(|(room, readings)| RoomChart::from_readings(room, readings, area))
            .collect();

        Self {
            due_tasks: snapshot.due_tasks.clone(),
            charts,
        }
    }

    /// False when there is no temperature data to chart
    pub fn has_charts(&self) -> bool {
        !self.charts.is_empty()
    }

    pub fn chart(&self, room: &str) -> Option<&RoomChart> {
        self.charts.iter().find(|c| c.room == room)
    }
}
