//! Text Rendering
//!
//! Plain-text renderings of the dashboard and appliance views used by the
//! terminal front-ends.

use super::appliances::ApplianceCard;
use super::dashboard::{DashboardView, PlotArea, RoomChart};

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Unicode block sparkline for a room chart
pub fn sparkline(chart: &RoomChart, area: PlotArea) -> String {
    chart
        .points
        .iter()
        .map(|p| {
            // y grows downward, so invert before bucketing
            let level = ((area.height - p.y) / area.height * (SPARK_LEVELS.len() - 1) as f64).round();
            SPARK_LEVELS[(level.max(0.0) as usize).min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

/// Error banner followed by a blank line
fn banner(lines: &mut Vec<String>, error: Option<&str>) {
    if let Some(error) = error {
        lines.push(format!("! {}", error));
        lines.push(String::new());
    }
}

/// Join rows into newline-terminated text
fn finish(lines: Vec<String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}

/// Full dashboard screen, optionally with an error banner on top
pub fn dashboard_text(view: &DashboardView, area: PlotArea, error: Option<&str>) -> String {
    let mut lines = Vec::new();
    banner(&mut lines, error);

    lines.push("Due Tasks".to_string());
    if view.due_tasks.is_empty() {
        lines.push("  No tasks due.".to_string());
    }
    lines.extend(
        view.due_tasks
            .iter()
            .map(|task| format!("  #{} {}: {}", task.id, task.appliance.name, task.due_date)),
    );

    lines.push(String::new());
    lines.push("Temperature (per room)".to_string());
    if !view.has_charts() {
        lines.push("  No temperature data.".to_string());
    }
    lines.extend(view.charts.iter().map(|chart| {
        format!(
            "  {:<12} {}  {:.1}°C latest  Range {:.1}–{:.1}°C",
            chart.room,
            sparkline(chart, area),
            chart.latest,
            chart.min,
            chart.max
        )
    }));

    finish(lines)
}

/// Appliance grid as a list of text rows
pub fn appliances_text(cards: &[ApplianceCard], error: Option<&str>) -> String {
    let mut lines = Vec::new();
    banner(&mut lines, error);

    if cards.is_empty() {
        lines.push("No appliances.".to_string());
        return finish(lines);
    }

    for card in cards {
        lines.push(format!(
            "[{}] #{:<4} {:<24} {:<16}{}",
            if card.selected { "x" } else { " " },
            card.appliance.id,
            card.appliance.name,
            card.schedule,
            if card.overdue { "  OVERDUE" } else { "" }
        ));

        for row in card.tasks.iter().flatten() {
            let status = match (row.task.completed, row.task.completed_at) {
                (true, Some(at)) => format!("done {}", at.format("%Y-%m-%d %H:%M:%S")),
                (true, None) => "done".to_string(),
                (false, _) if row.overdue => "due".to_string(),
                (false, _) => "pending".to_string(),
            };
            lines.push(format!("      task #{:<5} {}  {}", row.task.id, row.task.due_date, status));
        }
    }

    finish(lines)
}
