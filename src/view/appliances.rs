//! Appliance View-Model
//!
//! Multi-select state, the lazily populated task cache, and the derived
//! per-appliance card shown in the appliance grid.

use crate::models::{Appliance, Task};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Interval applied when scheduling an unscheduled appliance
pub const DEFAULT_INTERVAL_DAYS: u32 = 7;

/// Set of appliance ids picked for bulk deletion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    ids: BTreeSet<i64>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` if absent, remove it if present.
    ///
    /// Returns whether `id` is selected afterwards.
    pub fn toggle(&mut self, id: i64) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Select `id`; selecting twice is the same as selecting once
    pub fn insert(&mut self, id: i64) {
        self.ids.insert(id);
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in ascending order
    pub fn ids(&self) -> Vec<i64> {
        self.ids.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Keep only ids for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(i64) -> bool) {
        self.ids.retain(|id| keep(*id));
    }
}

/// Most recently loaded task list per appliance.
///
/// Only appliances the user has expanded have an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskCache {
    tasks: HashMap<i64, Vec<Task>>,
}

impl TaskCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached list for an appliance wholesale
    pub fn replace(&mut self, appliance_id: i64, tasks: Vec<Task>) {
        self.tasks.insert(appliance_id, tasks);
    }

    pub fn get(&self, appliance_id: i64) -> Option<&[Task]> {
        self.tasks.get(&appliance_id).map(Vec::as_slice)
    }

    pub fn is_loaded(&self, appliance_id: i64) -> bool {
        self.tasks.contains_key(&appliance_id)
    }

    /// Drop entries for appliances that no longer exist
    pub fn retain_appliances(&mut self, appliances: &[Appliance]) {
        self.tasks
            .retain(|id, _| appliances.iter().any(|a| a.id == *id));
    }

    /// True iff the loaded list has an open task due before `now`.
    ///
    /// Appliances whose tasks were never loaded are not overdue.
    pub fn is_overdue(&self, appliance_id: i64, now: DateTime<Utc>) -> bool {
        self.get(appliance_id)
            .map(|tasks| tasks.iter().any(|t| t.is_overdue(now)))
            .unwrap_or(false)
    }
}

/// The interval the schedule toggle moves to: scheduled appliances become
/// unscheduled, unscheduled ones get `default_days`.
pub fn toggled_interval(current: Option<u32>, default_days: u32) -> Option<u32> {
    match current {
        Some(_) => None,
        None => Some(default_days),
    }
}

/// Human label for an appliance's schedule
pub fn schedule_label(interval: Option<u32>) -> String {
    match interval {
        Some(days) => format!("Every {} days", days),
        None => "Unscheduled".to_string(),
    }
}

/// Label of the schedule toggle button
pub fn toggle_label(interval: Option<u32>, default_days: u32) -> String {
    match interval {
        Some(_) => "Unschedule".to_string(),
        None => format!("Set {}d", default_days),
    }
}

/// Derived display row for one appliance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplianceCard {
    pub appliance: Appliance,
    pub schedule: String,
    pub toggle_action: String,
    pub selected: bool,
    pub overdue: bool,
    /// `None` until the user loads this appliance's tasks
    pub tasks: Option<Vec<TaskRow>>,
}

/// Derived display row for one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRow {
    pub task: Task,
    pub overdue: bool,
}

/// Build the card for every appliance, in list order
pub fn appliance_cards(
    appliances: &[Appliance],
    selection: &Selection,
    cache: &TaskCache,
    default_days: u32,
    now: DateTime<Utc>,
) -> Vec<ApplianceCard> {
    appliances
        .iter()
        .map(|a| ApplianceCard {
            appliance: a.clone(),
            schedule: schedule_label(a.cleaning_interval_days),
            toggle_action: toggle_label(a.cleaning_interval_days, default_days),
            selected: selection.contains(a.id),
            overdue: cache.is_overdue(a.id, now),
            tasks: cache.get(a.id).map(|tasks| {
                tasks
                    .iter()
                    .map(|t| TaskRow {
                        task: t.clone(),
                        overdue: t.is_overdue(now),
                    })
                    .collect()
            }),
        })
        .collect()
}
