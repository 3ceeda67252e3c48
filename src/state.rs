//! View State
//!
//! The single store holding everything the dashboard screens render:
//! cached server responses plus UI-only state (selection, expanded task
//! lists, the error banner).
//!
//! Fetches that replace cached data take a [`Ticket`] before the request is
//! sent. A response is applied only if no newer ticket for the same
//! resource has been applied already, so a slow response can never
//! overwrite a fresher one.

use crate::models::{Appliance, DashboardSnapshot, Task};
use crate::view::{Selection, TaskCache};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock, RwLockReadGuard};

/// Cached resources that are refreshed by whole-value replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Dashboard,
    Appliances,
    Tasks(i64),
}

/// Sequence number taken before a fetch is issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    resource: Resource,
    seq: u64,
}

impl Ticket {
    pub fn resource(&self) -> Resource {
        self.resource
    }
}

/// Monotonic request sequencing per resource
#[derive(Debug, Clone, Default)]
pub struct RequestSequence {
    next: u64,
    applied: HashMap<Resource, u64>,
}

impl RequestSequence {
    /// Take the next ticket for `resource`
    pub fn issue(&mut self, resource: Resource) -> Ticket {
        self.next += 1;
        Ticket {
            resource,
            seq: self.next,
        }
    }

    /// Record `ticket` as applied if it is newer than anything applied for
    /// its resource. Returns false for stale tickets.
    pub fn try_apply(&mut self, ticket: Ticket) -> bool {
        let applied = self.applied.entry(ticket.resource).or_insert(0);
        if ticket.seq > *applied {
            *applied = ticket.seq;
            true
        } else {
            false
        }
    }
}

/// Everything the screens render, in one serializable value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewState {
    /// Latest dashboard snapshot, `None` until the first load succeeds
    pub dashboard: Option<DashboardSnapshot>,
    pub appliances: Vec<Appliance>,
    pub selection: Selection,
    pub tasks: TaskCache,
    /// Error banner; cleared on dismissal or the next successful action
    pub error: Option<String>,
    /// Dashboard fetches currently outstanding
    pub dashboard_in_flight: u32,
    /// Appliance list fetches currently outstanding
    pub appliances_in_flight: u32,
    #[serde(skip)]
    sequence: RequestSequence,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, resource: Resource) -> Ticket {
        self.sequence.issue(resource)
    }

    /// Store a fetched dashboard snapshot unless a newer one is in place
    pub fn apply_dashboard(&mut self, ticket: Ticket, snapshot: DashboardSnapshot) -> bool {
        if !self.accept(ticket) {
            return false;
        }
        self.dashboard = Some(snapshot);
        true
    }

    /// Store a fetched appliance list unless a newer one is in place.
    ///
    /// Cached task lists and selections of vanished appliances are dropped.
    pub fn apply_appliances(&mut self, ticket: Ticket, appliances: Vec<Appliance>) -> bool {
        if !self.accept(ticket) {
            return false;
        }
        self.tasks.retain_appliances(&appliances);
        self.selection
            .retain(|id| appliances.iter().any(|a| a.id == id));
        self.appliances = appliances;
        true
    }

    /// Store a fetched task list unless a newer one is in place
    pub fn apply_tasks(&mut self, ticket: Ticket, tasks: Vec<Task>) -> bool {
        let Resource::Tasks(appliance_id) = ticket.resource else {
            return false;
        };
        if !self.accept(ticket) {
            return false;
        }
        self.tasks.replace(appliance_id, tasks);
        true
    }

    fn accept(&mut self, ticket: Ticket) -> bool {
        let fresh = self.sequence.try_apply(ticket);
        if !fresh {
            tracing::debug!(resource = ?ticket.resource, "Discarding stale response");
        }
        fresh
    }

    /// Count a fetch of `resource` as outstanding
    pub fn start_loading(&mut self, resource: Resource) {
        match resource {
            Resource::Dashboard => self.dashboard_in_flight += 1,
            Resource::Appliances => self.appliances_in_flight += 1,
            Resource::Tasks(_) => {}
        }
    }

    pub fn finish_loading(&mut self, resource: Resource) {
        match resource {
            Resource::Dashboard => {
                self.dashboard_in_flight = self.dashboard_in_flight.saturating_sub(1)
            }
            Resource::Appliances => {
                self.appliances_in_flight = self.appliances_in_flight.saturating_sub(1)
            }
            Resource::Tasks(_) => {}
        }
    }

    pub fn is_dashboard_loading(&self) -> bool {
        self.dashboard_in_flight > 0
    }

    pub fn is_appliances_loading(&self) -> bool {
        self.appliances_in_flight > 0
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

/// Shared view-state store with change notification
pub struct ViewStore {
    state: RwLock<ViewState>,
    revision: watch::Sender<u64>,
}

impl ViewStore {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            state: RwLock::new(ViewState::new()),
            revision,
        }
    }

    /// Read access to the current state
    pub async fn read(&self) -> RwLockReadGuard<'_, ViewState> {
        self.state.read().await
    }

    /// Mutate the state and notify subscribers
    pub async fn update<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> R {
        let result = {
            let mut state = self.state.write().await;
            f(&mut state)
        };
        self.revision.send_modify(|rev| *rev += 1);
        result
    }

    /// Mutate the state without waiting; `None` if the lock is contended
    pub fn try_update<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> Option<R> {
        let result = {
            let mut state = self.state.try_write().ok()?;
            f(&mut state)
        };
        self.revision.send_modify(|rev| *rev += 1);
        Some(result)
    }

    /// Take a ticket for `resource` and mark it loading until the returned
    /// [`Fetch`] is finished or dropped
    pub async fn begin_fetch(self: &Arc<Self>, resource: Resource) -> Fetch {
        let ticket = self
            .update(|s| {
                s.start_loading(resource);
                s.issue(resource)
            })
            .await;
        Fetch {
            store: self.clone(),
            ticket,
            finished: false,
        }
    }

    /// Clone of the current state
    pub async fn snapshot(&self) -> ViewState {
        self.state.read().await.clone()
    }

    /// Receiver that observes a new revision after every update
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }
}

impl Default for ViewStore {
    fn default() -> Self {
        Self::new()
    }
}

/// An outstanding fetch. Dropping it unfinished, e.g. when the owning task
/// is aborted mid-request, still releases the loading flag.
pub struct Fetch {
    store: Arc<ViewStore>,
    ticket: Ticket,
    finished: bool,
}

impl Fetch {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Release the loading flag and apply the response under one write
    pub async fn finish<R>(mut self, f: impl FnOnce(&mut ViewState, Ticket) -> R) -> R {
        let ticket = self.ticket;
        let result = self
            .store
            .update(|s| {
                s.finish_loading(ticket.resource());
                f(s, ticket)
            })
            .await;
        self.finished = true;
        result
    }
}

impl Drop for Fetch {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let resource = self.ticket.resource();
        if self.store.try_update(|s| s.finish_loading(resource)).is_some() {
            return;
        }
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let store = self.store.clone();
            runtime.spawn(async move {
                store.update(|s| s.finish_loading(resource)).await;
            });
        }
    }
}
