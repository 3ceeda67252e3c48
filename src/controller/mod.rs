//! Controllers
//!
//! User-action flows for the two dashboard screens. Each action issues a
//! single API request; on success the affected view is reloaded and the
//! error banner cleared, on failure the banner shows the error and the
//! cached view is left untouched.

mod appliances;
mod dashboard;

pub use appliances::AppliancesController;
pub use dashboard::DashboardController;

use crate::client::ApiResult;
use crate::state::ViewStore;

/// Reflect the outcome of a user action in the error banner
async fn record<T>(store: &ViewStore, action: &str, result: ApiResult<T>) -> ApiResult<T> {
    match &result {
        Ok(_) => store.update(|s| s.clear_error()).await,
        Err(e) => {
            tracing::warn!("{} failed: {}", action, e);
            let message = e.to_string();
            store.update(|s| s.set_error(message)).await
        }
    }
    result
}
