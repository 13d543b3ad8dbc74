pub mod dashboard;
pub mod forecasts;
pub mod health;
pub mod refresh;

use crate::errors::AppError;
use crate::models::Dashboard;
use crate::services::refresh::SharedDashboard;

/// Clone the published dashboard, or 503 until the first full refresh lands.
pub(crate) async fn published(store: &SharedDashboard) -> Result<Dashboard, AppError> {
    store.read().await.dashboard.clone().ok_or_else(|| {
        AppError::NotReady("Dashboard is still loading, retry shortly".to_string())
    })
}
