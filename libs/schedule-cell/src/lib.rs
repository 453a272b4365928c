use std::sync::Arc;

use shared_config::AppConfig;
use shared_store::ClinicStore;

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use services::*;

/// Shared state for schedule routes.
#[derive(Clone)]
pub struct ScheduleState {
    pub config: Arc<AppConfig>,
    pub store: Arc<ClinicStore>,
}
