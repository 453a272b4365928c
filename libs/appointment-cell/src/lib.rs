use std::sync::Arc;

use shared_config::AppConfig;
use shared_store::ClinicStore;

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use services::*;

/// Shared state for appointment routes.
#[derive(Clone)]
pub struct BookingState {
    pub config: Arc<AppConfig>,
    pub store: Arc<ClinicStore>,
    pub payments: Arc<dyn services::payment::PaymentProvider>,
}
