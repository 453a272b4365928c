pub mod booking;
pub mod ledger;
pub mod lifecycle;
pub mod payment;

pub use booking::BookingService;
pub use ledger::AppointmentLedger;
pub use lifecycle::AppointmentLifecycle;
pub use payment::{CheckoutGateway, PaymentProvider};
