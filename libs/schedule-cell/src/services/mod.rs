pub mod availability;
pub mod template;

pub use availability::AvailabilityService;
pub use template::SlotTemplateService;
