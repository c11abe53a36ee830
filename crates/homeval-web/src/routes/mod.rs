pub mod health;
pub mod lead;

pub use health::health;
pub use lead::{lookup_lead, method_not_allowed, preflight, LeadRequest, LEAD_PATH};
