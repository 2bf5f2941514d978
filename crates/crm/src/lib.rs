pub mod circuit;
pub mod client;
pub mod error;
pub mod lead;
pub mod region;
pub mod throttle;
mod token;

pub use circuit::{CircuitBreaker, CircuitState};
pub use client::{CrmClient, LeadSync};
pub use error::CrmError;
pub use lead::{LeadPayload, LeadRecord};
pub use region::Region;
