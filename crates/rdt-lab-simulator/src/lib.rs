pub mod channel;
pub mod scenario_runner;
pub mod session;
pub mod trace;

pub use channel::{LinkEventSummary, SimChannel, validate_config};
pub use session::Session;
pub use trace::SessionReport;
