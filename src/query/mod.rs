pub mod coordinator;
pub mod state;

pub use coordinator::{PollingQueryCoordinator, MIN_POLL_INTERVAL};
pub use state::{Completion, QueryState, RequestSequencer};
