//! Shared server plumbing: the API state with its slice registry and the system router.

mod health;
mod router;
mod state;

pub use health::HealthResponse;
pub use router::system_router;
pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateInner};
