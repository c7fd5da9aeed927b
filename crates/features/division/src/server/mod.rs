//! Division engine: roster, compatibility, partition heuristic, job store and HTTP routes.

pub mod compat;
mod error;
pub mod export;
mod handlers;
pub mod partition;
pub mod roster;
mod router;
mod slice;
mod store;

pub use error::{EngineError, EngineErrorExt};
pub use handlers::ExportQuery;
pub use roster::{AvailabilitySlot, Roster, RosterMember};
pub use router::division_router;
pub use slice::{Division, DivisionInner};
pub use store::DivisionStore;
