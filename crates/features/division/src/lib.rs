//! # Subgroup Division
//!
//! Both halves of the division workflow, split by feature:
//!
//! * **`client`**: the [`DivisionController`](client::DivisionController) state machine
//!   (`Idle`, `Submitting`, `Previewing`) driving a [`DivisionEngine`](client::DivisionEngine)
//!   transport, the reqwest-based [`HttpEngine`](client::HttpEngine) and a side-effect free
//!   preview [`view`](client::view).
//! * **`server`**: the division engine itself. A member roster, pairwise availability
//!   compatibility, the greedy-then-repair partition heuristic, a TTL-bounded store of
//!   pending jobs, confirmed subgroups with an undo stack, CSV export and the axum routes.

#[cfg(feature = "client")]
pub mod client;
#[cfg(feature = "server")]
pub mod server;
