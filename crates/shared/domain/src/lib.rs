//! # Domain Models
//!
//! Pure data types shared by the division client and the division engine (`serde` only,
//! plus `utoipa` schemas behind the `server` feature).
//! Keep it lean: no I/O, networking, or partitioning logic; just wire shapes and simple helpers.

pub mod config;
pub mod division;
pub mod registry;

/// OpenAPI tag for system endpoints (health).
pub const SYSTEM_TAG: &str = "System";
/// OpenAPI tag for the subgroup division endpoints.
pub const SUBGROUPS_TAG: &str = "Subgroups";
