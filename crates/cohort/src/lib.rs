//! Facade crate for the subgroup division workspace.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it composes the feature crates and implements no business logic.
//!
//! ## Usage
//! - Depend on `cohort` with `server` and/or `client`.
//! - Call [`init`] (server) to build every feature slice for the API state.

pub use cohort_domain as domain;
pub use cohort_kernel as kernel;

/// Feature crates, re-exported under one roof.
pub mod features {
    pub use cohort_division as division;
    pub use cohort_rules as rules;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        "rules",
        #[cfg(feature = "server")]
        "server",
        #[cfg(feature = "client")]
        "client",
        #[cfg(any(feature = "server", feature = "client"))]
        "division",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

#[cfg(feature = "server")]
pub mod server {
    pub use cohort_division::server::division_router;
    pub use cohort_kernel::server::system_router;
}

/// Initializes every server-side feature slice.
///
/// # Errors
/// Returns the first slice initialization failure (for example an unreadable roster).
#[cfg(feature = "server")]
pub fn init(
    config: &domain::config::ApiConfig,
) -> Result<Vec<domain::registry::InitializedSlice>, cohort_division::server::EngineError> {
    let slices = vec![cohort_division::server::Division::init(config)?];
    Ok(slices)
}

#[cfg(test)]
mod tests {
    use super::features;

    #[test]
    fn rules_are_always_enabled() {
        assert!(features::is_enabled("rules"));
        assert!(!features::is_enabled("licensing"));
    }

    #[test]
    fn division_is_enabled_by_either_side() {
        let expected = cfg!(any(feature = "server", feature = "client"));
        assert_eq!(features::is_enabled("division"), expected);
    }
}
