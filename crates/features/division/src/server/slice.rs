use crate::server::error::EngineError;
use crate::server::roster::Roster;
use crate::server::store::DivisionStore;
use cohort_domain::config::{ApiConfig, EngineConfig};
use cohort_domain::registry::InitializedSlice;
use std::time::Duration;
use tracing::info;

/// Division engine state shared by the subgroup handlers.
#[cohort_derive::cohort_slice]
pub struct Division {
    pub roster: Roster,
    pub store: DivisionStore,
    pub repair_iterations: usize,
    redirect_template: String,
}

impl Division {
    /// Loads the roster named by the engine configuration and registers the slice.
    ///
    /// # Errors
    /// [`EngineError::Roster`] if the roster file cannot be loaded.
    pub fn init(config: &ApiConfig) -> Result<InitializedSlice, EngineError> {
        let roster = Roster::load(&config.engine.roster_path)?;
        let slice = Self::from_parts(roster, &config.engine);
        info!(groups = slice.roster.len(), "Division slice initialized");
        Ok(InitializedSlice::new(slice))
    }

    #[must_use]
    pub fn from_parts(roster: Roster, engine: &EngineConfig) -> Self {
        Self::new(DivisionInner {
            roster,
            store: DivisionStore::new(
                engine.pending_capacity,
                Duration::from_secs(engine.pending_ttl_seconds),
            ),
            repair_iterations: engine.repair_iterations,
            redirect_template: engine.redirect_template.clone(),
        })
    }

    /// Post-confirm navigation target for `group_id`; `None` when no template is set.
    #[must_use]
    pub fn redirect_url(&self, group_id: u64) -> Option<String> {
        let template = self.redirect_template.trim();
        (!template.is_empty()).then(|| template.replace("{group_id}", &group_id.to_string()))
    }
}
