use crate::client::error::DivisionError;
use cohort_domain::division::{ConfirmResponse, DivisionConfig, DivisionJob, Subgroup, UndoResponse};
use std::future::Future;

/// A downloaded export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Transport to the division engine, scoped to one group.
///
/// Implementations report non-2xx answers carrying an `error` field as
/// [`DivisionError::Domain`] and everything else that goes wrong on the way as
/// [`DivisionError::Transport`].
pub trait DivisionEngine: Send + Sync {
    fn generate(
        &self,
        config: &DivisionConfig,
    ) -> impl Future<Output = Result<DivisionJob, DivisionError>> + Send;

    fn confirm(
        &self,
        job_id: &str,
    ) -> impl Future<Output = Result<ConfirmResponse, DivisionError>> + Send;

    /// Reverses the group's most recently confirmed division.
    fn undo(&self) -> impl Future<Output = Result<UndoResponse, DivisionError>> + Send;

    fn export(&self, job_id: &str) -> impl Future<Output = Result<ExportFile, DivisionError>> + Send;

    fn list_subgroups(&self) -> impl Future<Output = Result<Vec<Subgroup>, DivisionError>> + Send;
}
