//! Lifecycle of one computed-but-unconfirmed division.
//!
//! ```text
//!            submit ok
//!   Idle ──► Submitting ──────► Previewing(job)
//!    ▲           │ err               │ confirm ok / redo
//!    └───────────┴───────────────────┘
//! ```
//!
//! Every operation takes `&mut self`, so one controller never has two requests in flight.
//! The held job (and its `job_id`) lives only inside [`ControllerState::Previewing`].

use crate::client::engine::{DivisionEngine, ExportFile};
use crate::client::error::DivisionError;
use cohort_domain::division::{DivisionConfig, DivisionJob, Subgroup};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ControllerState {
    #[default]
    Idle,
    Submitting,
    Previewing(DivisionJob),
}

/// Explicit user decision required before a destructive call (confirm, undo).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledgment {
    Granted,
    Declined,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    /// No request was issued; the preview is still held.
    Declined,
    Confirmed { redirect_url: Option<String>, subgroups: Vec<Subgroup> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoOutcome {
    Declined,
    Undone { message: String },
}

/// Drives submit, confirm, redo, export and undo through a [`DivisionEngine`].
#[derive(Debug)]
pub struct DivisionController<E> {
    engine: E,
    state: ControllerState,
    confirmed_divisions: usize,
}

/// Puts a controller left in `Submitting` (future dropped mid-flight) back to `Idle`.
struct SubmitGuard<'a> {
    state: &'a mut ControllerState,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if matches!(self.state, ControllerState::Submitting) {
            *self.state = ControllerState::Idle;
        }
    }
}

impl<E: DivisionEngine> DivisionController<E> {
    pub const fn new(engine: E) -> Self {
        Self { engine, state: ControllerState::Idle, confirmed_divisions: 0 }
    }

    /// Seeds how many confirmed divisions are known to exist for undo purposes.
    #[must_use]
    pub const fn with_confirmed_history(mut self, confirmed_divisions: usize) -> Self {
        self.confirmed_divisions = confirmed_divisions;
        self
    }

    pub const fn state(&self) -> &ControllerState {
        &self.state
    }

    pub const fn engine(&self) -> &E {
        &self.engine
    }

    pub const fn job(&self) -> Option<&DivisionJob> {
        match &self.state {
            ControllerState::Previewing(job) => Some(job),
            _ => None,
        }
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job().map(|job| job.job_id.as_str())
    }

    /// Whether [`Self::undo`] would issue a request.
    pub const fn can_undo(&self) -> bool {
        matches!(self.state, ControllerState::Idle) && self.confirmed_divisions > 0
    }

    /// Submits a configuration, superseding any held preview.
    ///
    /// # Errors
    /// * [`DivisionError::Validation`] for `num_groups < 2`; nothing is sent and the state
    ///   is unchanged.
    /// * Transport/domain failures from the engine; the controller is then `Idle`.
    pub async fn submit(&mut self, config: DivisionConfig) -> Result<&DivisionJob, DivisionError> {
        if config.num_groups < 2 {
            return Err(DivisionError::validation("At least 2 groups are required"));
        }

        {
            let Self { engine, state, .. } = &mut *self;
            if let ControllerState::Previewing(previous) = state {
                info!(job_id = %previous.job_id, "Discarding previous preview");
            }
            *state = ControllerState::Submitting;
            let guard = SubmitGuard { state };

            match engine.generate(&config).await {
                Ok(job) => {
                    info!(
                        job_id = %job.job_id,
                        groups = job.groups.len(),
                        unfulfilled = job.unfulfilled_rules.len(),
                        "Division preview received"
                    );
                    *guard.state = ControllerState::Previewing(job);
                },
                Err(err) => {
                    warn!(error = %err, "Division generation failed");
                    *guard.state = ControllerState::Idle;
                    return Err(err);
                },
            }
        }

        self.job().ok_or_else(|| "Preview vanished after a successful submit".into())
    }

    /// Persists the held preview.
    ///
    /// # Errors
    /// * [`DivisionError::Validation`] without a held preview.
    /// * Transport/domain failures; the same preview stays held and may be confirmed again.
    pub async fn confirm(&mut self, ack: Acknowledgment) -> Result<ConfirmOutcome, DivisionError> {
        let Some(job) = self.job() else {
            return Err(DivisionError::validation("There is no division preview to confirm"));
        };
        if ack == Acknowledgment::Declined {
            return Ok(ConfirmOutcome::Declined);
        }

        let job_id = job.job_id.clone();
        let response = self.engine.confirm(&job_id).await.inspect_err(|err| {
            warn!(%job_id, error = %err, "Confirm failed, preview kept");
        })?;

        info!(%job_id, subgroups = response.subgroups.len(), "Division confirmed");
        self.state = ControllerState::Idle;
        self.confirmed_divisions += 1;
        Ok(ConfirmOutcome::Confirmed {
            redirect_url: response.redirect_url,
            subgroups: response.subgroups,
        })
    }

    /// Discards the held preview locally. Returns `false` if there was none.
    pub fn redo(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            ControllerState::Previewing(job) => {
                info!(job_id = %job.job_id, "Preview discarded");
                true
            },
            other => {
                self.state = other;
                false
            },
        }
    }

    /// Downloads the CSV export of the held preview. Does not change state.
    ///
    /// # Errors
    /// * [`DivisionError::Validation`] without a held preview.
    /// * Transport/domain failures from the engine.
    pub async fn export(&self) -> Result<ExportFile, DivisionError> {
        let Some(job_id) = self.job_id() else {
            return Err(DivisionError::validation("There is no division preview to export"));
        };
        self.engine.export(job_id).await
    }

    /// Reverses the most recently confirmed division on the engine.
    ///
    /// # Errors
    /// * [`DivisionError::Validation`] unless `Idle` with a known confirmed division.
    /// * Transport/domain failures; nothing changes locally.
    pub async fn undo(&mut self, ack: Acknowledgment) -> Result<UndoOutcome, DivisionError> {
        if !matches!(self.state, ControllerState::Idle) {
            return Err(DivisionError::validation("Finish or discard the current preview first"));
        }
        if self.confirmed_divisions == 0 {
            return Err(DivisionError::validation("There is no confirmed division to undo"));
        }
        if ack == Acknowledgment::Declined {
            return Ok(UndoOutcome::Declined);
        }

        let response = self.engine.undo().await?;
        info!(
            remaining = response.remaining_divisions,
            message = %response.message,
            "Division undone"
        );
        self.confirmed_divisions = response.remaining_divisions;
        Ok(UndoOutcome::Undone { message: response.message })
    }

    /// Persisted subgroups of the group. Read-only.
    ///
    /// # Errors
    /// Transport/domain failures from the engine.
    pub async fn list_subgroups(&self) -> Result<Vec<Subgroup>, DivisionError> {
        self.engine.list_subgroups().await
    }
}
