//! Pending jobs, persisted subgroups and the per-group undo stack.

use crate::server::error::EngineError;
use crate::server::export;
use chrono::{SecondsFormat, Utc};
use cohort_domain::division::{DivisionJob, Subgroup, SubgroupMember, UndoResponse};
use fxhash::FxHashMap;
use moka::sync::Cache;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug)]
struct PendingJob {
    group_id: u64,
    job: DivisionJob,
}

#[derive(Debug)]
struct ConfirmedDivision {
    job: DivisionJob,
    subgroups: Vec<Subgroup>,
}

#[derive(Debug, Default)]
struct GroupLedger {
    pending_job: Option<String>,
    subgroups: Vec<Subgroup>,
    /// Undo stack, most recent last.
    divisions: Vec<ConfirmedDivision>,
}

impl GroupLedger {
    fn confirmed(&self, job_id: &str) -> Option<&ConfirmedDivision> {
        self.divisions.iter().find(|d| d.job.job_id == job_id)
    }
}

/// In-memory engine state. Pending jobs expire; persisted subgroups live until undone.
pub struct DivisionStore {
    pending: Cache<String, Arc<PendingJob>>,
    ledgers: RwLock<FxHashMap<u64, GroupLedger>>,
    next_subgroup_id: AtomicU64,
}

impl std::fmt::Debug for DivisionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DivisionStore")
            .field("pending", &self.pending.entry_count())
            .field("groups", &self.ledgers.read().len())
            .finish_non_exhaustive()
    }
}

impl DivisionStore {
    #[must_use]
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            pending: Cache::builder().max_capacity(capacity).time_to_live(ttl).build(),
            ledgers: RwLock::new(FxHashMap::default()),
            next_subgroup_id: AtomicU64::new(1),
        }
    }

    /// Stores a freshly generated job, dropping the group's previous pending job.
    pub fn save_pending(&self, group_id: u64, job: DivisionJob) {
        let job_id = job.job_id.clone();
        let previous = {
            let mut ledgers = self.ledgers.write();
            ledgers.entry(group_id).or_default().pending_job.replace(job_id.clone())
        };
        if let Some(previous) = previous {
            self.pending.invalidate(&previous);
            debug!(group_id, job_id = %previous, "Superseded pending job dropped");
        }
        self.pending.insert(job_id, Arc::new(PendingJob { group_id, job }));
    }

    /// Persists a pending job's groups. Confirming the same job again returns the
    /// subgroups created the first time.
    ///
    /// # Errors
    /// * [`EngineError::JobNotFound`] for an unknown or expired job.
    /// * [`EngineError::ForeignJob`] when the job was generated for another group.
    /// * [`EngineError::EmptyDivision`] when the preview holds no groups.
    pub fn confirm(&self, group_id: u64, job_id: &str) -> Result<Vec<Subgroup>, EngineError> {
        if let Some(subgroups) = self.already_confirmed(group_id, job_id)? {
            debug!(group_id, job_id, "Job already confirmed");
            return Ok(subgroups);
        }

        let Some(pending) = self.pending.get(job_id) else {
            // a concurrent confirm may have consumed the pending entry meanwhile
            return self.already_confirmed(group_id, job_id)?.ok_or_else(|| not_found(job_id));
        };
        if pending.group_id != group_id {
            return Err(foreign(job_id));
        }
        if pending.job.groups.is_empty() {
            return Err(EngineError::EmptyDivision {
                message: format!("job {job_id} has no groups to confirm").into(),
                context: None,
            });
        }

        let mut ledgers = self.ledgers.write();
        let ledger = ledgers.entry(group_id).or_default();
        // a concurrent confirm may have won the race
        if let Some(division) = ledger.confirmed(job_id) {
            return Ok(division.subgroups.clone());
        }

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let subgroups: Vec<Subgroup> = pending
            .job
            .groups
            .iter()
            .map(|group| Subgroup {
                id: self.next_subgroup_id.fetch_add(1, Ordering::Relaxed),
                name: group.name.clone(),
                division: job_id.to_owned(),
                compatibility_avg: group.compatibility_avg,
                rules_status: group.rules_status.clone(),
                members: group
                    .members
                    .iter()
                    .map(|m| SubgroupMember {
                        id: m.id,
                        name: m.name.clone(),
                        email: m.email.clone(),
                        added_at: now.clone(),
                    })
                    .collect(),
                created_at: now.clone(),
            })
            .collect();

        ledger.subgroups.extend(subgroups.iter().cloned());
        ledger
            .divisions
            .push(ConfirmedDivision { job: pending.job.clone(), subgroups: subgroups.clone() });
        if ledger.pending_job.as_deref() == Some(job_id) {
            ledger.pending_job = None;
        }
        drop(ledgers);

        self.pending.invalidate(job_id);
        info!(group_id, job_id, subgroups = subgroups.len(), "Division confirmed");
        Ok(subgroups)
    }

    /// Reverts the most recent confirmed division of the group.
    ///
    /// # Errors
    /// [`EngineError::NothingToUndo`] when the group has no confirmed division.
    pub fn undo(&self, group_id: u64) -> Result<UndoResponse, EngineError> {
        let mut ledgers = self.ledgers.write();
        let ledger = ledgers.get_mut(&group_id).ok_or_else(|| nothing_to_undo(group_id))?;
        let division = ledger.divisions.pop().ok_or_else(|| nothing_to_undo(group_id))?;

        let removed = division.subgroups.len();
        ledger.subgroups.retain(|s| !division.subgroups.iter().any(|d| d.id == s.id));
        let remaining_divisions = ledger.divisions.len();
        drop(ledgers);

        info!(group_id, job_id = %division.job.job_id, removed, "Division undone");
        Ok(UndoResponse { message: format!("Removed {removed} subgroups."), remaining_divisions })
    }

    /// CSV of a pending or confirmed job, or of all persisted subgroups without `job_id`.
    ///
    /// # Errors
    /// * [`EngineError::JobNotFound`] / [`EngineError::ForeignJob`] as in [`Self::confirm`].
    /// * [`EngineError::NothingToExport`] when the group has no persisted subgroups.
    pub fn export(&self, group_id: u64, job_id: Option<&str>) -> Result<String, EngineError> {
        let Some(job_id) = job_id else {
            let ledgers = self.ledgers.read();
            let subgroups = ledgers.get(&group_id).map(|l| l.subgroups.as_slice()).unwrap_or_default();
            if subgroups.is_empty() {
                return Err(EngineError::NothingToExport {
                    message: format!("group {group_id} has no subgroups").into(),
                    context: None,
                });
            }
            return Ok(export::persisted_csv(subgroups));
        };

        if let Some(pending) = self.pending.get(job_id) {
            if pending.group_id != group_id {
                return Err(foreign(job_id));
            }
            return Ok(export::preview_csv(&pending.job));
        }

        let ledgers = self.ledgers.read();
        if let Some(division) = ledgers.get(&group_id).and_then(|l| l.confirmed(job_id)) {
            return Ok(export::preview_csv(&division.job));
        }
        if ledgers.values().any(|l| l.confirmed(job_id).is_some()) {
            return Err(foreign(job_id));
        }
        Err(not_found(job_id))
    }

    #[must_use]
    pub fn subgroups(&self, group_id: u64) -> Vec<Subgroup> {
        self.ledgers.read().get(&group_id).map(|l| l.subgroups.clone()).unwrap_or_default()
    }

    /// `Some` with the stored subgroups when the group already confirmed `job_id`.
    fn already_confirmed(&self, group_id: u64, job_id: &str) -> Result<Option<Vec<Subgroup>>, EngineError> {
        let ledgers = self.ledgers.read();
        if let Some(division) = ledgers.get(&group_id).and_then(|l| l.confirmed(job_id)) {
            return Ok(Some(division.subgroups.clone()));
        }
        if ledgers.iter().any(|(&gid, l)| gid != group_id && l.confirmed(job_id).is_some()) {
            return Err(foreign(job_id));
        }
        Ok(None)
    }
}

fn not_found(job_id: &str) -> EngineError {
    EngineError::JobNotFound { message: job_id.to_owned().into(), context: None }
}

fn foreign(job_id: &str) -> EngineError {
    EngineError::ForeignJob { message: job_id.to_owned().into(), context: None }
}

fn nothing_to_undo(group_id: u64) -> EngineError {
    EngineError::NothingToUndo {
        message: format!("group {group_id} has no confirmed division").into(),
        context: None,
    }
}
