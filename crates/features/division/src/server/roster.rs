//! Member population per group, loaded once at startup.
//!
//! File format:
//! ```json
//! { "groups": { "1": [ { "id": 10, "name": "Ana", "email": "ana@example.com",
//!                        "categories": ["leader"],
//!                        "availability": [ { "weekday": 0, "hour": 9 } ] } ] } }
//! ```

use crate::server::error::EngineError;
use fxhash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// One weekly availability slot (`weekday` 0 = Monday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub struct AvailabilitySlot {
    pub weekday: u8,
    pub hour: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub availability: Vec<AvailabilitySlot>,
}

impl RosterMember {
    /// Distinct slots this member is available in.
    #[must_use]
    pub fn slots(&self) -> FxHashSet<AvailabilitySlot> {
        self.availability.iter().copied().collect()
    }
}

#[derive(Debug, Deserialize)]
struct RosterFile {
    groups: FxHashMap<String, Vec<RosterMember>>,
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    groups: FxHashMap<u64, Arc<[RosterMember]>>,
}

impl Roster {
    /// # Errors
    /// [`EngineError::Roster`] if the file is unreadable or malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| EngineError::Roster {
            message: e.to_string().into(),
            context: Some(format!("Reading {}", path.display()).into()),
        })?;
        let roster = Self::from_json(&raw)?;
        info!(path = %path.display(), groups = roster.groups.len(), "Roster loaded");
        Ok(roster)
    }

    /// # Errors
    /// [`EngineError::Roster`] for invalid JSON or a non-numeric group id.
    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        let file: RosterFile = serde_json::from_str(raw).map_err(|e| EngineError::Roster {
            message: e.to_string().into(),
            context: Some("Parsing roster".into()),
        })?;

        let mut groups = FxHashMap::default();
        for (key, members) in file.groups {
            let id = key.trim().parse::<u64>().map_err(|_| EngineError::Roster {
                message: format!("group id '{key}' is not a number").into(),
                context: None,
            })?;
            groups.insert(id, members.into());
        }
        Ok(Self { groups })
    }

    pub fn from_groups<I>(groups: I) -> Self
    where
        I: IntoIterator<Item = (u64, Vec<RosterMember>)>,
    {
        Self { groups: groups.into_iter().map(|(id, members)| (id, members.into())).collect() }
    }

    /// # Errors
    /// [`EngineError::UnknownGroup`] if the roster has no such group.
    pub fn members(&self, group_id: u64) -> Result<Arc<[RosterMember]>, EngineError> {
        self.groups.get(&group_id).cloned().ok_or_else(|| EngineError::UnknownGroup {
            message: group_id.to_string().into(),
            context: None,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_groups_and_defaults() {
        let roster = Roster::from_json(
            r#"{ "groups": { "3": [
                { "id": 1, "name": "Ana", "availability": [
                    { "weekday": 0, "hour": 9 }, { "weekday": 0, "hour": 9 } ] }
            ] } }"#,
        )
        .unwrap();

        let members = roster.members(3).unwrap();
        assert_eq!(members.len(), 1);
        assert!(members[0].categories.is_empty());
        assert_eq!(members[0].slots().len(), 1);
        assert!(matches!(roster.members(4), Err(EngineError::UnknownGroup { .. })));
    }

    #[test]
    fn rejects_malformed_files() {
        assert!(matches!(Roster::from_json("{"), Err(EngineError::Roster { .. })));
        assert!(matches!(
            Roster::from_json(r#"{ "groups": { "abc": [] } }"#),
            Err(EngineError::Roster { .. })
        ));
    }
}
