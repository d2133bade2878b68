//! In-process guardian store, used when no database is configured and in
//! tests. Follows the same upsert rules as the `PostgreSQL` table.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use streamgarden_types::{Guardian, GuardianId};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::guardian_store::{DEFAULT_FLOWER_COUNT, UpsertOutcome, normalize_username};

/// Guardians held in memory, keyed by username. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryGuardianStore {
    guardians: Arc<RwLock<BTreeMap<String, Guardian>>>,
}

impl MemoryGuardianStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every guardian, highest count first.
    pub async fn list(&self) -> Vec<Guardian> {
        let guardians = self.guardians.read().await;
        let mut list: Vec<Guardian> = guardians.values().cloned().collect();
        list.sort_by(|a, b| {
            b.flower_count
                .cmp(&a.flower_count)
                .then_with(|| a.achieved_at.cmp(&b.achieved_at))
        });
        list
    }

    /// Insert `username`, or raise their count if `flower_count` is higher.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyUsername`] for a blank name.
    pub async fn add(
        &self,
        username: &str,
        flower_count: Option<u32>,
    ) -> Result<UpsertOutcome, StoreError> {
        let username = normalize_username(username)?;
        let count = flower_count.unwrap_or(DEFAULT_FLOWER_COUNT);

        let mut guardians = self.guardians.write().await;
        match guardians.get_mut(username) {
            Some(existing) if existing.flower_count < count => {
                existing.flower_count = count;
                Ok(UpsertOutcome::Updated)
            }
            Some(_) => Ok(UpsertOutcome::Unchanged),
            None => {
                guardians.insert(
                    username.to_owned(),
                    Guardian {
                        id: GuardianId::new(),
                        username: username.to_owned(),
                        flower_count: count,
                        achieved_at: Utc::now(),
                    },
                );
                Ok(UpsertOutcome::Inserted)
            }
        }
    }
}
