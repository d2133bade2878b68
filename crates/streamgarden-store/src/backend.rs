//! Runtime choice of guardian store.

use streamgarden_types::Guardian;

use crate::error::StoreError;
use crate::guardian_store::{PgGuardianStore, UpsertOutcome};
use crate::memory::MemoryGuardianStore;

/// The guardian store in use, picked at startup.
#[derive(Debug, Clone)]
pub enum GuardianBackend {
    /// `PostgreSQL` table.
    Postgres(PgGuardianStore),
    /// Process memory; lost on restart.
    Memory(MemoryGuardianStore),
}

impl GuardianBackend {
    /// Short name for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }

    /// Every guardian, highest count first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database query fails.
    pub async fn list(&self) -> Result<Vec<Guardian>, StoreError> {
        match self {
            Self::Postgres(store) => store.list().await,
            Self::Memory(store) => Ok(store.list().await),
        }
    }

    /// Insert `username`, or raise their count if `flower_count` is higher.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] for a blank name, an out-of-range count, or a
    /// failed database write.
    pub async fn add(
        &self,
        username: &str,
        flower_count: Option<u32>,
    ) -> Result<UpsertOutcome, StoreError> {
        let outcome = match self {
            Self::Postgres(store) => store.add(username, flower_count).await?,
            Self::Memory(store) => store.add(username, flower_count).await?,
        };
        tracing::info!(
            backend = self.name(),
            username,
            flower_count,
            outcome = outcome.as_str(),
            "guardian upsert"
        );
        Ok(outcome)
    }
}

impl From<MemoryGuardianStore> for GuardianBackend {
    fn from(store: MemoryGuardianStore) -> Self {
        Self::Memory(store)
    }
}

impl From<PgGuardianStore> for GuardianBackend {
    fn from(store: PgGuardianStore) -> Self {
        Self::Postgres(store)
    }
}
