//! The `guardians` table.
//!
//! A guardian row is created the first time a user's lifetime total
//! reaches the threshold. Later writes only ever raise the count:
//!
//! ```sql
//! INSERT ... ON CONFLICT (username) DO UPDATE
//!     SET flower_count = EXCLUDED.flower_count
//!     WHERE guardians.flower_count < EXCLUDED.flower_count
//! ```
//!
//! When the `WHERE` fails no row comes back, which is how an unchanged
//! write is told apart from an insert or an update.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use streamgarden_types::{Guardian, GuardianId};
use uuid::Uuid;

use crate::error::StoreError;

/// Count recorded when a caller does not supply one.
pub const DEFAULT_FLOWER_COUNT: u32 = 50;

/// What an upsert did. The HTTP surface does not expose this; it is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new guardian row was created.
    Inserted,
    /// An existing row's count was raised.
    Updated,
    /// The stored count was already at least as high.
    Unchanged,
}

impl UpsertOutcome {
    /// Lowercase label for log fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inserted => "inserted",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Trim a username and refuse an empty one.
///
/// # Errors
///
/// Returns [`StoreError::EmptyUsername`] if nothing is left after trimming.
pub fn normalize_username(raw: &str) -> Result<&str, StoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(StoreError::EmptyUsername);
    }
    Ok(trimmed)
}

/// A row from the `guardians` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GuardianRow {
    /// Row id.
    pub id: Uuid,
    /// Unique username.
    pub username: String,
    /// Highest lifetime total recorded.
    pub flower_count: i32,
    /// When the row was created.
    pub achieved_at: DateTime<Utc>,
}

impl From<GuardianRow> for Guardian {
    fn from(row: GuardianRow) -> Self {
        Self {
            id: GuardianId::from(row.id),
            username: row.username,
            flower_count: u32::try_from(row.flower_count).unwrap_or(0),
            achieved_at: row.achieved_at,
        }
    }
}

/// Guardian persistence backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgGuardianStore {
    pool: PgPool,
}

impl PgGuardianStore {
    /// Create a store on an existing pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every guardian, highest count first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Postgres`] if the query fails.
    pub async fn list(&self) -> Result<Vec<Guardian>, StoreError> {
        let rows = sqlx::query_as::<_, GuardianRow>(
            r"SELECT id, username, flower_count, achieved_at
              FROM guardians
              ORDER BY flower_count DESC, achieved_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Guardian::from).collect())
    }

    /// Insert `username`, or raise their count if `flower_count` is higher.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyUsername`] for a blank name,
    /// [`StoreError::CountOutOfRange`] if the count does not fit the
    /// column, and [`StoreError::Postgres`] if the statement fails.
    pub async fn add(
        &self,
        username: &str,
        flower_count: Option<u32>,
    ) -> Result<UpsertOutcome, StoreError> {
        let username = normalize_username(username)?;
        let count = flower_count.unwrap_or(DEFAULT_FLOWER_COUNT);
        let count_i32 = i32::try_from(count).or(Err(StoreError::CountOutOfRange(count)))?;

        // `xmax = 0` only holds for a freshly inserted tuple.
        let row: Option<(bool,)> = sqlx::query_as(
            r"INSERT INTO guardians (id, username, flower_count, achieved_at)
              VALUES ($1, $2, $3, now())
              ON CONFLICT (username) DO UPDATE
                  SET flower_count = EXCLUDED.flower_count
                  WHERE guardians.flower_count < EXCLUDED.flower_count
              RETURNING (xmax = 0) AS inserted",
        )
        .bind(GuardianId::new().into_inner())
        .bind(username)
        .bind(count_i32)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some((true,)) => UpsertOutcome::Inserted,
            Some((false,)) => UpsertOutcome::Updated,
            None => UpsertOutcome::Unchanged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_are_trimmed() {
        assert!(matches!(normalize_username(" fern "), Ok("fern")));
        assert!(matches!(
            normalize_username("   "),
            Err(StoreError::EmptyUsername)
        ));
    }

    #[test]
    fn negative_counts_read_as_zero() {
        let row = GuardianRow {
            id: Uuid::nil(),
            username: "fern".to_owned(),
            flower_count: -3,
            achieved_at: Utc::now(),
        };
        assert_eq!(Guardian::from(row).flower_count, 0);
    }
}
