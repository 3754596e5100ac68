//! Repository for the `plan_versions` sequence table.

use plans_core::types::DbId;
use sqlx::PgConnection;

/// Mints version tokens shared by all plans.
pub struct VersionRepo;

impl VersionRepo {
    /// Append a row to `plan_versions` and return its assigned id.
    ///
    /// Every call yields a new, strictly larger token. The sequence lives in
    /// the database, so tokens stay unique across service instances.
    pub async fn mint(conn: &mut PgConnection) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar("INSERT INTO plan_versions DEFAULT VALUES RETURNING id")
            .fetch_one(conn)
            .await
    }
}
