//! Repository for `workout_plans` and its dependent tables.
//!
//! Reads join the plan row with the name and description of one language.
//! Collection reads collapse the workout and tag associations per plan with
//! `array_agg`. Writes run in a single transaction each and mint a fresh
//! version through [`VersionRepo`] whenever the plan row changes.

use plans_core::plan::{contains_pattern, PlanState};
use plans_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::plan::{ListedPlan, Plan, PlanCollection, PlanInput, PlanName, VersionStamp};
use crate::repositories::VersionRepo;

/// Plan, name and description columns shared by the joined read queries.
const PLAN_COLUMNS: &str = "\
    wp.id, wp.thumbnail, wp.raw_name, wp.type, wp.state, wp.version, \
    wpn.name, wpd.description, wpn.language";

/// Aggregated workout association ids.
const WORKOUT_IDS_AGG: &str = "\
    COALESCE(array_agg(DISTINCT wpw.workout_id ORDER BY wpw.workout_id) \
    FILTER (WHERE wpw.workout_id IS NOT NULL), '{}'::BIGINT[]) AS workout_ids";

/// Aggregated tag association ids.
const TAG_IDS_AGG: &str = "\
    COALESCE(array_agg(DISTINCT wpt.tag_id ORDER BY wpt.tag_id) \
    FILTER (WHERE wpt.tag_id IS NOT NULL), '{}'::BIGINT[]) AS tag_ids";

/// Joins for the localized read shape. `$1` is the language, `$2` the state.
const PLAN_JOINS: &str = "\
    FROM workout_plans AS wp \
    JOIN workout_plans_names AS wpn \
        ON wpn.workout_plans_parent = wp.id AND wpn.language = $1 \
    JOIN workout_plans_descriptions AS wpd \
        ON wpd.workout_plans_parent = wp.id AND wpd.language = $1 \
    LEFT JOIN workout_plans_workouts AS wpw ON wpw.workout_plans_parent = wp.id \
    LEFT JOIN workout_plans_tags AS wpt ON wpt.workout_plans_parent = wp.id";

/// One row per plan; name and description are fixed by their unique language.
const PLAN_GROUP_BY: &str = "GROUP BY wp.id, wpn.id, wpd.id";

/// Columns of the paginated listing.
const LIST_COLUMNS: &str = "\
    wp.id, wp.state, wp.version, wp.raw_name, wp.thumbnail, \
    wpn.name, wpn.language, wp.updated_at";

/// Provides the read and write operations for workout plans.
pub struct PlanRepo;

impl PlanRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Fetch a single plan in the given language and state.
    ///
    /// Returns `None` when the plan does not exist, is in another state, or
    /// has no name/description for `lang`.
    pub async fn find_by_id(
        pool: &PgPool,
        asset_base: &str,
        id: DbId,
        lang: &str,
        state: PlanState,
    ) -> Result<Option<Plan>, sqlx::Error> {
        let query = format!(
            "SELECT {PLAN_COLUMNS}, {WORKOUT_IDS_AGG}, {TAG_IDS_AGG} \
             {PLAN_JOINS} \
             WHERE wp.state = $2 AND wp.id = $3 \
             {PLAN_GROUP_BY}"
        );
        let plan = sqlx::query_as::<_, Plan>(&query)
            .bind(lang)
            .bind(state.as_str())
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(plan.map(|p| p.with_asset_base(asset_base)))
    }

    /// Paginated listing, one row per plan and name.
    ///
    /// `limit` is used as given; callers bound it with
    /// [`plans_core::plan::validate_page`].
    ///
    /// Without a state every plan is listed regardless of language. With a
    /// state the rows are restricted to that state and, if given, to `lang`.
    pub async fn list(
        pool: &PgPool,
        asset_base: &str,
        offset: i64,
        limit: i64,
        state: Option<PlanState>,
        lang: Option<&str>,
    ) -> Result<Vec<ListedPlan>, sqlx::Error> {
        let offset = offset.max(0);
        let limit = limit.max(0);

        let rows = match state {
            None => {
                let query = format!(
                    "SELECT {LIST_COLUMNS} \
                     FROM workout_plans AS wp \
                     LEFT JOIN workout_plans_names AS wpn ON wpn.workout_plans_parent = wp.id \
                     ORDER BY wp.id, wpn.language \
                     LIMIT $1 OFFSET $2"
                );
                sqlx::query_as::<_, ListedPlan>(&query)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await?
            }
            Some(state) => {
                let query = format!(
                    "SELECT {LIST_COLUMNS} \
                     FROM workout_plans AS wp \
                     LEFT JOIN workout_plans_names AS wpn ON wpn.workout_plans_parent = wp.id \
                     WHERE wp.state = $1 AND ($2::TEXT IS NULL OR wpn.language = $2) \
                     ORDER BY wp.id, wpn.language \
                     LIMIT $3 OFFSET $4"
                );
                sqlx::query_as::<_, ListedPlan>(&query)
                    .bind(state.as_str())
                    .bind(lang)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await?
            }
        };

        Ok(rows
            .into_iter()
            .map(|mut row| {
                row.thumbnail = format!("{asset_base}{}", row.thumbnail);
                row
            })
            .collect())
    }

    /// All plans in the given language and state.
    pub async fn list_by_state(
        pool: &PgPool,
        asset_base: &str,
        lang: &str,
        state: PlanState,
    ) -> Result<PlanCollection, sqlx::Error> {
        let query = format!(
            "SELECT {PLAN_COLUMNS}, {WORKOUT_IDS_AGG}, {TAG_IDS_AGG} \
             {PLAN_JOINS} \
             WHERE wp.state = $2 \
             {PLAN_GROUP_BY} \
             ORDER BY wp.id"
        );
        let plans = sqlx::query_as::<_, Plan>(&query)
            .bind(lang)
            .bind(state.as_str())
            .fetch_all(pool)
            .await?;
        Ok(Self::collect(plans, asset_base))
    }

    /// Plans whose name or description in `lang` contains `term`,
    /// case-insensitively.
    pub async fn search(
        pool: &PgPool,
        asset_base: &str,
        lang: &str,
        state: PlanState,
        term: &str,
    ) -> Result<PlanCollection, sqlx::Error> {
        let query = format!(
            "SELECT {PLAN_COLUMNS}, {WORKOUT_IDS_AGG}, {TAG_IDS_AGG} \
             {PLAN_JOINS} \
             WHERE wp.state = $2 \
               AND (wpn.name ILIKE $3 OR wpd.description ILIKE $3) \
             {PLAN_GROUP_BY} \
             ORDER BY wp.id"
        );
        let plans = sqlx::query_as::<_, Plan>(&query)
            .bind(lang)
            .bind(state.as_str())
            .bind(contains_pattern(term))
            .fetch_all(pool)
            .await?;
        Ok(Self::collect(plans, asset_base))
    }

    /// Plans from an explicit id set. Unknown ids are skipped.
    ///
    /// Tags are aggregated in the main query while workouts are resolved
    /// with one extra query per returned plan.
    pub async fn list_by_ids(
        pool: &PgPool,
        asset_base: &str,
        ids: &[DbId],
        lang: &str,
        state: PlanState,
    ) -> Result<PlanCollection, sqlx::Error> {
        let query = format!(
            "SELECT {PLAN_COLUMNS}, {TAG_IDS_AGG} \
             {PLAN_JOINS} \
             WHERE wp.state = $2 AND wp.id = ANY($3) \
             {PLAN_GROUP_BY} \
             ORDER BY wp.id"
        );
        let mut plans = sqlx::query_as::<_, Plan>(&query)
            .bind(lang)
            .bind(state.as_str())
            .bind(ids)
            .fetch_all(pool)
            .await?;

        for plan in &mut plans {
            plan.workout_ids = Self::workout_ids(pool, plan.id).await?;
        }

        Ok(Self::collect(plans, asset_base))
    }

    /// Workout ids associated with a single plan.
    pub async fn workout_ids(pool: &PgPool, plan_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT workout_id FROM workout_plans_workouts \
             WHERE workout_plans_parent = $1 \
             ORDER BY workout_id",
        )
        .bind(plan_id)
        .fetch_all(pool)
        .await
    }

    /// Total number of plans in every state.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM workout_plans")
            .fetch_one(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert a provisional plan with its names, descriptions, workouts and
    /// tags. All rows are written or none are.
    pub async fn create(pool: &PgPool, input: &PlanInput) -> Result<VersionStamp, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let version = VersionRepo::mint(&mut *tx).await?;
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO workout_plans (thumbnail, raw_name, type, state, version) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(&input.thumbnail)
        .bind(&input.raw_name)
        .bind(&input.plan_type)
        .bind(PlanState::Provisional.as_str())
        .bind(version)
        .fetch_one(&mut *tx)
        .await?;

        Self::upsert_names(&mut tx, id, &input.names).await?;
        Self::insert_associations(&mut tx, id, &input.workouts, &input.tags).await?;

        tx.commit().await?;
        Ok(VersionStamp { id, version })
    }

    /// Update a plan's fields, upsert its localized names and replace its
    /// workout and tag associations.
    ///
    /// A new version is minted only when thumbnail, raw name or type
    /// actually changed. Returns `None` if the plan does not exist.
    pub async fn edit(
        pool: &PgPool,
        id: DbId,
        input: &PlanInput,
    ) -> Result<Option<VersionStamp>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM workout_plans WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let updated = sqlx::query(
            "UPDATE workout_plans SET thumbnail = $2, raw_name = $3, type = $4 \
             WHERE id = $1 \
               AND (thumbnail, raw_name, type) IS DISTINCT FROM ($2, $3, $4)",
        )
        .bind(id)
        .bind(&input.thumbnail)
        .bind(&input.raw_name)
        .bind(&input.plan_type)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() > 0 {
            Self::set_new_version(&mut tx, id).await?;
        }

        Self::upsert_names(&mut tx, id, &input.names).await?;

        sqlx::query("DELETE FROM workout_plans_workouts WHERE workout_plans_parent = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM workout_plans_tags WHERE workout_plans_parent = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        Self::insert_associations(&mut tx, id, &input.workouts, &input.tags).await?;

        let stamp = sqlx::query_as::<_, VersionStamp>(
            "SELECT id, version FROM workout_plans WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(stamp))
    }

    /// Hard-delete a plan with all dependent rows and audit shadows.
    ///
    /// Released plans are never deleted. Returns `true` if a plan was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let state: Option<String> =
            sqlx::query_scalar("SELECT state FROM workout_plans WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        match state.as_deref() {
            None => return Ok(false),
            Some(s) if s == PlanState::Released.as_str() => {
                tracing::debug!(plan_id = id, "Refusing to delete released plan");
                return Ok(false);
            }
            Some(_) => {}
        }

        sqlx::query(
            "DELETE FROM workout_plans_names_audit WHERE workout_plans_names_parent IN \
             (SELECT id FROM workout_plans_names WHERE workout_plans_parent = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            "DELETE FROM workout_plans_descriptions_audit WHERE workout_plans_descriptions_parent IN \
             (SELECT id FROM workout_plans_descriptions WHERE workout_plans_parent = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM workout_plans_audit WHERE workout_plans_parent = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        // Names, descriptions and associations go with the plan via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM workout_plans WHERE id = $1 AND state <> $2")
            .bind(id)
            .bind(PlanState::Released.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Release a provisional plan and mint a new version for it.
    ///
    /// Returns `None` if the plan does not exist or is already released.
    pub async fn release(pool: &PgPool, id: DbId) -> Result<Option<VersionStamp>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE workout_plans SET state = $2 \
             WHERE id = $1 AND state <> $2",
        )
        .bind(id)
        .bind(PlanState::Released.as_str())
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let version = Self::set_new_version(&mut tx, id).await?;

        tx.commit().await?;
        Ok(Some(VersionStamp { id, version }))
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn collect(plans: Vec<Plan>, asset_base: &str) -> PlanCollection {
        plans
            .into_iter()
            .map(|p| p.with_asset_base(asset_base))
            .collect::<Vec<_>>()
            .into()
    }

    /// Mint a version and store it on the plan row.
    async fn set_new_version(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<DbId, sqlx::Error> {
        let version = VersionRepo::mint(&mut **tx).await?;
        sqlx::query("UPDATE workout_plans SET version = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(version)
            .execute(&mut **tx)
            .await?;
        Ok(version)
    }

    /// Insert or overwrite the name and description for each language.
    async fn upsert_names(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        names: &[PlanName],
    ) -> Result<(), sqlx::Error> {
        for entry in names {
            sqlx::query(
                "INSERT INTO workout_plans_names (workout_plans_parent, name, language) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (workout_plans_parent, language) \
                 DO UPDATE SET name = EXCLUDED.name",
            )
            .bind(id)
            .bind(&entry.name)
            .bind(&entry.language)
            .execute(&mut **tx)
            .await?;

            sqlx::query(
                "INSERT INTO workout_plans_descriptions \
                     (workout_plans_parent, description, language) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (workout_plans_parent, language) \
                 DO UPDATE SET description = EXCLUDED.description",
            )
            .bind(id)
            .bind(&entry.description)
            .bind(&entry.language)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    /// Insert workout and tag associations. Duplicate ids are ignored.
    async fn insert_associations(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        workout_ids: &[DbId],
        tag_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        for &workout_id in workout_ids {
            sqlx::query(
                "INSERT INTO workout_plans_workouts (workout_plans_parent, workout_id) \
                 VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(workout_id)
            .execute(&mut **tx)
            .await?;
        }

        for &tag_id in tag_ids {
            sqlx::query(
                "INSERT INTO workout_plans_tags (workout_plans_parent, tag_id) \
                 VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(tag_id)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}
