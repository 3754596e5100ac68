//! Workout plan models and DTOs.

use plans_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity structs (query rows)
// ---------------------------------------------------------------------------

/// A plan joined with the name/description of one language and its
/// aggregated workout and tag associations.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Plan {
    pub id: DbId,
    pub thumbnail: String,
    pub raw_name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub plan_type: String,
    pub state: String,
    pub version: DbId,
    pub name: String,
    pub description: String,
    pub language: String,
    /// Absent from the by-ids query shape, which resolves workouts per row.
    #[sqlx(default)]
    pub workout_ids: Vec<DbId>,
    pub tag_ids: Vec<DbId>,
}

impl Plan {
    /// Render the stored relative thumbnail path against the asset base.
    pub fn with_asset_base(mut self, asset_base: &str) -> Self {
        self.thumbnail = format!("{asset_base}{}", self.thumbnail);
        self
    }
}

/// One row of the paginated plan listing: a plan paired with one of its names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ListedPlan {
    pub id: DbId,
    pub state: String,
    pub version: DbId,
    pub raw_name: String,
    pub thumbnail: String,
    pub name: Option<String>,
    pub language: Option<String>,
    pub updated_at: Timestamp,
}

/// Identity and current version of a plan after a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize)]
pub struct VersionStamp {
    pub id: DbId,
    pub version: DbId,
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

/// Whether a collection query matched anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    Found,
    Empty,
}

impl CollectionStatus {
    /// The status code carried with the collection (200 or 204).
    pub fn code(self) -> u16 {
        match self {
            CollectionStatus::Found => 200,
            CollectionStatus::Empty => 204,
        }
    }
}

/// Plans returned by a collection query together with the status decided
/// once the fetch completed.
#[derive(Debug, Clone)]
pub struct PlanCollection {
    plans: Vec<Plan>,
    status: CollectionStatus,
}

impl PlanCollection {
    pub fn status(&self) -> CollectionStatus {
        self.status
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn into_plans(self) -> Vec<Plan> {
        self.plans
    }
}

impl From<Vec<Plan>> for PlanCollection {
    fn from(plans: Vec<Plan>) -> Self {
        let status = if plans.is_empty() {
            CollectionStatus::Empty
        } else {
            CollectionStatus::Found
        };
        Self { plans, status }
    }
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// One localized name/description pair of a submission.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanName {
    pub name: String,
    pub description: String,
    pub language: String,
}

/// Payload for creating or editing a plan.
///
/// Language values should be unique within `names`; a repeated language
/// silently overwrites the earlier entry.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanInput {
    pub thumbnail: String,
    pub raw_name: String,
    #[serde(rename = "type")]
    pub plan_type: String,
    pub names: Vec<PlanName>,
    pub tags: Vec<DbId>,
    pub workouts: Vec<DbId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan(id: DbId) -> Plan {
        Plan {
            id,
            thumbnail: "plans/1.png".to_string(),
            raw_name: "core-blast".to_string(),
            plan_type: "strength".to_string(),
            state: "P".to_string(),
            version: 7,
            name: "Core Blast".to_string(),
            description: "Abs".to_string(),
            language: "en".to_string(),
            workout_ids: vec![1, 2],
            tag_ids: vec![3],
        }
    }

    #[test]
    fn with_asset_base_prefixes_thumbnail() {
        let plan = sample_plan(1).with_asset_base("https://cdn.example.com/");
        assert_eq!(plan.thumbnail, "https://cdn.example.com/plans/1.png");
    }

    #[test]
    fn empty_collection_reports_204() {
        let collection = PlanCollection::from(Vec::new());
        assert_eq!(collection.status(), CollectionStatus::Empty);
        assert_eq!(collection.status().code(), 204);
        assert!(collection.is_empty());
    }

    #[test]
    fn non_empty_collection_reports_200() {
        let collection = PlanCollection::from(vec![sample_plan(1), sample_plan(2)]);
        assert_eq!(collection.status().code(), 200);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.plans()[1].id, 2);
    }

    #[test]
    fn plan_input_reads_type_field() {
        let input: PlanInput = serde_json::from_value(serde_json::json!({
            "thumbnail": "a.png",
            "raw_name": "raw",
            "type": "cardio",
            "names": [{"name": "N", "description": "D", "language": "en"}],
            "tags": [1],
            "workouts": [2, 3]
        }))
        .unwrap();
        assert_eq!(input.plan_type, "cardio");
        assert_eq!(input.names[0].language, "en");
        assert_eq!(input.workouts, vec![2, 3]);
    }
}
