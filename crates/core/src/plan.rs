//! Workout plan lifecycle states, request-parameter parsing and search helpers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/* --------------------------------------------------------------------------
   Constants
   -------------------------------------------------------------------------- */

/// Content type forwarded to the apps service when plans are filtered by app.
pub const APP_CONTENT_TYPE: &str = "training_plans";

/// Maximum length for a language code (e.g. `en`, `pt-BR`).
pub const MAX_LANGUAGE_LEN: usize = 16;

/// Maximum length for a localized plan name.
pub const MAX_NAME_LEN: usize = 255;

/// Largest page the paginated plan listing serves in one request.
pub const MAX_LIST_LIMIT: i64 = 500;

/* --------------------------------------------------------------------------
   Plan state
   -------------------------------------------------------------------------- */

/// Publication state of a plan.
///
/// Plans start out provisional and can be released exactly once. There is
/// no transition back from [`PlanState::Released`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanState {
    /// Draft, still editable and deletable.
    #[serde(rename = "P")]
    Provisional,
    /// Published. Released plans cannot be deleted.
    #[serde(rename = "R")]
    Released,
}

impl PlanState {
    /// The single-letter code stored in `workout_plans.state`.
    pub fn as_str(self) -> &'static str {
        match self {
            PlanState::Provisional => "P",
            PlanState::Released => "R",
        }
    }
}

impl fmt::Display for PlanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "P" => Ok(PlanState::Provisional),
            "R" => Ok(PlanState::Released),
            other => Err(CoreError::Validation(format!(
                "Invalid plan state '{other}'. Must be one of: P, R"
            ))),
        }
    }
}

/* --------------------------------------------------------------------------
   Parameter helpers
   -------------------------------------------------------------------------- */

/// Treat empty or whitespace-only optional parameters as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a comma-separated id list such as `"1,2,999"`.
///
/// Whitespace around entries is ignored and empty entries are skipped.
/// Fails if any entry is not an integer or if no ids remain.
pub fn parse_id_list(raw: &str) -> Result<Vec<DbId>, CoreError> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<DbId>()
                .map_err(|_| CoreError::Validation(format!("Invalid id '{part}' in id list")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if ids.is_empty() {
        return Err(CoreError::Validation("Id list must not be empty".to_string()));
    }
    Ok(ids)
}

/// Join ids into the comma-separated form the sibling services expect.
pub fn join_ids(ids: &[DbId]) -> String {
    ids.iter()
        .map(DbId::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Build a case-insensitive substring pattern for `ILIKE`.
///
/// `%`, `_` and `\` in the user term are escaped so they match literally.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/* --------------------------------------------------------------------------
   Validation
   -------------------------------------------------------------------------- */

/// Validate a language code: non-empty and within length limit.
pub fn validate_language(language: &str) -> Result<(), CoreError> {
    if language.trim().is_empty() {
        return Err(CoreError::Validation(
            "Language must not be empty".to_string(),
        ));
    }
    if language.len() > MAX_LANGUAGE_LEN {
        return Err(CoreError::Validation(format!(
            "Language code too long: {} chars (max {MAX_LANGUAGE_LEN})",
            language.len()
        )));
    }
    Ok(())
}

/// Validate one localized name entry of a create/edit submission.
pub fn validate_name_entry(name: &str, language: &str) -> Result<(), CoreError> {
    validate_language(language)?;
    if name.trim().is_empty() {
        return Err(CoreError::Validation(format!(
            "Plan name for language '{language}' must not be empty"
        )));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Plan name too long: {} chars (max {MAX_NAME_LEN})",
            name.len()
        )));
    }
    Ok(())
}

/// Validate the `from`/`limit` window of the paginated listing.
///
/// Requests beyond [`MAX_LIST_LIMIT`] are rejected rather than shortened.
pub fn validate_page(from: i64, limit: i64) -> Result<(), CoreError> {
    if from < 0 {
        return Err(CoreError::Validation(format!(
            "Offset 'from' must not be negative, got {from}"
        )));
    }
    if !(0..=MAX_LIST_LIMIT).contains(&limit) {
        return Err(CoreError::Validation(format!(
            "Limit must be between 0 and {MAX_LIST_LIMIT}, got {limit}"
        )));
    }
    Ok(())
}
