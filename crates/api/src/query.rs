//! Query parameter types for the plan endpoints.
//!
//! Every field is optional at the serde level so that a missing parameter
//! surfaces as a `400 Bad request` naming the parameter instead of a bare
//! deserialization failure. Empty values count as missing.

use plans_core::plan::{non_blank, validate_language, PlanState};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// `?lang=&state=` for single-plan lookups.
#[derive(Debug, Deserialize)]
pub struct PlanLookupParams {
    pub lang: Option<String>,
    pub state: Option<String>,
}

/// `?lang=&state=&app=&like=` for the filtered collection.
#[derive(Debug, Deserialize)]
pub struct PlanFilterParams {
    pub lang: Option<String>,
    pub state: Option<String>,
    pub app: Option<String>,
    pub like: Option<String>,
}

/// `?ids=&lang=&state=` for the by-ids collection.
#[derive(Debug, Deserialize)]
pub struct PlanIdsParams {
    pub ids: Option<String>,
    pub lang: Option<String>,
    pub state: Option<String>,
}

/// `?from=&limit=&state=&lang=` for the paginated listing.
#[derive(Debug, Deserialize)]
pub struct PlanListParams {
    pub from: Option<i64>,
    pub limit: Option<i64>,
    pub state: Option<String>,
    pub lang: Option<String>,
}

/// A required, non-blank string parameter.
pub fn required<'a>(value: &'a Option<String>, name: &str) -> AppResult<&'a str> {
    non_blank(value.as_deref())
        .ok_or_else(|| AppError::BadRequest(format!("Missing parameter '{name}'")))
}

/// A required language parameter.
pub fn required_lang(value: &Option<String>) -> AppResult<&str> {
    let lang = required(value, "lang")?;
    validate_language(lang)?;
    Ok(lang)
}

/// A required plan state parameter (`P` or `R`).
pub fn required_state(value: &Option<String>) -> AppResult<PlanState> {
    Ok(required(value, "state")?.parse()?)
}

/// An optional plan state parameter; blank means absent.
pub fn optional_state(value: &Option<String>) -> AppResult<Option<PlanState>> {
    non_blank(value.as_deref())
        .map(str::parse)
        .transpose()
        .map_err(AppError::from)
}

/// A required integer parameter.
pub fn required_int(value: Option<i64>, name: &str) -> AppResult<i64> {
    value.ok_or_else(|| AppError::BadRequest(format!("Missing parameter '{name}'")))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use plans_core::error::CoreError;

    use super::*;

    #[test]
    fn required_rejects_blank() {
        let err = required(&Some("  ".into()), "lang").unwrap_err();
        assert_matches!(err, AppError::BadRequest(msg) if msg.contains("'lang'"));
    }

    #[test]
    fn required_state_parses_letter() {
        assert_eq!(required_state(&Some("R".into())).unwrap(), PlanState::Released);
    }

    #[test]
    fn required_state_rejects_unknown() {
        let err = required_state(&Some("Z".into())).unwrap_err();
        assert_matches!(err, AppError::Core(CoreError::Validation(_)));
    }

    #[test]
    fn optional_state_treats_empty_as_absent() {
        assert_eq!(optional_state(&Some(String::new())).unwrap(), None);
        assert_eq!(optional_state(&None).unwrap(), None);
        assert_eq!(
            optional_state(&Some("P".into())).unwrap(),
            Some(PlanState::Provisional)
        );
    }

    #[test]
    fn required_int_reports_name() {
        let err = required_int(None, "limit").unwrap_err();
        assert_matches!(err, AppError::BadRequest(msg) if msg.contains("'limit'"));
    }
}
