//! Field-level validation for workflow inputs.

use serde::Serialize;

use crate::types::NewJob;

pub(crate) const TITLE_MIN: usize = 3;
pub(crate) const TITLE_MAX: usize = 100;
pub(crate) const DESCRIPTION_MIN: usize = 10;
pub(crate) const DESCRIPTION_MAX: usize = 1000;

/// A single rejected field with a machine-readable code.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Check all create-job preconditions, collecting every violation.
pub(crate) fn validate_new_job(input: &NewJob) -> Result<(), Vec<ValidationIssue>> {
    let mut issues: Vec<ValidationIssue> = Vec::new();

    let title_len = input.title.chars().count();
    if !(TITLE_MIN..=TITLE_MAX).contains(&title_len) {
        issues.push(ValidationIssue::new(
            "title",
            "length",
            format!("title must be {TITLE_MIN}-{TITLE_MAX} characters"),
        ));
    }

    let description_len = input.description.chars().count();
    if !(DESCRIPTION_MIN..=DESCRIPTION_MAX).contains(&description_len) {
        issues.push(ValidationIssue::new(
            "description",
            "length",
            format!("description must be {DESCRIPTION_MIN}-{DESCRIPTION_MAX} characters"),
        ));
    }

    if input.tags.is_empty() || input.tags.iter().any(|t| t.trim().is_empty()) {
        issues.push(ValidationIssue::new(
            "tags",
            "empty",
            "at least one non-empty tag is required",
        ));
    }

    if !(input.budget > 0.0) {
        issues.push(ValidationIssue::new(
            "budget",
            "non_positive",
            "budget must be greater than zero",
        ));
    }

    if !input.location.is_valid() {
        issues.push(ValidationIssue::new(
            "location",
            "out_of_range",
            "longitude must be within [-180, 180] and latitude within [-90, 90]",
        ));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Ratings are a 1-5 scale on both feedback slots.
pub(crate) fn validate_rating(rating: u8) -> Result<(), Vec<ValidationIssue>> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(vec![ValidationIssue::new(
            "rating",
            "out_of_range",
            "rating must be between 1 and 5",
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoPoint;
    use uuid::Uuid;

    fn valid_input() -> NewJob {
        NewJob {
            employer_id: Uuid::new_v4(),
            title: "Assemble wardrobe".into(),
            description: "Flat-pack wardrobe, tools on site.".into(),
            tags: vec!["assembly".into()],
            location: GeoPoint::new(2.17, 41.38),
            budget: 60.0,
        }
    }

    #[test]
    fn accepts_valid_input() {
        assert!(validate_new_job(&valid_input()).is_ok());
    }

    #[test]
    fn collects_all_violations() {
        let input = NewJob {
            title: "ab".into(),
            description: "too short".into(),
            tags: vec![],
            budget: 0.0,
            location: GeoPoint::new(181.0, 0.0),
            ..valid_input()
        };
        let issues = validate_new_job(&input).unwrap_err();
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["title", "description", "tags", "budget", "location"]
        );
    }

    #[test]
    fn nan_budget_is_rejected() {
        let input = NewJob {
            budget: f64::NAN,
            ..valid_input()
        };
        let issues = validate_new_job(&input).unwrap_err();
        assert_eq!(issues[0].field, "budget");
    }

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }
}
