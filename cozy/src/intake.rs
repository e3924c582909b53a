use serde::Deserialize;

use crate::report::{ReportCategory, TargetType};

pub const REASON_MAX_LEN: usize = 500;
pub const DESCRIPTION_MAX_LEN: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    MissingTarget,
    UnknownTargetType,
    MissingCategory,
    UnknownCategory,
    MissingReason,
    ReasonTooLong,
    DescriptionTooLong,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingTarget => write!(f, "targetType and targetId are required"),
            ValidationError::UnknownTargetType => write!(f, "targetType must be POST, COMMENT or USER"),
            ValidationError::MissingCategory => write!(f, "category is required"),
            ValidationError::UnknownCategory => write!(f, "category is not a recognized report category"),
            ValidationError::MissingReason => write!(f, "reason is required and must not be empty"),
            ValidationError::ReasonTooLong => {
                write!(f, "reason must be at most {} characters", REASON_MAX_LEN)
            }
            ValidationError::DescriptionTooLong => {
                write!(f, "description must be at most {} characters", DESCRIPTION_MAX_LEN)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn status_code(&self) -> u16 {
        400 // every intake rejection is a Bad Request
    }
}

/// Raw submission as it arrives on the wire. Every field is optional so
/// that missing input maps to a precise ValidationError instead of a
/// generic deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSubmission {
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    pub category: Option<String>,
    pub reason: Option<String>,
    pub description: Option<String>,
}

/// A submission that passed validation and is safe to persist
#[derive(Debug, Clone)]
pub struct ValidatedReport {
    pub target_type: TargetType,
    pub target_id: String,
    pub category: ReportCategory,
    pub reason: String,
    pub description: Option<String>,
}

impl ReportSubmission {
    /// Check the submission against the intake contract. Nothing is
    /// persisted on failure - the caller rejects before any write.
    pub fn validate(self) -> Result<ValidatedReport, ValidationError> {
        let target_type_raw = match self.target_type.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Err(ValidationError::MissingTarget),
        };
        let target_type =
            TargetType::parse(target_type_raw).ok_or(ValidationError::UnknownTargetType)?;

        let target_id = match self.target_id.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => return Err(ValidationError::MissingTarget),
        };

        let category_raw = match self.category.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => return Err(ValidationError::MissingCategory),
        };
        let category =
            ReportCategory::parse(category_raw).ok_or(ValidationError::UnknownCategory)?;

        let reason = match self.reason.as_deref().map(str::trim) {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => return Err(ValidationError::MissingReason),
        };
        if reason.chars().count() > REASON_MAX_LEN {
            return Err(ValidationError::ReasonTooLong);
        }

        let description = match self.description.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => {
                if d.chars().count() > DESCRIPTION_MAX_LEN {
                    return Err(ValidationError::DescriptionTooLong);
                }
                Some(d.to_string())
            }
            _ => None,
        };

        Ok(ValidatedReport {
            target_type,
            target_id,
            category,
            reason,
            description,
        })
    }
}
