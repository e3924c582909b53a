use crate::report::{ActionType, ReportStatus, TargetType};

/// Default suspension applied by USER_SUSPENDED, in seconds (7 days)
pub const SUSPENSION_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    TerminalReport,
    InvalidTransition,
    ActionRequired,
    ActionNotAllowed,
    ActionTargetMismatch,
    VersionConflict,
}

impl std::fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleError::TerminalReport => write!(f, "Report is already resolved or dismissed"),
            LifecycleError::InvalidTransition => write!(f, "Requested status transition is not permitted"),
            LifecycleError::ActionRequired => write!(f, "Resolving a report requires an enforcement action"),
            LifecycleError::ActionNotAllowed => write!(f, "Action type is not allowed for this transition"),
            LifecycleError::ActionTargetMismatch => write!(f, "Action type is not applicable to the report target"),
            LifecycleError::VersionConflict => write!(f, "Report was modified concurrently, refetch and retry"),
        }
    }
}

impl std::error::Error for LifecycleError {}

impl LifecycleError {
    pub fn status_code(&self) -> u16 {
        match self {
            LifecycleError::ActionRequired |
            LifecycleError::ActionNotAllowed |
            LifecycleError::ActionTargetMismatch => 400, // Bad Request
            LifecycleError::TerminalReport |
            LifecycleError::InvalidTransition |
            LifecycleError::VersionConflict => 409, // Conflict - state disagreement
        }
    }

    /// Log the rejection with appropriate context
    pub fn log_event(&self) {
        match self {
            LifecycleError::TerminalReport => {
                tracing::debug!("Rejected transition on terminal report");
            }
            LifecycleError::VersionConflict => {
                tracing::warn!("⚠️  Concurrent resolution detected - conditional update lost the race");
            }
            _ => {
                tracing::debug!("Lifecycle rejection: {}", self);
            }
        }
    }
}

/// The complete set of permitted status transitions. Anything not listed
/// here is rejected centrally, never re-derived at call sites.
const TRANSITIONS: &[(ReportStatus, ReportStatus)] = &[
    (ReportStatus::Pending, ReportStatus::UnderReview),
    (ReportStatus::Pending, ReportStatus::Resolved),
    (ReportStatus::Pending, ReportStatus::Dismissed),
    (ReportStatus::UnderReview, ReportStatus::Resolved),
    (ReportStatus::UnderReview, ReportStatus::Dismissed),
];

/// Validate a requested status transition together with its optional action.
///
/// Rules:
/// - terminal reports accept nothing, including a repeat of the same transition
/// - UNDER_REVIEW is a pure status move, no action may be attached
/// - DISMISSED carries NO_ACTION (or no action at all)
/// - RESOLVED requires an enforcement action
/// - account-level actions need a USER target, content-level actions a
///   POST or COMMENT target
pub fn validate_transition(
    current: ReportStatus,
    requested: ReportStatus,
    action: Option<ActionType>,
    target: TargetType,
) -> Result<(), LifecycleError> {
    if current.is_terminal() {
        return Err(LifecycleError::TerminalReport);
    }

    if !TRANSITIONS.contains(&(current, requested)) {
        return Err(LifecycleError::InvalidTransition);
    }

    match requested {
        ReportStatus::UnderReview => {
            if action.is_some() {
                return Err(LifecycleError::ActionNotAllowed);
            }
        }
        ReportStatus::Dismissed => {
            if let Some(a) = action {
                if a.is_enforcement() {
                    return Err(LifecycleError::ActionNotAllowed);
                }
            }
        }
        ReportStatus::Resolved => match action {
            None => return Err(LifecycleError::ActionRequired),
            Some(a) if !a.is_enforcement() => return Err(LifecycleError::ActionRequired),
            Some(_) => {}
        },
        // unreachable through the transition table
        ReportStatus::Pending => return Err(LifecycleError::InvalidTransition),
    }

    if let Some(a) = action {
        check_action_target(a, target)?;
    }

    Ok(())
}

/// Action/target consistency: suspensions and bans act on accounts,
/// removal and hiding act on content.
pub fn check_action_target(action: ActionType, target: TargetType) -> Result<(), LifecycleError> {
    match action {
        ActionType::UserSuspended | ActionType::UserBanned => {
            if target != TargetType::User {
                return Err(LifecycleError::ActionTargetMismatch);
            }
        }
        ActionType::ContentRemoved | ActionType::ContentHidden => {
            if target == TargetType::User {
                return Err(LifecycleError::ActionTargetMismatch);
            }
        }
        ActionType::WarningIssued | ActionType::NoAction => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ActionType as A, ReportStatus as S, TargetType as T};

    #[test]
    fn review_from_pending() {
        assert!(validate_transition(S::Pending, S::UnderReview, None, T::Post).is_ok());
    }

    #[test]
    fn review_rejects_attached_action() {
        assert_eq!(
            validate_transition(S::Pending, S::UnderReview, Some(A::NoAction), T::Post),
            Err(LifecycleError::ActionNotAllowed)
        );
    }

    #[test]
    fn dismiss_from_pending_and_under_review() {
        assert!(validate_transition(S::Pending, S::Dismissed, Some(A::NoAction), T::Comment).is_ok());
        assert!(validate_transition(S::UnderReview, S::Dismissed, None, T::User).is_ok());
    }

    #[test]
    fn dismiss_rejects_enforcement_action() {
        assert_eq!(
            validate_transition(S::Pending, S::Dismissed, Some(A::ContentRemoved), T::Post),
            Err(LifecycleError::ActionNotAllowed)
        );
    }

    #[test]
    fn resolve_requires_enforcement_action() {
        assert_eq!(
            validate_transition(S::UnderReview, S::Resolved, None, T::Post),
            Err(LifecycleError::ActionRequired)
        );
        assert_eq!(
            validate_transition(S::UnderReview, S::Resolved, Some(A::NoAction), T::Post),
            Err(LifecycleError::ActionRequired)
        );
        assert!(validate_transition(S::UnderReview, S::Resolved, Some(A::ContentHidden), T::Post).is_ok());
        assert!(validate_transition(S::Pending, S::Resolved, Some(A::WarningIssued), T::Comment).is_ok());
    }

    #[test]
    fn terminal_reports_accept_nothing() {
        for terminal in [S::Resolved, S::Dismissed] {
            for requested in [S::Pending, S::UnderReview, S::Resolved, S::Dismissed] {
                assert_eq!(
                    validate_transition(terminal, requested, None, T::User),
                    Err(LifecycleError::TerminalReport),
                    "{terminal} -> {requested} must be rejected"
                );
            }
        }
    }

    #[test]
    fn backward_transitions_rejected() {
        assert_eq!(
            validate_transition(S::UnderReview, S::Pending, None, T::Post),
            Err(LifecycleError::InvalidTransition)
        );
        // same-state moves are not transitions either
        assert_eq!(
            validate_transition(S::Pending, S::Pending, None, T::Post),
            Err(LifecycleError::InvalidTransition)
        );
        assert_eq!(
            validate_transition(S::UnderReview, S::UnderReview, None, T::Post),
            Err(LifecycleError::InvalidTransition)
        );
    }

    #[test]
    fn account_actions_need_user_target() {
        assert_eq!(
            validate_transition(S::Pending, S::Resolved, Some(A::UserBanned), T::Post),
            Err(LifecycleError::ActionTargetMismatch)
        );
        assert_eq!(
            validate_transition(S::Pending, S::Resolved, Some(A::UserSuspended), T::Comment),
            Err(LifecycleError::ActionTargetMismatch)
        );
        assert!(validate_transition(S::Pending, S::Resolved, Some(A::UserBanned), T::User).is_ok());
        assert!(validate_transition(S::Pending, S::Resolved, Some(A::UserSuspended), T::User).is_ok());
    }

    #[test]
    fn content_actions_need_content_target() {
        assert_eq!(
            validate_transition(S::Pending, S::Resolved, Some(A::ContentRemoved), T::User),
            Err(LifecycleError::ActionTargetMismatch)
        );
        assert!(validate_transition(S::Pending, S::Resolved, Some(A::ContentRemoved), T::Post).is_ok());
        assert!(validate_transition(S::Pending, S::Resolved, Some(A::ContentHidden), T::Comment).is_ok());
    }

    #[test]
    fn warning_applies_to_any_target() {
        for target in [T::Post, T::Comment, T::User] {
            assert!(validate_transition(S::Pending, S::Resolved, Some(A::WarningIssued), target).is_ok());
        }
    }

    #[test]
    fn conflict_maps_to_409() {
        assert_eq!(LifecycleError::TerminalReport.status_code(), 409);
        assert_eq!(LifecycleError::VersionConflict.status_code(), 409);
        assert_eq!(LifecycleError::ActionRequired.status_code(), 400);
    }
}
