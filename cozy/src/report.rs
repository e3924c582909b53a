use serde::{Deserialize, Serialize};

/// What kind of entity a report points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetType {
    Post,
    Comment,
    User,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Post => "POST",
            TargetType::Comment => "COMMENT",
            TargetType::User => "USER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "POST" => Some(TargetType::Post),
            "COMMENT" => Some(TargetType::Comment),
            "USER" => Some(TargetType::User),
            _ => None,
        }
    }
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why the reporter flagged the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportCategory {
    Spam,
    Harassment,
    HateSpeech,
    Violence,
    SexualContent,
    Copyright,
    Misinformation,
    FakeAccount,
    Other,
}

impl ReportCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportCategory::Spam => "SPAM",
            ReportCategory::Harassment => "HARASSMENT",
            ReportCategory::HateSpeech => "HATE_SPEECH",
            ReportCategory::Violence => "VIOLENCE",
            ReportCategory::SexualContent => "SEXUAL_CONTENT",
            ReportCategory::Copyright => "COPYRIGHT",
            ReportCategory::Misinformation => "MISINFORMATION",
            ReportCategory::FakeAccount => "FAKE_ACCOUNT",
            ReportCategory::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SPAM" => Some(ReportCategory::Spam),
            "HARASSMENT" => Some(ReportCategory::Harassment),
            "HATE_SPEECH" => Some(ReportCategory::HateSpeech),
            "VIOLENCE" => Some(ReportCategory::Violence),
            "SEXUAL_CONTENT" => Some(ReportCategory::SexualContent),
            "COPYRIGHT" => Some(ReportCategory::Copyright),
            "MISINFORMATION" => Some(ReportCategory::Misinformation),
            "FAKE_ACCOUNT" => Some(ReportCategory::FakeAccount),
            "OTHER" => Some(ReportCategory::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a report sits in the moderation pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Pending,
    UnderReview,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    /// RESOLVED and DISMISSED accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportStatus::Resolved | ReportStatus::Dismissed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "PENDING",
            ReportStatus::UnderReview => "UNDER_REVIEW",
            ReportStatus::Resolved => "RESOLVED",
            ReportStatus::Dismissed => "DISMISSED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(ReportStatus::Pending),
            "UNDER_REVIEW" => Some(ReportStatus::UnderReview),
            "RESOLVED" => Some(ReportStatus::Resolved),
            "DISMISSED" => Some(ReportStatus::Dismissed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the moderator decided to do about the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    NoAction,
    WarningIssued,
    ContentRemoved,
    ContentHidden,
    UserSuspended,
    UserBanned,
}

impl ActionType {
    /// Everything except NO_ACTION applies a sanction to the target
    pub fn is_enforcement(&self) -> bool {
        !matches!(self, ActionType::NoAction)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::NoAction => "NO_ACTION",
            ActionType::WarningIssued => "WARNING_ISSUED",
            ActionType::ContentRemoved => "CONTENT_REMOVED",
            ActionType::ContentHidden => "CONTENT_HIDDEN",
            ActionType::UserSuspended => "USER_SUSPENDED",
            ActionType::UserBanned => "USER_BANNED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NO_ACTION" => Some(ActionType::NoAction),
            "WARNING_ISSUED" => Some(ActionType::WarningIssued),
            "CONTENT_REMOVED" => Some(ActionType::ContentRemoved),
            "CONTENT_HIDDEN" => Some(ActionType::ContentHidden),
            "USER_SUSPENDED" => Some(ActionType::UserSuspended),
            "USER_BANNED" => Some(ActionType::UserBanned),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of the account that filed a report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reporter {
    pub id: String,
    pub display_name: String,
}

/// Durable record of a moderator decision, bound 1:1 to its report.
/// Immutable once attached - corrections require a new report cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeratorAction {
    pub action_type: ActionType,
    pub moderator: String,             // account id of the acting staff user
    pub reason: String,
    pub action_date: i64,              // Unix timestamp
}

/// Wire form of a report as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,                    // UUID
    pub target_type: TargetType,
    pub target_id: String,
    pub category: ReportCategory,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: ReportStatus,
    pub reporter: Reporter,
    pub created_at: i64,               // Unix timestamp
    pub version: i32,                  // bumped on every status change, used for conditional updates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderator_action: Option<ModeratorAction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_strings_round_trip() {
        for status in [
            ReportStatus::Pending,
            ReportStatus::UnderReview,
            ReportStatus::Resolved,
            ReportStatus::Dismissed,
        ] {
            assert_eq!(ReportStatus::parse(status.as_str()), Some(status));
        }
        for action in [
            ActionType::NoAction,
            ActionType::WarningIssued,
            ActionType::ContentRemoved,
            ActionType::ContentHidden,
            ActionType::UserSuspended,
            ActionType::UserBanned,
        ] {
            assert_eq!(ActionType::parse(action.as_str()), Some(action));
        }
        for category in [
            ReportCategory::Spam,
            ReportCategory::Harassment,
            ReportCategory::HateSpeech,
            ReportCategory::Violence,
            ReportCategory::SexualContent,
            ReportCategory::Copyright,
            ReportCategory::Misinformation,
            ReportCategory::FakeAccount,
            ReportCategory::Other,
        ] {
            assert_eq!(ReportCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(ReportStatus::parse("CLOSED"), None);
        assert_eq!(ActionType::parse("no_action"), None);
    }

    #[test]
    fn serde_matches_enum_strings() {
        let json = serde_json::to_value(ReportStatus::UnderReview).unwrap();
        assert_eq!(json, serde_json::json!("UNDER_REVIEW"));
        let json = serde_json::to_value(ReportCategory::HateSpeech).unwrap();
        assert_eq!(json, serde_json::json!("HATE_SPEECH"));
        let parsed: ActionType = serde_json::from_str("\"USER_SUSPENDED\"").unwrap();
        assert_eq!(parsed, ActionType::UserSuspended);
    }

    #[test]
    fn report_wire_shape_is_camel_case() {
        let report = Report {
            id: "r-1".to_string(),
            target_type: TargetType::Post,
            target_id: "42".to_string(),
            category: ReportCategory::Spam,
            reason: "repeated promo links".to_string(),
            description: None,
            status: ReportStatus::Pending,
            reporter: Reporter {
                id: "u-1".to_string(),
                display_name: "sam".to_string(),
            },
            created_at: 1_700_000_000,
            version: 0,
            moderator_action: None,
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["targetType"], "POST");
        assert_eq!(value["targetId"], "42");
        assert_eq!(value["status"], "PENDING");
        assert_eq!(value["reporter"]["displayName"], "sam");
        assert_eq!(value["createdAt"], 1_700_000_000);
        // absent optionals are omitted, not null
        assert!(value.get("description").is_none());
        assert!(value.get("moderatorAction").is_none());
    }

    #[test]
    fn terminal_statuses() {
        assert!(!ReportStatus::Pending.is_terminal());
        assert!(!ReportStatus::UnderReview.is_terminal());
        assert!(ReportStatus::Resolved.is_terminal());
        assert!(ReportStatus::Dismissed.is_terminal());
    }
}
