// Database models for the Cozy moderation service
use super::schema::*;
use diesel::prelude::*;

#[derive(Insertable, Queryable, Clone, Debug)]
#[diesel(table_name = accounts)]
pub struct Account {
    pub id: String,                    // UUID
    pub account_key: String,           // Opaque key presented at /api/auth
    pub display_name: String,
    pub role: String,                  // "member", "moderator" or "admin"
    pub created_at: i64,               // Unix timestamp
    pub suspended_until: Option<i64>,  // Set by USER_SUSPENDED enforcement
    pub is_banned: bool,               // Set by USER_BANNED enforcement or key revocation
}

#[derive(Insertable, Queryable, Clone, Debug)]
#[diesel(table_name = reports)]
pub struct ReportRow {
    pub id: String,                    // UUID
    pub target_type: String,           // "POST", "COMMENT" or "USER"
    pub target_id: String,             // Opaque reference to the reported entity
    pub category: String,              // Report category wire string
    pub reason: String,                // Reporter-supplied reason (1-500 chars)
    pub description: Option<String>,   // Optional elaboration (max 1000 chars)
    pub status: String,                // "PENDING", "UNDER_REVIEW", "RESOLVED", "DISMISSED"
    pub reporter_id: String,           // Account id of the submitting user
    pub created_at: i64,               // Unix timestamp
    pub version: i32,                  // Bumped on every status change (conditional updates)
}

#[derive(Insertable, Queryable, Clone, Debug)]
#[diesel(table_name = moderator_actions)]
pub struct ModeratorActionRow {
    pub id: String,                    // UUID
    pub report_id: String,             // One action per report (UNIQUE)
    pub action_type: String,           // ActionType wire string
    pub moderator_id: String,          // Account id of the acting staff user
    pub reason: String,                // Moderator justification
    pub action_date: i64,              // Unix timestamp
}

#[derive(Insertable, Queryable, Clone, Debug)]
#[diesel(table_name = content_sanctions)]
pub struct ContentSanction {
    pub id: String,                    // UUID
    pub target_type: String,           // "POST" or "COMMENT"
    pub target_id: String,             // The sanctioned content
    pub visibility: String,            // "removed" or "hidden"
    pub applied_by: String,            // Account id of the acting staff user
    pub report_id: String,             // Report that triggered the sanction
    pub created_at: i64,               // Unix timestamp
}

#[derive(Insertable, Queryable, Clone, Debug)]
#[diesel(table_name = audit_logs)]
pub struct AuditLog {
    pub id: String,                    // UUID
    pub account_id: Option<String>,    // Acting account (None for pre-auth events)
    pub event_type: String,            // "report_submit", "report_resolve", "account_create", ...
    pub event_data: String,            // JSON string with event details
    pub created_at: i64,               // Unix timestamp
    pub ip_address: Option<String>,    // Client IP (if available)
}
