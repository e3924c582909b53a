use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use cozy::auth::SessionAuth;
use cozy::intake::ReportSubmission;
use cozy::lifecycle::{self, LifecycleError};
use cozy::report::{
    ActionType, ModeratorAction, Report, ReportCategory, ReportStatus, Reporter, TargetType,
};

use crate::db::{self, Account, AuditLog, ContentSanction, DbPool, ModeratorActionRow, ReportRow};
use crate::staff::{StaffRole, StaffSessions};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    pub account_key: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    pub status: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub status: Option<String>,
    pub action_type: Option<String>,
    pub action_reason: Option<String>,
    pub expected_version: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub display_name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeAccountRequest {
    pub account_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogQuery {
    pub event_type: String,
    pub limit: Option<i64>,
}

fn fail(status: StatusCode, msg: &str) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({"success": false, "error": msg}))
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
}

/// Resolve the bearer token on a request to an open session and its account
fn authed_account(auth: &SessionAuth, req: &HttpRequest) -> Result<(Uuid, String), HttpResponse> {
    let token = match bearer_token(req) {
        Some(t) => t,
        None => return Err(fail(StatusCode::UNAUTHORIZED, "missing bearer token")),
    };

    let session = auth.validate_access_token(&token).map_err(|e| {
        e.log_security_event();
        fail(StatusCode::from_u16(e.status_code()).unwrap(), &e.to_string())
    })?;

    let account_id = auth.session_account(&session).map_err(|e| {
        e.log_security_event();
        fail(StatusCode::from_u16(e.status_code()).unwrap(), &e.to_string())
    })?;

    Ok((session, account_id))
}

/// Assemble the wire form of a report from its stored rows.
/// Returns None when a stored enum column no longer parses.
fn report_to_wire(
    row: ReportRow,
    action: Option<ModeratorActionRow>,
    reporter: Option<&Account>,
) -> Option<Report> {
    let target_type = TargetType::parse(&row.target_type)?;
    let category = ReportCategory::parse(&row.category)?;
    let status = ReportStatus::parse(&row.status)?;

    let moderator_action = match action {
        Some(a) => Some(ModeratorAction {
            action_type: ActionType::parse(&a.action_type)?,
            moderator: a.moderator_id,
            reason: a.reason,
            action_date: a.action_date,
        }),
        None => None,
    };

    let reporter = Reporter {
        id: row.reporter_id.clone(),
        display_name: reporter
            .map(|a| a.display_name.clone())
            .unwrap_or_else(|| row.reporter_id.clone()),
    };

    Some(Report {
        id: row.id,
        target_type,
        target_id: row.target_id,
        category,
        reason: row.reason,
        description: row.description,
        status,
        reporter,
        created_at: row.created_at,
        version: row.version,
        moderator_action,
    })
}

/// "ALL" (or an absent/empty parameter) disables a filter
fn status_filter(raw: Option<&str>) -> Result<Option<&'static str>, HttpResponse> {
    match raw.map(str::trim) {
        None => Ok(None),
        Some(s) if s.is_empty() || s == "ALL" => Ok(None),
        Some(s) => match ReportStatus::parse(s) {
            Some(status) => Ok(Some(status.as_str())),
            None => Err(fail(StatusCode::BAD_REQUEST, "unknown status filter")),
        },
    }
}

fn category_filter(raw: Option<&str>) -> Result<Option<&'static str>, HttpResponse> {
    match raw.map(str::trim) {
        None => Ok(None),
        Some(s) if s.is_empty() || s == "ALL" => Ok(None),
        Some(s) => match ReportCategory::parse(s) {
            Some(category) => Ok(Some(category.as_str())),
            None => Err(fail(StatusCode::BAD_REQUEST, "unknown category filter")),
        },
    }
}

/// Authentication - validates an account key, opens a session, returns
/// access & refresh tokens (OAuth2-style)
pub async fn auth(
    auth: web::Data<SessionAuth>,
    db: web::Data<DbPool>,
    staff: web::Data<StaffSessions>,
    req: web::Json<AuthRequest>,
) -> HttpResponse {
    let account_key = req.account_key.trim();
    if account_key.is_empty() {
        return fail(StatusCode::BAD_REQUEST, "accountKey required");
    }

    let account = match db::get_account_by_key(&db, account_key) {
        Ok(Some(a)) => a,
        Ok(None) => {
            tracing::warn!("Auth rejected: unknown account key");
            return fail(StatusCode::FORBIDDEN, "invalid accountKey");
        }
        Err(e) => {
            tracing::error!("Failed to look up account: {:?}", e);
            return fail(StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed");
        }
    };

    if account.is_banned {
        tracing::warn!("Auth rejected: account {} is banned", account.id);
        return fail(StatusCode::FORBIDDEN, "account is banned");
    }

    let session = auth.open_session(&account.id);

    // Staff accounts get their session marked for queue/resolution access
    if let Some(role) = StaffRole::from_account_role(&account.role) {
        staff.mark(session, role);
    }

    match auth.generate_token_pair(&session) {
        Ok(pair) => {
            tracing::info!(
                "Authentication successful for account {} (role: {})",
                account.id,
                account.role
            );
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "access_token": pair.access_token,
                "refresh_token": pair.refresh_token,
                "token_type": pair.token_type,
                "expires_in": pair.expires_in,
            }))
        }
        Err(e) => {
            tracing::error!("Failed to generate tokens: {:?}", e);
            e.log_security_event();
            fail(StatusCode::from_u16(e.status_code()).unwrap(), &e.to_string())
        }
    }
}

/// Refresh access token using refresh token (OAuth2-style)
pub async fn refresh_token(
    auth: web::Data<SessionAuth>,
    req: web::Json<RefreshRequest>,
) -> HttpResponse {
    let session = match auth.validate_refresh_token(&req.refresh_token) {
        Ok(s) => s,
        Err(e) => {
            e.log_security_event();
            return fail(StatusCode::from_u16(e.status_code()).unwrap(), &e.to_string());
        }
    };

    // The session must still be open server-side
    if let Err(e) = auth.session_account(&session) {
        e.log_security_event();
        return fail(StatusCode::from_u16(e.status_code()).unwrap(), &e.to_string());
    }

    match auth.generate_token_pair(&session) {
        Ok(pair) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "access_token": pair.access_token,
            "refresh_token": pair.refresh_token,
            "token_type": pair.token_type,
            "expires_in": pair.expires_in,
        })),
        Err(e) => {
            tracing::error!("Failed to generate tokens: {:?}", e);
            e.log_security_event();
            fail(StatusCode::from_u16(e.status_code()).unwrap(), &e.to_string())
        }
    }
}

/// Close the calling session
pub async fn unauth(
    auth: web::Data<SessionAuth>,
    staff: web::Data<StaffSessions>,
    http_req: HttpRequest,
) -> HttpResponse {
    let token = match bearer_token(&http_req) {
        Some(t) => t,
        None => return fail(StatusCode::UNAUTHORIZED, "missing bearer token"),
    };

    let session = match auth.validate_access_token(&token) {
        Ok(s) => s,
        Err(e) => {
            e.log_security_event();
            return fail(StatusCode::from_u16(e.status_code()).unwrap(), &e.to_string());
        }
    };

    staff.remove(&session);

    match auth.unauth(&session) {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({"success": true})),
        Err(e) => {
            e.log_security_event();
            fail(StatusCode::from_u16(e.status_code()).unwrap(), &e.to_string())
        }
    }
}

/// Report intake - validates a submission and persists it in PENDING status
pub async fn submit_report(
    auth: web::Data<SessionAuth>,
    db: web::Data<DbPool>,
    http_req: HttpRequest,
    body: web::Json<ReportSubmission>,
) -> HttpResponse {
    let (_session, account_id) = match authed_account(&auth, &http_req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let reporter = match db::get_account_by_id(&db, &account_id) {
        Ok(Some(a)) => a,
        Ok(None) => {
            tracing::warn!("Submission rejected: account {} no longer exists", account_id);
            return fail(StatusCode::FORBIDDEN, "unknown account");
        }
        Err(e) => {
            tracing::error!("Failed to look up reporter: {:?}", e);
            return fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to submit report");
        }
    };

    if reporter.is_banned {
        tracing::warn!("Submission rejected: account {} is banned", reporter.id);
        return fail(StatusCode::FORBIDDEN, "account is banned");
    }
    let now = Utc::now().timestamp();
    if reporter.suspended_until.is_some_and(|until| until > now) {
        tracing::warn!("Submission rejected: account {} is suspended", reporter.id);
        return fail(StatusCode::FORBIDDEN, "account is suspended");
    }

    // Nothing is persisted unless the whole submission validates
    let validated = match body.into_inner().validate() {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!("Report submission rejected: {}", e);
            return fail(StatusCode::from_u16(e.status_code()).unwrap(), &e.to_string());
        }
    };

    let row = ReportRow {
        id: Uuid::new_v4().to_string(),
        target_type: validated.target_type.as_str().to_string(),
        target_id: validated.target_id,
        category: validated.category.as_str().to_string(),
        reason: validated.reason,
        description: validated.description,
        status: ReportStatus::Pending.as_str().to_string(),
        reporter_id: reporter.id.clone(),
        created_at: now,
        version: 0,
    };

    if let Err(e) = db::insert_report(&db, row.clone()) {
        tracing::error!("Failed to persist report: {:?}", e);
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to submit report");
    }

    tracing::info!(
        "Report {} submitted against {} {} ({})",
        row.id,
        row.target_type,
        row.target_id,
        row.category
    );

    let audit = AuditLog {
        id: Uuid::new_v4().to_string(),
        account_id: Some(reporter.id.clone()),
        event_type: "report_submit".to_string(),
        event_data: serde_json::json!({
            "report_id": row.id,
            "target_type": row.target_type,
            "target_id": row.target_id,
            "category": row.category,
        })
        .to_string(),
        created_at: now,
        ip_address: None,
    };
    if let Err(e) = db::insert_audit_log(&db, audit) {
        tracing::error!("Failed to save audit log: {:?}", e);
    }

    match report_to_wire(row, None, Some(&reporter)) {
        Some(report) => HttpResponse::Ok().json(serde_json::json!({"success": true, "report": report})),
        None => fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to submit report"),
    }
}

/// Moderator queue - reports matching a status and/or category filter,
/// newest first. Pure read.
pub async fn list_reports(
    auth: web::Data<SessionAuth>,
    db: web::Data<DbPool>,
    staff: web::Data<StaffSessions>,
    http_req: HttpRequest,
    query: web::Query<ReportFilter>,
) -> HttpResponse {
    let (session, _account_id) = match authed_account(&auth, &http_req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    if !staff.is_moderator(&session) {
        tracing::warn!("Rejected report listing: session is not staff");
        return fail(StatusCode::FORBIDDEN, "Moderator privileges required");
    }

    let status = match status_filter(query.status.as_deref()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let category = match category_filter(query.category.as_deref()) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let rows = match db::list_reports(&db, status, category) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to fetch reports: {:?}", e);
            return fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch reports");
        }
    };

    let report_ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
    let actions = match db::get_actions_for_reports(&db, &report_ids) {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Failed to fetch moderator actions: {:?}", e);
            return fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch reports");
        }
    };
    let mut actions_by_report: HashMap<String, ModeratorActionRow> = actions
        .into_iter()
        .map(|a| (a.report_id.clone(), a))
        .collect();

    let mut reporter_ids: Vec<String> = rows.iter().map(|r| r.reporter_id.clone()).collect();
    reporter_ids.sort();
    reporter_ids.dedup();
    let accounts = match db::get_accounts_by_ids(&db, &reporter_ids) {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Failed to fetch reporter accounts: {:?}", e);
            return fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch reports");
        }
    };
    let accounts_by_id: HashMap<String, Account> =
        accounts.into_iter().map(|a| (a.id.clone(), a)).collect();

    let mut reports = Vec::with_capacity(rows.len());
    for row in rows {
        let action = actions_by_report.remove(&row.id);
        let reporter = accounts_by_id.get(&row.reporter_id);
        match report_to_wire(row, action, reporter) {
            Some(report) => reports.push(report),
            None => tracing::error!("Skipping report with unparseable stored fields"),
        }
    }

    HttpResponse::Ok().json(serde_json::json!({"success": true, "reports": reports}))
}

/// Fetch a single report with its attached action
pub async fn get_report(
    auth: web::Data<SessionAuth>,
    db: web::Data<DbPool>,
    staff: web::Data<StaffSessions>,
    http_req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let (session, _account_id) = match authed_account(&auth, &http_req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    if !staff.is_moderator(&session) {
        tracing::warn!("Rejected report fetch: session is not staff");
        return fail(StatusCode::FORBIDDEN, "Moderator privileges required");
    }

    let report_id = path.into_inner();
    let row = match db::get_report_by_id(&db, &report_id) {
        Ok(Some(r)) => r,
        Ok(None) => return fail(StatusCode::NOT_FOUND, "report not found"),
        Err(e) => {
            tracing::error!("Failed to fetch report {}: {:?}", report_id, e);
            return fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch reports");
        }
    };

    let action = db::get_action_for_report(&db, &row.id).ok().flatten();
    let reporter = db::get_account_by_id(&db, &row.reporter_id).ok().flatten();

    match report_to_wire(row, action, reporter.as_ref()) {
        Some(report) => HttpResponse::Ok().json(serde_json::json!({"success": true, "report": report})),
        None => fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch reports"),
    }
}

/// Resolution engine - transition a report's status, attach the moderator
/// action, and apply the enforcement side effect
pub async fn resolve_report(
    auth: web::Data<SessionAuth>,
    db: web::Data<DbPool>,
    staff: web::Data<StaffSessions>,
    http_req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<ResolveRequest>,
) -> HttpResponse {
    let (session, moderator_id) = match authed_account(&auth, &http_req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    if !staff.is_moderator(&session) {
        tracing::warn!("Rejected report resolution: session is not staff");
        return fail(StatusCode::FORBIDDEN, "Moderator privileges required");
    }

    let report_id = path.into_inner();
    let req = body.into_inner();

    let requested = match req.status.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => match ReportStatus::parse(s) {
            Some(status) => status,
            None => return fail(StatusCode::BAD_REQUEST, "unknown status"),
        },
        _ => return fail(StatusCode::BAD_REQUEST, "status is required"),
    };

    let action_type = match req.action_type.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(s) => match ActionType::parse(s) {
            Some(action) => Some(action),
            None => return fail(StatusCode::BAD_REQUEST, "unknown actionType"),
        },
    };

    let row = match db::get_report_by_id(&db, &report_id) {
        Ok(Some(r)) => r,
        Ok(None) => return fail(StatusCode::NOT_FOUND, "report not found"),
        Err(e) => {
            tracing::error!("Failed to fetch report {}: {:?}", report_id, e);
            return fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update report");
        }
    };

    let current = match ReportStatus::parse(&row.status) {
        Some(s) => s,
        None => {
            tracing::error!("Report {} has unparseable status '{}'", row.id, row.status);
            return fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update report");
        }
    };
    let target_type = match TargetType::parse(&row.target_type) {
        Some(t) => t,
        None => {
            tracing::error!("Report {} has unparseable target type '{}'", row.id, row.target_type);
            return fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update report");
        }
    };

    // Caller may pin the version it validated against
    if let Some(expected) = req.expected_version {
        if expected != row.version {
            let e = LifecycleError::VersionConflict;
            e.log_event();
            return fail(StatusCode::from_u16(e.status_code()).unwrap(), &e.to_string());
        }
    }

    if let Err(e) = lifecycle::validate_transition(current, requested, action_type, target_type) {
        e.log_event();
        return fail(StatusCode::from_u16(e.status_code()).unwrap(), &e.to_string());
    }

    let now = Utc::now().timestamp();
    let action_row = action_type.map(|a| ModeratorActionRow {
        id: Uuid::new_v4().to_string(),
        report_id: row.id.clone(),
        action_type: a.as_str().to_string(),
        moderator_id: moderator_id.clone(),
        reason: req.action_reason.clone().unwrap_or_default(),
        action_date: now,
    });

    match db::transition_report(&db, &row.id, row.version, requested.as_str(), action_row) {
        Ok(true) => {}
        Ok(false) => {
            let e = LifecycleError::VersionConflict;
            e.log_event();
            return fail(StatusCode::from_u16(e.status_code()).unwrap(), &e.to_string());
        }
        Err(e) => {
            tracing::error!("Failed to update report {}: {:?}", row.id, e);
            return fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update report");
        }
    }

    tracing::info!(
        "Report {} transitioned {} -> {} by {}",
        row.id,
        current,
        requested,
        moderator_id
    );

    // Enforcement side effects; failures are logged, the transition stands
    if let Some(action) = action_type {
        apply_enforcement(&db, &row, action, &moderator_id, now);
    }

    let event_type = match requested {
        ReportStatus::UnderReview => "report_review",
        ReportStatus::Resolved => "report_resolve",
        ReportStatus::Dismissed => "report_dismiss",
        ReportStatus::Pending => "report_update", // unreachable past validation
    };
    let audit = AuditLog {
        id: Uuid::new_v4().to_string(),
        account_id: Some(moderator_id.clone()),
        event_type: event_type.to_string(),
        event_data: serde_json::json!({
            "report_id": row.id,
            "status": requested.as_str(),
            "action_type": action_type.map(|a| a.as_str()),
        })
        .to_string(),
        created_at: now,
        ip_address: None,
    };
    if let Err(e) = db::insert_audit_log(&db, audit) {
        tracing::error!("Failed to save audit log: {:?}", e);
    }

    // Respond with the fresh record
    let updated = db::get_report_by_id(&db, &row.id).ok().flatten();
    let action = db::get_action_for_report(&db, &row.id).ok().flatten();
    let reporter = db::get_account_by_id(&db, &row.reporter_id).ok().flatten();

    match updated.and_then(|r| report_to_wire(r, action, reporter.as_ref())) {
        Some(report) => HttpResponse::Ok().json(serde_json::json!({"success": true, "report": report})),
        None => HttpResponse::Ok().json(serde_json::json!({"success": true})),
    }
}

/// Inform the account/content subsystems about an enforcement decision
fn apply_enforcement(db: &DbPool, report: &ReportRow, action: ActionType, moderator_id: &str, now: i64) {
    match action {
        ActionType::UserSuspended => {
            let until = now + lifecycle::SUSPENSION_SECS;
            match db::suspend_account(db, &report.target_id, until) {
                Ok(0) => tracing::warn!("⚠️ Suspension target {} not found", report.target_id),
                Ok(_) => tracing::info!("Account {} suspended until {}", report.target_id, until),
                Err(e) => tracing::error!("Failed to suspend account {}: {:?}", report.target_id, e),
            }
        }
        ActionType::UserBanned => match db::ban_account(db, &report.target_id) {
            Ok(0) => tracing::warn!("⚠️ Ban target {} not found", report.target_id),
            Ok(_) => tracing::info!("Account {} banned", report.target_id),
            Err(e) => tracing::error!("Failed to ban account {}: {:?}", report.target_id, e),
        },
        ActionType::ContentRemoved | ActionType::ContentHidden => {
            let visibility = if action == ActionType::ContentRemoved {
                "removed"
            } else {
                "hidden"
            };
            let sanction = ContentSanction {
                id: Uuid::new_v4().to_string(),
                target_type: report.target_type.clone(),
                target_id: report.target_id.clone(),
                visibility: visibility.to_string(),
                applied_by: moderator_id.to_string(),
                report_id: report.id.clone(),
                created_at: now,
            };
            if let Err(e) = db::insert_content_sanction(db, sanction) {
                tracing::error!("Failed to record content sanction: {:?}", e);
            }
        }
        ActionType::WarningIssued => {
            // the action log entry is the warning record itself
            tracing::info!("Warning issued for {} {}", report.target_type, report.target_id);
        }
        ActionType::NoAction => {}
    }
}

/// Admin: mint a new account key
pub async fn admin_create_account(
    auth: web::Data<SessionAuth>,
    db: web::Data<DbPool>,
    staff: web::Data<StaffSessions>,
    http_req: HttpRequest,
    req: web::Json<CreateAccountRequest>,
) -> HttpResponse {
    let (session, admin_id) = match authed_account(&auth, &http_req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    if !staff.is_admin(&session) {
        tracing::warn!("Rejected create_account: session is not admin");
        return fail(StatusCode::FORBIDDEN, "Admin privileges required");
    }

    let role = req.role.as_deref().map(str::trim).unwrap_or("member");
    if !matches!(role, "member" | "moderator" | "admin") {
        return fail(StatusCode::BAD_REQUEST, "role must be member, moderator or admin");
    }

    let display_name = match req.display_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "unnamed".to_string(),
    };

    let now = Utc::now().timestamp();
    let account = Account {
        id: Uuid::new_v4().to_string(),
        account_key: Uuid::new_v4().to_string(),
        display_name,
        role: role.to_string(),
        created_at: now,
        suspended_until: None,
        is_banned: false,
    };

    match db::insert_account(&db, account.clone()) {
        Ok(_) => {
            let audit = AuditLog {
                id: Uuid::new_v4().to_string(),
                account_id: Some(admin_id),
                event_type: "account_create".to_string(),
                event_data: serde_json::json!({"new_account_id": account.id, "role": account.role})
                    .to_string(),
                created_at: now,
                ip_address: None,
            };
            if let Err(e) = db::insert_audit_log(&db, audit) {
                tracing::error!("Failed to save audit log: {:?}", e);
            }

            tracing::info!("Account {} created with role {}", account.id, account.role);
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "accountId": account.id,
                "accountKey": account.account_key,
                "role": account.role,
            }))
        }
        Err(e) => {
            tracing::error!("Failed to create account: {:?}", e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create account")
        }
    }
}

/// Admin: revoke an account key (bans the account)
pub async fn admin_revoke_account(
    auth: web::Data<SessionAuth>,
    db: web::Data<DbPool>,
    staff: web::Data<StaffSessions>,
    http_req: HttpRequest,
    req: web::Json<RevokeAccountRequest>,
) -> HttpResponse {
    let (session, admin_id) = match authed_account(&auth, &http_req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    if !staff.is_admin(&session) {
        tracing::warn!("Rejected revoke_account: session is not admin");
        return fail(StatusCode::FORBIDDEN, "Admin privileges required");
    }

    let account_key = req.account_key.trim();
    if account_key.is_empty() {
        return fail(StatusCode::BAD_REQUEST, "accountKey required");
    }

    match db::ban_account_by_key(&db, account_key) {
        Ok(0) => fail(StatusCode::NOT_FOUND, "account not found"),
        Ok(_) => {
            let audit = AuditLog {
                id: Uuid::new_v4().to_string(),
                account_id: Some(admin_id),
                event_type: "account_revoke".to_string(),
                event_data: serde_json::json!({"account_key": account_key}).to_string(),
                created_at: Utc::now().timestamp(),
                ip_address: None,
            };
            if let Err(e) = db::insert_audit_log(&db, audit) {
                tracing::error!("Failed to save audit log: {:?}", e);
            }

            HttpResponse::Ok().json(serde_json::json!({"success": true}))
        }
        Err(e) => {
            tracing::error!("❌ Failed to revoke account: {:?}", e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to revoke account")
        }
    }
}

/// Admin: inspect the audit trail for one event type
pub async fn admin_audit_logs(
    auth: web::Data<SessionAuth>,
    db: web::Data<DbPool>,
    staff: web::Data<StaffSessions>,
    http_req: HttpRequest,
    query: web::Query<AuditLogQuery>,
) -> HttpResponse {
    let (session, _account_id) = match authed_account(&auth, &http_req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    if !staff.is_admin(&session) {
        tracing::warn!("Rejected audit log fetch: session is not admin");
        return fail(StatusCode::FORBIDDEN, "Admin privileges required");
    }

    let limit = query.limit.unwrap_or(100).clamp(1, 1000);
    match db::get_audit_logs_by_type(&db, &query.event_type, limit) {
        Ok(logs) => {
            let logs: Vec<serde_json::Value> = logs
                .into_iter()
                .map(|l| {
                    serde_json::json!({
                        "id": l.id,
                        "accountId": l.account_id,
                        "eventType": l.event_type,
                        "eventData": l.event_data,
                        "createdAt": l.created_at,
                    })
                })
                .collect();
            HttpResponse::Ok().json(serde_json::json!({"success": true, "logs": logs}))
        }
        Err(e) => {
            tracing::error!("Failed to fetch audit logs: {:?}", e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch audit logs")
        }
    }
}
