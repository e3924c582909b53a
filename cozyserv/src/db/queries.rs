// Database query functions for all tables
use crate::db::{Account, AuditLog, ContentSanction, DbPool, ModeratorActionRow, ReportRow, schema::*};
use diesel::prelude::*;

// ==================== ACCOUNT QUERIES ====================

pub fn insert_account(db: &DbPool, account: Account) -> Result<(), Box<dyn std::error::Error>> {
    use diesel::insert_into;

    let mut conn = db.lock().unwrap();
    insert_into(accounts::table)
        .values(&account)
        .execute(&mut *conn)?;

    Ok(())
}

pub fn get_account_by_key(db: &DbPool, account_key: &str) -> Result<Option<Account>, Box<dyn std::error::Error>> {
    let mut conn = db.lock().unwrap();
    let result = accounts::table
        .filter(accounts::account_key.eq(account_key))
        .first::<Account>(&mut *conn)
        .optional()?;

    Ok(result)
}

pub fn get_account_by_id(db: &DbPool, account_id: &str) -> Result<Option<Account>, Box<dyn std::error::Error>> {
    let mut conn = db.lock().unwrap();
    let result = accounts::table
        .filter(accounts::id.eq(account_id))
        .first::<Account>(&mut *conn)
        .optional()?;

    Ok(result)
}

pub fn get_accounts_by_ids(db: &DbPool, account_ids: &[String]) -> Result<Vec<Account>, Box<dyn std::error::Error>> {
    let mut conn = db.lock().unwrap();
    let results = accounts::table
        .filter(accounts::id.eq_any(account_ids))
        .load::<Account>(&mut *conn)?;

    Ok(results)
}

/// Suspend an account until the given timestamp. Returns the number of
/// rows touched - 0 means the target account does not exist.
pub fn suspend_account(db: &DbPool, account_id: &str, until: i64) -> Result<usize, Box<dyn std::error::Error>> {
    use diesel::update;

    let mut conn = db.lock().unwrap();
    let rows = update(accounts::table.filter(accounts::id.eq(account_id)))
        .set(accounts::suspended_until.eq(Some(until)))
        .execute(&mut *conn)?;

    Ok(rows)
}

/// Flag an account as banned. Returns the number of rows touched.
pub fn ban_account(db: &DbPool, account_id: &str) -> Result<usize, Box<dyn std::error::Error>> {
    use diesel::update;

    let mut conn = db.lock().unwrap();
    let rows = update(accounts::table.filter(accounts::id.eq(account_id)))
        .set(accounts::is_banned.eq(true))
        .execute(&mut *conn)?;

    Ok(rows)
}

/// Ban an account by its key (admin key revocation). Returns rows touched.
pub fn ban_account_by_key(db: &DbPool, account_key: &str) -> Result<usize, Box<dyn std::error::Error>> {
    use diesel::update;

    let mut conn = db.lock().unwrap();
    let rows = update(accounts::table.filter(accounts::account_key.eq(account_key)))
        .set(accounts::is_banned.eq(true))
        .execute(&mut *conn)?;

    Ok(rows)
}

// ==================== REPORT QUERIES ====================

pub fn insert_report(db: &DbPool, report: ReportRow) -> Result<(), Box<dyn std::error::Error>> {
    use diesel::insert_into;

    let mut conn = db.lock().unwrap();
    insert_into(reports::table)
        .values(&report)
        .execute(&mut *conn)?;

    Ok(())
}

pub fn get_report_by_id(db: &DbPool, report_id: &str) -> Result<Option<ReportRow>, Box<dyn std::error::Error>> {
    let mut conn = db.lock().unwrap();
    let result = reports::table
        .filter(reports::id.eq(report_id))
        .first::<ReportRow>(&mut *conn)
        .optional()?;

    Ok(result)
}

/// List reports newest-first, optionally narrowed by status and/or category.
/// Filters take the wire string form ("PENDING", "SPAM", ...); None means no filter.
pub fn list_reports(
    db: &DbPool,
    status: Option<&str>,
    category: Option<&str>,
) -> Result<Vec<ReportRow>, Box<dyn std::error::Error>> {
    let mut conn = db.lock().unwrap();

    let mut query = reports::table.into_boxed();
    if let Some(status) = status {
        query = query.filter(reports::status.eq(status.to_string()));
    }
    if let Some(category) = category {
        query = query.filter(reports::category.eq(category.to_string()));
    }

    let results = query
        .order_by(reports::created_at.desc())
        .load::<ReportRow>(&mut *conn)?;

    Ok(results)
}

/// Apply a validated status transition as a conditional update: the write
/// only lands if the stored version still matches the version the
/// transition was validated against. The status change and the action
/// attachment commit in one transaction. Returns false when the
/// conditional update finds no matching row (concurrent modification).
pub fn transition_report(
    db: &DbPool,
    report_id: &str,
    expected_version: i32,
    new_status: &str,
    action: Option<ModeratorActionRow>,
) -> Result<bool, Box<dyn std::error::Error>> {
    use diesel::insert_into;
    use diesel::update;

    let mut conn = db.lock().unwrap();
    let applied = conn.transaction::<bool, diesel::result::Error, _>(|conn| {
        let rows = update(
            reports::table
                .filter(reports::id.eq(report_id))
                .filter(reports::version.eq(expected_version)),
        )
        .set((
            reports::status.eq(new_status),
            reports::version.eq(expected_version + 1),
        ))
        .execute(conn)?;

        if rows == 0 {
            return Ok(false);
        }

        if let Some(action) = action {
            insert_into(moderator_actions::table)
                .values(&action)
                .execute(conn)?;
        }

        Ok(true)
    })?;

    Ok(applied)
}

// ==================== MODERATOR ACTION QUERIES ====================

pub fn get_action_for_report(db: &DbPool, report_id: &str) -> Result<Option<ModeratorActionRow>, Box<dyn std::error::Error>> {
    let mut conn = db.lock().unwrap();
    let result = moderator_actions::table
        .filter(moderator_actions::report_id.eq(report_id))
        .first::<ModeratorActionRow>(&mut *conn)
        .optional()?;

    Ok(result)
}

pub fn get_actions_for_reports(db: &DbPool, report_ids: &[String]) -> Result<Vec<ModeratorActionRow>, Box<dyn std::error::Error>> {
    let mut conn = db.lock().unwrap();
    let results = moderator_actions::table
        .filter(moderator_actions::report_id.eq_any(report_ids))
        .load::<ModeratorActionRow>(&mut *conn)?;

    Ok(results)
}

// ==================== CONTENT SANCTION QUERIES ====================

pub fn insert_content_sanction(db: &DbPool, sanction: ContentSanction) -> Result<(), Box<dyn std::error::Error>> {
    use diesel::insert_into;

    let mut conn = db.lock().unwrap();
    insert_into(content_sanctions::table)
        .values(&sanction)
        .execute(&mut *conn)?;

    tracing::info!("✅ Content sanction recorded: {} {} {}", sanction.visibility, sanction.target_type, sanction.target_id);
    Ok(())
}

// ==================== AUDIT LOG QUERIES ====================

pub fn insert_audit_log(db: &DbPool, log: AuditLog) -> Result<(), Box<dyn std::error::Error>> {
    use diesel::insert_into;

    let mut conn = db.lock().unwrap();
    insert_into(audit_logs::table)
        .values(&log)
        .execute(&mut *conn)?;

    Ok(())
}

pub fn get_audit_logs_by_type(db: &DbPool, event_type: &str, limit: i64) -> Result<Vec<AuditLog>, Box<dyn std::error::Error>> {
    let mut conn = db.lock().unwrap();
    let results = audit_logs::table
        .filter(audit_logs::event_type.eq(event_type))
        .order_by(audit_logs::created_at.desc())
        .limit(limit)
        .load::<AuditLog>(&mut *conn)?;

    Ok(results)
}
