// Database initialization and connection management
use diesel::Connection;
use diesel::sqlite::SqliteConnection;
use std::sync::{Arc, Mutex};

pub type DbPool = Arc<Mutex<SqliteConnection>>;

/// Bootstrap admin account key - lets an operator authenticate and mint
/// real staff accounts on a fresh database
pub const ADMIN_BOOTSTRAP_KEY: &str = "4c8e1f6a-2b9d-47e3-8a5c-d1f0b6e97c24-admin-bootstrap-key";

/// Open the SQLite database, creating the file if it doesn't exist.
/// Note: SQLite has built-in thread-safety; Arc<Mutex<>> provides safe shared access
pub fn init_db(database_url: &str) -> Result<DbPool, Box<dyn std::error::Error>> {
    Ok(Arc::new(Mutex::new(SqliteConnection::establish(database_url)?)))
}

/// Run migrations on the database
pub fn run_migrations(db: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    use diesel::RunQueryDsl;
    use diesel::sql_query;

    let mut conn = db.lock().unwrap();

    // Execute each CREATE TABLE separately for better error handling
    let tables = vec![
        "CREATE TABLE IF NOT EXISTS accounts (
            id TEXT PRIMARY KEY NOT NULL,
            account_key TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'member',
            created_at INTEGER NOT NULL,
            suspended_until INTEGER,
            is_banned BOOLEAN NOT NULL DEFAULT 0
        )",

        "CREATE TABLE IF NOT EXISTS reports (
            id TEXT PRIMARY KEY NOT NULL,
            target_type TEXT NOT NULL,
            target_id TEXT NOT NULL,
            category TEXT NOT NULL,
            reason TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL DEFAULT 'PENDING',
            reporter_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            version INTEGER NOT NULL DEFAULT 0
        )",

        "CREATE TABLE IF NOT EXISTS moderator_actions (
            id TEXT PRIMARY KEY NOT NULL,
            report_id TEXT NOT NULL UNIQUE,
            action_type TEXT NOT NULL,
            moderator_id TEXT NOT NULL,
            reason TEXT NOT NULL,
            action_date INTEGER NOT NULL
        )",

        "CREATE TABLE IF NOT EXISTS content_sanctions (
            id TEXT PRIMARY KEY NOT NULL,
            target_type TEXT NOT NULL,
            target_id TEXT NOT NULL,
            visibility TEXT NOT NULL,
            applied_by TEXT NOT NULL,
            report_id TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )",

        "CREATE TABLE IF NOT EXISTS audit_logs (
            id TEXT PRIMARY KEY NOT NULL,
            account_id TEXT,
            event_type TEXT NOT NULL,
            event_data TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            ip_address TEXT
        )",
    ];

    // Create tables
    for table_sql in tables {
        match sql_query(table_sql).execute(&mut *conn) {
            Ok(_) => tracing::debug!("✅ Table created/verified"),
            Err(e) => tracing::warn!("⚠️ Table creation warning: {:?}", e),
        }
    }

    // Create indexes
    let indexes = vec![
        "CREATE INDEX IF NOT EXISTS idx_accounts_account_key ON accounts(account_key)",
        "CREATE INDEX IF NOT EXISTS idx_reports_status ON reports(status)",
        "CREATE INDEX IF NOT EXISTS idx_reports_category ON reports(category)",
        "CREATE INDEX IF NOT EXISTS idx_reports_created_at ON reports(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_moderator_actions_report_id ON moderator_actions(report_id)",
        "CREATE INDEX IF NOT EXISTS idx_content_sanctions_target ON content_sanctions(target_type, target_id)",
        "CREATE INDEX IF NOT EXISTS idx_audit_logs_event_type ON audit_logs(event_type)",
    ];

    for index_sql in indexes {
        match sql_query(index_sql).execute(&mut *conn) {
            Ok(_) => tracing::debug!("✅ Index created/verified"),
            Err(e) => tracing::warn!("⚠️ Index creation warning: {:?}", e),
        }
    }

    Ok(())
}

/// Insert the bootstrap admin account if it doesn't exist
pub fn init_admin_account(db: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    use chrono::Utc;
    use diesel::RunQueryDsl;
    use diesel::sql_query;
    use uuid::Uuid;

    let mut conn = db.lock().unwrap();

    let account_id = Uuid::new_v4().to_string();
    let now = Utc::now().timestamp();

    let insert_query = "INSERT OR IGNORE INTO accounts (id, account_key, display_name, role, created_at, suspended_until, is_banned) VALUES (?, ?, ?, ?, ?, NULL, ?)";
    match sql_query(insert_query)
        .bind::<diesel::sql_types::Text, _>(account_id)
        .bind::<diesel::sql_types::Text, _>(ADMIN_BOOTSTRAP_KEY)
        .bind::<diesel::sql_types::Text, _>("root")
        .bind::<diesel::sql_types::Text, _>("admin")
        .bind::<diesel::sql_types::BigInt, _>(now)
        .bind::<diesel::sql_types::Bool, _>(false)
        .execute(&mut *conn)
    {
        Ok(_) => {
            tracing::info!("Admin account initialized");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Failed to initialize admin account: {:?}", e);
            Err(format!("Failed to initialize admin account: {:?}", e).into())
        }
    }
}
