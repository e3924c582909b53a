// End-to-end tests for the report lifecycle REST surface, running the
// actix service in-process against an in-memory SQLite database.
use actix_web::{App, http::StatusCode, test, web};
use chrono::Utc;
use uuid::Uuid;

use cozy::auth::SessionAuth;
use cozy::lifecycle::SUSPENSION_SECS;
use cozyserv::db::{self, Account, DbPool};
use cozyserv::staff::StaffSessions;
use cozyserv::configure_routes;

fn seeded_db() -> DbPool {
    let pool = db::init::init_db(":memory:").expect("in-memory database");
    db::init::run_migrations(&pool).expect("migrations");
    pool
}

fn seed_account(pool: &DbPool, key: &str, role: &str) -> String {
    let id = Uuid::new_v4().to_string();
    db::insert_account(
        pool,
        Account {
            id: id.clone(),
            account_key: key.to_string(),
            display_name: format!("{role}-user"),
            role: role.to_string(),
            created_at: Utc::now().timestamp(),
            suspended_until: None,
            is_banned: false,
        },
    )
    .expect("seed account");
    id
}

macro_rules! test_app {
    ($db:expr) => {{
        test::init_service(
            App::new()
                .app_data(web::Data::new(SessionAuth::new()))
                .app_data(web::Data::new(StaffSessions::default()))
                .app_data(web::Data::new($db.clone()))
                .service(configure_routes()),
        )
        .await
    }};
}

macro_rules! auth_token {
    ($app:expr, $key:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/auth")
            .set_json(serde_json::json!({"accountKey": $key}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&$app, req).await;
        assert_eq!(body["success"], true, "auth failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }};
}

macro_rules! submit_report {
    ($app:expr, $token:expr, $body:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/reports")
            .insert_header(("Authorization", format!("Bearer {}", $token)))
            .set_json($body)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&$app, req).await;
        body
    }};
}

macro_rules! patch_report {
    ($app:expr, $token:expr, $id:expr, $body:expr) => {{
        let req = test::TestRequest::patch()
            .uri(&format!("/api/reports/{}", $id))
            .insert_header(("Authorization", format!("Bearer {}", $token)))
            .set_json($body)
            .to_request();
        test::call_service(&$app, req).await
    }};
}

macro_rules! list_reports {
    ($app:expr, $token:expr, $query:expr) => {{
        let req = test::TestRequest::get()
            .uri(&format!("/api/reports{}", $query))
            .insert_header(("Authorization", format!("Bearer {}", $token)))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&$app, req).await;
        body
    }};
}

#[actix_web::test]
async fn submitted_report_lands_in_pending_queue() {
    let pool = seeded_db();
    seed_account(&pool, "member-key", "member");
    seed_account(&pool, "mod-key", "moderator");
    let app = test_app!(pool);

    let member = auth_token!(app, "member-key");
    let body = submit_report!(
        app,
        member,
        serde_json::json!({
            "targetType": "POST",
            "targetId": "42",
            "category": "SPAM",
            "reason": "repeated promo links",
        })
    );
    assert_eq!(body["success"], true, "{body}");
    assert_eq!(body["report"]["status"], "PENDING");
    assert_eq!(body["report"]["version"], 0);

    let moderator = auth_token!(app, "mod-key");
    let queue = list_reports!(app, moderator, "?status=PENDING");
    assert_eq!(queue["success"], true);
    let reports = queue["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["targetId"], "42");
    assert_eq!(reports[0]["category"], "SPAM");
    assert_eq!(reports[0]["reporter"]["displayName"], "member-user");
}

#[actix_web::test]
async fn invalid_submissions_are_rejected_without_persisting() {
    let pool = seeded_db();
    seed_account(&pool, "member-key", "member");
    seed_account(&pool, "mod-key", "moderator");
    let app = test_app!(pool);

    let member = auth_token!(app, "member-key");

    // missing category
    let req = test::TestRequest::post()
        .uri("/api/reports")
        .insert_header(("Authorization", format!("Bearer {member}")))
        .set_json(serde_json::json!({
            "targetType": "POST",
            "targetId": "42",
            "reason": "spam",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);

    // empty reason
    let req = test::TestRequest::post()
        .uri("/api/reports")
        .insert_header(("Authorization", format!("Bearer {member}")))
        .set_json(serde_json::json!({
            "targetType": "POST",
            "targetId": "42",
            "category": "SPAM",
            "reason": "   ",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // neither submission left a record behind
    let moderator = auth_token!(app, "mod-key");
    let queue = list_reports!(app, moderator, "");
    assert_eq!(queue["reports"].as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn dismissal_attaches_no_action_and_is_terminal() {
    let pool = seeded_db();
    seed_account(&pool, "member-key", "member");
    seed_account(&pool, "mod-key", "moderator");
    let app = test_app!(pool);

    let member = auth_token!(app, "member-key");
    let body = submit_report!(
        app,
        member,
        serde_json::json!({
            "targetType": "COMMENT",
            "targetId": "c-9",
            "category": "OTHER",
            "reason": "looks off",
        })
    );
    let report_id = body["report"]["id"].as_str().unwrap().to_string();

    let moderator = auth_token!(app, "mod-key");
    let resp = patch_report!(
        app,
        moderator,
        report_id,
        serde_json::json!({
            "status": "DISMISSED",
            "actionType": "NO_ACTION",
            "actionReason": "Report dismissed after review",
        })
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["report"]["status"], "DISMISSED");
    assert_eq!(body["report"]["moderatorAction"]["actionType"], "NO_ACTION");
    assert_eq!(
        body["report"]["moderatorAction"]["reason"],
        "Report dismissed after review"
    );

    // terminal: any further transition is rejected, not silently accepted
    let resp = patch_report!(
        app,
        moderator,
        report_id,
        serde_json::json!({"status": "PENDING"})
    );
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = patch_report!(
        app,
        moderator,
        report_id,
        serde_json::json!({"status": "DISMISSED", "actionType": "NO_ACTION"})
    );
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let queue = list_reports!(app, moderator, "?status=DISMISSED");
    assert_eq!(queue["reports"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn suspension_sets_suspended_until_seven_days_out() {
    let pool = seeded_db();
    seed_account(&pool, "member-key", "member");
    seed_account(&pool, "mod-key", "moderator");
    let target_id = seed_account(&pool, "target-key", "member");
    let app = test_app!(pool);

    let member = auth_token!(app, "member-key");
    let body = submit_report!(
        app,
        member,
        serde_json::json!({
            "targetType": "USER",
            "targetId": target_id,
            "category": "HARASSMENT",
            "reason": "abusive DMs",
        })
    );
    let report_id = body["report"]["id"].as_str().unwrap().to_string();

    let moderator = auth_token!(app, "mod-key");
    let before = Utc::now().timestamp();
    let resp = patch_report!(
        app,
        moderator,
        report_id,
        serde_json::json!({
            "status": "RESOLVED",
            "actionType": "USER_SUSPENDED",
            "actionReason": "User suspended for policy violation",
        })
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["report"]["status"], "RESOLVED");
    assert_eq!(body["report"]["moderatorAction"]["actionType"], "USER_SUSPENDED");

    let target = db::get_account_by_id(&pool, &target_id).unwrap().unwrap();
    let until = target.suspended_until.expect("suspension applied");
    let after = Utc::now().timestamp();
    assert!(until >= before + SUSPENSION_SECS && until <= after + SUSPENSION_SECS);
}

#[actix_web::test]
async fn status_and_category_filters_narrow_the_queue() {
    let pool = seeded_db();
    seed_account(&pool, "member-key", "member");
    seed_account(&pool, "mod-key", "moderator");
    let app = test_app!(pool);

    let member = auth_token!(app, "member-key");
    let mut ids = Vec::new();
    for (category, target) in [("SPAM", "1"), ("SPAM", "2"), ("HARASSMENT", "3")] {
        let body = submit_report!(
            app,
            member,
            serde_json::json!({
                "targetType": "POST",
                "targetId": target,
                "category": category,
                "reason": "reported",
            })
        );
        ids.push(body["report"]["id"].as_str().unwrap().to_string());
    }

    let moderator = auth_token!(app, "mod-key");

    // resolve one of the spam reports
    let resp = patch_report!(
        app,
        moderator,
        ids[0],
        serde_json::json!({"status": "RESOLVED", "actionType": "CONTENT_REMOVED"})
    );
    assert_eq!(resp.status(), StatusCode::OK);

    let queue = list_reports!(app, moderator, "?status=PENDING");
    assert_eq!(queue["reports"].as_array().unwrap().len(), 2);

    let queue = list_reports!(app, moderator, "?status=ALL");
    assert_eq!(queue["reports"].as_array().unwrap().len(), 3);

    let queue = list_reports!(app, moderator, "");
    assert_eq!(queue["reports"].as_array().unwrap().len(), 3);

    let queue = list_reports!(app, moderator, "?category=HARASSMENT");
    assert_eq!(queue["reports"].as_array().unwrap().len(), 1);

    let queue = list_reports!(app, moderator, "?status=PENDING&category=SPAM");
    assert_eq!(queue["reports"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/reports?status=OPEN")
        .insert_header(("Authorization", format!("Bearer {moderator}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn account_actions_require_a_user_target() {
    let pool = seeded_db();
    seed_account(&pool, "member-key", "member");
    seed_account(&pool, "mod-key", "moderator");
    let app = test_app!(pool);

    let member = auth_token!(app, "member-key");
    let body = submit_report!(
        app,
        member,
        serde_json::json!({
            "targetType": "POST",
            "targetId": "42",
            "category": "SPAM",
            "reason": "spam post",
        })
    );
    let report_id = body["report"]["id"].as_str().unwrap().to_string();

    let moderator = auth_token!(app, "mod-key");
    let resp = patch_report!(
        app,
        moderator,
        report_id,
        serde_json::json!({"status": "RESOLVED", "actionType": "USER_BANNED"})
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // the rejected transition left the report untouched
    let queue = list_reports!(app, moderator, "?status=PENDING");
    assert_eq!(queue["reports"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn review_then_resolve_bumps_the_version() {
    let pool = seeded_db();
    seed_account(&pool, "member-key", "member");
    seed_account(&pool, "mod-key", "moderator");
    let app = test_app!(pool);

    let member = auth_token!(app, "member-key");
    let body = submit_report!(
        app,
        member,
        serde_json::json!({
            "targetType": "POST",
            "targetId": "42",
            "category": "MISINFORMATION",
            "reason": "fabricated quote",
        })
    );
    let report_id = body["report"]["id"].as_str().unwrap().to_string();

    let moderator = auth_token!(app, "mod-key");
    let resp = patch_report!(
        app,
        moderator,
        report_id,
        serde_json::json!({"status": "UNDER_REVIEW"})
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["report"]["status"], "UNDER_REVIEW");
    assert_eq!(body["report"]["version"], 1);
    assert!(body["report"].get("moderatorAction").is_none());

    let resp = patch_report!(
        app,
        moderator,
        report_id,
        serde_json::json!({
            "status": "RESOLVED",
            "actionType": "CONTENT_HIDDEN",
            "actionReason": "hidden pending correction",
        })
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["report"]["status"], "RESOLVED");
    assert_eq!(body["report"]["version"], 2);
    assert_eq!(body["report"]["moderatorAction"]["actionType"], "CONTENT_HIDDEN");
}

#[actix_web::test]
async fn stale_expected_version_is_a_conflict() {
    let pool = seeded_db();
    seed_account(&pool, "member-key", "member");
    seed_account(&pool, "mod-key", "moderator");
    let app = test_app!(pool);

    let member = auth_token!(app, "member-key");
    let body = submit_report!(
        app,
        member,
        serde_json::json!({
            "targetType": "POST",
            "targetId": "42",
            "category": "SPAM",
            "reason": "spam",
        })
    );
    let report_id = body["report"]["id"].as_str().unwrap().to_string();

    let moderator = auth_token!(app, "mod-key");
    let resp = patch_report!(
        app,
        moderator,
        report_id,
        serde_json::json!({"status": "UNDER_REVIEW", "expectedVersion": 5})
    );
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // pinning the live version works
    let resp = patch_report!(
        app,
        moderator,
        report_id,
        serde_json::json!({"status": "UNDER_REVIEW", "expectedVersion": 0})
    );
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn queue_and_resolution_require_staff() {
    let pool = seeded_db();
    seed_account(&pool, "member-key", "member");
    let app = test_app!(pool);

    let member = auth_token!(app, "member-key");

    let req = test::TestRequest::get()
        .uri("/api/reports")
        .insert_header(("Authorization", format!("Bearer {member}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = patch_report!(
        app,
        member,
        "missing-report",
        serde_json::json!({"status": "DISMISSED"})
    );
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // and a bearer token is required at all
    let req = test::TestRequest::get().uri("/api/reports").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn admin_mints_and_revokes_account_keys() {
    let pool = seeded_db();
    db::init::init_admin_account(&pool).expect("bootstrap admin");
    let app = test_app!(pool);

    let admin = auth_token!(app, db::init::ADMIN_BOOTSTRAP_KEY);

    let req = test::TestRequest::post()
        .uri("/api/admin/create_account")
        .insert_header(("Authorization", format!("Bearer {admin}")))
        .set_json(serde_json::json!({"displayName": "night shift", "role": "moderator"}))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true, "{body}");
    let new_key = body["accountKey"].as_str().unwrap().to_string();

    // the minted key authenticates and carries moderator access
    let moderator = auth_token!(app, new_key);
    let queue = list_reports!(app, moderator, "");
    assert_eq!(queue["success"], true);

    let req = test::TestRequest::post()
        .uri("/api/admin/revoke_account")
        .insert_header(("Authorization", format!("Bearer {admin}")))
        .set_json(serde_json::json!({"accountKey": new_key}))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);

    // revoked key can no longer authenticate
    let req = test::TestRequest::post()
        .uri("/api/auth")
        .set_json(serde_json::json!({"accountKey": new_key}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // admin actions show up in the audit trail
    let req = test::TestRequest::get()
        .uri("/api/admin/audit_logs?eventType=account_create")
        .insert_header(("Authorization", format!("Bearer {admin}")))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["logs"].as_array().unwrap().len(), 1);

    // non-admin staff cannot manage accounts
    let req = test::TestRequest::post()
        .uri("/api/admin/create_account")
        .insert_header(("Authorization", format!("Bearer {moderator}")))
        .set_json(serde_json::json!({"role": "member"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
