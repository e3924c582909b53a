// Diesel schema definition for the Cozy moderation database
use diesel::allow_tables_to_appear_in_same_query;
use diesel::table;

table! {
    accounts (id) {
        id -> Text,
        account_key -> Text,
        display_name -> Text,
        role -> Text,
        created_at -> BigInt,
        suspended_until -> Nullable<BigInt>,
        is_banned -> Bool,
    }
}

table! {
    reports (id) {
        id -> Text,
        target_type -> Text,
        target_id -> Text,
        category -> Text,
        reason -> Text,
        description -> Nullable<Text>,
        status -> Text,
        reporter_id -> Text,
        created_at -> BigInt,
        version -> Integer,
    }
}

table! {
    moderator_actions (id) {
        id -> Text,
        report_id -> Text,
        action_type -> Text,
        moderator_id -> Text,
        reason -> Text,
        action_date -> BigInt,
    }
}

table! {
    content_sanctions (id) {
        id -> Text,
        target_type -> Text,
        target_id -> Text,
        visibility -> Text,
        applied_by -> Text,
        report_id -> Text,
        created_at -> BigInt,
    }
}

table! {
    audit_logs (id) {
        id -> Text,
        account_id -> Nullable<Text>,
        event_type -> Text,
        event_data -> Text,
        created_at -> BigInt,
        ip_address -> Nullable<Text>,
    }
}

allow_tables_to_appear_in_same_query!(
    accounts,
    reports,
    moderator_actions,
    content_sanctions,
    audit_logs,
);
