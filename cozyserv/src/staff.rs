use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Privilege tier of a staff account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffRole {
    Moderator,
    Admin,
}

impl StaffRole {
    /// Map an account role column to a staff tier; member accounts have none
    pub fn from_account_role(role: &str) -> Option<Self> {
        match role {
            "moderator" => Some(StaffRole::Moderator),
            "admin" => Some(StaffRole::Admin),
            _ => None,
        }
    }
}

/// Tracks which sessions belong to staff accounts
#[derive(Default)]
pub struct StaffSessions {
    sessions: RwLock<HashMap<Uuid, StaffRole>>,
}

impl StaffSessions {
    /// Mark a session as carrying staff privileges
    pub fn mark(&self, session_uuid: Uuid, role: StaffRole) {
        let mut sessions = self.sessions.write().unwrap();
        sessions.insert(session_uuid, role);
        tracing::debug!("Session {} marked as {:?}", session_uuid, role);
    }

    /// Moderator-level access (admins qualify too)
    pub fn is_moderator(&self, session_uuid: &Uuid) -> bool {
        let sessions = self.sessions.read().unwrap();
        matches!(
            sessions.get(session_uuid),
            Some(StaffRole::Moderator) | Some(StaffRole::Admin)
        )
    }

    /// Admin-level access
    pub fn is_admin(&self, session_uuid: &Uuid) -> bool {
        let sessions = self.sessions.read().unwrap();
        matches!(sessions.get(session_uuid), Some(StaffRole::Admin))
    }

    /// Remove staff privileges from a session
    pub fn remove(&self, session_uuid: &Uuid) {
        let mut sessions = self.sessions.write().unwrap();
        sessions.remove(session_uuid);
        tracing::debug!("Session {} removed from staff sessions", session_uuid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_implies_moderator() {
        let staff = StaffSessions::default();
        let session = Uuid::new_v4();
        staff.mark(session, StaffRole::Admin);

        assert!(staff.is_moderator(&session));
        assert!(staff.is_admin(&session));
    }

    #[test]
    fn moderator_is_not_admin() {
        let staff = StaffSessions::default();
        let session = Uuid::new_v4();
        staff.mark(session, StaffRole::Moderator);

        assert!(staff.is_moderator(&session));
        assert!(!staff.is_admin(&session));
    }

    #[test]
    fn unknown_sessions_have_no_privileges() {
        let staff = StaffSessions::default();
        let session = Uuid::new_v4();

        assert!(!staff.is_moderator(&session));
        assert!(!staff.is_admin(&session));

        staff.mark(session, StaffRole::Moderator);
        staff.remove(&session);
        assert!(!staff.is_moderator(&session));
    }

    #[test]
    fn member_role_maps_to_no_tier() {
        assert_eq!(StaffRole::from_account_role("member"), None);
        assert_eq!(StaffRole::from_account_role("moderator"), Some(StaffRole::Moderator));
        assert_eq!(StaffRole::from_account_role("admin"), Some(StaffRole::Admin));
        assert_eq!(StaffRole::from_account_role("MODERATOR"), None);
    }
}
