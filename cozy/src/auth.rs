use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL_SAFE};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// JWT Claims for session authentication (OAuth2-style)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,        // Subject (session UUID)
    pub exp: usize,         // Expiration time (Unix timestamp)
    pub iat: usize,         // Issued at (Unix timestamp)
    pub token_type: String, // "access" or "refresh"
}

/// Token pair response (OAuth2 pattern)
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,     // "Bearer"
    pub expires_in: u64,        // seconds until access_token expires
}

/// Per-session state kept while a session is open
#[derive(Clone)]
pub struct SessionData {
    pub account_id: String,
    pub opened_at: u64,  // Unix timestamp in seconds
}

#[derive(Debug, Clone)]
pub enum AuthError {
    InvalidSession,
    SessionNotFound,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidSession => write!(f, "Invalid or expired session token"),
            AuthError::SessionNotFound => write!(f, "Session not found or closed"),
        }
    }
}

impl std::error::Error for AuthError {}

impl AuthError {
    pub fn status_code(&self) -> u16 {
        401 // Unauthorized either way
    }

    /// Log the error with appropriate security context
    pub fn log_security_event(&self) {
        match self {
            AuthError::InvalidSession => {
                tracing::warn!("Rejected request with invalid or expired token");
            }
            AuthError::SessionNotFound => {
                tracing::debug!("Session not found - unknown or closed UUID");
            }
        }
    }
}

/// Server-side session state with JWT authentication.
/// Sessions are opened against a validated account key and referenced by
/// UUID in token claims; the account id is resolved through the registry
/// on every authenticated request.
pub struct SessionAuth {
    // JWT secret for signing tokens, regenerated on every server start
    jwt_secret: String,
    // Map of session UUID to session data
    sessions: RwLock<HashMap<Uuid, SessionData>>,
}

impl SessionAuth {
    pub fn new() -> Self {
        let random_bytes: [u8; 16] = rand::random();
        let random_string = BASE64_URL_SAFE.encode(random_bytes);
        let jwt_secret = format!("{}{}", random_string, Uuid::new_v4().simple());

        tracing::info!("🔐 Session signing secret generated");

        Self {
            jwt_secret,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Open a session for an account whose key has already been validated
    pub fn open_session(&self, account_id: &str) -> Uuid {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let session_uuid = Uuid::new_v4();
        let data = SessionData {
            account_id: account_id.to_string(),
            opened_at: now,
        };

        let mut sessions = self.sessions.write().unwrap();
        sessions.insert(session_uuid, data);
        tracing::info!("Session opened: {} (account: {})", session_uuid, account_id);

        session_uuid
    }

    /// Generate access token (short-lived, 15 minutes)
    fn generate_access_token(&self, session_id: &Uuid) -> Result<String, AuthError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as usize;

        let claims = Claims {
            sub: session_id.to_string(),
            exp: now + 900, // 15 minutes
            iat: now,
            token_type: "access".to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|_| AuthError::InvalidSession)
    }

    /// Generate refresh token (long-lived, 7 days)
    fn generate_refresh_token(&self, session_id: &Uuid) -> Result<String, AuthError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as usize;

        let claims = Claims {
            sub: session_id.to_string(),
            exp: now + 604800, // 7 days
            iat: now,
            token_type: "refresh".to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|_| AuthError::InvalidSession)
    }

    /// Generate token pair (OAuth2 pattern)
    pub fn generate_token_pair(&self, session_id: &Uuid) -> Result<TokenPair, AuthError> {
        let access_token = self.generate_access_token(session_id)?;
        let refresh_token = self.generate_refresh_token(session_id)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: 900, // 15 minutes
        })
    }

    /// Generic token validator
    fn validate_token(&self, token: &str, expected_type: &str) -> Result<Uuid, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 30;  // Allow 30 seconds leeway for clock skew

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            tracing::warn!("Token validation failed for type '{}': {:?}", expected_type, e);
            AuthError::InvalidSession
        })?;

        if token_data.claims.token_type != expected_type {
            tracing::warn!(
                "Token type mismatch: expected '{}', got '{}'",
                expected_type,
                token_data.claims.token_type
            );
            return Err(AuthError::InvalidSession);
        }

        Uuid::parse_str(&token_data.claims.sub).map_err(|_| AuthError::InvalidSession)
    }

    /// Validate access token (15 min) and extract session ID
    pub fn validate_access_token(&self, token: &str) -> Result<Uuid, AuthError> {
        self.validate_token(token, "access")
    }

    /// Validate refresh token (7 days) and extract session ID
    pub fn validate_refresh_token(&self, token: &str) -> Result<Uuid, AuthError> {
        self.validate_token(token, "refresh")
    }

    /// Resolve the account behind an open session
    pub fn session_account(&self, session_id: &Uuid) -> Result<String, AuthError> {
        let sessions = self.sessions.read().unwrap();
        sessions
            .get(session_id)
            .map(|data| data.account_id.clone())
            .ok_or(AuthError::SessionNotFound)
    }

    /// Close a session
    pub fn unauth(&self, session_id: &Uuid) -> Result<(), AuthError> {
        let mut sessions = self.sessions.write().unwrap();
        match sessions.remove(session_id) {
            Some(_) => {
                tracing::info!("Session closed: {}", session_id);
                tracing::info!("Total active sessions: {}", sessions.len());
                Ok(())
            }
            None => Err(AuthError::SessionNotFound),
        }
    }

    /// Get total number of active sessions
    pub fn active_sessions(&self) -> usize {
        self.sessions.read().unwrap().len()
    }
}

impl Default for SessionAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_round_trip() {
        let auth = SessionAuth::new();
        let session = auth.open_session("acc-1");
        let pair = auth.generate_token_pair(&session).unwrap();

        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(auth.validate_access_token(&pair.access_token).unwrap(), session);
        assert_eq!(auth.validate_refresh_token(&pair.refresh_token).unwrap(), session);
        assert_eq!(auth.session_account(&session).unwrap(), "acc-1");
    }

    #[test]
    fn token_types_are_not_interchangeable() {
        let auth = SessionAuth::new();
        let session = auth.open_session("acc-1");
        let pair = auth.generate_token_pair(&session).unwrap();

        assert!(auth.validate_access_token(&pair.refresh_token).is_err());
        assert!(auth.validate_refresh_token(&pair.access_token).is_err());
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let auth = SessionAuth::new();
        let other = SessionAuth::new();
        let session = auth.open_session("acc-1");
        let pair = auth.generate_token_pair(&session).unwrap();

        assert!(other.validate_access_token(&pair.access_token).is_err());
    }

    #[test]
    fn unauth_closes_the_session() {
        let auth = SessionAuth::new();
        let session = auth.open_session("acc-1");
        assert_eq!(auth.active_sessions(), 1);

        auth.unauth(&session).unwrap();
        assert_eq!(auth.active_sessions(), 0);
        assert!(auth.session_account(&session).is_err());
        assert!(matches!(auth.unauth(&session), Err(AuthError::SessionNotFound)));
    }
}
