//! Authentication collaborator boundary
//!
//! Sign-in, sign-up and session handling belong to an external identity
//! service. The marketplace only needs the resulting `{name, email, company,
//! userType}` record, which [`User::from_auth`] derives from an [`AuthUser`].

use crate::core::error::{MarketError, MarketResult};
use crate::core::user::{Role, User};
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::broadcast;
use uuid::Uuid;
use validator::Validate;

/// Profile fields stored alongside an account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(
        default,
        rename = "userType",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_type: Option<Role>,
}

/// An account as the identity service reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub metadata: UserMetadata,
}

/// An active session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: AuthUser,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user: AuthUser) -> Self {
        Self {
            access_token: Uuid::new_v4().simple().to_string(),
            user,
            issued_at: Utc::now(),
        }
    }
}

/// Auth state changes pushed to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
}

impl User {
    /// Derive the application user from an identity-service account.
    ///
    /// Missing name becomes "Unknown", missing email and company become empty.
    /// `role_override` (the role picked on the sign-in form) wins over the
    /// stored role, which in turn defaults to buyer.
    pub fn from_auth(user: &AuthUser, role_override: Option<Role>) -> Self {
        let metadata = &user.metadata;
        Self {
            name: metadata
                .name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            email: user.email.clone().unwrap_or_default(),
            company: metadata.company.clone().unwrap_or_default(),
            user_type: role_override.or(metadata.user_type).unwrap_or_default(),
        }
    }
}

/// Sign-in form
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub user_type: Role,
}

/// Sign-up form; every field is required
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "A valid email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(length(min = 1, message = "Company name is required"))]
    pub company: String,

    pub user_type: Role,
}

impl SignUpRequest {
    pub fn metadata(&self) -> UserMetadata {
        UserMetadata {
            name: Some(self.name.clone()),
            company: Some(self.company.clone()),
            user_type: Some(self.user_type),
        }
    }
}

/// External identity service
///
/// Dropping the receiver returned by [`subscribe`](AuthProvider::subscribe)
/// ends the subscription.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> MarketResult<AuthUser>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: UserMetadata,
    ) -> MarketResult<AuthUser>;

    async fn current_session(&self) -> MarketResult<Option<Session>>;

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;

    async fn sign_out(&self) -> MarketResult<()>;
}

struct Account {
    user: AuthUser,
    /// Argon2id PHC string
    password_hash: String,
}

impl Account {
    fn verify_password(&self, password: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(&self.password_hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> MarketResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| MarketError::Internal(format!("Failed to hash password: {e}")))?;

    Ok(hash.to_string())
}

/// Identity service kept in process memory, for development and tests.
///
/// Accounts and the session are lost on restart. Passwords are stored as
/// Argon2id hashes.
pub struct InMemoryAuthProvider {
    accounts: RwLock<HashMap<String, Account>>,
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
}

impl InMemoryAuthProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            accounts: RwLock::new(HashMap::new()),
            session: RwLock::new(None),
            events,
        }
    }

    fn start_session(&self, user: &AuthUser) -> MarketResult<()> {
        let session = Session::new(user.clone());
        *self
            .session
            .write()
            .map_err(|e| MarketError::Internal(format!("Failed to acquire write lock: {}", e)))? =
            Some(session.clone());
        // Err only means nobody is listening
        let _ = self.events.send(AuthEvent::SignedIn(session));
        Ok(())
    }
}

impl Default for InMemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn account_key(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> MarketResult<AuthUser> {
        let user = {
            let accounts = self
                .accounts
                .read()
                .map_err(|e| MarketError::Internal(format!("Failed to acquire read lock: {}", e)))?;
            match accounts.get(&account_key(email)) {
                Some(account) if account.verify_password(password) => account.user.clone(),
                _ => return Err(MarketError::Auth("Invalid login credentials".to_string())),
            }
        };

        self.start_session(&user)?;
        Ok(user)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: UserMetadata,
    ) -> MarketResult<AuthUser> {
        let password_hash = hash_password(password)?;
        let user = {
            let mut accounts = self.accounts.write().map_err(|e| {
                MarketError::Internal(format!("Failed to acquire write lock: {}", e))
            })?;
            let key = account_key(email);
            if accounts.contains_key(&key) {
                return Err(MarketError::Auth("User already registered".to_string()));
            }
            let user = AuthUser {
                id: Uuid::new_v4(),
                email: Some(email.trim().to_string()),
                metadata,
            };
            accounts.insert(
                key,
                Account {
                    user: user.clone(),
                    password_hash,
                },
            );
            user
        };

        self.start_session(&user)?;
        Ok(user)
    }

    async fn current_session(&self) -> MarketResult<Option<Session>> {
        let session = self
            .session
            .read()
            .map_err(|e| MarketError::Internal(format!("Failed to acquire read lock: {}", e)))?;
        Ok(session.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    async fn sign_out(&self) -> MarketResult<()> {
        let had_session = self
            .session
            .write()
            .map_err(|e| MarketError::Internal(format!("Failed to acquire write lock: {}", e)))?
            .take()
            .is_some();
        if had_session {
            let _ = self.events.send(AuthEvent::SignedOut);
        }
        Ok(())
    }
}
