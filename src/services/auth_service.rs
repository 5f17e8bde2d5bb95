use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{hash_password, verify_password, AuthError, TokenService};
use crate::database::models::account::{ROLE_ADMIN, ROLE_USER};
use crate::database::models::{AccountProfile, NewAccount};
use crate::database::{AccountStore, DatabaseError};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account is disabled")]
    Disabled,

    #[error("Account no longer exists")]
    UnknownSubject,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

/// Registration, credential checks and session tokens.
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    tokens: TokenService,
    min_password_length: usize,
    /// Verified against on unknown usernames so both login failures cost one Argon2 run.
    dummy_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(accounts: Arc<dyn AccountStore>, tokens: TokenService, min_password_length: usize) -> Self {
        Self { accounts, tokens, min_password_length, dummy_hash: OnceCell::new() }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Create an account. The first account ever registered also gets `ROLE_ADMIN`.
    pub async fn register(&self, request: RegisterRequest) -> Result<AccountProfile, AccountError> {
        let username = request.username.trim().to_string();
        let email = request.email.trim().to_string();

        if username.is_empty() {
            return Err(AccountError::Validation { field: "username", message: "Username is required".to_string() });
        }
        if email.is_empty() {
            return Err(AccountError::Validation { field: "email", message: "Email is required".to_string() });
        }
        if request.password.chars().count() < self.min_password_length {
            return Err(AccountError::Validation {
                field: "password",
                message: format!("Password must be at least {} characters", self.min_password_length),
            });
        }

        if self.accounts.username_exists(&username).await? {
            return Err(AccountError::UsernameTaken);
        }
        if self.accounts.email_exists(&email).await? {
            return Err(AccountError::EmailTaken);
        }

        // Not atomic with the insert; concurrent first registrations may both get admin
        let roles = if self.accounts.count_accounts().await? == 0 {
            format!("{},{}", ROLE_USER, ROLE_ADMIN)
        } else {
            ROLE_USER.to_string()
        };

        let password_hash = hash_blocking(request.password).await?;
        let account = self
            .accounts
            .insert_account(NewAccount { username, email, password_hash, roles })
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict(constraint) if constraint.contains("email") => AccountError::EmailTaken,
                DatabaseError::Conflict(_) => AccountError::UsernameTaken,
                other => AccountError::Database(other),
            })?;

        info!("Registered account {} with roles {}", account.username, account.roles);
        Ok(account.profile())
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AccountError> {
        let username = request.username.trim();
        let Some(account) = self.accounts.find_account(username).await? else {
            self.verify_dummy(request.password).await?;
            warn!("Login failed: unknown account {}", username);
            return Err(AccountError::InvalidCredentials);
        };

        if !verify_blocking(request.password, account.password_hash.clone()).await? {
            warn!("Login failed: bad password for {}", username);
            return Err(AccountError::InvalidCredentials);
        }
        if !account.enabled {
            warn!("Login refused: account {} is disabled", username);
            return Err(AccountError::Disabled);
        }

        let issued = self.tokens.issue(&account.username, request.remember_me)?;
        info!("Issued token for {} (expires {})", account.username, issued.expires_at);

        let profile = account.profile();
        Ok(LoginResponse {
            token: issued.token,
            username: profile.username,
            email: profile.email,
            roles: profile.roles,
            expires_in: issued.expires_in,
        })
    }

    async fn verify_dummy(&self, password: String) -> Result<(), AuthError> {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| hash_blocking(Uuid::new_v4().to_string()))
            .await?;
        verify_blocking(password, hash.clone()).await?;
        Ok(())
    }

    /// Profile for an authenticated subject.
    pub async fn current_user(&self, username: &str) -> Result<AccountProfile, AccountError> {
        self.accounts
            .find_account(username)
            .await?
            .map(|account| account.profile())
            .ok_or(AccountError::UnknownSubject)
    }
}

async fn hash_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::MemoryStore;

    fn service() -> AuthService {
        let mut config = AppConfig::development();
        config.security.jwt_secret = "auth-service-test".to_string();
        let tokens = TokenService::new(&config.security).unwrap();
        AuthService::new(Arc::new(MemoryStore::new()), tokens, config.security.min_password_length)
    }

    fn register(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
        }
    }

    #[tokio::test]
    async fn first_account_is_admin() {
        let auth = service();
        let first = auth.register(register("ada", "ada@example.com")).await.unwrap();
        let second = auth.register(register("grace", "grace@example.com")).await.unwrap();
        assert_eq!(first.roles, vec!["ROLE_USER", "ROLE_ADMIN"]);
        assert_eq!(second.roles, vec!["ROLE_USER"]);
    }

    #[tokio::test]
    async fn register_validates_and_detects_duplicates() {
        let auth = service();
        let short = RegisterRequest { password: "12345".into(), ..register("ada", "ada@example.com") };
        assert!(matches!(
            auth.register(short).await,
            Err(AccountError::Validation { field: "password", .. })
        ));
        assert!(matches!(
            auth.register(register("   ", "ada@example.com")).await,
            Err(AccountError::Validation { field: "username", .. })
        ));

        auth.register(register("ada", "ada@example.com")).await.unwrap();
        assert!(matches!(
            auth.register(register("ada", "ADA@example.com")).await,
            Err(AccountError::UsernameTaken)
        ));
        assert!(matches!(
            auth.register(register("Ada", "ada@example.com")).await,
            Err(AccountError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn unknown_username_still_runs_password_verification() {
        let auth = service();
        assert!(!auth.dummy_hash.initialized());

        let unknown = LoginRequest { username: "nobody".into(), password: "secret1".into(), remember_me: false };
        assert!(matches!(auth.login(unknown).await, Err(AccountError::InvalidCredentials)));

        let hash = auth.dummy_hash.get().cloned().unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!verify_password("secret1", &hash).unwrap());
    }

    #[tokio::test]
    async fn login_issues_token_for_valid_credentials_only() {
        let auth = service();
        auth.register(register("ada", "ada@example.com")).await.unwrap();

        let bad = LoginRequest { username: "ada".into(), password: "wrong".into(), remember_me: false };
        assert!(matches!(auth.login(bad).await, Err(AccountError::InvalidCredentials)));

        let unknown = LoginRequest { username: "bob".into(), password: "secret1".into(), remember_me: false };
        assert!(matches!(auth.login(unknown).await, Err(AccountError::InvalidCredentials)));

        let ok = LoginRequest { username: "ada".into(), password: "secret1".into(), remember_me: true };
        let response = auth.login(ok).await.unwrap();
        assert_eq!(response.expires_in, 604_800);
        assert_eq!(auth.tokens().validate(&response.token).unwrap().sub, "ada");
        assert_eq!(auth.current_user("ada").await.unwrap().email, "ada@example.com");
        assert!(matches!(auth.current_user("ghost").await, Err(AccountError::UnknownSubject)));
    }
}
