//! Authentication: user registration, login, and JWT validation.

pub mod identity;
pub mod jwt;
pub mod middleware;
pub mod password;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use thiserror::Error;

use parley_core::Username;

use self::identity::CallerIdentity;
use self::jwt::JwtManager;

/// A registered user account.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Unique username, chosen at registration.
    pub username: Username,
    /// Unique email address.
    pub email: String,
    /// Argon2 password hash.
    pub password_hash: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Why a registration attempt was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    InvalidInput(String),

    /// The username is already taken.
    #[error("username is already taken")]
    UsernameTaken,

    /// The email address is already registered.
    #[error("email is already registered")]
    EmailTaken,

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// In-memory directory of registered users, indexed by username with a
/// secondary email index for duplicate detection.
#[derive(Default)]
pub struct UserDirectory {
    users: DashMap<String, UserRecord>,
    emails: DashMap<String, String>,
}

impl UserDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new user. Fails when the username or email is taken.
    pub fn insert(&self, record: UserRecord) -> Result<(), RegisterError> {
        // Reserve the email first, then the username. On a username
        // collision the email reservation is rolled back so a retry with
        // a different username can succeed.
        match self.emails.entry(record.email.clone()) {
            Entry::Occupied(_) => return Err(RegisterError::EmailTaken),
            Entry::Vacant(slot) => {
                slot.insert(record.username.to_string());
            }
        }
        match self.users.entry(record.username.to_string()) {
            Entry::Occupied(_) => {
                self.emails.remove(&record.email);
                Err(RegisterError::UsernameTaken)
            }
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    /// Look up a user by username.
    #[must_use]
    pub fn get(&self, username: &str) -> Option<UserRecord> {
        self.users.get(username).map(|r| r.clone())
    }

    /// Look up a user by email address.
    #[must_use]
    pub fn get_by_email(&self, email: &str) -> Option<UserRecord> {
        let username = self.emails.get(email).map(|u| u.clone())?;
        self.get(&username)
    }

    /// Return `true` if the username is registered.
    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// Number of registered users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Return `true` if no users are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// A freshly issued login token and the account it belongs to.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The username the token authenticates as.
    pub username: Username,
    /// Signed JWT for the Authorization header.
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

/// Authentication provider: registration, credential checks, and JWT
/// issuance/validation.
pub struct AuthProvider {
    directory: UserDirectory,
    jwt: JwtManager,
}

impl AuthProvider {
    #[must_use]
    pub fn new(jwt_secret: &str, jwt_expiry_seconds: u64) -> Self {
        Self {
            directory: UserDirectory::new(),
            jwt: JwtManager::new(jwt_secret, jwt_expiry_seconds),
        }
    }

    /// Register a new account.
    pub fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), RegisterError> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(RegisterError::InvalidInput(
                "username, email, and password are required".to_owned(),
            ));
        }
        if !email.contains('@') {
            return Err(RegisterError::InvalidInput(
                "invalid email address".to_owned(),
            ));
        }

        let record = UserRecord {
            username: Username::new(username),
            email: email.to_owned(),
            password_hash: password::hash_password(password).map_err(RegisterError::Hashing)?,
            created_at: Utc::now(),
        };
        self.directory.insert(record)
    }

    /// Check credentials and issue a JWT.
    ///
    /// Accounts are looked up by email. Unknown emails and wrong
    /// passwords produce the same error so login responses do not leak
    /// which accounts exist.
    pub fn login(&self, email: &str, password: &str) -> Result<IssuedToken, String> {
        let invalid = || "invalid email or password".to_owned();
        let record = self.directory.get_by_email(email.trim()).ok_or_else(invalid)?;
        if !password::verify_password(&record.password_hash, password) {
            return Err(invalid());
        }
        let (token, expires_in) = self.jwt.issue_token(&record.username)?;
        Ok(IssuedToken {
            username: record.username,
            token,
            expires_in,
        })
    }

    /// Validate a Bearer token, returning the identity it names.
    pub fn validate_jwt(&self, token: &str) -> Result<CallerIdentity, String> {
        self.jwt.validate_token(token)
    }

    /// Return `true` if the username belongs to a registered user.
    #[must_use]
    pub fn user_exists(&self, username: &str) -> bool {
        self.directory.contains(username)
    }
}
