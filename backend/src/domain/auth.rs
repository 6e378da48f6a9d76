//! Authentication primitives: login credentials and the admin shared secret.
//!
//! Inbound adapters build these from raw strings before calling the login
//! port, so the services only ever see validated values.

use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty and kept verbatim, whitespace included.
///
/// # Examples
/// ```
/// use teamboard::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada ", "pw").unwrap();
/// assert_eq!(creds.username(), "ada");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Shared secret that unlocks the admin identity.
///
/// Held in zeroizing memory and only ever compared in constant time.
#[derive(Clone)]
pub struct AdminSecret(Zeroizing<String>);

impl AdminSecret {
    /// Wrap a configured secret; blank values are rejected.
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = Zeroizing::new(secret.into());
        if secret.trim().is_empty() {
            None
        } else {
            Some(Self(secret))
        }
    }

    /// Constant-time comparison against a submitted password.
    pub fn matches(&self, attempt: &str) -> bool {
        bool::from(self.0.as_bytes().ct_eq(attempt.as_bytes()))
    }

    /// Plaintext secret, needed once to hash it into the admin account.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminSecret(<redacted>)")
    }
}
