//! Salted password hashing.
//!
//! Stored form is `hex(derived_key) + "." + hex(salt)`: a 64-byte Argon2id key
//! over a 16-byte random salt. Verification re-derives the key and compares it
//! in constant time.
//!
//! Records written before the switch to Argon2id share the same textual
//! shape but hold a scrypt key (N=16384, r=8, p=1) derived over the salt's
//! hex text rather than its bytes. Verification accepts either.

use std::fmt;
use std::str::FromStr;

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Derived key length in bytes.
pub const KEY_LEN: usize = 64;
/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

const LEGACY_SCRYPT_LOG_N: u8 = 14;
const LEGACY_SCRYPT_R: u32 = 8;
const LEGACY_SCRYPT_P: u32 = 1;

/// Errors raised while hashing or parsing stored hashes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordHashError {
    /// Stored value is not `<hex>.<hex>`.
    #[error("stored password hash is malformed")]
    Malformed,
    /// Key derivation rejected its inputs.
    #[error("password key derivation failed: {message}")]
    Derivation { message: String },
}

/// Salted key derived from a password.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash {
    key: Vec<u8>,
    salt: Vec<u8>,
}

impl PasswordHash {
    /// Salt the key was derived with.
    pub fn salt(&self) -> &[u8] {
        &self.salt
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

impl fmt::Display for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", hex::encode(&self.key), hex::encode(&self.salt))
    }
}

impl FromStr for PasswordHash {
    type Err = PasswordHashError;

    fn from_str(stored: &str) -> Result<Self, Self::Err> {
        let (key, salt) = stored.split_once('.').ok_or(PasswordHashError::Malformed)?;
        let key = hex::decode(key).map_err(|_| PasswordHashError::Malformed)?;
        let salt = hex::decode(salt).map_err(|_| PasswordHashError::Malformed)?;
        if key.is_empty() || salt.is_empty() {
            return Err(PasswordHashError::Malformed);
        }
        Ok(Self { key, salt })
    }
}

/// Argon2id hasher with fixed cost parameters.
///
/// Hashes only verify under the parameters they were created with, so one
/// hasher instance (or equal parameters) must serve a whole store.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .field("p_cost", &self.params.p_cost())
            .finish()
    }
}

impl PasswordHasher {
    /// Hasher with explicit Argon2 costs (memory in KiB, iterations, lanes).
    pub fn with_costs(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, PasswordHashError> {
        let params = Params::new(m_cost, t_cost, p_cost, Some(KEY_LEN)).map_err(|err| {
            PasswordHashError::Derivation {
                message: err.to_string(),
            }
        })?;
        Ok(Self { params })
    }

    /// Hash `plaintext` under a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHashError> {
        let mut salt = vec![0_u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let key = self.derive(plaintext, &salt)?;
        Ok(PasswordHash {
            key: key.to_vec(),
            salt,
        })
    }

    /// Check `plaintext` against `stored`, trying the legacy scrypt
    /// derivation when the Argon2id key does not match.
    ///
    /// Mismatches and derivation failures both yield `false`.
    pub fn verify(&self, plaintext: &str, stored: &PasswordHash) -> bool {
        let argon_match = match self.derive(plaintext, &stored.salt) {
            Ok(candidate) => bool::from(candidate.as_slice().ct_eq(stored.key.as_slice())),
            Err(_) => false,
        };
        argon_match || verify_legacy_scrypt(plaintext, stored)
    }

    /// Check `plaintext` against the textual stored form; malformed input is `false`.
    ///
    /// # Examples
    /// ```
    /// use teamboard::domain::PasswordHasher;
    ///
    /// let hasher = PasswordHasher::with_costs(8, 1, 1).unwrap();
    /// let stored = hasher.hash("hunter2").unwrap().to_string();
    /// assert!(hasher.verify_encoded("hunter2", &stored));
    /// assert!(!hasher.verify_encoded("hunter3", &stored));
    /// assert!(!hasher.verify_encoded("hunter2", "not-a-hash"));
    /// ```
    pub fn verify_encoded(&self, plaintext: &str, stored: &str) -> bool {
        stored
            .parse::<PasswordHash>()
            .map(|hash| self.verify(plaintext, &hash))
            .unwrap_or(false)
    }

    fn derive(&self, plaintext: &str, salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>, PasswordHashError> {
        let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let mut key = Zeroizing::new([0_u8; KEY_LEN]);
        argon
            .hash_password_into(plaintext.as_bytes(), salt, key.as_mut_slice())
            .map_err(|err| PasswordHashError::Derivation {
                message: err.to_string(),
            })?;
        Ok(key)
    }
}

fn verify_legacy_scrypt(plaintext: &str, stored: &PasswordHash) -> bool {
    if stored.key.len() != KEY_LEN {
        return false;
    }
    let Ok(params) =
        scrypt::Params::new(LEGACY_SCRYPT_LOG_N, LEGACY_SCRYPT_R, LEGACY_SCRYPT_P, KEY_LEN)
    else {
        return false;
    };
    let salt_text = Zeroizing::new(hex::encode(&stored.salt));
    let mut candidate = Zeroizing::new([0_u8; KEY_LEN]);
    if scrypt::scrypt(
        plaintext.as_bytes(),
        salt_text.as_bytes(),
        &params,
        candidate.as_mut_slice(),
    )
    .is_err()
    {
        return false;
    }
    bool::from(candidate.as_slice().ct_eq(stored.key.as_slice()))
}
