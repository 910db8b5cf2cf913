use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use rand::rngs::OsRng;

use configs::PasswordSchemeKind;

use super::errors::AdminAuthError;

/// 32-bit rolling hash (`h = h * 31 + unit` over UTF-16 code units, wrapping)
/// rendered as a signed decimal string.
///
/// # Examples
/// ```
/// use service::admin_auth::legacy_hash;
/// assert_eq!(legacy_hash("a"), "97");
/// assert_eq!(legacy_hash("ab"), "3105");
/// ```
pub fn legacy_hash(password: &str) -> String {
    let h = password
        .encode_utf16()
        .fold(0i32, |h, unit| (h << 5).wrapping_sub(h).wrapping_add(i32::from(unit)));
    h.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordScheme {
    Legacy,
    Argon2,
}

impl From<PasswordSchemeKind> for PasswordScheme {
    fn from(kind: PasswordSchemeKind) -> Self {
        match kind {
            PasswordSchemeKind::Legacy => PasswordScheme::Legacy,
            PasswordSchemeKind::Argon2 => PasswordScheme::Argon2,
        }
    }
}

impl PasswordScheme {
    pub fn hash(&self, password: &str) -> Result<String, AdminAuthError> {
        match self {
            PasswordScheme::Legacy => Ok(legacy_hash(password)),
            PasswordScheme::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map(|h| h.to_string())
                    .map_err(|e| AdminAuthError::Hash(e.to_string()))
            }
        }
    }

    pub fn verify(&self, password: &str, stored: &str) -> Result<bool, AdminAuthError> {
        match self {
            PasswordScheme::Legacy => Ok(legacy_hash(password) == stored),
            PasswordScheme::Argon2 => {
                let parsed =
                    PasswordHash::new(stored).map_err(|e| AdminAuthError::Hash(e.to_string()))?;
                Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
            }
        }
    }
}
