use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminAuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("admin login is not configured")]
    NotConfigured,
    #[error("hashing error: {0}")]
    Hash(String),
}

impl AdminAuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AdminAuthError::InvalidCredentials => 1004,
            AdminAuthError::NotConfigured => 1005,
            AdminAuthError::Hash(_) => 1101,
        }
    }
}
