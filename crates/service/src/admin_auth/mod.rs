//! Admin auth gate: credential check plus a client-side session, separate
//! from customer authentication.
//!
//! The legacy password scheme is a 32-bit rolling hash and offers no real
//! protection; deployments should configure the argon2 scheme.

pub mod domain;
pub mod errors;
pub mod gate;
pub mod password;

pub use domain::{AdminSession, GateState, ADMIN_SESSION_KEY};
pub use errors::AdminAuthError;
pub use gate::AdminGate;
pub use password::{legacy_hash, PasswordScheme};
