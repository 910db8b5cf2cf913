//! Storefront data layer.
//! - `kv`: bucket backends behind the data endpoint.
//! - `facade`: client-side `fetch`/`save` with a local mirror fallback.
//! - `catalog`: typed entity stores built on the facade.
//! - `admin_auth`: the admin session gate.

pub mod admin_auth;
pub mod catalog;
pub mod errors;
pub mod facade;
pub mod kv;
pub mod storage;
