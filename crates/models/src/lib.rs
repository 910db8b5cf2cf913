//! Domain records of the storefront and the pure rules around them.
//!
//! Nothing here performs I/O: records are plain `serde` structs, and rules
//! such as coupon validation or sibling ordering are functions over slices.

pub mod errors;
pub mod entity;
pub mod ordering;
pub mod product;
pub mod category;
pub mod coupon;
pub mod message;
pub mod review;
pub mod settings;
pub mod banner;

pub use entity::{new_id, Entity, Ordered};
