//! Storage abstractions for service layer
//!
//! Reusable file-backed stores shared by the bucket backends and the local
//! mirror, both of which persist a small map as one JSON document.

pub mod json_map_store;
