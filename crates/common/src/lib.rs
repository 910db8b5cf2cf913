//! Shared building blocks for the storefront data plane: logging setup,
//! runtime helpers, wire types of the data endpoint and process metrics.

pub mod types;
pub mod utils;
pub mod env;
pub mod metrics;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }
}
