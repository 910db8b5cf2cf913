//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::debug;

/// Ensure the parent directory of a data file exists.
///
/// File-backed buckets and the local mirror both write a single JSON file;
/// the directory is created up front so the first write does not fail.
pub async fn ensure_parent_dir(file: &str) -> anyhow::Result<()> {
    let parent = match Path::new(file).parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Ok(()),
    };
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    debug!(dir = %parent.display(), "data directory ready");
    Ok(())
}
