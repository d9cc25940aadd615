//! Bootstrap helpers that act on a resolved store

use std::path::PathBuf;

use strata_core::{keys, ConfigResult, PropertyStore, Value};
use tracing::info;

/// Change the process working directory to `workdir`, when set.
///
/// Returns the directory that was entered.
pub fn apply_workdir(store: &dyn PropertyStore) -> ConfigResult<Option<PathBuf>> {
    let dir = match store.get(keys::WORKDIR) {
        Some(Value::String(dir)) if !dir.is_empty() => PathBuf::from(dir),
        _ => return Ok(None),
    };
    info!("changes working directory to: {}", dir.display());
    std::env::set_current_dir(&dir)?;
    Ok(Some(dir))
}
