//! On-disk location resolution for the cache.

use crate::core::error::LimpetError;
use std::env;
use std::path::PathBuf;

/// Resolve the current user's home directory from the environment.
pub fn home_dir() -> Result<PathBuf, LimpetError> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| {
            LimpetError::PathError(format!(
                "{} is not set; cannot resolve the cache location",
                var
            ))
        })
}

/// Compute the storage root for a store: `<home>/<application>/<database>`.
pub fn store_root(application: &str, database: &str) -> Result<PathBuf, LimpetError> {
    Ok(home_dir()?.join(application).join(database))
}
