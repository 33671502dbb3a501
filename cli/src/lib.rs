//! Shared plumbing for the `dt_tour` and `dt_bench` binaries

pub mod args;
pub mod tracing_setup;

use std::path::{Path, PathBuf};

use dt_shared::config::Environment;

/// Load `.env.<environment>` from the working directory, then a plain `.env`
///
/// Variables already set in the process environment always win. Returns
/// the environment-specific file when it was found, so the caller can log
/// it once tracing is up.
pub fn load_env_files() -> Option<PathBuf> {
    let loaded = load_env_files_in(Path::new("."), Environment::from_env());
    dotenvy::dotenv().ok();
    loaded
}

/// Load the env file for `environment` from `dir`
pub fn load_env_files_in(dir: &Path, environment: Environment) -> Option<PathBuf> {
    let path = dir.join(environment.env_file());
    dotenvy::from_path(&path).ok().map(|_| path)
}
