use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
mod storage;

pub use app::*;
pub use storage::write_text_atomic;

pub const ROOT_ENV_VAR: &str = "PIXEL_VILLAGE_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
    pub cache_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("failed to create cache directory at {path}: {source}")]
    CreateCacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "{env_var} is set but does not point to a game root: {path}\n\
A game root contains Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf, env_var: &'static str },
    #[error(
        "Could not find the game root above {start_dir}\n\
Looked for a directory containing Cargo.toml and either crates/ or assets/.\n\
Point {env_var} at the checkout, for example:\n\
export {env_var}=\"/path/to/pixel-village\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

/// Locates the game root (from `PIXEL_VILLAGE_ROOT` or by walking up from the
/// executable) and makes sure its cache directory exists.
pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    let paths = app_paths_for(root);

    fs::create_dir_all(&paths.cache_dir).map_err(|source| StartupError::CreateCacheDir {
        path: paths.cache_dir.clone(),
        source,
    })?;

    Ok(paths)
}

fn app_paths_for(root: PathBuf) -> AppPaths {
    AppPaths {
        assets_dir: root.join("assets"),
        cache_dir: root.join("cache"),
        root,
    }
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(&PathBuf::from(value));
            if is_root_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot {
                    path: normalized,
                    env_var: ROOT_ENV_VAR,
                })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;
            find_root_above(&exe_dir).ok_or_else(|| StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn find_root_above(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|candidate| is_root_marker(candidate))
        .map(normalize_path)
}

fn is_root_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn root_marker_requires_cargo_toml_and_a_content_dir() {
        let dir = TempDir::new().expect("tempdir");
        assert!(!is_root_marker(dir.path()));

        fs::create_dir(dir.path().join("assets")).expect("assets dir");
        assert!(!is_root_marker(dir.path()));

        fs::write(dir.path().join("Cargo.toml"), "[workspace]\n").expect("cargo toml");
        assert!(is_root_marker(dir.path()));
    }

    #[test]
    fn root_is_found_from_nested_directory() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("Cargo.toml"), "[workspace]\n").expect("cargo toml");
        fs::create_dir(dir.path().join("crates")).expect("crates dir");
        let nested = dir.path().join("target").join("debug");
        fs::create_dir_all(&nested).expect("nested dir");

        let found = find_root_above(&nested).expect("root");
        assert_eq!(found, normalize_path(dir.path()));
        let paths = app_paths_for(found.clone());
        assert_eq!(paths.assets_dir, found.join("assets"));
        assert_eq!(paths.cache_dir, found.join("cache"));
    }
}
