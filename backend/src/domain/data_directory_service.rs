use log::{error, info, warn};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides every other source of the data directory when set and non-empty
pub const DATA_DIR_ENV: &str = "CHILDCARE_TRACKER_DATA_DIR";

/// Directory created under the platform application-data root
pub const APP_DIRECTORY_NAME: &str = "childcare-tracker";

/// File inside the default data directory that points somewhere else
pub const REDIRECT_FILE_NAME: &str = ".childcare_redirect";

const FALLBACK_DIRECTORY: &str = "childcare-tracker-data";

/// Resolve the data root for this process
///
/// Order: `CHILDCARE_TRACKER_DATA_DIR`, then the platform data directory
/// (`~/.local/share`, `~/Library/Application Support`, `%APPDATA%`) joined with
/// `childcare-tracker`, following a redirect file if one is present there.
pub fn resolve_data_directory() -> PathBuf {
    resolve_from(std::env::var_os(DATA_DIR_ENV), dirs::data_dir())
}

pub(crate) fn resolve_from(env_value: Option<OsString>, platform_data_dir: Option<PathBuf>) -> PathBuf {
    if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        let path = PathBuf::from(value);
        info!("Using data directory from {}: {}", DATA_DIR_ENV, path.display());
        return path;
    }

    let default_dir = match platform_data_dir {
        Some(dir) => dir.join(APP_DIRECTORY_NAME),
        None => {
            warn!(
                "Could not determine the platform data directory, using ./{}",
                FALLBACK_DIRECTORY
            );
            PathBuf::from(FALLBACK_DIRECTORY)
        }
    };

    follow_redirect(&default_dir)
}

/// Follow `<default_dir>/.childcare_redirect` if it names an existing directory
pub fn follow_redirect(default_dir: &Path) -> PathBuf {
    let redirect_file = default_dir.join(REDIRECT_FILE_NAME);
    if !redirect_file.exists() {
        info!("No redirect file found, using data directory: {}", default_dir.display());
        return default_dir.to_path_buf();
    }

    match fs::read_to_string(&redirect_file) {
        Ok(contents) => {
            let target = PathBuf::from(contents.trim());
            if target.is_dir() {
                info!("Data directory redirected to: {}", target.display());
                target
            } else {
                warn!(
                    "Redirect file points to non-existent directory: {}. Using default.",
                    target.display()
                );
                default_dir.to_path_buf()
            }
        }
        Err(e) => {
            error!("Failed to read redirect file: {}. Using default directory.", e);
            default_dir.to_path_buf()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_env_value_wins() {
        let resolved = resolve_from(Some(OsString::from("/tmp/elsewhere")), Some(PathBuf::from("/data")));
        assert_eq!(resolved, PathBuf::from("/tmp/elsewhere"));
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let resolved = resolve_from(Some(OsString::new()), Some(temp_dir.path().to_path_buf()));
        assert_eq!(resolved, temp_dir.path().join(APP_DIRECTORY_NAME));
    }

    #[test]
    fn test_missing_platform_dir_falls_back_to_relative_path() {
        assert_eq!(resolve_from(None, None), PathBuf::from(FALLBACK_DIRECTORY));
    }

    #[test]
    fn test_redirect_to_existing_directory() {
        let default_dir = TempDir::new().unwrap();
        let target_dir = TempDir::new().unwrap();
        fs::write(
            default_dir.path().join(REDIRECT_FILE_NAME),
            format!("{}\n", target_dir.path().display()),
        )
        .unwrap();

        assert_eq!(follow_redirect(default_dir.path()), target_dir.path());
    }

    #[test]
    fn test_redirect_to_missing_directory_is_ignored() {
        let default_dir = TempDir::new().unwrap();
        let missing = default_dir.path().join("gone");
        fs::write(
            default_dir.path().join(REDIRECT_FILE_NAME),
            missing.display().to_string(),
        )
        .unwrap();

        assert_eq!(follow_redirect(default_dir.path()), default_dir.path());
    }
}
