//! API key resolution from multiple sources.
//!
//! The Gemini key can come from several places depending on how profex is
//! deployed. Resolution happens once at startup, in priority order:
//!
//! 1. **Direct value** - For quick local testing
//! 2. **File reference** - For Docker secrets pattern (e.g. `/run/secrets/gemini`)
//! 3. **Env var reference** - The usual case (`GEMINI_API_KEY`)

use secrecy::SecretString;
use std::fs;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// Error type for secret resolution failures.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No secret source provided (need one of: direct value, file path, or env var name)")]
    NoSourceProvided,

    #[error("Failed to read secret from file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },
}

/// Result type for secret resolution.
pub type Result<T> = std::result::Result<T, SecretError>;

/// Resolves a secret from multiple sources in priority order:
/// 1. Direct value (if provided and non-empty)
/// 2. File contents (if path provided)
/// 3. Environment variable (if name provided)
///
/// File contents and env values are trimmed; key files usually end with a
/// newline and that must not end up inside an HTTP header.
///
/// # Examples
///
/// ```ignore
/// use profex::secrets::{resolve_secret, API_KEY_ENV_VAR};
///
/// // Env var is the usual source
/// let key = resolve_secret(None, None, Some(API_KEY_ENV_VAR))?;
///
/// // A key file wins over the env var when both are given
/// let key = resolve_secret(None, Some("~/.config/profex/key"), Some(API_KEY_ENV_VAR))?;
/// ```
pub fn resolve_secret(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<SecretString> {
    // Priority 1: Direct value
    if let Some(value) = direct {
        if !value.is_empty() {
            return Ok(SecretString::from(value.to_string()));
        }
    }

    // Priority 2: File
    if let Some(path) = file_path {
        if !path.is_empty() {
            let expanded = expand_home(path);
            match fs::read_to_string(&expanded) {
                Ok(content) => return Ok(SecretString::from(content.trim().to_string())),
                Err(e) => {
                    return Err(SecretError::FileReadError {
                        path: expanded,
                        source: e,
                    })
                }
            }
        }
    }

    // Priority 3: Environment variable
    if let Some(var_name) = env_var {
        if !var_name.is_empty() {
            match std::env::var(var_name) {
                Ok(value) => {
                    let trimmed = value.trim();
                    return Ok(SecretString::from(trimmed));
                }
                Err(std::env::VarError::NotPresent) => {
                    return Err(SecretError::EnvVarNotSet {
                        name: var_name.to_string(),
                    })
                }
                Err(std::env::VarError::NotUnicode(_)) => {
                    return Err(SecretError::EnvVarNotUnicode {
                        name: var_name.to_string(),
                    })
                }
            }
        }
    }

    Err(SecretError::NoSourceProvided)
}

/// Expands `~` to the user's home directory.
///
/// Works cross-platform: checks HOME (Unix) then USERPROFILE (Windows).
/// Handles both `~/path` and standalone `~`. The `~user/path` form is not
/// supported; use absolute paths for other users' directories.
fn expand_home(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
            if path == "~" {
                return home.to_string_lossy().into_owned();
            }
            return path.replacen("~", &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // Tests that modify environment variables must run serially to avoid race conditions
    #[test]
    #[serial]
    fn test_direct_value_takes_priority() {
        std::env::set_var("PROFEX_TEST_KEY_1", "env_value");
        let result = resolve_secret(Some("direct_value"), None, Some("PROFEX_TEST_KEY_1")).unwrap();
        assert_eq!(result.expose_secret(), "direct_value");
        std::env::remove_var("PROFEX_TEST_KEY_1");
    }

    #[test]
    #[serial]
    fn test_file_takes_priority_over_env() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "file_value").unwrap();

        std::env::set_var("PROFEX_TEST_KEY_2", "env_value");
        let result = resolve_secret(
            None,
            Some(temp_file.path().to_str().unwrap()),
            Some("PROFEX_TEST_KEY_2"),
        )
        .unwrap();
        assert_eq!(result.expose_secret(), "file_value");
        std::env::remove_var("PROFEX_TEST_KEY_2");
    }

    #[test]
    #[serial]
    fn test_env_var_fallback() {
        std::env::set_var("PROFEX_TEST_KEY_3", "env_value");
        let result = resolve_secret(None, None, Some("PROFEX_TEST_KEY_3")).unwrap();
        assert_eq!(result.expose_secret(), "env_value");
        std::env::remove_var("PROFEX_TEST_KEY_3");
    }

    #[test]
    fn test_no_source_error() {
        let result = resolve_secret(None, None, None);
        assert!(matches!(result, Err(SecretError::NoSourceProvided)));
    }

    #[test]
    #[serial]
    fn test_empty_strings_ignored() {
        std::env::set_var("PROFEX_TEST_KEY_4", "env_value");
        let result = resolve_secret(Some(""), Some(""), Some("PROFEX_TEST_KEY_4")).unwrap();
        assert_eq!(result.expose_secret(), "env_value");
        std::env::remove_var("PROFEX_TEST_KEY_4");
    }

    #[test]
    fn test_file_not_found_error() {
        let result = resolve_secret(None, Some("/nonexistent/path/to/key"), None);
        assert!(matches!(result, Err(SecretError::FileReadError { .. })));
    }

    #[test]
    fn test_env_var_not_set_error() {
        let result = resolve_secret(None, None, Some("DEFINITELY_NOT_SET_VAR_12345"));
        assert!(matches!(result, Err(SecretError::EnvVarNotSet { .. })));
    }

    #[test]
    fn test_file_content_trimmed() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "  AIzaSy-test-key  ").unwrap();

        let result = resolve_secret(None, Some(temp_file.path().to_str().unwrap()), None).unwrap();
        assert_eq!(result.expose_secret(), "AIzaSy-test-key");
    }

    #[test]
    #[serial]
    fn test_expand_home() {
        assert_eq!(expand_home("/absolute/path"), "/absolute/path");
        assert_eq!(expand_home("relative/path"), "relative/path");

        // Home expansion (only if HOME is set)
        if let Ok(home) = std::env::var("HOME") {
            assert_eq!(expand_home("~/key"), format!("{}/key", home));
            assert_eq!(expand_home("~"), home);
        }
    }
}
