//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::GwArchiveConfig;
use super::secret::secret_string;
use crate::domain::errors::ArchiveError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`GwArchiveConfig`]
/// 4. Applies environment variable overrides (`GWARCHIVE_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`ArchiveError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, the TOML is malformed or
/// validation fails.
///
/// # Examples
///
/// ```no_run
/// use gwarchive::config::loader::load_config;
///
/// let config = load_config("gwarchive.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<GwArchiveConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ArchiveError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ArchiveError::Configuration(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: GwArchiveConfig = toml::from_str(&contents)
        .map_err(|e| ArchiveError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        ArchiveError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched. Every unset variable is reported in a
/// single error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ArchiveError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &escape_toml(&value));
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ArchiveError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Service account keys are multi-line JSON; escape them for a basic TOML string
fn escape_toml(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "")
}

/// Applies environment variable overrides using the `GWARCHIVE_*` prefix
///
/// Variables follow `GWARCHIVE_<SECTION>_<KEY>`, for example
/// `GWARCHIVE_DESTINATION_FOLDER_ID`. Unparseable numeric or boolean values
/// are ignored and the file value is kept.
fn apply_env_overrides(config: &mut GwArchiveConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("GWARCHIVE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = parsed("GWARCHIVE_APPLICATION_DRY_RUN") {
        config.application.dry_run = val;
    }

    // Workspace overrides
    if let Ok(val) = std::env::var("GWARCHIVE_WORKSPACE_ADMIN_EMAIL") {
        config.workspace.admin_email = val;
    }
    if let Ok(val) = std::env::var("GWARCHIVE_WORKSPACE_CUSTOMER_ID") {
        config.workspace.customer_id = val;
    }
    if let Ok(val) = std::env::var("GWARCHIVE_WORKSPACE_ACCESS_TOKEN") {
        config.workspace.access_token = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("GWARCHIVE_WORKSPACE_SERVICE_ACCOUNT_FILE") {
        config.workspace.service_account_file = Some(val);
    }
    if let Some(val) = parsed("GWARCHIVE_WORKSPACE_TIMEOUT_SECONDS") {
        config.workspace.timeout_seconds = val;
    }

    // Destination overrides
    if let Ok(val) = std::env::var("GWARCHIVE_DESTINATION_FOLDER_ID") {
        config.destination.folder_id = val;
    }
    if let Some(val) = parsed("GWARCHIVE_DESTINATION_CONVERT_TO_SHEETS") {
        config.destination.convert_to_sheets = val;
    }

    // Export overrides
    if let Ok(val) = std::env::var("GWARCHIVE_EXPORT_OUTPUT_DIR") {
        config.export.output_dir = val;
    }
    if let Some(val) = parsed("GWARCHIVE_EXPORT_PAGE_SIZE") {
        config.export.page_size = val;
    }
    if let Some(val) = parsed("GWARCHIVE_EXPORT_DETAIL_CONCURRENCY") {
        config.export.detail_concurrency = val;
    }

    // Upload overrides
    if let Some(val) = parsed("GWARCHIVE_UPLOAD_MAX_ATTEMPTS") {
        config.upload.max_attempts = val;
    }
    if let Some(val) = parsed("GWARCHIVE_UPLOAD_DELAY_MS") {
        config.upload.delay_ms = val;
    }

    // Logging overrides
    if let Some(val) = parsed("GWARCHIVE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val;
    }
    if let Ok(val) = std::env::var("GWARCHIVE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

fn parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("GWA_LOADER_TEST_VAR", "test_value");
        let input = "token = \"${GWA_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "token = \"test_value\"\n");
        std::env::remove_var("GWA_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_escapes_json() {
        std::env::set_var("GWA_LOADER_TEST_JSON", "{\"type\": \"service_account\"}\n");
        let input = "service_account_json = \"${GWA_LOADER_TEST_JSON}\"";
        let result = substitute_env_vars(input).unwrap();

        #[derive(serde::Deserialize)]
        struct Holder {
            service_account_json: String,
        }
        let holder: Holder = toml::from_str(&result).unwrap();
        assert_eq!(holder.service_account_json, "{\"type\": \"service_account\"}\n");
        std::env::remove_var("GWA_LOADER_TEST_JSON");
    }

    #[test]
    fn test_substitute_env_vars_missing_reported_together() {
        std::env::remove_var("GWA_MISSING_ONE");
        std::env::remove_var("GWA_MISSING_TWO");
        let input = "a = \"${GWA_MISSING_ONE}\"\nb = \"${GWA_MISSING_TWO}\"";
        let err = substitute_env_vars(input).unwrap_err().to_string();
        assert!(err.contains("GWA_MISSING_ONE"));
        assert!(err.contains("GWA_MISSING_TWO"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("GWA_ONLY_IN_COMMENT");
        let input = "# token = \"${GWA_ONLY_IN_COMMENT}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-gwarchive.toml");
        assert!(matches!(result, Err(ArchiveError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[workspace]
admin_email = "admin@example.com"
access_token = "ya29.static"

[destination]
folder_id = "1AbCdEf"
convert_to_sheets = true

[export]
output_dir = "/tmp"
detail_concurrency = 4
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.workspace.admin_email, "admin@example.com");
        assert_eq!(config.workspace.customer_id, "my_customer");
        assert!(config.destination.convert_to_sheets);
        assert_eq!(config.export.detail_concurrency, 4);
        assert_eq!(config.retry.mail_settings.max_attempts, 5);
        assert_eq!(config.upload.max_attempts, 3);
    }
}
