//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::GeeConfig;
use super::secret::secret_string;
use crate::domain::errors::GeeError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "GEEXPORT";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into GeeConfig
/// 4. Applies environment variable overrides (GEEXPORT_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`GeeError::Configuration`] if the file cannot be read, a
/// referenced variable is unset, parsing fails or validation fails.
///
/// # Examples
///
/// ```no_run
/// use geexport::config::loader::load_config;
///
/// let config = load_config("geexport.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<GeeConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(GeeError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        GeeError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let config = parse_config(&contents)?;
    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(contents: &str) -> Result<GeeConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: GeeConfig = toml::from_str(&contents)
        .map_err(|e| GeeError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config
        .validate()
        .map_err(|e| GeeError::Configuration(format!("Configuration validation failed: {e}")))?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| GeeError::Configuration(format!("Invalid substitution pattern: {e}")))?;
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
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
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
        return Err(GeeError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_override(section: &str, key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{section}_{key}")).ok()
}

fn env_override_parsed<T: std::str::FromStr>(section: &str, key: &str) -> Option<T> {
    let raw = env_override(section, key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(
                variable = %format!("{ENV_PREFIX}_{section}_{key}"),
                value = %raw,
                "Ignoring unparseable environment override"
            );
            None
        }
    }
}

/// Applies environment variable overrides using the GEEXPORT_* prefix
///
/// Variables follow the pattern `GEEXPORT_<SECTION>_<KEY>`, for example
/// `GEEXPORT_EARTHENGINE_PROJECT` or `GEEXPORT_EXPORT_MAX_CONCURRENT_TASKS`.
fn apply_env_overrides(config: &mut GeeConfig) {
    // Application
    if let Some(val) = env_override("APPLICATION", "LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_override_parsed("APPLICATION", "DRY_RUN") {
        config.application.dry_run = val;
    }

    // Earth Engine
    if let Some(val) = env_override("EARTHENGINE", "BASE_URL") {
        config.earthengine.base_url = val;
    }
    if let Some(val) = env_override("EARTHENGINE", "PROJECT") {
        config.earthengine.project = val;
    }
    if let Some(val) = env_override("EARTHENGINE", "ACCESS_TOKEN") {
        config.earthengine.access_token = secret_string(val);
    }
    if let Some(val) = env_override("EARTHENGINE", "FEATURE_ASSET_ID") {
        config.earthengine.feature_asset_id = val;
    }
    if let Some(val) = env_override("EARTHENGINE", "INDEX_PROPERTY") {
        config.earthengine.index_property = val;
    }
    if let Some(val) = env_override_parsed("EARTHENGINE", "TIMEOUT_SECONDS") {
        config.earthengine.timeout_seconds = val;
    }

    // Sources
    if let Some(val) = env_override("SOURCES", "NICFI_COLLECTION_ID") {
        config.sources.nicfi.collection_id = val;
    }
    if let Some(val) = env_override_parsed("SOURCES", "NICFI_SCALE_METERS") {
        config.sources.nicfi.scale_meters = val;
    }
    if let Some(val) = env_override("SOURCES", "SENTINEL_COLLECTION_ID") {
        config.sources.sentinel.collection_id = val;
    }
    if let Some(val) = env_override_parsed("SOURCES", "SENTINEL_SCALE_METERS") {
        config.sources.sentinel.scale_meters = val;
    }

    // Export
    if let Some(val) = env_override_parsed("EXPORT", "MAX_CONCURRENT_TASKS") {
        config.export.max_concurrent_tasks = val;
    }
    if let Some(val) = env_override_parsed("EXPORT", "TASK_CHECK_INTERVAL_SECS") {
        config.export.task_check_interval_secs = val;
    }
    if let Some(val) = env_override_parsed("EXPORT", "MAX_PIXELS") {
        config.export.max_pixels = val;
    }
    if let Some(val) = env_override("EXPORT", "CRS") {
        config.export.crs = val;
    }
    if let Some(val) = env_override("EXPORT", "FOLDER") {
        config.export.folder = val;
    }

    // Logging
    if let Some(val) = env_override_parsed("LOGGING", "LOCAL_ENABLED") {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env_override("LOGGING", "LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = env_override("LOGGING", "LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }
}
