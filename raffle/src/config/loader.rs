//! Configuration loader
//!
//! The loading pipeline:
//! 1. Read the file (a leading UTF-8 BOM is dropped)
//! 2. Environment variable expansion on the raw text
//! 3. YAML parsing into [`RaffleConfig`]
//! 4. Validation
//! 5. Relative paths resolved against the file's directory
//!
//! `RAFFLE_SAVE_DIR` and `RAFFLE_ROSTER` are applied by the CLI layer on top
//! of the loaded file.

use std::path::Path;

use tracing::{debug, info};

use crate::config::schema::RaffleConfig;
use crate::error::ConfigError;

// ============================================================================
// Public API
// ============================================================================

/// Loads a configuration file, or the defaults when `path` is `None`.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed, references
/// an unset environment variable, or fails validation.
pub fn load_or_default(path: Option<&Path>) -> Result<RaffleConfig, ConfigError> {
    match path {
        Some(path) => load(path),
        None => {
            debug!("no configuration file given, using defaults");
            Ok(RaffleConfig::default())
        }
    }
}

/// Loads and validates a configuration file.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed, references
/// an unset environment variable, or fails validation.
pub fn load(path: &Path) -> Result<RaffleConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
        path: path.to_path_buf(),
    })?;
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(&raw);

    let expanded = substitute_env(raw, path)?;

    let config: RaffleConfig = if expanded.trim().is_empty() {
        RaffleConfig::default()
    } else {
        serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })?
    };

    config.validate()?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let config = config.relative_to(base);
    info!(path = %path.display(), "configuration loaded");
    Ok(config)
}

// ============================================================================
// Environment Variable Substitution
// ============================================================================

/// Expands environment variable references in raw YAML text.
///
/// Supports:
/// - `${VAR}`: the variable's value; an unset variable is an error
/// - `${VAR:-default}`: `default` if the variable is unset
/// - `$$`: a literal `$`
fn substitute_env(raw: &str, source: &Path) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find('$') {
        result.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            result.push('$');
            rest = tail;
        } else if let Some(body) = after.strip_prefix('{') {
            let end = body.find('}').ok_or_else(|| ConfigError::ParseError {
                path: source.to_path_buf(),
                line: line_of(raw, raw.len() - rest.len() + pos),
                message: "unclosed environment variable reference".to_string(),
            })?;
            result.push_str(&expand(&body[..end], source)?);
            rest = &body[end + 1..];
        } else {
            result.push('$');
            rest = after;
        }
    }

    result.push_str(rest);
    Ok(result)
}

fn expand(reference: &str, source: &Path) -> Result<String, ConfigError> {
    let (name, default) = match reference.split_once(":-") {
        Some((name, default)) => (name, Some(default)),
        None => (reference, None),
    };

    match (std::env::var(name), default) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.to_string()),
        (Err(_), None) => Err(ConfigError::EnvVarNotSet {
            var: name.to_string(),
            location: source.display().to_string(),
        }),
    }
}

fn line_of(text: &str, offset: usize) -> Option<usize> {
    text.get(..offset).map(|before| before.matches('\n').count() + 1)
}

// ============================================================================
// Tests
// ============================================================================
