//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};

use super::types::EngineConfig;

/// What a [`ConfigWarning`] is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    /// Key not recognized; the closest known key, if any
    UnknownKey { suggestion: Option<String> },
    /// `max_diagnostics = 0` fails the first resolve that reports anything
    ZeroDiagnosticLimit,
    /// Reserved name that can never equal a sub-trait name
    UnmatchableReservedName { name: String },
}

/// Non-fatal configuration warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Table the key sits in, `None` at top level
    pub section: Option<String>,
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub issue: ConfigIssue,
}

impl ConfigWarning {
    /// Warning for the dotted `key_path` (e.g. `resolution.max_diagnostics`),
    /// located in `content`.
    fn at(file: &Path, content: &str, key_path: &str, issue: ConfigIssue) -> Self {
        let (section, key) = match key_path.rsplit_once('.') {
            Some((section, key)) => (Some(section), key),
            None => (None, key_path),
        };
        Self {
            section: section.map(str::to_string),
            key: key.to_string(),
            file: file.to_path_buf(),
            line: find_line_number(content, section, key),
            issue,
        }
    }

    pub fn suggestion(&self) -> Option<&str> {
        match &self.issue {
            ConfigIssue::UnknownKey { suggestion } => suggestion.as_deref(),
            _ => None,
        }
    }
}

/// Load configuration and collect non-fatal warnings: unknown keys and
/// resolution settings that cannot work as written.
pub fn load_with_warnings(path: &Path) -> ConfigResult<(EngineConfig, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown: Vec<String> = Vec::new();
    let config: EngineConfig =
        serde_ignored::deserialize(toml::de::Deserializer::new(&content), |p| {
            unknown.push(p.to_string())
        })
        .map_err(|e| ConfigError::Parse {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut warnings: Vec<ConfigWarning> = unknown
        .iter()
        .map(|key_path| {
            let key = key_path.rsplit('.').next().unwrap_or(key_path);
            let issue = ConfigIssue::UnknownKey {
                suggestion: suggest_key(key),
            };
            ConfigWarning::at(path, &content, key_path, issue)
        })
        .collect();

    let resolution = &config.resolution;
    if resolution.max_diagnostics == 0 {
        warnings.push(ConfigWarning::at(
            path,
            &content,
            "resolution.max_diagnostics",
            ConfigIssue::ZeroDiagnosticLimit,
        ));
    }
    for name in &resolution.reserved_names {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            warnings.push(ConfigWarning::at(
                path,
                &content,
                "resolution.reserved_names",
                ConfigIssue::UnmatchableReservedName { name: name.clone() },
            ));
        }
    }

    for warning in &warnings {
        tracing::warn!(
            section = warning.section.as_deref().unwrap_or(""),
            key = %warning.key,
            line = ?warning.line,
            issue = ?warning.issue,
            file = %warning.file.display(),
            "config warning"
        );
    }

    Ok((config, warnings))
}

/// Apply environment variable overrides (STRATUM_* prefix)
///
/// Unparseable values are ignored with a warning.
pub fn with_env_overrides(mut config: EngineConfig) -> EngineConfig {
    // STRATUM_MAX_DIAGNOSTICS
    if let Ok(value) = std::env::var("STRATUM_MAX_DIAGNOSTICS") {
        match value.trim().parse::<usize>() {
            Ok(limit) => config.resolution.max_diagnostics = limit,
            Err(_) => tracing::warn!(%value, "ignoring invalid STRATUM_MAX_DIAGNOSTICS"),
        }
    }

    // STRATUM_CACHE_DEFINITIONS
    if let Ok(value) = std::env::var("STRATUM_CACHE_DEFINITIONS") {
        config.cache.definitions = parse_flag(&value);
    }

    // STRATUM_CACHE_SIGNATURES
    if let Ok(value) = std::env::var("STRATUM_CACHE_SIGNATURES") {
        config.cache.signatures = parse_flag(&value);
    }

    config
}

fn parse_flag(value: &str) -> bool {
    value.to_lowercase() != "false" && value != "0"
}

/// 1-based line on which `key` is assigned inside `[section]`, or the
/// header line when `key` names an unknown table.
fn find_line_number(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let dotted = match section {
        Some(section) => format!("{}.{}", section, key),
        None => key.to_string(),
    };
    let mut current: Option<&str> = None;

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let header = header.trim();
            if header == dotted {
                return Some(idx + 1);
            }
            current = Some(header);
            continue;
        }
        let assigns = line
            .strip_prefix(key)
            .is_some_and(|rest| rest.trim_start().starts_with('='));
        if assigns && current == section {
            return Some(idx + 1);
        }
    }
    None
}

const KNOWN_KEYS: &[&str] = &[
    "resolution",
    "max_diagnostics",
    "reserved_names",
    "cache",
    "definitions",
    "signatures",
];

/// Closest known key within two edits of `unknown`.
fn suggest_key(unknown: &str) -> Option<String> {
    KNOWN_KEYS
        .iter()
        .map(|known| (edit_distance(unknown, known), *known))
        .filter(|(distance, _)| *distance <= 2)
        .min()
        .map(|(_, known)| known.to_string())
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = diagonal + usize::from(ca != *cb);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(diagonal + 1);
        }
    }

    row[b.len()]
}
