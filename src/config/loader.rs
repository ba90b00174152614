//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{SlipwayError, SlipwayResult};

use super::types::{Config, Transport};

pub use crate::domain::value_objects::ConfigWarning;

/// Config file looked up in the working directory
pub const CONFIG_FILE: &str = "slipway.toml";

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> SlipwayResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;
    parse_with_warnings(&content, path)
}

/// Parse TOML `content` that came from `path`.
pub fn parse_with_warnings(
    content: &str,
    path: &Path,
) -> SlipwayResult<(Config, Vec<ConfigWarning>)> {
    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| SlipwayError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load the explicit config file, else `./slipway.toml`, else defaults.
///
/// An explicit path that does not exist is an error; a missing
/// `./slipway.toml` is not.
pub fn discover(explicit: Option<&Path>) -> SlipwayResult<(Config, Vec<ConfigWarning>)> {
    let path = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(SlipwayError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => {
            let local = PathBuf::from(CONFIG_FILE);
            if !local.is_file() {
                tracing::debug!("no {CONFIG_FILE} found, using defaults");
                return Ok((Config::default(), Vec::new()));
            }
            local
        }
    };

    tracing::debug!(path = %path.display(), "loading config");
    load_with_warnings(&path)
}

/// Apply environment variable overrides (SLIPWAY_* prefix).
///
/// `lookup` returns the value of a variable, if set. Unparseable values are
/// ignored with a warning.
pub fn with_env_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(transport) = lookup("SLIPWAY_TRANSPORT") {
        match transport.parse::<Transport>() {
            Ok(transport) => config.connection.transport = transport,
            Err(e) => tracing::warn!("ignoring SLIPWAY_TRANSPORT: {e}"),
        }
    }

    if let Some(host) = lookup("SLIPWAY_HOST") {
        config.connection.host = Some(host);
    }

    if let Some(user) = lookup("SLIPWAY_USER") {
        config.connection.user = Some(user);
    }

    if let Some(port) = lookup("SLIPWAY_PORT") {
        match port.trim().parse() {
            Ok(port) => config.connection.port = port,
            Err(_) => tracing::warn!("ignoring SLIPWAY_PORT: '{port}' is not a port number"),
        }
    }

    if let Some(dir) = lookup("SLIPWAY_DIR") {
        config.deploy.dir = dir;
    }

    if let Some(keep) = lookup("SLIPWAY_KEEP") {
        match keep.trim().parse() {
            Ok(keep) => config.deploy.keep = keep,
            Err(_) => tracing::warn!("ignoring SLIPWAY_KEEP: '{keep}' is not a count"),
        }
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "connection",
        "transport",
        "host",
        "user",
        "port",
        "identity_file",
        "connect_timeout_secs",
        "ssh_options",
        "deploy",
        "dir",
        "keep",
        "dist_dir",
        "ignore",
        "command_timeout_secs",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
