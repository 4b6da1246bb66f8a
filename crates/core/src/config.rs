//! `.atlas.toml` config loading.
//!
//! Every key is optional. A missing file yields defaults; an unparseable file warns
//! and yields defaults; unknown keys warn with a typo suggestion.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONFIG_FILE: &str = ".atlas.toml";

/// Known keys in `.atlas.toml` for config validation.
const KNOWN_CONFIG_KEYS: &[&str] = &["catalog", "booster", "latency_ms", "session_ttl_secs"];

/// Runtime configuration shared by the server and CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasConfig {
    /// Alternative catalog JSON. `None` = the builtin demo catalog.
    pub catalog: Option<PathBuf>,
    /// Relevance booster name (`random` or `none`).
    pub booster: String,
    /// Artificial delay added to every API response.
    pub latency_ms: u64,
    /// Idle sessions older than this are pruned.
    pub session_ttl_secs: u64,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            catalog: None,
            booster: "random".to_string(),
            latency_ms: 0,
            session_ttl_secs: 1800,
        }
    }
}

/// Simple Levenshtein edit distance for typo suggestions.
fn edit_distance(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn warn_unknown_key(key: &str) {
    let suggestion = KNOWN_CONFIG_KEYS.iter().min_by_key(|k| edit_distance(key, k));
    match suggestion {
        Some(s) if edit_distance(key, s) <= 3 => {
            warn!(key = key, suggestion = *s, "Unknown key in {CONFIG_FILE} — did you mean '{s}'?");
        }
        _ => {
            warn!(
                key = key,
                "Unknown key in {CONFIG_FILE} (known keys: {})",
                KNOWN_CONFIG_KEYS.join(", ")
            );
        }
    }
}

/// Load configuration from `.atlas.toml` in `root`.
///
/// A relative `catalog` path is resolved against `root`.
pub fn load_atlas_config(root: &Path) -> AtlasConfig {
    let mut config = AtlasConfig::default();
    let config_path = root.join(CONFIG_FILE);

    if !config_path.exists() {
        return config;
    }
    debug!(path = %config_path.display(), "Loading {CONFIG_FILE}");

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Could not read {CONFIG_FILE}");
            return config;
        }
    };
    let table = match content.parse::<toml::Table>() {
        Ok(t) => t,
        Err(e) => {
            warn!(error = %e, "Failed to parse {CONFIG_FILE}");
            return config;
        }
    };

    for key in table.keys() {
        if !KNOWN_CONFIG_KEYS.contains(&key.as_str()) {
            warn_unknown_key(key);
        }
    }

    if let Some(path) = table.get("catalog").and_then(|v| v.as_str()) {
        config.catalog = Some(root.join(path));
    }
    if let Some(name) = table.get("booster").and_then(|v| v.as_str()) {
        config.booster = name.to_string();
    }
    if let Some(ms) = table.get("latency_ms").and_then(|v| v.as_integer()) {
        config.latency_ms = ms.max(0) as u64;
    }
    if let Some(secs) = table.get("session_ttl_secs").and_then(|v| v.as_integer()) {
        if secs > 0 {
            config.session_ttl_secs = secs as u64;
        } else {
            warn!(value = secs, "session_ttl_secs must be positive, keeping default");
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), contents).unwrap();
        dir
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_atlas_config(dir.path()), AtlasConfig::default());
    }

    #[test]
    fn reads_known_keys() {
        let dir = write_config(
            "catalog = \"data/cat.json\"\nbooster = \"none\"\nlatency_ms = 250\nsession_ttl_secs = 60\n",
        );
        let config = load_atlas_config(dir.path());
        assert_eq!(config.catalog, Some(dir.path().join("data/cat.json")));
        assert_eq!(config.booster, "none");
        assert_eq!(config.latency_ms, 250);
        assert_eq!(config.session_ttl_secs, 60);
    }

    #[test]
    fn unparseable_file_falls_back_to_defaults() {
        let dir = write_config("booster = [unterminated");
        assert_eq!(load_atlas_config(dir.path()), AtlasConfig::default());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let dir = write_config("boster = \"none\"\nlatency_ms = 5\n");
        let config = load_atlas_config(dir.path());
        assert_eq!(config.booster, "random");
        assert_eq!(config.latency_ms, 5);
    }

    #[test]
    fn non_positive_ttl_keeps_default() {
        let dir = write_config("session_ttl_secs = 0\n");
        assert_eq!(load_atlas_config(dir.path()).session_ttl_secs, 1800);
    }

    #[test]
    fn edit_distance_basics() {
        assert_eq!(edit_distance("booster", "booster"), 0);
        assert_eq!(edit_distance("boster", "booster"), 1);
        assert_eq!(edit_distance("", "abc"), 3);
    }
}
