//! Save/load persistence
//!
//! Features:
//! - JSON files written through a temp file and rename
//! - Missing or corrupt data falls back to defaults (never fatal)
//!
//! Losing a high score or a settings file must never block a run, so reads
//! recover locally. Writes report errors and leave recovery to the caller.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Parse `json`, falling back to `T::default()` when it is malformed
pub fn parse_or_default<T: DeserializeOwned + Default>(json: &str, what: &str) -> T {
    match serde_json::from_str(json) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Discarding malformed {}: {}", what, e);
            T::default()
        }
    }
}

/// Load `path`, falling back to `T::default()` when missing or malformed
pub fn load_json<T: DeserializeOwned + Default>(path: &Path, what: &str) -> T {
    match fs::read_to_string(path) {
        Ok(json) => {
            log::info!("Loaded {} from {}", what, path.display());
            parse_or_default(&json, what)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("No {} found, starting fresh", what);
            T::default()
        }
        Err(e) => {
            log::warn!("Could not read {} ({}), using defaults", what, e);
            T::default()
        }
    }
}

/// Write `value` to `path` atomically (temp file, then rename)
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        value: u32,
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("fracture-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_malformed_falls_back() {
        let sample: Sample = parse_or_default("{not json", "sample");
        assert_eq!(sample, Sample::default());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let sample: Sample = load_json(&temp_path("missing"), "sample");
        assert_eq!(sample, Sample::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("roundtrip");
        save_json(&path, &Sample { value: 7 }).unwrap();
        let loaded: Sample = load_json(&path, "sample");
        assert_eq!(loaded, Sample { value: 7 });
        let _ = fs::remove_file(&path);
    }
}
