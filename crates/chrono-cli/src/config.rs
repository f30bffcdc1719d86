//! Layered run configuration (§4.16): an optional `chrono.toml` `[run]`
//! table, overridden by CLI flags — the same file-default/CLI-override
//! cascade shape the governance core formalises for panels, applied once
//! here to the handful of knobs a manual VM run needs.

use std::path::Path;

use serde::Deserialize;

const DEFAULT_MAX_STEPS: u64 = 10_000;

#[derive(Debug, Deserialize, Default, Clone)]
struct ConfigFile {
    #[serde(default)]
    run: RunSection,
}

#[derive(Debug, Deserialize, Clone)]
struct RunSection {
    #[serde(default = "RunSection::default_max_steps")]
    max_steps: u64,
    #[serde(default)]
    gc: bool,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            max_steps: Self::default_max_steps(),
            gc: false,
        }
    }
}

impl RunSection {
    const fn default_max_steps() -> u64 {
        DEFAULT_MAX_STEPS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub max_steps: u64,
    pub gc: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            gc: false,
        }
    }
}

impl RunConfig {
    /// Parses `path` (or falls back to defaults if absent or unreadable),
    /// mirroring `core_config::load_from`'s tolerance of a missing or
    /// malformed file.
    pub fn load(path: Option<&Path>) -> RunConfig {
        let Some(path) = path else {
            return RunConfig::default();
        };
        let Ok(content) = std::fs::read_to_string(path) else {
            return RunConfig::default();
        };
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => RunConfig {
                max_steps: file.run.max_steps,
                gc: file.run.gc,
            },
            Err(_) => RunConfig::default(),
        }
    }

    /// Applies CLI overrides on top of the file-derived configuration.
    pub fn with_overrides(mut self, max_steps: Option<u64>, gc: Option<bool>) -> RunConfig {
        if let Some(max_steps) = max_steps {
            self.max_steps = max_steps;
        }
        if let Some(gc) = gc {
            self.gc = gc;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_path_is_none() {
        let config = RunConfig::load(None);
        assert_eq!(config.max_steps, DEFAULT_MAX_STEPS);
        assert!(!config.gc);
    }

    #[test]
    fn defaults_when_file_is_missing() {
        let config = RunConfig::load(Some(Path::new("__nonexistent_chrono__.toml")));
        assert_eq!(config.max_steps, DEFAULT_MAX_STEPS);
    }

    #[test]
    fn parses_run_section() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[run]\nmax_steps = 50\ngc = true\n").unwrap();
        let config = RunConfig::load(Some(tmp.path()));
        assert_eq!(config.max_steps, 50);
        assert!(config.gc);
    }

    #[test]
    fn cli_overrides_win_over_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[run]\nmax_steps = 50\ngc = false\n").unwrap();
        let config = RunConfig::load(Some(tmp.path())).with_overrides(Some(200), Some(true));
        assert_eq!(config.max_steps, 200);
        assert!(config.gc);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "not valid toml [[[").unwrap();
        let config = RunConfig::load(Some(tmp.path()));
        assert_eq!(config, RunConfig::default());
    }
}
