//! Session settings resolved from an optional TOML file and command-line flags.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use manipulator_core::{GridConfig, DEFAULT_GRID_SIDE, DEFAULT_SAMPLE_COUNT};
use serde::Deserialize;

/// Values that may be supplied through a session file.
///
/// Every field is optional; flags given on the command line take precedence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SessionFile {
    pub(crate) side: Option<u32>,
    pub(crate) sample_count: Option<usize>,
    pub(crate) seed: Option<u64>,
    pub(crate) delay_ms: Option<u64>,
}

impl SessionFile {
    /// Reads and parses a session file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read session file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse session file {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid session toml")
    }
}

/// Overrides taken from command-line flags.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SessionOverrides {
    pub(crate) side: Option<u32>,
    pub(crate) sample_count: Option<usize>,
    pub(crate) seed: Option<u64>,
    pub(crate) delay_ms: Option<u64>,
}

/// Fully resolved settings for one session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SessionSettings {
    pub(crate) grid: GridConfig,
    pub(crate) seed: Option<u64>,
    pub(crate) delay: Duration,
}

impl SessionSettings {
    /// Layers flag overrides on top of file values on top of defaults.
    pub(crate) fn resolve(file: SessionFile, overrides: SessionOverrides) -> Result<Self> {
        let side = overrides.side.or(file.side).unwrap_or(DEFAULT_GRID_SIDE);
        let sample_count = overrides
            .sample_count
            .or(file.sample_count)
            .unwrap_or(DEFAULT_SAMPLE_COUNT);
        let grid = GridConfig::new(side, sample_count).context("invalid grid configuration")?;
        let delay_ms = overrides.delay_ms.or(file.delay_ms).unwrap_or(0);

        Ok(Self {
            grid,
            seed: overrides.seed.or(file.seed),
            delay: Duration::from_millis(delay_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let settings =
            SessionSettings::resolve(SessionFile::default(), SessionOverrides::default())
                .expect("resolve");
        assert_eq!(settings.grid, GridConfig::default());
        assert_eq!(settings.seed, None);
        assert_eq!(settings.delay, Duration::ZERO);
    }

    #[test]
    fn flags_override_file_values() {
        let file = SessionFile::parse("side = 6\nsample_count = 4\nseed = 11\ndelay_ms = 250\n")
            .expect("parse");
        let overrides = SessionOverrides {
            side: Some(8),
            seed: Some(99),
            ..SessionOverrides::default()
        };

        let settings = SessionSettings::resolve(file, overrides).expect("resolve");
        assert_eq!(settings.grid, GridConfig::new(8, 4).expect("valid"));
        assert_eq!(settings.seed, Some(99));
        assert_eq!(settings.delay, Duration::from_millis(250));
    }

    #[test]
    fn zero_side_is_rejected() {
        let overrides = SessionOverrides {
            side: Some(0),
            ..SessionOverrides::default()
        };
        assert!(SessionSettings::resolve(SessionFile::default(), overrides).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(SessionFile::parse("sides = 4\n").is_err());
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.toml");
        fs::write(&path, "seed = 7\n").expect("write");

        let file = SessionFile::load(&path).expect("load");
        assert_eq!(file.seed, Some(7));
        assert_eq!(file.side, None);
    }
}
