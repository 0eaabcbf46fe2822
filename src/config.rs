// src/config.rs
use crate::error::LvrError;
use std::{env, path::PathBuf, str::FromStr};

pub const DEFAULT_SEASON: &str = "108S2";
pub const DEFAULT_SHARDS: usize = 2;

/// Runtime settings for one batch run, read from `LVR_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Season archive to stage CSVs from; skipped when the file does not exist.
    pub archive: PathBuf,
    pub unzip_dir: PathBuf,
    pub result_dir: PathBuf,
    pub shards: usize,
    /// `None` leaves the pool size to rayon.
    pub threads: Option<usize>,
    /// `None` aggregates in memory, `Some(n)` spills into `n` partitions.
    pub spill_partitions: Option<usize>,
    pub season: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive: PathBuf::from("tmp/source/lvr_landcsv.zip"),
            unzip_dir: PathBuf::from("tmp/unzip"),
            result_dir: PathBuf::from("result"),
            shards: DEFAULT_SHARDS,
            threads: None,
            spill_partitions: None,
            season: DEFAULT_SEASON.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, LvrError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, so tests need not touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LvrError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Config::default();

        if let Some(v) = lookup("LVR_ARCHIVE") {
            cfg.archive = PathBuf::from(v);
        }
        if let Some(v) = lookup("LVR_UNZIP_DIR") {
            cfg.unzip_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("LVR_RESULT_DIR") {
            cfg.result_dir = PathBuf::from(v);
        }
        cfg.season = season_from_lookup(&lookup);
        if let Some(n) = parse_positive(&lookup, "LVR_SHARDS")? {
            cfg.shards = n;
        }
        cfg.threads = parse_positive(&lookup, "LVR_THREADS")?;
        cfg.spill_partitions = parse_positive(&lookup, "LVR_SPILL_PARTITIONS")?;

        Ok(cfg)
    }
}

/// The download season alone; the crawler reads nothing else.
pub fn season_from_env() -> String {
    season_from_lookup(&|key: &str| env::var(key).ok())
}

fn season_from_lookup<F>(lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup("LVR_SEASON").unwrap_or_else(|| DEFAULT_SEASON.to_string())
}

fn parse_positive<F>(lookup: &F, key: &str) -> Result<Option<usize>, LvrError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match usize::from_str(raw.trim()) {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(LvrError::Configuration(format!(
            "{} must be a positive integer, got {:?}",
            key, raw
        ))),
    }
}
