use std::env;

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;

use crate::scan::default_jobs;
use crate::types::ReportFormat;

/// Defaults loaded from the environment.
///
/// A `.env` file in the working directory is read first if present. Command
/// line flags take precedence over anything set here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Output format when `--format` is not given (RESUMATCH_FORMAT)
    pub format: ReportFormat,
    /// Concurrent extractions when `--jobs` is not given (RESUMATCH_JOBS)
    pub jobs: usize,
    /// Walk nested folders by default (RESUMATCH_RECURSIVE)
    pub recursive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            jobs: default_jobs(),
            recursive: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let format = match lookup("RESUMATCH_FORMAT") {
            Some(value) => ReportFormat::from_str(value.trim(), true)
                .map_err(|_| anyhow!("Invalid RESUMATCH_FORMAT: '{}'", value))?,
            None => defaults.format,
        };

        let jobs = match lookup("RESUMATCH_JOBS") {
            Some(value) => {
                let jobs: usize = value
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid RESUMATCH_JOBS: '{}'", value))?;
                jobs.max(1)
            }
            None => defaults.jobs,
        };

        let recursive = match lookup("RESUMATCH_RECURSIVE").as_deref().map(str::trim) {
            Some("1") | Some("true") | Some("yes") => true,
            Some(_) => false,
            None => defaults.recursive,
        };

        Ok(Self {
            format,
            jobs,
            recursive,
        })
    }
}
