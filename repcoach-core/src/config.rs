use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use log::LevelFilter;

use crate::logging::parse_level;

#[derive(Debug, Clone, PartialEq)]
pub struct CoachConfig {
    pub poll_interval: Duration,
    pub fps: u32,
    pub log_level: LevelFilter,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            fps: 30,
            log_level: LevelFilter::Info,
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("invalid value {:?} for {}", raw, name))
        })
        .transpose()
}

impl CoachConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Unset variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(ms) = parse_var::<u64>(&lookup, "REPCOACH_POLL_MS")? {
            config.poll_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(fps) = parse_var::<u32>(&lookup, "REPCOACH_FPS")? {
            config.fps = fps.max(1);
        }
        if let Some(level) = lookup("REPCOACH_LOG") {
            config.log_level = parse_level(&level)
                .ok_or_else(|| anyhow!("invalid value {:?} for REPCOACH_LOG", level))?;
        }

        Ok(config)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}
