//! Process configuration from environment variables.

use docgen_pipeline::PipelineConfig;
use docgen_scheduler::SchedulerConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub listen: SocketAddr,
    pub scheduler: SchedulerConfig,
    pub pipeline: PipelineConfig,
    /// Extra document layouts (JSON array) loaded on top of the built-in ones.
    pub registry_path: Option<PathBuf>,
}

impl ApiConfig {
    /// Reads `DOCGEN_LISTEN`, `DOCGEN_MAX_CONCURRENT_JOBS`, `DOCGEN_PACING_MS`,
    /// `DOCGEN_SUMMARY_CHARS`, `DOCGEN_REGISTRY_PATH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let pipeline_defaults = PipelineConfig::default();
        let scheduler_defaults = SchedulerConfig::default();

        let listen = parse(&lookup, "DOCGEN_LISTEN")?
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8002)));
        let max_concurrent_jobs = parse::<usize, _>(&lookup, "DOCGEN_MAX_CONCURRENT_JOBS")?
            .filter(|n| *n > 0);
        let pacing = parse::<u64, _>(&lookup, "DOCGEN_PACING_MS")?
            .map(Duration::from_millis)
            .unwrap_or(pipeline_defaults.pacing);
        let summary_chars =
            parse(&lookup, "DOCGEN_SUMMARY_CHARS")?.unwrap_or(pipeline_defaults.summary_chars);
        let registry_path = lookup("DOCGEN_REGISTRY_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            listen,
            scheduler: SchedulerConfig {
                max_concurrent_jobs,
                ..scheduler_defaults
            },
            pipeline: PipelineConfig {
                pacing,
                summary_chars,
            },
            registry_path,
        })
    }
}

fn parse<T, L>(lookup: &L, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    L: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.listen.port(), 8002);
        assert_eq!(cfg.scheduler.max_concurrent_jobs, None);
        assert_eq!(cfg.pipeline.pacing, Duration::from_millis(1000));
        assert_eq!(cfg.pipeline.summary_chars, 240);
        assert!(cfg.registry_path.is_none());
    }

    #[test]
    fn reads_overrides() {
        let cfg = ApiConfig::from_lookup(lookup(&[
            ("DOCGEN_LISTEN", "127.0.0.1:9000"),
            ("DOCGEN_MAX_CONCURRENT_JOBS", "4"),
            ("DOCGEN_PACING_MS", "0"),
            ("DOCGEN_REGISTRY_PATH", "/etc/docgen/layouts.json"),
        ]))
        .unwrap();
        assert_eq!(cfg.listen.to_string(), "127.0.0.1:9000");
        assert_eq!(cfg.scheduler.max_concurrent_jobs, Some(4));
        assert!(cfg.pipeline.pacing.is_zero());
        assert_eq!(
            cfg.registry_path.unwrap(),
            PathBuf::from("/etc/docgen/layouts.json")
        );
    }

    #[test]
    fn zero_concurrency_means_unbounded() {
        let cfg = ApiConfig::from_lookup(lookup(&[("DOCGEN_MAX_CONCURRENT_JOBS", "0")])).unwrap();
        assert_eq!(cfg.scheduler.max_concurrent_jobs, None);
    }

    #[test]
    fn rejects_garbage() {
        let err = ApiConfig::from_lookup(lookup(&[("DOCGEN_PACING_MS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("DOCGEN_PACING_MS"));
    }
}
