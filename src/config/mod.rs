// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::path::Path;

pub const ENV_PREFIX: &str = "PINGER";

/// Load configuration from a file (YAML or JSON), then apply `PINGER_*`
/// environment overrides.
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let parsed = parse_config(path, &contents)?;
    finish(parsed)
}

/// Defaults plus environment overrides, for when no file is given.
pub fn default_config() -> Result<Config> {
    finish(Config::default())
}

fn parse_config(path: &Path, contents: &str) -> Result<Config> {
    let ext = path.extension().and_then(|s| s.to_str());
    let parsed = if ext == Some("yaml") || ext == Some("yml") {
        serde_yaml::from_str(contents).context("Failed to parse YAML config")?
    } else {
        serde_json::from_str(contents).context("Failed to parse JSON config")?
    };
    Ok(parsed)
}

fn finish(parsed: Config) -> Result<Config> {
    let layered = apply_env_overrides(parsed, config::Environment::with_prefix(ENV_PREFIX))?;
    layered.validate()?;
    Ok(layered)
}

fn apply_env_overrides(base: Config, env: config::Environment) -> Result<Config> {
    let layered = config::Config::builder()
        .add_source(config::Config::try_from(&base).context("Failed to layer config")?)
        .add_source(env.prefix_separator("_").separator("__").try_parsing(true))
        .build()
        .context("Failed to read environment overrides")?;

    layered
        .try_deserialize()
        .context("Invalid environment override")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix(ENV_PREFIX).source(Some(source))
    }

    #[test]
    fn parses_yaml_by_extension() {
        let yaml = "base_url: http://backend:8080/\ntimeout_secs: 3\noutput: json\n";
        let config = parse_config(Path::new("pinger.yaml"), yaml).unwrap();

        assert_eq!(config.base_url.as_str(), "http://backend:8080/");
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.output, OutputFormat::Json);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn parses_json_otherwise() {
        let json = r#"{"metrics": {"enabled": true, "port": 9100}}"#;
        let config = parse_config(Path::new("pinger.json"), json).unwrap();

        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.port, 9100);
        assert_eq!(config.metrics.path, "/metrics");
        assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn environment_overrides_file_values() {
        let config = apply_env_overrides(
            Config::default(),
            env(&[
                ("PINGER_BASE_URL", "http://10.0.0.7:8000/"),
                ("PINGER_METRICS__ENABLED", "true"),
                ("PINGER_TIMEOUT_SECS", "2"),
            ]),
        )
        .unwrap();

        assert_eq!(config.base_url.as_str(), "http://10.0.0.7:8000/");
        assert!(config.metrics.enabled);
        assert_eq!(config.timeout_secs, 2);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = Config::default();
        config.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout)));

        let mut config = Config::default();
        config.base_url = url::Url::parse("mailto:ops@example.com").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidBaseUrl(_))));

        let mut config = Config::default();
        config.metrics.path = "metrics".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMetricsPath(_))
        ));
    }
}
