//! Application settings.
//!
//! Every threshold the heuristics use is empirical, so all of them live here instead of
//! being baked into the algorithms. Settings come from an optional JSON file and can be
//! overridden with `NEURONARRATIVE_*` environment variables.
use std::path::{Path, PathBuf};
use log::{info, warn};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;
pub const ENV_PREFIX: &str = "NEURONARRATIVE_";
pub const DEFAULT_CONFIG_FILE: &str = "neuronarrative.json";
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
/// Display range and deflection scale of the dial.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeConfig {
    pub display_min: f64,
    pub display_max: f64,
    /// Gauge units per kOhm of resistance drift. Negative so that falling resistance
    /// moves the needle up-scale.
    pub scale_per_kohm: f64,
}
impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            display_min: 1.0,
            display_max: 6.5,
            scale_per_kohm: -0.5,
        }
    }
}
impl GaugeConfig {
    /// Never panics, even on an inverted range built by hand.
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.display_min).min(self.display_max)
    }
}
/// Thresholds of the column scoring heuristic.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Keep dividing by ten until the median is at most this.
    pub target_median: f64,
    pub max_divisions: u32,
    pub in_range_min: f64,
    pub in_range_max: f64,
    /// Spread (after scaling) that earns the full spread score.
    pub spread_norm: f64,
}
impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            target_median: 20.0,
            max_divisions: 6,
            in_range_min: 0.5,
            in_range_max: 10.0,
            spread_norm: 5.0,
        }
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Width of the scrolling detail chart.
    pub detail_window_sec: f64,
    /// Number of min/max buckets drawn by the overview chart.
    pub overview_buckets: usize,
    pub skip_sec: f64,
}
impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            detail_window_sec: 30.0,
            overview_buckets: 600,
            skip_sec: 10.0,
        }
    }
}
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gauge: GaugeConfig,
    pub inference: InferenceConfig,
    pub view: ViewConfig,
}
impl AppConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }
    /// File (if present) plus environment overrides, validated.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(format!("{ENV_PREFIX}CONFIG"))
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        let mut config = if path.exists() {
            info!("loading settings from {}", path.display());
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())?;
        config.validate()?;
        Ok(config)
    }
    /// Applies `KEY=value` overrides from any lookup (the environment in production).
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let parse = |key: &str| -> Result<Option<f64>, ConfigError> {
            match lookup(key) {
                None => Ok(None),
                Some(raw) => raw.trim().parse::<f64>().map(Some).map_err(|_| {
                    ConfigError::InvalidValue {
                        key: format!("{ENV_PREFIX}{key}"),
                        value: raw,
                    }
                }),
            }
        };
        if let Some(v) = parse("GAUGE_MIN")? {
            self.gauge.display_min = v;
        }
        if let Some(v) = parse("GAUGE_MAX")? {
            self.gauge.display_max = v;
        }
        if let Some(v) = parse("GAUGE_SCALE")? {
            self.gauge.scale_per_kohm = v;
        }
        if let Some(v) = parse("DETAIL_WINDOW_SEC")? {
            self.view.detail_window_sec = v;
        }
        Ok(())
    }
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, value: String| ConfigError::InvalidValue {
            key: key.to_owned(),
            value,
        };
        if !(self.gauge.display_min < self.gauge.display_max) {
            return Err(invalid(
                "gauge.display_min",
                format!("{} >= {}", self.gauge.display_min, self.gauge.display_max),
            ));
        }
        if self.inference.max_divisions > 12 {
            return Err(invalid(
                "inference.max_divisions",
                self.inference.max_divisions.to_string(),
            ));
        }
        if !(self.inference.in_range_min < self.inference.in_range_max) {
            return Err(invalid(
                "inference.in_range_min",
                format!(
                    "{} >= {}",
                    self.inference.in_range_min, self.inference.in_range_max
                ),
            ));
        }
        if !(self.view.detail_window_sec > 0.0) {
            return Err(invalid(
                "view.detail_window_sec",
                self.view.detail_window_sec.to_string(),
            ));
        }
        Ok(())
    }
}
static SETTINGS: OnceCell<AppConfig> = OnceCell::new();
/// Process-wide settings for the desktop binary. Falls back to defaults on a bad config.
pub fn settings() -> &'static AppConfig {
    SETTINGS.get_or_init(|| match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            warn!("ignoring settings: {err}");
            AppConfig::default()
        }
    })
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    #[test]
    fn partial_json_keeps_defaults() {
        let config = AppConfig::from_json_str(r#"{"gauge": {"scale_per_kohm": -0.8}}"#).unwrap();
        assert_eq!(config.gauge.scale_per_kohm, -0.8);
        assert_eq!(config.gauge.display_max, 6.5);
        assert_eq!(config.inference, InferenceConfig::default());
    }
    #[test]
    fn inverted_display_range_is_rejected() {
        let err = AppConfig::from_json_str(r#"{"gauge": {"display_min": 7.0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
    #[test]
    fn clamp_survives_a_hand_built_inverted_range() {
        let gauge = GaugeConfig {
            display_min: 6.5,
            display_max: 1.0,
            ..GaugeConfig::default()
        };
        assert_eq!(gauge.clamp(3.0), 1.0);
        assert_eq!(GaugeConfig::default().clamp(9.0), 6.5);
        assert_eq!(GaugeConfig::default().clamp(-2.0), 1.0);
    }
    #[test]
    fn overrides_replace_file_values() {
        let env: HashMap<&str, &str> = [("GAUGE_SCALE", "-0.25"), ("DETAIL_WINDOW_SEC", "12")]
            .into_iter()
            .collect();
        let mut config = AppConfig::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.gauge.scale_per_kohm, -0.25);
        assert_eq!(config.view.detail_window_sec, 12.0);
    }
    #[test]
    fn unparseable_override_names_the_variable() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(|k| (k == "GAUGE_MIN").then(|| "low".to_owned()))
            .unwrap_err();
        assert!(err.to_string().contains("NEURONARRATIVE_GAUGE_MIN"));
    }
    #[test]
    fn reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"view": {"overview_buckets": 128}}"#).unwrap();
        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.view.overview_buckets, 128);
    }
}
