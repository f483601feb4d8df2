//! Configuration vault – reads/writes `~/.headtrack/config.toml`.

use headtrack_mapping::load_profile;
use headtrack_processing::TrackingLossConfig;
use headtrack_runtime::PipelineConfig;
use headtrack_types::{DEFAULT_FRESHNESS_WINDOW_MS, DeadzoneSettings, HeadtrackError, SensitivitySettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted user configuration.  Scalars come before the nested tables so
/// the TOML output stays flat at the top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// 0 = raw, 1 = heaviest smoothing.
    #[serde(default = "default_smoothing")]
    pub smoothing: f32,

    #[serde(default = "default_freshness_window_ms")]
    pub freshness_window_ms: u64,

    #[serde(default = "default_true")]
    pub extrapolation_enabled: bool,

    /// Seconds.
    #[serde(default = "default_max_extrapolation_time")]
    pub max_extrapolation_time: f32,

    /// Simulated host frame rate used by `/replay`.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,

    /// Treat the source as a network stream (raises the smoothing floor).
    #[serde(default)]
    pub remote_source: bool,

    /// Optional key=value mapping profile applied after extrapolation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<PathBuf>,

    #[serde(default)]
    pub sensitivity: SensitivitySettings,

    #[serde(default)]
    pub deadzone: DeadzoneSettings,

    #[serde(default)]
    pub tracking_loss: TrackingLossConfig,
}

fn default_smoothing() -> f32 {
    0.3
}
fn default_freshness_window_ms() -> u64 {
    DEFAULT_FRESHNESS_WINDOW_MS
}
fn default_true() -> bool {
    true
}
fn default_max_extrapolation_time() -> f32 {
    headtrack_processing::interpolator::DEFAULT_MAX_EXTRAPOLATION_TIME
}
fn default_frame_rate() -> f32 {
    60.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            smoothing: default_smoothing(),
            freshness_window_ms: default_freshness_window_ms(),
            extrapolation_enabled: true,
            max_extrapolation_time: default_max_extrapolation_time(),
            frame_rate: default_frame_rate(),
            remote_source: false,
            profile_path: None,
            sensitivity: SensitivitySettings::default(),
            deadzone: DeadzoneSettings::default(),
            tracking_loss: TrackingLossConfig::default(),
        }
    }
}

impl Config {
    /// Seconds per simulated frame; non-positive rates fall back to 60 Hz.
    pub fn frame_dt(&self) -> f32 {
        if self.frame_rate.is_finite() && self.frame_rate > 0.0 {
            1.0 / self.frame_rate
        } else {
            1.0 / default_frame_rate()
        }
    }

    /// Build the pipeline configuration, loading the mapping profile if one
    /// is configured.
    pub fn pipeline_config(&self) -> Result<PipelineConfig, HeadtrackError> {
        let mapping = match &self.profile_path {
            Some(path) => Some(load_profile(path)?),
            None => None,
        };
        let config = PipelineConfig {
            smoothing: self.smoothing,
            sensitivity: self.sensitivity,
            deadzone: self.deadzone,
            loss: self.tracking_loss,
            freshness_window_ms: self.freshness_window_ms,
            extrapolation_enabled: self.extrapolation_enabled,
            max_extrapolation_time: self.max_extrapolation_time,
            coordinate: None,
            mapping,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Return the path to `~/.headtrack/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".headtrack").join("config.toml")
}

/// Load the config and apply environment overrides.  `None` when the file
/// does not exist yet.
pub fn load() -> Result<Option<Config>, HeadtrackError> {
    Ok(load_from(&config_path())?.map(|mut cfg| {
        apply_env_overrides(&mut cfg);
        cfg
    }))
}

/// Load the config from a specific path, without environment overrides.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, HeadtrackError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let cfg: Config = toml::from_str(&raw)
        .map_err(|e| HeadtrackError::InvalidConfig(format!("{}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), "Config loaded");
    Ok(Some(cfg))
}

/// Apply `HEADTRACK_*` environment overrides.  Unparsable values are ignored.
///
/// | Variable | Config field |
/// |---|---|
/// | `HEADTRACK_SMOOTHING` | `smoothing` |
/// | `HEADTRACK_FRAME_RATE` | `frame_rate` |
/// | `HEADTRACK_PROFILE` | `profile_path` |
/// | `HEADTRACK_REMOTE` | `remote_source` (`1/0`, `true/false`, `yes/no`) |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("HEADTRACK_SMOOTHING")
        && let Ok(smoothing) = v.trim().parse::<f32>()
        && (0.0..=1.0).contains(&smoothing)
    {
        cfg.smoothing = smoothing;
    }
    if let Ok(v) = std::env::var("HEADTRACK_FRAME_RATE")
        && let Ok(rate) = v.trim().parse::<f32>()
        && rate > 0.0
    {
        cfg.frame_rate = rate;
    }
    if let Ok(v) = std::env::var("HEADTRACK_PROFILE")
        && !v.trim().is_empty()
    {
        cfg.profile_path = Some(PathBuf::from(v.trim()));
    }
    if let Ok(v) = std::env::var("HEADTRACK_REMOTE")
        && let Some(remote) = parse_flag(&v)
    {
        cfg.remote_source = remote;
    }
}

pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Save the config, creating `~/.headtrack/` if necessary.
pub fn save(cfg: &Config) -> Result<(), HeadtrackError> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), HeadtrackError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| io_error(parent, e))?;
        }
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| HeadtrackError::InvalidConfig(format!("cannot serialize config: {e}")))?;
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(|e| io_error(path, e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw).map_err(|e| io_error(path, e))?;
    tracing::info!(path = %path.display(), "Config saved");
    Ok(())
}

fn io_error(path: &Path, err: std::io::Error) -> HeadtrackError {
    HeadtrackError::Io {
        path: path.display().to_string(),
        details: err.to_string(),
    }
}
