//! Flat `key = value` mapping profiles.
//!
//! ```text
//! ; headtrack mapping profile
//! axes = yaw,pitch,roll
//! yaw.source = yaw
//! yaw.sensitivity = 1.0000
//! yaw.inverted = false
//! ...
//! ```
//!
//! Every field of every listed axis is required.  Unknown enum values,
//! missing fields and unparsable numbers are reported here, at load time;
//! nothing downstream re-validates.

use crate::axis::{AxisConfig, CurveKind};
use crate::mapping_config::MappingConfig;
use headtrack_types::{Axis, HeadtrackError};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Field names written for every axis, in file order.
pub const AXIS_FIELDS: [&str; 12] = [
    "source",
    "sensitivity",
    "inverted",
    "deadzone_min",
    "deadzone_max",
    "min_limit",
    "max_limit",
    "enable_limits",
    "curve",
    "curve_exponent",
    "curve_strength",
    "max_input_range",
];

// ────────────────────────────────────────────────────────────────────────────
// Parsing
// ────────────────────────────────────────────────────────────────────────────

/// Parse profile text into a validated [`MappingConfig`].
pub fn parse_profile(text: &str) -> Result<MappingConfig, HeadtrackError> {
    let entries = read_entries(text)?;

    let axes_list = required(&entries, "axes")?;
    let mut axes = Vec::new();
    for name in axes_list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let target: Axis = name.parse().map_err(|_| HeadtrackError::UnknownValue {
            key: "axes".to_string(),
            value: name.to_string(),
        })?;
        axes.push(parse_axis(&entries, target)?);
    }

    let cfg = MappingConfig { axes };
    cfg.validate()?;
    Ok(cfg)
}

fn read_entries(text: &str) -> Result<HashMap<String, String>, HeadtrackError> {
    let mut entries = HashMap::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(HeadtrackError::MalformedLine {
                line: idx + 1,
                content: raw.to_string(),
            });
        };
        let key = key.trim().to_ascii_lowercase();
        if entries.contains_key(&key) {
            return Err(HeadtrackError::DuplicateKey { key, line: idx + 1 });
        }
        entries.insert(key, value.trim().to_string());
    }
    Ok(entries)
}

fn required<'a>(entries: &'a HashMap<String, String>, key: &str) -> Result<&'a str, HeadtrackError> {
    entries
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| HeadtrackError::MissingField(key.to_string()))
}

fn parse_f32(entries: &HashMap<String, String>, key: &str) -> Result<f32, HeadtrackError> {
    let value = required(entries, key)?;
    value
        .parse::<f32>()
        .ok()
        .filter(|v| !v.is_nan())
        .ok_or_else(|| HeadtrackError::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn parse_bool(entries: &HashMap<String, String>, key: &str) -> Result<bool, HeadtrackError> {
    let value = required(entries, key)?;
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(HeadtrackError::UnknownValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_axis(entries: &HashMap<String, String>, target: Axis) -> Result<AxisConfig, HeadtrackError> {
    let key = |field: &str| format!("{target}.{field}");

    let source_key = key("source");
    let source_raw = required(entries, &source_key)?;
    let source = if source_raw.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(source_raw.parse::<Axis>().map_err(|_| HeadtrackError::UnknownValue {
            key: source_key.clone(),
            value: source_raw.to_string(),
        })?)
    };

    let curve_key = key("curve");
    let curve_raw = required(entries, &curve_key)?;
    let exponent = parse_f32(entries, &key("curve_exponent"))?;
    let curve = match curve_raw.to_ascii_lowercase().as_str() {
        "linear" => CurveKind::Linear,
        "quadratic" => CurveKind::Quadratic,
        "cubic" => CurveKind::Cubic,
        "custom" => CurveKind::Custom { exponent },
        _ => {
            return Err(HeadtrackError::UnknownValue {
                key: curve_key,
                value: curve_raw.to_string(),
            });
        }
    };

    Ok(AxisConfig {
        source,
        target,
        sensitivity: parse_f32(entries, &key("sensitivity"))?,
        inverted: parse_bool(entries, &key("inverted"))?,
        deadzone_min: parse_f32(entries, &key("deadzone_min"))?,
        deadzone_max: parse_f32(entries, &key("deadzone_max"))?,
        min_limit: parse_f32(entries, &key("min_limit"))?,
        max_limit: parse_f32(entries, &key("max_limit"))?,
        enable_limits: parse_bool(entries, &key("enable_limits"))?,
        curve,
        curve_strength: parse_f32(entries, &key("curve_strength"))?,
        max_input_range: parse_f32(entries, &key("max_input_range"))?,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Formatting
// ────────────────────────────────────────────────────────────────────────────

/// Render `cfg` as profile text.  Floats carry four decimal digits.
pub fn format_profile(cfg: &MappingConfig) -> String {
    let mut out = String::new();
    out.push_str("; headtrack mapping profile\n");
    out.push_str(&format!("; saved {}\n\n", chrono::Utc::now().to_rfc3339()));

    let names: Vec<&str> = cfg.axes.iter().map(|a| a.target.name()).collect();
    out.push_str(&format!("axes = {}\n", names.join(",")));

    for axis in &cfg.axes {
        let t = axis.target;
        let source = axis.source.map_or("none", Axis::name);
        let exponent = match axis.curve {
            CurveKind::Custom { exponent } => exponent,
            CurveKind::Linear => 1.0,
            CurveKind::Quadratic => 2.0,
            CurveKind::Cubic => 3.0,
        };
        out.push('\n');
        out.push_str(&format!("[{t}]\n"));
        out.push_str(&format!("{t}.source = {source}\n"));
        out.push_str(&format!("{t}.sensitivity = {:.4}\n", axis.sensitivity));
        out.push_str(&format!("{t}.inverted = {}\n", axis.inverted));
        out.push_str(&format!("{t}.deadzone_min = {:.4}\n", axis.deadzone_min));
        out.push_str(&format!("{t}.deadzone_max = {:.4}\n", axis.deadzone_max));
        out.push_str(&format!("{t}.min_limit = {:.4}\n", axis.min_limit));
        out.push_str(&format!("{t}.max_limit = {:.4}\n", axis.max_limit));
        out.push_str(&format!("{t}.enable_limits = {}\n", axis.enable_limits));
        out.push_str(&format!("{t}.curve = {}\n", axis.curve.name()));
        out.push_str(&format!("{t}.curve_exponent = {exponent:.4}\n"));
        out.push_str(&format!("{t}.curve_strength = {:.4}\n", axis.curve_strength));
        out.push_str(&format!("{t}.max_input_range = {:.4}\n", axis.max_input_range));
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// File I/O
// ────────────────────────────────────────────────────────────────────────────

/// Load and validate a profile from disk.
pub fn load_profile(path: &Path) -> Result<MappingConfig, HeadtrackError> {
    let text = fs::read_to_string(path).map_err(|e| HeadtrackError::Io {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;
    let cfg = parse_profile(&text)?;
    tracing::info!(path = %path.display(), axes = cfg.axes.len(), "Mapping profile loaded");
    Ok(cfg)
}

/// Write `cfg` to disk, creating parent directories as needed.
pub fn save_profile(cfg: &MappingConfig, path: &Path) -> Result<(), HeadtrackError> {
    let io_err = |e: std::io::Error| HeadtrackError::Io {
        path: path.display().to_string(),
        details: e.to_string(),
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, format_profile(cfg)).map_err(io_err)?;
    tracing::debug!(path = %path.display(), "Mapping profile saved");
    Ok(())
}
