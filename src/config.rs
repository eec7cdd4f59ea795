//! Canvas configuration parsed from environment variables.

use crate::error::ConfigError;

pub const DEFAULT_ZOOM_PCT: f64 = 100.0;
pub const DEFAULT_SNAP_ANGLE_DEG: f64 = 15.0;
pub const DEFAULT_MIN_DRAG_PX: f64 = 3.0;
pub const DEFAULT_NUDGE: f64 = 1.0;
pub const DEFAULT_PASTE_OFFSET: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasConfig {
    /// Initial zoom in percent.
    pub zoom_pct: f64,
    /// Snap rotation even without the snap modifier.
    pub snap_to_angle: bool,
    pub snap_angle_deg: f64,
    /// Pointer travel, in view pixels, below which a press-release is a click.
    pub min_drag_px: f64,
    /// Model units moved per arrow key press.
    pub nudge: f64,
    /// Offset applied to each axis when pasting.
    pub paste_offset: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            zoom_pct: DEFAULT_ZOOM_PCT,
            snap_to_angle: false,
            snap_angle_deg: DEFAULT_SNAP_ANGLE_DEG,
            min_drag_px: DEFAULT_MIN_DRAG_PX,
            nudge: DEFAULT_NUDGE,
            paste_offset: DEFAULT_PASTE_OFFSET,
        }
    }
}

impl CanvasConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `PATHVIEW_ZOOM_PCT`: default 100, must be positive
    /// - `PATHVIEW_SNAP_TO_ANGLE`: `true` or `false` (default)
    /// - `PATHVIEW_SNAP_ANGLE_DEG`: default 15, must be positive
    /// - `PATHVIEW_MIN_DRAG_PX`: default 3
    /// - `PATHVIEW_NUDGE`: default 1.0
    /// - `PATHVIEW_PASTE_OFFSET`: default 10
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first variable that does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_var)
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first key that does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            zoom_pct: parse_positive(&lookup, "PATHVIEW_ZOOM_PCT", DEFAULT_ZOOM_PCT)?,
            snap_to_angle: parse_bool(&lookup, "PATHVIEW_SNAP_TO_ANGLE", false)?,
            snap_angle_deg: parse_positive(&lookup, "PATHVIEW_SNAP_ANGLE_DEG", DEFAULT_SNAP_ANGLE_DEG)?,
            min_drag_px: parse_non_negative(&lookup, "PATHVIEW_MIN_DRAG_PX", DEFAULT_MIN_DRAG_PX)?,
            nudge: parse_non_negative(&lookup, "PATHVIEW_NUDGE", DEFAULT_NUDGE)?,
            paste_offset: parse_f64(&lookup, "PATHVIEW_PASTE_OFFSET", DEFAULT_PASTE_OFFSET)?,
        })
    }

    /// Rotation snap step in radians.
    #[must_use]
    pub fn snap_step(&self) -> f64 {
        self.snap_angle_deg.to_radians()
    }
}

fn env_var(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) => Some(value),
        Err(_) => None,
    }
}

fn parse_f64(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: f64) -> Result<f64, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ConfigError::Invalid { key, value: raw }),
    }
}

fn parse_positive(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: f64) -> Result<f64, ConfigError> {
    let v = parse_f64(lookup, key, default)?;
    if v > 0.0 { Ok(v) } else { Err(ConfigError::Invalid { key, value: v.to_string() }) }
}

fn parse_non_negative(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: f64,
) -> Result<f64, ConfigError> {
    let v = parse_f64(lookup, key, default)?;
    if v >= 0.0 { Ok(v) } else { Err(ConfigError::Invalid { key, value: v.to_string() }) }
}

fn parse_bool(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
