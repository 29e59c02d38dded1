use serde::Deserialize;

use crate::dome::DomeParams;
use crate::error::ViewerError;

/// Viewer settings. Every field has a default, so the page can pass a
/// partial JSON object or nothing at all.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub dome_segments: u32,
    pub dome_radius: f32,
    pub dome_max_theta: f32,
    /// Camera translation per key press, world units.
    pub move_step: f32,
    /// Camera yaw per key press, degrees.
    pub pan_step: f32,
    /// Degrees of yaw per pixel of horizontal mouse drag.
    pub mouse_pan_scale: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub clear_color: [f32; 4],
    pub log_level: String,
    /// Stop scheduling frames after this many seconds.
    pub stop_after_seconds: Option<f64>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let dome = DomeParams::default();
        Self {
            dome_segments: dome.segments,
            dome_radius: dome.radius,
            dome_max_theta: dome.max_theta,
            move_step: 0.2,
            pan_step: 5.0,
            mouse_pan_scale: 0.5,
            fov_degrees: 60.0,
            near: 0.1,
            far: 100.0,
            clear_color: [0.2, 0.2, 0.3, 1.0],
            log_level: "info".to_string(),
            stop_after_seconds: None,
        }
    }
}

impl ViewerConfig {
    /// Parses a JSON object; blank input yields the defaults.
    pub fn from_json(json: &str) -> Result<Self, ViewerError> {
        let config: ViewerConfig = if json.trim().is_empty() {
            ViewerConfig::default()
        } else {
            serde_json::from_str(json)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn dome_params(&self) -> DomeParams {
        DomeParams {
            segments: self.dome_segments,
            radius: self.dome_radius,
            max_theta: self.dome_max_theta,
        }
    }

    pub fn log_level(&self) -> Result<log::Level, ViewerError> {
        self.log_level
            .parse()
            .map_err(|_| ViewerError::Config(format!("unknown log level '{}'", self.log_level)))
    }

    pub fn validate(&self) -> Result<(), ViewerError> {
        self.dome_params().validate()?;
        self.log_level()?;
        if !(self.move_step > 0.0) {
            return Err(ViewerError::Config(format!("move_step must be positive, got {}", self.move_step)));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(ViewerError::Config(format!("fov_degrees out of range: {}", self.fov_degrees)));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(ViewerError::Config(format!(
                "clip planes must satisfy 0 < near < far, got {} and {}",
                self.near, self.far
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_gives_defaults() {
        assert_eq!(ViewerConfig::from_json("").unwrap(), ViewerConfig::default());
        assert_eq!(ViewerConfig::from_json("  \n").unwrap(), ViewerConfig::default());
    }

    #[test]
    fn partial_object_overrides_fields() {
        let config = ViewerConfig::from_json(r#"{"dome_segments": 12, "stop_after_seconds": 5.0}"#).unwrap();
        assert_eq!(config.dome_segments, 12);
        assert_eq!(config.stop_after_seconds, Some(5.0));
        assert_eq!(config.move_step, ViewerConfig::default().move_step);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            ViewerConfig::from_json(r#"{"dome_segments": 7}"#),
            Err(ViewerError::Geometry(_))
        ));
        assert!(matches!(ViewerConfig::from_json(r#"{"near": 5.0, "far": 1.0}"#), Err(ViewerError::Config(_))));
        assert!(matches!(ViewerConfig::from_json(r#"{"log_level": "loud"}"#), Err(ViewerError::Config(_))));
        assert!(matches!(ViewerConfig::from_json(r#"{"segmnts": 4}"#), Err(ViewerError::Config(_))));
        assert!(ViewerConfig::from_json("{").is_err());
    }

    #[test]
    fn log_level_parses() {
        let config = ViewerConfig {
            log_level: "debug".into(),
            ..ViewerConfig::default()
        };
        assert_eq!(config.log_level().unwrap(), log::Level::Debug);
    }
}
