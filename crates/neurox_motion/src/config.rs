//! Motion configuration (motion.toml)
//!
//! Every section is optional; missing keys take the engine defaults.
//!
//! ```toml
//! [tween]
//! duration_ms = 300
//! easing = "easeOut"
//!
//! [spring]
//! stiffness = 100.0
//! damping = 10.0
//!
//! [gesture]
//! swipe_min_distance = 50.0
//! ```

use crate::easing::Easing;
use crate::error::ConfigError;
use crate::spring::SpringConfig;
use neurox_core::GestureThresholds;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level motion configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MotionConfig {
    pub tween: TweenDefaults,
    pub spring: SpringConfig,
    pub frame: FrameConfig,
    pub gesture: GestureThresholds,
    pub parallax: ParallaxDefaults,
}

impl MotionConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), "loaded motion config");
        Ok(config)
    }
}

/// Defaults applied to tweens that do not override them
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TweenDefaults {
    pub duration_ms: f64,
    pub easing: Easing,
    pub delay_ms: f64,
}

impl Default for TweenDefaults {
    fn default() -> Self {
        Self {
            duration_ms: 300.0,
            easing: Easing::EaseOut,
            delay_ms: 0.0,
        }
    }
}

/// Frame pacing for drivers that own a frame loop
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FrameConfig {
    pub target_fps: u32,
}

impl FrameConfig {
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.target_fps.max(1) as f64
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { target_fps: 60 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ParallaxDefaults {
    pub speed: f32,
}

impl Default for ParallaxDefaults {
    fn default() -> Self {
        Self { speed: 0.5 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = MotionConfig::from_toml_str("").unwrap();
        assert_eq!(config, MotionConfig::default());
        assert_eq!(config.tween.duration_ms, 300.0);
        assert_eq!(config.spring.stiffness, 100.0);
        assert_eq!(config.spring.precision, 0.01);
        assert_eq!(config.gesture.swipe_min_distance, 50.0);
    }

    #[test]
    fn test_partial_sections_merge_with_defaults() {
        let config = MotionConfig::from_toml_str(
            r#"
            [tween]
            easing = "easeInOut"

            [spring]
            damping = 26.0

            [frame]
            target_fps = 120
            "#,
        )
        .unwrap();

        assert_eq!(config.tween.easing, Easing::EaseInOut);
        assert_eq!(config.tween.duration_ms, 300.0);
        assert_eq!(config.spring.damping, 26.0);
        assert_eq!(config.spring.mass, 1.0);
        assert!((config.frame.frame_interval_ms() - 8.333).abs() < 0.01);
    }

    #[test]
    fn test_unknown_easing_name_falls_back() {
        let config = MotionConfig::from_toml_str("[tween]\neasing = \"jiggle\"").unwrap();
        assert_eq!(config.tween.easing, Easing::EaseOut);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let err = MotionConfig::from_toml_str("[tween\nduration_ms = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = MotionConfig::load("/definitely/not/here/motion.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
