// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Global settings for the rendering system.

use super::api::MAX_FRAMEBUFFER_SIZE;
use super::error::ConfigError;
use super::queue::{QUEUE_CAPACITY, RECORD_HEADER_SIZE};
use crate::math::LinearRgba;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A collection of settings that configure the renderer at start-up.
///
/// Every field is optional in serialized form; missing fields take their
/// [`Default`] value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// The size in bytes of the render command arena.
    pub queue_capacity: usize,
    /// The color the main pass is cleared to.
    pub clear_color: LinearRgba,
    /// The initial viewport width in pixels.
    pub viewport_width: u32,
    /// The initial viewport height in pixels.
    pub viewport_height: u32,
    /// The largest framebuffer dimension accepted by a resize.
    pub max_framebuffer_size: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            queue_capacity: QUEUE_CAPACITY,
            clear_color: LinearRgba::new(0.1, 0.1, 0.1, 1.0),
            viewport_width: 1280,
            viewport_height: 720,
            max_framebuffer_size: MAX_FRAMEBUFFER_SIZE,
        }
    }
}

impl RenderSettings {
    /// Parses settings from RON text and validates them.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let settings: Self = ron::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads and parses a RON settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_ron_str(&text)?;
        log::info!("Loaded render settings from '{}'", path.display());
        Ok(settings)
    }

    /// Checks that the settings describe a usable renderer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity < RECORD_HEADER_SIZE {
            return Err(ConfigError::Invalid(format!(
                "queue_capacity must hold at least one {RECORD_HEADER_SIZE} byte record, got {}",
                self.queue_capacity
            )));
        }
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport_width, self.viewport_height
            )));
        }
        if self.max_framebuffer_size == 0 || self.max_framebuffer_size > MAX_FRAMEBUFFER_SIZE {
            return Err(ConfigError::Invalid(format!(
                "max_framebuffer_size must be in 1..={MAX_FRAMEBUFFER_SIZE}, got {}",
                self.max_framebuffer_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = RenderSettings::default();
        assert_eq!(settings.queue_capacity, 10 * 1024 * 1024);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_ron_uses_defaults_for_missing_fields() {
        let settings =
            RenderSettings::from_ron_str("(queue_capacity: 4096, viewport_width: 640)").unwrap();
        assert_eq!(settings.queue_capacity, 4096);
        assert_eq!(settings.viewport_width, 640);
        assert_eq!(settings.viewport_height, 720);
        assert_eq!(settings.clear_color, RenderSettings::default().clear_color);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let err = RenderSettings::from_ron_str("(viewport_height: 0)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = RenderSettings::from_ron_str("(queue_capacity: 8)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = RenderSettings::from_ron_str("(max_framebuffer_size: 9000)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_ron_is_a_parse_error() {
        let err = RenderSettings::from_ron_str("(queue_capacity: \"big\")").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = RenderSettings::load("/nonexistent/kiln/settings.ron").unwrap_err();
        match err {
            ConfigError::Io { path, .. } => {
                assert_eq!(path, Path::new("/nonexistent/kiln/settings.ron"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_settings_round_trip_through_ron() {
        let mut settings = RenderSettings::default();
        settings.clear_color = LinearRgba::rgb(0.2, 0.3, 0.4);
        let text = ron::to_string(&settings).unwrap();
        assert_eq!(RenderSettings::from_ron_str(&text).unwrap(), settings);
    }
}
