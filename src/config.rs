use std::path::Path;

use anyhow::{Context, ensure};
use serde::{Deserialize, Serialize};

use crate::height::HeightRange;

/// Engine-wide settings, usually read from a `terrain.toml`.
///
/// Every key is optional:
///
/// ```toml
/// tile-size = 32
/// height-scale = 1.0
/// min-height = 0
/// max-height = 255
/// empty-terrain = "empty"
/// background-terrain = "grass"
/// ```
#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EngineConfig {
    /// Edge length of a tile in pixels.
    pub tile_size: u32,
    /// Pixels of on-screen displacement per height unit.
    pub height_scale: f32,
    pub min_height: u8,
    pub max_height: u8,
    /// Id of the reserved "no terrain" entry.
    pub empty_terrain: String,
    /// Terrain filled into newly created vertices. The empty terrain if unset.
    pub background_terrain: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            tile_size: 32,
            height_scale: 1.0,
            min_height: u8::MIN,
            max_height: u8::MAX,
            empty_terrain: "empty".to_string(),
            background_terrain: None,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let config: EngineConfig = toml::from_str(s).context("Failed to parse engine config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("In {}", path.display()))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.tile_size > 0, "tile-size must be positive");
        ensure!(
            self.height_scale.is_finite() && self.height_scale >= 0.0,
            "height-scale must be a non-negative number, got {}",
            self.height_scale
        );
        ensure!(
            self.min_height <= self.max_height,
            "min-height ({}) exceeds max-height ({})",
            self.min_height,
            self.max_height
        );
        ensure!(!self.empty_terrain.is_empty(), "empty-terrain must not be blank");
        Ok(())
    }

    pub fn height_range(&self) -> HeightRange {
        HeightRange { min: self.min_height, max: self.max_height }
    }
}

#[cfg(test)]
mod tests {
    use assertables::*;

    use super::*;

    #[test]
    fn defaults_when_empty() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = EngineConfig::from_toml_str(
            r#"
            tile-size = 16
            max-height = 100
            background-terrain = "grass"
            "#,
        )
        .unwrap();

        assert_eq!(config.tile_size, 16);
        assert_eq!(config.height_range(), HeightRange { min: 0, max: 100 });
        assert_eq!(config.background_terrain.as_deref(), Some("grass"));
        assert_eq!(config.empty_terrain, "empty");
    }

    #[test]
    fn rejects_inverted_range() {
        let err = EngineConfig::from_toml_str("min-height = 10\nmax-height = 5").unwrap_err();
        assert_contains!(err.to_string(), "min-height");
    }
}
