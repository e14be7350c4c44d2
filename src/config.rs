//! Engine configuration
//!
//! Every field has a default, so a config file only needs the values it
//! changes.

use crate::constants::{layout, snapshot, widget};
use crate::error::NodeResult;
use crate::nodes::connections::CompatibilityRules;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Pixel metrics used by the reflow engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub header_height: f32,
    pub top_padding: f32,
    pub bottom_padding: f32,
    pub min_available_height: f32,
    pub default_min_spacing: f32,
    pub edge_offset: f32,
    pub port_size: f32,
    pub default_width: f32,
    pub default_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            header_height: layout::HEADER_HEIGHT,
            top_padding: layout::TOP_PADDING,
            bottom_padding: layout::BOTTOM_PADDING,
            min_available_height: layout::MIN_AVAILABLE_HEIGHT,
            default_min_spacing: layout::DEFAULT_MIN_SPACING,
            edge_offset: layout::EDGE_OFFSET,
            port_size: layout::PORT_SIZE,
            default_width: widget::DEFAULT_WIDTH,
            default_height: widget::DEFAULT_HEIGHT,
        }
    }
}

/// Top-level configuration handed to the canvas
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub layout: LayoutConfig,
    pub compatibility: CompatibilityRules,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> NodeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> NodeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        debug!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Default config file location, `<config_dir>/fleetwright/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("fleetwright").join("config.json"))
    }

    /// Loads from `$FLEETWRIGHT_CONFIG`, then the default path, then built-in defaults
    ///
    /// A file that exists but fails to parse is logged and skipped.
    pub fn load_or_default() -> Self {
        let candidates = std::env::var_os(snapshot::CONFIG_ENV)
            .map(PathBuf::from)
            .into_iter()
            .chain(Self::default_path());

        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::load(&path) {
                Ok(config) => return config,
                Err(error) => warn!("Ignoring config {}: {}", path.display(), error),
            }
        }
        Self::default()
    }
}
