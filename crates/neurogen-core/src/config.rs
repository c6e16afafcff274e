use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Filter used when a source map must be rescaled to a target resolution.
///
/// The packer resamples every source independently, so the filter must be
/// consistent across one packing run; it is therefore part of the engine
/// configuration rather than a per-source option.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
    Nearest,
    Bilinear,
}

impl FromStr for ResampleFilter {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "bilinear" => Ok(Self::Bilinear),
            _ => Err(()),
        }
    }
}

/// Engine configuration: mask output resolution, resampling filter,
/// default normal-map strength, and the export file prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Packed mask map output width in pixels.
    pub mask_width: u32,
    /// Packed mask map output height in pixels.
    pub mask_height: u32,
    /// Filter for reconciling source maps to a target resolution.
    #[serde(default = "default_filter")]
    pub filter: ResampleFilter,
    /// Default bump strength for normal map synthesis. Must be > 0.
    #[serde(default = "default_strength")]
    pub normal_strength: f32,
    /// Filename prefix for exported maps (`{prefix}_{id}_{suffix}.png`).
    #[serde(default = "default_prefix")]
    pub export_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mask_width: 1024,
            mask_height: 1024,
            filter: default_filter(),
            normal_strength: default_strength(),
            export_prefix: default_prefix(),
        }
    }
}

impl EngineConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::NeuroGenError;

        if self.mask_width == 0 || self.mask_height == 0 {
            return Err(NeuroGenError::InvalidParameter(format!(
                "mask resolution must be positive, got {}x{}",
                self.mask_width, self.mask_height
            )));
        }
        if !self.normal_strength.is_finite() || self.normal_strength <= 0.0 {
            return Err(NeuroGenError::InvalidParameter(format!(
                "normal_strength must be a positive finite number, got {}",
                self.normal_strength
            )));
        }
        if self.export_prefix.is_empty() || self.export_prefix.contains('_') {
            return Err(NeuroGenError::InvalidParameter(format!(
                "export_prefix must be non-empty and underscore-free, got {:?}",
                self.export_prefix
            )));
        }
        Ok(())
    }

    /// Create a fluent builder for `EngineConfig`.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }
}

fn default_filter() -> ResampleFilter {
    ResampleFilter::Bilinear
}
fn default_strength() -> f32 {
    2.0
}
fn default_prefix() -> String {
    "neurogen".into()
}

/// Builder for `EngineConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct EngineConfigBuilder {
    cfg: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: EngineConfig::default(),
        }
    }
    pub fn mask_dimensions(mut self, w: u32, h: u32) -> Self {
        self.cfg.mask_width = w;
        self.cfg.mask_height = h;
        self
    }
    pub fn filter(mut self, v: ResampleFilter) -> Self {
        self.cfg.filter = v;
        self
    }
    pub fn normal_strength(mut self, v: f32) -> Self {
        self.cfg.normal_strength = v;
        self
    }
    pub fn export_prefix(mut self, v: impl Into<String>) -> Self {
        self.cfg.export_prefix = v.into();
        self
    }
    pub fn build(self) -> EngineConfig {
        self.cfg
    }
}
