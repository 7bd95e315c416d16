use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Guillotine split axis heuristics. After a placement the chosen free region
/// leaves a strip to the right and a strip below; the rule decides which of
/// the two gets the full extent of the region.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SplitRule {
    ShorterLeftoverAxis,
    LongerLeftoverAxis,
    MinimizeArea,
    MaximizeArea,
    ShorterAxis,
    LongerAxis,
}

impl FromStr for SplitRule {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slas" | "shorter_leftover_axis" => Ok(Self::ShorterLeftoverAxis),
            "llas" | "longer_leftover_axis" => Ok(Self::LongerLeftoverAxis),
            "minas" | "minimize_area" => Ok(Self::MinimizeArea),
            "maxas" | "maximize_area" => Ok(Self::MaximizeArea),
            "sas" | "shorter_axis" => Ok(Self::ShorterAxis),
            "las" | "longer_axis" => Ok(Self::LongerAxis),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackConfig {
    /// Maximum sheet width in pixels.
    #[serde(default = "default_max_dim")]
    pub max_width: u32,
    /// Maximum sheet height in pixels.
    #[serde(default = "default_max_dim")]
    pub max_height: u32,
    /// Pixels kept free between placed frames.
    #[serde(default)]
    pub padding: u32,
    /// Open additional sheets when the current ones are full.
    /// When false, running out of space is a `PackingOverflow`.
    #[serde(default = "default_true")]
    pub allow_multiple_sheets: bool,
    /// Allow 90° rotations for placements where they fit better.
    #[serde(default)]
    pub allow_rotation: bool,
    /// Round final sheet dimensions up to a power of two.
    #[serde(default)]
    pub power_of_two: bool,
    #[serde(default = "default_split")]
    pub split: SplitRule,
    /// Merge pixel-identical frames so they are packed once.
    #[serde(default = "default_true")]
    pub detect_duplicates: bool,
    /// Fingerprint and composite on the rayon pool when feature "parallel" is on.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_dim(),
            max_height: default_max_dim(),
            padding: 0,
            allow_multiple_sheets: true,
            allow_rotation: false,
            power_of_two: false,
            split: default_split(),
            detect_duplicates: true,
            parallel: false,
        }
    }
}

impl PackConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - Dimensions are zero
    /// - Padding leaves no usable space
    /// - `power_of_two` is requested with non power-of-two maxima
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::AtlasError;

        if self.max_width == 0 || self.max_height == 0 {
            return Err(AtlasError::InvalidDimensions {
                width: self.max_width,
                height: self.max_height,
            });
        }

        if self.padding >= self.max_width || self.padding >= self.max_height {
            return Err(AtlasError::InvalidConfig(format!(
                "padding ({}) leaves no usable space in a {}x{} sheet",
                self.padding, self.max_width, self.max_height
            )));
        }

        if self.power_of_two
            && (!self.max_width.is_power_of_two() || !self.max_height.is_power_of_two())
        {
            return Err(AtlasError::InvalidConfig(format!(
                "power_of_two requires power-of-two maxima, got {}x{}",
                self.max_width, self.max_height
            )));
        }

        Ok(())
    }
}

fn default_max_dim() -> u32 {
    1024
}
fn default_true() -> bool {
    true
}
fn default_split() -> SplitRule {
    SplitRule::ShorterLeftoverAxis
}

/// Builder for `PackConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackConfigBuilder {
    cfg: PackConfig,
}

impl PackConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackConfig::default(),
        }
    }
    pub fn with_max_dimensions(mut self, w: u32, h: u32) -> Self {
        self.cfg.max_width = w;
        self.cfg.max_height = h;
        self
    }
    pub fn padding(mut self, v: u32) -> Self {
        self.cfg.padding = v;
        self
    }
    pub fn allow_multiple_sheets(mut self, v: bool) -> Self {
        self.cfg.allow_multiple_sheets = v;
        self
    }
    pub fn allow_rotation(mut self, v: bool) -> Self {
        self.cfg.allow_rotation = v;
        self
    }
    pub fn pow2(mut self, v: bool) -> Self {
        self.cfg.power_of_two = v;
        self
    }
    pub fn split(mut self, v: SplitRule) -> Self {
        self.cfg.split = v;
        self
    }
    pub fn detect_duplicates(mut self, v: bool) -> Self {
        self.cfg.detect_duplicates = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> PackConfig {
        self.cfg
    }
}

impl PackConfig {
    /// Create a fluent builder for `PackConfig`.
    pub fn builder() -> PackConfigBuilder {
        PackConfigBuilder::new()
    }
}
