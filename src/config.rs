//! Configuration and insert options.
//!
//! [`Config`] is serializable so it can be loaded from JSON (or TOML with the
//! `toml` feature). The defaults describe the square plane `[-10000, 10000]²`
//! searched with at most 16 bits of precision per axis.

use crate::compute::geohash::GeoPlane;
use crate::error::{Result, ZSetError};
use serde::de::Error;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Axis-aligned bounds of the indexed plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl PlaneBounds {
    /// The default square, `[-10000, 10000]` on both axes.
    pub const DEFAULT: PlaneBounds = PlaneBounds {
        x_min: -10000.0,
        x_max: 10000.0,
        y_min: -10000.0,
        y_max: 10000.0,
    };

    /// Create bounds, rejecting empty or non-finite ranges.
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<Self> {
        let bounds = Self {
            x_min,
            x_max,
            y_min,
            y_max,
        };
        bounds.validate().map_err(ZSetError::Config)?;
        Ok(bounds)
    }

    /// Returns `true` if `(x, y)` lies inside the bounds (edges included).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.x_min..=self.x_max).contains(&x) && (self.y_min..=self.y_max).contains(&y)
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let all_finite = [self.x_min, self.x_max, self.y_min, self.y_max]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err("Plane bounds must be finite".to_string());
        }
        if self.x_min >= self.x_max || self.y_min >= self.y_max {
            return Err(format!(
                "Plane bounds are empty: x [{}, {}], y [{}, {}]",
                self.x_min, self.x_max, self.y_min, self.y_max
            ));
        }
        Ok(())
    }
}

impl Default for PlaneBounds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Registry configuration.
///
/// # Example
///
/// ```rust
/// use zgeo::Config;
///
/// let json = r#"{
///     "step_max": 12,
///     "debug_cells": true
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.step_max, 12);
/// assert_eq!(config.reference_radius, 10000.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Bounds of the indexed plane
    #[serde(default)]
    pub plane: PlaneBounds,

    /// Bits of precision per axis used for element scores (1-26, default: 16)
    #[serde(default = "Config::default_step_max")]
    pub step_max: u8,

    /// Radius at which the coarsest precision is selected (default: 10000)
    #[serde(default = "Config::default_reference_radius")]
    pub reference_radius: f64,

    /// Log the box of every cell visited by a radius query
    #[serde(default)]
    pub debug_cells: bool,
}

impl Config {
    const fn default_step_max() -> u8 {
        16
    }

    const fn default_reference_radius() -> f64 {
        10000.0
    }

    pub fn with_plane(mut self, plane: PlaneBounds) -> Self {
        self.plane = plane;
        self
    }

    pub fn with_step_max(mut self, step_max: u8) -> Self {
        assert!(
            (1..=GeoPlane::MAX_SCORE_STEP).contains(&step_max),
            "Step max must be between 1 and 26"
        );
        self.step_max = step_max;
        self
    }

    pub fn with_reference_radius(mut self, radius: f64) -> Self {
        assert!(
            radius.is_finite() && radius > 0.0,
            "Reference radius must be positive"
        );
        self.reference_radius = radius;
        self
    }

    pub fn with_debug_cells(mut self, enabled: bool) -> Self {
        self.debug_cells = enabled;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        self.plane.validate()?;

        if !(1..=GeoPlane::MAX_SCORE_STEP).contains(&self.step_max) {
            return Err(format!(
                "Step max must be between 1 and {}, got {}",
                GeoPlane::MAX_SCORE_STEP,
                self.step_max
            ));
        }

        if !self.reference_radius.is_finite() || self.reference_radius <= 0.0 {
            return Err(format!(
                "Reference radius must be positive, got {}",
                self.reference_radius
            ));
        }

        Ok(())
    }

    /// The geohash plane described by this configuration.
    pub fn geo_plane(&self) -> GeoPlane {
        GeoPlane {
            bounds: self.plane,
            step_max: self.step_max,
            reference_radius: self.reference_radius,
        }
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load a configuration file. Files ending in `.toml` are parsed as TOML
    /// (requires the `toml` feature), everything else as JSON.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            #[cfg(feature = "toml")]
            {
                return Self::from_toml(&contents).map_err(|e| ZSetError::Config(e.to_string()));
            }
            #[cfg(not(feature = "toml"))]
            {
                return Err(ZSetError::Config(format!(
                    "Cannot load {}: TOML support requires the `toml` feature",
                    path.display()
                )));
            }
        }

        Ok(Self::from_json(&contents)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plane: PlaneBounds::default(),
            step_max: Self::default_step_max(),
            reference_radius: Self::default_reference_radius(),
            debug_cells: false,
        }
    }
}

/// Modifiers for a sorted-set add.
///
/// Per-element behavior is governed by `nx`, `xx` and `incr`. `ch` is kept
/// so flag words round-trip; batch calls always report added plus updated
/// elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddOptions {
    /// Only add new elements, never update existing ones
    pub nx: bool,
    /// Only update existing elements, never add new ones
    pub xx: bool,
    /// Add the given score to the current one instead of replacing it
    pub incr: bool,
    /// Count-changed flag; batch counts already include updates
    pub ch: bool,
}

impl AddOptions {
    /// Increment the score instead of setting it.
    pub const FLAG_INCR: u32 = 1 << 0;
    /// Don't touch elements already existing.
    pub const FLAG_NX: u32 = 1 << 1;
    /// Only touch elements already existing.
    pub const FLAG_XX: u32 = 1 << 2;
    /// Return the number of elements added or updated.
    pub const FLAG_CH: u32 = 1 << 16;

    pub fn nx() -> Self {
        Self {
            nx: true,
            ..Self::default()
        }
    }

    pub fn xx() -> Self {
        Self {
            xx: true,
            ..Self::default()
        }
    }

    pub fn incr() -> Self {
        Self {
            incr: true,
            ..Self::default()
        }
    }

    pub fn with_ch(mut self) -> Self {
        self.ch = true;
        self
    }

    /// Decode a flag word built from the `FLAG_*` constants.
    pub fn from_flags(flags: u32) -> Self {
        let has = |flag: u32| flags & flag == flag;
        Self {
            nx: has(Self::FLAG_NX),
            xx: has(Self::FLAG_XX),
            incr: has(Self::FLAG_INCR),
            ch: has(Self::FLAG_CH),
        }
    }

    pub fn to_flags(&self) -> u32 {
        let mut flags = 0;
        if self.incr {
            flags |= Self::FLAG_INCR;
        }
        if self.nx {
            flags |= Self::FLAG_NX;
        }
        if self.xx {
            flags |= Self::FLAG_XX;
        }
        if self.ch {
            flags |= Self::FLAG_CH;
        }
        flags
    }
}
