use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Non-positive {name} tolerance: {value}")]
    NonPositiveTolerance { name: &'static str, value: f64 },

    #[error("Non-finite {name} tolerance: {value}")]
    NonFiniteTolerance { name: &'static str, value: f64 },

    #[error("Conflicting configuration: a bin origin is only meaningful in static mode")]
    OriginWithoutStaticMode,
}

/// How a static bin with several unprotected members picks its survivor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// The lowest-index member survives.
    #[default]
    LowestIndex,
    /// A uniformly random member survives, drawn from the caller's RNG.
    Random,
}

/// The removal policy applied to the descriptor population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FilterMode {
    /// One sweep over the combined bond + angle scalar with the summed
    /// tolerance.
    #[default]
    DynamicAll,
    /// Two independent sweeps, one per axis, each gated by the other axis;
    /// the removal sets are unioned.
    DynamicSeparate,
    /// Fixed-width bins over the combined scalar; each occupied bin keeps
    /// one representative.
    Static { tie_break: TieBreak },
}

/// A complete, validated description of one filtering run. Construct it
/// through [`FilterConfigBuilder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub mode: FilterMode,
    /// Bond-length tolerance in Angstrom. The filter compares squared
    /// lengths, so the applied bond threshold is this value squared.
    pub bond_tolerance: f64,
    /// Angle tolerance in degrees.
    pub angle_tolerance: f64,
    /// Conformer indices protected from removal.
    pub keep: Vec<usize>,
    /// Optional bin origin for static mode. The filter shifts it down by
    /// whole bin widths so it never exceeds the smallest descriptor.
    pub bin_origin: Option<f64>,
}

pub const DEFAULT_BOND_TOLERANCE: f64 = 0.1;
pub const DEFAULT_ANGLE_TOLERANCE: f64 = 0.1;

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            mode: FilterMode::DynamicAll,
            bond_tolerance: DEFAULT_BOND_TOLERANCE,
            angle_tolerance: DEFAULT_ANGLE_TOLERANCE,
            keep: Vec::new(),
            bin_origin: None,
        }
    }
}

impl FilterConfig {
    pub fn builder() -> FilterConfigBuilder {
        FilterConfigBuilder::new()
    }

    /// The bond-axis threshold the sweep applies, in Angstrom^2.
    #[inline]
    pub fn bond_tolerance_squared(&self) -> f64 {
        self.bond_tolerance * self.bond_tolerance
    }

    /// The threshold (and static bin width) on the combined scalar:
    /// squared bond tolerance plus angle tolerance.
    #[inline]
    pub fn combined_tolerance(&self) -> f64 {
        self.bond_tolerance_squared() + self.angle_tolerance
    }
}

/// Builder for [`FilterConfig`] with validation at `build` time.
#[derive(Debug, Clone, Default)]
pub struct FilterConfigBuilder {
    mode: FilterMode,
    bond_tolerance: Option<f64>,
    angle_tolerance: Option<f64>,
    keep: Vec<usize>,
    bin_origin: Option<f64>,
}

impl FilterConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: FilterMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn bond_tolerance(mut self, tolerance: f64) -> Self {
        self.bond_tolerance = Some(tolerance);
        self
    }

    pub fn angle_tolerance(mut self, tolerance: f64) -> Self {
        self.angle_tolerance = Some(tolerance);
        self
    }

    pub fn keep(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.keep.extend(indices);
        self
    }

    pub fn bin_origin(mut self, origin: f64) -> Self {
        self.bin_origin = Some(origin);
        self
    }

    pub fn build(self) -> Result<FilterConfig, ConfigError> {
        let bond_tolerance = self.bond_tolerance.unwrap_or(DEFAULT_BOND_TOLERANCE);
        let angle_tolerance = self.angle_tolerance.unwrap_or(DEFAULT_ANGLE_TOLERANCE);
        for (name, value) in [("bond", bond_tolerance), ("angle", angle_tolerance)] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteTolerance { name, value });
            }
            if value <= 0.0 {
                return Err(ConfigError::NonPositiveTolerance { name, value });
            }
        }
        if self.bin_origin.is_some() && !matches!(self.mode, FilterMode::Static { .. }) {
            return Err(ConfigError::OriginWithoutStaticMode);
        }
        let mut keep = self.keep;
        keep.sort_unstable();
        keep.dedup();
        Ok(FilterConfig {
            mode: self.mode,
            bond_tolerance,
            angle_tolerance,
            keep,
            bin_origin: self.bin_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_defaults() {
        let config = FilterConfig::builder().build().unwrap();
        assert_eq!(config.mode, FilterMode::DynamicAll);
        assert_eq!(config.bond_tolerance, DEFAULT_BOND_TOLERANCE);
        assert_eq!(config.angle_tolerance, DEFAULT_ANGLE_TOLERANCE);
        assert!(config.keep.is_empty());
        assert!(config.bin_origin.is_none());
    }

    #[test]
    fn combined_tolerance_squares_the_bond_axis() {
        let config = FilterConfig::builder()
            .bond_tolerance(0.2)
            .angle_tolerance(0.5)
            .build()
            .unwrap();
        assert!((config.combined_tolerance() - 0.54).abs() < 1e-12);
    }

    #[test]
    fn builder_rejects_non_positive_tolerances() {
        assert!(matches!(
            FilterConfig::builder().bond_tolerance(0.0).build(),
            Err(ConfigError::NonPositiveTolerance { name: "bond", .. })
        ));
        assert!(matches!(
            FilterConfig::builder().angle_tolerance(-1.0).build(),
            Err(ConfigError::NonPositiveTolerance { name: "angle", .. })
        ));
        assert!(matches!(
            FilterConfig::builder().bond_tolerance(f64::NAN).build(),
            Err(ConfigError::NonFiniteTolerance { .. })
        ));
    }

    #[test]
    fn builder_rejects_origin_outside_static_mode() {
        assert!(matches!(
            FilterConfig::builder().bin_origin(0.0).build(),
            Err(ConfigError::OriginWithoutStaticMode)
        ));
        assert!(
            FilterConfig::builder()
                .mode(FilterMode::Static {
                    tie_break: TieBreak::LowestIndex
                })
                .bin_origin(0.0)
                .build()
                .is_ok()
        );
    }

    #[test]
    fn builder_sorts_and_dedupes_the_keep_list() {
        let config = FilterConfig::builder()
            .keep([5, 1, 5, 3])
            .build()
            .unwrap();
        assert_eq!(config.keep, vec![1, 3, 5]);
    }
}
