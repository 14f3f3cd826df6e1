use phf::{Map, phf_map};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Covalent radii (Angstrom) for bond perception, following the rule set of
/// Zhang et al., J Cheminform 4, 26 (2012). Elements without a tabulated
/// radius in that rule set are absent and fail lookup.
static COVALENT_RADII: Map<&'static str, f64> = phf_map! {
    "H" => 0.23, "He" => 0.93, "Li" => 0.68, "Be" => 0.35, "B" => 0.83,
    "C" => 0.68, "N" => 0.68, "O" => 0.68, "F" => 0.64, "Ne" => 1.12,
    "Na" => 0.97, "Mg" => 1.10, "Al" => 1.35, "Si" => 1.20, "P" => 1.05,
    "S" => 1.02, "Cl" => 0.99, "Ar" => 1.57, "K" => 1.33, "Ca" => 0.99,
    "Sc" => 1.44, "Ti" => 1.47, "V" => 1.33, "Cr" => 1.35, "Mn" => 1.35,
    "Fe" => 1.34, "Co" => 1.33, "Ni" => 1.50, "Cu" => 1.52, "Zn" => 1.45,
    "Ga" => 1.22, "Ge" => 1.17, "As" => 1.21, "Se" => 1.22, "Br" => 1.21,
    "Kr" => 1.91, "Rb" => 1.47, "Sr" => 1.12, "Y" => 1.78, "Zr" => 1.56,
    "Nb" => 1.48, "Mo" => 1.47, "Tc" => 1.35, "Ru" => 1.40, "Rh" => 1.45,
    "Pd" => 1.50, "Ag" => 1.59, "Cd" => 1.69, "In" => 1.63, "Sn" => 1.46,
    "Te" => 1.47, "I" => 1.40, "Xe" => 1.98, "Cs" => 1.67, "Ba" => 1.34,
    "La" => 1.87, "Ce" => 1.83, "Pr" => 1.82, "Nd" => 1.81, "Pm" => 1.80,
    "Sm" => 1.80, "Eu" => 1.99, "Gd" => 1.79, "Tb" => 1.76, "Dy" => 1.75,
    "Ho" => 1.74, "Er" => 1.73, "Tm" => 1.72,
};

/// Atomic-number aliases for every element with a tabulated radius.
static ATOMIC_NUMBERS: Map<&'static str, &'static str> = phf_map! {
    "1" => "H", "2" => "He", "3" => "Li", "4" => "Be", "5" => "B",
    "6" => "C", "7" => "N", "8" => "O", "9" => "F", "10" => "Ne",
    "11" => "Na", "12" => "Mg", "13" => "Al", "14" => "Si", "15" => "P",
    "16" => "S", "17" => "Cl", "18" => "Ar", "19" => "K", "20" => "Ca",
    "21" => "Sc", "22" => "Ti", "23" => "V", "24" => "Cr", "25" => "Mn",
    "26" => "Fe", "27" => "Co", "28" => "Ni", "29" => "Cu", "30" => "Zn",
    "31" => "Ga", "32" => "Ge", "33" => "As", "34" => "Se", "35" => "Br",
    "36" => "Kr", "37" => "Rb", "38" => "Sr", "39" => "Y", "40" => "Zr",
    "41" => "Nb", "42" => "Mo", "43" => "Tc", "44" => "Ru", "45" => "Rh",
    "46" => "Pd", "47" => "Ag", "48" => "Cd", "49" => "In", "50" => "Sn",
    "52" => "Te", "53" => "I", "54" => "Xe", "55" => "Cs", "56" => "Ba",
    "57" => "La", "58" => "Ce", "59" => "Pr", "60" => "Nd", "61" => "Pm",
    "62" => "Sm", "63" => "Eu", "64" => "Gd", "65" => "Tb", "66" => "Dy",
    "67" => "Ho", "68" => "Er", "69" => "Tm",
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ElementError {
    #[error("Unknown element label '{label}': no covalent radius available")]
    UnknownElement { label: String },
}

/// Normalizes a label to its canonical symbol: atomic-number strings are
/// translated, symbols are case-folded (`"cl"` -> `"Cl"`).
fn canonical_symbol(label: &str) -> Option<&'static str> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return ATOMIC_NUMBERS.get(trimmed).copied();
    }
    let mut chars = trimmed.chars();
    let mut symbol = String::with_capacity(trimmed.len());
    symbol.extend(chars.next().map(|c| c.to_ascii_uppercase()));
    symbol.extend(chars.map(|c| c.to_ascii_lowercase()));
    COVALENT_RADII.get_entry(symbol.as_str()).map(|(k, _)| *k)
}

/// Looks up the builtin covalent radius for an element symbol or
/// atomic-number string, case-insensitively.
pub fn covalent_radius(label: &str) -> Result<f64, ElementError> {
    canonical_symbol(label)
        .and_then(|symbol| COVALENT_RADII.get(symbol).copied())
        .ok_or_else(|| ElementError::UnknownElement {
            label: label.to_string(),
        })
}

/// The radius table used by bond perception: the builtin covalent radii,
/// optionally overlaid with per-element overrides.
#[derive(Debug, Clone, Default)]
pub struct RadiusTable {
    overrides: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct RadiusTableFile {
    #[serde(default)]
    radii: HashMap<String, f64>,
}

#[derive(Debug, Error)]
pub enum RadiusTableLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Non-positive radius {radius} for element '{label}' in '{path}'")]
    NonPositiveRadius {
        path: String,
        label: String,
        radius: f64,
    },
}

impl RadiusTable {
    /// Loads per-element overrides from a TOML file with a `[radii]` table
    /// mapping element labels to radii in Angstrom.
    pub fn load(path: &Path) -> Result<Self, RadiusTableLoadError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| RadiusTableLoadError::Io {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
        let file: RadiusTableFile =
            toml::from_str(&content).map_err(|e| RadiusTableLoadError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
        let mut overrides = HashMap::with_capacity(file.radii.len());
        for (label, radius) in file.radii {
            if radius <= 0.0 {
                return Err(RadiusTableLoadError::NonPositiveRadius {
                    path: path.to_string_lossy().to_string(),
                    label,
                    radius,
                });
            }
            let key = canonical_symbol(&label)
                .map(str::to_string)
                .unwrap_or(label);
            overrides.insert(key, radius);
        }
        Ok(Self { overrides })
    }

    /// Resolves the radius for a label: overrides first, builtin table next.
    pub fn radius(&self, label: &str) -> Result<f64, ElementError> {
        if let Some(symbol) = canonical_symbol(label) {
            if let Some(&r) = self.overrides.get(symbol) {
                return Ok(r);
            }
        }
        if let Some(&r) = self.overrides.get(label.trim()) {
            return Ok(r);
        }
        covalent_radius(label)
    }
}
