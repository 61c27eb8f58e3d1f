//! Imagery source kinds

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How often a source publishes a composite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// One composite per calendar month
    Monthly,
    /// Three composites per calendar month (1-10, 11-20, 21-end)
    SubMonthly,
}

/// Imagery provider category
///
/// Determines the date partitioning cadence, the pixel scale and the
/// date label format used in file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Planet NICFI monthly basemaps
    Nicfi,
    /// Sentinel-2 surface reflectance
    Sentinel,
}

impl SourceKind {
    /// All supported kinds
    pub const ALL: [SourceKind; 2] = [SourceKind::Nicfi, SourceKind::Sentinel];

    /// Publication cadence of this source
    pub fn cadence(&self) -> Cadence {
        match self {
            SourceKind::Nicfi => Cadence::Monthly,
            SourceKind::Sentinel => Cadence::SubMonthly,
        }
    }

    /// Default export scale in meters (finer for higher-resolution sources)
    pub fn default_scale_meters(&self) -> u32 {
        match self {
            SourceKind::Nicfi => 5,
            SourceKind::Sentinel => 10,
        }
    }

    /// Default image collection id
    pub fn default_collection_id(&self) -> &'static str {
        match self {
            SourceKind::Nicfi => "projects/planet-nicfi/assets/basemaps/americas",
            SourceKind::Sentinel => "COPERNICUS/S2_SR_HARMONIZED",
        }
    }

    /// Lowercase name used in file names and config keys
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Nicfi => "nicfi",
            SourceKind::Sentinel => "sentinel",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nicfi" => Ok(SourceKind::Nicfi),
            "sentinel" => Ok(SourceKind::Sentinel),
            other => Err(format!(
                "Unsupported source kind '{other}'. Must be one of: nicfi, sentinel"
            )),
        }
    }
}
