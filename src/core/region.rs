//! Export region sizing
//!
//! Small features are exported with context around them so the clipped image
//! is still useful; large ones are exported as-is.
//!
//! | Feature area `A` | Footprint |
//! |---|---|
//! | `A < 1 ha` | 4 ha square on the centroid |
//! | `1 <= A < 4 ha` | 10 ha square on the centroid |
//! | `4 <= A < 10 ha` | `5 * A` ha square on the centroid |
//! | `A >= 10 ha` | the feature's own bounds |
//!
//! Squares are built by buffering the centroid by half the target side and
//! taking the bounds of that disc.

use crate::domain::geometry::{Bounds, Geometry, Position, SQM_PER_HECTARE};
use crate::domain::{Cadence, DateInterval, ExportRegion, SizeTier, SourceKind};

/// Features under this many hectares get the tiny footprint
pub const TINY_AREA_THRESHOLD_HA: f64 = 1.0;
/// Features under this many hectares get the small footprint
pub const SMALL_AREA_THRESHOLD_HA: f64 = 4.0;
/// Features under this many hectares get a scaled footprint
pub const MEDIUM_AREA_THRESHOLD_HA: f64 = 10.0;

/// Footprint for tiny features, square meters
pub const TINY_EXPORT_SIZE_SQM: f64 = 4.0 * SQM_PER_HECTARE;
/// Footprint for small features, square meters
pub const SMALL_EXPORT_SIZE_SQM: f64 = 10.0 * SQM_PER_HECTARE;
/// Footprint multiplier for medium features
pub const MEDIUM_MULTIPLIER: f64 = 5.0;

/// Compute the export region for a feature geometry
///
/// Returns the region and the feature's true area in hectares. Empty or
/// degenerate geometry has area 0 and falls in the tiny tier.
pub fn size_region(geometry: &Geometry) -> (ExportRegion, f64) {
    let area_ha = geometry.area_hectares();

    let target_sqm = if area_ha < TINY_AREA_THRESHOLD_HA {
        Some((SizeTier::Tiny, TINY_EXPORT_SIZE_SQM))
    } else if area_ha < SMALL_AREA_THRESHOLD_HA {
        Some((SizeTier::Small, SMALL_EXPORT_SIZE_SQM))
    } else if area_ha < MEDIUM_AREA_THRESHOLD_HA {
        Some((SizeTier::Medium, area_ha * SQM_PER_HECTARE * MEDIUM_MULTIPLIER))
    } else {
        None
    };

    let (tier, bounds) = match target_sqm {
        Some((tier, target)) => {
            let center = geometry
                .centroid()
                .or_else(|| geometry.bounds().map(|b| b.center()))
                .unwrap_or(Position::new(0.0, 0.0));
            let half_side = target.sqrt() / 2.0;
            (tier, Bounds::around(center, half_side))
        }
        None => {
            // Large tier implies non-empty geometry
            let bounds = geometry.bounds().unwrap_or(Bounds::new(0.0, 0.0, 0.0, 0.0));
            (SizeTier::Large, bounds)
        }
    };

    (
        ExportRegion {
            bounds,
            source_area_ha: area_ha,
            tier,
        },
        area_ha,
    )
}

/// Source-specific label for an interval, used only in names
///
/// Monthly sources use `YYYY-MM`; sub-monthly sources use `YYYYMMDD`.
pub fn date_label(interval: &DateInterval, source: SourceKind) -> String {
    match source.cadence() {
        Cadence::Monthly => interval.start().format("%Y-%m").to_string(),
        Cadence::SubMonthly => interval.start().format("%Y%m%d").to_string(),
    }
}
