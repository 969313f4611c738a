use tracing::debug;

use crate::geo::distance::LatLng;
use crate::geo::region::{in_bounds, QueryRegion};
use crate::geo::route::distance_to_route_km;

/// Anything with an optional position can be spatially filtered.
pub trait Located {
    fn coords(&self) -> Option<LatLng>;
}

/// An entity that matched, with the distance used for ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub item: T,
    pub position: LatLng,
    pub distance_km: f64,
}

#[derive(Debug, Clone)]
pub struct FilterOutcome<T> {
    /// Ascending by `distance_km`, at most `cap` long.
    pub matches: Vec<Ranked<T>>,
    /// Entities dropped because they had no (finite) coordinates.
    pub skipped_ungeocoded: usize,
}

/// Keeps the entities inside `region`, sorted by distance and truncated to `cap`.
///
/// Circle and corridor regions include by distance. Bounds include by the
/// rectangle but still sort radially from the region's sort center, so a
/// corner entity can rank after one just outside the circle it would imply.
pub fn filter<T, I>(entities: I, region: &QueryRegion, cap: usize) -> FilterOutcome<T>
where
    T: Located,
    I: IntoIterator<Item = T>,
{
    let mut skipped_ungeocoded = 0;
    let mut matches = Vec::new();

    for item in entities {
        let Some(position) = item.coords().filter(LatLng::is_finite) else {
            skipped_ungeocoded += 1;
            continue;
        };

        let kept = match region {
            QueryRegion::Circle { center, radius_km } => {
                let d = center.distance_km(&position);
                (d <= *radius_km).then_some(d)
            }
            QueryRegion::Bounds { ne, sw, sort_center } => {
                in_bounds(&position, ne, sw).then(|| sort_center.distance_km(&position))
            }
            QueryRegion::Corridor {
                lines,
                buffer_km,
                mode,
            } => {
                let d = distance_to_route_km(&position, lines, *mode);
                (d <= *buffer_km).then_some(d)
            }
        };

        if let Some(distance_km) = kept {
            matches.push(Ranked {
                item,
                position,
                distance_km,
            });
        }
    }

    if skipped_ungeocoded > 0 {
        debug!(skipped_ungeocoded, "excluded entities without coordinates");
    }

    // Stable, so equal distances keep store order.
    matches.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    matches.truncate(cap);

    FilterOutcome {
        matches,
        skipped_ungeocoded,
    }
}
