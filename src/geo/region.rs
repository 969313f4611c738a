use crate::errors::ServerError;
use crate::geo::distance::LatLng;
use crate::geo::route::RouteDistance;

/// Request-scoped region a query is evaluated against. Exactly one variant
/// is active per request.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryRegion {
    /// Keep entities within `radius_km` of `center`.
    Circle { center: LatLng, radius_km: f64 },
    /// Keep entities inside the box. `sort_center` only orders results.
    Bounds {
        ne: LatLng,
        sw: LatLng,
        sort_center: LatLng,
    },
    /// Keep entities within `buffer_km` of the route. Each inner vec is one
    /// line in drawing order; `mode` picks vertex or segment distance.
    Corridor {
        lines: Vec<Vec<LatLng>>,
        buffer_km: f64,
        mode: RouteDistance,
    },
}

impl QueryRegion {
    pub fn circle(center: LatLng, radius_m: f64) -> Result<Self, ServerError> {
        ensure_point(&center, "center")?;
        ensure_positive(radius_m, "radius")?;
        Ok(QueryRegion::Circle {
            center,
            radius_km: radius_m / 1000.0,
        })
    }

    /// Box from its corners. Results are ordered by distance to `sort_center`
    /// when given, else to the box midpoint.
    ///
    /// Boxes crossing the antimeridian are not supported: the northeast corner
    /// must be at or north and east of the southwest one.
    pub fn bounds(ne: LatLng, sw: LatLng, sort_center: Option<LatLng>) -> Result<Self, ServerError> {
        ensure_point(&ne, "northeast corner")?;
        ensure_point(&sw, "southwest corner")?;
        if ne.lat < sw.lat {
            return Err(ServerError::BadRequest(format!(
                "neLat ({}) must not be south of swLat ({})",
                ne.lat, sw.lat
            )));
        }
        if ne.lng < sw.lng {
            return Err(ServerError::BadRequest(format!(
                "neLng ({}) must not be west of swLng ({})",
                ne.lng, sw.lng
            )));
        }
        let sort_center = match sort_center {
            Some(c) => {
                ensure_point(&c, "center")?;
                c
            }
            None => LatLng::new((ne.lat + sw.lat) / 2.0, (ne.lng + sw.lng) / 2.0),
        };
        Ok(QueryRegion::Bounds { ne, sw, sort_center })
    }

    pub fn corridor(lines: Vec<Vec<LatLng>>, buffer_m: f64, mode: RouteDistance) -> Result<Self, ServerError> {
        ensure_positive(buffer_m, "buffer_m")?;
        let lines: Vec<Vec<LatLng>> = lines.into_iter().filter(|l| !l.is_empty()).collect();
        if lines.is_empty() {
            return Err(ServerError::BadRequest("route geometry has no coordinates".into()));
        }
        for v in lines.iter().flatten() {
            ensure_point(v, "route vertex")?;
        }
        Ok(QueryRegion::Corridor {
            lines,
            buffer_km: buffer_m / 1000.0,
            mode,
        })
    }
}

/// Inclusive rectangular containment. No antimeridian wrapping.
pub fn in_bounds(p: &LatLng, ne: &LatLng, sw: &LatLng) -> bool {
    sw.lat <= p.lat && p.lat <= ne.lat && sw.lng <= p.lng && p.lng <= ne.lng
}

fn ensure_point(p: &LatLng, what: &str) -> Result<(), ServerError> {
    if p.is_finite() {
        Ok(())
    } else {
        Err(ServerError::BadRequest(format!("{what} must be finite coordinates")))
    }
}

fn ensure_positive(v: f64, what: &str) -> Result<(), ServerError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(ServerError::BadRequest(format!("{what} must be a positive number")))
    }
}
