use geojson::{Geometry, Value};
use serde::{Deserialize, Serialize};

use crate::errors::ServerError;
use crate::geo::distance::{distance_km, LatLng, EARTH_RADIUS_KM};

/// How distance to a route is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RouteDistance {
    /// Nearest route vertex. Cheap, underestimates closeness on sparse routes.
    #[default]
    Vertices,
    /// Nearest point on any segment.
    Segments,
}

/// Pulls the ordered vertex lines out of a `LineString` or `MultiLineString`.
/// GeoJSON positions are `[lng, lat, ..]`.
pub fn route_lines(geometry: &Geometry) -> Result<Vec<Vec<LatLng>>, ServerError> {
    match &geometry.value {
        Value::LineString(line) => Ok(vec![positions(line)?]),
        Value::MultiLineString(lines) => lines.iter().map(|l| positions(l)).collect(),
        other => Err(ServerError::BadRequest(format!(
            "route geometry must be LineString or MultiLineString, got {}",
            geometry_type(other)
        ))),
    }
}

fn geometry_type(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn positions(line: &[Vec<f64>]) -> Result<Vec<LatLng>, ServerError> {
    line.iter()
        .map(|pos| match pos.as_slice() {
            [lng, lat, ..] => Ok(LatLng::new(*lat, *lng)),
            _ => Err(ServerError::BadRequest(
                "route position needs longitude and latitude".into(),
            )),
        })
        .collect()
}

/// Minimum distance in km from `p` to the route.
pub fn distance_to_route_km(p: &LatLng, lines: &[Vec<LatLng>], mode: RouteDistance) -> f64 {
    match mode {
        RouteDistance::Vertices => lines
            .iter()
            .flatten()
            .map(|v| distance_km(p.lat, p.lng, v.lat, v.lng))
            .fold(f64::INFINITY, f64::min),
        RouteDistance::Segments => lines
            .iter()
            .map(|line| distance_to_line_km(p, line))
            .fold(f64::INFINITY, f64::min),
    }
}

fn distance_to_line_km(p: &LatLng, line: &[LatLng]) -> f64 {
    match line {
        [] => f64::INFINITY,
        [only] => p.distance_km(only),
        _ => line
            .windows(2)
            .map(|w| distance_to_segment_km(p, &w[0], &w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Projects `p` onto segment `a`-`b` in a local equirectangular frame centered
/// on `p`, clamps to the segment, then measures the Haversine distance to the
/// projected point.
fn distance_to_segment_km(p: &LatLng, a: &LatLng, b: &LatLng) -> f64 {
    let cos_lat = p.lat.to_radians().cos();
    let to_xy = |q: &LatLng| {
        (
            (q.lng - p.lng).to_radians() * cos_lat * EARTH_RADIUS_KM,
            (q.lat - p.lat).to_radians() * EARTH_RADIUS_KM,
        )
    };
    let (ax, ay) = to_xy(a);
    let (bx, by) = to_xy(b);
    let (dx, dy) = (bx - ax, by - ay);
    let len2 = dx * dx + dy * dy;

    let t = if len2 == 0.0 {
        0.0
    } else {
        ((-ax * dx - ay * dy) / len2).clamp(0.0, 1.0)
    };
    let closest = LatLng::new(a.lat + t * (b.lat - a.lat), a.lng + t * (b.lng - a.lng));
    p.distance_km(&closest)
}
