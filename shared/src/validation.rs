//! Request input checks shared by the HTTP handlers and the browser

/// Resolve coordinates for the plain weather endpoint.
///
/// Missing, zero and non-finite values are all treated as absent, so a
/// request at exactly (0, 0) is rejected here. No geographic bounds check is
/// applied.
pub fn require_coordinates(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<(f64, f64), &'static str> {
    match (truthy(latitude), truthy(longitude)) {
        (Some(lat), Some(lon)) => Ok((lat, lon)),
        _ => Err("Latitude and longitude required"),
    }
}

/// Coordinates for the combined soil/weather endpoint, defaulting absent
/// values instead of rejecting them
pub fn coordinates_or_default(
    latitude: Option<f64>,
    longitude: Option<f64>,
    default: (f64, f64),
) -> (f64, f64) {
    (
        latitude.filter(|v| v.is_finite()).unwrap_or(default.0),
        longitude.filter(|v| v.is_finite()).unwrap_or(default.1),
    )
}

/// Parse a query-string coordinate the lenient way browsers send them
pub fn parse_coordinate(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
}

fn truthy(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

/// Clamp a requested history page size
pub fn normalize_limit(limit: Option<usize>, default: usize, max: usize) -> usize {
    match limit {
        Some(0) | None => default.min(max),
        Some(n) => n.min(max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_coordinates() {
        assert_eq!(require_coordinates(Some(17.38), Some(78.48)), Ok((17.38, 78.48)));
        assert!(require_coordinates(None, Some(78.48)).is_err());
        assert!(require_coordinates(Some(0.0), Some(78.48)).is_err());
        assert!(require_coordinates(Some(f64::NAN), Some(78.48)).is_err());
    }

    #[test]
    fn test_coordinates_or_default() {
        assert_eq!(coordinates_or_default(None, None, (0.0, 0.0)), (0.0, 0.0));
        assert_eq!(coordinates_or_default(Some(12.5), None, (0.0, 0.0)), (12.5, 0.0));
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate(Some(" 17.5 ")), Some(17.5));
        assert_eq!(parse_coordinate(Some("abc")), None);
        assert_eq!(parse_coordinate(None), None);
    }

    #[test]
    fn test_normalize_limit() {
        assert_eq!(normalize_limit(None, 20, 100), 20);
        assert_eq!(normalize_limit(Some(0), 20, 100), 20);
        assert_eq!(normalize_limit(Some(5), 20, 100), 5);
        assert_eq!(normalize_limit(Some(500), 20, 100), 100);
    }
}
