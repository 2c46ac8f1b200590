//! Great-circle geometry on a spherical Earth model.

/// Mean Earth radius, kilometres (WGS-84 mean radius, rounded).
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Nautical mile, in kilometres.
const KM_PER_NM: f64 = 1.852;

/// A point on the sphere, decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Initial great-circle bearing from `from` to `to`, in [0, 360).
pub fn bearing(from: Point, to: Point) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let dlon = (to.lon - from.lon).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    let theta = y.atan2(x).to_degrees();
    (theta + 360.0) % 360.0
}

/// Forward geodesic: the point reached from `origin` travelling
/// `distance_km` along `bearing_deg`.
pub fn destination(origin: Point, bearing_deg: f64, distance_km: f64) -> Point {
    let angular_distance = distance_km / EARTH_RADIUS_KM;
    let bearing_rad = bearing_deg.to_radians();
    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();

    let lat2 = (lat1.sin() * angular_distance.cos()
        + lat1.cos() * angular_distance.sin() * bearing_rad.cos())
    .asin();
    let lon2 = lon1
        + (bearing_rad.sin() * angular_distance.sin() * lat1.cos())
            .atan2(angular_distance.cos() - lat1.sin() * lat2.sin());

    Point::new(lat2.to_degrees(), normalize_signed(lon2.to_degrees()))
}

/// Great-circle distance between two points, kilometres.
pub fn distance_km(p1: Point, p2: Point) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let dlat = (p2.lat - p1.lat).to_radians();
    let dlon = (p2.lon - p1.lon).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Great-circle distance between two points, nautical miles.
pub fn distance_nm(p1: Point, p2: Point) -> f64 {
    distance_km(p1, p2) / KM_PER_NM
}

/// Normalise an angle to (-180, 180]. Used for longitude wrapping, where
/// -180 and 180 are the same meridian and folding -180 to 180 is correct.
pub fn normalize_signed(deg: f64) -> f64 {
    let mut d = deg % 360.0;
    if d <= -180.0 {
        d += 360.0;
    } else if d > 180.0 {
        d -= 360.0;
    }
    d
}

/// Normalise a heading difference to the closed range `[-180, 180]`,
/// leaving exactly -180 unchanged. Used for heading-slew Δh, where -180
/// and 180 are opposite turn directions and must stay distinguishable.
pub fn normalize_heading_diff(diff: f64) -> f64 {
    let mut d = diff;
    while d > 180.0 {
        d -= 360.0;
    }
    while d < -180.0 {
        d += 360.0;
    }
    d
}

/// Normalise an angle to [0, 360).
pub fn normalize_unsigned(deg: f64) -> f64 {
    let d = deg % 360.0;
    if d < 0.0 {
        d + 360.0
    } else {
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_signed_boundary() {
        assert!((normalize_signed(10.0 - 350.0) - 20.0).abs() < 1e-9);
        assert!((normalize_signed(350.0 - 10.0) - (-20.0)).abs() < 1e-9);
        assert_eq!(normalize_signed(180.0), 180.0);
        // -180 and 180 are the same meridian; longitude wrapping folds -180 to 180.
        assert_eq!(normalize_signed(-180.0), 180.0);
    }

    #[test]
    fn normalize_heading_diff_boundary() {
        assert!((normalize_heading_diff(10.0 - 350.0) - 20.0).abs() < 1e-9);
        assert!((normalize_heading_diff(350.0 - 10.0) - (-20.0)).abs() < 1e-9);
        assert_eq!(normalize_heading_diff(180.0), 180.0);
        // -180 is a valid, distinct heading difference and stays -180.
        assert_eq!(normalize_heading_diff(-180.0), -180.0);
    }

    #[test]
    fn bearing_cardinal_directions() {
        let origin = Point::new(0.0, 0.0);
        let north = Point::new(1.0, 0.0);
        let east = Point::new(0.0, 1.0);

        assert!(bearing(origin, north).abs() < 1.0);
        assert!((bearing(origin, east) - 90.0).abs() < 1.0);
    }

    #[test]
    fn destination_round_trips_distance() {
        let origin = Point::new(40.0, -3.0);
        let dest = destination(origin, 90.0, 100.0);
        let measured = distance_km(origin, dest);
        assert!((measured - 100.0).abs() < 0.5);
    }

    #[test]
    fn nm_conversion() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(0.0, 1.0);
        let km = distance_km(p1, p2);
        let nm = distance_nm(p1, p2);
        assert!((km / nm - KM_PER_NM).abs() < 1e-6);
    }
}
