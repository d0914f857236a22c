//! Spherical web mercator (EPSG:3857) projection.

use map_core::Coordinate;

/// Sphere radius used by web mercator, in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude beyond which web mercator is undefined; inputs are clamped.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Project longitude/latitude degrees to map meters.
#[must_use]
pub fn from_lon_lat(lon: f64, lat: f64) -> Coordinate {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = EARTH_RADIUS_M * lon.to_radians();
    let y = EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    Coordinate::new(x, y)
}

/// Unproject map meters to `(longitude, latitude)` degrees.
#[must_use]
pub fn to_lon_lat(coordinate: Coordinate) -> (f64, f64) {
    let lon = (coordinate.x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (coordinate.y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2)
        .to_degrees();
    (lon, lat)
}
