/// Web-Mercator projection math
///
/// World coordinates are pixels at zoom 0, where the whole world spans one
/// 256px tile. Screen scale at a fractional zoom z is 2^z.

/// Side length of one raster tile in pixels
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the Web-Mercator projection
pub const MAX_LATITUDE: f64 = 85.0511;

pub fn lon_to_x(lon: f64, zoom: f64) -> f64 {
    ((lon + 180.0) / 360.0) * 2.0f64.powf(zoom) * TILE_SIZE
}

pub fn lat_to_y(lat: f64, zoom: f64) -> f64 {
    let lat_rad = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0
        * 2.0f64.powf(zoom)
        * TILE_SIZE
}

pub fn x_to_lon(x: f64, zoom: f64) -> f64 {
    (x / (TILE_SIZE * 2.0f64.powf(zoom))) * 360.0 - 180.0
}

pub fn y_to_lat(y: f64, zoom: f64) -> f64 {
    let n = std::f64::consts::PI - 2.0 * std::f64::consts::PI * y / (TILE_SIZE * 2.0f64.powf(zoom));
    (0.5 * (n.exp() - (-n).exp())).atan().to_degrees()
}

/// Project (lat, lon) to zoom-0 world pixels
pub fn project(lat: f64, lon: f64) -> (f64, f64) {
    (lon_to_x(lon, 0.0), lat_to_y(lat, 0.0))
}

/// Unproject zoom-0 world pixels back to (lat, lon)
pub fn unproject(x: f64, y: f64) -> (f64, f64) {
    (y_to_lat(y, 0.0), x_to_lon(x, 0.0))
}
