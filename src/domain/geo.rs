// Geographic point and spherical Web-Mercator tile addressing
use super::error::NowcastError;
use std::f64::consts::PI;

/// Pixels per tile side
pub const TILE_SIZE: u32 = 256;

/// Highest zoom accepted; keeps the world raster width inside `u32`
pub const MAX_ZOOM: u8 = 22;

/// Latitude where the Mercator y-coordinate reaches π, `asin(tanh(π))` in degrees
pub const CLIP_LATITUDE: f64 = 85.051_128_779_806_6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Validate a coordinate against the projection's domain.
    /// Out-of-band latitudes are rejected, never clamped.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, NowcastError> {
        if !latitude.is_finite() || latitude.abs() > CLIP_LATITUDE {
            return Err(NowcastError::InvalidInput(format!(
                "latitude {} outside [-{}, {}]",
                latitude, CLIP_LATITUDE, CLIP_LATITUDE
            )));
        }
        if !longitude.is_finite() || longitude.abs() > 180.0 {
            return Err(NowcastError::InvalidInput(format!(
                "longitude {} outside [-180, 180]",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomLevel(u8);

impl ZoomLevel {
    pub fn new(zoom: u8) -> Result<Self, NowcastError> {
        if zoom > MAX_ZOOM {
            return Err(NowcastError::InvalidInput(format!(
                "zoom {} outside [0, {}]",
                zoom, MAX_ZOOM
            )));
        }
        Ok(Self(zoom))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Width (and height) of the whole world raster in pixels
    fn world_pixels(self) -> u32 {
        TILE_SIZE << self.0
    }
}

/// One raster tile of the pyramid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileAddress {
    pub zoom: ZoomLevel,
    pub x: u32,
    pub y: u32,
}

/// Position of a point inside its 256x256 tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelOffset {
    pub x: u32,
    pub y: u32,
}

/// Project a point onto the tile pyramid at `zoom`.
///
/// Longitude +180 wraps onto column 0 (the same meridian as -180). The vertical
/// pixel is clamped into the world raster so that the clipping latitudes land on
/// the first and last pixel rows instead of leaving the pyramid.
pub fn locate(point: GeoPoint, zoom: ZoomLevel) -> (TileAddress, PixelOffset) {
    let world = zoom.world_pixels();
    let half_world = f64::from(world / 2);

    let pixel_x = (half_world * (point.longitude / 180.0 + 1.0)).floor() as i64;
    let pixel_x = pixel_x.rem_euclid(i64::from(world)) as u32;

    // atanh(sin(L)) == π by construction of the clipping latitude
    let mercator_y = point.latitude.to_radians().sin().atanh();
    let pixel_y = (half_world * (1.0 - mercator_y / PI)).floor();
    let pixel_y = if pixel_y.is_nan() {
        0
    } else {
        pixel_y.clamp(0.0, f64::from(world - 1)) as u32
    };

    (
        TileAddress {
            zoom,
            x: pixel_x / TILE_SIZE,
            y: pixel_y / TILE_SIZE,
        },
        PixelOffset {
            x: pixel_x % TILE_SIZE,
            y: pixel_y % TILE_SIZE,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zoom(z: u8) -> ZoomLevel {
        ZoomLevel::new(z).unwrap()
    }

    #[test]
    fn test_locate_is_deterministic() {
        let point = GeoPoint::new(35.681236, 139.767125).unwrap();
        assert_eq!(locate(point, zoom(10)), locate(point, zoom(10)));
    }

    #[test]
    fn test_origin_is_pyramid_center() {
        let (tile, pixel) = locate(GeoPoint::new(0.0, 0.0).unwrap(), zoom(10));
        assert_eq!((tile.x, tile.y), (512, 512));
        assert_eq!((pixel.x, pixel.y), (0, 0));
    }

    #[test]
    fn test_tokyo_station() {
        let (tile, pixel) = locate(GeoPoint::new(35.681236, 139.767125).unwrap(), zoom(10));
        assert_eq!((tile.x, tile.y), (909, 403));
        assert_eq!((pixel.x, pixel.y), (143, 58));
    }

    #[test]
    fn test_clipping_latitudes_stay_in_pyramid() {
        let (tile, pixel) = locate(GeoPoint::new(CLIP_LATITUDE, 0.0).unwrap(), zoom(10));
        assert_eq!(tile.y, 0);
        assert_eq!(pixel.y, 0);

        let (tile, pixel) = locate(GeoPoint::new(-CLIP_LATITUDE, 0.0).unwrap(), zoom(10));
        assert_eq!(tile.y, 1023);
        assert_eq!(pixel.y, 255);
    }

    #[test]
    fn test_antimeridian_wraps_to_first_column() {
        let east = locate(GeoPoint::new(0.0, 180.0).unwrap(), zoom(3));
        let west = locate(GeoPoint::new(0.0, -180.0).unwrap(), zoom(3));
        assert_eq!(east, west);
        assert_eq!(east.0.x, 0);
        assert_eq!(east.1.x, 0);
    }

    #[test]
    fn test_zoom_zero_single_tile() {
        let (tile, _) = locate(GeoPoint::new(35.681236, 139.767125).unwrap(), zoom(0));
        assert_eq!((tile.x, tile.y), (0, 0));
    }

    #[test]
    fn test_rejects_out_of_domain_input() {
        assert!(matches!(GeoPoint::new(85.06, 0.0), Err(NowcastError::InvalidInput(_))));
        assert!(matches!(GeoPoint::new(-90.0, 0.0), Err(NowcastError::InvalidInput(_))));
        assert!(matches!(GeoPoint::new(0.0, 180.5), Err(NowcastError::InvalidInput(_))));
        assert!(matches!(GeoPoint::new(f64::NAN, 0.0), Err(NowcastError::InvalidInput(_))));
        assert!(matches!(ZoomLevel::new(MAX_ZOOM + 1), Err(NowcastError::InvalidInput(_))));
    }
}
