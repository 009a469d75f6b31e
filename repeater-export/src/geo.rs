/// Mean Earth radius in kilometres
const EARTH_RADIUS_KM: f64 = 6371.0088;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLon(f64, f64);

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        LatLon(lat, lon)
    }

    pub fn lat(self) -> f64 {
        self.0
    }

    pub fn lon(self) -> f64 {
        self.1
    }

    /// Great-circle distance (haversine) in kilometres
    pub fn distance_km(self, other: LatLon) -> f64 {
        let (lat1, lat2) = (self.0.to_radians(), other.0.to_radians());
        let d_lat = lat2 - lat1;
        let d_lon = (other.1 - self.1).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}
