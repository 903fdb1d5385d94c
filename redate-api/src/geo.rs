//! Great-circle distance and the coarse bounding-box prefilter used by the
//! discovery feed. The box is a superset of the true radius; candidates are
//! re-checked with the Haversine distance after the database query.

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometres per degree of latitude (and of longitude at the equator).
const KM_PER_DEGREE: f64 = 111.0;

/// Great-circle distance in kilometres (Haversine).
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

/// Flat-earth approximation of the box enclosing `radius_km` around a point.
/// Longitude degrees shrink with cos(latitude).
pub fn bounding_box(lat: f64, lng: f64, radius_km: f64) -> BoundingBox {
    let lat_offset = radius_km / KM_PER_DEGREE;
    let lng_offset = radius_km / (KM_PER_DEGREE * lat.to_radians().cos());
    BoundingBox {
        min_lat: lat - lat_offset,
        max_lat: lat + lat_offset,
        min_lng: lng - lng_offset,
        max_lng: lng + lng_offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl BoundingBox {
        fn contains(&self, lat: f64, lng: f64) -> bool {
            lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
        }
    }

    const PARIS: (f64, f64) = (48.8566, 2.3522);
    const LONDON: (f64, f64) = (51.5074, -0.1278);

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(haversine_km(PARIS.0, PARIS.1, PARIS.0, PARIS.1), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let ab = haversine_km(PARIS.0, PARIS.1, LONDON.0, LONDON.1);
        let ba = haversine_km(LONDON.0, LONDON.1, PARIS.0, PARIS.1);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn paris_london_is_about_344_km() {
        let d = haversine_km(PARIS.0, PARIS.1, LONDON.0, LONDON.1);
        assert!((d - 344.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn box_is_a_superset_of_the_radius() {
        let radius = 50.0;
        let bbox = bounding_box(PARIS.0, PARIS.1, radius);
        // Points just inside the radius in the four cardinal directions.
        for (d_lat, d_lng) in [(0.4, 0.0), (-0.4, 0.0), (0.0, 0.6), (0.0, -0.6)] {
            let (lat, lng) = (PARIS.0 + d_lat, PARIS.1 + d_lng);
            if haversine_km(PARIS.0, PARIS.1, lat, lng) <= radius {
                assert!(bbox.contains(lat, lng), "({lat}, {lng}) escaped the box");
            }
        }
    }

    #[test]
    fn box_widens_in_longitude_away_from_equator() {
        let equator = bounding_box(0.0, 0.0, 50.0);
        let north = bounding_box(60.0, 0.0, 50.0);
        let equator_width = equator.max_lng - equator.min_lng;
        let north_width = north.max_lng - north.min_lng;
        assert!(north_width > equator_width);
    }
}
