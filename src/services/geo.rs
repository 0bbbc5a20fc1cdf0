//! Geographic calculations

use crate::types::Coordinates;

/// Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate Haversine distance between two points in kilometers
pub fn haversine_distance(from: &Coordinates, to: &Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lng - from.lng).to_radians();

    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Straight-line length of a chain of points in kilometers
pub fn chain_distance(points: &[Coordinates]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_distance(&pair[0], &pair[1]))
        .sum()
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bengaluru() -> Coordinates {
        Coordinates { lat: 12.9716, lng: 77.5946 }
    }

    fn mysuru() -> Coordinates {
        Coordinates { lat: 12.2958, lng: 76.6394 }
    }

    #[test]
    fn test_haversine_bengaluru_mysuru() {
        let distance = haversine_distance(&bengaluru(), &mysuru());

        // Bengaluru to Mysuru is approximately 127 km straight line
        assert!((distance - 127.0).abs() < 5.0, "got {} km", distance);
    }

    #[test]
    fn test_haversine_same_point() {
        let point = bengaluru();
        let distance = haversine_distance(&point, &point);
        assert!((distance - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_chain_distance_sums_legs() {
        let mandya = Coordinates { lat: 12.5218, lng: 76.8951 };
        let direct = haversine_distance(&bengaluru(), &mysuru());
        let via = chain_distance(&[bengaluru(), mandya, mysuru()]);

        assert!(via >= direct);
        assert_eq!(chain_distance(&[bengaluru()]), 0.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(80.4670), 80.47);
        assert_eq!(round2(1.004), 1.0);
    }
}
