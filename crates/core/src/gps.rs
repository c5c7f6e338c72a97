use serde::{Deserialize, Serialize};

pub const NO_GPS_DATA: &str = "No GPS data.";

/// Position in signed decimal degrees (south and west are negative).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GpsPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPosition {
    /// Builds a position from EXIF degree/minute/second triples and their
    /// `N`/`S` and `E`/`W` references.
    pub fn from_dms(lat: [f64; 3], lat_ref: &str, lng: [f64; 3], lng_ref: &str) -> Option<Self> {
        let latitude = signed_degrees(lat, lat_ref, 'S')?;
        let longitude = signed_degrees(lng, lng_ref, 'W')?;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }
        Some(Self {
            latitude,
            longitude,
        })
    }

    pub fn maps_link(&self) -> String {
        format!(
            "https://www.google.com/maps/search/?api=1&query={:.6},{:.6}",
            self.latitude, self.longitude
        )
    }
}

pub fn maps_line(position: Option<GpsPosition>) -> String {
    match position {
        Some(position) => format!("Maps: {}", position.maps_link()),
        None => format!("Maps: {}", NO_GPS_DATA),
    }
}

fn signed_degrees(dms: [f64; 3], reference: &str, negative: char) -> Option<f64> {
    if dms.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return None;
    }
    let degrees = dms[0] + dms[1] / 60.0 + dms[2] / 3600.0;
    let reference = reference.trim().chars().next()?.to_ascii_uppercase();
    if reference == negative {
        Some(-degrees)
    } else {
        Some(degrees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn southern_and_western_refs_are_negative() {
        let pos = GpsPosition::from_dms([33.0, 51.0, 54.0], "S", [151.0, 12.0, 36.0], "W")
            .expect("valid position");
        assert!((pos.latitude + 33.865).abs() < 1e-9);
        assert!((pos.longitude + 151.21).abs() < 1e-9);
    }

    #[test]
    fn maps_link_uses_six_decimals() {
        let pos = GpsPosition::from_dms([35.0, 39.0, 0.0], "N", [139.0, 45.0, 0.0], "E")
            .expect("valid position");
        assert_eq!(
            pos.maps_link(),
            "https://www.google.com/maps/search/?api=1&query=35.650000,139.750000"
        );
    }

    #[test]
    fn missing_reference_or_out_of_range_is_rejected() {
        assert!(GpsPosition::from_dms([35.0, 0.0, 0.0], "", [139.0, 0.0, 0.0], "E").is_none());
        assert!(GpsPosition::from_dms([95.0, 0.0, 0.0], "N", [139.0, 0.0, 0.0], "E").is_none());
    }

    #[test]
    fn maps_line_without_position() {
        assert_eq!(maps_line(None), "Maps: No GPS data.");
    }
}
