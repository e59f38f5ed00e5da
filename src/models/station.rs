use serde::{Deserialize, Serialize};
use validator::Validate;

/// Location of an observing station, used to pick the matching grid cell.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StationMetadata {
    #[validate(length(min = 1))]
    pub station_id: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl StationMetadata {
    pub fn new(station_id: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            station_id: station_id.to_string(),
            latitude,
            longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_validation() {
        let station = StationMetadata::new("APIA_OBS_01", -13.83, 171.75);
        assert!(station.validate().is_ok());
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!(StationMetadata::new("APIA_OBS_01", -91.0, 171.75)
            .validate()
            .is_err());
        assert!(StationMetadata::new("APIA_OBS_01", -13.83, 181.0)
            .validate()
            .is_err());
        assert!(StationMetadata::new("", 0.0, 0.0).validate().is_err());
    }
}
