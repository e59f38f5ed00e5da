use chrono::{Duration, NaiveDate};

use crate::error::{ProcessingError, Result};
use crate::models::ObservationSeries;
use crate::utils::constants::{PRECIPITATION, TEMPERATURE};

const SAMPLE_TEMPERATURES: [Option<f64>; 15] = [
    Some(25.0),
    Some(26.2),
    Some(25.8),
    Some(999.9),
    Some(27.0),
    None,
    Some(26.5),
    Some(25.9),
    Some(26.1),
    Some(150.0),
    Some(24.8),
    Some(25.5),
    Some(-100.0),
    Some(26.0),
    Some(26.3),
];

const SAMPLE_PRECIPITATION: [Option<f64>; 15] = [
    Some(0.0),
    Some(5.0),
    Some(10.2),
    Some(-5.0),
    Some(0.0),
    Some(0.0),
    Some(20.5),
    None,
    Some(0.0),
    Some(800.0),
    Some(15.0),
    Some(0.0),
    Some(0.0),
    Some(2.5),
    Some(0.0),
];

/// Fifteen days of tropical station data from 2024-01-01 with sensor
/// glitches, impossible readings and dropouts mixed in.
pub fn dirty_sample_series() -> Result<ObservationSeries> {
    let start = sample_start()?;
    let dates = (0..SAMPLE_TEMPERATURES.len() as i64)
        .map(|offset| start + Duration::days(offset))
        .collect();

    ObservationSeries::new(dates)?
        .with_variable(TEMPERATURE, SAMPLE_TEMPERATURES.to_vec())?
        .with_variable(PRECIPITATION, SAMPLE_PRECIPITATION.to_vec())
}

/// Deterministic long series with a seasonal cycle. Every 97th temperature
/// is a spike, every 211th precipitation reading is negative and every 53rd
/// day drops out.
pub fn synthetic_series(days: usize) -> Result<ObservationSeries> {
    let start = sample_start()?;
    let mut dates = Vec::with_capacity(days);
    let mut temperature = Vec::with_capacity(days);
    let mut precipitation = Vec::with_capacity(days);

    for day in 0..days {
        dates.push(start + Duration::days(day as i64));

        let phase = day as f64 * std::f64::consts::TAU / 365.25;
        let wobble = ((day * 7919) % 13) as f64 / 10.0 - 0.6;

        temperature.push(match day {
            d if d % 53 == 52 => None,
            d if d % 97 == 96 => Some(45.0),
            _ => Some(15.0 + 10.0 * phase.sin() + wobble),
        });
        precipitation.push(match day {
            d if d % 53 == 52 => None,
            d if d % 211 == 210 => Some(-3.0),
            d if d % 5 == 0 => Some(((day * 31) % 40) as f64 / 2.0),
            _ => Some(0.0),
        });
    }

    ObservationSeries::new(dates)?
        .with_variable(TEMPERATURE, temperature)?
        .with_variable(PRECIPITATION, precipitation)
}

fn sample_start() -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .ok_or_else(|| ProcessingError::InvalidFormat("Invalid sample start date".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirty_sample_shape() {
        let series = dirty_sample_series().unwrap();

        assert_eq!(series.len(), 15);
        assert_eq!(series.dates()[0], NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(series.dates()[14], NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(series.variable(TEMPERATURE).unwrap()[3], Some(999.9));
        assert_eq!(series.variable(PRECIPITATION).unwrap()[7], None);
    }

    #[test]
    fn test_synthetic_series_is_deterministic() {
        let a = synthetic_series(400).unwrap();
        let b = synthetic_series(400).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), 400);
        assert_eq!(a.variable(TEMPERATURE).unwrap()[96], Some(45.0));
        assert_eq!(a.variable(TEMPERATURE).unwrap()[52], None);
        assert_eq!(a.variable(PRECIPITATION).unwrap()[210], Some(-3.0));
    }
}
