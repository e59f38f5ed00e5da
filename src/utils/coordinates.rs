use crate::error::{ProcessingError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn limit(self) -> f64 {
        match self {
            Axis::Latitude => 90.0,
            Axis::Longitude => 180.0,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Axis::Latitude => "latitude",
            Axis::Longitude => "longitude",
        }
    }

    /// Hemisphere letter to sign, if the letter belongs to this axis.
    fn hemisphere_sign(self, letter: char) -> Option<f64> {
        match (self, letter.to_ascii_uppercase()) {
            (Axis::Latitude, 'N') | (Axis::Longitude, 'E') => Some(1.0),
            (Axis::Latitude, 'S') | (Axis::Longitude, 'W') => Some(-1.0),
            _ => None,
        }
    }
}

/// Parse a latitude given as decimal degrees (`-13.83`), `DD:MM:SS`
/// (`-13:49:48`) or with a hemisphere suffix (`13.83S`).
///
/// # Examples
/// ```
/// use climate_qc::utils::parse_latitude;
///
/// let lat = parse_latitude("13:49:48S").unwrap();
/// assert!((lat + 13.83).abs() < 1e-9);
/// ```
pub fn parse_latitude(input: &str) -> Result<f64> {
    parse_axis(input, Axis::Latitude)
}

/// Longitude counterpart of [`parse_latitude`], using `E`/`W` suffixes.
pub fn parse_longitude(input: &str) -> Result<f64> {
    parse_axis(input, Axis::Longitude)
}

fn parse_axis(input: &str, axis: Axis) -> Result<f64> {
    let trimmed = input.trim();
    let invalid = |detail: &str| {
        ProcessingError::InvalidCoordinate(format!(
            "Invalid {} '{}': {}",
            axis.name(),
            input,
            detail
        ))
    };

    let (body, hemisphere) = match trimmed.chars().last() {
        Some(letter) if letter.is_ascii_alphabetic() => {
            let sign = axis
                .hemisphere_sign(letter)
                .ok_or_else(|| invalid("unknown hemisphere"))?;
            (trimmed[..trimmed.len() - 1].trim_end(), Some(sign))
        }
        _ => (trimmed, None),
    };

    let negative = body.starts_with('-');
    if negative && hemisphere.is_some() {
        return Err(invalid("sign and hemisphere both given"));
    }

    let magnitude = if body.contains(':') {
        sexagesimal_magnitude(body.trim_start_matches('-')).map_err(|detail| invalid(&detail))?
    } else {
        body.trim_start_matches('-')
            .parse::<f64>()
            .map_err(|_| invalid("not a number"))?
    };

    let sign = match hemisphere {
        Some(sign) => sign,
        None if negative => -1.0,
        None => 1.0,
    };
    let value = sign * magnitude;

    if !value.is_finite() || value.abs() > axis.limit() {
        return Err(invalid(&format!("must be within ±{}", axis.limit())));
    }
    Ok(value)
}

fn sexagesimal_magnitude(body: &str) -> std::result::Result<f64, String> {
    let parts: Vec<&str> = body.split(':').collect();
    if parts.len() != 3 {
        return Err("expected DD:MM:SS".to_string());
    }

    let mut numbers = [0.0; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number", part))?;
        if *slot < 0.0 {
            return Err("only the degrees may carry a sign".to_string());
        }
    }

    let [degrees, minutes, seconds] = numbers;
    if minutes >= 60.0 || seconds >= 60.0 {
        return Err("minutes and seconds must be below 60".to_string());
    }

    Ok(degrees + minutes / 60.0 + seconds / 3600.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_decimal_degrees() {
        assert!(close(parse_latitude("-13.83").unwrap(), -13.83));
        assert!(close(parse_longitude(" 171.75 ").unwrap(), 171.75));
    }

    #[test]
    fn test_sexagesimal() {
        assert!(close(parse_latitude("-13:49:48").unwrap(), -13.83));
        assert!(close(parse_longitude("171:45:00").unwrap(), 171.75));
    }

    #[test]
    fn test_hemisphere_suffix() {
        assert!(close(parse_latitude("13.83S").unwrap(), -13.83));
        assert!(close(parse_longitude("171.75 E").unwrap(), 171.75));
        assert!(close(parse_longitude("0:30:00W").unwrap(), -0.5));
    }

    #[test]
    fn test_rejections() {
        assert!(parse_latitude("91.0").is_err());
        assert!(parse_longitude("-180.5").is_err());
        assert!(parse_latitude("13.83E").is_err());
        assert!(parse_latitude("-13.83S").is_err());
        assert!(parse_latitude("13:60:00").is_err());
        assert!(parse_latitude("13:30").is_err());
        assert!(parse_latitude("north").is_err());
    }
}
