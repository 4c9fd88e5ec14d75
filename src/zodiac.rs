use serde::{Serialize, Serializer};
use std::fmt;

/// Normalize any longitude into [0, 360).
pub fn normalize_longitude(longitude: f64) -> f64 {
    let normalized = longitude.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// One of the twelve 30° sectors of ecliptic longitude, starting at Aries.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    /// Zero-based sector index of a longitude.
    pub fn index_of(longitude: f64) -> usize {
        let index = (normalize_longitude(longitude) / 30.0).floor() as usize;
        index.min(11)
    }

    pub fn from_longitude(longitude: f64) -> Self {
        Self::ALL[Self::index_of(longitude)]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Russian name used in all user-facing text.
    pub fn name(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Овен",
            ZodiacSign::Taurus => "Телец",
            ZodiacSign::Gemini => "Близнецы",
            ZodiacSign::Cancer => "Рак",
            ZodiacSign::Leo => "Лев",
            ZodiacSign::Virgo => "Дева",
            ZodiacSign::Libra => "Весы",
            ZodiacSign::Scorpio => "Скорпион",
            ZodiacSign::Sagittarius => "Стрелец",
            ZodiacSign::Capricorn => "Козерог",
            ZodiacSign::Aquarius => "Водолей",
            ZodiacSign::Pisces => "Рыбы",
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for ZodiacSign {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Sign and position inside it.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ZodiacPlacement {
    pub sign: ZodiacSign,
    /// Degrees into the sign, truncated to two decimals, in [0, 30)
    pub degree: f64,
}

impl ZodiacPlacement {
    pub fn from_longitude(longitude: f64) -> Self {
        let normalized = normalize_longitude(longitude);
        let sign = ZodiacSign::from_longitude(normalized);
        let within = normalized - 30.0 * sign.index() as f64;
        // Subtraction leaves values like 0.28999999999999915 for 30.29
        let degree = ((within * 100.0 + 1e-9).floor() / 100.0).clamp(0.0, 29.99);
        Self { sign, degree }
    }
}

impl fmt::Display for ZodiacPlacement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {:.2}°", self.sign, self.degree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_negative_and_large() {
        assert_eq!(normalize_longitude(-30.0), 330.0);
        assert_eq!(normalize_longitude(720.5), 0.5);
        assert_eq!(normalize_longitude(360.0), 0.0);
        assert!(normalize_longitude(-1e-18) < 360.0);
    }

    #[test]
    fn test_sign_boundaries() {
        assert_eq!(ZodiacSign::from_longitude(0.0), ZodiacSign::Aries);
        assert_eq!(ZodiacSign::from_longitude(29.999), ZodiacSign::Aries);
        assert_eq!(ZodiacSign::from_longitude(30.0), ZodiacSign::Taurus);
        assert_eq!(ZodiacSign::from_longitude(359.99), ZodiacSign::Pisces);
        assert_eq!(ZodiacSign::from_longitude(-0.5), ZodiacSign::Pisces);
    }

    #[test]
    fn test_index_and_degree_bounds_over_sweep() {
        let mut longitude = -1080.0;
        while longitude <= 1080.0 {
            let index = ZodiacSign::index_of(longitude);
            assert!(index <= 11);
            let placement = ZodiacPlacement::from_longitude(longitude);
            assert!(
                (0.0..30.0).contains(&placement.degree),
                "{longitude} -> {}",
                placement.degree
            );
            longitude += 0.37;
        }
    }

    #[test]
    fn test_degree_truncates_to_two_decimals() {
        let placement = ZodiacPlacement::from_longitude(45.678);
        assert_eq!(placement.sign, ZodiacSign::Taurus);
        assert!((placement.degree - 15.67).abs() < 1e-9);

        let edge = ZodiacPlacement::from_longitude(59.9999);
        assert_eq!(edge.sign, ZodiacSign::Taurus);
        assert!(edge.degree < 30.0);
    }

    #[test]
    fn test_degree_survives_subtraction_error() {
        let cases = [
            (30.29, ZodiacSign::Taurus, 0.29),
            (90.58, ZodiacSign::Cancer, 0.58),
            (150.14, ZodiacSign::Virgo, 0.14),
        ];
        for (longitude, sign, degree) in cases {
            let placement = ZodiacPlacement::from_longitude(longitude);
            assert_eq!(placement.sign, sign);
            assert_eq!(placement.degree, degree, "{longitude}");
        }
    }

    #[test]
    fn test_serializes_russian_name() {
        let placement = ZodiacPlacement::from_longitude(280.5);
        let json = serde_json::to_value(placement).unwrap();
        assert_eq!(json["sign"], "Козерог");
        assert_eq!(json["degree"], 10.5);
    }
}
