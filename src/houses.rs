//! Equal-house approximation anchored on a simplified ascendant.
//!
//! This is not a Placidus (or any quadrant) system: the ascendant comes from
//! local sidereal time alone, ignoring latitude and obliquity, and every
//! cusp sits exactly 30° after the previous one.

use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;

use crate::constants::J2000_JD;
use crate::ephemeris::julian_day;
use crate::zodiac::{normalize_longitude, ZodiacPlacement, ZodiacSign};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HouseCusp {
    /// 1..=12
    pub number: u8,
    pub longitude: f64,
    pub sign: ZodiacSign,
}

/// Local sidereal time in hours, [0, 24).
///
/// `days` counts fractional days since J2000 and the UTC hour-of-day term is
/// added on top, so the time of day enters twice.
pub fn local_sidereal_time(at: DateTime<Utc>, longitude: f64) -> f64 {
    let days = julian_day(at) - J2000_JD;
    let hours = at.hour() as f64 + at.minute() as f64 / 60.0 + at.second() as f64 / 3600.0;
    let st = 6.697374558 + 0.06570982441908 * days + 1.00273790935 * hours + longitude / 15.0;
    let st = st.rem_euclid(24.0);
    if st >= 24.0 {
        0.0
    } else {
        st
    }
}

/// Approximate ascendant longitude in [0, 360).
pub fn approximate_ascendant(at: DateTime<Utc>, longitude: f64) -> f64 {
    normalize_longitude(local_sidereal_time(at, longitude) * 15.0 + longitude)
}

/// Twelve cusps at 30° steps from `ascendant`.
pub fn equal_house_cusps(ascendant: f64) -> Vec<HouseCusp> {
    (0..12u8)
        .map(|i| {
            let longitude = normalize_longitude(ascendant + 30.0 * i as f64);
            HouseCusp {
                number: i + 1,
                longitude,
                sign: ZodiacSign::from_longitude(longitude),
            }
        })
        .collect()
}

/// Ascendant placement together with its cusps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HouseChart {
    pub ascendant: ZodiacPlacement,
    pub ascendant_longitude: f64,
    pub cusps: Vec<HouseCusp>,
}

pub fn calculate_houses(at: DateTime<Utc>, longitude: f64) -> HouseChart {
    let ascendant_longitude = approximate_ascendant(at, longitude);
    tracing::debug!(ascendant_longitude, "computed approximate ascendant");
    HouseChart {
        ascendant: ZodiacPlacement::from_longitude(ascendant_longitude),
        ascendant_longitude,
        cusps: equal_house_cusps(ascendant_longitude),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cusps_follow_ascendant_in_30_degree_steps() {
        for ascendant in [0.0, 17.25, 200.0, 345.5, 359.999] {
            let cusps = equal_house_cusps(ascendant);
            assert_eq!(cusps.len(), 12);
            for (i, cusp) in cusps.iter().enumerate() {
                assert_eq!(cusp.number as usize, i + 1);
                let expected = (ascendant + 30.0 * i as f64) % 360.0;
                assert!((cusp.longitude - expected).abs() < 1e-9);
                assert_eq!(cusp.sign, ZodiacSign::from_longitude(expected));
            }
            for pair in cusps.windows(2) {
                let step = (pair[1].longitude - pair[0].longitude).rem_euclid(360.0);
                assert!((step - 30.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_sidereal_time_range_and_determinism() {
        let at = Utc.with_ymd_and_hms(1990, 1, 1, 12, 0, 0).unwrap();
        for lon in [-179.0, -37.6, 0.0, 37.6173, 131.9] {
            let st = local_sidereal_time(at, lon);
            assert!((0.0..24.0).contains(&st));
            assert_eq!(st, local_sidereal_time(at, lon));
        }
    }

    #[test]
    fn test_sidereal_time_at_j2000_greenwich() {
        // days = 0, hours = 12
        let at = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let expected = (6.697374558 + 1.00273790935 * 12.0) % 24.0;
        assert!((local_sidereal_time(at, 0.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_house_chart_ascendant_matches_first_cusp() {
        let at = Utc.with_ymd_and_hms(1990, 1, 1, 9, 0, 0).unwrap();
        let chart = calculate_houses(at, 37.6173);
        assert_eq!(chart.cusps[0].longitude, chart.ascendant_longitude);
        assert_eq!(chart.cusps[0].sign, chart.ascendant.sign);
        assert!((0.0..360.0).contains(&chart.ascendant_longitude));
    }
}
