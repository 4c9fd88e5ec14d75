use serde::Serialize;
use std::fmt;

use crate::zodiac::normalize_longitude;

/// Orb used for named aspects
const ASPECT_ORB: f64 = 8.0;

/// Named aspect angles, most common first
const ASPECT_ANGLES: &[(AspectKind, f64)] = &[
    (AspectKind::Conjunction, 0.0),
    (AspectKind::Opposition, 180.0),
    (AspectKind::Trine, 120.0),
    (AspectKind::Square, 90.0),
    (AspectKind::Sextile, 60.0),
];

/// Angular separation of two longitudes, in [0, 180].
pub fn separation(a: f64, b: f64) -> f64 {
    let diff = (normalize_longitude(a) - normalize_longitude(b)).abs();
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectKind {
    Conjunction,
    Sextile,
    Square,
    Trine,
    Opposition,
}

impl AspectKind {
    /// Nearest named aspect within the orb. The conjunction orb is open at 8°.
    pub fn from_separation(separation: f64) -> Option<Self> {
        ASPECT_ANGLES
            .iter()
            .find(|(kind, angle)| {
                let distance = (separation - angle).abs();
                match kind {
                    AspectKind::Conjunction => distance < ASPECT_ORB,
                    _ => distance <= ASPECT_ORB,
                }
            })
            .map(|(kind, _)| *kind)
    }

    pub fn angle(self) -> f64 {
        match self {
            AspectKind::Conjunction => 0.0,
            AspectKind::Sextile => 60.0,
            AspectKind::Square => 90.0,
            AspectKind::Trine => 120.0,
            AspectKind::Opposition => 180.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AspectKind::Conjunction => "соединение",
            AspectKind::Sextile => "секстиль",
            AspectKind::Square => "квадрат",
            AspectKind::Trine => "тригон",
            AspectKind::Opposition => "оппозиция",
        }
    }

    pub fn is_harmonious(self) -> bool {
        matches!(self, AspectKind::Sextile | AspectKind::Trine)
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tone = match self {
            AspectKind::Conjunction => "",
            _ if self.is_harmonious() => " - гармоничный",
            _ => " - напряженный",
        };
        write!(f, "{} ({}°){}", self.label(), self.angle(), tone)
    }
}

/// Tone of the day derived from the transit/natal Sun separation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectCategory {
    Favorable,
    Neutral,
    Challenging,
}

/// Geometric reason for a category, if any.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectBand {
    Conjunction,
    Square,
    Trine,
    Opposition,
    None,
}

/// Classify a separation into its band.
///
/// Bands are half-open and cover [0, 180] completely:
///
/// | separation    | band        | category    |
/// |---------------|-------------|-------------|
/// | `[0, 30)`     | conjunction | favorable   |
/// | `[80, 100)`   | square      | challenging |
/// | `[110, 130)`  | trine       | favorable   |
/// | `[170, 180]`  | opposition  | challenging |
/// | anything else | none        | neutral     |
pub fn classify(separation: f64) -> (AspectCategory, AspectBand) {
    match separation {
        s if (0.0..30.0).contains(&s) => (AspectCategory::Favorable, AspectBand::Conjunction),
        s if (80.0..100.0).contains(&s) => (AspectCategory::Challenging, AspectBand::Square),
        s if (110.0..130.0).contains(&s) => (AspectCategory::Favorable, AspectBand::Trine),
        s if (170.0..=180.0).contains(&s) => (AspectCategory::Challenging, AspectBand::Opposition),
        _ => (AspectCategory::Neutral, AspectBand::None),
    }
}

/// Transit-to-natal aspect summary for one pair of longitudes.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AspectReading {
    pub separation: f64,
    pub category: AspectCategory,
    pub band: AspectBand,
    pub kind: Option<AspectKind>,
}

impl AspectReading {
    pub fn between(transit: f64, natal: f64) -> Self {
        let separation = separation(transit, natal);
        let (category, band) = classify(separation);
        Self {
            separation,
            category,
            band,
            kind: AspectKind::from_separation(separation),
        }
    }

    /// Human label: the named aspect, or the rounded angle.
    pub fn describe(&self) -> String {
        match self.kind {
            Some(kind) => kind.to_string(),
            None => format!("{}°", self.separation.round()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separation_is_symmetric_and_bounded() {
        let samples = [-725.0, -90.0, -0.5, 0.0, 10.0, 179.9, 180.0, 181.0, 359.9, 400.0, 1000.0];
        for &a in &samples {
            for &b in &samples {
                let ab = separation(a, b);
                assert_eq!(ab, separation(b, a));
                assert!((0.0..=180.0).contains(&ab), "{a} {b} -> {ab}");
            }
        }
    }

    #[test]
    fn test_separation_wraps_around_zero() {
        assert!((separation(355.0, 5.0) - 10.0).abs() < 1e-9);
        assert!((separation(0.0, 180.0) - 180.0).abs() < 1e-9);
        assert!((separation(90.0, 270.0) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_classify_band_edges() {
        assert_eq!(classify(0.0).0, AspectCategory::Favorable);
        assert_eq!(classify(29.99).1, AspectBand::Conjunction);
        assert_eq!(classify(30.0).0, AspectCategory::Neutral);
        assert_eq!(classify(45.0).0, AspectCategory::Neutral);
        assert_eq!(classify(79.99).0, AspectCategory::Neutral);
        assert_eq!(classify(80.0), (AspectCategory::Challenging, AspectBand::Square));
        assert_eq!(classify(100.0).0, AspectCategory::Neutral);
        assert_eq!(classify(110.0), (AspectCategory::Favorable, AspectBand::Trine));
        assert_eq!(classify(130.0).0, AspectCategory::Neutral);
        assert_eq!(classify(169.99).0, AspectCategory::Neutral);
        assert_eq!(classify(170.0), (AspectCategory::Challenging, AspectBand::Opposition));
        assert_eq!(classify(180.0), (AspectCategory::Challenging, AspectBand::Opposition));
    }

    #[test]
    fn test_named_aspects_with_orb() {
        assert_eq!(AspectKind::from_separation(3.0), Some(AspectKind::Conjunction));
        assert_eq!(AspectKind::from_separation(61.0), Some(AspectKind::Sextile));
        assert_eq!(AspectKind::from_separation(97.5), Some(AspectKind::Square));
        assert_eq!(AspectKind::from_separation(118.0), Some(AspectKind::Trine));
        assert_eq!(AspectKind::from_separation(175.0), Some(AspectKind::Opposition));
        assert_eq!(AspectKind::from_separation(40.0), None);
    }

    #[test]
    fn test_conjunction_orb_excludes_eight_degrees() {
        assert_eq!(AspectKind::from_separation(7.99), Some(AspectKind::Conjunction));
        assert_eq!(AspectKind::from_separation(8.0), None);
        assert_eq!(AspectKind::from_separation(52.0), Some(AspectKind::Sextile));
        assert_eq!(AspectKind::from_separation(172.0), Some(AspectKind::Opposition));
        assert_eq!(AspectReading::between(8.0, 0.0).describe(), "8°");
    }

    #[test]
    fn test_reading_describe() {
        let trine = AspectReading::between(130.0, 10.0);
        assert_eq!(trine.band, AspectBand::Trine);
        assert_eq!(trine.describe(), "тригон (120°) - гармоничный");

        let plain = AspectReading::between(40.0, 0.0);
        assert_eq!(plain.category, AspectCategory::Neutral);
        assert_eq!(plain.describe(), "40°");
    }
}
