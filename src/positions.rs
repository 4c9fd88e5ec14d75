use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::ephemeris::{Body, Ephemeris};
use crate::zodiac::ZodiacPlacement;

/// Position of one body as reported in a chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlanetPosition {
    pub name: &'static str,
    pub longitude: f64,
    pub latitude: f64,
}

/// Positions and sign placements of every body the ephemeris could resolve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyPositions {
    pub planets: BTreeMap<Body, PlanetPosition>,
    pub signs: BTreeMap<Body, ZodiacPlacement>,
}

impl BodyPositions {
    pub fn longitude(&self, body: Body) -> Option<f64> {
        self.planets.get(&body).map(|p| p.longitude)
    }

    pub fn placement(&self, body: Body) -> Option<&ZodiacPlacement> {
        self.signs.get(&body)
    }

    pub fn is_complete(&self) -> bool {
        Body::ALL.iter().all(|body| self.planets.contains_key(body))
    }

    pub fn missing(&self) -> Vec<Body> {
        Body::ALL
            .into_iter()
            .filter(|body| !self.planets.contains_key(body))
            .collect()
    }
}

/// Resolves all seven bodies at `at`.
///
/// A body the ephemeris fails on is logged and left out; the rest are still
/// returned, so callers must cope with partial results.
pub fn resolve_positions(ephemeris: &dyn Ephemeris, at: DateTime<Utc>) -> BodyPositions {
    let mut resolved = BodyPositions::default();

    for body in Body::ALL {
        match ephemeris.position(body, at) {
            Ok(position) => {
                resolved.planets.insert(
                    body,
                    PlanetPosition {
                        name: body.name(),
                        longitude: position.longitude,
                        latitude: position.latitude,
                    },
                );
                resolved
                    .signs
                    .insert(body, ZodiacPlacement::from_longitude(position.longitude));
            }
            Err(e) => {
                tracing::warn!(body = body.key(), %at, "Skipping body: {}", e);
            }
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::{EclipticPosition, OrbitalEphemeris};
    use crate::error::EphemerisError;
    use chrono::TimeZone;

    /// Fails on one body, fixed longitudes for the rest.
    struct FlakyEphemeris {
        broken: Body,
    }

    impl Ephemeris for FlakyEphemeris {
        fn position(&self, body: Body, _at: DateTime<Utc>) -> Result<EclipticPosition, EphemerisError> {
            if body == self.broken {
                return Err(EphemerisError::NonFinite { body, jd: 0.0 });
            }
            Ok(EclipticPosition {
                longitude: 40.0 * body as u8 as f64,
                latitude: 0.0,
            })
        }
    }

    #[test]
    fn test_failing_body_is_omitted() {
        let eph = FlakyEphemeris { broken: Body::Mercury };
        let at = Utc.with_ymd_and_hms(2020, 5, 5, 0, 0, 0).unwrap();
        let resolved = resolve_positions(&eph, at);

        assert_eq!(resolved.planets.len(), 6);
        assert_eq!(resolved.signs.len(), 6);
        assert!(resolved.longitude(Body::Mercury).is_none());
        assert_eq!(resolved.missing(), vec![Body::Mercury]);
        assert!(!resolved.is_complete());
        assert_eq!(resolved.placement(Body::Venus).unwrap().degree, 0.0);
    }

    #[test]
    fn test_resolver_is_deterministic() {
        let eph = OrbitalEphemeris::new();
        let at = Utc.with_ymd_and_hms(1990, 1, 1, 12, 0, 0).unwrap();
        let first = resolve_positions(&eph, at);
        let second = resolve_positions(&eph, at);
        assert!(first.is_complete());
        assert_eq!(first, second);
    }

    #[test]
    fn test_names_are_russian() {
        let eph = OrbitalEphemeris::new();
        let at = Utc.with_ymd_and_hms(1990, 1, 1, 12, 0, 0).unwrap();
        let resolved = resolve_positions(&eph, at);
        assert_eq!(resolved.planets[&Body::Sun].name, "Солнце");
        assert_eq!(resolved.planets[&Body::Saturn].name, "Сатурн");
    }
}
