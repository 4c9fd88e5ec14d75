//! Geocentric ecliptic positions of the seven classical bodies.
//!
//! [`OrbitalEphemeris`] propagates mean orbital elements of date with a
//! Kepler solver and adds the largest periodic terms for the Moon, Jupiter
//! and Saturn. The result is good to a few arc-minutes across the supported
//! years, far below the 30° width of a zodiac sign.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::UNIX_EPOCH_JD;
use crate::error::EphemerisError;
use crate::zodiac::normalize_longitude;

/// Days from julian day to the element epoch (1999-12-31T00:00Z)
const ELEMENT_EPOCH_JD: f64 = 2_451_543.5;

const MIN_YEAR: i32 = 1000;
const MAX_YEAR: i32 = 3000;

/// A tracked body. Declaration order is the display order of a chart.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
}

impl Body {
    pub const ALL: [Body; 7] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
    ];

    /// Russian display name.
    pub fn name(self) -> &'static str {
        match self {
            Body::Sun => "Солнце",
            Body::Moon => "Луна",
            Body::Mercury => "Меркурий",
            Body::Venus => "Венера",
            Body::Mars => "Марс",
            Body::Jupiter => "Юпитер",
            Body::Saturn => "Сатурн",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Body::Sun => "sun",
            Body::Moon => "moon",
            Body::Mercury => "mercury",
            Body::Venus => "venus",
            Body::Mars => "mars",
            Body::Jupiter => "jupiter",
            Body::Saturn => "saturn",
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Ecliptic coordinates of date, in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct EclipticPosition {
    /// Longitude in [0, 360)
    pub longitude: f64,
    pub latitude: f64,
}

/// Source of body positions.
///
/// Failures are per body: callers decide whether a missing body is fatal.
pub trait Ephemeris: Send + Sync {
    fn position(&self, body: Body, at: DateTime<Utc>) -> Result<EclipticPosition, EphemerisError>;
}

/// Julian day (UT) of an instant.
pub fn julian_day(at: DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / 86_400_000.0 + UNIX_EPOCH_JD
}

/// Analytical ephemeris built from mean orbital elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrbitalEphemeris;

impl OrbitalEphemeris {
    pub fn new() -> Self {
        Self
    }
}

impl Ephemeris for OrbitalEphemeris {
    fn position(&self, body: Body, at: DateTime<Utc>) -> Result<EclipticPosition, EphemerisError> {
        let jd = julian_day(at);
        if !(MIN_YEAR..=MAX_YEAR).contains(&at.year()) {
            return Err(EphemerisError::OutOfRange {
                body,
                jd,
                min_year: MIN_YEAR,
                max_year: MAX_YEAR,
            });
        }

        let d = jd - ELEMENT_EPOCH_JD;
        let (longitude, latitude) = match body {
            Body::Sun => (sun_longitude(d).0, 0.0),
            Body::Moon => moon_position(d),
            planet => planet_position(planet, d),
        };

        if !longitude.is_finite() || !latitude.is_finite() {
            return Err(EphemerisError::NonFinite { body, jd });
        }

        Ok(EclipticPosition {
            longitude: normalize_longitude(longitude),
            latitude,
        })
    }
}

/// Keplerian elements of date. Angles in degrees; `a` in AU (Earth radii for the Moon).
#[derive(Debug, Clone, Copy)]
struct OrbitalElements {
    node: f64,
    inclination: f64,
    perihelion: f64,
    a: f64,
    e: f64,
    mean_anomaly: f64,
}

fn elements(body: Body, d: f64) -> OrbitalElements {
    let (node, inclination, perihelion, a, e, mean_anomaly) = match body {
        Body::Sun => (
            0.0,
            0.0,
            282.9404 + 4.70935e-5 * d,
            1.0,
            0.016709 - 1.151e-9 * d,
            356.0470 + 0.985_600_258_5 * d,
        ),
        Body::Moon => (
            125.1228 - 0.052_953_808_3 * d,
            5.1454,
            318.0634 + 0.164_357_322_3 * d,
            60.2666,
            0.054900,
            115.3654 + 13.064_992_950_9 * d,
        ),
        Body::Mercury => (
            48.3313 + 3.24587e-5 * d,
            7.0047 + 5.00e-8 * d,
            29.1241 + 1.01444e-5 * d,
            0.387098,
            0.205635 + 5.59e-10 * d,
            168.6562 + 4.092_334_436_8 * d,
        ),
        Body::Venus => (
            76.6799 + 2.46590e-5 * d,
            3.3946 + 2.75e-8 * d,
            54.8910 + 1.38374e-5 * d,
            0.723330,
            0.006773 - 1.302e-9 * d,
            48.0052 + 1.602_130_224_4 * d,
        ),
        Body::Mars => (
            49.5574 + 2.11081e-5 * d,
            1.8497 - 1.78e-8 * d,
            286.5016 + 2.92961e-5 * d,
            1.523688,
            0.093405 + 2.516e-9 * d,
            18.6021 + 0.524_020_776_6 * d,
        ),
        Body::Jupiter => (
            100.4542 + 2.76854e-5 * d,
            1.3030 - 1.557e-7 * d,
            273.8777 + 1.64505e-5 * d,
            5.20256,
            0.048498 + 4.469e-9 * d,
            19.8950 + 0.083_085_300_1 * d,
        ),
        Body::Saturn => (
            113.6634 + 2.38980e-5 * d,
            2.4886 - 1.081e-7 * d,
            339.3939 + 2.97661e-5 * d,
            9.55475,
            0.055546 - 9.499e-9 * d,
            316.9670 + 0.033_444_228_2 * d,
        ),
    };

    OrbitalElements {
        node: normalize_longitude(node),
        inclination,
        perihelion: normalize_longitude(perihelion),
        a,
        e,
        mean_anomaly: normalize_longitude(mean_anomaly),
    }
}

fn sind(deg: f64) -> f64 {
    deg.to_radians().sin()
}

fn cosd(deg: f64) -> f64 {
    deg.to_radians().cos()
}

fn atan2d(y: f64, x: f64) -> f64 {
    y.atan2(x).to_degrees()
}

/// Eccentric anomaly in radians by Newton iteration.
fn eccentric_anomaly(mean_anomaly_deg: f64, e: f64) -> f64 {
    let m = mean_anomaly_deg.to_radians();
    let mut ecc = m + e * m.sin() * (1.0 + e * m.cos());
    for _ in 0..16 {
        let delta = (ecc - e * ecc.sin() - m) / (1.0 - e * ecc.cos());
        ecc -= delta;
        if delta.abs() < 1e-12 {
            break;
        }
    }
    ecc
}

/// True anomaly (degrees) and radius vector.
fn true_anomaly(el: &OrbitalElements) -> (f64, f64) {
    let ecc = eccentric_anomaly(el.mean_anomaly, el.e);
    let xv = el.a * (ecc.cos() - el.e);
    let yv = el.a * (1.0 - el.e * el.e).sqrt() * ecc.sin();
    (atan2d(yv, xv), xv.hypot(yv))
}

/// Rectangular ecliptic coordinates relative to the orbit's focus.
fn orbital_to_ecliptic(el: &OrbitalElements) -> (f64, f64, f64) {
    let (v, r) = true_anomaly(el);
    let u = v + el.perihelion;
    let x = r * (cosd(el.node) * cosd(u) - sind(el.node) * sind(u) * cosd(el.inclination));
    let y = r * (sind(el.node) * cosd(u) + cosd(el.node) * sind(u) * cosd(el.inclination));
    let z = r * sind(u) * sind(el.inclination);
    (x, y, z)
}

/// Geocentric longitude of the Sun and its distance in AU.
fn sun_longitude(d: f64) -> (f64, f64) {
    let el = elements(Body::Sun, d);
    let (v, r) = true_anomaly(&el);
    (v + el.perihelion, r)
}

fn moon_position(d: f64) -> (f64, f64) {
    let moon = elements(Body::Moon, d);
    let sun = elements(Body::Sun, d);
    let (x, y, z) = orbital_to_ecliptic(&moon);
    let mut lon = atan2d(y, x);
    let mut lat = atan2d(z, x.hypot(y));

    let ms = sun.mean_anomaly;
    let mm = moon.mean_anomaly;
    let ls = ms + sun.perihelion;
    let lm = mm + moon.perihelion + moon.node;
    let elong = lm - ls;
    let f = lm - moon.node;

    lon += -1.274 * sind(mm - 2.0 * elong)
        + 0.658 * sind(2.0 * elong)
        - 0.186 * sind(ms)
        - 0.059 * sind(2.0 * mm - 2.0 * elong)
        - 0.057 * sind(mm - 2.0 * elong + ms)
        + 0.053 * sind(mm + 2.0 * elong)
        + 0.046 * sind(2.0 * elong - ms)
        + 0.041 * sind(mm - ms)
        - 0.035 * sind(elong)
        - 0.031 * sind(mm + ms)
        - 0.015 * sind(2.0 * f - 2.0 * elong)
        + 0.011 * sind(mm - 4.0 * elong);

    lat += -0.173 * sind(f - 2.0 * elong)
        - 0.055 * sind(mm - f - 2.0 * elong)
        - 0.046 * sind(mm + f - 2.0 * elong)
        + 0.033 * sind(f + 2.0 * elong)
        + 0.017 * sind(2.0 * mm + f);

    (lon, lat)
}

fn planet_position(body: Body, d: f64) -> (f64, f64) {
    let el = elements(body, d);
    let (mut xh, mut yh, mut zh) = orbital_to_ecliptic(&el);

    if matches!(body, Body::Jupiter | Body::Saturn) {
        let mj = elements(Body::Jupiter, d).mean_anomaly;
        let msat = elements(Body::Saturn, d).mean_anomaly;
        let r = (xh * xh + yh * yh + zh * zh).sqrt();
        let mut lon = atan2d(yh, xh);
        let mut lat = atan2d(zh, xh.hypot(yh));

        if body == Body::Jupiter {
            lon += -0.332 * sind(2.0 * mj - 5.0 * msat - 67.6)
                - 0.056 * sind(2.0 * mj - 2.0 * msat + 21.0)
                + 0.042 * sind(3.0 * mj - 5.0 * msat + 21.0)
                - 0.036 * sind(mj - 2.0 * msat)
                + 0.022 * cosd(mj - msat)
                + 0.023 * sind(2.0 * mj - 3.0 * msat + 52.0)
                - 0.016 * sind(mj - 5.0 * msat - 69.0);
        } else {
            lon += 0.812 * sind(2.0 * mj - 5.0 * msat - 67.6)
                - 0.229 * cosd(2.0 * mj - 4.0 * msat - 2.0)
                + 0.119 * sind(mj - 2.0 * msat - 3.0)
                + 0.046 * sind(2.0 * mj - 6.0 * msat - 69.0)
                + 0.014 * sind(mj - 3.0 * msat + 32.0);
            lat += -0.020 * cosd(2.0 * mj - 4.0 * msat - 2.0)
                + 0.018 * sind(2.0 * mj - 6.0 * msat - 49.0);
        }

        xh = r * cosd(lon) * cosd(lat);
        yh = r * sind(lon) * cosd(lat);
        zh = r * sind(lat);
    }

    let (sun_lon, sun_r) = sun_longitude(d);
    let xg = xh + sun_r * cosd(sun_lon);
    let yg = yh + sun_r * sind(sun_lon);

    (atan2d(yg, xg), atan2d(zh, xg.hypot(yg)))
}
