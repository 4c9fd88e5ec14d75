use thiserror::Error;

use crate::ephemeris::Body;

/// Errors raised while turning a birth request into a chart.
///
/// Everything except [`ChartError::Internal`] is an input problem and is
/// reported to the caller verbatim.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Город не найден")]
    UnknownCity(String),
    #[error("Некорректная дата: {0}")]
    InvalidDate(String),
    #[error("Некорректное время: {0}")]
    InvalidTime(String),
    #[error("Некорректное смещение часового пояса: {0}")]
    InvalidOffset(i32),
    #[error("Не удалось рассчитать положение Солнца")]
    MissingSun,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChartError {
    /// Whether the caller is at fault.
    pub fn is_validation(&self) -> bool {
        !matches!(self, ChartError::Internal(_))
    }
}

/// Errors produced by an ephemeris for a single body.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EphemerisError {
    #[error("{body:?} is not supported at julian day {jd}: outside {min_year}..{max_year}")]
    OutOfRange {
        body: Body,
        jd: f64,
        min_year: i32,
        max_year: i32,
    },
    #[error("Non-finite result for {body:?} at julian day {jd}")]
    NonFinite { body: Body, jd: f64 },
}
