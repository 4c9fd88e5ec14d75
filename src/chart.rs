use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::aspects::AspectReading;
use crate::cities::{City, CityDirectory};
use crate::config::AppConfig;
use crate::ephemeris::{Body, Ephemeris, OrbitalEphemeris};
use crate::error::ChartError;
use crate::forecast::{build_prompt, compose_forecast, ForecastContext, ForecastPayload, TemplateNarrator};
use crate::houses::{calculate_houses, HouseCusp};
use crate::models::CalculateRequest;
use crate::narrative::{narrator_from_config, NarrativeGenerator};
use crate::positions::{resolve_positions, PlanetPosition};
use crate::zodiac::ZodiacPlacement;

/// Widest real-world UTC offset, in minutes
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// A computed natal chart with its forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub city: City,
    /// Birth instant in UTC
    pub birth_date: DateTime<Utc>,
    /// Minutes east of UTC the birth time was given in
    pub utc_offset: i32,
    pub planets: BTreeMap<Body, PlanetPosition>,
    pub zodiac_signs: BTreeMap<Body, ZodiacPlacement>,
    pub ascendant: ZodiacPlacement,
    pub houses: Vec<HouseCusp>,
    pub sun_aspect: AspectReading,
    pub forecast: ForecastPayload,
}

/// Validated birth data.
#[derive(Debug, Clone, PartialEq)]
pub struct BirthData {
    pub city: City,
    pub instant: DateTime<Utc>,
    pub utc_offset: i32,
}

/// Chart calculation shared by the HTTP and MCP surfaces.
#[derive(Clone)]
pub struct ChartService {
    cities: CityDirectory,
    ephemeris: Arc<dyn Ephemeris>,
    narrator: Arc<dyn NarrativeGenerator>,
    templates: TemplateNarrator,
    forecast_days: u32,
}

impl ChartService {
    pub fn new(
        cities: CityDirectory,
        ephemeris: Arc<dyn Ephemeris>,
        narrator: Arc<dyn NarrativeGenerator>,
        templates: TemplateNarrator,
        forecast_days: u32,
    ) -> Self {
        Self {
            cities,
            ephemeris,
            narrator,
            templates,
            forecast_days,
        }
    }

    /// Wires the built-in ephemeris, the configured city list and narrator.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let cities = match &config.cities_path {
            Some(path) => CityDirectory::load(path)?,
            None => CityDirectory::embedded()?,
        };
        tracing::info!("Loaded {} cities", cities.len());

        Ok(Self::new(
            cities,
            Arc::new(OrbitalEphemeris::new()),
            narrator_from_config(&config.narrative)?,
            TemplateNarrator::new(config.forecast_seed),
            config.forecast_days,
        ))
    }

    pub fn cities(&self) -> &CityDirectory {
        &self.cities
    }

    /// Checks the request and resolves the birth instant. The city is checked first.
    pub fn parse_birth(&self, request: &CalculateRequest) -> Result<BirthData, ChartError> {
        let city = self
            .cities
            .find(&request.city)
            .cloned()
            .ok_or_else(|| ChartError::UnknownCity(request.city.clone()))?;

        let date = NaiveDate::parse_from_str(request.date.trim(), "%Y-%m-%d")
            .map_err(|_| ChartError::InvalidDate(request.date.clone()))?;

        let raw_time = request.time.trim();
        let time = NaiveTime::parse_from_str(raw_time, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw_time, "%H:%M"))
            .map_err(|_| ChartError::InvalidTime(request.time.clone()))?;

        let utc_offset = request.utc_offset.unwrap_or(0);
        if utc_offset.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ChartError::InvalidOffset(utc_offset));
        }
        let offset = FixedOffset::east_opt(utc_offset * 60).ok_or(ChartError::InvalidOffset(utc_offset))?;

        let instant = NaiveDateTime::new(date, time)
            .and_local_timezone(offset)
            .single()
            .ok_or_else(|| ChartError::InvalidTime(request.time.clone()))?
            .with_timezone(&Utc);

        Ok(BirthData {
            city,
            instant,
            utc_offset,
        })
    }

    /// Builds the chart and a forecast for the period starting at `now`.
    pub async fn calculate(
        &self,
        request: &CalculateRequest,
        now: DateTime<Utc>,
    ) -> Result<ChartRecord, ChartError> {
        let birth = self.parse_birth(request)?;
        tracing::info!(city = %birth.city.name, birth = %birth.instant, "Calculating chart");

        let natal = resolve_positions(self.ephemeris.as_ref(), birth.instant);
        let natal_sun = natal.longitude(Body::Sun).ok_or(ChartError::MissingSun)?;
        let houses = calculate_houses(birth.instant, birth.city.lon);

        let transit = resolve_positions(self.ephemeris.as_ref(), now);
        let transit_sun = transit
            .longitude(Body::Sun)
            .ok_or_else(|| ChartError::Internal(format!("transit Sun unavailable at {}", now)))?;
        let sun_aspect = AspectReading::between(transit_sun, natal_sun);

        let start = now.date_naive();
        let end = start
            .checked_add_days(Days::new(u64::from(self.forecast_days)))
            .ok_or_else(|| ChartError::Internal(format!("forecast period overflows from {}", start)))?;

        let name = request
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());

        let ctx = ForecastContext {
            name,
            natal: &natal,
            transit: &transit,
            sun_aspect,
            start,
            end,
        };
        let outcome = self.narrator.generate(&build_prompt(&ctx)).await;
        let forecast = compose_forecast(outcome, &ctx, &self.templates);

        Ok(ChartRecord {
            name: name.map(str::to_string),
            city: birth.city,
            birth_date: birth.instant,
            utc_offset: birth.utc_offset,
            planets: natal.planets,
            zodiac_signs: natal.signs,
            ascendant: houses.ascendant,
            houses: houses.cusps,
            sun_aspect,
            forecast,
        })
    }
}
