//! Forecast text for a chart: a generated narrative when the collaborator
//! delivers one, templates otherwise.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::aspects::AspectReading;
use crate::ephemeris::Body;
use crate::formatters::{
    body_glyph, category_templates, format_period, moon_advice, planet_influences,
    FALLBACK_MOON_ADVICE,
};
use crate::narrative::{NarrativeFailure, NarrativeOutcome};
use crate::positions::BodyPositions;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeSource {
    Template,
    Generated,
}

/// One narrative block covering the whole forecast period.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPayload {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub forecast: String,
    pub source: NarrativeSource,
}

/// Everything a narrative may refer to.
#[derive(Debug, Clone, Copy)]
pub struct ForecastContext<'a> {
    pub name: Option<&'a str>,
    pub natal: &'a BodyPositions,
    pub transit: &'a BodyPositions,
    pub sun_aspect: AspectReading,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

fn sign_or_unknown(positions: &BodyPositions, body: Body) -> String {
    positions
        .placement(body)
        .map(|p| p.sign.to_string())
        .unwrap_or_else(|| "неизвестно".to_string())
}

/// Prompt for the text-generation service.
pub fn build_prompt(ctx: &ForecastContext) -> String {
    let period = format_period(ctx.start, ctx.end);
    let (heading, opening) = match ctx.name {
        Some(name) => (
            format!("Персональный астрологический прогноз для {} на период {}.", name, period),
            format!("{}, ваш астрологический прогноз готов!", name),
        ),
        None => (
            format!("Персональный астрологический прогноз на период {}.", period),
            "Ваш астрологический прогноз готов!".to_string(),
        ),
    };

    let natal_sun = match ctx.natal.placement(Body::Sun) {
        Some(p) => format!("Солнце {} {:.2}°", p.sign, p.degree),
        None => "Солнце неизвестно".to_string(),
    };
    let natal_rest: Vec<String> = Body::ALL[1..]
        .iter()
        .map(|body| format!("{} {}", body.name(), sign_or_unknown(ctx.natal, *body)))
        .collect();
    let transits: Vec<String> = Body::ALL
        .iter()
        .map(|body| format!("{} {}", body.name(), sign_or_unknown(ctx.transit, *body)))
        .collect();

    format!(
        "{heading}\n\n\
         Натальная карта: {natal_sun}, {natal_rest}.\n\n\
         Транзиты: {transits}.\n\n\
         Аспект транзитного Солнца к натальному: {aspect}.\n\n\
         Начни \"{opening}\" и включи: введение, планетарные влияния с эмодзи, \
         5 сфер жизни (💼💰❤️🏥🌟), важные даты, намек на полный годовой прогноз, \
         заключение о свободе воли. Используй термины: транзит, аспект, квадрат, тригон. Markdown.",
        natal_rest = natal_rest.join(", "),
        transits = transits.join(", "),
        aspect = ctx.sun_aspect.describe(),
    )
}

/// Writes the static forecast, drawing sentence choices from `rng`.
pub fn compose_template<R: Rng + ?Sized>(ctx: &ForecastContext, rng: &mut R) -> String {
    let mut output = String::new();
    if let Some(name) = ctx.name {
        output.push_str(&format!("{}, ваш астрологический прогноз готов!\n\n", name));
    }
    output.push_str(&format!(
        "## Прогноз на период {}\n\n",
        format_period(ctx.start, ctx.end)
    ));

    let pool = category_templates(ctx.sun_aspect.category);
    output.push_str(pool[rng.random_range(0..pool.len())]);

    if let Some(sun) = ctx.transit.placement(Body::Sun) {
        output.push_str(&format!(" Солнце сейчас в знаке {}.", sun.sign));
    }
    match ctx.transit.placement(Body::Moon) {
        Some(moon) => output.push_str(&format!(
            " Луна в знаке {} способствует {}",
            moon.sign,
            moon_advice(moon.sign)
        )),
        None => output.push_str(&format!(" Луна способствует {}", FALLBACK_MOON_ADVICE)),
    }

    output.push_str(&format!(
        "\n\n**Аспект Солнца:** {}\n\n### Влияние планет\n\n",
        ctx.sun_aspect.describe()
    ));

    for body in &Body::ALL[2..] {
        let Some(placement) = ctx.transit.placement(*body) else {
            continue;
        };
        let phrases = planet_influences(*body);
        if phrases.is_empty() {
            continue;
        }
        output.push_str(&format!(
            "- {} **{} в знаке {}** {}\n",
            body_glyph(*body),
            body.name(),
            placement.sign,
            phrases[rng.random_range(0..phrases.len())]
        ));
    }

    output.trim_end().to_string()
}

/// Static forecast writer.
///
/// With a seed every call yields the same text for the same context.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator {
    seed: Option<u64>,
}

impl TemplateNarrator {
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }

    pub fn compose(&self, ctx: &ForecastContext) -> String {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        compose_template(ctx, &mut rng)
    }
}

/// Chooses the generated narrative or falls back to templates.
pub fn compose_forecast(
    outcome: NarrativeOutcome,
    ctx: &ForecastContext,
    templates: &TemplateNarrator,
) -> ForecastPayload {
    let (forecast, source) = match outcome {
        NarrativeOutcome::Generated(text) => (text, NarrativeSource::Generated),
        NarrativeOutcome::Unavailable(failure) => {
            if failure == NarrativeFailure::MissingCredential {
                tracing::debug!("No credential, using template forecast");
            } else {
                tracing::warn!("Generated forecast unavailable, using templates: {}", failure);
            }
            (templates.compose(ctx), NarrativeSource::Template)
        }
    };

    ForecastPayload {
        start_date: ctx.start,
        end_date: ctx.end,
        forecast,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::OrbitalEphemeris;
    use crate::positions::resolve_positions;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    struct Fixture {
        natal: BodyPositions,
        transit: BodyPositions,
    }

    impl Fixture {
        fn new() -> Self {
            let eph = OrbitalEphemeris::new();
            Self {
                natal: resolve_positions(&eph, Utc.with_ymd_and_hms(1990, 1, 1, 9, 0, 0).unwrap()),
                transit: resolve_positions(&eph, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
            }
        }

        fn context<'a>(&'a self, name: Option<&'a str>) -> ForecastContext<'a> {
            ForecastContext {
                name,
                natal: &self.natal,
                transit: &self.transit,
                sun_aspect: AspectReading::between(
                    self.transit.longitude(Body::Sun).unwrap(),
                    self.natal.longitude(Body::Sun).unwrap(),
                ),
                start: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            }
        }
    }

    #[test]
    fn test_seeded_templates_are_reproducible() {
        let fixture = Fixture::new();
        let ctx = fixture.context(Some("Анна"));
        let narrator = TemplateNarrator::new(Some(7));
        assert_eq!(narrator.compose(&ctx), narrator.compose(&ctx));
    }

    #[test]
    fn test_template_mentions_transits() {
        let fixture = Fixture::new();
        let ctx = fixture.context(Some("Анна"));
        let text = TemplateNarrator::new(Some(1)).compose(&ctx);

        assert!(text.starts_with("Анна, ваш астрологический прогноз готов!"));
        assert!(text.contains("01.06.2024 - 01.07.2024"));
        let sun = fixture.transit.placement(Body::Sun).unwrap().sign;
        assert!(text.contains(&format!("Солнце сейчас в знаке {}.", sun)));
        let moon = fixture.transit.placement(Body::Moon).unwrap().sign;
        assert!(text.contains(moon_advice(moon)));
        assert!(text.contains("♄ **Сатурн в знаке"));
    }

    #[test]
    fn test_template_opens_with_category_sentence() {
        let fixture = Fixture::new();
        let ctx = fixture.context(None);
        let text = TemplateNarrator::new(Some(3)).compose(&ctx);
        let body = text.split("\n\n").nth(1).unwrap();
        assert!(category_templates(ctx.sun_aspect.category)
            .iter()
            .any(|sentence| body.starts_with(sentence)));
    }

    #[test]
    fn test_missing_moon_uses_fallback_advice() {
        let mut fixture = Fixture::new();
        fixture.transit.planets.remove(&Body::Moon);
        fixture.transit.signs.remove(&Body::Moon);
        let text = TemplateNarrator::new(Some(3)).compose(&fixture.context(None));
        assert!(text.contains("Луна способствует позитивному настрою."));
    }

    #[test]
    fn test_prompt_contents() {
        let fixture = Fixture::new();
        let prompt = build_prompt(&fixture.context(Some("Анна")));
        assert!(prompt.starts_with("Персональный астрологический прогноз для Анна на период 01.06.2024 - 01.07.2024."));
        for body in Body::ALL {
            assert!(prompt.contains(body.name()));
        }
        assert!(prompt.contains("Начни \"Анна, ваш астрологический прогноз готов!\""));

        let anonymous = build_prompt(&fixture.context(None));
        assert!(anonymous.contains("Начни \"Ваш астрологический прогноз готов!\""));
    }

    #[test]
    fn test_compose_forecast_prefers_generated_text() {
        let fixture = Fixture::new();
        let ctx = fixture.context(None);
        let payload = compose_forecast(
            NarrativeOutcome::Generated("Готово".to_string()),
            &ctx,
            &TemplateNarrator::default(),
        );
        assert_eq!(payload.source, NarrativeSource::Generated);
        assert_eq!(payload.forecast, "Готово");
    }

    #[test]
    fn test_compose_forecast_falls_back_on_failure() {
        let fixture = Fixture::new();
        let ctx = fixture.context(None);
        for failure in [
            NarrativeFailure::MissingCredential,
            NarrativeFailure::Timeout(Duration::from_secs(1)),
            NarrativeFailure::Status(500),
        ] {
            let payload = compose_forecast(
                NarrativeOutcome::Unavailable(failure),
                &ctx,
                &TemplateNarrator::new(Some(5)),
            );
            assert_eq!(payload.source, NarrativeSource::Template);
            assert!(!payload.forecast.is_empty());
            assert_eq!(payload.end_date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        }
    }

    #[test]
    fn test_payload_serializes_camel_case() {
        let fixture = Fixture::new();
        let payload = compose_forecast(
            NarrativeOutcome::Generated("x".to_string()),
            &fixture.context(None),
            &TemplateNarrator::default(),
        );
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["startDate"], "2024-06-01");
        assert_eq!(json["endDate"], "2024-07-01");
        assert_eq!(json["source"], "generated");
    }
}
