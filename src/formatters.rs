use chrono::NaiveDate;

use crate::aspects::AspectCategory;
use crate::chart::ChartRecord;
use crate::cities::City;
use crate::ephemeris::Body;
use crate::zodiac::ZodiacSign;

const FAVORABLE_TEMPLATES: &[&str] = &[
    "Отличный период для новых начинаний!",
    "Энергия планет благоприятствует вашим планам.",
    "В эти дни вы почувствуете прилив сил и вдохновения.",
    "Благоприятное время для общения и новых знакомств.",
    "Ваша интуиция будет особенно сильна.",
];

const NEUTRAL_TEMPLATES: &[&str] = &[
    "Период подходит для решения повседневных задач.",
    "Стабильное время, подходящее для планирования.",
    "Умеренная активность планет создаёт спокойную атмосферу.",
    "Время благоприятно для размышлений и анализа.",
    "Хорошее время для работы над долгосрочными проектами.",
];

const CHALLENGING_TEMPLATES: &[&str] = &[
    "Будьте внимательны к деталям.",
    "Период может принести неожиданные повороты.",
    "Рекомендуется проявить осторожность в принятии решений.",
    "Энергия планет требует от вас терпения.",
    "Избегайте конфликтных ситуаций.",
];

/// Used when the transit Moon could not be resolved
pub const FALLBACK_MOON_ADVICE: &str = "позитивному настрою.";

/// Opening sentences for a period of the given tone.
pub fn category_templates(category: AspectCategory) -> &'static [&'static str] {
    match category {
        AspectCategory::Favorable => FAVORABLE_TEMPLATES,
        AspectCategory::Neutral => NEUTRAL_TEMPLATES,
        AspectCategory::Challenging => CHALLENGING_TEMPLATES,
    }
}

/// Completes "Луна в знаке X способствует ..."
pub fn moon_advice(sign: ZodiacSign) -> &'static str {
    match sign {
        ZodiacSign::Aries => "активным действиям и решительности.",
        ZodiacSign::Taurus => "практичности и заботе о материальном благополучии.",
        ZodiacSign::Gemini => "общению и обмену информацией.",
        ZodiacSign::Cancer => "заботе о близких и домашним делам.",
        ZodiacSign::Leo => "творчеству и самовыражению.",
        ZodiacSign::Virgo => "организации и вниманию к деталям.",
        ZodiacSign::Libra => "гармонии в отношениях и эстетике.",
        ZodiacSign::Scorpio => "глубоким размышлениям и трансформации.",
        ZodiacSign::Sagittarius => "расширению горизонтов и обучению.",
        ZodiacSign::Capricorn => "целеустремлённости и карьерным достижениям.",
        ZodiacSign::Aquarius => "новаторству и общению с друзьями.",
        ZodiacSign::Pisces => "интуиции и духовным практикам.",
    }
}

/// Phrases describing what a transiting body colours; Sun and Moon are
/// covered by their own sentences and have none.
pub fn planet_influences(body: Body) -> &'static [&'static str] {
    match body {
        Body::Mercury => &[
            "подчёркивает темы общения, договоров и учёбы.",
            "обостряет мышление, удачное время для переговоров.",
            "просит перепроверять документы и переписку.",
        ],
        Body::Venus => &[
            "смягчает отношения и располагает к примирению.",
            "усиливает интерес к красоте, искусству и комфорту.",
            "влияет на финансы и личные симпатии.",
        ],
        Body::Mars => &[
            "добавляет энергии и решимости в делах.",
            "подталкивает к активным действиям, берегите силы.",
            "поддерживает спорт и физическую нагрузку.",
        ],
        Body::Jupiter => &[
            "открывает возможности для роста и расширения.",
            "благоприятствует обучению и дальним планам.",
            "приносит удачу в начинаниях с долгим горизонтом.",
        ],
        Body::Saturn => &[
            "требует дисциплины и ответственности.",
            "проверяет на прочность долгосрочные обязательства.",
            "вознаграждает терпение и систематичную работу.",
        ],
        Body::Sun | Body::Moon => &[],
    }
}

pub fn body_glyph(body: Body) -> &'static str {
    match body {
        Body::Sun => "☉",
        Body::Moon => "☽",
        Body::Mercury => "☿",
        Body::Venus => "♀",
        Body::Mars => "♂",
        Body::Jupiter => "♃",
        Body::Saturn => "♄",
    }
}

/// Period in the `dd.mm.yyyy - dd.mm.yyyy` form used in forecast headings.
pub fn format_period(start: NaiveDate, end: NaiveDate) -> String {
    format!("{} - {}", start.format("%d.%m.%Y"), end.format("%d.%m.%Y"))
}

/// Formats a city search result into a human-readable string
pub fn format_cities(cities: &[City]) -> String {
    if cities.is_empty() {
        return "Города не найдены.".to_string();
    }

    let mut output = format!("Найдено городов: {}\n\n", cities.len());
    for city in cities {
        output.push_str(&format!("{} ({:.4}, {:.4})\n", city.name, city.lat, city.lon));
    }
    output
}

/// Formats a calculated chart into a human-readable string
pub fn format_chart(chart: &ChartRecord) -> String {
    let mut output = match &chart.name {
        Some(name) => format!("Натальная карта: {}\n", name),
        None => String::from("Натальная карта\n"),
    };
    output.push_str(&format!(
        "Место рождения: {}\nВремя рождения (UTC): {}\n\n",
        chart.city.name,
        chart.birth_date.format("%Y-%m-%d %H:%M")
    ));

    output.push_str("Планеты:\n");
    for (body, placement) in &chart.zodiac_signs {
        output.push_str(&format!("  {} {}: {}\n", body_glyph(*body), body.name(), placement));
    }

    output.push_str(&format!("\nАсцендент: {}\n", chart.ascendant));
    output.push_str("Дома:\n");
    for cusp in &chart.houses {
        output.push_str(&format!(
            "  {:>2}: {} ({:.2}°)\n",
            cusp.number, cusp.sign, cusp.longitude
        ));
    }

    output.push_str(&format!(
        "\nАспект транзитного Солнца к натальному: {}\n\n",
        chart.sun_aspect.describe()
    ));
    output.push_str(&format!(
        "Прогноз на период {}:\n\n{}\n",
        format_period(chart.forecast.start_date, chart.forecast.end_date),
        chart.forecast.forecast
    ));
    output
}
