use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current layout of the persisted profile
pub const PROFILE_VERSION: u32 = 1;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("Расскажите подробнее о регулярных тренировках")]
    MissingExperienceDetails,
    #[error("Укажите город")]
    EmptyLocation,
    #[error("Рост должен быть больше нуля: {0}")]
    InvalidHeight(f64),
    #[error("Вес должен быть больше нуля: {0}")]
    InvalidWeight(f64),
    #[error("Возраст должен быть целым числом больше нуля")]
    InvalidAge,
    #[error("Опишите ограничения по здоровью")]
    MissingLimitationDetails,
    #[error("Количество тренировок в неделю должно быть от 2 до 5: {0}")]
    InvalidDaysPerWeek(u8),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Goal {
    #[serde(rename = "5 км")]
    FiveK,
    #[serde(rename = "10 км")]
    TenK,
    #[serde(rename = "Полумарафон (21.1 км)")]
    HalfMarathon,
}

impl Goal {
    pub const ALL: [Goal; 3] = [Goal::FiveK, Goal::TenK, Goal::HalfMarathon];

    pub fn label(self) -> &'static str {
        match self {
            Goal::FiveK => "5 км",
            Goal::TenK => "10 км",
            Goal::HalfMarathon => "Полумарафон (21.1 км)",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceLevel {
    #[serde(rename = "Совсем новичок, никогда не бегал(а) регулярно.")]
    Beginner,
    #[serde(rename = "Пробовал(а) бегать раньше, но без системы.")]
    Tried,
    #[serde(rename = "Бегаю время от времени / нерегулярно.")]
    Occasional,
    #[serde(rename = "Уже бегаю регулярно")]
    Regular,
}

impl ExperienceLevel {
    pub const ALL: [ExperienceLevel; 4] = [
        ExperienceLevel::Beginner,
        ExperienceLevel::Tried,
        ExperienceLevel::Occasional,
        ExperienceLevel::Regular,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "Совсем новичок, никогда не бегал(а) регулярно.",
            ExperienceLevel::Tried => "Пробовал(а) бегать раньше, но без системы.",
            ExperienceLevel::Occasional => "Бегаю время от времени / нерегулярно.",
            ExperienceLevel::Regular => "Уже бегаю регулярно",
        }
    }

    /// Regular runners must describe their training.
    pub fn requires_details(self) -> bool {
        self == ExperienceLevel::Regular
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityLevel {
    #[serde(rename = "В основном сидячая работа/образ жизни.")]
    Sedentary,
    #[serde(rename = "Умеренная активность (прогулки, легкие упражнения).")]
    Moderate,
    #[serde(rename = "Высокая активность (физическая работа, регулярные занятия спортом).")]
    High,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 3] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Moderate,
        ActivityLevel::High,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "В основном сидячая работа/образ жизни.",
            ActivityLevel::Moderate => "Умеренная активность (прогулки, легкие упражнения).",
            ActivityLevel::High => "Высокая активность (физическая работа, регулярные занятия спортом).",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Мужской",
            Gender::Female => "Женский",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionLength {
    #[serde(rename = "30-45 мин")]
    Short,
    #[serde(rename = "45-60 мин")]
    Medium,
    #[serde(rename = "60-90 мин")]
    Long,
    #[serde(rename = "Больше 90 мин")]
    Extended,
}

impl SessionLength {
    pub const ALL: [SessionLength; 4] = [
        SessionLength::Short,
        SessionLength::Medium,
        SessionLength::Long,
        SessionLength::Extended,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SessionLength::Short => "30-45 мин",
            SessionLength::Medium => "45-60 мин",
            SessionLength::Long => "60-90 мин",
            SessionLength::Extended => "Больше 90 мин",
        }
    }
}

/// Allowed training days per week
pub const DAYS_PER_WEEK: [u8; 4] = [2, 3, 4, 5];

/// Body mass index for height in centimetres and weight in kilograms, one decimal.
pub fn compute_bmi(height_cm: f64, weight_kg: f64) -> f64 {
    let meters = height_cm / 100.0;
    (weight_kg / (meters * meters) * 10.0).round() / 10.0
}

fn current_version() -> u32 {
    PROFILE_VERSION
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// Answers collected during onboarding.
///
/// Every field is optional so a partially completed sequence can be stored;
/// writes go through the setters, which validate their input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingProfile {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<Goal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<ActivityLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_steps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_limitations: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limitation_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_per_week: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_per_session: Option<SessionLength>,
}

impl Default for OnboardingProfile {
    fn default() -> Self {
        Self {
            version: PROFILE_VERSION,
            goal: None,
            experience_level: None,
            experience_details: None,
            activity_level: None,
            average_steps: None,
            gender: None,
            location: None,
            height: None,
            weight: None,
            age: None,
            bmi: None,
            motivation: None,
            has_limitations: None,
            limitation_details: None,
            days_per_week: None,
            time_per_session: None,
        }
    }
}

impl OnboardingProfile {
    pub fn set_goal(&mut self, goal: Goal) {
        self.goal = Some(goal);
    }

    pub fn set_experience(
        &mut self,
        level: ExperienceLevel,
        details: Option<String>,
    ) -> Result<(), ProfileError> {
        let details = non_blank(details);
        if level.requires_details() && details.is_none() {
            return Err(ProfileError::MissingExperienceDetails);
        }
        self.experience_level = Some(level);
        self.experience_details = details;
        Ok(())
    }

    pub fn set_activity(&mut self, level: ActivityLevel) {
        self.activity_level = Some(level);
    }

    /// `None` records a skipped step.
    pub fn set_average_steps(&mut self, steps: Option<u32>) {
        self.average_steps = steps;
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.gender = Some(gender);
    }

    pub fn set_location(&mut self, location: &str) -> Result<(), ProfileError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(ProfileError::EmptyLocation);
        }
        self.location = Some(location.to_string());
        Ok(())
    }

    /// Stores height (cm), weight (kg) and age, returning the derived BMI.
    pub fn set_anthropometry(&mut self, height: f64, weight: f64, age: u32) -> Result<f64, ProfileError> {
        if !height.is_finite() || height <= 0.0 {
            return Err(ProfileError::InvalidHeight(height));
        }
        if !weight.is_finite() || weight <= 0.0 {
            return Err(ProfileError::InvalidWeight(weight));
        }
        if age == 0 {
            return Err(ProfileError::InvalidAge);
        }

        let bmi = compute_bmi(height, weight);
        self.height = Some(height);
        self.weight = Some(weight);
        self.age = Some(age);
        self.bmi = Some(bmi);
        Ok(bmi)
    }

    pub fn set_motivation(&mut self, motivation: Option<String>) {
        self.motivation = non_blank(motivation);
    }

    pub fn set_limitations(&mut self, has: bool, details: Option<String>) -> Result<(), ProfileError> {
        let details = non_blank(details);
        if has && details.is_none() {
            return Err(ProfileError::MissingLimitationDetails);
        }
        self.has_limitations = Some(has);
        self.limitation_details = if has { details } else { None };
        Ok(())
    }

    pub fn set_availability(&mut self, days_per_week: u8, session: SessionLength) -> Result<(), ProfileError> {
        if !DAYS_PER_WEEK.contains(&days_per_week) {
            return Err(ProfileError::InvalidDaysPerWeek(days_per_week));
        }
        self.days_per_week = Some(days_per_week);
        self.time_per_session = Some(session);
        Ok(())
    }
}
