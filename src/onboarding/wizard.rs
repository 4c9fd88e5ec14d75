//! Interactive terminal front-end for the onboarding sequence.

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use std::path::Path;

use super::profile::{
    ActivityLevel, ExperienceLevel, Gender, Goal, OnboardingProfile, SessionLength, DAYS_PER_WEEK,
};
use super::sequencer::{OnboardingEvent, OnboardingSequencer, Stage, StepInput, Tab};
use super::store::JsonFileStore;

fn select<T: Copy>(prompt: &str, options: &[T], label: impl Fn(T) -> String) -> Result<T> {
    let items: Vec<String> = options.iter().map(|o| label(*o)).collect();
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact()?;
    Ok(options[selection])
}

fn optional_text(prompt: &str) -> Result<Option<String>> {
    let text: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(Some(text).filter(|t| !t.trim().is_empty()))
}

/// Reads a step count; an empty answer means skip.
fn parse_steps(raw: &str) -> Result<Option<u32>, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u32>()
        .map(Some)
        .map_err(|_| "Введите целое число шагов")
}

/// Asks the question for `stage`; `None` means the user skipped it.
fn ask(stage: Stage) -> Result<Option<StepInput>> {
    let theme = ColorfulTheme::default();
    let input = match stage {
        Stage::Welcome => {
            StepInput::Goal(select("Какая у вас цель?", &Goal::ALL, |g| g.label().to_string())?)
        }
        Stage::Experience => {
            let level = select("Ваш беговой опыт", &ExperienceLevel::ALL, |l| {
                l.label().to_string()
            })?;
            let details = if level.requires_details() {
                optional_text("Как часто и сколько вы бегаете?")?
            } else {
                None
            };
            StepInput::Experience { level, details }
        }
        Stage::Activity => StepInput::Activity(select(
            "Ваша повседневная активность",
            &ActivityLevel::ALL,
            |a| a.label().to_string(),
        )?),
        Stage::Steps => {
            let raw: String = Input::with_theme(&theme)
                .with_prompt("Среднее количество шагов в день (Enter, чтобы пропустить)")
                .allow_empty(true)
                .validate_with(|input: &String| parse_steps(input).map(|_| ()))
                .interact_text()?;
            match parse_steps(&raw) {
                Ok(None) => return Ok(None),
                Ok(steps) => StepInput::Steps(steps),
                Err(message) => anyhow::bail!(message),
            }
        }
        Stage::Gender => StepInput::Gender(select("Ваш пол", &Gender::ALL, |g| g.label().to_string())?),
        Stage::Location => {
            let location: String = Input::with_theme(&theme)
                .with_prompt("Ваш город")
                .interact_text()?;
            StepInput::Location(location)
        }
        Stage::Anthropometry => {
            let height: f64 = Input::with_theme(&theme).with_prompt("Рост, см").interact_text()?;
            let weight: f64 = Input::with_theme(&theme).with_prompt("Вес, кг").interact_text()?;
            let age: u32 = Input::with_theme(&theme).with_prompt("Возраст").interact_text()?;
            StepInput::Anthropometry {
                height,
                weight,
                age,
            }
        }
        Stage::Motivation => {
            match optional_text("Что вас мотивирует? (Enter, чтобы пропустить)")? {
                None => return Ok(None),
                some => StepInput::Motivation(some),
            }
        }
        Stage::Limitations => {
            let has = Confirm::with_theme(&theme)
                .with_prompt("Есть ли ограничения по здоровью?")
                .default(false)
                .interact()?;
            let details = if has {
                optional_text("Опишите ограничения")?
            } else {
                None
            };
            StepInput::Limitations { has, details }
        }
        Stage::TimeAvailability => {
            let days_per_week = select("Сколько дней в неделю готовы тренироваться?", &DAYS_PER_WEEK, |d| {
                d.to_string()
            })?;
            let session = select("Сколько времени на тренировку?", &SessionLength::ALL, |s| {
                s.label().to_string()
            })?;
            StepInput::TimeAvailability {
                days_per_week,
                session,
            }
        }
        Stage::Complete => anyhow::bail!("onboarding is already complete"),
    };
    Ok(Some(input))
}

/// Short text version of a completed profile.
pub fn summarize(profile: &OnboardingProfile) -> String {
    let mut lines = Vec::new();
    if let Some(goal) = profile.goal {
        lines.push(format!("Цель: {}", goal.label()));
    }
    if let Some(level) = profile.experience_level {
        lines.push(format!("Опыт: {}", level.label()));
    }
    if let Some(activity) = profile.activity_level {
        lines.push(format!("Активность: {}", activity.label()));
    }
    if let Some(steps) = profile.average_steps {
        lines.push(format!("Шагов в день: {}", steps));
    }
    if let Some(location) = &profile.location {
        lines.push(format!("Город: {}", location));
    }
    if let (Some(height), Some(weight), Some(bmi)) = (profile.height, profile.weight, profile.bmi) {
        lines.push(format!("Рост {} см, вес {} кг, ИМТ {:.1}", height, weight, bmi));
    }
    if let (Some(days), Some(session)) = (profile.days_per_week, profile.time_per_session) {
        lines.push(format!("Тренировки: {} раз(а) в неделю, {}", days, session.label()));
    }
    lines.join("\n")
}

fn tab_title(tab: Tab) -> &'static str {
    match tab {
        Tab::Plan => "План",
        Tab::Goals => "Цели",
        Tab::Club => "Клуб",
        Tab::Profile => "Профиль",
    }
}

/// Runs onboarding against the state file at `path` until the user exits.
pub fn run_wizard(path: &Path, reset: bool) -> Result<()> {
    let mut sequencer = OnboardingSequencer::restore(JsonFileStore::open(path));
    if reset {
        sequencer.apply(OnboardingEvent::Reset)?;
    }

    'session: loop {
        while !sequencer.is_complete() {
            let stage = sequencer.stage();
            let event = match ask(stage)? {
                Some(input) => OnboardingEvent::Submit(input),
                None => OnboardingEvent::Skip,
            };
            if let Err(e) = sequencer.apply(event) {
                println!("{}", e);
            }
        }

        println!("\n{}\n", summarize(sequencer.profile()));

        loop {
            let active = sequencer.active_tab();
            let mut items: Vec<String> = Tab::ALL
                .iter()
                .map(|tab| {
                    let marker = if *tab == active { "● " } else { "  " };
                    format!("{}{}", marker, tab_title(*tab))
                })
                .collect();
            items.push("Сбросить профиль".to_string());
            items.push("Выход".to_string());

            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("Раздел")
                .items(&items)
                .default(Tab::ALL.iter().position(|t| *t == active).unwrap_or(0))
                .interact()?;

            match selection {
                i if i < Tab::ALL.len() => {
                    sequencer.apply(OnboardingEvent::SelectTab(Tab::ALL[i]))?;
                }
                i if i == Tab::ALL.len() => {
                    sequencer.apply(OnboardingEvent::Reset)?;
                    println!("Профиль сброшен.");
                    continue 'session;
                }
                _ => break 'session,
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_profile() {
        let mut profile = OnboardingProfile::default();
        profile.set_goal(Goal::FiveK);
        profile.set_location("Казань").unwrap();
        profile.set_anthropometry(180.0, 75.0, 30).unwrap();
        profile.set_availability(2, SessionLength::Short).unwrap();

        let summary = summarize(&profile);
        assert!(summary.contains("Цель: 5 км"));
        assert!(summary.contains("Город: Казань"));
        assert!(summary.contains("ИМТ 23.1"));
        assert!(summary.contains("2 раз(а) в неделю, 30-45 мин"));
    }

    #[test]
    fn test_steps_answer_must_be_numeric() {
        assert_eq!(parse_steps(" 8000 "), Ok(Some(8000)));
        assert_eq!(parse_steps(""), Ok(None));
        assert_eq!(parse_steps("   "), Ok(None));
        assert!(parse_steps("abc").is_err());
        assert!(parse_steps("-5").is_err());
        assert!(parse_steps("12.5").is_err());
    }

    #[test]
    fn test_no_question_after_completion() {
        let err = ask(Stage::Complete).unwrap_err();
        assert_eq!(err.to_string(), "onboarding is already complete");
    }

    #[test]
    fn test_summarize_empty_profile() {
        assert!(summarize(&OnboardingProfile::default()).is_empty());
    }
}
