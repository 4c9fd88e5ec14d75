use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::profile::{
    ActivityLevel, ExperienceLevel, Gender, Goal, OnboardingProfile, ProfileError, SessionLength,
};
use super::store::{Snapshot, SnapshotStore};

/// Position in the onboarding sequence.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Stage {
    #[default]
    Welcome,
    Experience,
    Activity,
    Steps,
    Gender,
    Location,
    Anthropometry,
    Motivation,
    Limitations,
    TimeAvailability,
    Complete,
}

impl Stage {
    pub const ALL: [Stage; 11] = [
        Stage::Welcome,
        Stage::Experience,
        Stage::Activity,
        Stage::Steps,
        Stage::Gender,
        Stage::Location,
        Stage::Anthropometry,
        Stage::Motivation,
        Stage::Limitations,
        Stage::TimeAvailability,
        Stage::Complete,
    ];

    /// Persisted identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Welcome => "welcome",
            Stage::Experience => "experience",
            Stage::Activity => "activity",
            Stage::Steps => "steps",
            Stage::Gender => "gender",
            Stage::Location => "location",
            Stage::Anthropometry => "anthropometry",
            Stage::Motivation => "motivation",
            Stage::Limitations => "limitations",
            Stage::TimeAvailability => "timeAvailability",
            Stage::Complete => "app",
        }
    }

    /// Stage reached after this one is answered; `Complete` is terminal.
    pub fn next(self) -> Stage {
        match self {
            Stage::Welcome => Stage::Experience,
            Stage::Experience => Stage::Activity,
            Stage::Activity => Stage::Steps,
            Stage::Steps => Stage::Gender,
            Stage::Gender => Stage::Location,
            Stage::Location => Stage::Anthropometry,
            Stage::Anthropometry => Stage::Motivation,
            Stage::Motivation => Stage::Limitations,
            Stage::Limitations => Stage::TimeAvailability,
            Stage::TimeAvailability | Stage::Complete => Stage::Complete,
        }
    }

    pub fn is_skippable(self) -> bool {
        matches!(self, Stage::Steps | Stage::Motivation)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| format!("unknown onboarding stage: {}", s))
    }
}

/// Section of the main interface shown after onboarding.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Plan,
    Goals,
    Club,
    Profile,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Plan, Tab::Goals, Tab::Club, Tab::Profile];

    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Plan => "plan",
            Tab::Goals => "goals",
            Tab::Club => "club",
            Tab::Profile => "profile",
        }
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.as_str() == s)
            .ok_or_else(|| format!("unknown tab: {}", s))
    }
}

/// Answer to one onboarding step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepInput {
    Goal(Goal),
    Experience {
        level: ExperienceLevel,
        details: Option<String>,
    },
    Activity(ActivityLevel),
    Steps(Option<u32>),
    Gender(Gender),
    Location(String),
    Anthropometry {
        height: f64,
        weight: f64,
        age: u32,
    },
    Motivation(Option<String>),
    Limitations {
        has: bool,
        details: Option<String>,
    },
    TimeAvailability {
        days_per_week: u8,
        session: SessionLength,
    },
}

impl StepInput {
    /// Stage this answer belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            StepInput::Goal(_) => Stage::Welcome,
            StepInput::Experience { .. } => Stage::Experience,
            StepInput::Activity(_) => Stage::Activity,
            StepInput::Steps(_) => Stage::Steps,
            StepInput::Gender(_) => Stage::Gender,
            StepInput::Location(_) => Stage::Location,
            StepInput::Anthropometry { .. } => Stage::Anthropometry,
            StepInput::Motivation(_) => Stage::Motivation,
            StepInput::Limitations { .. } => Stage::Limitations,
            StepInput::TimeAvailability { .. } => Stage::TimeAvailability,
        }
    }

    fn write_to(self, profile: &mut OnboardingProfile) -> Result<(), ProfileError> {
        match self {
            StepInput::Goal(goal) => profile.set_goal(goal),
            StepInput::Experience { level, details } => profile.set_experience(level, details)?,
            StepInput::Activity(level) => profile.set_activity(level),
            StepInput::Steps(steps) => profile.set_average_steps(steps),
            StepInput::Gender(gender) => profile.set_gender(gender),
            StepInput::Location(location) => profile.set_location(&location)?,
            StepInput::Anthropometry {
                height,
                weight,
                age,
            } => {
                profile.set_anthropometry(height, weight, age)?;
            }
            StepInput::Motivation(motivation) => profile.set_motivation(motivation),
            StepInput::Limitations { has, details } => profile.set_limitations(has, details)?,
            StepInput::TimeAvailability {
                days_per_week,
                session,
            } => profile.set_availability(days_per_week, session)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OnboardingEvent {
    Submit(StepInput),
    Skip,
    Reset,
    SelectTab(Tab),
}

/// Why an event was refused. A refused event leaves the sequencer unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SequenceError {
    #[error("answer for {got} submitted while at {expected}")]
    WrongStage { expected: Stage, got: Stage },
    #[error("step {0} cannot be skipped")]
    NotSkippable(Stage),
    #[error("tabs are available only after onboarding")]
    NotComplete,
    #[error(transparent)]
    Invalid(#[from] ProfileError),
}

/// Drives onboarding and persists after every accepted change.
pub struct OnboardingSequencer<S: SnapshotStore> {
    snapshot: Snapshot,
    store: S,
}

impl<S: SnapshotStore> OnboardingSequencer<S> {
    /// Resumes from whatever `store` holds.
    pub fn restore(store: S) -> Self {
        let snapshot = Snapshot::load(&store);
        tracing::debug!(stage = %snapshot.stage, "Restored onboarding state");
        Self { snapshot, store }
    }

    pub fn stage(&self) -> Stage {
        self.snapshot.stage
    }

    pub fn profile(&self) -> &OnboardingProfile {
        &self.snapshot.profile
    }

    pub fn active_tab(&self) -> Tab {
        self.snapshot.active_tab
    }

    pub fn is_complete(&self) -> bool {
        self.snapshot.stage == Stage::Complete
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Applies `event` and returns the resulting stage.
    pub fn apply(&mut self, event: OnboardingEvent) -> Result<Stage, SequenceError> {
        let stage = self.snapshot.stage;
        match event {
            OnboardingEvent::Submit(input) => {
                if input.stage() != stage {
                    return Err(SequenceError::WrongStage {
                        expected: stage,
                        got: input.stage(),
                    });
                }
                let mut profile = self.snapshot.profile.clone();
                input.write_to(&mut profile)?;

                self.snapshot.profile = profile;
                self.advance();
            }
            OnboardingEvent::Skip => {
                if !stage.is_skippable() {
                    return Err(SequenceError::NotSkippable(stage));
                }
                let mut profile = self.snapshot.profile.clone();
                match stage {
                    Stage::Steps => profile.set_average_steps(None),
                    _ => profile.set_motivation(None),
                }

                self.snapshot.profile = profile;
                self.advance();
            }
            OnboardingEvent::Reset => {
                tracing::info!("Resetting onboarding profile");
                self.snapshot = Snapshot::default();
                if let Err(e) = Snapshot::clear(&mut self.store) {
                    tracing::warn!("Failed to clear onboarding state: {}", e);
                }
                return Ok(self.snapshot.stage);
            }
            OnboardingEvent::SelectTab(tab) => {
                if stage != Stage::Complete {
                    return Err(SequenceError::NotComplete);
                }
                self.snapshot.active_tab = tab;
            }
        }

        self.persist();
        Ok(self.snapshot.stage)
    }

    fn advance(&mut self) {
        let next = self.snapshot.stage.next();
        if next == Stage::Complete {
            self.snapshot.active_tab = Tab::Plan;
            tracing::info!("Onboarding complete");
        }
        self.snapshot.stage = next;
    }

    fn persist(&mut self) {
        if let Err(e) = self.snapshot.save(&mut self.store) {
            tracing::warn!("Failed to persist onboarding state: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::store::{MemoryStore, PROFILE_KEY, STAGE_KEY, TAB_KEY};

    fn fresh() -> OnboardingSequencer<MemoryStore> {
        OnboardingSequencer::restore(MemoryStore::new())
    }

    fn submit(seq: &mut OnboardingSequencer<MemoryStore>, input: StepInput) -> Stage {
        seq.apply(OnboardingEvent::Submit(input)).unwrap()
    }

    /// Walks a fresh sequencer up to (not through) `target`.
    fn walk_to(target: Stage) -> OnboardingSequencer<MemoryStore> {
        let steps = [
            StepInput::Goal(Goal::TenK),
            StepInput::Experience {
                level: ExperienceLevel::Tried,
                details: None,
            },
            StepInput::Activity(ActivityLevel::Moderate),
            StepInput::Steps(Some(8000)),
            StepInput::Gender(Gender::Female),
            StepInput::Location("Москва".to_string()),
            StepInput::Anthropometry {
                height: 168.0,
                weight: 60.5,
                age: 31,
            },
            StepInput::Motivation(Some("Первый забег".to_string())),
            StepInput::Limitations {
                has: false,
                details: None,
            },
            StepInput::TimeAvailability {
                days_per_week: 3,
                session: SessionLength::Medium,
            },
        ];

        let mut seq = fresh();
        for input in steps {
            if seq.stage() == target {
                break;
            }
            submit(&mut seq, input);
        }
        seq
    }

    #[test]
    fn test_goal_moves_to_experience() {
        let mut seq = fresh();
        assert_eq!(seq.stage(), Stage::Welcome);
        assert_eq!(submit(&mut seq, StepInput::Goal(Goal::TenK)), Stage::Experience);
        assert_eq!(seq.profile().goal, Some(Goal::TenK));
    }

    #[test]
    fn test_full_sequence_completes_on_plan() {
        let seq = walk_to(Stage::Complete);
        assert!(seq.is_complete());
        assert_eq!(seq.active_tab(), Tab::Plan);

        let profile = seq.profile();
        assert_eq!(profile.bmi, Some(21.4));
        assert_eq!(profile.days_per_week, Some(3));
        assert_eq!(profile.time_per_session, Some(SessionLength::Medium));
        assert_eq!(seq.store().get(STAGE_KEY).unwrap().as_deref(), Some("app"));
        assert_eq!(seq.store().get(TAB_KEY).unwrap().as_deref(), Some("plan"));
    }

    #[test]
    fn test_time_availability_completes() {
        let mut seq = walk_to(Stage::TimeAvailability);
        assert_eq!(seq.stage(), Stage::TimeAvailability);
        let stage = submit(
            &mut seq,
            StepInput::TimeAvailability {
                days_per_week: 5,
                session: SessionLength::Short,
            },
        );
        assert_eq!(stage, Stage::Complete);
    }

    #[test]
    fn test_skip_only_on_optional_steps() {
        let mut seq = walk_to(Stage::Steps);
        assert_eq!(seq.apply(OnboardingEvent::Skip), Ok(Stage::Gender));
        assert!(seq.profile().average_steps.is_none());
        assert_eq!(
            seq.apply(OnboardingEvent::Skip),
            Err(SequenceError::NotSkippable(Stage::Gender))
        );
        assert_eq!(seq.stage(), Stage::Gender);

        let mut seq = walk_to(Stage::Motivation);
        assert_eq!(seq.apply(OnboardingEvent::Skip), Ok(Stage::Limitations));
        assert!(seq.profile().motivation.is_none());
    }

    #[test]
    fn test_rejected_events_leave_state_unchanged() {
        let mut seq = walk_to(Stage::Anthropometry);
        let before = seq.profile().clone();

        let err = seq
            .apply(OnboardingEvent::Submit(StepInput::Anthropometry {
                height: 0.0,
                weight: 70.0,
                age: 30,
            }))
            .unwrap_err();
        assert_eq!(err, SequenceError::Invalid(ProfileError::InvalidHeight(0.0)));

        let err = seq
            .apply(OnboardingEvent::Submit(StepInput::Goal(Goal::FiveK)))
            .unwrap_err();
        assert_eq!(
            err,
            SequenceError::WrongStage {
                expected: Stage::Anthropometry,
                got: Stage::Welcome
            }
        );

        assert_eq!(
            seq.apply(OnboardingEvent::SelectTab(Tab::Club)),
            Err(SequenceError::NotComplete)
        );
        assert_eq!(seq.stage(), Stage::Anthropometry);
        assert_eq!(seq.profile(), &before);
    }

    #[test]
    fn test_tabs_switch_freely_after_completion() {
        let mut seq = walk_to(Stage::Complete);
        for tab in [Tab::Goals, Tab::Club, Tab::Profile, Tab::Plan, Tab::Club] {
            assert_eq!(seq.apply(OnboardingEvent::SelectTab(tab)), Ok(Stage::Complete));
            assert_eq!(seq.active_tab(), tab);
        }
        assert_eq!(seq.store().get(TAB_KEY).unwrap().as_deref(), Some("club"));
    }

    #[test]
    fn test_reset_from_any_stage() {
        for target in Stage::ALL {
            let mut seq = walk_to(target);
            assert_eq!(seq.stage(), target);
            assert_eq!(seq.apply(OnboardingEvent::Reset), Ok(Stage::Welcome));
            assert_eq!(seq.profile(), &OnboardingProfile::default());
            assert_eq!(seq.active_tab(), Tab::Plan);
            assert!(seq.store().get(STAGE_KEY).unwrap().is_none());
            assert!(seq.store().get(PROFILE_KEY).unwrap().is_none());
            assert!(seq.store().get(TAB_KEY).unwrap().is_none());
        }
    }

    #[test]
    fn test_restore_resumes_mid_sequence() {
        let seq = walk_to(Stage::Location);
        let store = seq.store().clone();

        let resumed = OnboardingSequencer::restore(store);
        assert_eq!(resumed.stage(), Stage::Location);
        assert_eq!(resumed.profile().gender, Some(Gender::Female));
    }

    #[test]
    fn test_restore_with_corrupt_profile_starts_over() {
        let mut store = MemoryStore::new();
        store.set(STAGE_KEY, "app").unwrap();
        store.set(PROFILE_KEY, "][").unwrap();
        store.set(TAB_KEY, "club").unwrap();

        let seq = OnboardingSequencer::restore(store);
        assert_eq!(seq.stage(), Stage::Welcome);
        assert_eq!(seq.profile(), &OnboardingProfile::default());
        assert_eq!(seq.active_tab(), Tab::Plan);
    }

    #[test]
    fn test_stage_identifiers_round_trip() {
        for stage in Stage::ALL {
            assert_eq!(stage.as_str().parse::<Stage>(), Ok(stage));
        }
        assert!("unknown".parse::<Stage>().is_err());
    }
}
