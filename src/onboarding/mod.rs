//! Running-plan onboarding: a fixed sequence of questions ending in the
//! main interface, persisted after every accepted answer.

pub mod profile;
pub mod sequencer;
pub mod store;
pub mod wizard;

pub use profile::{
    ActivityLevel, ExperienceLevel, Gender, Goal, OnboardingProfile, ProfileError, SessionLength,
};
pub use sequencer::{OnboardingEvent, OnboardingSequencer, SequenceError, Stage, StepInput, Tab};
pub use store::{JsonFileStore, MemoryStore, Snapshot, SnapshotStore};
pub use wizard::run_wizard;
