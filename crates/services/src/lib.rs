#![forbid(unsafe_code)]

//! The trainer engine: session lifecycle, progress ledger, route guard and
//! boot coordinator, wired to a snapshot store and a typed event bus.

pub mod engine;
pub mod error;
pub mod events;
pub mod guard;
pub mod member;
pub mod provider;

pub use trainer_core::{Clock, Config};

pub use engine::{BootOutcome, EngineSnapshot, TrainerEngine};
pub use error::{HydrateError, ProviderError};
pub use events::{Event, EventBus, EventKind, FlamesReason, SubscriptionId};
pub use guard::{GuardDecision, Route, guard_route};
pub use member::{MemberFieldStore, ProgressFields};
pub use provider::{
    Chapter, DataProvider, HttpDataProvider, Question, chapters_or_empty, questions_or_empty,
};
