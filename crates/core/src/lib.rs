#![forbid(unsafe_code)]

//! Domain model and pure rules for the trainer: progress/streak bookkeeping,
//! session entities and the level/XP arithmetic. No I/O lives here; the
//! `storage` and `services` crates layer persistence and orchestration on top.

pub mod config;
pub mod error;
pub mod levels;
pub mod model;
pub mod time;

pub use config::Config;
pub use error::Error;
pub use time::{CalendarDay, Clock};
