//! # Habitual Core Library
//!
//! This library provides the core logic for the Habitual habit tracker.
//! All operations are available through the standalone `habitual` CLI, which
//! is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Streak Engine**: A pure decision function. Given a habit's streak
//!   fields and the check-in date, it decides whether the streak continues,
//!   resets, or the check-in is a same-day duplicate. It never reads the clock.
//! - **Storage**: The [`HabitStore`] trait with a SQLite implementation and an
//!   in-memory one, plus TOML-based configuration
//! - **Tracker**: Runs the check-in flow over an injected store
//!
//! ## Key Components
//!
//! - [`evaluate_check_in`]: Streak decision for one check-in
//! - [`Tracker`]: Habit operations over a store
//! - [`HabitDb`]: SQLite persistence
//! - [`Config`]: Application configuration management

pub mod error;
pub mod habit;
pub mod storage;
pub mod streak;
pub mod tracker;

pub use error::{ConfigError, CoreError, DatabaseError, StoreError, ValidationError};
pub use habit::{CheckEvent, Habit, HabitId, Periodicity};
pub use storage::{Config, HabitDb, HabitStore, MemoryStore};
pub use streak::{evaluate_check_in, replay, CheckInOutcome, StreakState, StreakStatus};
pub use tracker::{CheckInReport, Summary, Tracker, Verification};
