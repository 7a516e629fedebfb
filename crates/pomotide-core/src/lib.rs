//! # Pomotide Core Library
//!
//! Core of the Pomotide work/rest timer: the countdown state machine and the
//! persistence that carries it across host restarts. Hosts (the `pomotide`
//! CLI, an editor extension) embed this crate and plug in their own display
//! and audio output.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a tick-driven state machine over Idle, Working,
//!   Resting and Paused. Ticks come from an injected scheduler, wall-clock
//!   time from an injected clock.
//! - **Persistence**: a gateway that stores the timer as a JSON record in a
//!   key-value store and reconciles it against the time spent offline.
//! - **Storage**: SQLite and in-memory key-value stores, TOML configuration.
//! - **Host**: orchestration that renders, persists, plays cues, keeps
//!   statistics and applies the auto-start policy.
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: core timer state machine
//! - [`PersistenceGateway`]: save/load with drift correction
//! - [`TimerHost`]: engine + gateway + collaborators
//! - [`Config`]: application configuration management

pub mod display;
pub mod error;
pub mod events;
pub mod host;
pub mod persistence;
pub mod storage;
pub mod timer;

pub use display::{format_remaining, StatusView};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::EngineEvent;
pub use host::{AudioNotifier, Cue, StatusDisplay, TimerHost};
pub use persistence::{PersistenceGateway, Restored, Statistics};
pub use storage::{Config, KvStore, MemoryStore, SqliteStore};
pub use timer::{ActivePhase, Durations, EngineState, Phase, TimerEngine};
