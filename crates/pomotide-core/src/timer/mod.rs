mod clock;
mod engine;
mod scheduler;
mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{ListenerId, ListenerResult, TimerEngine};
pub use scheduler::{IntervalScheduler, ManualScheduler, Scheduler, TickHandle, TickReceiver};
pub use state::{
    ActivePhase, Durations, EngineState, Phase, DEFAULT_REST_MINUTES, DEFAULT_SESSION_MINUTES,
    REST_MINUTES_MAX, REST_MINUTES_MIN, SESSION_MINUTES_MAX, SESSION_MINUTES_MIN,
};
