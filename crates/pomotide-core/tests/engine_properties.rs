//! Property tests for the timer engine.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::DateTime;
use proptest::prelude::*;

use pomotide_core::timer::{ManualClock, ManualScheduler};
use pomotide_core::{ActivePhase, Durations, EngineEvent, Phase, TimerEngine};

fn engine(session: u32, rest: u32) -> TimerEngine {
    let clock = ManualClock::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap());
    TimerEngine::new(
        Durations {
            session_minutes: session,
            rest_minutes: rest,
        },
        clock,
        ManualScheduler::new(),
    )
}

fn phase_strategy() -> impl Strategy<Value = u8> {
    0u8..4
}

/// Drive a fresh engine into one of the four phases.
fn enter(engine: &mut TimerEngine, which: u8) {
    match which {
        0 => {}
        1 => engine.start_session(),
        2 => engine.start_rest(),
        _ => {
            engine.start_session();
            engine.tick();
            engine.pause();
        }
    }
}

proptest! {
    #[test]
    fn start_uses_configured_durations(s in 1u32..=120, r in 1u32..=60) {
        let mut engine = engine(s, r);
        engine.start_session();
        prop_assert_eq!(engine.phase(), Phase::Working);
        prop_assert_eq!(engine.remaining_seconds(), u64::from(s) * 60);
        engine.start_rest();
        prop_assert_eq!(engine.phase(), Phase::Resting);
        prop_assert_eq!(engine.remaining_seconds(), u64::from(r) * 60);
    }

    #[test]
    fn pause_resume_round_trip_is_noop(s in 1u32..=120, ticks in 0u64..60, rest in any::<bool>()) {
        let mut engine = engine(s, 5);
        if rest { engine.start_rest() } else { engine.start_session() }
        for _ in 0..ticks {
            engine.tick();
        }
        let before = (engine.phase(), engine.remaining_seconds());
        engine.pause();
        engine.resume();
        prop_assert_eq!((engine.phase(), engine.remaining_seconds()), before);
    }

    #[test]
    fn reset_from_any_phase_is_idle(which in phase_strategy()) {
        let mut engine = engine(25, 5);
        enter(&mut engine, which);
        engine.reset();
        let state = engine.state();
        prop_assert_eq!(state.phase, Phase::Idle);
        prop_assert_eq!(state.remaining_seconds, 0);
        prop_assert_eq!(state.phase_started_at, None);
        prop_assert_eq!(state.paused_at, None);
    }

    #[test]
    fn ticks_below_remaining_only_count_down(s in 1u32..=120, n in 0u64..7200) {
        let mut engine = engine(s, 5);
        engine.start_session();
        let start = engine.remaining_seconds();
        prop_assume!(n < start);
        for _ in 0..n {
            prop_assert_eq!(engine.tick(), None);
        }
        prop_assert_eq!(engine.remaining_seconds(), start - n);
        prop_assert_eq!(engine.phase(), Phase::Working);
    }

    #[test]
    fn rescale_preserves_elapsed(old in 1u32..=120, new in 1u32..=120, elapsed in 0u64..7200) {
        let mut engine = engine(old, 5);
        engine.start_session();
        prop_assume!(elapsed < u64::from(old) * 60);
        for _ in 0..elapsed {
            engine.tick();
        }
        let completed = engine.update_durations(new, 5);
        let expected = (u64::from(new) * 60).saturating_sub(elapsed);
        if expected == 0 {
            prop_assert_eq!(completed, Some(ActivePhase::Working));
            prop_assert_eq!(engine.phase(), Phase::Idle);
        } else {
            prop_assert_eq!(completed, None);
            prop_assert_eq!(engine.remaining_seconds(), expected);
        }
    }
}

#[test]
fn full_countdown_emits_one_completion() {
    let mut engine = engine(2, 1);
    let completions = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&completions);
    engine.subscribe(move |event| {
        if let EngineEvent::Completed { phase, .. } = event {
            sink.borrow_mut().push(*phase);
        }
        Ok(())
    });

    engine.start_session();
    let remaining = engine.remaining_seconds();
    for _ in 0..remaining {
        engine.tick();
    }
    // Extra ticks after completion are ignored.
    engine.tick();

    assert_eq!(engine.phase(), Phase::Idle);
    assert_eq!(*completions.borrow(), vec![ActivePhase::Working]);
}
