//! Tick sources for the timer engine.
//!
//! The engine never sleeps. It asks a [`Scheduler`] for a repeating
//! schedule while a countdown runs and cancels it when the countdown stops.
//! Delivering the ticks back to the engine is the host's job: tests call
//! `TimerEngine::tick()` directly, the terminal host drains a
//! [`TickReceiver`].

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Cancellation handle for a repeating schedule.
pub trait TickHandle {
    /// Stop the schedule. Calling it on a stopped schedule does nothing.
    fn cancel(&mut self);
    fn is_active(&self) -> bool;
}

pub trait Scheduler {
    fn schedule_repeating(&mut self, period: Duration) -> Box<dyn TickHandle>;
}

// ── Manual ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct ManualBook {
    scheduled: usize,
    cancelled: usize,
    last_period: Option<Duration>,
}

/// Scheduler that only does bookkeeping.
///
/// Clones share the same book, so a test can keep one clone and hand the
/// other to the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    book: Rc<RefCell<ManualBook>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of schedules currently running.
    pub fn active(&self) -> usize {
        let book = self.book.borrow();
        book.scheduled - book.cancelled
    }

    pub fn scheduled_total(&self) -> usize {
        self.book.borrow().scheduled
    }

    pub fn last_period(&self) -> Option<Duration> {
        self.book.borrow().last_period
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&mut self, period: Duration) -> Box<dyn TickHandle> {
        {
            let mut book = self.book.borrow_mut();
            book.scheduled += 1;
            book.last_period = Some(period);
        }
        Box::new(ManualHandle {
            book: Rc::clone(&self.book),
            active: true,
        })
    }
}

struct ManualHandle {
    book: Rc<RefCell<ManualBook>>,
    active: bool,
}

impl TickHandle for ManualHandle {
    fn cancel(&mut self) {
        if self.active {
            self.active = false;
            self.book.borrow_mut().cancelled += 1;
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

// ── Tokio interval ───────────────────────────────────────────────────

/// Scheduler backed by a tokio interval task per schedule.
///
/// Every tick is sent through an unbounded channel tagged with the
/// generation of the schedule that produced it. [`TickReceiver`] drops
/// ticks from cancelled generations, so a tick already queued when the
/// timer was paused is never applied after a resume.
pub struct IntervalScheduler {
    tx: mpsc::UnboundedSender<u64>,
    generation: Arc<AtomicU64>,
}

pub struct TickReceiver {
    rx: mpsc::UnboundedReceiver<u64>,
    generation: Arc<AtomicU64>,
}

impl IntervalScheduler {
    pub fn new() -> (Self, TickReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let generation = Arc::new(AtomicU64::new(0));
        (
            Self {
                tx,
                generation: Arc::clone(&generation),
            },
            TickReceiver { rx, generation },
        )
    }
}

impl Scheduler for IntervalScheduler {
    fn schedule_repeating(&mut self, period: Duration) -> Box<dyn TickHandle> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            loop {
                interval.tick().await;
                if tx.send(generation).is_err() {
                    break;
                }
            }
        });
        Box::new(IntervalHandle {
            task: Some(task),
            generation,
            current: Arc::clone(&self.generation),
        })
    }
}

struct IntervalHandle {
    task: Option<JoinHandle<()>>,
    generation: u64,
    current: Arc<AtomicU64>,
}

impl TickHandle for IntervalHandle {
    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            // Invalidate ticks still sitting in the channel.
            let _ = self.current.compare_exchange(
                self.generation,
                self.generation + 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            );
        }
    }

    fn is_active(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for IntervalHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl TickReceiver {
    /// Wait for the next tick of the live schedule.
    ///
    /// Returns `None` once the scheduler has been dropped.
    pub async fn recv(&mut self) -> Option<()> {
        loop {
            let generation = self.rx.recv().await?;
            if generation == self.generation.load(Ordering::SeqCst) {
                return Some(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_cancel_is_idempotent() {
        let mut scheduler = ManualScheduler::new();
        let mut handle = scheduler.schedule_repeating(Duration::from_secs(1));
        assert_eq!(scheduler.active(), 1);
        handle.cancel();
        handle.cancel();
        assert_eq!(scheduler.active(), 0);
        assert!(!handle.is_active());
        assert_eq!(scheduler.last_period(), Some(Duration::from_secs(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn interval_ticks_until_cancelled() {
        let (mut scheduler, mut ticks) = IntervalScheduler::new();
        let mut handle = scheduler.schedule_repeating(Duration::from_secs(1));
        assert!(ticks.recv().await.is_some());
        assert!(ticks.recv().await.is_some());
        handle.cancel();
        assert!(!handle.is_active());

        let mut second = scheduler.schedule_repeating(Duration::from_secs(1));
        assert!(ticks.recv().await.is_some());
        second.cancel();
    }
}
