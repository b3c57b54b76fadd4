//! Featured-hero carousel.
//!
//! [`Carousel`] is the pure state machine: it is driven by explicit
//! timestamps and never sleeps. [`CarouselController`] owns one behind a
//! mutex and runs the auto-advance timer as a cancellable tokio task, which
//! stops when the controller is disposed or dropped.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, Mutex, Notify};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::CarouselConfig;

/// Where the carousel is in its crossfade cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CarouselState {
    Idle { index: usize },
    Transitioning { from: usize, to: usize },
}

/// Timer settings for one carousel.
#[derive(Debug, Clone, Copy)]
pub struct CarouselTiming {
    /// `None` disables the recurring advance.
    pub auto_advance: Option<Duration>,
    /// Crossfade length; the target becomes active when it elapses.
    pub transition: Duration,
    /// Window after mount during which every transition is suppressed.
    pub grace: Duration,
}

impl CarouselTiming {
    pub fn from_config(config: &CarouselConfig) -> Self {
        Self {
            auto_advance: Some(config.auto_advance()).filter(|d| !d.is_zero()),
            transition: config.transition(),
            grace: config.grace(),
        }
    }

    pub fn without_auto_advance(mut self) -> Self {
        self.auto_advance = None;
        self
    }
}

impl Default for CarouselTiming {
    fn default() -> Self {
        Self::from_config(&CarouselConfig::default())
    }
}

/// Cycles through a fixed list of items with at most one transition in flight.
#[derive(Debug)]
pub struct Carousel<T> {
    items: Vec<T>,
    state: CarouselState,
    timing: CarouselTiming,
    settled_at: Instant,
    transition_ends: Option<Instant>,
    next_auto: Option<Instant>,
}

impl<T> Carousel<T> {
    /// Mount a carousel at `Idle(0)`.
    pub fn new(items: Vec<T>, timing: CarouselTiming, now: Instant) -> Self {
        let next_auto = if items.is_empty() {
            None
        } else {
            timing.auto_advance.map(|every| now + every)
        };

        Self {
            items,
            state: CarouselState::Idle { index: 0 },
            timing,
            settled_at: now + timing.grace,
            transition_ends: None,
            next_auto,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn state(&self) -> CarouselState {
        self.state
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.state, CarouselState::Transitioning { .. })
    }

    /// Index of the item on screen. During a transition that is still the source.
    pub fn active_index(&self) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        match self.state {
            CarouselState::Idle { index } => Some(index),
            CarouselState::Transitioning { from, .. } => Some(from),
        }
    }

    pub fn active(&self) -> Option<&T> {
        self.active_index().and_then(|i| self.items.get(i))
    }

    /// The item after the active one, shown as a preview.
    pub fn upcoming(&self) -> Option<&T> {
        let i = self.active_index()?;
        self.items.get((i + 1) % self.items.len())
    }

    pub fn next(&mut self, now: Instant) -> bool {
        match self.idle_index() {
            Some(i) => self.begin((i + 1) % self.items.len(), now),
            None => false,
        }
    }

    pub fn previous(&mut self, now: Instant) -> bool {
        match self.idle_index() {
            Some(i) => {
                let n = self.items.len();
                self.begin((i + n - 1) % n, now)
            }
            None => false,
        }
    }

    /// Start a transition to `index`. Out-of-range and current indices are ignored.
    pub fn select(&mut self, index: usize, now: Instant) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.begin(index, now)
    }

    /// Advance timers up to `now`. Returns whether the state changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let mut changed = false;

        if let (CarouselState::Transitioning { to, .. }, Some(ends)) =
            (self.state, self.transition_ends)
        {
            if now >= ends {
                tracing::debug!(index = to, "Carousel transition settled");
                self.state = CarouselState::Idle { index: to };
                self.transition_ends = None;
                changed = true;
            }
        }

        if let (Some(every), Some(due)) = (self.timing.auto_advance, self.next_auto) {
            if now >= due {
                // Missed ticks collapse into one, like a browser interval.
                let mut next_due = due;
                while next_due <= now {
                    next_due += every;
                }
                self.next_auto = Some(next_due);
                changed |= self.next(now);
            }
        }

        changed
    }

    /// Earliest instant at which [`Carousel::poll`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.transition_ends, self.next_auto) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn idle_index(&self) -> Option<usize> {
        match self.state {
            CarouselState::Idle { index } if !self.items.is_empty() => Some(index),
            _ => None,
        }
    }

    fn begin(&mut self, to: usize, now: Instant) -> bool {
        let Some(from) = self.idle_index() else {
            return false;
        };
        if now < self.settled_at || to == from {
            return false;
        }

        tracing::debug!(from, to, "Carousel transition started");
        self.state = CarouselState::Transitioning { from, to };
        self.transition_ends = Some(now + self.timing.transition);
        true
    }
}

impl<T: Clone> Carousel<T> {
    pub fn snapshot(&self) -> CarouselSnapshot<T> {
        CarouselSnapshot {
            state: self.state,
            active_index: self.active_index(),
            active: self.active().cloned(),
            upcoming: self.upcoming().cloned(),
            len: self.items.len(),
        }
    }
}

/// Immutable view of a carousel published after every state change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarouselSnapshot<T> {
    pub state: CarouselState,
    pub active_index: Option<usize>,
    pub active: Option<T>,
    pub upcoming: Option<T>,
    pub len: usize,
}

impl<T> CarouselSnapshot<T> {
    pub fn is_transitioning(&self) -> bool {
        matches!(self.state, CarouselState::Transitioning { .. })
    }
}

struct Shared<T> {
    carousel: Mutex<Carousel<T>>,
    wake: Notify,
    snapshots: watch::Sender<CarouselSnapshot<T>>,
}

/// A mounted carousel with its own auto-advance task.
pub struct CarouselController<T> {
    shared: Arc<Shared<T>>,
    cancel: CancellationToken,
}

impl<T> CarouselController<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Mount `items` and start the timer task. Must be called inside a tokio runtime.
    pub fn mount(items: Vec<T>, timing: CarouselTiming) -> Self {
        let carousel = Carousel::new(items, timing, Instant::now());
        let (snapshots, _) = watch::channel(carousel.snapshot());
        let empty = carousel.is_empty();

        let shared = Arc::new(Shared {
            carousel: Mutex::new(carousel),
            wake: Notify::new(),
            snapshots,
        });
        let cancel = CancellationToken::new();

        if !empty {
            tokio::spawn(run_timer(Arc::clone(&shared), cancel.clone()));
        }

        Self { shared, cancel }
    }

    pub async fn next(&self) -> bool {
        self.command(|c, now| c.next(now)).await
    }

    pub async fn previous(&self) -> bool {
        self.command(|c, now| c.previous(now)).await
    }

    pub async fn select(&self, index: usize) -> bool {
        self.command(|c, now| c.select(index, now)).await
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> CarouselSnapshot<T> {
        self.shared.snapshots.borrow().clone()
    }

    /// Receive every snapshot published from now on.
    pub fn subscribe(&self) -> watch::Receiver<CarouselSnapshot<T>> {
        self.shared.snapshots.subscribe()
    }

    /// Stop the timer task. Commands keep working but nothing advances on its own.
    pub fn dispose(&self) {
        self.cancel.cancel();
    }

    pub fn is_disposed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    async fn command(&self, f: impl FnOnce(&mut Carousel<T>, Instant) -> bool) -> bool {
        let accepted = {
            let mut carousel = self.shared.carousel.lock().await;
            let now = Instant::now();
            let settled = carousel.poll(now);
            let accepted = f(&mut carousel, now);
            if settled || accepted {
                self.shared.snapshots.send_replace(carousel.snapshot());
            }
            accepted
        };

        if accepted {
            self.shared.wake.notify_one();
        }
        accepted
    }
}

impl<T> Drop for CarouselController<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl<T> std::fmt::Debug for CarouselController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarouselController")
            .field("disposed", &self.cancel.is_cancelled())
            .finish()
    }
}

async fn run_timer<T>(shared: Arc<Shared<T>>, cancel: CancellationToken)
where
    T: Clone + Send + Sync + 'static,
{
    loop {
        let deadline = shared.carousel.lock().await.next_deadline();
        let sleep = async {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = shared.wake.notified() => {}
            _ = sleep => {
                let mut carousel = shared.carousel.lock().await;
                if carousel.poll(Instant::now()) {
                    shared.snapshots.send_replace(carousel.snapshot());
                }
            }
        }
    }

    tracing::debug!("Carousel timer stopped");
}
