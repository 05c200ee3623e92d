//! Network-anchored, locally ticking clock.
//!
//! The clock takes its base time from one sync attempt (or the device clock
//! when that fails) and from then on advances it by exactly one second per
//! tick. It never resamples the system clock, so drift against wall time is
//! expected over long sessions.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::SyncUnavailable;
use crate::format::{self, DisplayZone, RenderedTime};
use crate::sink::DisplaySink;
use crate::source::TimeSource;

/// Fixed tick period
pub const TICK_PERIOD: Duration = Duration::from_millis(1000);

/// Outcome of the single network sync call.
#[derive(Debug)]
pub enum SyncAttemptResult {
    Synced(DateTime<Utc>),
    Failed(SyncUnavailable),
}

impl From<Result<DateTime<Utc>, SyncUnavailable>> for SyncAttemptResult {
    fn from(result: Result<DateTime<Utc>, SyncUnavailable>) -> Self {
        match result {
            Ok(time) => Self::Synced(time),
            Err(reason) => Self::Failed(reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Uninitialized,
    Syncing,
    Running,
    /// Tick cancelled through its handle
    Stopped,
}

/// Where the current base time came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOrigin {
    /// Device time captured at construction, before any sync
    Placeholder,
    Network,
    /// Device time substituted after a failed sync
    Local,
}

/// Cancellation handle for the periodic tick.
#[derive(Debug, Clone)]
pub struct TickHandle {
    token: CancellationToken,
}

impl TickHandle {
    /// Stop the periodic tick. The base time keeps its last value.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

struct ClockInner<S> {
    base_time: DateTime<Utc>,
    origin: TimeOrigin,
    state: ClockState,
    zone: DisplayZone,
    sink: S,
    ticker: Option<CancellationToken>,
}

impl<S: DisplaySink> ClockInner<S> {
    fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    fn tick(&mut self) {
        self.base_time += TimeDelta::seconds(1);
        self.render();
    }

    fn render(&mut self) -> RenderedTime {
        let rendered = format::render(self.base_time, self.zone);
        self.sink.show_time(&rendered.time);
        self.sink.show_date(&rendered.date);
        tracing::trace!(time = %rendered.time, "Clock rendered");
        rendered
    }
}

/// Clock state with exclusive ownership of its display sink.
pub struct SyncedClock<S: DisplaySink> {
    inner: Arc<Mutex<ClockInner<S>>>,
}

impl<S: DisplaySink> SyncedClock<S> {
    /// New clock holding the device time as a placeholder.
    pub fn new(sink: S, zone: DisplayZone) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ClockInner {
                base_time: Utc::now(),
                origin: TimeOrigin::Placeholder,
                state: ClockState::Uninitialized,
                zone,
                sink,
                ticker: None,
            })),
        }
    }

    pub fn base_time(&self) -> DateTime<Utc> {
        self.inner.lock().base_time
    }

    pub fn origin(&self) -> TimeOrigin {
        self.inner.lock().origin
    }

    pub fn state(&self) -> ClockState {
        let inner = self.inner.lock();
        match inner.state {
            ClockState::Running if !inner.is_ticking() => ClockState::Stopped,
            state => state,
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().is_ticking()
    }

    /// Run `f` against the sink, e.g. to read back what was displayed.
    pub fn with_sink<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.lock().sink)
    }

    /// Sync once against `source`, then start ticking.
    ///
    /// Never fails: a sync error is logged and the device time is used
    /// instead. The call is not retried. Must run inside a tokio runtime.
    pub async fn initialize<T: TimeSource>(&self, source: &T) -> TickHandle {
        {
            let mut inner = self.inner.lock();
            if inner.state == ClockState::Uninitialized {
                inner.state = ClockState::Syncing;
            }
        }

        tracing::debug!("Synchronizing clock with network time");
        let result = SyncAttemptResult::from(source.fetch_utc().await);
        self.apply_sync(result);
        self.start()
    }

    /// Set the base time from a sync outcome.
    pub fn apply_sync(&self, result: SyncAttemptResult) {
        let mut inner = self.inner.lock();
        match result {
            SyncAttemptResult::Synced(time) => {
                inner.base_time = time;
                inner.origin = TimeOrigin::Network;
                tracing::info!(base_time = %time, "Clock synchronized with network time");
            }
            SyncAttemptResult::Failed(reason) => {
                inner.base_time = Utc::now();
                inner.origin = TimeOrigin::Local;
                tracing::warn!(
                    kind = reason.kind(),
                    "Clock sync failed, using local device time: {}",
                    reason
                );
            }
        }
    }

    /// Render once and schedule the 1 s tick.
    ///
    /// Idempotent: while a tick is active this returns a handle to it
    /// without rendering or scheduling anything. Must run inside a tokio
    /// runtime.
    pub fn start(&self) -> TickHandle {
        let mut inner = self.inner.lock();
        if let Some(token) = inner.ticker.as_ref().filter(|t| !t.is_cancelled()) {
            tracing::debug!("Clock tick already running");
            return TickHandle {
                token: token.clone(),
            };
        }

        inner.render();
        let token = CancellationToken::new();
        inner.ticker = Some(token.clone());
        inner.state = ClockState::Running;
        drop(inner);

        tokio::spawn(run_ticker(Arc::clone(&self.inner), token.clone()));
        tracing::debug!("Clock tick started");
        TickHandle { token }
    }

    /// Advance by one logical second and render.
    pub fn tick(&self) {
        self.inner.lock().tick();
    }

    /// Write the current base time to the display slots.
    pub fn render(&self) -> RenderedTime {
        self.inner.lock().render()
    }
}

async fn run_ticker<S: DisplaySink>(inner: Arc<Mutex<ClockInner<S>>>, token: CancellationToken) {
    let mut interval = tokio::time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = interval.tick() => {
                inner.lock().tick();
            }
        }
    }

    {
        let mut guard = inner.lock();
        // A newer tick may have been started after this one was cancelled
        if guard.ticker.as_ref().is_some_and(CancellationToken::is_cancelled) {
            guard.ticker = None;
            guard.state = ClockState::Stopped;
        }
    }
    tracing::debug!("Clock tick stopped");
}
