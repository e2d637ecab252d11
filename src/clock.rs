use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::time_format;

/// Source of "now" for the clock driver.
pub trait WallClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production wall clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// What the clock is showing time for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockSource {
    /// IANA zone, daylight saving aware
    Zone(Tz),
    /// Raw `UTC+HH:MM` string as returned by the country service
    Offset(String),
}

impl ClockSource {
    /// Formats `now` for this source. `None` when the offset is unparseable.
    pub fn render(&self, now: DateTime<Utc>) -> Option<String> {
        match self {
            ClockSource::Zone(zone) => Some(time_format::time_in_zone(now, *zone)),
            ClockSource::Offset(offset) => time_format::time_at_offset(now, offset),
        }
    }
}

impl fmt::Display for ClockSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockSource::Zone(zone) => write!(f, "{}", zone.name()),
            ClockSource::Offset(offset) => f.write_str(offset),
        }
    }
}

/// One displayed time of day, `HH:MM:SS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockTick(pub String);

impl fmt::Display for ClockTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// The repeating task, aborted when the handle goes away.
struct ActiveTick {
    source: ClockSource,
    handle: JoinHandle<()>,
}

impl Drop for ActiveTick {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Republishes the current time for one [`ClockSource`] on every tick.
///
/// The driver owns at most one repeating task. `start` replaces it, `stop`
/// and drop abort it, so nothing keeps updating a display that is gone.
/// Must be used from within a tokio runtime.
pub struct ClockDriver {
    tick_interval: Duration,
    wall_clock: Arc<dyn WallClock>,
    active: Option<ActiveTick>,
    display_tx: Arc<watch::Sender<Option<ClockTick>>>,
    recomputations: Arc<AtomicU64>,
}

impl ClockDriver {
    pub fn new(tick_interval: Duration, wall_clock: Arc<dyn WallClock>) -> Self {
        let (display_tx, _) = watch::channel(None);
        Self {
            tick_interval,
            wall_clock,
            active: None,
            display_tx: Arc::new(display_tx),
            recomputations: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Enters Running for `source`, stopping any previous tick first.
    pub fn start(&mut self, source: ClockSource) {
        self.stop();
        info!("Starting clock for {}", source);

        let display_tx = Arc::clone(&self.display_tx);
        let wall_clock = Arc::clone(&self.wall_clock);
        let recomputations = Arc::clone(&self.recomputations);
        let tick_source = source.clone();
        let period = self.tick_interval;

        let handle = tokio::spawn(async move {
            // first tick completes immediately
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                recomputations.fetch_add(1, Ordering::Relaxed);
                match tick_source.render(wall_clock.now()) {
                    Some(time) => {
                        display_tx.send_replace(Some(ClockTick(time)));
                    }
                    None => {
                        // keep whatever was displayed before
                        debug!("Cannot compute time for {}, skipping tick", tick_source);
                    }
                }
            }
        });

        self.active = Some(ActiveTick { source, handle });
    }

    /// Back to Stopped. Clears the displayed time.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            info!("Stopping clock for {}", active.source);
        }
        self.display_tx.send_replace(None);
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn source(&self) -> Option<&ClockSource> {
        self.active.as_ref().map(|active| &active.source)
    }

    /// Latest displayed time, if any.
    pub fn current(&self) -> Option<ClockTick> {
        self.display_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ClockTick>> {
        self.display_tx.subscribe()
    }

    /// Number of times any tick task recomputed the time.
    pub fn recomputations(&self) -> u64 {
        self.recomputations.load(Ordering::Relaxed)
    }
}
