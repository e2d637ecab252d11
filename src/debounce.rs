use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::countries::CountryLookup;

/// Default quiet period before a suggestion lookup fires.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

/// What the suggestion list currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionState {
    /// Country names, in service order
    pub names: Vec<String>,
    /// A lookup for the latest query is scheduled or in flight
    pub loading: bool,
}

/// Coalesces keystrokes into one country search per quiet period.
///
/// Every input bumps a generation counter. A lookup publishes its result only
/// if its generation is still the latest when it completes, so a slow answer
/// for an old query never replaces the answer for the current one.
pub struct SuggestionDebouncer<L: CountryLookup> {
    lookup: Arc<L>,
    quiet_period: Duration,
    generation: Arc<AtomicU64>,
    // timer task; once it fires it hands the request to a detached task
    pending: Option<JoinHandle<()>>,
    state_tx: Arc<watch::Sender<SuggestionState>>,
}

impl<L: CountryLookup> SuggestionDebouncer<L> {
    pub fn new(lookup: Arc<L>, quiet_period: Duration) -> Self {
        let (state_tx, _) = watch::channel(SuggestionState::default());
        Self {
            lookup,
            quiet_period,
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
            state_tx: Arc::new(state_tx),
        }
    }

    /// Handles the full text of the input field after a keystroke.
    pub fn on_input(&mut self, text: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.cancel_timer();

        let query = text.trim().to_string();
        if query.is_empty() {
            self.state_tx.send_replace(SuggestionState::default());
            return;
        }

        self.state_tx.send_modify(|state| state.loading = true);

        let lookup = Arc::clone(&self.lookup);
        let latest = Arc::clone(&self.generation);
        let state_tx = Arc::clone(&self.state_tx);
        let quiet_period = self.quiet_period;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            debug!("Quiet period over, looking up suggestions for {:?}", query);

            // the request outlives a later keystroke; its result is dropped instead
            tokio::spawn(async move {
                let result = lookup.search_by_name(&query).await;

                if latest.load(Ordering::SeqCst) != generation {
                    debug!("Discarding stale suggestions for {:?}", query);
                    return;
                }

                let names = match result {
                    Ok(names) => names,
                    Err(e) => {
                        debug!("Suggestion lookup for {:?} failed: {}", query, e);
                        Vec::new()
                    }
                };
                info!("{} suggestions for {:?}", names.len(), query);
                state_tx.send_replace(SuggestionState {
                    names,
                    loading: false,
                });
            });
        }));
    }

    /// Drops the pending timer and invalidates any request in flight.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cancel_timer();
        self.state_tx.send_modify(|state| state.loading = false);
    }

    /// Cancels pending work and empties the list.
    pub fn clear(&mut self) {
        self.cancel();
        self.state_tx.send_replace(SuggestionState::default());
    }

    /// True while the quiet period timer is running.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn state(&self) -> SuggestionState {
        self.state_tx.borrow().clone()
    }

    pub fn suggestions(&self) -> Vec<String> {
        self.state_tx.borrow().names.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SuggestionState> {
        self.state_tx.subscribe()
    }

    fn cancel_timer(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<L: CountryLookup> Drop for SuggestionDebouncer<L> {
    fn drop(&mut self) {
        self.cancel();
    }
}
