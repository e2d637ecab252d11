// Local country -> IANA zone table
mod zones;

pub use zones::well_known_zone;

use std::fmt::Write;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::clock::{ClockDriver, ClockSource, ClockTick, WallClock};
use crate::config::Config;
use crate::countries::CountryLookup;
use crate::debounce::{SuggestionDebouncer, SuggestionState};
use crate::error::AppError;

pub const COUNTRY_NOT_FOUND: &str = "Country not found.";
pub const TIMEZONE_NOT_FOUND: &str = "Timezone not found for this country.";

/// The country whose time is on display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryTimeSelection {
    pub display_name: String,
    pub zone: ClockSource,
    pub flag_url: Option<String>,
}

/// Live country timer: suggestion list, result card and the running clock.
///
/// Owns the active selection and both timers. Dropping it (or calling
/// [`LiveTimer::close`]) tears everything down.
pub struct LiveTimer<L: CountryLookup> {
    lookup: Arc<L>,
    debouncer: SuggestionDebouncer<L>,
    clock: ClockDriver,
    selection: Option<CountryTimeSelection>,
    error: Option<&'static str>,
}

impl<L: CountryLookup> LiveTimer<L> {
    pub fn new(lookup: Arc<L>, config: &Config, wall_clock: Arc<dyn WallClock>) -> Self {
        Self {
            debouncer: SuggestionDebouncer::new(Arc::clone(&lookup), config.suggest_debounce),
            clock: ClockDriver::new(config.clock_tick, wall_clock),
            lookup,
            selection: None,
            error: None,
        }
    }

    /// New content of the search field.
    pub fn type_query(&mut self, text: &str) {
        self.debouncer.on_input(text);
    }

    pub fn suggestions(&self) -> SuggestionState {
        self.debouncer.state()
    }

    /// A suggestion lookup is waiting for the quiet period to end.
    pub fn suggestions_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn subscribe_suggestions(&self) -> watch::Receiver<SuggestionState> {
        self.debouncer.subscribe()
    }

    /// Shows the time for the `index`-th suggestion (0-based).
    ///
    /// Returns `false` when there is no such suggestion.
    pub async fn pick_suggestion(&mut self, index: usize) -> bool {
        let Some(name) = self.debouncer.suggestions().into_iter().nth(index) else {
            return false;
        };
        self.debouncer.clear();
        self.show_time(&name).await;
        true
    }

    /// Resolves `name` and starts the clock for it.
    ///
    /// The previous selection, error and displayed time are cleared first.
    /// Well-known countries resolve from the local table; everything else goes
    /// to the country service and uses the first offset it reports.
    pub async fn show_time(&mut self, name: &str) {
        self.debouncer.cancel();
        self.selection = None;
        self.error = None;
        self.clock.stop();

        let name = name.trim();
        if name.is_empty() {
            self.error = Some(COUNTRY_NOT_FOUND);
            return;
        }

        if let Some((country, zone)) = well_known_zone(name) {
            info!("Resolved {} locally to {}", country, zone.name());
            self.select(CountryTimeSelection {
                display_name: country.to_string(),
                zone: ClockSource::Zone(zone),
                flag_url: None,
            });
            return;
        }

        match self.lookup.resolve_one(name).await {
            Ok(record) => {
                let flag_url = record.flag_url().map(str::to_string);
                let Some(offset) = record.timezones.into_iter().next() else {
                    self.error = Some(TIMEZONE_NOT_FOUND);
                    return;
                };
                info!("Resolved {} remotely to {}", record.name.common, offset);
                self.select(CountryTimeSelection {
                    display_name: record.name.common,
                    zone: ClockSource::Offset(offset),
                    flag_url,
                });
            }
            Err(e) => {
                warn!("Could not resolve {:?}: {}", name, e);
                self.error = Some(match e {
                    AppError::TimezoneNotFound(_) => TIMEZONE_NOT_FOUND,
                    _ => COUNTRY_NOT_FOUND,
                });
            }
        }
    }

    fn select(&mut self, selection: CountryTimeSelection) {
        self.clock.start(selection.zone.clone());
        self.selection = Some(selection);
    }

    pub fn selection(&self) -> Option<&CountryTimeSelection> {
        self.selection.as_ref()
    }

    /// User-visible message of the last failed search.
    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    pub fn current_time(&self) -> Option<ClockTick> {
        self.clock.current()
    }

    pub fn clock(&self) -> &ClockDriver {
        &self.clock
    }

    /// Stops the clock, forgets the selection and drops pending suggestion work.
    pub fn close(&mut self) {
        info!("Closing live timer");
        self.clock.stop();
        self.debouncer.cancel();
        self.selection = None;
        self.error = None;
    }

    /// Result card for the current state, or the error message.
    pub fn render_card(&self) -> String {
        if let Some(error) = self.error {
            return error.to_string();
        }
        let Some(selection) = &self.selection else {
            return "No country selected.".to_string();
        };

        let mut card = String::new();
        if let Some(flag) = &selection.flag_url {
            let _ = writeln!(card, "[flag] {}", flag);
        }
        let _ = writeln!(card, "{}", selection.display_name);
        let time = self.clock.current().map(|t| t.0).unwrap_or_default();
        let _ = writeln!(card, "  {}", time);
        let _ = write!(card, "Timezone: {}", selection.zone);
        card
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::tests::noon_clock;
    use crate::debounce::tests::FakeLookup;
    use std::time::Duration;
    use tokio::time::sleep;

    fn timer(lookup: &Arc<FakeLookup>) -> LiveTimer<FakeLookup> {
        LiveTimer::new(Arc::clone(lookup), &Config::default(), noon_clock())
    }

    fn nepal() -> FakeLookup {
        FakeLookup::default().with_record(
            "Nepal",
            &["UTC+05:45"],
            Some("https://flagcdn.com/np.svg"),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn well_known_country_needs_no_network() {
        let lookup = Arc::new(nepal());
        let mut timer = timer(&lookup);

        timer.show_time("India").await;

        let selection = timer.selection().unwrap();
        assert_eq!(selection.display_name, "India");
        assert_eq!(selection.zone, ClockSource::Zone(chrono_tz::Asia::Kolkata));
        assert!(lookup.calls().is_empty());

        sleep(Duration::from_millis(10)).await;
        assert_eq!(timer.current_time(), Some(ClockTick("17:30:00".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn other_countries_use_service_offset() {
        let lookup = Arc::new(nepal());
        let mut timer = timer(&lookup);

        timer.show_time("Nepal").await;

        assert_eq!(lookup.calls(), vec!["Nepal".to_string()]);
        let selection = timer.selection().unwrap();
        assert_eq!(selection.zone, ClockSource::Offset("UTC+05:45".into()));
        assert_eq!(selection.flag_url.as_deref(), Some("https://flagcdn.com/np.svg"));

        sleep(Duration::from_millis(10)).await;
        assert_eq!(timer.current_time(), Some(ClockTick("17:45:00".into())));
        assert_eq!(
            timer.render_card(),
            "[flag] https://flagcdn.com/np.svg\nNepal\n  17:45:00\nTimezone: UTC+05:45"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_search_clears_previous_result() {
        let lookup = Arc::new(nepal().with_record("Bouvet Island", &[], None));
        let mut timer = timer(&lookup);

        timer.show_time("Japan").await;
        assert!(timer.clock().is_running());

        timer.show_time("Atlantis").await;
        assert_eq!(timer.error(), Some(COUNTRY_NOT_FOUND));
        assert!(timer.selection().is_none());
        assert!(!timer.clock().is_running());
        assert_eq!(timer.current_time(), None);
        assert_eq!(timer.render_card(), "Country not found.");

        timer.show_time("Bouvet Island").await;
        assert_eq!(timer.error(), Some(TIMEZONE_NOT_FOUND));

        timer.show_time("Nepal").await;
        assert_eq!(timer.error(), None);
        assert!(timer.clock().is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn picking_a_suggestion_shows_its_time() {
        let lookup = Arc::new(nepal().with_search("Nep", 10, &["Nepal"]));
        let mut timer = timer(&lookup);

        timer.type_query("Nep");
        sleep(Duration::from_millis(400)).await;
        assert_eq!(timer.suggestions().names, vec!["Nepal".to_string()]);

        assert!(!timer.pick_suggestion(3).await);
        assert!(timer.pick_suggestion(0).await);
        assert!(timer.suggestions().names.is_empty());
        assert_eq!(timer.selection().unwrap().display_name, "Nepal");
    }

    #[tokio::test(start_paused = true)]
    async fn closing_stops_the_clock() {
        let lookup = Arc::new(nepal());
        let mut timer = timer(&lookup);
        timer.show_time("France").await;
        sleep(Duration::from_millis(2500)).await;

        timer.close();
        let closed_at = timer.clock().recomputations();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(timer.clock().recomputations(), closed_at);
    }

    #[tokio::test(start_paused = true)]
    async fn closing_forgets_the_selection() {
        let lookup = Arc::new(nepal());
        let mut timer = timer(&lookup);
        timer.show_time("Nepal").await;
        sleep(Duration::from_millis(10)).await;
        assert!(timer.selection().is_some());

        timer.close();
        assert!(timer.selection().is_none());
        assert_eq!(timer.error(), None);
        assert_eq!(timer.render_card(), "No country selected.");
    }

    #[tokio::test(start_paused = true)]
    async fn blank_search_reports_country_not_found() {
        let lookup = Arc::new(nepal());
        let mut timer = timer(&lookup);
        timer.show_time("Japan").await;

        timer.show_time("   ").await;
        assert_eq!(timer.error(), Some(COUNTRY_NOT_FOUND));
        assert!(timer.selection().is_none());
        assert!(!timer.clock().is_running());
        assert_eq!(timer.render_card(), "Country not found.");
        assert!(lookup.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn showing_a_country_cancels_pending_suggestions() {
        let lookup = Arc::new(nepal().with_search("Nep", 10, &["Nepal"]));
        let mut timer = timer(&lookup);

        timer.type_query("Nep");
        assert!(timer.suggestions_pending());

        timer.show_time("India").await;
        assert!(!timer.suggestions_pending());
        assert!(!timer.suggestions().loading);

        sleep(Duration::from_secs(1)).await;
        // the suggestion lookup never fired
        assert!(lookup.calls().is_empty());
        assert!(timer.suggestions().names.is_empty());
    }
}
