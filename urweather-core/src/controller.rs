//! Query lifecycle: input text, the single lookup, and the error banner.
//!
//! All state lives in a `watch` channel. Each transition is applied with one
//! `send_modify`, so observers never see a half-applied update. The banner
//! auto-dismiss runs as a spawned timer task, one per error occurrence.

use parking_lot::Mutex;
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

#[cfg(test)]
use mockall::automock;

use crate::{Config, QueryError, QueryState, provider::WeatherProvider};

pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_millis(3000);

/// Moves keyboard focus to the location input.
#[cfg_attr(test, automock)]
pub trait InputFocus: Send + Sync {
    fn focus_input(&self);
}

/// For front-ends without a focusable input.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFocus;

impl InputFocus for NoFocus {
    fn focus_input(&self) {}
}

pub struct QueryController {
    provider: Arc<dyn WeatherProvider>,
    focus: Arc<dyn InputFocus>,
    state: Arc<watch::Sender<QueryState>>,
    // Bumped inside `send_modify` whenever the error changes; a timer only
    // hides the banner if its occurrence is still the current one.
    error_seq: Arc<AtomicU64>,
    dismiss_timer: Mutex<Option<(u64, JoinHandle<()>)>>,
    dismiss_after: Duration,
    startup_location: String,
}

impl fmt::Debug for QueryController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryController")
            .field("state", &*self.state.borrow())
            .field("dismiss_after", &self.dismiss_after)
            .field("startup_location", &self.startup_location)
            .finish_non_exhaustive()
    }
}

impl QueryController {
    pub fn new(provider: Arc<dyn WeatherProvider>, focus: Arc<dyn InputFocus>) -> Self {
        let (tx, _rx) = watch::channel(QueryState::default());
        Self {
            provider,
            focus,
            state: Arc::new(tx),
            error_seq: Arc::new(AtomicU64::new(0)),
            dismiss_timer: Mutex::new(None),
            dismiss_after: DEFAULT_DISMISS_AFTER,
            startup_location: String::new(),
        }
    }

    pub fn from_config(
        config: &Config,
        provider: Arc<dyn WeatherProvider>,
        focus: Arc<dyn InputFocus>,
    ) -> Self {
        Self::new(provider, focus)
            .with_dismiss_after(config.error_dismiss_after())
            .with_startup_location(config.startup_location.clone())
    }

    pub fn with_dismiss_after(mut self, dismiss_after: Duration) -> Self {
        self.dismiss_after = dismiss_after;
        self
    }

    pub fn with_startup_location(mut self, location: impl Into<String>) -> Self {
        self.startup_location = location.into();
        self
    }

    /// Copy of the current state.
    pub fn state(&self) -> QueryState {
        self.state.borrow().clone()
    }

    /// Read-only view of state changes.
    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.state.subscribe()
    }

    /// Focus the input, then look up the startup location.
    pub async fn mount(&self) {
        self.focus.focus_input();
        let location = self.startup_location.clone();
        self.set_input(location);
        self.submit_input().await;
    }

    pub fn set_input(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.send_modify(|s| s.pending_input_text = text);
    }

    /// Submit whatever is currently in the input.
    pub async fn submit_input(&self) {
        let text = self.state.borrow().pending_input_text.clone();
        self.submit(&text).await;
    }

    /// Run one lookup and fold its outcome into the state.
    ///
    /// Never fails: every error ends up in the banner. Overlapping calls are
    /// not sequenced, whichever resolves last wins.
    pub async fn submit(&self, location: &str) {
        self.focus.focus_input();

        if location.trim().is_empty() {
            self.raise_error(QueryError::Validation);
            return;
        }

        self.clear_error();
        debug!(location, "submitting lookup");

        match self.provider.current(location).await {
            Ok(snapshot) => {
                info!(label = %snapshot.resolved_location_label, "lookup succeeded");
                let confirmed = location.to_string();
                self.state.send_modify(|s| {
                    s.current_snapshot = Some(snapshot);
                    s.last_confirmed_location = confirmed;
                    s.pending_input_text.clear();
                });
            }
            Err(err) => {
                warn!(location, error = %err, "lookup failed");
                self.raise_error(err);
            }
        }
    }

    /// Hide the banner and forget the message right away.
    pub fn dismiss_error(&self) {
        let seq = Arc::clone(&self.error_seq);
        self.state.send_modify(|s| {
            seq.fetch_add(1, Ordering::SeqCst);
            s.error_message = None;
            s.error_banner_visible = false;
        });
        self.cancel_stale_timer();
    }

    /// Cancel pending side effects. State is left as it is.
    pub fn teardown(&self) {
        self.cancel_timer();
    }

    fn clear_error(&self) {
        let seq = Arc::clone(&self.error_seq);
        let changed = self.state.send_if_modified(|s| {
            if s.error_message.is_none() && !s.error_banner_visible {
                return false;
            }
            seq.fetch_add(1, Ordering::SeqCst);
            s.error_message = None;
            s.error_banner_visible = false;
            true
        });
        if changed {
            self.cancel_stale_timer();
        }
    }

    fn raise_error(&self, err: QueryError) {
        let message = err.banner_text();
        let seq = Arc::clone(&self.error_seq);
        let mut occurrence = 0;

        self.state.send_modify(|s| {
            occurrence = seq.fetch_add(1, Ordering::SeqCst) + 1;
            s.error_message = Some(message);
            s.error_banner_visible = true;
            s.pending_input_text.clear();
        });

        self.arm_timer(occurrence);
    }

    fn arm_timer(&self, occurrence: u64) {
        let state = Arc::clone(&self.state);
        let seq = Arc::clone(&self.error_seq);
        let delay = self.dismiss_after;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            state.send_if_modified(|s| {
                if seq.load(Ordering::SeqCst) != occurrence || !s.error_banner_visible {
                    return false;
                }
                s.error_banner_visible = false;
                true
            });
        });

        let mut slot = self.dismiss_timer.lock();
        // A newer error may already have armed its own timer.
        if slot.as_ref().is_some_and(|(armed, _)| *armed > occurrence) {
            handle.abort();
        } else if let Some((_, previous)) = slot.replace((occurrence, handle)) {
            previous.abort();
        }
    }

    fn cancel_stale_timer(&self) {
        let current = self.error_seq.load(Ordering::SeqCst);
        let mut slot = self.dismiss_timer.lock();
        match slot.take() {
            Some((armed, handle)) if armed != current => handle.abort(),
            other => *slot = other,
        }
    }

    fn cancel_timer(&self) {
        if let Some((_, handle)) = self.dismiss_timer.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for QueryController {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.dismiss_timer.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        WeatherSnapshot,
        provider::{MockWeatherProvider, WeatherProvider},
    };
    use async_trait::async_trait;
    use chrono::Utc;

    fn snapshot(label: &str, temperature_c: f64) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature_c,
            humidity_pct: 50.0,
            wind_kph: 5.0,
            condition_text: "Sunny".into(),
            condition_icon_url: "https://cdn/113.png".into(),
            resolved_location_label: label.into(),
            observed_at: Utc::now(),
        }
    }

    fn controller(provider: MockWeatherProvider) -> QueryController {
        QueryController::new(Arc::new(provider), Arc::new(NoFocus))
    }

    async fn wait(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn empty_input_raises_validation_without_network() {
        let mut provider = MockWeatherProvider::new();
        provider.expect_current().times(0);
        let ctl = controller(provider);

        ctl.submit("").await;

        let state = ctl.state();
        assert_eq!(state.error_message.as_deref(), Some("Please enter a location"));
        assert!(state.error_banner_visible);

        wait(2999).await;
        assert!(ctl.state().error_banner_visible);

        wait(2).await;
        let state = ctl.state();
        assert!(!state.error_banner_visible);
        assert_eq!(state.banner(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_input_counts_as_empty() {
        let mut provider = MockWeatherProvider::new();
        provider.expect_current().times(0);
        let ctl = controller(provider);

        ctl.set_input("   ");
        ctl.submit_input().await;

        let state = ctl.state();
        assert_eq!(state.banner(), Some("Please enter a location"));
        assert_eq!(state.pending_input_text, "");
    }

    #[tokio::test(start_paused = true)]
    async fn not_found_keeps_confirmed_location_and_clears_input() {
        let mut provider = MockWeatherProvider::new();
        provider
            .expect_current()
            .withf(|loc| loc == "paris")
            .times(1)
            .returning(|_| Err(QueryError::NotFound));
        let ctl = controller(provider);

        ctl.set_input("paris");
        ctl.submit_input().await;

        let state = ctl.state();
        assert_eq!(state.error_message.as_deref(), Some("Location not found"));
        assert!(state.error_banner_visible);
        assert_eq!(state.last_confirmed_location, "");
        assert_eq!(state.pending_input_text, "");
        assert!(state.current_snapshot.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn success_populates_snapshot_and_confirms_location() {
        let mut provider = MockWeatherProvider::new();
        provider
            .expect_current()
            .withf(|loc| loc == "paris")
            .times(1)
            .returning(|_| Ok(snapshot("Paris, Ile-de-France, France", 18.0)));
        let ctl = controller(provider);

        ctl.set_input("paris");
        ctl.submit_input().await;

        let state = ctl.state();
        let snap = state.current_snapshot.as_ref().expect("snapshot");
        assert_eq!(snap.resolved_location_label, "Paris, Ile-de-France, France");
        assert_eq!(state.last_confirmed_location, "paris");
        assert_eq!(state.error_message, None);
        assert!(!state.error_banner_visible);
        assert_eq!(state.pending_input_text, "");
    }

    #[tokio::test(start_paused = true)]
    async fn failure_after_success_leaves_previous_result_alone() {
        let mut provider = MockWeatherProvider::new();
        provider
            .expect_current()
            .withf(|loc| loc == "london")
            .returning(|_| Ok(snapshot("London, City of London, UK", 12.0)));
        provider
            .expect_current()
            .withf(|loc| loc == "atlantis")
            .returning(|_| Err(QueryError::NotFound));
        let ctl = controller(provider);

        ctl.submit("london").await;
        ctl.submit("atlantis").await;

        let state = ctl.state();
        assert_eq!(state.last_confirmed_location, "london");
        assert_eq!(
            state.current_snapshot.as_ref().map(|s| s.resolved_location_label.as_str()),
            Some("London, City of London, UK")
        );
        assert_eq!(state.banner(), Some("Location not found"));
    }

    #[tokio::test(start_paused = true)]
    async fn transport_message_is_shown_verbatim() {
        let mut provider = MockWeatherProvider::new();
        provider
            .expect_current()
            .returning(|_| Err(QueryError::Transport("error sending request".into())));
        let ctl = controller(provider);

        ctl.submit("paris").await;

        assert_eq!(ctl.state().banner(), Some("error sending request"));
    }

    #[tokio::test(start_paused = true)]
    async fn new_error_restarts_the_dismiss_timer() {
        let mut provider = MockWeatherProvider::new();
        provider.expect_current().times(0);
        let ctl = controller(provider);

        ctl.submit("").await;
        wait(2000).await;
        ctl.submit("").await;

        wait(1500).await;
        assert!(ctl.state().error_banner_visible, "first timer must not fire");

        wait(1501).await;
        assert!(!ctl.state().error_banner_visible);
    }

    #[tokio::test(start_paused = true)]
    async fn successful_submit_clears_a_visible_error() {
        let mut provider = MockWeatherProvider::new();
        provider.expect_current().returning(|_| Ok(snapshot("Paris, IDF, France", 18.0)));
        let ctl = controller(provider);

        ctl.submit("").await;
        assert!(ctl.state().error_banner_visible);

        ctl.submit("paris").await;
        let state = ctl.state();
        assert_eq!(state.error_message, None);
        assert!(!state.error_banner_visible);
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_cancels_pending_dismiss() {
        let mut provider = MockWeatherProvider::new();
        provider.expect_current().times(0);
        let ctl = controller(provider);

        ctl.submit("").await;
        ctl.teardown();
        wait(5000).await;

        assert!(ctl.state().error_banner_visible);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_dismiss_clears_message() {
        let mut provider = MockWeatherProvider::new();
        provider.expect_current().times(0);
        let ctl = controller(provider);

        ctl.submit("").await;
        ctl.dismiss_error();

        let state = ctl.state();
        assert_eq!(state.error_message, None);
        assert!(!state.error_banner_visible);
    }

    #[tokio::test(start_paused = true)]
    async fn focus_requested_on_mount_and_every_submit() {
        let mut provider = MockWeatherProvider::new();
        provider.expect_current().returning(|_| Err(QueryError::NotFound));
        let mut focus = MockInputFocus::new();
        // mount itself, the startup submit, then two more submits
        focus.expect_focus_input().times(4).return_const(());

        let ctl = QueryController::new(Arc::new(provider), Arc::new(focus))
            .with_startup_location("arani");
        ctl.mount().await;
        ctl.submit("").await;
        ctl.submit("nowhere").await;
    }

    #[tokio::test(start_paused = true)]
    async fn mount_fetches_startup_location() {
        let mut provider = MockWeatherProvider::new();
        provider
            .expect_current()
            .withf(|loc| loc == "arani")
            .times(1)
            .returning(|_| Ok(snapshot("Arani, Tamil Nadu, India", 30.0)));
        let ctl = controller(provider).with_startup_location("arani");

        ctl.mount().await;

        let state = ctl.state();
        assert_eq!(state.last_confirmed_location, "arani");
        assert_eq!(state.pending_input_text, "");
        assert!(state.current_snapshot.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn observers_see_one_atomic_update_per_outcome() {
        let mut provider = MockWeatherProvider::new();
        provider.expect_current().returning(|_| Ok(snapshot("Paris, IDF, France", 18.0)));
        let ctl = controller(provider);
        ctl.set_input("paris");

        let mut rx = ctl.subscribe();
        assert!(!rx.has_changed().expect("sender alive"));

        ctl.submit_input().await;

        assert!(rx.has_changed().expect("sender alive"));
        let seen = rx.borrow_and_update().clone();
        assert!(seen.current_snapshot.is_some());
        assert_eq!(seen.last_confirmed_location, "paris");
        assert_eq!(seen.pending_input_text, "");
    }

    /// Resolves each location after its own delay.
    struct DelayedProvider;

    #[async_trait]
    impl WeatherProvider for DelayedProvider {
        async fn current(&self, location: &str) -> Result<WeatherSnapshot, QueryError> {
            let delay = if location == "slow" { 200 } else { 50 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(snapshot(location, 10.0))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_submits_last_resolution_wins() {
        let ctl = QueryController::new(Arc::new(DelayedProvider), Arc::new(NoFocus));

        tokio::join!(ctl.submit("slow"), ctl.submit("fast"));

        let state = ctl.state();
        assert_eq!(state.last_confirmed_location, "slow");
        assert_eq!(
            state.current_snapshot.map(|s| s.resolved_location_label).as_deref(),
            Some("slow")
        );
    }
}
