//! EmailCheckCoordinator — decides which email screen to show, then waits for
//! the user to acknowledge it while an edit watcher runs alongside.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{Instrument, debug, info, warn};
use uuid::Uuid;

use super::events::EventBus;
use super::intent::{IntentSink, NavigationIntent};
use super::model::{
    ProfileSnapshot, has_profile_email, is_profile_email_validated, is_profile_first_onboarding,
};
use super::state::CoordinatorState;
use super::watcher::spawn_edit_watcher;

/// Pick the screen the email step should open, if any.
///
/// `None` means the email is present, validated and already seen, so there
/// is nothing to do.
pub fn decide_next_screen(profile: &ProfileSnapshot) -> Option<NavigationIntent> {
    if !has_profile_email(profile) {
        Some(NavigationIntent::insert_email())
    } else if !is_profile_email_validated(profile) {
        Some(NavigationIntent::validate_email())
    } else if is_profile_first_onboarding(profile) {
        Some(NavigationIntent::read_email())
    } else {
        None
    }
}

/// Coordinates the email step of onboarding.
///
/// A run reads one [`ProfileSnapshot`], emits at most one navigation intent,
/// and when it does, forks the edit watcher and holds until
/// `EmailAcknowledged`. The watcher is always stopped before `run` returns.
pub struct EmailCheckCoordinator {
    events: Arc<EventBus>,
    sink: Arc<dyn IntentSink>,
    state: watch::Sender<CoordinatorState>,
}

impl std::fmt::Debug for EmailCheckCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailCheckCoordinator")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl EmailCheckCoordinator {
    pub fn new(events: Arc<EventBus>, sink: Arc<dyn IntentSink>) -> Self {
        let (state, _rx) = watch::channel(CoordinatorState::default());
        Self {
            events,
            sink,
            state,
        }
    }

    /// Observe state changes of this coordinator.
    pub fn subscribe_state(&self) -> watch::Receiver<CoordinatorState> {
        self.state.subscribe()
    }

    /// Current state.
    pub fn current_state(&self) -> CoordinatorState {
        *self.state.borrow()
    }

    /// Run the email step for `profile`.
    ///
    /// Returns immediately when there is nothing to show; otherwise returns
    /// once the acknowledgment has arrived and the watcher has stopped.
    pub async fn run(&mut self, profile: &ProfileSnapshot) {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("email_check", %run_id, profile = %profile.identity);
        self.run_inner(profile).instrument(span).await
    }

    async fn run_inner(&mut self, profile: &ProfileSnapshot) {
        self.state.send_replace(CoordinatorState::Start);
        self.transition(CoordinatorState::DecideBranch, false);

        let Some(intent) = decide_next_screen(profile) else {
            info!("Email present and validated, nothing to do");
            self.finish();
            return;
        };

        info!(%intent, "Navigating to email screen");
        self.sink.emit(intent);

        let watcher = spawn_edit_watcher(&self.events, Arc::clone(&self.sink));
        self.transition(CoordinatorState::AwaitAcknowledgment, true);

        // No timeout: the only way out is the user pressing "Continue"
        self.events.acknowledged().await;
        debug!("Email acknowledged");

        self.transition(CoordinatorState::Cancelling, true);
        watcher.cancel().await;
        self.finish();
    }

    /// Move to `Done`. An acknowledgment left over from this run (a double
    /// tap, or one raised while there was nothing to show) must not end the
    /// next run.
    fn finish(&self) {
        if self.events.clear_acknowledgment() {
            debug!("Discarded leftover acknowledgment");
        }
        self.transition(CoordinatorState::Done, false);
    }

    /// `holds_watcher` is whether this run owns a live edit watcher on entry
    /// to `target`.
    fn transition(&self, target: CoordinatorState, holds_watcher: bool) {
        let from = self.current_state();
        if !from.can_transition_to(target) {
            warn!(%from, to = %target, "Unexpected coordinator transition");
            debug_assert!(false, "invalid coordinator transition {from} -> {target}");
        }
        debug_assert_eq!(
            target.watcher_alive(),
            holds_watcher,
            "watcher ownership does not match state {target}"
        );
        debug!(%from, to = %target, watcher = holds_watcher, "Coordinator transition");
        self.state.send_replace(target);
    }
}
