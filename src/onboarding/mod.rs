//! Email onboarding step — guarded navigation coordinator.
//!
//! Given a snapshot of the user profile, the coordinator decides which email
//! screen (if any) the user must see, emits that navigation intent, and then
//! waits for the user to acknowledge their email. While it waits, an edit
//! watcher sends the user to validation every time a new address is
//! inserted. The watcher is cancelled before the coordinator finishes.

pub mod coordinator;
pub mod events;
pub mod intent;
pub mod model;
pub mod state;
pub mod watcher;

pub use coordinator::{EmailCheckCoordinator, decide_next_screen};
pub use events::{EventBus, OnboardingEvent, Subscription, SubscriptionId};
pub use intent::{ChannelIntentSink, IntentSink, NavigationIntent};
pub use model::{
    FIRST_ONBOARDING_VERSION, ProfileSnapshot, has_profile_email, is_profile_email_validated,
    is_profile_first_onboarding,
};
pub use state::CoordinatorState;
pub use watcher::{EditWatcherHandle, spawn_edit_watcher};
