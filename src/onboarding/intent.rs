//! Navigation intents and the sink they are delivered to.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Which email screen to present next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum NavigationIntent {
    InsertEmail { is_from_profile_section: bool },
    ReadEmail { is_from_profile_section: bool },
    ValidateEmail {
        #[serde(default)]
        is_from_profile_section: bool,
    },
}

impl NavigationIntent {
    /// Insert-email screen reached from the onboarding flow.
    pub fn insert_email() -> Self {
        Self::InsertEmail {
            is_from_profile_section: false,
        }
    }

    /// Read-email screen reached from the onboarding flow.
    pub fn read_email() -> Self {
        Self::ReadEmail {
            is_from_profile_section: false,
        }
    }

    /// Validate-email reminder, no parameters.
    pub fn validate_email() -> Self {
        Self::ValidateEmail {
            is_from_profile_section: false,
        }
    }

    pub fn is_from_profile_section(&self) -> bool {
        match self {
            Self::InsertEmail {
                is_from_profile_section,
            }
            | Self::ReadEmail {
                is_from_profile_section,
            }
            | Self::ValidateEmail {
                is_from_profile_section,
            } => *is_from_profile_section,
        }
    }
}

impl std::fmt::Display for NavigationIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InsertEmail { .. } => "insert_email",
            Self::ReadEmail { .. } => "read_email",
            Self::ValidateEmail { .. } => "validate_email",
        };
        write!(f, "{s}")
    }
}

/// Side-effect boundary toward the navigation layer.
///
/// Delivery is fire-and-forget: a sink never reports failure to the emitter.
pub trait IntentSink: Send + Sync {
    fn emit(&self, intent: NavigationIntent);
}

/// Sink that forwards intents, in emission order, over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelIntentSink {
    tx: mpsc::UnboundedSender<NavigationIntent>,
}

impl ChannelIntentSink {
    /// Create a sink and the receiver the navigation layer reads from.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<NavigationIntent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl IntentSink for ChannelIntentSink {
    fn emit(&self, intent: NavigationIntent) {
        if self.tx.send(intent).is_err() {
            tracing::warn!(%intent, "Navigation layer gone, intent dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_screen_tag() {
        let json = serde_json::to_value(NavigationIntent::insert_email()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"screen": "insert_email", "is_from_profile_section": false})
        );
    }

    #[test]
    fn validate_email_flag_defaults_to_false() {
        let intent: NavigationIntent =
            serde_json::from_str(r#"{"screen": "validate_email"}"#).unwrap();
        assert_eq!(intent, NavigationIntent::validate_email());
        assert!(!intent.is_from_profile_section());
    }

    #[test]
    fn display_matches_serde_tag() {
        let intents = [
            NavigationIntent::insert_email(),
            NavigationIntent::read_email(),
            NavigationIntent::validate_email(),
        ];
        for intent in intents {
            let json = serde_json::to_value(intent).unwrap();
            assert_eq!(json["screen"], intent.to_string(), "mismatch for {intent:?}");
        }
    }

    #[test]
    fn profile_section_flag_is_reported() {
        let intent = NavigationIntent::ReadEmail {
            is_from_profile_section: true,
        };
        assert!(intent.is_from_profile_section());
        assert!(!NavigationIntent::read_email().is_from_profile_section());
    }

    #[tokio::test]
    async fn channel_sink_preserves_order() {
        let (sink, mut rx) = ChannelIntentSink::new();
        sink.emit(NavigationIntent::insert_email());
        sink.emit(NavigationIntent::validate_email());

        assert_eq!(rx.recv().await, Some(NavigationIntent::insert_email()));
        assert_eq!(rx.recv().await, Some(NavigationIntent::validate_email()));
    }

    #[test]
    fn channel_sink_tolerates_dropped_receiver() {
        let (sink, rx) = ChannelIntentSink::new();
        drop(rx);
        sink.emit(NavigationIntent::read_email());
    }
}
