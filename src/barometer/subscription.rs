//! # Subscription Controller
//!
//! Explicit two-state controller over the sample stream. While unsubscribed,
//! the main loop leaves the sensor untouched and the detector sees nothing;
//! toggling back resumes sampling against the same detector state.

/// Whether the sample stream is being consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Samples are read and processed.
    Subscribed,
    /// Sampling is paused.
    Unsubscribed,
}

impl SubscriptionState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Subscribed => "subscribed",
            Self::Unsubscribed => "unsubscribed",
        }
    }
}

/// Two-state subscription controller for the barometer stream.
///
/// Starts subscribed.
#[derive(Debug, Clone, Copy)]
pub struct Subscription {
    state: SubscriptionState,
}

impl Default for Subscription {
    fn default() -> Self {
        Self::new()
    }
}

impl Subscription {
    /// Creates a subscription in the `Subscribed` state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SubscriptionState::Subscribed,
        }
    }

    /// Flip between subscribed and unsubscribed, returning the new state.
    pub fn toggle(&mut self) -> SubscriptionState {
        self.state = match self.state {
            SubscriptionState::Subscribed => SubscriptionState::Unsubscribed,
            SubscriptionState::Unsubscribed => SubscriptionState::Subscribed,
        };
        self.state
    }

    /// Resume sampling.
    pub fn subscribe(&mut self) {
        self.state = SubscriptionState::Subscribed;
    }

    /// Pause sampling.
    pub fn unsubscribe(&mut self) {
        self.state = SubscriptionState::Unsubscribed;
    }

    /// Whether samples should currently be read.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == SubscriptionState::Subscribed
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SubscriptionState {
        self.state
    }
}
