//! Platform deep-link dispatcher.
//!
//! Navigating to an unsupported custom scheme is silent: the OS raises no
//! error, so the only observable success signal is the page losing visibility
//! (the OS foregrounded the payment app). The dispatcher therefore runs a
//! timed fallback chain over candidate URIs and treats a visibility loss at
//! any point as "switched" — first signal wins, later timers are no-ops.
//!
//! The transition logic lives in [`DispatchAttempt`], a pure state machine
//! driven by `Hidden`/`TimerElapsed` events, so the policy is testable
//! without real timers. [`Dispatcher`] interprets it against a
//! [`NavigationHost`] with tokio timers; dropping the dispatch future
//! cancels every pending timer and the visibility subscription.

use std::collections::VecDeque;
use std::time::Duration;

use percent_encoding::utf8_percent_encode;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::DispatchPolicy;
use crate::query::{UpiQuery, COMPONENT};

pub const MSG_UNSUPPORTED: &str = "This flow requires Google Pay on a mobile device.";
pub const MSG_ANDROID_FAILED: &str =
    "Could not open Google Pay. Please install/enable GPay and try again.";
pub const MSG_IOS_FAILED: &str = "Could not open Google Pay. Make sure it's installed.";

/// Runtime platform, derived once per dispatch attempt from the reported
/// user-agent string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
    Unsupported,
}

impl Platform {
    pub fn detect(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        if ua.contains("android") {
            Platform::Android
        } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod") {
            Platform::Ios
        } else {
            Platform::Unsupported
        }
    }
}

/// Page visibility as reported by the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

// ============================================================================
// Deep-link builders (wire formats are bit-exact, see the UPI link contract)
// ============================================================================

pub fn upi_uri(query: &UpiQuery) -> String {
    format!("upi://pay?{query}")
}

pub fn gpay_uri(query: &UpiQuery) -> String {
    format!("gpay://upi/pay?{query}")
}

pub fn tez_uri(query: &UpiQuery) -> String {
    format!("tez://upi/pay?{query}")
}

/// Android intent URI naming the payment package, with a percent-encoded
/// browser fallback URL for when the package is absent.
pub fn android_intent_uri(query: &UpiQuery, policy: &DispatchPolicy) -> String {
    format!(
        "intent://pay?{query}#Intent;scheme=upi;package={};S.browser_fallback_url={};end",
        policy.package,
        utf8_percent_encode(&policy.store_fallback_url, COMPONENT),
    )
}

// ============================================================================
// Pure state machine
// ============================================================================

/// One candidate navigation and how long to wait on it before giving up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub uri: String,
    pub wait: Duration,
}

/// The ordered candidate chain for one platform, or `None` when the platform
/// cannot dispatch at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPlan {
    stages: Vec<Stage>,
    failure_message: &'static str,
}

impl DispatchPlan {
    pub fn build(platform: Platform, query: &UpiQuery, policy: &DispatchPolicy) -> Option<Self> {
        match platform {
            Platform::Android => Some(DispatchPlan {
                stages: vec![
                    Stage {
                        uri: android_intent_uri(query, policy),
                        wait: policy.intent_delay(),
                    },
                    Stage {
                        uri: gpay_uri(query),
                        wait: policy.scheme_delay(),
                    },
                ],
                failure_message: MSG_ANDROID_FAILED,
            }),
            Platform::Ios => Some(DispatchPlan {
                stages: vec![
                    Stage {
                        uri: gpay_uri(query),
                        wait: policy.scheme_delay(),
                    },
                    Stage {
                        uri: tez_uri(query),
                        wait: policy.scheme_delay(),
                    },
                ],
                failure_message: MSG_IOS_FAILED,
            }),
            Platform::Unsupported => None,
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }
}

/// Event fed into the state machine by whoever owns the real timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchEvent {
    /// The page lost visibility: the OS switched away to handle the URI.
    Hidden,
    /// The current stage's wait elapsed with the page still visible.
    TimerElapsed,
}

/// What the driver must do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchAction {
    /// Navigate to `uri`, then wait `wait` for a visibility signal.
    Navigate { uri: String, wait: Duration },
    /// The chain is exhausted; report failure with a blocking alert.
    ReportFailure { message: &'static str },
    /// Nothing left to do (switched away, already failed, or late event).
    Finish,
}

/// State of one dispatch attempt. Candidates are emitted strictly in order;
/// once `Hidden` or failure is seen, every further event is a no-op.
#[derive(Debug)]
pub struct DispatchAttempt {
    remaining: VecDeque<Stage>,
    failure_message: &'static str,
    switched: bool,
    done: bool,
}

impl DispatchAttempt {
    /// Begin an attempt: returns the machine plus the first navigation.
    pub fn start(plan: DispatchPlan) -> (Self, DispatchAction) {
        let mut attempt = DispatchAttempt {
            remaining: plan.stages.into(),
            failure_message: plan.failure_message,
            switched: false,
            done: false,
        };
        let first = attempt.next_stage();
        (attempt, first)
    }

    pub fn switched(&self) -> bool {
        self.switched
    }

    /// Advance on a visibility or timer event.
    pub fn on_event(&mut self, event: DispatchEvent) -> DispatchAction {
        if self.done {
            return DispatchAction::Finish;
        }
        match event {
            DispatchEvent::Hidden => {
                self.switched = true;
                self.done = true;
                DispatchAction::Finish
            }
            DispatchEvent::TimerElapsed => self.next_stage(),
        }
    }

    fn next_stage(&mut self) -> DispatchAction {
        match self.remaining.pop_front() {
            Some(stage) => DispatchAction::Navigate {
                uri: stage.uri,
                wait: stage.wait,
            },
            None => {
                self.done = true;
                DispatchAction::ReportFailure {
                    message: self.failure_message,
                }
            }
        }
    }
}

// ============================================================================
// Async driver
// ============================================================================

/// Runtime boundary the dispatcher navigates through. The visibility channel
/// stands in for the page-visibility-change event; the host keeps the sender
/// alive for as long as the page exists.
pub trait NavigationHost: Send + Sync {
    fn user_agent(&self) -> String;
    /// Fire-and-forget navigation; custom-scheme failures are silent.
    fn navigate(&self, uri: &str);
    /// Blocking user-facing message.
    fn alert(&self, message: &str);
    fn visibility(&self) -> watch::Receiver<Visibility>;
}

/// Interprets [`DispatchAttempt`] against a [`NavigationHost`] with real
/// timers.
pub struct Dispatcher<H> {
    host: H,
    policy: DispatchPolicy,
}

impl<H: NavigationHost> Dispatcher<H> {
    pub fn new(host: H, policy: DispatchPolicy) -> Self {
        Self { host, policy }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Hand the final amended query off to the payment app.
    ///
    /// Fire-and-forget: success is never confirmed, only inferred from the
    /// page losing visibility. Cancelling (dropping) this future mid-sequence
    /// clears all pending timers and the visibility subscription, so no late
    /// alert can fire.
    pub async fn open_in_payment_app(&self, final_query: &UpiQuery) {
        let platform = Platform::detect(&self.host.user_agent());
        info!(?platform, "starting payment handoff");

        let Some(plan) = DispatchPlan::build(platform, final_query, &self.policy) else {
            warn!("unsupported platform, no navigation attempted");
            self.host.alert(MSG_UNSUPPORTED);
            return;
        };

        let mut visibility = self.host.visibility();
        let (mut attempt, mut action) = DispatchAttempt::start(plan);

        loop {
            match action {
                DispatchAction::Navigate { uri, wait } => {
                    debug!(uri, ?wait, "navigating to candidate");
                    self.host.navigate(&uri);
                    let event = tokio::select! {
                        _ = wait_for_hidden(&mut visibility) => DispatchEvent::Hidden,
                        _ = tokio::time::sleep(wait) => DispatchEvent::TimerElapsed,
                    };
                    action = attempt.on_event(event);
                }
                DispatchAction::ReportFailure { message } => {
                    warn!("fallback chain exhausted, app did not open");
                    self.host.alert(message);
                    return;
                }
                DispatchAction::Finish => {
                    if attempt.switched() {
                        info!("page hidden, payment app assumed open");
                    }
                    return;
                }
            }
        }
    }
}

/// Resolves once the page reports hidden. If the host drops the sender the
/// page is gone and no signal can arrive; park forever and let the timer arm
/// of the select win.
async fn wait_for_hidden(visibility: &mut watch::Receiver<Visibility>) {
    loop {
        if *visibility.borrow_and_update() == Visibility::Hidden {
            return;
        }
        if visibility.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
