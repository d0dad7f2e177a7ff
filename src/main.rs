//! upi-handoff - command-line driver for the QR-to-payment-intent pipeline.
//!
//! Takes scanned text and an amount, prints the prepared intent as JSON plus
//! every candidate deep link, and (given a user-agent) simulates the timed
//! dispatch sequence with a logging host. Debug tool; the library is the
//! product.

use anyhow::{bail, Result};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use upi_handoff::dispatch::{android_intent_uri, gpay_uri, tez_uri, upi_uri};
use upi_handoff::{
    prepare_payment, DispatchPolicy, Dispatcher, NavigationHost, UpiExtractor, Visibility,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "upi_handoff=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (raw_text, amount, user_agent) = match args.as_slice() {
        [raw, amount] => (raw.as_str(), amount.as_str(), None),
        [raw, amount, ua] => (raw.as_str(), amount.as_str(), Some(ua.as_str())),
        _ => bail!("usage: upi-handoff <scanned-text> <amount> [user-agent]"),
    };

    let policy = DispatchPolicy::from_env()?;
    let extractor = UpiExtractor::new();

    let intent = prepare_payment(raw_text, amount, &extractor)?;
    println!("{}", serde_json::to_string_pretty(&intent)?);

    println!("\ncandidate deep links:");
    println!("  upi:    {}", upi_uri(&intent.query));
    println!("  gpay:   {}", gpay_uri(&intent.query));
    println!("  tez:    {}", tez_uri(&intent.query));
    println!("  intent: {}", android_intent_uri(&intent.query, &policy));

    if let Some(ua) = user_agent {
        info!(user_agent = ua, "simulating dispatch");
        let dispatcher = Dispatcher::new(LoggingHost::new(ua), policy);
        dispatcher.open_in_payment_app(&intent.query).await;
    }

    Ok(())
}

/// Host that logs navigations instead of performing them. The page never
/// goes hidden, so a simulated dispatch always walks the full fallback
/// chain and ends in the failure alert.
struct LoggingHost {
    user_agent: String,
    visibility_tx: watch::Sender<Visibility>,
}

impl LoggingHost {
    fn new(user_agent: &str) -> Self {
        let (visibility_tx, _) = watch::channel(Visibility::Visible);
        Self {
            user_agent: user_agent.to_string(),
            visibility_tx,
        }
    }
}

impl NavigationHost for LoggingHost {
    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }

    fn navigate(&self, uri: &str) {
        println!("[navigate] {uri}");
    }

    fn alert(&self, message: &str) {
        println!("[alert] {message}");
    }

    fn visibility(&self) -> watch::Receiver<Visibility> {
        self.visibility_tx.subscribe()
    }
}
