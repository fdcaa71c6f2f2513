use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use email_onboarding::config::CoordinatorConfig;
use email_onboarding::error::{ProfileError, Result};
use email_onboarding::onboarding::{
    ChannelIntentSink, EmailCheckCoordinator, EventBus, OnboardingEvent, ProfileSnapshot,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (stderr, so stdout carries only intents)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = CoordinatorConfig::from_env()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let profile = load_profile(&config, &mut lines)
        .await
        .context("could not obtain a profile snapshot")?;

    eprintln!("📧 Email onboarding v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Profile: {}", profile.identity);
    eprintln!("   Events: `insert` (EmailInsert), `ack` (EmailAcknowledged)\n");

    let bus = EventBus::new();
    let (sink, mut intents) = ChannelIntentSink::new();
    let mut coordinator = EmailCheckCoordinator::new(Arc::clone(&bus), Arc::new(sink));

    // Intents go to stdout as JSON lines
    let printer = tokio::spawn(async move {
        while let Some(intent) = intents.recv().await {
            match serde_json::to_string(&intent) {
                Ok(json) => {
                    println!("{json}");
                    if let Err(e) = std::io::stdout().flush() {
                        tracing::warn!(error = %e, "Failed to flush intent to stdout");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Failed to serialize intent"),
            }
        }
    });

    // stdin lines become onboarding events
    let reader = tokio::spawn(async move {
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match line.parse::<OnboardingEvent>() {
                        Ok(event) => bus.emit(event),
                        Err(e) => eprintln!("{e} (expected: insert | ack)"),
                    }
                }
                Ok(None) => break, // EOF
                Err(e) => {
                    tracing::error!("Error reading stdin: {}", e);
                    break;
                }
            }
        }
    });

    coordinator.run(&profile).await;
    reader.abort();

    // Last sink goes with the coordinator, which lets the printer drain and stop
    drop(coordinator);
    printer.await?;

    eprintln!("   Email step done.");

    // The stdin read may still be parked on the blocking pool
    std::process::exit(0);
}

/// Profile comes from `ONBOARDING_PROFILE_PATH` if set, else the first stdin line.
async fn load_profile(
    config: &CoordinatorConfig,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<ProfileSnapshot> {
    if let Some(path) = config.profile_path.as_deref() {
        return Ok(ProfileSnapshot::load(path).await?);
    }

    eprint!("profile json> ");
    let line = lines
        .next_line()
        .await
        .map_err(|source| ProfileError::Read {
            path: "<stdin>".to_string(),
            source,
        })?
        .ok_or(ProfileError::Missing)?;
    Ok(ProfileSnapshot::from_json(&line)?)
}
