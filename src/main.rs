use std::io::{self, BufRead, IsTerminal, Write};

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use whale_tracker::{
    blockchain::{EtherscanClient, PollingLoop, WhaleDetector},
    config::Config,
    mask_secret, ConsoleNotifier,
};

fn prompt_api_key() -> Option<String> {
    if !io::stdin().is_terminal() {
        return None;
    }

    println!("--- Etherscan Whale Tracker ---");
    println!("To monitor transactions, we need an Etherscan API Key.");
    print!("Enter your API Key: ");
    io::stdout().flush().ok()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;
    Some(line.trim().to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env(prompt_api_key) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(e.into());
        }
    };
    info!("Configuration loaded: {:?}", config);

    println!("\n🚀 Starting Surveillance...");
    println!("🎯 Threshold: >= {} ETH", config.alert_threshold);
    println!("📡 Connecting to chain {} via {}...", config.chain_id, config.api_url);
    info!("Using API key {}", mask_secret(&config.api_key));

    let client = EtherscanClient::new(&config)?;
    let notifier = ConsoleNotifier::new(config.explorer_tx_url.clone());
    let detector = WhaleDetector::new(config.alert_threshold);

    let mut polling = match PollingLoop::connect(client, notifier, detector, config.polling_settings()).await {
        Ok(polling) => polling,
        Err(e) => {
            error!("{}", e);
            eprintln!("❌ Failed to connect or rate limited. Check your API Key.");
            return Err(e.into());
        }
    };

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received");
                signal_token.cancel();
            }
            Err(e) => error!("Unable to listen for interrupt signal: {}", e),
        }
    });

    polling.run(shutdown).await;

    Ok(())
}
