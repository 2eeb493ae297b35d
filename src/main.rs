//! CLI for topicpanel
//!
//! Subcommands:
//! - `connect`: sign in against a broker and run the panel over WebSockets
//! - `offline`: run the panel on an in-process bus (messages loop back)

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use topicpanel::auth::{AuthGate, Credentials, Session, StaticAuthenticator, WsAuthenticator};
use topicpanel::bus::{LocalBus, TopicBus, WsTopicBus};
use topicpanel::config::{Settings, load_config};
use topicpanel::panel::{Flow, MessagingPanel, PanelCommand};

#[derive(Parser)]
#[command(name = "topicpanel")]
struct Cli {
    /// Log level: error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in against the broker and run the panel
    Connect {
        /// Broker WebSocket URL (overrides bus.endpoint)
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Run the panel without a broker
    Offline,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    topicpanel::utils::logging::init(&cli.log_level);

    let settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return;
        }
    };

    let outcome = match cli.command {
        Command::Connect {
            endpoint,
            username,
            password,
        } => run_connected(settings, endpoint, username, password).await,
        Command::Offline => run_offline(settings).await,
    };

    if let Err(e) = outcome {
        error!("Panel failed: {}", e);
    }
}

async fn run_connected(
    mut settings: Settings,
    endpoint: Option<String>,
    username: Option<String>,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(endpoint) = endpoint {
        settings.bus.endpoint = endpoint;
    }
    if let Some(username) = username {
        settings.auth.username = username;
    }
    if let Some(password) = password {
        settings.auth.password = password;
    }

    let gate = AuthGate::new(WsAuthenticator::new(settings.bus.endpoint.clone()));
    let session = gate.open(&Credentials::from(&settings.auth)).await?;
    let bus = WsTopicBus::connect(&settings.bus, &session).await?;

    run_panel(&session, Arc::new(bus), &settings).await
}

async fn run_offline(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let credentials = Credentials::from(&settings.auth);
    let gate = AuthGate::new(StaticAuthenticator::new(credentials.clone()));
    let session = gate.open(&credentials).await?;

    run_panel(&session, Arc::new(LocalBus::new()), &settings).await
}

async fn run_panel<B: TopicBus + 'static>(
    session: &Session,
    bus: Arc<B>,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut panel = MessagingPanel::mount(session, bus, &settings.panel).await;
    println!("{}", panel.view());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = panel.next_event() => {
                panel.handle_event(event);
                panel.pump();
                println!("{}", panel.view());
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match line.parse::<PanelCommand>() {
                    Ok(command) => {
                        if panel.apply(command).await == Flow::Quit {
                            break;
                        }
                        println!("{}", panel.view());
                    }
                    Err(e) => eprintln!("{e}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received. Exiting gracefully.");
                break;
            }
        }
    }

    panel.teardown();
    Ok(())
}
