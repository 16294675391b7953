//! Confab real-time messaging hub.
//!
//! Clients connect to `/ws` with a bearer token and exchange `message`,
//! `typing` and `read` frames that are fanned out to every live connection of
//! the conversation's participants.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin confab-server -- \
//!     --token alice-token=alice --token bob-token=bob \
//!     --conversation general=alice,bob
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use confab_server::{
    infrastructure::{
        auth::StaticTokenAuthenticator,
        repository::{ConversationSeed, InMemoryMessagingService},
    },
    ui::{AppState, HubConfig, Server},
};
use confab_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "confab-server")]
#[command(about = "Real-time messaging hub over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Close a connection after this many seconds without any inbound frame
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u64).range(1..))]
    read_timeout_secs: u64,

    /// Upper bound for a single outbound write
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u64).range(1..))]
    write_timeout_secs: u64,

    /// Interval between protocol pings
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    ping_interval_secs: u64,

    /// Upper bound for sending a single ping
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u64).range(1..))]
    ping_timeout_secs: u64,

    /// Expire cached conversation membership after this many seconds (never when omitted)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    membership_ttl_secs: Option<u64>,

    /// Capacity of each connection's outbound queue
    #[arg(long, default_value = "64", value_parser = clap::value_parser!(u64).range(1..))]
    outbound_queue_capacity: u64,

    /// How long to wait for connections to drain on shutdown
    #[arg(long, default_value = "5")]
    shutdown_grace_secs: u64,

    /// Accepted bearer token, as TOKEN=USER (repeatable)
    #[arg(long = "token", value_name = "TOKEN=USER")]
    tokens: Vec<String>,

    /// Conversation to create at startup, as ID=USER,USER,... (repeatable)
    #[arg(long = "conversation", value_name = "ID=USER,USER")]
    conversations: Vec<ConversationSeed>,
}

impl Args {
    fn hub_config(&self) -> HubConfig {
        HubConfig {
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            write_timeout: Duration::from_secs(self.write_timeout_secs),
            ping_interval: Duration::from_secs(self.ping_interval_secs),
            ping_timeout: Duration::from_secs(self.ping_timeout_secs),
            membership_ttl: self.membership_ttl_secs.map(Duration::from_secs),
            outbound_queue_capacity: usize::try_from(self.outbound_queue_capacity)
                .unwrap_or(usize::MAX),
            shutdown_grace: Duration::from_secs(self.shutdown_grace_secs),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger("confab-server", env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Collaborators (authenticator, messaging / conversations)
    // 2. AppState (registry, cache, pusher, usecases)
    // 3. Server

    // 1. Collaborators
    let authenticator = match StaticTokenAuthenticator::from_pairs(&args.tokens) {
        Ok(authenticator) => authenticator,
        Err(e) => {
            tracing::error!("Invalid --token: {}", e);
            std::process::exit(1);
        }
    };
    if authenticator.is_empty() {
        tracing::warn!("No --token given; every connection will be rejected");
    }

    let clock = Arc::new(SystemClock);
    let messaging = Arc::new(InMemoryMessagingService::new(clock.clone()));
    for seed in &args.conversations {
        let conversation = messaging
            .insert_conversation(seed.id.clone(), seed.participants.clone())
            .await;
        tracing::info!(
            conversation_id = %conversation.id,
            participants = conversation.participant_ids.len(),
            "Conversation created"
        );
    }

    // 2. AppState
    let state = Arc::new(AppState::new(
        args.hub_config(),
        Arc::new(authenticator),
        messaging.clone(),
        messaging,
        clock,
    ));

    // 3. Run the server
    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
