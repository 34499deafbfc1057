//! CLI argument parsing.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "peer")]
#[command(about = "Signaling peer — talk to a relayer from the terminal")]
pub struct Cli {
    /// Relayer WebSocket URL (defaults to $RELAY_URL, then ws://localhost:8080/ws)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Origin header sent with the handshake (defaults to $RELAY_ORIGIN)
    #[arg(long, global = true)]
    pub origin: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send stdin lines and print what other peers send [default]
    Chat,

    /// Print incoming messages until the relayer closes the connection
    Listen,

    /// Send a single message and exit
    Send {
        /// Message type, e.g. offer, answer, candidate, chat
        #[arg(value_name = "TYPE")]
        kind: String,

        /// Payload as JSON; anything that is not valid JSON is sent as a string
        #[arg(value_name = "PAYLOAD")]
        payload: Option<String>,
    },
}
