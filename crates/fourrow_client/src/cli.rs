//! Command-line interface for the 4 in a Row client.

use clap::{Parser, Subcommand};

/// 4 in a Row - real-time arena client
#[derive(Parser, Debug)]
#[command(name = "fourrow")]
#[command(about = "Real-time client for the 4 in a Row arena", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Join the arena and play from the terminal
    Play {
        /// Display name to join with
        #[arg(short, long)]
        name: String,

        /// WebSocket endpoint of the game service
        #[arg(long, env = "FOURROW_WS_URL", default_value = "ws://127.0.0.1:8080/ws")]
        ws_url: String,

        /// HTTP endpoint of the game service
        #[arg(long, env = "FOURROW_API_URL", default_value = "http://127.0.0.1:8080")]
        api_url: String,
    },

    /// Fetch and print the current leaderboard once
    Leaderboard {
        /// HTTP endpoint of the game service
        #[arg(long, env = "FOURROW_API_URL", default_value = "http://127.0.0.1:8080")]
        api_url: String,
    },
}
