//! 4 in a Row - terminal client binary.
//!
//! Thin hosting context around the client library: joins the arena, pumps
//! session events, reads column numbers from stdin, and keeps the
//! leaderboard poller alive until teardown.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use fourrow_client::{
    ClientConfig, ClientEvent, DEFAULT_POLL_PERIOD, GameClient, HttpStandingsSource,
    LeaderboardPoller, Phase, StandingsSource,
};
use fourrow_protocol::{Cell, LeaderboardEntry, Seat};

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            name,
            ws_url,
            api_url,
        } => play(name, ws_url, api_url).await,
        Command::Leaderboard { api_url } => print_leaderboard(api_url).await,
    }
}

/// Runs the interactive play loop until the channel closes or the user
/// quits.
async fn play(name: String, ws_url: String, api_url: String) -> Result<()> {
    info!(name = %name, "Starting 4 in a Row client");

    let (mut poller, standings) =
        LeaderboardPoller::spawn(HttpStandingsSource::new(api_url), DEFAULT_POLL_PERIOD);
    let mut client = GameClient::new(ClientConfig::new(ws_url));

    println!("Joining as {name}. Type a column number to move, 'lb' for standings, 'q' to leave.");
    client.join(&name);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = client.next_event() => match event {
                Some(ClientEvent::Updated) => render(&client),
                Some(ClientEvent::Won(notice)) => {
                    render(&client);
                    if notice.local_win {
                        println!("You win!");
                    } else {
                        println!("Player {} wins.", notice.winner);
                    }
                }
                Some(ClientEvent::Reset) | None => {
                    println!("Connection closed, back to the lobby.");
                    break;
                }
            },
            line = lines.next_line() => match line? {
                Some(input) => {
                    let input = input.trim();
                    if input.eq_ignore_ascii_case("q") {
                        client.disconnect();
                    } else if input.eq_ignore_ascii_case("lb") {
                        print_standings(&standings.borrow());
                    } else if let Ok(column) = input.parse::<usize>() {
                        client.drop_piece(column);
                    } else if !input.is_empty() {
                        println!("Unrecognized input: {input}");
                    }
                }
                None => client.disconnect(),
            },
        }
    }

    poller.stop();
    Ok(())
}

/// One-shot standings fetch.
async fn print_leaderboard(api_url: String) -> Result<()> {
    let source = HttpStandingsSource::new(api_url);
    let entries = source.fetch().await?;
    print_standings(&entries);
    Ok(())
}

/// Prints the mirrored session state. The service is authoritative; this
/// only projects the latest snapshot.
fn render(client: &GameClient) {
    let session = client.session();
    match session.phase() {
        Phase::Lobby => println!("In the lobby."),
        Phase::Waiting => println!("Finding an opponent..."),
        Phase::Playing | Phase::Finished => {
            if let Some(opponent) = session.opponent() {
                println!("{} vs {}", session.identity(), opponent);
            }
            if let Some(snapshot) = session.snapshot() {
                for row in snapshot.grid() {
                    let line: String = row
                        .iter()
                        .map(|cell| match cell {
                            Cell::Empty => '.',
                            Cell::Taken(Seat::One) => 'R',
                            Cell::Taken(Seat::Two) => 'Y',
                        })
                        .collect();
                    println!("{line}");
                }
                if session.phase() == Phase::Playing {
                    println!("Player {} to move.", snapshot.current_player());
                } else if snapshot.is_draw() {
                    println!("It's a draw.");
                }
            }
        }
    }
}

fn print_standings(entries: &[LeaderboardEntry]) {
    if entries.is_empty() {
        println!("No statistics yet.");
        return;
    }
    println!("Leaderboard:");
    for (rank, entry) in entries.iter().enumerate() {
        println!("{:>3}. {:<20} {} wins", rank + 1, entry.username, entry.wins);
    }
}
