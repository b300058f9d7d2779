use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use duet_client::{
    CallConfig, CallEvent, CallLimit, NoopRecorder, RunningCall, TransportConfig, launch_call,
};
use duet_core::utils::default_relay_url;
use duet_server::{RelayConfig, serve_with_shutdown};
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_ALERT_BEFORE_SECS: u64 = 60;

#[derive(Parser)]
#[command(name = "duet", version, about = "Two-party calls over a room relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Relay {
        #[arg(long, env = "DUET_BIND", default_value = "0.0.0.0:3000")]
        bind: SocketAddr,
    },
    /// Join a room as a call participant.
    Call {
        #[arg(long, env = "DUET_ROOM")]
        room: String,

        #[arg(long, env = "DUET_RELAY_URL", default_value_t = default_relay_url())]
        relay: String,

        /// Send the offer right away instead of waiting for one.
        #[arg(long)]
        caller: bool,

        /// Hang up automatically after this many seconds.
        #[arg(long, env = "DUET_MAX_DURATION")]
        max_duration: Option<u64>,

        /// Warn this many seconds before the limit.
        #[arg(long, env = "DUET_ALERT_BEFORE", default_value_t = DEFAULT_ALERT_BEFORE_SECS)]
        alert_before: u64,

        /// STUN server URL; may be repeated.
        #[arg(long = "stun")]
        stun: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Relay { bind } => run_relay(bind).await,
        Commands::Call {
            room,
            relay,
            caller,
            max_duration,
            alert_before,
            stun,
        } => {
            let mut config = CallConfig::new(room);
            config.relay_url = relay;
            if let Some(max_duration) = max_duration {
                config.limit = Some(CallLimit::new(max_duration, alert_before)?);
            }
            if !stun.is_empty() {
                config.transport = TransportConfig::with_stun_servers(stun);
            }
            run_call(config, caller).await
        }
    }
}

async fn run_relay(bind: SocketAddr) -> Result<()> {
    println!("{}", format!("Relay listening on ws://{}", bind).green().bold());

    serve_with_shutdown(RelayConfig { bind }, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Ctrl-C received, shutting down relay");
    })
    .await
}

async fn run_call(config: CallConfig, caller: bool) -> Result<()> {
    println!(
        "{}",
        format!("Joining room '{}' via {}", config.room_id, config.relay_url)
            .green()
            .bold()
    );
    println!(
        "{}",
        "Commands: call, end, record, stop (Ctrl-C hangs up)".dimmed()
    );

    let RunningCall {
        handle,
        mut events,
        task,
    } = launch_call(config, NoopRecorder::default()).await?;

    if caller {
        handle.start_call();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                let ended = matches!(event, CallEvent::Ended { .. });
                print_event(&event);
                if ended {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line.context("Failed to read stdin")? {
                    Some(line) => match line.trim() {
                        "call" => handle.start_call(),
                        "end" => handle.end_call(),
                        "record" => handle.start_recording(),
                        "stop" => handle.stop_recording(),
                        "" => {}
                        other => println!("{} {}", "Unknown command:".yellow(), other),
                    },
                    None => stdin_open = false,
                }
            }
            _ = tokio::signal::ctrl_c() => handle.end_call(),
        }
    }

    drop(handle);
    task.await.context("Call task failed")?;
    Ok(())
}

fn print_event(event: &CallEvent) {
    match event {
        CallEvent::Elapsed { display, .. } => println!("{} {}", "⏱".dimmed(), display),
        CallEvent::TimeWarning { message, .. } => println!("{}", message.yellow().bold()),
        CallEvent::TimeUp => println!("{}", "Call time is over. Ending call now.".red().bold()),
        CallEvent::SetupFailed { reason } => println!("{} {}", "Call setup failed:".red(), reason),
        CallEvent::Connected => println!("{}", "Connected".green().bold()),
        CallEvent::RemoteTrack { kind } => println!("{} {}", "Remote track:".cyan(), kind),
        CallEvent::Ended { display, .. } => {
            println!("{} {}", "Call ended. Total call time:".cyan().bold(), display)
        }
    }
}
