use clap::Parser;
use log::{debug, info, warn};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

mod clock;
mod console;
mod display;
mod error;
mod notify;
mod pomodoro;
mod storage;
mod ws;

use clock::{ClockReceiver, TokioClock};
use console::{CONFIRM_SWITCH_PROMPT, ConsoleCommand};
use display::{DisplaySink, TerminalDisplay};
use notify::{DesktopNotifier, Notifier};
use pomodoro::{Command, Mode, TimerEngine};
use storage::{JsonFileStore, MemoryStorage, Storage};
use ws::websocket_server::{self, BroadcastDisplay, WebSocketResponse};

#[derive(Parser, Debug)]
#[command(version, about = "Pomodoro timer for the terminal or a browser front-end")]
struct Cli {
    /// Serve a browser front-end over WebSocket instead of reading stdin
    #[arg(long)]
    daemon: bool,

    /// Address the WebSocket server listens on
    #[arg(long, default_value = "127.0.0.1:8765")]
    addr: SocketAddr,

    /// Storage file for settings, theme and today's progress
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Keep everything in memory, nothing is written to disk
    #[arg(long, conflicts_with = "store")]
    ephemeral: bool,

    /// Never try desktop notifications, always alert in the terminal
    #[arg(long)]
    no_desktop_notifications: bool,

    #[arg(short, long)]
    verbose: bool,
}

type Engine<D> = TimerEngine<Box<dyn Storage>, D, Box<dyn Notifier>, TokioClock>;

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn open_storage(cli: &Cli) -> Result<Box<dyn Storage>, Box<dyn std::error::Error>> {
    if cli.ephemeral {
        info!("Ephemeral mode: settings and progress are not saved");
        return Ok(Box::new(MemoryStorage::new()));
    }
    let path = match &cli.store {
        Some(path) => path.clone(),
        None => JsonFileStore::default_path()?,
    };
    let store = JsonFileStore::open(path)?;
    info!("Storing state in: {}", store.path().display());
    Ok(Box::new(store))
}

fn build_engine<D: DisplaySink>(
    cli: &Cli,
    display: D,
) -> Result<(Engine<D>, ClockReceiver), Box<dyn std::error::Error>> {
    let storage = open_storage(cli)?;
    let notifier: Box<dyn Notifier> = if cli.no_desktop_notifications {
        Box::new(DesktopNotifier::disabled())
    } else {
        Box::new(DesktopNotifier::new())
    };
    let (clock, ticks) = TokioClock::new();
    Ok((TimerEngine::new(storage, display, notifier, clock), ticks))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.daemon {
        return run_daemon_mode(&cli).await;
    }
    run_terminal_mode(&cli).await
}

fn print_help() {
    println!("Commands: start | pause | reset | mode <focus|short|long>");
    println!("          settings <pomodoro> <short> <long> | theme <name> | status | quit");
}

/// Interactive mode: one command per stdin line, countdown on stdout.
async fn run_terminal_mode(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    println!("🍅 Pomodoro Timer");
    println!("======================================================");
    print_help();

    let (mut engine, mut ticks) = build_engine(cli, TerminalDisplay::new())?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    // Mode waiting on the "switch anyway?" answer.
    let mut pending_switch: Option<Mode> = None;

    loop {
        tokio::select! {
            Some(event) = ticks.recv() => engine.handle_clock(event),
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };

                if let Some(mode) = pending_switch.take() {
                    match console::answer_switch(mode, &line) {
                        Some(command) => run_console_command(&mut engine, command),
                        None => println!("\nMode unchanged"),
                    }
                    continue;
                }
                if line.trim().is_empty() {
                    continue;
                }

                match console::parse_line(&line) {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(ConsoleCommand::Status) => {
                        let snapshot = serde_json::to_string_pretty(&engine.snapshot())?;
                        println!("\n{}", snapshot);
                    }
                    Ok(ConsoleCommand::Mode { mode }) if engine.is_running() => {
                        println!("\n{}", CONFIRM_SWITCH_PROMPT);
                        pending_switch = Some(mode);
                    }
                    Ok(command) => {
                        if let Some(command) = command.to_command() {
                            run_console_command(&mut engine, command);
                        }
                    }
                    Err(e) => println!("\n{}", e.trim_end()),
                }
            }
        }
    }

    println!();
    info!("Bye");
    Ok(())
}

fn run_console_command(engine: &mut Engine<TerminalDisplay>, command: Command) {
    match engine.execute(command) {
        Ok(true) => {}
        Ok(false) => println!("\nMode unchanged"),
        Err(e) => println!("\n⚠️  {}", e),
    }
}

/// Daemon mode - WebSocket server driving the timer for a browser front-end
async fn run_daemon_mode(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    println!("🍅 Pomodoro Timer - Daemon Mode");
    println!("======================================================");

    let frames = websocket_server::create_frame_channel();
    let (commands, mut requests) = websocket_server::create_command_channel();
    let (mut engine, mut ticks) = build_engine(cli, BroadcastDisplay::new(frames.clone()))?;

    let listener = websocket_server::bind(cli.addr).await?;
    println!("Running WebSocket server on ws://{}", listener.local_addr()?);
    tokio::spawn(websocket_server::serve(listener, commands, frames));

    loop {
        tokio::select! {
            Some(event) = ticks.recv() => engine.handle_clock(event),
            Some(request) = requests.recv() => {
                let response = WebSocketResponse::from_outcome(engine.execute(request.command));
                if request.reply.send(response).is_err() {
                    debug!("Client went away before the reply");
                }
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                }
                break;
            }
        }
    }

    info!("Shutting down");
    Ok(())
}
