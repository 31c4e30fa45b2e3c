use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_tungstenite::tungstenite::protocol::Message;

use crate::display::{DisplayFrame, DisplaySink};
use crate::error::ValidationError;
use crate::pomodoro::{Command, Mode, Theme};

const FRAME_BUFFER: usize = 64;

#[derive(Debug, Serialize, PartialEq)]
pub struct WebSocketResponse {
    pub success: bool,
    pub message: Option<String>,
}

impl WebSocketResponse {
    pub fn from_outcome(outcome: Result<bool, ValidationError>) -> Self {
        match outcome {
            Ok(true) => Self {
                success: true,
                message: None,
            },
            Ok(false) => Self::error("Mode switch declined: the timer is running".to_string()),
            Err(e) => Self::error(e.to_string()),
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            message: Some(message),
        }
    }
}

/// A command from a client plus where to send the engine's answer.
pub struct CommandRequest {
    pub command: Command,
    pub reply: oneshot::Sender<WebSocketResponse>,
}

pub type CommandSender = mpsc::UnboundedSender<CommandRequest>;
pub type CommandReceiver = mpsc::UnboundedReceiver<CommandRequest>;
pub type FrameSender = broadcast::Sender<DisplayFrame>;

pub fn create_command_channel() -> (CommandSender, CommandReceiver) {
    mpsc::unbounded_channel()
}

pub fn create_frame_channel() -> FrameSender {
    broadcast::channel(FRAME_BUFFER).0
}

/// Display sink that fans every update out to all connected clients.
pub struct BroadcastDisplay {
    frames: FrameSender,
}

impl BroadcastDisplay {
    pub fn new(frames: FrameSender) -> Self {
        Self { frames }
    }

    fn push(&self, frame: DisplayFrame) {
        // No receivers just means no client is connected.
        let _ = self.frames.send(frame);
    }
}

impl DisplaySink for BroadcastDisplay {
    fn render(&mut self, minutes: &str, seconds: &str, progress: f64) {
        self.push(DisplayFrame::timer(minutes, seconds, progress));
    }

    fn render_progress(&mut self, completed: u32, total_focus_minutes: u32, percent_of_goal: f64) {
        self.push(DisplayFrame::progress(
            completed,
            total_focus_minutes,
            percent_of_goal,
        ));
    }

    fn render_mode(&mut self, mode: Mode) {
        self.push(DisplayFrame::mode(mode));
    }

    fn render_theme(&mut self, theme: &Theme) {
        self.push(DisplayFrame::theme(theme));
    }
}

pub async fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind(&addr).await?;
    info!("WebSocket server listening on: {}", listener.local_addr()?);
    Ok(listener)
}

pub async fn serve(listener: TcpListener, commands: CommandSender, frames: FrameSender) {
    while let Ok((stream, peer_addr)) = listener.accept().await {
        info!("New WebSocket connection from: {}", peer_addr);
        tokio::spawn(handle_connection(
            stream,
            peer_addr,
            commands.clone(),
            frames.subscribe(),
        ));
    }
}

async fn dispatch(commands: &CommandSender, command: Command) -> WebSocketResponse {
    let (reply, response) = oneshot::channel();
    if commands.send(CommandRequest { command, reply }).is_err() {
        return WebSocketResponse::error("Timer is shutting down".to_string());
    }
    response
        .await
        .unwrap_or_else(|_| WebSocketResponse::error("Timer dropped the command".to_string()))
}

async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    commands: CommandSender,
    mut frames: broadcast::Receiver<DisplayFrame>,
) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake failed with {}: {}", peer_addr, e);
            return;
        }
    };

    debug!("WebSocket handshake completed with {}", peer_addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Have the engine redraw so this client starts with the current state.
    dispatch(&commands, Command::Refresh).await;

    loop {
        tokio::select! {
            msg = ws_receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let response = match serde_json::from_str::<Command>(&text) {
                        Ok(command) => {
                            debug!("[WebSocket] {} sent {:?}", peer_addr, command);
                            dispatch(&commands, command).await
                        }
                        Err(e) => {
                            warn!("Failed to parse message from {}: {}", peer_addr, e);
                            WebSocketResponse::error(format!("Parse error: {}", e))
                        }
                    };

                    if let Ok(response_json) = serde_json::to_string(&response) {
                        if let Err(e) = ws_sender.send(Message::Text(response_json)).await {
                            warn!("Failed to send WebSocket response: {}", e);
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    info!("WebSocket connection closed by {}", peer_addr);
                    break;
                }
                Some(Ok(Message::Ping(data))) => {
                    if let Err(e) = ws_sender.send(Message::Pong(data)).await {
                        warn!("Failed to send pong: {}", e);
                        break;
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("WebSocket error from {}: {}", peer_addr, e);
                    break;
                }
            },
            frame = frames.recv() => match frame {
                Ok(frame) => {
                    if let Ok(frame_json) = serde_json::to_string(&frame) {
                        if let Err(e) = ws_sender.send(Message::Text(frame_json)).await {
                            warn!("Failed to send frame to {}: {}", peer_addr, e);
                            break;
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("{} lagged behind by {} frames", peer_addr, skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    info!("WebSocket connection with {} terminated", peer_addr);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_serialization() {
        let json = serde_json::to_string(&WebSocketResponse::from_outcome(Ok(true))).unwrap();
        assert_eq!(json, r#"{"success":true,"message":null}"#);

        let declined = WebSocketResponse::from_outcome(Ok(false));
        assert!(!declined.success);

        let invalid = WebSocketResponse::from_outcome(Err(ValidationError::EmptyTheme));
        assert_eq!(
            invalid.message.as_deref(),
            Some("theme name must not be empty")
        );
    }

    #[test]
    fn broadcast_display_reaches_subscribers() {
        let frames = create_frame_channel();
        let mut rx = frames.subscribe();
        let mut display = BroadcastDisplay::new(frames);

        display.render("04", "59", 0.5);
        display.render_mode(Mode::ShortBreak);

        assert_eq!(rx.try_recv().unwrap(), DisplayFrame::timer("04", "59", 0.5));
        assert_eq!(rx.try_recv().unwrap(), DisplayFrame::mode(Mode::ShortBreak));
    }

    #[tokio::test]
    async fn client_commands_reach_engine_and_frames_reach_client() {
        let listener = bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (commands, mut requests) = create_command_channel();
        let frames = create_frame_channel();
        tokio::spawn(serve(listener, commands, frames.clone()));

        // Stand-in for the engine loop.
        let engine_frames = frames.clone();
        tokio::spawn(async move {
            while let Some(request) = requests.recv().await {
                let outcome = match request.command {
                    Command::Refresh => {
                        let _ = engine_frames.send(DisplayFrame::timer("25", "00", 0.0));
                        Ok(true)
                    }
                    Command::Start => Ok(true),
                    _ => Err(ValidationError::EmptyTheme),
                };
                let _ = request.reply.send(WebSocketResponse::from_outcome(outcome));
            }
        });

        let (mut client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .unwrap();

        let first = client.next().await.unwrap().unwrap();
        let frame: serde_json::Value = serde_json::from_str(first.to_text().unwrap()).unwrap();
        assert_eq!(frame["type"], "timer");
        assert_eq!(frame["minutes"], "25");

        client
            .send(Message::Text(r#"{"type":"start"}"#.to_string()))
            .await
            .unwrap();
        let reply = client.next().await.unwrap().unwrap();
        assert_eq!(reply.to_text().unwrap(), r#"{"success":true,"message":null}"#);

        client
            .send(Message::Text("{\"type\":\"launch\"}".to_string()))
            .await
            .unwrap();
        let reply = client.next().await.unwrap().unwrap();
        let reply: serde_json::Value = serde_json::from_str(reply.to_text().unwrap()).unwrap();
        assert_eq!(reply["success"], false);
        assert!(
            reply["message"]
                .as_str()
                .unwrap()
                .starts_with("Parse error")
        );
    }
}
