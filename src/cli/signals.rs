//! Keyboard commands and interrupt signals for the interactive loop

use std::collections::VecDeque;
use std::io::BufRead;

use tokio::sync::mpsc;
use tracing::debug;

/// A line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Empty line (Enter)
    Confirm,
    /// `s`: send the photo
    Send,
    /// `r`: retake the photo
    Retake,
    /// `c`: cancel or close the camera
    Cancel,
    /// `q`: quit
    Quit,
    /// Anything else
    Unknown(String),
}

impl UserCommand {
    /// Parse a line of input, ignoring case and surrounding whitespace
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Self::Confirm,
            "s" | "send" => Self::Send,
            "r" | "retake" => Self::Retake,
            "c" | "cancel" | "close" => Self::Cancel,
            "q" | "quit" | "exit" => Self::Quit,
            _ => Self::Unknown(trimmed.to_string()),
        }
    }
}

/// Events delivered to the interactive loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Command(UserCommand),
    /// SIGINT (Ctrl+C) or SIGTERM
    Interrupt,
    /// stdin reached end of file
    Closed,
}

/// Merges stdin lines and OS shutdown signals into one stream.
///
/// Lines that arrive while a step is busy can be held back and are
/// replayed, in order, by the next [`InputHandler::recv`].
pub struct InputHandler {
    receiver: mpsc::Receiver<InputEvent>,
    held: VecDeque<InputEvent>,
    closed: bool,
}

impl InputHandler {
    /// Start reading stdin and listening for shutdown signals
    pub fn new() -> Result<Self, std::io::Error> {
        let (tx, rx) = mpsc::channel(16);

        // A plain thread, so a pending read never holds up runtime shutdown
        let tx_stdin = tx.clone();
        std::thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || {
                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    let event = match line {
                        Ok(line) => InputEvent::Command(UserCommand::parse(&line)),
                        Err(_) => break,
                    };
                    if tx_stdin.blocking_send(event).is_err() {
                        return;
                    }
                }
                let _ = tx_stdin.blocking_send(InputEvent::Closed);
            })?;

        Self::listen_for_shutdown(tx)?;

        Ok(Self::with_receiver(rx))
    }

    pub(crate) fn with_receiver(receiver: mpsc::Receiver<InputEvent>) -> Self {
        Self {
            receiver,
            held: VecDeque::new(),
            closed: false,
        }
    }

    #[cfg(unix)]
    fn listen_for_shutdown(tx: mpsc::Sender<InputEvent>) -> Result<(), std::io::Error> {
        use tokio::signal::unix::{signal, SignalKind};

        let tx_int = tx.clone();
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::spawn(async move {
            while sigint.recv().await.is_some() {
                debug!("received SIGINT");
                if tx_int.send(InputEvent::Interrupt).await.is_err() {
                    break;
                }
            }
        });

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::spawn(async move {
            sigterm.recv().await;
            debug!("received SIGTERM");
            let _ = tx.send(InputEvent::Interrupt).await;
        });

        Ok(())
    }

    #[cfg(not(unix))]
    fn listen_for_shutdown(tx: mpsc::Sender<InputEvent>) -> Result<(), std::io::Error> {
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                debug!("received Ctrl+C");
                if tx.send(InputEvent::Interrupt).await.is_err() {
                    break;
                }
            }
        });
        Ok(())
    }

    /// Whether stdin has been exhausted
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Next event, replaying held input first
    pub async fn recv(&mut self) -> InputEvent {
        if let Some(event) = self.held.pop_front() {
            return event;
        }
        if self.closed {
            return InputEvent::Closed;
        }
        self.recv_live().await
    }

    /// Next event from stdin or the signal listeners, ignoring held input
    pub async fn recv_live(&mut self) -> InputEvent {
        let event = self.receiver.recv().await.unwrap_or(InputEvent::Closed);
        if event == InputEvent::Closed {
            self.closed = true;
        }
        event
    }

    /// Keep an event for the next `recv`
    pub fn hold(&mut self, event: InputEvent) {
        self.held.push_back(event);
    }
}
