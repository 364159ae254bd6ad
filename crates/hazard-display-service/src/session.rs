//! The session task: sole owner of the arbiter.
//!
//! Inbound commands and the arbiter's own deadlines are the only two things
//! the task waits on. Each wake-up runs the arbiter to completion before the
//! next one is considered, so commands are handled strictly in arrival order.

use anyhow::{Context, Result};
use hazard_arbiter::{Dispatch, HazardArbiter, SuppressionFlags};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

/// A command for the session task.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionInput {
    /// One raw inbound envelope.
    Message(String),
    /// The display session connected.
    Connect,
    /// The display session was lost.
    Disconnect,
    /// New suppression flags.
    Flags(SuppressionFlags),
    /// Stop the task and hand the arbiter back.
    Shutdown,
}

/// The task that owns the arbiter.
#[derive(Debug)]
pub struct Session {
    arbiter: HazardArbiter,
    origin: Instant,
    inbox: mpsc::Receiver<SessionInput>,
    outbox: mpsc::Sender<Dispatch>,
}

/// Front end of a running [`Session`].
#[derive(Debug)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionInput>,
    task: JoinHandle<HazardArbiter>,
}

impl Session {
    /// Spawn the session task on the current runtime.
    ///
    /// Returns the command handle and the stream of non-empty dispatches.
    pub fn spawn(arbiter: HazardArbiter, buffer: usize) -> (SessionHandle, mpsc::Receiver<Dispatch>) {
        let buffer = buffer.max(1);
        let (commands, inbox) = mpsc::channel(buffer);
        let (outbox, dispatches) = mpsc::channel(buffer);
        let session = Self {
            arbiter,
            origin: Instant::now(),
            inbox,
            outbox,
        };
        let task = tokio::spawn(session.run());
        (SessionHandle { commands, task }, dispatches)
    }

    /// Logical clock: milliseconds since the session started.
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn instant_at(&self, ms: u64) -> Instant {
        self.origin + Duration::from_millis(ms)
    }

    /// Run until shut down or until either channel closes.
    pub async fn run(mut self) -> HazardArbiter {
        info!("hazard session started");
        loop {
            let deadline = self.arbiter.next_deadline().map(|ms| self.instant_at(ms));

            let keep_going = tokio::select! {
                input = self.inbox.recv() => match input {
                    Some(SessionInput::Shutdown) | None => false,
                    Some(input) => self.handle(input).await,
                },
                () = wait_for(deadline) => self.fire_due().await,
            };
            if !keep_going {
                break;
            }
        }
        info!(
            active = ?self.arbiter.active().map(|e| e.hazard_type),
            pending = self.arbiter.pending().count(),
            "hazard session stopped"
        );
        self.arbiter
    }

    async fn handle(&mut self, input: SessionInput) -> bool {
        // Timers that came due while the command was in flight fire first.
        if !self.fire_due().await {
            return false;
        }
        let now = self.now_ms();
        let dispatch = match input {
            SessionInput::Message(raw) => self.arbiter.handle_message(&raw, now),
            SessionInput::Connect => self.arbiter.connect(now),
            SessionInput::Disconnect => self.arbiter.disconnect(now),
            SessionInput::Flags(flags) => self.arbiter.set_flags(flags, now),
            SessionInput::Shutdown => return false,
        };
        self.publish(dispatch).await
    }

    async fn fire_due(&mut self) -> bool {
        let now = self.now_ms();
        for dispatch in self.arbiter.advance(now) {
            if !self.publish(dispatch).await {
                return false;
            }
        }
        true
    }

    async fn publish(&self, dispatch: Dispatch) -> bool {
        if dispatch.is_empty() {
            return true;
        }
        if self.outbox.send(dispatch).await.is_err() {
            warn!("dispatch receiver dropped, stopping session");
            return false;
        }
        true
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

impl SessionHandle {
    async fn send(&self, input: SessionInput) -> Result<()> {
        self.commands
            .send(input)
            .await
            .context("hazard session has stopped")
    }

    /// Queue one raw inbound envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has stopped.
    pub async fn message(&self, raw: impl Into<String>) -> Result<()> {
        self.send(SessionInput::Message(raw.into())).await
    }

    /// Report that the display session connected.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has stopped.
    pub async fn connect(&self) -> Result<()> {
        self.send(SessionInput::Connect).await
    }

    /// Report that the display session was lost.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has stopped.
    pub async fn disconnect(&self) -> Result<()> {
        self.send(SessionInput::Disconnect).await
    }

    /// Replace the suppression flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has stopped.
    pub async fn set_flags(&self, flags: SuppressionFlags) -> Result<()> {
        self.send(SessionInput::Flags(flags)).await
    }

    /// Stop the session and take the arbiter back.
    ///
    /// # Errors
    ///
    /// Returns an error if the task panicked or was cancelled.
    pub async fn shutdown(self) -> Result<HazardArbiter> {
        if self.commands.send(SessionInput::Shutdown).await.is_err() {
            debug!("hazard session already stopped");
        }
        self.task.await.context("hazard session task failed")
    }
}

/// Forward every non-blank line of `reader` to the session.
///
/// Returns the number of lines forwarded.
///
/// # Errors
///
/// Returns an error if reading fails or the session has stopped.
pub async fn feed_lines<R>(reader: R, handle: &SessionHandle) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0usize;
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        handle.message(line).await?;
        forwarded += 1;
    }
    debug!(lines = forwarded, "input exhausted");
    Ok(forwarded)
}
