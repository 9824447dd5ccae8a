//! Live update channel: one connection to the server-push endpoint, kept
//! alive by a driver task.
//!
//! The driver owns a [`ChannelMachine`] and feeds it every command and
//! transport event. The machine decides what happens next; the driver only
//! carries out the returned actions. Inbound payloads are decoded here and
//! handed to subscribers in arrival order from the single driver task.
use std::future::pending;
use std::pin::Pin;
use std::sync::Arc;

use drishya_core::{
    ChannelAction, ChannelInput, ChannelMachine, ConnectionState, ReconnectPolicy,
    StatusUpdateEvent,
};
use drishya_logging::{drishya_debug, drishya_info, drishya_warn};
use futures_util::future::BoxFuture;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Sleep;
use tokio_util::sync::CancellationToken;

use crate::subscribers::{self, SharedRegistry, Subscription};
use crate::transport::{Transport, TransportConnection};
use crate::TransportError;

type Opening = BoxFuture<'static, Result<Box<dyn TransportConnection>, TransportError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Connect,
    Disconnect,
}

/// Handle to a running channel. Dropping it stops the driver and releases
/// the connection.
pub struct LiveUpdateChannel {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ConnectionState>,
    registry: SharedRegistry,
    shutdown: CancellationToken,
    driver: Option<JoinHandle<()>>,
}

impl LiveUpdateChannel {
    /// Starts the driver task on the current tokio runtime. The channel
    /// stays disconnected until [`connect`](Self::connect) is called.
    pub fn spawn(transport: Arc<dyn Transport>, policy: ReconnectPolicy) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(ConnectionState::Disconnected);
        let registry = SharedRegistry::default();
        let shutdown = CancellationToken::new();

        let driver = Driver {
            machine: ChannelMachine::new(policy),
            transport,
            registry: registry.clone(),
            state_tx,
            commands: command_rx,
            shutdown: shutdown.clone(),
            opening: None,
            connection: None,
            retry: None,
        };
        let driver = tokio::spawn(driver.run());

        Self {
            commands,
            state,
            registry,
            shutdown,
            driver: Some(driver),
        }
    }

    pub fn connect(&self) {
        let _ = self.commands.send(Command::Connect);
    }

    pub fn disconnect(&self) {
        let _ = self.commands.send(Command::Disconnect);
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&StatusUpdateEvent) + Send + Sync + 'static,
    {
        subscribers::register(&self.registry, Arc::new(listener))
    }

    pub fn subscriber_count(&self) -> usize {
        subscribers::lock(&self.registry).len()
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Stops the driver. The channel cannot be reconnected afterwards.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Stops the driver and waits until the connection has been released.
    pub async fn close(mut self) {
        self.shutdown.cancel();
        if let Some(driver) = self.driver.take() {
            let _ = driver.await;
        }
    }
}

impl Drop for LiveUpdateChannel {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

enum Wake {
    Command(Command),
    Opened(Result<Box<dyn TransportConnection>, TransportError>),
    Frame(Result<Option<String>, TransportError>),
    RetryElapsed,
    Shutdown,
}

struct Driver {
    machine: ChannelMachine,
    transport: Arc<dyn Transport>,
    registry: SharedRegistry,
    state_tx: watch::Sender<ConnectionState>,
    commands: mpsc::UnboundedReceiver<Command>,
    shutdown: CancellationToken,
    opening: Option<Opening>,
    connection: Option<Box<dyn TransportConnection>>,
    retry: Option<Pin<Box<Sleep>>>,
}

impl Driver {
    async fn run(mut self) {
        loop {
            let wake = tokio::select! {
                _ = self.shutdown.cancelled() => Wake::Shutdown,
                command = self.commands.recv() => match command {
                    Some(command) => Wake::Command(command),
                    None => Wake::Shutdown,
                },
                opened = finish_opening(&mut self.opening) => Wake::Opened(opened),
                frame = next_frame(&mut self.connection) => Wake::Frame(frame),
                _ = retry_elapsed(&mut self.retry) => Wake::RetryElapsed,
            };

            let input = match wake {
                Wake::Shutdown => break,
                Wake::Command(Command::Connect) => ChannelInput::ConnectRequested,
                Wake::Command(Command::Disconnect) => ChannelInput::DisconnectRequested,
                Wake::Opened(Ok(connection)) => {
                    self.opening = None;
                    self.connection = Some(connection);
                    ChannelInput::TransportOpened
                }
                Wake::Opened(Err(err)) => {
                    self.opening = None;
                    drishya_warn!("{}", err);
                    ChannelInput::TransportFailed
                }
                Wake::Frame(Ok(Some(text))) => {
                    self.dispatch(&text);
                    continue;
                }
                Wake::Frame(Ok(None)) => {
                    self.connection = None;
                    drishya_info!("Live connection closed");
                    ChannelInput::TransportClosed
                }
                Wake::Frame(Err(err)) => {
                    self.connection = None;
                    drishya_warn!("{}", err);
                    ChannelInput::TransportFailed
                }
                Wake::RetryElapsed => {
                    self.retry = None;
                    ChannelInput::RetryElapsed
                }
            };

            let actions = self.machine.handle(input);
            if actions.is_empty() && is_loss(input) && self.exhausted() {
                drishya_warn!(
                    "Live connection lost; giving up after {} reconnect attempts",
                    self.machine.attempts()
                );
            }
            for action in actions {
                self.execute(action).await;
            }
            self.publish();
        }

        if let Some(mut connection) = self.connection.take() {
            connection.close().await;
        }
        self.state_tx.send_replace(ConnectionState::Disconnected);
        drishya_debug!("Live channel driver stopped");
    }

    fn exhausted(&self) -> bool {
        self.machine.state() == ConnectionState::Disconnected
            && self.machine.attempts() >= self.machine.policy().max_attempts
    }

    async fn execute(&mut self, action: ChannelAction) {
        match action {
            ChannelAction::OpenTransport => {
                let transport = self.transport.clone();
                self.opening = Some(Box::pin(async move { transport.open().await }));
            }
            ChannelAction::CloseTransport => {
                self.opening = None;
                if let Some(mut connection) = self.connection.take() {
                    connection.close().await;
                }
            }
            ChannelAction::ScheduleRetry { attempt, delay } => {
                drishya_info!("Reconnecting in {:?} (attempt {})", delay, attempt);
                self.retry = Some(Box::pin(tokio::time::sleep(delay)));
            }
            ChannelAction::CancelRetry => {
                self.retry = None;
            }
        }
    }

    fn dispatch(&self, text: &str) {
        match serde_json::from_str::<StatusUpdateEvent>(text) {
            Ok(event) => subscribers::deliver(&self.registry, &event),
            Err(err) => drishya_warn!("Dropping malformed live update: {}", err),
        }
    }

    fn publish(&self) {
        let current = self.machine.state();
        self.state_tx.send_if_modified(|state| {
            if *state == current {
                false
            } else {
                drishya_debug!("Live channel {} -> {}", state, current);
                *state = current;
                true
            }
        });
    }
}

fn is_loss(input: ChannelInput) -> bool {
    matches!(
        input,
        ChannelInput::TransportClosed | ChannelInput::TransportFailed
    )
}

async fn finish_opening(
    opening: &mut Option<Opening>,
) -> Result<Box<dyn TransportConnection>, TransportError> {
    match opening {
        Some(future) => future.await,
        None => pending().await,
    }
}

async fn next_frame(
    connection: &mut Option<Box<dyn TransportConnection>>,
) -> Result<Option<String>, TransportError> {
    match connection {
        Some(connection) => connection.next_text().await,
        None => pending().await,
    }
}

async fn retry_elapsed(retry: &mut Option<Pin<Box<Sleep>>>) {
    match retry {
        Some(sleep) => sleep.as_mut().await,
        None => pending().await,
    }
}
